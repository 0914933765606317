// metadata.rs — Save and restore the original author through a label.
//
// When a change is migrated with a fixed author (e.g. a bot account) the
// real author can be stored in a label on the way out and restored on the
// way back. Saving happens on the output side of one direction and
// restoring on the output side of the other, so the two are configured as
// a matched pair rather than derived from each other.

use ferry_work::{Author, Console, TransformWork};

use crate::error::Result;
use crate::transformation::Transformation;

/// Sets the author from a label found in the source changes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RestoreOriginalAuthor {
    label: String,
}

impl RestoreOriginalAuthor {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn transform(&self, work: &mut TransformWork, console: &dyn Console) -> Result<()> {
        let mut author: Option<Author> = None;
        // Several changes can be squashed together; the last one wins.
        for change in work.changes().current() {
            let Some(value) = change.label(&self.label) else {
                continue;
            };
            match Author::parse(value) {
                Ok(parsed) => author = Some(parsed),
                Err(e) => {
                    // A broken label is very hard for a user to fix, so
                    // never fail the migration over it.
                    console.warn(&format!("Cannot restore original author: {}", e));
                }
            }
        }

        if let Some(author) = author {
            tracing::debug!(label = %self.label, author = %author, "restoring original author");
            work.set_author(author);
            work.remove_label(&self.label);
        }
        Ok(())
    }

    pub fn reverse(&self) -> Result<Transformation> {
        Ok(Transformation::SaveAuthor(SaveOriginalAuthor::new(
            self.label.clone(),
        )))
    }

    pub fn describe(&self) -> String {
        "Restoring original author".to_string()
    }
}

/// Stores the current author in a message label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveOriginalAuthor {
    label: String,
}

impl SaveOriginalAuthor {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn transform(&self, work: &mut TransformWork, _console: &dyn Console) -> Result<()> {
        let author = work.author().to_string();
        work.add_label(&self.label, &author);
        Ok(())
    }

    pub fn reverse(&self) -> Result<Transformation> {
        Ok(Transformation::RestoreAuthor(RestoreOriginalAuthor::new(
            self.label.clone(),
        )))
    }

    pub fn describe(&self) -> String {
        "Saving original author".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use ferry_work::{CapturingConsole, Changes, SourceChange};

    const LABEL: &str = "ORIGINAL_AUTHOR";

    fn change(reference: &str, day: u32, labels: &[(&str, &str)]) -> SourceChange {
        SourceChange::new(
            reference,
            Author::new("Bot", "bot@example.com"),
            "change",
            Utc.with_ymd_and_hms(2024, 1, day, 0, 0, 0).unwrap(),
        )
        .with_labels(labels.iter().copied())
    }

    fn work_with(current: Vec<SourceChange>) -> TransformWork {
        TransformWork::new(
            "/checkout",
            "Message\n\nORIGINAL_AUTHOR=Foo Bar <foo@bar.com>\n",
            Author::new("Bot", "bot@example.com"),
        )
        .with_changes(Changes::new(current, vec![]))
    }

    #[test]
    fn restores_author_and_removes_label() {
        let mut work = work_with(vec![change("r1", 1, &[(LABEL, "Foo Bar <foo@bar.com>")])]);
        RestoreOriginalAuthor::new(LABEL)
            .transform(&mut work, &CapturingConsole::new())
            .unwrap();
        assert_eq!(work.author(), &Author::new("Foo Bar", "foo@bar.com"));
        assert_eq!(work.message(), "Message\n\n");
    }

    #[test]
    fn last_labelled_change_wins() {
        let mut work = work_with(vec![
            change("r1", 1, &[(LABEL, "First <first@example.com>")]),
            change("r2", 2, &[]),
            change("r3", 3, &[(LABEL, "Last <last@example.com>")]),
        ]);
        RestoreOriginalAuthor::new(LABEL)
            .transform(&mut work, &CapturingConsole::new())
            .unwrap();
        assert_eq!(work.author().name, "Last");
    }

    #[test]
    fn malformed_label_warns_and_keeps_author() {
        let console = CapturingConsole::new();
        let mut work = work_with(vec![change("r1", 1, &[(LABEL, "not an author")])]);
        RestoreOriginalAuthor::new(LABEL)
            .transform(&mut work, &console)
            .unwrap();
        assert_eq!(work.author().name, "Bot");
        assert_eq!(console.warnings().len(), 1);
        assert!(console.warnings()[0].starts_with("Cannot restore original author: "));
        // Label left alone since nothing was restored.
        assert!(work.get_label(LABEL).is_some());
    }

    #[test]
    fn no_label_is_untouched() {
        let mut work = work_with(vec![change("r1", 1, &[])]);
        let before = work.message().to_string();
        RestoreOriginalAuthor::new(LABEL)
            .transform(&mut work, &CapturingConsole::new())
            .unwrap();
        assert_eq!(work.author().name, "Bot");
        assert_eq!(work.message(), before);
    }

    #[test]
    fn save_writes_author_label() {
        let mut work = TransformWork::new("/checkout", "Message", Author::new("Foo Bar", "foo@bar.com"));
        SaveOriginalAuthor::new(LABEL)
            .transform(&mut work, &CapturingConsole::new())
            .unwrap();
        assert_eq!(
            work.message(),
            "Message\n\nORIGINAL_AUTHOR=Foo Bar <foo@bar.com>\n"
        );
    }

    #[test]
    fn pair_reverses_into_each_other() {
        let restore = RestoreOriginalAuthor::new(LABEL);
        let save = restore.reverse().unwrap();
        assert_eq!(save, Transformation::SaveAuthor(SaveOriginalAuthor::new(LABEL)));
        assert_eq!(
            save.reverse().unwrap(),
            Transformation::RestoreAuthor(restore.clone())
        );
        assert_eq!(restore.describe(), "Restoring original author");
        assert_eq!(save.describe(), "Saving original author");
    }
}
