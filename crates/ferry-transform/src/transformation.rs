// transformation.rs — The transformation contract.
//
// Every mutation Ferry can apply to a work context is a variant of
// `Transformation`. Each supports three operations:
//
//   transform: mutate the checkout and/or the work context
//   reverse:   build the semantic inverse as a new value (or fail with
//              NonReversible when there is none)
//   describe:  a short label for progress output
//
// Transformations hold only their construction-time configuration, so the
// same value can be applied to any number of changes.

use ferry_work::{Console, TransformWork};

use crate::error::{Result, TransformError};
use crate::metadata::{RestoreOriginalAuthor, SaveOriginalAuthor};
use crate::moves::Move;
use crate::scripted::Scripted;

/// A reversible, describable mutation of a [`TransformWork`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transformation {
    /// Rename a file or directory in the checkout.
    Move(Move),
    /// Run a function supplied by a scripting engine.
    Scripted(Scripted),
    /// Set the author from a label on the source changes.
    RestoreAuthor(RestoreOriginalAuthor),
    /// Store the author in a message label.
    SaveAuthor(SaveOriginalAuthor),
    /// A forward transformation paired with an independently supplied reverse.
    Explicit(ExplicitReversal),
    /// Deliberately does nothing. Its own reverse.
    Noop,
    /// Several transformations applied in order.
    Sequence(Sequence),
}

impl Transformation {
    /// Pair `forward` with a hand-written `reverse`.
    pub fn explicit(forward: Transformation, reverse: Transformation) -> Self {
        Transformation::Explicit(ExplicitReversal {
            forward: Box::new(forward),
            reverse: Box::new(reverse),
        })
    }

    /// Does nothing going forward; runs `reverse` when reversed.
    pub fn reverse_only(reverse: Transformation) -> Self {
        Self::explicit(Transformation::Noop, reverse)
    }

    /// Runs `forward` going forward; does nothing when reversed.
    pub fn forward_only(forward: Transformation) -> Self {
        Self::explicit(forward, Transformation::Noop)
    }

    pub fn sequence(steps: Vec<Transformation>) -> Self {
        Transformation::Sequence(Sequence { steps })
    }

    pub fn transform(&self, work: &mut TransformWork, console: &dyn Console) -> Result<()> {
        match self {
            Transformation::Move(t) => t.transform(work, console),
            Transformation::Scripted(t) => t.transform(work, console),
            Transformation::RestoreAuthor(t) => t.transform(work, console),
            Transformation::SaveAuthor(t) => t.transform(work, console),
            Transformation::Explicit(t) => t.forward.transform(work, console),
            Transformation::Noop => Ok(()),
            Transformation::Sequence(t) => t.transform(work, console),
        }
    }

    /// Build the inverse transformation. The receiver is left untouched.
    pub fn reverse(&self) -> Result<Transformation> {
        match self {
            Transformation::Move(t) => t.reverse(),
            Transformation::Scripted(t) => t.reverse(),
            Transformation::RestoreAuthor(t) => t.reverse(),
            Transformation::SaveAuthor(t) => t.reverse(),
            Transformation::Explicit(t) => Ok(Transformation::Explicit(ExplicitReversal {
                forward: t.reverse.clone(),
                reverse: t.forward.clone(),
            })),
            Transformation::Noop => Ok(Transformation::Noop),
            Transformation::Sequence(t) => t.reverse(),
        }
    }

    pub fn describe(&self) -> String {
        match self {
            Transformation::Move(t) => t.describe(),
            Transformation::Scripted(t) => t.describe(),
            Transformation::RestoreAuthor(t) => t.describe(),
            Transformation::SaveAuthor(t) => t.describe(),
            Transformation::Explicit(t) => match (&*t.forward, &*t.reverse) {
                (Transformation::Noop, Transformation::Noop) => "noop".to_string(),
                (Transformation::Noop, reverse) => format!("noop (reverse: {})", reverse.describe()),
                (forward, _) => forward.describe(),
            },
            Transformation::Noop => "noop".to_string(),
            Transformation::Sequence(t) => t.describe(),
        }
    }
}

impl From<Move> for Transformation {
    fn from(t: Move) -> Self {
        Transformation::Move(t)
    }
}

impl From<Scripted> for Transformation {
    fn from(t: Scripted) -> Self {
        Transformation::Scripted(t)
    }
}

impl From<RestoreOriginalAuthor> for Transformation {
    fn from(t: RestoreOriginalAuthor) -> Self {
        Transformation::RestoreAuthor(t)
    }
}

impl From<SaveOriginalAuthor> for Transformation {
    fn from(t: SaveOriginalAuthor) -> Self {
        Transformation::SaveAuthor(t)
    }
}

/// See [`Transformation::explicit`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExplicitReversal {
    forward: Box<Transformation>,
    reverse: Box<Transformation>,
}

impl ExplicitReversal {
    pub fn forward(&self) -> &Transformation {
        &self.forward
    }

    pub fn reverse(&self) -> &Transformation {
        &self.reverse
    }
}

/// An ordered list of transformations.
///
/// Steps run one at a time; the first error stops the sequence and is
/// returned unchanged, so a cancellation inside any step still reaches the
/// caller as a cancellation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Sequence {
    steps: Vec<Transformation>,
}

impl Sequence {
    pub fn new(steps: Vec<Transformation>) -> Self {
        Self { steps }
    }

    pub fn steps(&self) -> &[Transformation] {
        &self.steps
    }

    pub fn transform(&self, work: &mut TransformWork, console: &dyn Console) -> Result<()> {
        let total = self.steps.len();
        for (idx, step) in self.steps.iter().enumerate() {
            let description = step.describe();
            console.progress(&format!("[{}/{}] Transform {}", idx + 1, total, description));
            if let Err(e) = step.transform(work, console) {
                if e.is_fatal() {
                    tracing::error!(step = %description, "transformation cancelled");
                } else {
                    tracing::debug!(step = %description, error = %e, "transformation failed");
                }
                return Err(e);
            }
        }
        Ok(())
    }

    /// Reverse every step and apply them in the opposite order.
    pub fn reverse(&self) -> Result<Transformation> {
        let steps = self
            .steps
            .iter()
            .rev()
            .map(Transformation::reverse)
            .collect::<Result<Vec<_>>>()?;
        Ok(Transformation::Sequence(Sequence { steps }))
    }

    pub fn describe(&self) -> String {
        "sequence".to_string()
    }
}

impl From<Vec<Transformation>> for Sequence {
    fn from(steps: Vec<Transformation>) -> Self {
        Self { steps }
    }
}

/// Reverse a whole pipeline, failing if any step is one-directional.
pub fn reverse_all(steps: &[Transformation]) -> Result<Vec<Transformation>> {
    steps
        .iter()
        .rev()
        .map(|step| {
            step.reverse().map_err(|e| match e {
                TransformError::NonReversible(reason) => TransformError::NonReversible(format!(
                    "cannot reverse '{}': {}",
                    step.describe(),
                    reason
                )),
                other => other,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scripted::ScriptError;
    use ferry_work::{Author, CapturingConsole};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn work() -> TransformWork {
        TransformWork::new("/checkout", "Message", Author::new("Foo", "foo@bar.com"))
    }

    fn label(key: &'static str) -> Transformation {
        Transformation::Scripted(Scripted::from_fn(key, move |work| {
            work.add_label(key, "x");
            Ok(None)
        }))
    }

    #[test]
    fn noop_is_its_own_reverse() {
        let mut work = work();
        Transformation::Noop
            .transform(&mut work, &CapturingConsole::new())
            .unwrap();
        assert_eq!(work.message(), "Message");
        assert_eq!(Transformation::Noop.reverse().unwrap(), Transformation::Noop);
        assert_eq!(Transformation::Noop.describe(), "noop");
    }

    #[test]
    fn reverse_only_does_nothing_forward() {
        let pair = Transformation::reverse_only(label("BACK"));
        assert_eq!(pair.describe(), "noop (reverse: BACK)");
        let mut work = work();
        pair.transform(&mut work, &CapturingConsole::new()).unwrap();
        assert_eq!(work.message(), "Message");

        pair.reverse()
            .unwrap()
            .transform(&mut work, &CapturingConsole::new())
            .unwrap();
        assert_eq!(work.get_label("BACK").as_deref(), Some("x"));
    }

    #[test]
    fn forward_only_reverses_to_noop_forward() {
        let pair = Transformation::forward_only(label("FWD"));
        assert_eq!(pair.describe(), "FWD");
        let reversed = pair.reverse().unwrap();
        assert_eq!(reversed.describe(), "noop (reverse: FWD)");
        assert_eq!(reversed.reverse().unwrap(), pair);
    }

    #[test]
    fn sequence_runs_in_order_with_progress() {
        let seq = Transformation::sequence(vec![label("A"), label("B")]);
        let console = CapturingConsole::new();
        let mut work = work();
        seq.transform(&mut work, &console).unwrap();

        assert_eq!(work.message(), "Message\n\nA=x\nB=x\n");
        assert_eq!(
            console.progress_messages(),
            vec!["[1/2] Transform A".to_string(), "[2/2] Transform B".to_string()]
        );
    }

    #[test]
    fn reverse_only_step_names_its_reverse_in_progress() {
        let seq = Transformation::sequence(vec![Transformation::reverse_only(label("BACK"))]);
        let console = CapturingConsole::new();
        seq.transform(&mut work(), &console).unwrap();
        assert_eq!(
            console.progress_messages(),
            vec!["[1/1] Transform noop (reverse: BACK)".to_string()]
        );
    }

    #[test]
    fn sequence_reverse_reverses_order() {
        let a = Transformation::forward_only(label("A"));
        let b = Transformation::forward_only(label("B"));
        let seq = Transformation::sequence(vec![a.clone(), b.clone()]);
        assert_eq!(
            seq.reverse().unwrap(),
            Transformation::sequence(vec![b.reverse().unwrap(), a.reverse().unwrap()])
        );
    }

    #[test]
    fn sequence_reverse_fails_on_one_directional_step() {
        let seq = Transformation::sequence(vec![Transformation::Noop, label("A")]);
        assert!(matches!(
            seq.reverse(),
            Err(TransformError::NonReversible(_))
        ));
    }

    #[test]
    fn cancellation_stops_sequence() {
        let ran = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&ran);
        let seq = Transformation::sequence(vec![
            Transformation::Scripted(Scripted::from_fn("interrupted", |_| {
                Err(ScriptError::Interrupted)
            })),
            Transformation::Scripted(Scripted::from_fn("after", move |_| {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok(None)
            })),
        ]);

        let err = seq
            .transform(&mut work(), &CapturingConsole::new())
            .unwrap_err();
        assert!(matches!(err, TransformError::Cancelled { ref name } if name == "interrupted"));
        assert_eq!(ran.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn reverse_all_names_failing_step() {
        let steps = vec![Transformation::Noop, label("SCRIPT")];
        let err = reverse_all(&steps).unwrap_err();
        assert!(err.to_string().contains("cannot reverse 'SCRIPT'"));
    }
}
