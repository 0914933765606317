// author.rs — Change author identity.
//
// Authors are stored in labels and config as `Name <email>`. The email part
// may be empty (`Name <>`) since some origins don't record one.

use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::WorkError;

fn author_regex() -> &'static Regex {
    static AUTHOR: OnceLock<Regex> = OnceLock::new();
    AUTHOR.get_or_init(|| {
        Regex::new(r"^(?P<name>[^<]+)<(?P<email>[^>]*)>$").expect("author regex is valid")
    })
}

/// The author of a change: a display name plus a contact address.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Author {
    pub name: String,
    pub email: String,
}

impl Author {
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
        }
    }

    /// Parse an author from its `Name <email>` form.
    pub fn parse(value: &str) -> Result<Self, WorkError> {
        let invalid = || WorkError::InvalidAuthor {
            value: value.to_string(),
        };
        let caps = author_regex().captures(value.trim()).ok_or_else(invalid)?;
        let name = caps["name"].trim();
        if name.is_empty() {
            return Err(invalid());
        }
        Ok(Self::new(name, caps["email"].trim()))
    }
}

impl fmt::Display for Author {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} <{}>", self.name, self.email)
    }
}

impl FromStr for Author {
    type Err = WorkError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Author::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_name_and_email() {
        let author = Author::parse("Foo Bar <foo@bar.com>").unwrap();
        assert_eq!(author, Author::new("Foo Bar", "foo@bar.com"));
    }

    #[test]
    fn parse_allows_empty_email() {
        let author = Author::parse("Foo Bar <>").unwrap();
        assert_eq!(author.name, "Foo Bar");
        assert_eq!(author.email, "");
    }

    #[test]
    fn parse_rejects_missing_brackets() {
        assert!(matches!(
            Author::parse("foo@bar.com"),
            Err(WorkError::InvalidAuthor { .. })
        ));
    }

    #[test]
    fn parse_rejects_missing_name() {
        assert!(Author::parse("<foo@bar.com>").is_err());
        assert!(Author::parse("  <foo@bar.com>").is_err());
    }

    #[test]
    fn display_matches_parse_format() {
        let author = Author::new("Foo Bar", "foo@bar.com");
        assert_eq!(author.to_string(), "Foo Bar <foo@bar.com>");
        assert_eq!(author.to_string().parse::<Author>().unwrap(), author);
    }
}
