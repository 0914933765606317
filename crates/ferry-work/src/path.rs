// path.rs — Checkout-relative paths.
//
// Transformations address files by their path relative to the checkout
// root. Those paths are always normalized: no leading `/`, no `.`/`..`
// segments, no empty segments. The empty string is the checkout root.

use std::fmt;
use std::path::{Path, PathBuf};

use crate::error::WorkError;

/// Check that `path` is a normalized relative path that stays inside its root.
///
/// Returns the path unchanged on success so it can be used inline.
pub fn check_normalized_relative(path: &str) -> Result<&str, WorkError> {
    let invalid = |reason: &str| WorkError::InvalidPath {
        path: path.to_string(),
        reason: reason.to_string(),
    };
    if path.is_empty() {
        return Ok(path);
    }
    if path.starts_with('/') || Path::new(path).is_absolute() {
        return Err(invalid("path must be relative"));
    }
    for segment in path.split('/') {
        match segment {
            ".." => return Err(invalid("path escapes the checkout")),
            "" | "." => return Err(invalid("path is not normalized")),
            _ => {}
        }
    }
    Ok(path)
}

/// A validated path relative to the checkout root.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CheckoutPath {
    relative: String,
}

impl CheckoutPath {
    pub fn new(relative: &str) -> Result<Self, WorkError> {
        check_normalized_relative(relative)?;
        Ok(Self {
            relative: relative.to_string(),
        })
    }

    /// The checkout root itself.
    pub fn root() -> Self {
        Self {
            relative: String::new(),
        }
    }

    pub fn is_root(&self) -> bool {
        self.relative.is_empty()
    }

    /// The checkout-relative path, `/`-separated. Empty for the root.
    pub fn path(&self) -> &str {
        &self.relative
    }

    /// The last segment of the path.
    pub fn name(&self) -> &str {
        match self.relative.rsplit_once('/') {
            Some((_, name)) => name,
            None => &self.relative,
        }
    }

    /// The containing directory.
    ///
    /// A top-level entry's parent is the root; the root has no parent, and
    /// neither does anything past it.
    pub fn parent(&self) -> Option<CheckoutPath> {
        if self.is_root() {
            return None;
        }
        let parent = match self.relative.rsplit_once('/') {
            Some((parent, _)) => parent.to_string(),
            None => String::new(),
        };
        Some(Self { relative: parent })
    }

    /// A path below this one.
    pub fn resolve(&self, child: &str) -> Result<CheckoutPath, WorkError> {
        check_normalized_relative(child)?;
        if child.is_empty() {
            return Ok(self.clone());
        }
        if self.is_root() {
            return CheckoutPath::new(child);
        }
        CheckoutPath::new(&format!("{}/{}", self.relative, child))
    }

    /// Replace the last segment with `name`.
    pub fn resolve_sibling(&self, name: &str) -> Result<CheckoutPath, WorkError> {
        match self.parent() {
            Some(parent) => parent.resolve(name),
            None => Err(WorkError::InvalidPath {
                path: name.to_string(),
                reason: "the checkout root has no siblings".to_string(),
            }),
        }
    }

    /// Absolute location of this path inside `checkout_dir`.
    pub fn under(&self, checkout_dir: &Path) -> PathBuf {
        if self.is_root() {
            checkout_dir.to_path_buf()
        } else {
            checkout_dir.join(&self.relative)
        }
    }
}

impl fmt::Display for CheckoutPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.relative)
    }
}

impl AsRef<str> for CheckoutPath {
    fn as_ref(&self) -> &str {
        &self.relative
    }
}
