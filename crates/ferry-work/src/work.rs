// work.rs — The per-change work context.
//
// A TransformWork is created once per migrated change and handed to each
// transformation in turn. Transformations mutate it in place through
// `&mut`, so a sequence of them runs strictly one after the other. When the
// last one finishes the destination reads the final message, author and
// checkout contents.

use std::fs;
use std::path::{Path, PathBuf};

use crate::author::Author;
use crate::change::Changes;
use crate::error::WorkError;
use crate::glob::{to_slash_path, Glob};
use crate::labels;
use crate::path::CheckoutPath;

/// Mutable state for one change going through the transformation pipeline.
#[derive(Debug, Clone)]
pub struct TransformWork {
    /// Root of the checkout; every relative path resolves against it.
    checkout_dir: PathBuf,

    /// Change message, including its label footer.
    message: String,

    author: Author,

    /// Origin changes folded into this migration.
    changes: Changes,
}

impl TransformWork {
    pub fn new(checkout_dir: impl Into<PathBuf>, message: impl Into<String>, author: Author) -> Self {
        Self {
            checkout_dir: checkout_dir.into(),
            message: message.into(),
            author,
            changes: Changes::default(),
        }
    }

    pub fn with_changes(mut self, changes: Changes) -> Self {
        self.changes = changes;
        self
    }

    pub fn checkout_dir(&self) -> &Path {
        &self.checkout_dir
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn set_message(&mut self, message: impl Into<String>) {
        self.message = message.into();
    }

    pub fn author(&self) -> &Author {
        &self.author
    }

    pub fn set_author(&mut self, author: Author) {
        tracing::debug!(from = %self.author, to = %author, "changing author");
        self.author = author;
    }

    pub fn changes(&self) -> &Changes {
        &self.changes
    }

    // ── Labels ──────────────────────────────────────────────────

    /// First value of `key` in the message footer.
    pub fn get_label(&self, key: &str) -> Option<String> {
        labels::get_label(&self.message, key)
    }

    /// All footer labels, in order.
    pub fn labels(&self) -> Vec<(String, String)> {
        labels::parse_labels(&self.message)
    }

    /// Append a label to the footer. Existing entries for `key` are kept.
    pub fn add_label(&mut self, key: &str, value: &str) {
        self.message = labels::add_label(&self.message, key, value);
    }

    /// Rewrite the first `key` entry. No-op if absent.
    pub fn replace_label(&mut self, key: &str, value: &str) {
        self.message = labels::replace_label(&self.message, key, value);
    }

    /// Delete the first `key` entry. No-op if absent.
    pub fn remove_label(&mut self, key: &str) {
        self.message = labels::remove_label(&self.message, key);
    }

    pub fn add_or_replace_label(&mut self, key: &str, value: &str) {
        self.message = labels::add_or_replace_label(&self.message, key, value);
    }

    // ── Checkout paths ──────────────────────────────────────────

    /// Build a checkout path. Fails if `relative` is absolute, not
    /// normalized, or escapes the checkout.
    pub fn new_path(&self, relative: &str) -> Result<CheckoutPath, WorkError> {
        CheckoutPath::new(relative)
    }

    /// Absolute location of a checkout path.
    pub fn resolve(&self, path: &CheckoutPath) -> PathBuf {
        path.under(&self.checkout_dir)
    }

    /// Every file in the checkout whose relative path matches `glob`,
    /// sorted lexicographically.
    ///
    /// Symlinks are listed as files and never followed.
    pub fn run(&self, glob: &Glob) -> Result<Vec<CheckoutPath>, WorkError> {
        let mut files = Vec::new();
        walk_dir(&self.checkout_dir, &self.checkout_dir, &mut files)?;
        let mut matched: Vec<CheckoutPath> = files
            .into_iter()
            .filter(|rel| glob.matches(rel))
            .map(|rel| CheckoutPath::new(&rel))
            .collect::<Result<_, _>>()?;
        matched.sort();
        Ok(matched)
    }
}

/// Recursively walk a directory and collect `/`-separated relative file paths.
fn walk_dir(dir: &Path, root: &Path, files: &mut Vec<String>) -> Result<(), WorkError> {
    if !dir.exists() {
        return Ok(());
    }

    let entries = fs::read_dir(dir).map_err(|source| WorkError::io(dir, source))?;

    for entry in entries {
        let entry = entry.map_err(|source| WorkError::io(dir, source))?;
        let path = entry.path();
        let file_type = entry
            .file_type()
            .map_err(|source| WorkError::io(&path, source))?;

        if file_type.is_dir() {
            walk_dir(&path, root, files)?;
        } else if let Some(rel) = path.strip_prefix(root).ok().and_then(to_slash_path) {
            files.push(rel);
        } else {
            tracing::warn!(path = %path.display(), "skipping path that is not valid UTF-8");
        }
    }

    Ok(())
}
