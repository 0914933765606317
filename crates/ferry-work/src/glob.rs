// glob.rs — Checkout path patterns.
//
// A Glob is a set of include patterns minus a set of exclude patterns, all
// relative to some directory (the checkout root by default). Matching uses
// `require_literal_separator`, so `*` stays within one path segment and `**`
// crosses directories:
//
//   "src/*.rs"     → matches "src/lib.rs", not "src/sub/mod.rs"
//   "src/**"       → matches everything under "src/"
//   "**"           → matches every path (see `Glob::all_files`)

use std::fmt;
use std::path::{Component, Path, PathBuf};

use glob::{MatchOptions, Pattern};

use crate::error::WorkError;

const ALL_FILES_PATTERN: &str = "**";

fn match_options() -> MatchOptions {
    MatchOptions {
        require_literal_separator: true,
        ..Default::default()
    }
}

/// An immutable set of path patterns.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Glob {
    include: Vec<Pattern>,
    exclude: Vec<Pattern>,
}

impl Glob {
    /// Compile a glob from include and exclude patterns.
    ///
    /// Patterns must be relative and must not climb out of their root with
    /// `..`.
    pub fn new<I, E, S, T>(include: I, exclude: E) -> Result<Self, WorkError>
    where
        I: IntoIterator<Item = S>,
        E: IntoIterator<Item = T>,
        S: AsRef<str>,
        T: AsRef<str>,
    {
        Ok(Self {
            include: compile_all(include)?,
            exclude: compile_all(exclude)?,
        })
    }

    /// The glob that matches every path.
    pub fn all_files() -> Self {
        Self {
            include: vec![Pattern::new(ALL_FILES_PATTERN).expect("'**' is a valid pattern")],
            exclude: Vec::new(),
        }
    }

    /// Whether this is exactly the [`Glob::all_files`] glob.
    pub fn is_all_files(&self) -> bool {
        self.exclude.is_empty()
            && self.include.len() == 1
            && self.include[0].as_str() == ALL_FILES_PATTERN
    }

    pub fn include(&self) -> impl Iterator<Item = &str> {
        self.include.iter().map(Pattern::as_str)
    }

    pub fn exclude(&self) -> impl Iterator<Item = &str> {
        self.exclude.iter().map(Pattern::as_str)
    }

    /// Match a `/`-separated path relative to the glob's root.
    pub fn matches(&self, relative: &str) -> bool {
        let opts = match_options();
        self.include.iter().any(|p| p.matches_with(relative, opts))
            && !self.exclude.iter().any(|p| p.matches_with(relative, opts))
    }

    /// Re-root this glob under `root`.
    ///
    /// The returned matcher takes full paths and only matches those inside
    /// `root` whose remainder matches the glob.
    pub fn relative_to(&self, root: impl Into<PathBuf>) -> GlobMatcher {
        GlobMatcher {
            root: root.into(),
            glob: self.clone(),
        }
    }
}

impl Default for Glob {
    fn default() -> Self {
        Self::all_files()
    }
}

impl fmt::Display for Glob {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let include: Vec<&str> = self.include().collect();
        write!(f, "glob(include = {:?}", include)?;
        if !self.exclude.is_empty() {
            let exclude: Vec<&str> = self.exclude().collect();
            write!(f, ", exclude = {:?}", exclude)?;
        }
        write!(f, ")")
    }
}

fn compile_all<I, S>(patterns: I) -> Result<Vec<Pattern>, WorkError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    patterns
        .into_iter()
        .map(|p| compile(p.as_ref()))
        .collect()
}

fn compile(pattern: &str) -> Result<Pattern, WorkError> {
    let invalid = |reason: &str| WorkError::InvalidGlob {
        pattern: pattern.to_string(),
        reason: reason.to_string(),
    };
    if pattern.is_empty() {
        return Err(invalid("pattern is empty"));
    }
    if pattern.starts_with('/') {
        return Err(invalid("pattern must be relative"));
    }
    if pattern.split('/').any(|segment| segment == "..") {
        return Err(invalid("pattern must not contain '..'"));
    }
    Pattern::new(pattern).map_err(|e| invalid(e.msg))
}

/// A [`Glob`] scoped under a directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GlobMatcher {
    root: PathBuf,
    glob: Glob,
}

impl GlobMatcher {
    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn glob(&self) -> &Glob {
        &self.glob
    }

    /// Whether `path` lies under the root and matches the glob.
    ///
    /// Paths outside the root never match. A path under the root that
    /// can't be rendered as UTF-8 is an error rather than a silent miss.
    pub fn matches(&self, path: &Path) -> Result<bool, WorkError> {
        let Ok(rel) = path.strip_prefix(&self.root) else {
            return Ok(false);
        };
        match to_slash_path(rel) {
            Some(rel) => Ok(self.glob.matches(&rel)),
            None => Err(WorkError::InvalidPath {
                path: path.display().to_string(),
                reason: format!("name can't be matched against {}: not valid UTF-8", self.glob),
            }),
        }
    }
}

/// Render a relative path with `/` separators. `None` for non-UTF-8 or
/// non-normal components.
pub(crate) fn to_slash_path(path: &Path) -> Option<String> {
    let mut parts = Vec::new();
    for component in path.components() {
        match component {
            Component::Normal(part) => parts.push(part.to_str()?),
            Component::CurDir => {}
            _ => return None,
        }
    }
    Some(parts.join("/"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_files_matches_everything() {
        let glob = Glob::all_files();
        assert!(glob.is_all_files());
        assert!(glob.matches("file.txt"));
        assert!(glob.matches("folder/subfolder/file.java"));
    }

    #[test]
    fn single_star_stays_in_segment() {
        let glob = Glob::new(["src/*.rs"], Vec::<String>::new()).unwrap();
        assert!(glob.matches("src/lib.rs"));
        assert!(!glob.matches("src/sub/mod.rs"));
        assert!(!glob.matches("tests/lib.rs"));
    }

    #[test]
    fn excludes_win_over_includes() {
        let glob = Glob::new(["src/**"], ["src/generated/**"]).unwrap();
        assert!(glob.matches("src/main.rs"));
        assert!(!glob.matches("src/generated/proto.rs"));
        assert!(!glob.is_all_files());
    }

    #[test]
    fn all_files_with_excludes_is_not_sentinel() {
        let glob = Glob::new(["**"], ["*.md"]).unwrap();
        assert!(!glob.is_all_files());
        assert!(!glob.matches("README.md"));
        assert!(glob.matches("docs/README.md"));
    }

    #[test]
    fn equal_patterns_are_equal_globs() {
        let a = Glob::new(["**"], Vec::<String>::new()).unwrap();
        assert_eq!(a, Glob::all_files());
        assert!(a.is_all_files());
    }

    #[test]
    fn invalid_patterns_rejected() {
        for bad in ["", "/abs/**", "../escape/**", "a/../b", "[unclosed"] {
            let result = Glob::new([bad], Vec::<String>::new());
            assert!(
                matches!(result, Err(WorkError::InvalidGlob { .. })),
                "expected '{}' to be rejected",
                bad
            );
        }
    }

    #[test]
    fn relative_to_scopes_under_root() {
        let glob = Glob::new(["*.java"], Vec::<String>::new()).unwrap();
        let matcher = glob.relative_to("/checkout/src");
        assert!(matcher.matches(Path::new("/checkout/src/Foo.java")).unwrap());
        assert!(!matcher.matches(Path::new("/checkout/src/pkg/Foo.java")).unwrap());
        assert!(!matcher.matches(Path::new("/checkout/Foo.java")).unwrap());
        assert!(!matcher.matches(Path::new("/checkout/other/Foo.java")).unwrap());
    }

    #[cfg(unix)]
    #[test]
    fn non_utf8_name_is_an_error() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let matcher = Glob::all_files().relative_to("/checkout");
        let name = OsStr::from_bytes(b"f\xff.txt");
        let err = matcher
            .matches(&Path::new("/checkout").join(name))
            .unwrap_err();
        assert!(matches!(err, WorkError::InvalidPath { .. }));
        assert!(err.to_string().contains("not valid UTF-8"));
    }

    #[test]
    fn display_lists_patterns() {
        let glob = Glob::new(["src/**"], ["src/gen/**"]).unwrap();
        assert_eq!(
            glob.to_string(),
            "glob(include = [\"src/**\"], exclude = [\"src/gen/**\"])"
        );
        assert_eq!(Glob::all_files().to_string(), "glob(include = [\"**\"])");
    }
}
