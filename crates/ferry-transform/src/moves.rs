// moves.rs — Move (rename) a file or directory inside the checkout.
//
// `before` and `after` are checkout-relative; the empty string is the
// checkout root, so `Move("", "third_party/foo")` pushes the whole tree one
// level down. When `before` is a directory an optional glob (relative to
// `before`) restricts which files move; the rest stay where they are.
//
// The move never overwrites: every destination is checked before the first
// rename, so a conflict leaves the checkout untouched.

use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::{Path, PathBuf};

use ferry_work::path::check_normalized_relative;
use ferry_work::{Console, Glob, GlobMatcher, TransformWork};

use crate::error::{Result, TransformError};
use crate::options::WorkflowOptions;
use crate::transformation::Transformation;

/// Moves `before` to `after`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Move {
    before: String,
    after: String,
    paths: Glob,
    options: WorkflowOptions,
}

/// One relocation planned by [`Move::transform`].
#[derive(Debug)]
enum Relocation {
    File { from: PathBuf, to: PathBuf },
    EmptyDir { from: PathBuf, to: PathBuf },
}

impl Relocation {
    fn source(&self) -> &Path {
        match self {
            Relocation::File { from, .. } | Relocation::EmptyDir { from, .. } => from,
        }
    }

    fn destination(&self) -> &Path {
        match self {
            Relocation::File { to, .. } | Relocation::EmptyDir { to, .. } => to,
        }
    }
}

impl Move {
    /// Build a move, rejecting paths that are absolute, not normalized or
    /// escape the checkout.
    pub fn new(
        before: &str,
        after: &str,
        paths: Glob,
        options: WorkflowOptions,
    ) -> Result<Self> {
        Ok(Self {
            before: check_normalized_relative(before)?.to_string(),
            after: check_normalized_relative(after)?.to_string(),
            paths,
            options,
        })
    }

    pub fn before(&self) -> &str {
        &self.before
    }

    pub fn after(&self) -> &str {
        &self.after
    }

    pub fn paths(&self) -> &Glob {
        &self.paths
    }

    pub fn transform(&self, work: &mut TransformWork, console: &dyn Console) -> Result<()> {
        console.progress(&self.describe());
        let checkout = work.checkout_dir().to_path_buf();
        let before = resolve(&checkout, &self.before);

        let Ok(before_meta) = fs::symlink_metadata(&before) else {
            return self.options.report_noop(
                console,
                &format!(
                    "Error moving '{}'. It doesn't exist in the workdir",
                    self.before
                ),
            );
        };
        let before_is_dir = before_meta.is_dir();
        let after = resolve(&checkout, &self.after);

        if is_real_dir(&after) && after.starts_with(&before) {
            // Moving a parent into one of its sub-directories: a non-empty
            // target is almost always a config mistake.
            verify_dir_is_empty(&checkout, &after)?;
        }

        if !self.paths.is_all_files() && !before_is_dir {
            return Err(TransformError::Validation(format!(
                "Cannot use user defined 'paths' filter when the 'before' is not a directory: {}",
                self.paths
            )));
        }

        let plan = if before_is_dir {
            let matcher = self.paths.relative_to(&before);
            let mut plan = Vec::new();
            plan_directory(&before, &before, &after, &matcher, &mut plan)?;
            if plan.is_empty() && self.paths.is_all_files() && before != checkout {
                // Nothing inside: the directory itself moves.
                plan.push(Relocation::EmptyDir {
                    from: before.clone(),
                    to: after.clone(),
                });
            }
            plan
        } else {
            vec![Relocation::File {
                from: before.clone(),
                to: after.clone(),
            }]
        };

        check_conflicts(&checkout, &plan)?;
        create_parent_dirs(&checkout, &after)?;
        let plan = order_relocations(plan);

        let mut touched = BTreeSet::new();
        for relocation in &plan {
            match relocation {
                Relocation::File { from, to } => {
                    create_dir_all(to.parent())?;
                    fs::rename(from, to).map_err(|source| TransformError::io(from, source))?;
                    tracing::debug!(from = %from.display(), to = %to.display(), "moved file");
                    if let Some(parent) = from.parent() {
                        touched.insert(parent.to_path_buf());
                    }
                }
                Relocation::EmptyDir { from, to } => {
                    if to.starts_with(from) || is_real_dir(to) {
                        fs::create_dir_all(to).map_err(|source| TransformError::io(to, source))?;
                        if !to.starts_with(from) {
                            fs::remove_dir(from)
                                .map_err(|source| TransformError::io(from, source))?;
                        }
                    } else {
                        create_dir_all(to.parent())?;
                        fs::rename(from, to).map_err(|source| TransformError::io(from, source))?;
                    }
                    tracing::debug!(from = %from.display(), to = %to.display(), "moved directory");
                    touched.insert(from.clone());
                }
            }
        }

        if before_is_dir {
            prune_empty_dirs(&checkout, &before, &after, touched)?;
        }

        tracing::info!(
            before = %self.before,
            after = %self.after,
            entries = plan.len(),
            "move complete"
        );
        Ok(())
    }

    /// The structural inverse: `after` back to `before`, same glob.
    ///
    /// A glob-filtered move only brings the same subset back.
    pub fn reverse(&self) -> Result<Transformation> {
        Ok(Transformation::Move(Move {
            before: self.after.clone(),
            after: self.before.clone(),
            paths: self.paths.clone(),
            options: self.options,
        }))
    }

    pub fn describe(&self) -> String {
        format!("Moving {}", self.before)
    }
}

fn resolve(checkout: &Path, relative: &str) -> PathBuf {
    if relative.is_empty() {
        checkout.to_path_buf()
    } else {
        checkout.join(relative)
    }
}

/// Path relative to the checkout, for error messages.
fn display_rel(checkout: &Path, path: &Path) -> String {
    path.strip_prefix(checkout)
        .unwrap_or(path)
        .display()
        .to_string()
}

fn is_real_dir(path: &Path) -> bool {
    fs::symlink_metadata(path)
        .map(|m| m.is_dir())
        .unwrap_or(false)
}

fn exists(path: &Path) -> bool {
    fs::symlink_metadata(path).is_ok()
}

fn verify_dir_is_empty(checkout: &Path, dir: &Path) -> Result<()> {
    let mut entries = fs::read_dir(dir).map_err(|source| TransformError::io(dir, source))?;
    if let Some(entry) = entries.next() {
        let entry = entry.map_err(|source| TransformError::io(dir, source))?;
        return Err(TransformError::Validation(format!(
            "Files already exist in {}: {}",
            display_rel(checkout, dir),
            display_rel(checkout, &entry.path())
        )));
    }
    Ok(())
}

/// First existing non-directory among the ancestors of `target` below
/// `checkout` (`target` itself excluded).
fn blocking_ancestor(checkout: &Path, target: &Path) -> Option<PathBuf> {
    let rel = target.strip_prefix(checkout).ok()?;
    let mut current = checkout.to_path_buf();
    let components: Vec<_> = rel.components().collect();
    let parents = components.len().saturating_sub(1);
    for component in &components[..parents] {
        current.push(component);
        match fs::symlink_metadata(&current) {
            Ok(meta) if !meta.is_dir() => return Some(current),
            Ok(_) => {}
            Err(_) => return None,
        }
    }
    None
}

fn create_parent_dirs(checkout: &Path, after: &Path) -> Result<()> {
    if after == checkout {
        return Ok(());
    }
    if let Some(blocker) = blocking_ancestor(checkout, after) {
        let parent = after.parent().unwrap_or(checkout);
        return Err(TransformError::Validation(format!(
            "Cannot create '{}' because '{}' already exists and is not a directory",
            display_rel(checkout, parent),
            display_rel(checkout, &blocker)
        )));
    }
    create_dir_all(after.parent())
}

fn create_dir_all(dir: Option<&Path>) -> Result<()> {
    match dir {
        Some(dir) => fs::create_dir_all(dir).map_err(|source| TransformError::io(dir, source)),
        None => Ok(()),
    }
}

/// Collect everything under `dir` that should move, skipping the `after`
/// subtree.
///
/// With the all-files glob every entry moves, empty directories included.
/// A filtered move fails on names the glob can't be applied to.
fn plan_directory(
    dir: &Path,
    before: &Path,
    after: &Path,
    matcher: &GlobMatcher,
    plan: &mut Vec<Relocation>,
) -> Result<()> {
    let all_files = matcher.glob().is_all_files();
    let mut entries = fs::read_dir(dir)
        .map_err(|source| TransformError::io(dir, source))?
        .collect::<std::io::Result<Vec<_>>>()
        .map_err(|source| TransformError::io(dir, source))?;
    entries.sort_by_key(|e| e.file_name());

    for entry in entries {
        let path = entry.path();
        if path == after {
            continue;
        }
        let file_type = entry
            .file_type()
            .map_err(|source| TransformError::io(&path, source))?;
        let destination = match path.strip_prefix(before) {
            Ok(rel) => after.join(rel),
            Err(_) => continue,
        };

        if file_type.is_dir() {
            let is_empty = fs::read_dir(&path)
                .map_err(|source| TransformError::io(&path, source))?
                .next()
                .is_none();
            if is_empty && all_files && !after.starts_with(&path) {
                plan.push(Relocation::EmptyDir {
                    from: path,
                    to: destination,
                });
            } else {
                plan_directory(&path, before, after, matcher, plan)?;
            }
        } else if all_files || matcher.matches(&path)? {
            plan.push(Relocation::File {
                from: path,
                to: destination,
            });
        }
    }
    Ok(())
}

/// Fail if any destination already exists or sits under a non-directory.
///
/// A destination occupied by another planned source isn't a conflict: that
/// source is vacated first (see [`order_relocations`]).
fn check_conflicts(checkout: &Path, plan: &[Relocation]) -> Result<()> {
    let sources: BTreeSet<&Path> = plan.iter().map(Relocation::source).collect();
    for relocation in plan {
        let to = match relocation {
            Relocation::File { to, .. } => to,
            Relocation::EmptyDir { to, .. } => {
                if is_real_dir(to) {
                    continue;
                }
                to
            }
        };
        if exists(to) && !sources.contains(to.as_path()) {
            return Err(TransformError::Validation(format!(
                "Cannot move file to '{}' because it already exists",
                display_rel(checkout, to)
            )));
        }
        if let Some(blocker) = blocking_ancestor(checkout, to)
            .filter(|blocker| !sources.contains(blocker.as_path()))
        {
            return Err(TransformError::Validation(format!(
                "Cannot move file to '{}' because '{}' already exists and is not a directory",
                display_rel(checkout, to),
                display_rel(checkout, &blocker)
            )));
        }
    }
    Ok(())
}

/// Order renames so that no destination is still occupied by a pending
/// source, e.g. `a/b/x -> a/x` before `a/b/b/x -> a/b/x`.
///
/// Sources are files or empty directories, so at most one of them sits at
/// or above any destination. Each relocation runs after that one.
fn order_relocations(plan: Vec<Relocation>) -> Vec<Relocation> {
    let order = {
        let by_source: BTreeMap<&Path, usize> = plan
            .iter()
            .enumerate()
            .map(|(idx, r)| (r.source(), idx))
            .collect();
        let blocker: Vec<Option<usize>> = plan
            .iter()
            .enumerate()
            .map(|(idx, r)| {
                r.destination()
                    .ancestors()
                    .find_map(|p| by_source.get(p).copied().filter(|&other| other != idx))
            })
            .collect();

        let mut done = vec![false; plan.len()];
        let mut order = Vec::with_capacity(plan.len());
        for start in 0..plan.len() {
            let mut chain = Vec::new();
            let mut next = Some(start);
            while let Some(idx) = next {
                if done[idx] {
                    break;
                }
                done[idx] = true;
                chain.push(idx);
                next = blocker[idx];
            }
            order.extend(chain.into_iter().rev());
        }
        order
    };

    let mut slots: Vec<Option<Relocation>> = plan.into_iter().map(Some).collect();
    order
        .into_iter()
        .filter_map(|idx| slots[idx].take())
        .collect()
}

/// Remove directories the move left empty, deepest first.
///
/// Walks up from every directory a file left, stopping at `before`. The
/// checkout root, `after` and its ancestors are never removed.
fn prune_empty_dirs(
    checkout: &Path,
    before: &Path,
    after: &Path,
    touched: BTreeSet<PathBuf>,
) -> Result<()> {
    let mut candidates = BTreeSet::new();
    for dir in touched {
        let mut current = Some(dir.as_path());
        while let Some(ancestor) = current {
            if !ancestor.starts_with(before) {
                break;
            }
            candidates.insert(ancestor.to_path_buf());
            if ancestor == before {
                break;
            }
            current = ancestor.parent();
        }
    }

    let mut ordered: Vec<PathBuf> = candidates.into_iter().collect();
    ordered.sort_by_key(|dir| std::cmp::Reverse(dir.components().count()));

    for dir in ordered {
        if dir == checkout || after.starts_with(&dir) || !is_real_dir(&dir) {
            continue;
        }
        let is_empty = fs::read_dir(&dir)
            .map_err(|source| TransformError::io(&dir, source))?
            .next()
            .is_none();
        if is_empty {
            fs::remove_dir(&dir).map_err(|source| TransformError::io(&dir, source))?;
        }
    }
    Ok(())
}
