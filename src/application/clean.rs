//! Removal of user-level installs of the package family.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use anyhow::Result;
use log::{debug, info, warn};

use crate::package::{PACKAGE_PREFIX, PackageName};
use crate::runtime::Runtime;
use crate::runtime::path::split_search_path;

/// Paths [`removal_candidates`] found, split by origin for display.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct RemovalCandidates {
    /// Entries of the user site directory.
    pub site_entries: BTreeSet<PathBuf>,
    /// Scripts on `PATH` owned by the current user.
    pub executables: BTreeSet<PathBuf>,
}

impl RemovalCandidates {
    pub fn is_empty(&self) -> bool {
        self.site_entries.is_empty() && self.executables.is_empty()
    }

    pub fn len(&self) -> usize {
        self.site_entries.len() + self.executables.len()
    }

    /// All candidates, deduplicated and sorted.
    pub fn all(&self) -> BTreeSet<PathBuf> {
        self.site_entries
            .union(&self.executables)
            .cloned()
            .collect()
    }
}

#[derive(Debug, Default)]
pub struct RemovalReport {
    pub removed: Vec<PathBuf>,
    pub failed: Vec<(PathBuf, anyhow::Error)>,
}

/// Collect everything `clean` would delete. Nothing is touched.
///
/// A site entry matches when its name contains a package name in underscore
/// or hyphen form (`esm_parser-6.21.0.dist-info`, `esm-parser.egg-link`).
#[tracing::instrument(skip(runtime, packages))]
pub fn removal_candidates<R: Runtime>(
    runtime: &R,
    user_site: &Path,
    packages: &[PackageName],
) -> RemovalCandidates {
    let mut candidates = RemovalCandidates::default();

    if runtime.is_dir(user_site) {
        match runtime.read_dir(user_site) {
            Ok(entries) => {
                candidates.site_entries = entries
                    .into_iter()
                    .filter(|entry| matches_package(entry, packages))
                    .collect();
            }
            Err(e) => warn!("Cannot list {}: {:#}", user_site.display(), e),
        }
    } else {
        debug!("User site {:?} does not exist", user_site);
    }

    let search_path = runtime.env_var("PATH").unwrap_or_default();
    for dir in split_search_path(&search_path) {
        if !runtime.is_dir(&dir) {
            continue;
        }
        let entries = match runtime.read_dir(&dir) {
            Ok(entries) => entries,
            Err(e) => {
                debug!("Skipping {:?}: {:#}", dir, e);
                continue;
            }
        };
        candidates.executables.extend(entries.into_iter().filter(|entry| {
            has_prefix(entry) && runtime.is_file(entry) && runtime.is_owned_by_current_user(entry)
        }));
    }

    candidates
}

/// Delete `paths`, calling `before_remove` right before each one.
///
/// A failure is recorded and the remaining paths are still attempted.
pub fn remove_paths<R: Runtime>(
    runtime: &R,
    paths: &BTreeSet<PathBuf>,
    mut before_remove: impl FnMut(&Path),
) -> RemovalReport {
    let mut report = RemovalReport::default();
    for path in paths {
        before_remove(path);
        info!("Removing {}", path.display());
        match remove_path(runtime, path) {
            Ok(()) => report.removed.push(path.clone()),
            Err(e) => {
                warn!("Failed to remove {}: {:#}", path.display(), e);
                report.failed.push((path.clone(), e));
            }
        }
    }
    report
}

fn remove_path<R: Runtime>(runtime: &R, path: &Path) -> Result<()> {
    if runtime.is_dir(path) {
        runtime.remove_dir_all(path)
    } else {
        runtime.remove_file(path)
    }
}

fn file_name(path: &Path) -> Option<&str> {
    path.file_name().and_then(|n| n.to_str())
}

fn matches_package(path: &Path, packages: &[PackageName]) -> bool {
    let Some(name) = file_name(path) else {
        return false;
    };
    packages
        .iter()
        .any(|p| name.contains(p.as_str()) || name.contains(&p.distribution_name()))
}

fn has_prefix(path: &Path) -> bool {
    file_name(path).is_some_and(|n| n.starts_with(PACKAGE_PREFIX))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::{MockRuntime, RealRuntime};
    use mockall::predicate::eq;
    use std::fs;
    use tempfile::tempdir;

    const SITE: &str = "/home/user/.local/lib/python3.11/site-packages";

    fn tracked() -> Vec<PackageName> {
        PackageName::tracked()
    }

    #[test]
    fn test_candidates_from_user_site_and_path() {
        let mut runtime = MockRuntime::new();
        runtime
            .expect_is_dir()
            .returning(|p| p == Path::new(SITE) || p == Path::new("/home/user/.local/bin"));
        runtime
            .expect_read_dir()
            .with(eq(PathBuf::from(SITE)))
            .returning(|_| {
                Ok(vec![
                    PathBuf::from(format!("{}/esm_parser", SITE)),
                    PathBuf::from(format!("{}/esm_parser-6.21.0.dist-info", SITE)),
                    PathBuf::from(format!("{}/esm-master.egg-link", SITE)),
                    PathBuf::from(format!("{}/numpy", SITE)),
                ])
            });
        runtime
            .expect_read_dir()
            .with(eq(PathBuf::from("/home/user/.local/bin")))
            .returning(|_| {
                Ok(vec![
                    PathBuf::from("/home/user/.local/bin/esm_master"),
                    PathBuf::from("/home/user/.local/bin/esm_runscripts"),
                    PathBuf::from("/home/user/.local/bin/pip"),
                    PathBuf::from("/home/user/.local/bin/esm_shared"),
                ])
            });
        runtime
            .expect_env_var()
            .with(eq("PATH"))
            .returning(|_| Ok("/home/user/.local/bin:/nonexistent".into()));
        runtime.expect_is_file().returning(|_| true);
        runtime
            .expect_is_owned_by_current_user()
            .returning(|p| !p.ends_with("esm_shared"));

        let candidates = removal_candidates(&runtime, Path::new(SITE), &tracked());

        assert_eq!(candidates.site_entries.len(), 3);
        assert!(!candidates.site_entries.contains(Path::new(&format!("{}/numpy", SITE))));
        assert_eq!(
            candidates.executables,
            BTreeSet::from([
                PathBuf::from("/home/user/.local/bin/esm_master"),
                PathBuf::from("/home/user/.local/bin/esm_runscripts"),
            ])
        );
        assert_eq!(candidates.len(), 5);
    }

    #[test]
    fn test_candidates_without_user_site_or_path() {
        let mut runtime = MockRuntime::new();
        runtime.expect_is_dir().returning(|_| false);
        runtime
            .expect_env_var()
            .returning(|_| Err(std::env::VarError::NotPresent));

        let candidates = removal_candidates(&runtime, Path::new(SITE), &tracked());
        assert!(candidates.is_empty());
    }

    #[test]
    fn test_remove_paths_continues_after_failure() {
        let dir = tempdir().unwrap();
        let package_dir = dir.path().join("esm_parser");
        fs::create_dir_all(package_dir.join("sub")).unwrap();
        fs::write(package_dir.join("sub/__init__.py"), "").unwrap();
        let script = dir.path().join("esm_master");
        fs::write(&script, "#!/bin/sh\n").unwrap();
        let missing = dir.path().join("esm_calendar.egg-link");

        let paths = BTreeSet::from([package_dir.clone(), script.clone(), missing.clone()]);
        let mut announced = Vec::new();
        let report = remove_paths(&RealRuntime, &paths, |p| announced.push(p.to_path_buf()));

        assert_eq!(announced.len(), 3);
        assert_eq!(report.removed.len(), 2);
        assert_eq!(report.failed.len(), 1);
        assert_eq!(report.failed[0].0, missing);
        assert!(!package_dir.exists());
        assert!(!script.exists());
    }

    #[test]
    fn test_matches_package_forms() {
        let packages = vec![PackageName::new("esm_plugin_manager")];
        assert!(matches_package(Path::new("/s/esm_plugin_manager"), &packages));
        assert!(matches_package(Path::new("/s/esm-plugin-manager.egg-link"), &packages));
        assert!(!matches_package(Path::new("/s/esm_parser"), &packages));
    }
}
