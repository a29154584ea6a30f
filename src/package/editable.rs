//! Editable (development mode) install detection.
//!
//! `pip install -e` leaves a `<distribution-name>.egg-link` marker in one of
//! the interpreter's module search directories. The first line of the marker
//! is the path of the live source checkout.

use std::path::{Path, PathBuf};

use log::debug;

use crate::runtime::Runtime;

use super::PackageName;

const MARKER_SUFFIX: &str = ".egg-link";

/// Scans a module search path for editable-install markers.
///
/// Both queries are read-only, so asking twice without a filesystem change
/// gives the same answer.
pub struct EditableDetector<'a, R: Runtime> {
    runtime: &'a R,
    search_path: &'a [PathBuf],
}

impl<'a, R: Runtime> EditableDetector<'a, R> {
    pub fn new(runtime: &'a R, search_path: &'a [PathBuf]) -> Self {
        Self {
            runtime,
            search_path,
        }
    }

    /// True if a marker for `name` exists anywhere on the search path.
    #[tracing::instrument(skip(self))]
    pub fn is_editable(&self, name: &PackageName) -> bool {
        self.find_marker(name).is_some()
    }

    /// Source checkout of an editable install, read from the first marker
    /// found. Missing, unreadable or empty markers yield `None`.
    #[tracing::instrument(skip(self))]
    pub fn editable_location(&self, name: &PackageName) -> Option<PathBuf> {
        let marker = self.find_marker(name)?;
        let content = match self.runtime.read_to_string(&marker) {
            Ok(content) => content,
            Err(e) => {
                debug!("Could not read {:?}: {}", marker, e);
                return None;
            }
        };

        let first_line = content.lines().next()?.trim();
        if first_line.is_empty() {
            return None;
        }
        Some(PathBuf::from(first_line))
    }

    fn find_marker(&self, name: &PackageName) -> Option<PathBuf> {
        let file_name = format!("{}{}", name.distribution_name(), MARKER_SUFFIX);
        self.search_path
            .iter()
            .map(|dir| marker_path(dir, &file_name))
            .find(|marker| self.runtime.is_file(marker))
    }
}

fn marker_path(dir: &Path, file_name: &str) -> PathBuf {
    dir.join(file_name)
}
