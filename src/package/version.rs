//! Dotted-numeric version ordering.
//!
//! Versions of the tracked packages are plain `MAJOR.MINOR.PATCH` strings,
//! sometimes with a `v` prefix when they come from a release tag. They are
//! compared component by component as integers, so `4.7.0 < 4.10.0`.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
#[error("'{0}' is not a dotted numeric version")]
pub struct VersionParseError(pub String);

/// A parsed dotted version. Missing trailing components count as zero, so
/// `4.7` and `4.7.0` are equal.
#[derive(Debug, Clone, Eq)]
pub struct DottedVersion {
    parts: Vec<u64>,
}

impl DottedVersion {
    pub fn parts(&self) -> &[u64] {
        &self.parts
    }
}

/// Strip the `v` some release tags carry (`v6.21.0` -> `6.21.0`).
pub fn strip_tag_prefix(tag: &str) -> &str {
    let tag = tag.trim();
    tag.strip_prefix('v')
        .or_else(|| tag.strip_prefix('V'))
        .unwrap_or(tag)
}

impl FromStr for DottedVersion {
    type Err = VersionParseError;

    /// Each component must start with a digit. Anything after the digits of a
    /// component is ignored (`0rc1` reads as `0`); `dev3` is an error.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = strip_tag_prefix(s);
        if trimmed.is_empty() {
            return Err(VersionParseError(s.to_string()));
        }

        let parts = trimmed
            .split('.')
            .map(|component| {
                let digits: String = component.chars().take_while(char::is_ascii_digit).collect();
                digits.parse::<u64>().ok()
            })
            .collect::<Option<Vec<_>>>()
            .ok_or_else(|| VersionParseError(s.to_string()))?;

        Ok(DottedVersion { parts })
    }
}

impl Ord for DottedVersion {
    fn cmp(&self, other: &Self) -> Ordering {
        let len = self.parts.len().max(other.parts.len());
        for i in 0..len {
            let a = self.parts.get(i).copied().unwrap_or(0);
            let b = other.parts.get(i).copied().unwrap_or(0);
            match a.cmp(&b) {
                Ordering::Equal => continue,
                unequal => return unequal,
            }
        }
        Ordering::Equal
    }
}

impl PartialOrd for DottedVersion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for DottedVersion {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl fmt::Display for DottedVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rendered: Vec<String> = self.parts.iter().map(u64::to_string).collect();
        f.write_str(&rendered.join("."))
    }
}

/// True iff both versions are known, both parse, and `installed < latest`.
///
/// Absent or unparsable versions never ask for an upgrade.
pub fn upgrade_required(installed: Option<&str>, latest: Option<&str>) -> bool {
    match (installed, latest) {
        (Some(installed), Some(latest)) => {
            match (
                installed.parse::<DottedVersion>(),
                latest.parse::<DottedVersion>(),
            ) {
                (Ok(installed), Ok(latest)) => installed < latest,
                _ => false,
            }
        }
        _ => false,
    }
}

/// Pick the highest version among release tags, ignoring tags that are not
/// dotted versions.
pub fn highest_tag<'a, I>(tags: I) -> Option<&'a str>
where
    I: IntoIterator<Item = &'a str>,
{
    tags.into_iter()
        .filter_map(|tag| tag.parse::<DottedVersion>().ok().map(|v| (v, tag)))
        .max_by(|(a, _), (b, _)| a.cmp(b))
        .map(|(_, tag)| tag)
}
