//! Version string ordering used to pick the latest package version.
//!
//! Package versions are four-part dotted strings (`major.minor.patch.build`),
//! not semver. [`VersionOrdering::Numeric`] compares them component-wise as
//! integers; [`VersionOrdering::Lexicographic`] reproduces the plain string
//! comparison of older tooling, under which `"10.0"` sorts before `"9.0"`.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// How version strings are compared when selecting the latest version.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VersionOrdering {
    /// Dotted numeric comparison; missing components count as zero.
    #[default]
    Numeric,
    /// Byte-wise string comparison.
    Lexicographic,
}

impl VersionOrdering {
    /// Compare two version strings.
    pub fn compare(self, a: &str, b: &str) -> Ordering {
        match self {
            Self::Lexicographic => a.cmp(b),
            Self::Numeric => compare_numeric(a, b),
        }
    }

    /// Pick the greatest item by its version string. Ties keep the first seen.
    pub fn latest<'a, T>(
        self,
        items: impl IntoIterator<Item = &'a T>,
        version: impl Fn(&T) -> &str,
    ) -> Option<&'a T> {
        let mut best: Option<&'a T> = None;
        for item in items {
            best = match best {
                Some(current) if self.compare(version(item), version(current)).is_le() => {
                    Some(current)
                }
                _ => Some(item),
            };
        }
        best
    }
}

fn compare_numeric(a: &str, b: &str) -> Ordering {
    let mut left = a.split('.');
    let mut right = b.split('.');
    loop {
        match (left.next(), right.next()) {
            (None, None) => return Ordering::Equal,
            (l, r) => {
                let l = l.unwrap_or("0");
                let r = r.unwrap_or("0");
                let ord = match (l.trim().parse::<u64>(), r.trim().parse::<u64>()) {
                    (Ok(x), Ok(y)) => x.cmp(&y),
                    // Non-numeric segments (e.g. "NEXT") sort after numbers
                    (Ok(_), Err(_)) => Ordering::Less,
                    (Err(_), Ok(_)) => Ordering::Greater,
                    (Err(_), Err(_)) => l.cmp(r),
                };
                if ord != Ordering::Equal {
                    return ord;
                }
            }
        }
    }
}
