use crate::errors::{Error, Result};
use std::fmt;

/// A `major.minor.revision` version.
///
/// Ordering compares the components lexicographically, which matches the
/// packed [`int_value`](Version::int_value) ordering for every valid version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Version {
    pub major: u32,
    pub minor: u32,
    pub revision: u32,
}

impl Version {
    #[must_use]
    pub const fn new(major: u32, minor: u32, revision: u32) -> Self {
        Self {
            major,
            minor,
            revision,
        }
    }

    /// Parses loose version strings like `2`, `v1.4` or `1.2.3-beta`.
    ///
    /// Missing or non-numeric components become `0`; anything after the third
    /// component is ignored.
    #[must_use]
    pub fn parse(input: &str) -> Self {
        let trimmed = input.trim().trim_start_matches(['v', 'V']);
        let mut parts = trimmed.split('.').map(|part| {
            let digits: String = part.chars().take_while(char::is_ascii_digit).collect();
            digits.parse().unwrap_or(0)
        });
        Self {
            major: parts.next().unwrap_or(0),
            minor: parts.next().unwrap_or(0),
            revision: parts.next().unwrap_or(0),
        }
    }

    /// `major.minor`, or `major.minor.revision` when the revision is non-zero.
    #[must_use]
    pub fn format(&self) -> String {
        if self.revision > 0 {
            format!("{}.{}.{}", self.major, self.minor, self.revision)
        } else {
            format!("{}.{}", self.major, self.minor)
        }
    }

    /// Packs the version as `major * 10000 + minor * 100 + revision`.
    ///
    /// # Errors
    /// Returns [`Error::InvalidArgument`] if any component is greater than 99.
    pub fn int_value(&self) -> Result<u32> {
        for (name, value) in [
            ("major", self.major),
            ("minor", self.minor),
            ("revision", self.revision),
        ] {
            if value > 99 {
                return Err(Error::invalid_argument(format!(
                    "version {name} is greater than 99"
                )));
            }
        }
        Ok(self.revision + self.minor * 100 + self.major * 10000)
    }

    #[must_use]
    pub fn is_newer_than(&self, other: &Self) -> bool {
        self > other
    }

    #[must_use]
    pub fn is_older_than(&self, other: &Self) -> bool {
        self < other
    }

    /// Finds the newest version in `sorted` (ascending) that is not newer than `target`.
    ///
    /// # Errors
    /// Returns [`Error::InvalidArgument`] if every version is newer than `target`.
    pub fn find_nearest<'a>(target: &Self, sorted: &'a [Self]) -> Result<&'a Self> {
        sorted
            .iter()
            .rev()
            .find(|version| !version.is_newer_than(target))
            .ok_or_else(|| Error::invalid_argument(format!("no version found for '{target}'")))
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.format())
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;

    #[test]
    fn test_parse_and_format() {
        assert_eq!(Version::parse("1.2.3"), Version::new(1, 2, 3));
        assert_eq!(Version::parse("v2.4"), Version::new(2, 4, 0));
        assert_eq!(Version::parse("3.1.0-beta"), Version::new(3, 1, 0));
        assert_eq!(Version::parse("garbage"), Version::default());
        assert_eq!(Version::new(2, 4, 0).format(), "2.4");
        assert_eq!(Version::new(2, 4, 1).to_string(), "2.4.1");
    }

    #[test]
    fn test_int_value() {
        assert_eq!(Version::new(1, 2, 3).int_value().unwrap(), 10203);
        assert!(Version::new(1, 100, 0).int_value().is_err());
    }

    #[test]
    fn test_comparisons() {
        let old = Version::new(1, 9, 9);
        let new = Version::new(2, 0, 0);
        assert!(new.is_newer_than(&old));
        assert!(old.is_older_than(&new));
        assert!(!old.is_newer_than(&old));
    }

    #[test]
    fn test_find_nearest() {
        let versions = [
            Version::new(1, 0, 0),
            Version::new(1, 5, 0),
            Version::new(2, 0, 0),
        ];
        assert_eq!(
            Version::find_nearest(&Version::new(1, 7, 0), &versions).unwrap(),
            &Version::new(1, 5, 0)
        );
        assert_eq!(
            Version::find_nearest(&Version::new(2, 0, 0), &versions).unwrap(),
            &Version::new(2, 0, 0)
        );
        assert!(Version::find_nearest(&Version::new(0, 9, 0), &versions).is_err());
    }
}
