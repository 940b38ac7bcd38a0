//! POSIX-style access control entries
//!
//! Hierarchical-namespace backends expose permissions as an `rwxrwxrwx`
//! string of owner/group/other triples. Only the shape is validated here;
//! anything that is not exactly nine characters is unparseable and the
//! caller leaves the object untouched rather than guessing.

use std::fmt;

use crate::error::{Result, WardenError};

/// Execute flag positions within the owner, group, and other triples.
const EXECUTE_POSITIONS: [usize; 3] = [2, 5, 8];

/// A parsed nine-character permission string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessControlEntry {
    chars: [char; 9],
}

impl AccessControlEntry {
    /// Parse the permission string read for `path`.
    pub fn parse(path: &str, permissions: &str) -> Result<Self> {
        let chars: Vec<char> = permissions.chars().collect();
        let chars: [char; 9] =
            chars
                .try_into()
                .map_err(|rest: Vec<char>| WardenError::AclFormat {
                    path: path.to_string(),
                    length: rest.len(),
                })?;
        Ok(Self { chars })
    }

    /// Clear the execute flag wherever it is set.
    ///
    /// Returns true when at least one flag was cleared, so the caller can
    /// skip the write-back after a no-op. Flags other than `x` (such as
    /// setuid `s`) are left alone.
    pub fn strip_execute(&mut self) -> bool {
        let mut changed = false;
        for position in EXECUTE_POSITIONS {
            if self.chars[position] == 'x' {
                self.chars[position] = '-';
                changed = true;
            }
        }
        changed
    }
}

impl fmt::Display for AccessControlEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for c in self.chars {
            write!(f, "{}", c)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strips_all_execute_bits() {
        let mut entry = AccessControlEntry::parse("a/b", "rwxr-xr-x").unwrap();
        assert!(entry.strip_execute());
        assert_eq!(entry.to_string(), "rw-r--r--");
    }

    #[test]
    fn test_strips_partial_execute_bits() {
        let mut entry = AccessControlEntry::parse("a/b", "r-xrw--wx").unwrap();
        assert!(entry.strip_execute());
        assert_eq!(entry.to_string(), "r--rw--w-");
    }

    #[test]
    fn test_no_execute_bits_reports_unchanged() {
        let mut entry = AccessControlEntry::parse("a/b", "rw-r--r--").unwrap();
        assert!(!entry.strip_execute());
        assert_eq!(entry.to_string(), "rw-r--r--");
    }

    #[test]
    fn test_setuid_flag_is_left_alone() {
        let mut entry = AccessControlEntry::parse("a/b", "rwsr-xr--").unwrap();
        assert!(entry.strip_execute());
        assert_eq!(entry.to_string(), "rwsr--r--");
    }

    #[test]
    fn test_rejects_short_string() {
        let err = AccessControlEntry::parse("a/b", "rwxr-x").unwrap_err();
        match err {
            WardenError::AclFormat { path, length } => {
                assert_eq!(path, "a/b");
                assert_eq!(length, 6);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_rejects_long_string() {
        let err = AccessControlEntry::parse("a/b", "rwxr-xr-x+").unwrap_err();
        assert!(matches!(err, WardenError::AclFormat { length: 10, .. }));
    }

    #[test]
    fn test_rejects_empty_string() {
        assert!(AccessControlEntry::parse("a/b", "").is_err());
    }
}
