//! Per-verb subpath length limits.
//!
//! Configured as a non-negative integer or the word `"unlimited"`:
//!
//! ```toml
//! [traversal.subpath_max_length]
//! GET = "unlimited"
//! PUT = 0
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

/// Maximum number of trailing tokens a handler may receive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "LimitRepr", into = "LimitRepr")]
pub enum SubpathLimit {
    Max(usize),
    Unlimited,
}

impl SubpathLimit {
    /// Whether a subpath of `len` tokens is allowed.
    pub fn admits(self, len: usize) -> bool {
        match self {
            SubpathLimit::Unlimited => true,
            SubpathLimit::Max(max) => len <= max,
        }
    }
}

impl Default for SubpathLimit {
    fn default() -> Self {
        SubpathLimit::Max(0)
    }
}

impl fmt::Display for SubpathLimit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SubpathLimit::Max(max) => write!(f, "{}", max),
            SubpathLimit::Unlimited => f.write_str(UNLIMITED),
        }
    }
}

const UNLIMITED: &str = "unlimited";

#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum LimitRepr {
    Count(usize),
    Word(String),
}

impl TryFrom<LimitRepr> for SubpathLimit {
    type Error = String;

    fn try_from(repr: LimitRepr) -> Result<Self, Self::Error> {
        match repr {
            LimitRepr::Count(max) => Ok(SubpathLimit::Max(max)),
            LimitRepr::Word(word) if word.eq_ignore_ascii_case(UNLIMITED) => {
                Ok(SubpathLimit::Unlimited)
            }
            LimitRepr::Word(word) => Err(format!(
                "invalid subpath limit {:?}: expected a non-negative integer or \"{}\"",
                word, UNLIMITED
            )),
        }
    }
}

impl From<SubpathLimit> for LimitRepr {
    fn from(limit: SubpathLimit) -> Self {
        match limit {
            SubpathLimit::Max(max) => LimitRepr::Count(max),
            SubpathLimit::Unlimited => LimitRepr::Word(UNLIMITED.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_admits() {
        assert!(SubpathLimit::Max(0).admits(0));
        assert!(!SubpathLimit::Max(0).admits(1));
        assert!(SubpathLimit::Max(2).admits(2));
        assert!(SubpathLimit::Unlimited.admits(usize::MAX));
    }

    #[test]
    fn test_deserialize_forms() {
        let limit: SubpathLimit = serde_json::from_value(json!(3)).unwrap();
        assert_eq!(limit, SubpathLimit::Max(3));

        let limit: SubpathLimit = serde_json::from_value(json!("Unlimited")).unwrap();
        assert_eq!(limit, SubpathLimit::Unlimited);

        assert!(serde_json::from_value::<SubpathLimit>(json!("lots")).is_err());
        assert!(serde_json::from_value::<SubpathLimit>(json!(-1)).is_err());
    }

    #[test]
    fn test_serialize_forms() {
        assert_eq!(serde_json::to_value(SubpathLimit::Max(1)).unwrap(), json!(1));
        assert_eq!(serde_json::to_value(SubpathLimit::Unlimited).unwrap(), json!("unlimited"));
    }
}
