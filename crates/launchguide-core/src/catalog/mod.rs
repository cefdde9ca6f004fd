//! Marketing channel catalog and selection rules.
//!
//! The catalog is defined in `channels.toml` and embedded in the binary at
//! compile time. Selection rules differ between flows: the guided flow asks
//! for three to five channels, the quick flow accepts any non-empty set.

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A single marketing channel from the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Channel {
    /// Unique short label (e.g. `SEO (Basic)`).
    pub name: String,
    /// One-line human-readable description.
    pub description: String,
}

/// Container for deserializing the embedded TOML file.
#[derive(Debug, Deserialize)]
struct ChannelLibrary {
    channels: Vec<Channel>,
}

/// The embedded channel catalog TOML.
static CHANNELS_TOML: &str = include_str!("channels.toml");

/// Load the full channel catalog, in presentation order.
///
/// # Panics
///
/// Panics if the embedded TOML is malformed. The file is compiled in, so a
/// built binary always carries a valid catalog.
pub fn load_catalog() -> Vec<Channel> {
    let lib: ChannelLibrary =
        toml::from_str(CHANNELS_TOML).expect("embedded channels.toml is invalid");
    lib.channels
}

/// Look up a catalog channel by exact name.
pub fn find_channel(name: &str) -> Option<Channel> {
    load_catalog().into_iter().find(|c| c.name == name)
}

/// Names of all catalog channels, in presentation order.
pub fn channel_names() -> Vec<String> {
    load_catalog().into_iter().map(|c| c.name).collect()
}

// ---------------------------------------------------------------------------
// Selection policy
// ---------------------------------------------------------------------------

/// How many channels a flow requires the founder to pick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectionPolicy {
    /// Between three and five channels, inclusive.
    #[default]
    ThreeToFive,
    /// Any non-empty selection.
    AtLeastOne,
}

impl SelectionPolicy {
    /// Inclusive lower bound and optional inclusive upper bound.
    pub fn bounds(self) -> (usize, Option<usize>) {
        match self {
            Self::ThreeToFive => (3, Some(5)),
            Self::AtLeastOne => (1, None),
        }
    }

    /// Check a selection against this policy.
    ///
    /// Names outside the catalog are allowed (free-text "other" channels), but
    /// blank names and duplicates are not.
    pub fn check(self, channels: &[String]) -> Result<(), SelectionError> {
        let mut seen = HashSet::new();
        for name in channels {
            if name.trim().is_empty() {
                return Err(SelectionError::BlankChannel);
            }
            if !seen.insert(name.as_str()) {
                return Err(SelectionError::Duplicate(name.clone()));
            }
        }

        let (min, max) = self.bounds();
        let count = channels.len();
        if count < min {
            return Err(SelectionError::TooFew { min, count });
        }
        if let Some(max) = max {
            if count > max {
                return Err(SelectionError::TooMany { max, count });
            }
        }
        Ok(())
    }
}

impl fmt::Display for SelectionPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::ThreeToFive => "three_to_five",
            Self::AtLeastOne => "at_least_one",
        };
        f.write_str(s)
    }
}

impl FromStr for SelectionPolicy {
    type Err = SelectionPolicyParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "three_to_five" => Ok(Self::ThreeToFive),
            "at_least_one" => Ok(Self::AtLeastOne),
            other => Err(SelectionPolicyParseError(other.to_owned())),
        }
    }
}

/// Error returned when parsing an invalid [`SelectionPolicy`] string.
#[derive(Debug, Clone, Error)]
#[error("invalid selection policy: {0:?} (expected three_to_five or at_least_one)")]
pub struct SelectionPolicyParseError(pub String);

/// A channel selection that does not satisfy its [`SelectionPolicy`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SelectionError {
    #[error("select at least {min} channel(s), got {count}")]
    TooFew { min: usize, count: usize },

    #[error("select at most {max} channels, got {count}")]
    TooMany { max: usize, count: usize },

    #[error("channel {0:?} selected more than once")]
    Duplicate(String),

    #[error("channel names must not be blank")]
    BlankChannel,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn catalog_has_six_channels_in_order() {
        let catalog = load_catalog();
        assert_eq!(catalog.len(), 6);
        assert_eq!(catalog[0].name, "Content Marketing");
        assert_eq!(catalog[1].name, "SEO (Basic)");
        assert_eq!(catalog[5].name, "Targeted Social Ads (Simple)");
    }

    #[test]
    fn catalog_names_are_unique() {
        let names = channel_names();
        let unique: HashSet<&String> = names.iter().collect();
        assert_eq!(unique.len(), names.len());
    }

    #[test]
    fn find_channel_by_name() {
        let seo = find_channel("SEO (Basic)").expect("SEO should be in the catalog");
        assert!(seo.description.contains("search engine"));
        assert!(find_channel("Skywriting").is_none());
    }

    #[test]
    fn three_to_five_bounds() {
        let policy = SelectionPolicy::ThreeToFive;
        assert_eq!(
            policy.check(&names(&["a", "b"])),
            Err(SelectionError::TooFew { min: 3, count: 2 })
        );
        assert!(policy.check(&names(&["a", "b", "c"])).is_ok());
        assert!(policy.check(&names(&["a", "b", "c", "d", "e"])).is_ok());
        assert_eq!(
            policy.check(&names(&["a", "b", "c", "d", "e", "f"])),
            Err(SelectionError::TooMany { max: 5, count: 6 })
        );
    }

    #[test]
    fn at_least_one_rejects_only_empty() {
        let policy = SelectionPolicy::AtLeastOne;
        assert_eq!(
            policy.check(&[]),
            Err(SelectionError::TooFew { min: 1, count: 0 })
        );
        assert!(policy.check(&names(&["Podcast guesting"])).is_ok());
        assert!(policy.check(&names(&["a", "b", "c", "d", "e", "f", "g"])).is_ok());
    }

    #[test]
    fn rejects_duplicates_and_blanks() {
        let policy = SelectionPolicy::AtLeastOne;
        assert_eq!(
            policy.check(&names(&["SEO (Basic)", "SEO (Basic)"])),
            Err(SelectionError::Duplicate("SEO (Basic)".to_string()))
        );
        assert_eq!(
            policy.check(&names(&["SEO (Basic)", "  "])),
            Err(SelectionError::BlankChannel)
        );
    }

    #[test]
    fn policy_display_fromstr_roundtrip() {
        for policy in [SelectionPolicy::ThreeToFive, SelectionPolicy::AtLeastOne] {
            let parsed: SelectionPolicy = policy.to_string().parse().unwrap();
            assert_eq!(parsed, policy);
        }
        assert!("two_to_four".parse::<SelectionPolicy>().is_err());
    }
}
