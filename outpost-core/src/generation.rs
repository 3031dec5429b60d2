//! Cache generation names.
//!
//! A generation is named `{prefix}-{version}`, e.g. `novashop-v4`. The prefix
//! identifies the application owning the generation; the version tag is the
//! deploy-time build identifier.

use std::fmt;

use smol_str::SmolStr;

const SEPARATOR: char = '-';

/// Name of a cache generation.
///
/// # Example
///
/// ```
/// use outpost_core::GenerationName;
///
/// let current = GenerationName::new("novashop", "v4");
/// assert_eq!(current.as_str(), "novashop-v4");
/// assert!(current.supersedes("novashop-v3"));
/// assert!(!current.supersedes("novashop-v4"));
/// assert!(current.supersedes("novashopper-v1"));
/// assert!(!current.supersedes("otherapp-v1"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct GenerationName {
    prefix: SmolStr,
    version: SmolStr,
    full: SmolStr,
}

impl GenerationName {
    /// Builds the name from an application prefix and a version tag.
    pub fn new(prefix: impl Into<SmolStr>, version: impl Into<SmolStr>) -> Self {
        let prefix = prefix.into();
        let version = version.into();
        let full = SmolStr::from(format!("{prefix}{SEPARATOR}{version}"));
        Self {
            prefix,
            version,
            full,
        }
    }

    /// Returns the version tag of `name` if it carries `prefix`.
    pub fn parse<'a>(name: &'a str, prefix: &str) -> Option<&'a str> {
        name.strip_prefix(prefix)?.strip_prefix(SEPARATOR)
    }

    /// Application prefix.
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Version tag.
    pub fn version(&self) -> &str {
        &self.version
    }

    /// Full generation name.
    pub fn as_str(&self) -> &str {
        &self.full
    }

    /// Returns `true` when `other` starts with the application prefix but is
    /// not this exact generation, i.e. it must be removed once `self` is
    /// current.
    ///
    /// The prefix is matched on the raw name, so `novashopper-v1` is
    /// superseded by `novashop-v4` as well.
    pub fn supersedes(&self, other: &str) -> bool {
        other.starts_with(self.prefix.as_str()) && other != self.full.as_str()
    }
}

impl fmt::Display for GenerationName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.full)
    }
}

impl AsRef<str> for GenerationName {
    fn as_ref(&self) -> &str {
        &self.full
    }
}
