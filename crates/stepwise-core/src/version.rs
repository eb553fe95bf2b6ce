//! Namespace-scoped version values.
//!
//! A [`Version`] is a namespace name plus a vector of numeric parts. Its
//! canonical text form is `namespace-1.2.3`:
//! - The namespace is one or more ASCII letters, digits or `_` (no `-`)
//! - Parts are decimal integers separated by `.`
//! - Parts compare element-wise; when one vector is a prefix of the other,
//!   the shorter one sorts first (`1.2` < `1.2.0`)

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use stepwise_util::errors::{StepwiseError, StepwiseResult};

/// An immutable, namespace-scoped version.
///
/// Equality and hashing use the namespace and the numeric parts only; the
/// original text a version was parsed from does not take part.
#[derive(Debug, Clone)]
pub struct Version {
    namespace: String,
    parts: Vec<u64>,
    text: Option<String>,
}

fn canonical_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^([A-Za-z0-9_]+)-((?:[0-9]+\.?)+)$")
            .expect("canonical version pattern is valid")
    })
}

fn namespace_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^[A-Za-z0-9_]+$").expect("namespace pattern is valid"))
}

fn parts_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^(?:[0-9]+\.?)+$").expect("version parts pattern is valid"))
}

impl Version {
    /// Build a version from a namespace and numeric parts.
    ///
    /// # Panics
    ///
    /// Panics if `parts` is empty. The namespace is not checked; use
    /// [`Version::try_new`] for unchecked input.
    pub fn new(namespace: impl Into<String>, parts: impl Into<Vec<u64>>) -> Self {
        let parts = parts.into();
        assert!(!parts.is_empty(), "a version needs at least one part");
        Self {
            namespace: namespace.into(),
            parts,
            text: None,
        }
    }

    /// Like [`Version::new`], but rejects empty parts and namespaces that
    /// could not be written in canonical form.
    pub fn try_new(namespace: impl Into<String>, parts: impl Into<Vec<u64>>) -> StepwiseResult<Self> {
        let namespace = namespace.into();
        let parts = parts.into();
        if parts.is_empty() || !namespace_pattern().is_match(&namespace) {
            let shown: Vec<String> = parts.iter().map(ToString::to_string).collect();
            return Err(StepwiseError::MalformedVersion {
                input: format!("{namespace}-{}", shown.join(".")),
            });
        }
        Ok(Self {
            namespace,
            parts,
            text: None,
        })
    }

    /// The `[0]` version of a namespace, i.e. "nothing applied yet".
    pub fn initial(namespace: impl Into<String>) -> Self {
        Self::new(namespace, vec![0])
    }

    /// Parse the canonical `namespace-1.2.3` form.
    pub fn parse(input: &str) -> StepwiseResult<Self> {
        let malformed = || StepwiseError::MalformedVersion {
            input: input.to_string(),
        };
        let caps = canonical_pattern().captures(input).ok_or_else(malformed)?;
        let parts = split_parts(&caps[2]).ok_or_else(malformed)?;
        Ok(Self {
            namespace: caps[1].to_string(),
            parts,
            text: Some(input.to_string()),
        })
    }

    /// Build a version from a namespace and a dotted version string such as `1.0.1`.
    pub fn with_namespace(namespace: &str, version: &str) -> StepwiseResult<Self> {
        let malformed = || StepwiseError::MalformedVersion {
            input: format!("{namespace}-{version}"),
        };
        if !namespace_pattern().is_match(namespace) || !parts_pattern().is_match(version) {
            return Err(malformed());
        }
        let parts = split_parts(version).ok_or_else(malformed)?;
        Ok(Self {
            namespace: namespace.to_string(),
            parts,
            text: Some(format!("{namespace}-{version}")),
        })
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn parts(&self) -> &[u64] {
        &self.parts
    }

    /// The text this version was constructed from, if any.
    pub fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }

    /// `true` when both versions belong to the same namespace.
    pub fn namespace_eq(&self, other: &Version) -> bool {
        self.namespace == other.namespace
    }

    /// Compare the numeric parts of two versions.
    ///
    /// Only meaningful within one namespace; the namespaces are not checked.
    pub fn compare_version(&self, other: &Version) -> Ordering {
        for (a, b) in self.parts.iter().zip(other.parts.iter()) {
            match a.cmp(b) {
                Ordering::Equal => continue,
                ord => return ord,
            }
        }
        self.parts.len().cmp(&other.parts.len())
    }
}

fn split_parts(text: &str) -> Option<Vec<u64>> {
    text.split('.')
        .filter(|part| !part.is_empty())
        .map(|part| part.parse::<u64>().ok())
        .collect()
}

impl PartialEq for Version {
    fn eq(&self, other: &Self) -> bool {
        self.namespace == other.namespace && self.parts == other.parts
    }
}

impl Eq for Version {}

impl Hash for Version {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.namespace.hash(state);
        self.parts.hash(state);
    }
}

/// Orders by namespace name first, then by [`Version::compare_version`].
impl Ord for Version {
    fn cmp(&self, other: &Self) -> Ordering {
        self.namespace
            .cmp(&other.namespace)
            .then_with(|| self.compare_version(other))
    }
}

impl PartialOrd for Version {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(text) = &self.text {
            return f.write_str(text);
        }
        write!(f, "{}-", self.namespace)?;
        for (i, part) in self.parts.iter().enumerate() {
            if i > 0 {
                f.write_str(".")?;
            }
            write!(f, "{part}")?;
        }
        Ok(())
    }
}

impl FromStr for Version {
    type Err = StepwiseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for Version {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Version {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        Self::parse(&text).map_err(serde::de::Error::custom)
    }
}
