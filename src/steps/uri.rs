//! Step identifier parsing.
//!
//! Step identifiers are URI-like strings. The accepted shapes are:
//!
//! - `snapshot://namespace/version/name` (and `snapshot-private://`)
//! - `meadow://`, `garden://`, `grapher://`, `explorers://` followed by
//!   `namespace/version/name`
//! - `data://channel/namespace/version/name` (and `data-private://`), where
//!   the channel is one of the data kinds above
//! - `export://channel/namespace/version/name`

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{Result, StepGraphError};

static URI_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([a-z][a-z\-]*)://(.+)$").unwrap());
static NAMESPACE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_\-]+$").unwrap());
static VERSION_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(latest|\d{4}-\d{2}-\d{2}|\d{4})$").unwrap());
static NAME_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_.\-]+$").unwrap());

/// Kind of a step, derived from its scheme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepKind {
    Snapshot,
    Meadow,
    Garden,
    Grapher,
    Explorers,
    Export,
}

impl StepKind {
    /// Whether steps of this kind are leaves that need no definition.
    pub fn is_leaf(&self) -> bool {
        matches!(self, Self::Snapshot)
    }

    /// Lowercase label as written in identifiers.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Snapshot => "snapshot",
            Self::Meadow => "meadow",
            Self::Garden => "garden",
            Self::Grapher => "grapher",
            Self::Explorers => "explorers",
            Self::Export => "export",
        }
    }

    fn from_channel(channel: &str) -> Option<Self> {
        match channel {
            "meadow" => Some(Self::Meadow),
            "garden" => Some(Self::Garden),
            "grapher" => Some(Self::Grapher),
            "explorers" => Some(Self::Explorers),
            _ => None,
        }
    }
}

impl fmt::Display for StepKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StepKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "snapshot" => Ok(Self::Snapshot),
            "export" => Ok(Self::Export),
            other => Self::from_channel(other).ok_or_else(|| format!("unknown step kind: {}", s)),
        }
    }
}

/// A parsed step identifier.
///
/// Equality, ordering, and hashing use the identifier text, so sorting
/// `StepUri`s gives the same order as sorting their strings.
#[derive(Debug, Clone)]
pub struct StepUri {
    raw: String,
    kind: StepKind,
    private: bool,
    channel: Option<String>,
    namespace: String,
    version: String,
    name: String,
}

impl StepUri {
    /// Parse an identifier.
    pub fn parse(raw: &str) -> Result<Self> {
        let malformed = |reason: &str| StepGraphError::MalformedStep {
            step: raw.to_string(),
            reason: reason.to_string(),
        };

        let caps = URI_REGEX
            .captures(raw)
            .ok_or_else(|| malformed("expected 'scheme://namespace/version/name'"))?;
        let scheme = &caps[1];
        let path = &caps[2];

        let (base, private) = match scheme.strip_suffix("-private") {
            Some(base) => (base, true),
            None => (scheme, false),
        };

        let segments: Vec<&str> = path.split('/').collect();

        let (kind, channel, rest) = match base {
            "snapshot" => (StepKind::Snapshot, None, &segments[..]),
            "data" | "export" => {
                let (channel, rest) = segments
                    .split_first()
                    .ok_or_else(|| malformed("missing channel"))?;
                let kind = if base == "export" {
                    StepKind::Export
                } else {
                    StepKind::from_channel(channel)
                        .ok_or_else(|| malformed(&format!("unknown data channel '{}'", channel)))?
                };
                (kind, Some(channel.to_string()), rest)
            }
            other => match StepKind::from_channel(other) {
                Some(kind) => (kind, None, &segments[..]),
                None => return Err(malformed(&format!("unknown scheme '{}'", scheme))),
            },
        };

        if private && kind == StepKind::Export {
            return Err(malformed("export steps cannot be private"));
        }

        let [namespace, version, name] = rest else {
            return Err(malformed(&format!(
                "expected namespace/version/name, found {} segment(s)",
                rest.len()
            )));
        };

        if let Some(channel) = &channel {
            if !NAMESPACE_REGEX.is_match(channel) {
                return Err(malformed(&format!("invalid channel '{}'", channel)));
            }
        }
        if !NAMESPACE_REGEX.is_match(namespace) {
            return Err(malformed(&format!("invalid namespace '{}'", namespace)));
        }
        if !VERSION_REGEX.is_match(version) {
            return Err(malformed(&format!(
                "invalid version '{}' (expected 'latest', YYYY-MM-DD or YYYY)",
                version
            )));
        }
        if !NAME_REGEX.is_match(name) {
            return Err(malformed(&format!("invalid name '{}'", name)));
        }

        Ok(Self {
            raw: raw.to_string(),
            kind,
            private,
            channel,
            namespace: namespace.to_string(),
            version: version.to_string(),
            name: name.to_string(),
        })
    }

    /// The identifier as written.
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn kind(&self) -> StepKind {
        self.kind
    }

    /// Whether the scheme carries the `-private` suffix.
    pub fn is_private(&self) -> bool {
        self.private
    }

    /// Channel segment for `data://` and `export://` identifiers.
    pub fn channel(&self) -> Option<&str> {
        self.channel.as_deref()
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for StepUri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

impl FromStr for StepUri {
    type Err = StepGraphError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl PartialEq for StepUri {
    fn eq(&self, other: &Self) -> bool {
        self.raw == other.raw
    }
}

impl Eq for StepUri {}

impl Hash for StepUri {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.raw.hash(state);
    }
}

impl PartialOrd for StepUri {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for StepUri {
    fn cmp(&self, other: &Self) -> Ordering {
        self.raw.cmp(&other.raw)
    }
}
