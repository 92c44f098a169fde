//! # Resource Paths
//!
//! Paths are `/`-delimited names such as `/speech/detector`. They are split into
//! segments once, when parsed, so every ancestor check afterwards is a
//! segment-wise comparison: `/speech` is an ancestor of `/speech/detector` but
//! never of `/speechless`.

use crate::framework::error::ServiceError;
use std::fmt;
use std::str::FromStr;

/// A parsed, canonical resource path.
///
/// The root `/` has no segments. Empty segments are dropped, so `/a//b/`
/// and `/a/b` are the same path.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct ResourcePath {
    segments: Vec<String>,
}

impl ResourcePath {
    /// The root path `/`.
    pub fn root() -> Self {
        Self::default()
    }

    /// Parses an absolute path. Relative or empty strings are rejected.
    pub fn parse(raw: &str) -> Result<Self, ServiceError> {
        if !raw.starts_with('/') {
            return Err(ServiceError::MalformedDataObject(format!(
                "resource path must be absolute: {raw:?}"
            )));
        }
        let segments = raw
            .split('/')
            .filter(|s| !s.is_empty())
            .map(str::to_owned)
            .collect();
        Ok(Self { segments })
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    /// True when `self` equals `other` or is a strict prefix of it.
    pub fn is_ancestor_of(&self, other: &ResourcePath) -> bool {
        other.segments.starts_with(&self.segments)
    }

    /// The segments of `self` below `ancestor`, or `None` when `ancestor`
    /// does not contain `self`. Empty for an exact match.
    pub fn relative_to(&self, ancestor: &ResourcePath) -> Option<&[String]> {
        if ancestor.is_ancestor_of(self) {
            Some(&self.segments[ancestor.segments.len()..])
        } else {
            None
        }
    }

    /// Appends one segment.
    pub fn join(&self, segment: &str) -> Self {
        let mut segments = self.segments.clone();
        segments.extend(
            segment
                .split('/')
                .filter(|s| !s.is_empty())
                .map(str::to_owned),
        );
        Self { segments }
    }
}

impl fmt::Display for ResourcePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.segments.is_empty() {
            return f.write_str("/");
        }
        for segment in &self.segments {
            write!(f, "/{segment}")?;
        }
        Ok(())
    }
}

impl FromStr for ResourcePath {
    type Err = ServiceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}
