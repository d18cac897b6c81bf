//! Fully-qualified type names.
//!
//! A [`QualifiedName`] is the semantic key of a Type node. Segments are
//! separated by `.`; nested types use the binary `$` separator inside the last
//! segments (`com.acme.Outer$Inner`), so names produced from source agree with
//! names produced from bytecode. Every segment must be a Java identifier.

use std::fmt;

use smol_str::SmolStr;
use thiserror::Error;

/// Why a string was rejected as a qualified name.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum NameError {
    #[error("qualified name is empty")]
    Empty,
    #[error("qualified name `{name}` has an empty segment")]
    EmptySegment { name: SmolStr },
    #[error("`{segment}` in `{name}` is not a valid identifier")]
    InvalidSegment { name: SmolStr, segment: SmolStr },
}

/// A validated fully-qualified type name such as `java.util.Map$Entry`.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct QualifiedName {
    text: SmolStr,
    /// Byte offset of the simple name inside `text`.
    simple_start: u32,
}

impl QualifiedName {
    /// Parse and validate a qualified name.
    pub fn parse(text: &str) -> Result<Self, NameError> {
        if text.is_empty() {
            return Err(NameError::Empty);
        }

        let mut rest = text;
        let mut after_dollar = false;
        loop {
            let end = rest.find(['.', '$']).unwrap_or(rest.len());
            let segment = &rest[..end];
            if segment.is_empty() {
                return Err(NameError::EmptySegment { name: text.into() });
            }
            if !is_identifier(segment) && !(after_dollar && is_binary_segment(segment)) {
                return Err(NameError::InvalidSegment {
                    name: text.into(),
                    segment: segment.into(),
                });
            }
            if end == rest.len() {
                break;
            }
            after_dollar = rest.as_bytes()[end] == b'$';
            rest = &rest[end + 1..];
        }

        let simple_start = text.rfind(['.', '$']).map_or(0, |idx| idx + 1) as u32;
        Ok(Self {
            text: text.into(),
            simple_start,
        })
    }

    /// Join a package (possibly empty) and a type name.
    pub fn in_package(package: Option<&str>, name: &str) -> Result<Self, NameError> {
        match package {
            Some(package) if !package.is_empty() => Self::parse(&format!("{package}.{name}")),
            _ => Self::parse(name),
        }
    }

    /// The name of a type nested directly inside `self`.
    pub fn nested(&self, name: &str) -> Result<Self, NameError> {
        Self::parse(&format!("{}${}", self.text, name))
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// The simple (unqualified) name: `Entry` for `java.util.Map$Entry`.
    pub fn simple_name(&self) -> &str {
        &self.text[self.simple_start as usize..]
    }

    /// The package part, if any: `java.util` for `java.util.Map$Entry`.
    pub fn package(&self) -> Option<&str> {
        let top_level_end = self.text.find('$').unwrap_or(self.text.len());
        self.text[..top_level_end].rfind('.').map(|idx| &self.text[..idx])
    }

    pub fn to_smol_str(&self) -> SmolStr {
        self.text.clone()
    }
}

/// Anonymous (`1`) and local (`1Helper`) class segments of a binary name.
fn is_binary_segment(segment: &str) -> bool {
    let rest = segment.trim_start_matches(|c: char| c.is_ascii_digit());
    rest.len() < segment.len() && (rest.is_empty() || is_identifier(rest))
}

/// Java identifiers: XID plus `$` and `_`, not starting with a digit.
fn is_identifier(segment: &str) -> bool {
    let mut chars = segment.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    let start_ok = first == '_' || first == '$' || unicode_ident::is_xid_start(first);
    start_ok && chars.all(|c| c == '$' || unicode_ident::is_xid_continue(c))
}

impl fmt::Debug for QualifiedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "QualifiedName({})", self.text)
    }
}

impl fmt::Display for QualifiedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

impl AsRef<str> for QualifiedName {
    fn as_ref(&self) -> &str {
        &self.text
    }
}

#[cfg(feature = "interchange")]
impl serde::Serialize for QualifiedName {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.text)
    }
}

impl std::str::FromStr for QualifiedName {
    type Err = NameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}
