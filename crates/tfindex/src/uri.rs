//! Normalized document identity.
//!
//! Every file index, group and diagnostic set is keyed by the string form of a
//! [`Uri`]. Two spellings of the same location must therefore produce the
//! same string: the scheme is lower-cased, each path segment is
//! percent-decoded and re-encoded with one fixed set, and trailing slashes
//! are dropped. An encoded separator (`%2F`) stays inside its segment.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use percent_encoding::{AsciiSet, CONTROLS, percent_decode_str, utf8_percent_encode};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Characters escaped in the path component.
const PATH_ENCODE_SET: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}');

/// Characters escaped inside one path segment.
const SEGMENT_ENCODE_SET: &AsciiSet = &PATH_ENCODE_SET.add(b'/');

/// A normalized, comparable document or directory identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Uri {
    value: String,
    /// Byte offset where the (encoded) path starts in `value`.
    path_start: usize,
}

impl Uri {
    /// Parse and normalize a URI string such as `file:///infra/main.tf`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidUri`] if the input has no valid scheme.
    pub fn parse(input: &str) -> Result<Self> {
        let (scheme, rest) = input
            .split_once(':')
            .ok_or_else(|| invalid(input, "missing scheme"))?;

        let valid_scheme = scheme.starts_with(|c: char| c.is_ascii_alphabetic())
            && scheme
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'));
        if !valid_scheme {
            return Err(invalid(input, "invalid scheme"));
        }

        let (authority, path) = match rest.strip_prefix("//") {
            Some(after) => match after.find('/') {
                Some(slash) => (Some(&after[..slash]), &after[slash..]),
                None => (Some(after), ""),
            },
            None => (None, rest),
        };

        let encoded = path
            .split('/')
            .map(|segment| {
                let decoded = percent_decode_str(segment).decode_utf8_lossy();
                utf8_percent_encode(&decoded, SEGMENT_ENCODE_SET).to_string()
            })
            .collect::<Vec<_>>()
            .join("/");
        Ok(Self::from_parts(
            &scheme.to_ascii_lowercase(),
            authority,
            &encoded,
        ))
    }

    /// Build a `file://` URI from an absolute filesystem path.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidUri`] for relative paths or paths that are not
    /// valid UTF-8.
    pub fn from_file_path(path: &Path) -> Result<Self> {
        let display = path.display().to_string();
        if !path.is_absolute() {
            return Err(invalid(&display, "path is not absolute"));
        }
        let path_str = path
            .to_str()
            .ok_or_else(|| invalid(&display, "path contains invalid UTF-8"))?;

        // On Unix: /home/user/main.tf -> file:///home/user/main.tf
        // On Windows: C:\infra\main.tf -> file:///C:/infra/main.tf
        #[cfg(windows)]
        let uri_path = format!("/{}", path_str.replace('\\', "/"));

        #[cfg(not(windows))]
        let uri_path = path_str.to_string();

        let encoded = utf8_percent_encode(&uri_path, PATH_ENCODE_SET).to_string();
        Ok(Self::from_parts("file", Some(""), &encoded))
    }

    /// Assemble a URI from an already encoded path.
    fn from_parts(scheme: &str, authority: Option<&str>, path: &str) -> Self {
        let path = match path.strip_suffix('/') {
            Some(stripped) if !stripped.is_empty() => stripped,
            _ => path,
        };
        let prefix = match authority {
            Some(authority) => format!("{scheme}://{authority}"),
            None => format!("{scheme}:"),
        };
        let path_start = prefix.len();
        let value = format!("{prefix}{path}");
        Self { value, path_start }
    }

    /// The normalized string form.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.value
    }

    /// The URI scheme, e.g. `file`.
    #[must_use]
    pub fn scheme(&self) -> &str {
        self.value.split(':').next().unwrap_or_default()
    }

    /// The decoded path component.
    #[must_use]
    pub fn path(&self) -> String {
        percent_decode_str(&self.value[self.path_start..])
            .decode_utf8_lossy()
            .into_owned()
    }

    /// The last path segment, if any.
    #[must_use]
    pub fn file_name(&self) -> Option<String> {
        self.value[self.path_start..]
            .rsplit('/')
            .next()
            .filter(|name| !name.is_empty())
            .map(|name| percent_decode_str(name).decode_utf8_lossy().into_owned())
    }

    /// The URI of the directory containing this one.
    ///
    /// The root directory is its own parent.
    #[must_use]
    pub fn dirname(&self) -> Uri {
        let path = &self.value[self.path_start..];
        let parent = match path.rfind('/') {
            Some(0) => "/",
            Some(slash) => &path[..slash],
            None => "",
        };

        let prefix = &self.value[..self.path_start];
        match prefix.split_once("://") {
            Some((scheme, authority)) => Self::from_parts(scheme, Some(authority), parent),
            None => Self::from_parts(prefix.trim_end_matches(':'), None, parent),
        }
    }

    /// Convert a `file:` URI back to a local path.
    #[must_use]
    pub fn to_file_path(&self) -> Option<PathBuf> {
        if self.scheme() != "file" {
            return None;
        }
        let path = self.path();

        #[cfg(windows)]
        let path = path.trim_start_matches('/').replace('/', "\\");

        Some(PathBuf::from(path))
    }

    /// Whether `self` is a strict ancestor directory of `other`.
    #[must_use]
    pub fn is_ancestor_of(&self, other: &Uri) -> bool {
        other
            .value
            .strip_prefix(self.value.as_str())
            .is_some_and(|rest| rest.starts_with('/') || (self.value.ends_with('/') && !rest.is_empty()))
    }
}

fn invalid(uri: &str, reason: &str) -> Error {
    Error::InvalidUri {
        uri: uri.to_string(),
        reason: reason.to_string(),
    }
}

impl fmt::Display for Uri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.value)
    }
}

impl FromStr for Uri {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Uri {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        Self::parse(&value)
    }
}

impl From<Uri> for String {
    fn from(uri: Uri) -> Self {
        uri.value
    }
}
