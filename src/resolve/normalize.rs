//! Lexical path normalization
//!
//! Collapses `.` and `..` without touching the filesystem. A `..` that would
//! climb above the root is an error, not a no-op.

use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};
use std::path::{Path, PathBuf};

/// Characters escaped when a segment is written back into a URL.
/// `:` is included so a relative link can never be read as a scheme.
pub const SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'\'')
    .add(b'/')
    .add(b':')
    .add(b';')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'[')
    .add(b'\\')
    .add(b']')
    .add(b'^')
    .add(b'`')
    .add(b'{')
    .add(b'|')
    .add(b'}');

/// The normalized form ascends above the root
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EscapesRoot;

/// A decoded request path reduced to plain segments below the root.
/// Segments are never empty, `.` or `..`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RelativePath {
    segments: Vec<String>,
}

impl RelativePath {
    pub fn normalize(decoded: &str) -> Result<Self, EscapesRoot> {
        let mut segments: Vec<String> = Vec::new();
        for segment in decoded.split('/') {
            match segment {
                "" | "." => {}
                ".." => {
                    if segments.pop().is_none() {
                        return Err(EscapesRoot);
                    }
                }
                name => segments.push(name.to_string()),
            }
        }
        Ok(Self { segments })
    }

    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn file_name(&self) -> Option<&str> {
        self.segments.last().map(String::as_str)
    }

    pub fn parent(&self) -> Self {
        let mut segments = self.segments.clone();
        segments.pop();
        Self { segments }
    }

    /// Filesystem path below `root`
    pub fn join_onto(&self, root: &Path) -> PathBuf {
        let mut path = root.to_path_buf();
        path.extend(&self.segments);
        path
    }

    /// Absolute, percent-encoded URL path; always starts with exactly one `/`
    pub fn to_url(&self, trailing_slash: bool) -> String {
        let mut url = String::from("/");
        let encoded: Vec<String> = self
            .segments
            .iter()
            .map(|s| utf8_percent_encode(s, SEGMENT).to_string())
            .collect();
        url.push_str(&encoded.join("/"));
        if trailing_slash && !self.is_root() {
            url.push('/');
        }
        url
    }

    /// Human-readable form, e.g. for listing titles
    pub fn display(&self) -> String {
        format!("/{}", self.segments.join("/"))
    }
}
