//! Error type for loading and saving the quickstart version mapping.
//! Resolution itself never fails; only the loader returns these.
use std::fmt;
use std::io;
use std::path::PathBuf;

#[derive(Debug)]
pub enum QuickstartConfigError {
    /// Reading or writing a mapping file failed.
    Io {
        path: Option<PathBuf>,
        source: io::Error,
    },
    /// The mapping document could not be decoded.
    Parse(String),
    /// A remote document could not be fetched.
    Http(String),
    /// The mapping document has no "default" entry.
    MissingDefault,
}

impl QuickstartConfigError {
    pub(crate) fn io_at(path: impl Into<PathBuf>, source: io::Error) -> Self {
        QuickstartConfigError::Io {
            path: Some(path.into()),
            source,
        }
    }
}

impl fmt::Display for QuickstartConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QuickstartConfigError::Io {
                path: Some(p),
                source,
            } => write!(f, "cannot access {}: {}", p.display(), source),
            QuickstartConfigError::Io { path: None, source } => source.fmt(f),
            QuickstartConfigError::Parse(msg) => {
                write!(f, "invalid quickstart version mapping: {msg}")
            }
            QuickstartConfigError::Http(msg) => write!(f, "fetch failed: {msg}"),
            QuickstartConfigError::MissingDefault => write!(
                f,
                "quickstart version mapping has no \"default\" entry"
            ),
        }
    }
}

impl std::error::Error for QuickstartConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            QuickstartConfigError::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<io::Error> for QuickstartConfigError {
    fn from(e: io::Error) -> Self {
        QuickstartConfigError::Io {
            path: None,
            source: e,
        }
    }
}

impl From<serde_yaml::Error> for QuickstartConfigError {
    fn from(e: serde_yaml::Error) -> Self {
        QuickstartConfigError::Parse(e.to_string())
    }
}
