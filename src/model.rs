//! Identity types shared across the engine: coordinates, locations and
//! dependency scopes.

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{Error, Result};

/// A `group:artifact[:version]` triple identifying a project, plugin or
/// dependency.
///
/// The version may be absent for a bare group/artifact reference, which is how
/// plugin implications and management qualifiers refer to artifacts.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Coordinate {
    group_id: String,
    artifact_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    version: Option<String>,
}

impl Coordinate {
    /// Creates a fully versioned coordinate.
    pub fn new(group_id: &str, artifact_id: &str, version: &str) -> Self {
        Self {
            group_id: group_id.to_string(),
            artifact_id: artifact_id.to_string(),
            version: Some(version.to_string()),
        }
    }

    /// Creates a group/artifact reference without a version.
    pub fn unversioned(group_id: &str, artifact_id: &str) -> Self {
        Self {
            group_id: group_id.to_string(),
            artifact_id: artifact_id.to_string(),
            version: None,
        }
    }

    pub fn group_id(&self) -> &str {
        &self.group_id
    }

    pub fn artifact_id(&self) -> &str {
        &self.artifact_id
    }

    pub fn version(&self) -> Option<&str> {
        self.version.as_deref()
    }

    /// Returns the same group/artifact with the version dropped.
    pub fn without_version(&self) -> Self {
        Self::unversioned(&self.group_id, &self.artifact_id)
    }

    /// Repository-layout path of this coordinate's descriptor, e.g.
    /// `org/foo/bar/1.0/bar-1.0.pom`.
    pub fn repository_path(&self) -> Result<String> {
        let version = self.version.as_deref().ok_or_else(|| Error::InvalidCoordinate {
            message: format!("{} has no version; cannot locate its descriptor", self),
        })?;

        Ok(format!(
            "{}/{}/{}/{}-{}.pom",
            self.group_id.replace('.', "/"),
            self.artifact_id,
            version,
            self.artifact_id,
            version
        ))
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.version {
            Some(version) => write!(f, "{}:{}:{}", self.group_id, self.artifact_id, version),
            None => write!(f, "{}:{}", self.group_id, self.artifact_id),
        }
    }
}

impl FromStr for Coordinate {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let parts: Vec<&str> = s.trim().split(':').collect();
        if parts.iter().any(|part| part.trim().is_empty()) {
            return Err(Error::InvalidCoordinate {
                message: format!("'{}' has an empty part", s),
            });
        }

        match parts.as_slice() {
            [group_id, artifact_id] => Ok(Self::unversioned(group_id, artifact_id)),
            [group_id, artifact_id, version] => Ok(Self::new(group_id, artifact_id, version)),
            _ => Err(Error::InvalidCoordinate {
                message: format!("'{}' is not of the form group:artifact[:version]", s),
            }),
        }
    }
}

/// Opaque identifier of the source a document was fetched from.
///
/// Together with the coordinate it forms the identity of a cached document.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Location {
    url: Url,
}

impl Location {
    /// Parses a location from a URL string.
    pub fn new(url: &str) -> Result<Self> {
        Ok(Self {
            url: Url::parse(url)?,
        })
    }

    pub fn from_url(url: Url) -> Self {
        Self { url }
    }

    /// Builds a `file://` location for a repository root directory.
    pub fn from_directory(path: &Path) -> Result<Self> {
        let absolute = if path.is_absolute() {
            path.to_path_buf()
        } else {
            std::env::current_dir()?.join(path)
        };

        let url = Url::from_directory_path(&absolute).map_err(|_| Error::InvalidLocation {
            location: absolute.display().to_string(),
            message: "not representable as a file URL".to_string(),
        })?;

        Ok(Self { url })
    }

    pub fn url(&self) -> &Url {
        &self.url
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.url)
    }
}

/// Scope of a dependency declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DependencyScope {
    Compile,
    Provided,
    Runtime,
    Test,
    System,
    Import,
    /// Scope of dependencies that extend a plugin's own classpath.
    Toolchain,
}

impl DependencyScope {
    /// Interprets scope text from a document; absent or unknown text means
    /// `compile`.
    pub fn from_text(text: Option<&str>) -> Self {
        match text.map(str::trim) {
            Some("provided") => Self::Provided,
            Some("runtime") => Self::Runtime,
            Some("test") => Self::Test,
            Some("system") => Self::System,
            Some("import") => Self::Import,
            Some("toolchain") => Self::Toolchain,
            _ => Self::Compile,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Compile => "compile",
            Self::Provided => "provided",
            Self::Runtime => "runtime",
            Self::Test => "test",
            Self::System => "system",
            Self::Import => "import",
            Self::Toolchain => "toolchain",
        }
    }
}

impl fmt::Display for DependencyScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
