//! Remote path parsing
//!
//! Remote paths have the form `profile[/container[/object]]`. Object names
//! may contain further slashes; only the first two separate components.

use crate::error::{Error, Result};
use crate::options::ObjectRef;

/// A parsed `profile/container/object` path
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemotePath {
    pub profile: String,
    /// Empty when the path addresses the whole account
    pub container: String,
    /// Empty when the path addresses a container
    pub object: String,
}

impl RemotePath {
    pub fn new(
        profile: impl Into<String>,
        container: impl Into<String>,
        object: impl Into<String>,
    ) -> Self {
        Self {
            profile: profile.into(),
            container: container.into(),
            object: object.into(),
        }
    }

    /// Path addresses the account (container listing)
    pub fn is_account(&self) -> bool {
        self.container.is_empty()
    }

    /// Whether the object part ends with `/`
    pub fn is_dir(&self) -> bool {
        self.object.is_empty() || self.object.ends_with('/')
    }

    /// Object addressed by this path
    ///
    /// Fails when the path stops at the account or container level.
    pub fn object_ref(&self) -> Result<ObjectRef> {
        if self.container.is_empty() || self.object.is_empty() {
            return Err(Error::InvalidPath(format!(
                "'{self}' does not name an object. Use format: profile/container/object"
            )));
        }
        Ok(ObjectRef::new(&self.container, &self.object))
    }

    /// Append a name below a directory-like path
    pub fn join(&self, child: &str) -> Self {
        let base = self.object.trim_end_matches('/');
        let object = if base.is_empty() {
            child.to_string()
        } else {
            format!("{base}/{child}")
        };
        Self {
            profile: self.profile.clone(),
            container: self.container.clone(),
            object,
        }
    }
}

impl std::fmt::Display for RemotePath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.profile)?;
        if !self.container.is_empty() {
            write!(f, "/{}", self.container)?;
        }
        if !self.object.is_empty() {
            write!(f, "/{}", self.object)?;
        }
        Ok(())
    }
}

/// Parse a remote path string
pub fn parse_path(path: &str) -> Result<RemotePath> {
    if path.is_empty() {
        return Err(Error::InvalidPath("Path cannot be empty".into()));
    }

    let mut parts = path.splitn(3, '/');
    let profile = parts.next().unwrap_or_default();
    let container = parts.next().unwrap_or_default();
    let object = parts.next().unwrap_or_default();

    if !is_valid_profile_name(profile) {
        return Err(Error::InvalidPath(format!(
            "Invalid profile name in '{path}'. Use format: profile[/container[/object]]"
        )));
    }
    if container.is_empty() && !object.is_empty() {
        return Err(Error::InvalidPath(format!(
            "Container name cannot be empty in '{path}'"
        )));
    }

    Ok(RemotePath::new(profile, container, object))
}

/// Profile names are alphanumeric plus `_` and `-`
pub fn is_valid_profile_name(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}
