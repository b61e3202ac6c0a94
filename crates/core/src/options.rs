//! Per-operation options
//!
//! Every optional parameter is an `Option` so that "not set" can be told
//! apart from "set to an empty string" when the request is built.

use std::collections::BTreeMap;

use crate::body::{BodySink, Content};
use crate::headers::Headers;

/// Options for listing the containers of an account
///
/// Query pairs are forwarded to the service verbatim, in insertion order.
#[derive(Debug, Clone, Default)]
pub struct ListContainersOptions {
    query: Vec<(String, String)>,
}

impl ListContainersOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Maximum number of containers to return
    pub fn limit(self, limit: u32) -> Self {
        self.param("limit", limit.to_string())
    }

    /// Return containers whose names sort after this one
    pub fn marker(self, marker: impl Into<String>) -> Self {
        self.param("marker", marker)
    }

    /// Return containers whose names sort before this one
    pub fn end_marker(self, end_marker: impl Into<String>) -> Self {
        self.param("end_marker", end_marker)
    }

    pub fn prefix(self, prefix: impl Into<String>) -> Self {
        self.param("prefix", prefix)
    }

    /// Add an arbitrary query parameter
    pub fn param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    pub fn query(&self) -> &[(String, String)] {
        &self.query
    }
}

/// Options for listing the objects of a container
#[derive(Debug, Clone, Default)]
pub struct ListObjectsOptions {
    /// Container to list
    pub container: String,

    /// Page size; the service default is requested explicitly when unset
    pub limit: Option<u32>,

    /// Return objects whose names sort after this one
    pub marker: Option<String>,

    /// Return objects whose names sort before this one
    pub end_marker: Option<String>,

    /// Only return objects whose names start with this prefix
    pub prefix: Option<String>,

    /// Roll up names sharing a prefix up to this character into `subdir` entries
    pub delimiter: Option<String>,

    /// Only return objects nested in this pseudo path
    pub path: Option<String>,
}

impl ListObjectsOptions {
    pub fn new(container: impl Into<String>) -> Self {
        Self {
            container: container.into(),
            ..Default::default()
        }
    }
}

/// Address of a single object
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ObjectRef {
    pub container: String,
    pub object: String,
}

impl ObjectRef {
    pub fn new(container: impl Into<String>, object: impl Into<String>) -> Self {
        Self {
            container: container.into(),
            object: object.into(),
        }
    }
}

impl std::fmt::Display for ObjectRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.container, self.object)
    }
}

/// Options for downloading an object
pub struct GetObjectOptions {
    pub target: ObjectRef,

    /// Receives body chunks as they arrive instead of buffering them
    pub sink: Option<Box<dyn BodySink>>,
}

impl GetObjectOptions {
    pub fn new(target: ObjectRef) -> Self {
        Self { target, sink: None }
    }

    pub fn with_sink(mut self, sink: impl BodySink + 'static) -> Self {
        self.sink = Some(Box::new(sink));
        self
    }
}

impl std::fmt::Debug for GetObjectOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GetObjectOptions")
            .field("target", &self.target)
            .field("sink", &self.sink.is_some())
            .finish()
    }
}

/// Options for creating or overwriting an object
#[derive(Debug)]
pub struct CreateObjectOptions {
    pub target: ObjectRef,

    /// Object payload
    pub content: Content,

    /// Explicit content type; the server detects one when unset
    pub content_type: Option<String>,

    /// Extra headers sent with the upload
    pub headers: Headers,

    /// User metadata stored with the object
    pub metadata: BTreeMap<String, String>,
}

impl CreateObjectOptions {
    pub fn new(target: ObjectRef, content: impl Into<Content>) -> Self {
        Self {
            target,
            content: content.into(),
            content_type: None,
            headers: Headers::new(),
            metadata: BTreeMap::new(),
        }
    }

    pub fn content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name, value);
        self
    }

    pub fn meta(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }
}
