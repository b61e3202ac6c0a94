//! Request builder
//!
//! Turns operation options into a transport-agnostic [`HttpRequest`]. Nothing
//! here performs I/O; the auth header is attached by the client right before
//! the request is handed to the transport.

use http::Method;

use crate::body::{Body, BodySink};
use crate::error::{Error, Result};
use crate::headers::Headers;
use crate::metadata::encode_metadata;
use crate::options::{
    CreateObjectOptions, GetObjectOptions, ListContainersOptions, ListObjectsOptions, ObjectRef,
};
use crate::token::Token;

/// Header carrying the auth token
pub const AUTH_TOKEN_HEADER: &str = "X-Auth-Token";

/// Header asking the server to sniff the content type of an upload
pub const DETECT_CONTENT_TYPE_HEADER: &str = "X-Detect-Content-Type";

pub const CONTENT_TYPE_HEADER: &str = "Content-Type";

/// Page size requested when the caller does not pick one
pub const DEFAULT_LIST_LIMIT: u32 = 1000;

const FORMAT_PARAM: &str = "format";
const JSON_FORMAT: &str = "json";

/// A fully specified HTTP request, relative to the account storage URL
pub struct HttpRequest {
    pub method: Method,

    /// `/`, `/{container}` or `/{container}/{object}`, not percent-encoded
    pub path: String,

    /// Query pairs in the order they should be sent
    pub query: Vec<(String, String)>,

    pub headers: Headers,

    pub body: Option<Body>,

    /// Where the transport should stream the response body, if anywhere
    pub sink: Option<Box<dyn BodySink>>,
}

impl HttpRequest {
    fn new(method: Method, path: String) -> Self {
        Self {
            method,
            path,
            query: Vec::new(),
            headers: Headers::new(),
            body: None,
            sink: None,
        }
    }

    /// First value of a query parameter
    pub fn query_param(&self, key: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// `GET /` listing the account's containers
    pub fn list_containers(options: &ListContainersOptions) -> Self {
        let mut request = Self::new(Method::GET, "/".to_string());
        request.query = options
            .query()
            .iter()
            .filter(|(k, _)| k != FORMAT_PARAM)
            .cloned()
            .collect();
        request.push_query(FORMAT_PARAM, JSON_FORMAT);
        request
    }

    /// `GET /{container}` listing one page of objects
    pub fn list_objects(options: &ListObjectsOptions) -> Result<Self> {
        let mut request = Self::new(Method::GET, container_path(&options.container)?);

        let limit = options.limit.unwrap_or(DEFAULT_LIST_LIMIT);
        request.push_query("limit", limit.to_string());
        request.push_optional("marker", &options.marker);
        request.push_optional("end_marker", &options.end_marker);
        request.push_optional("prefix", &options.prefix);
        request.push_query(FORMAT_PARAM, JSON_FORMAT);
        request.push_optional("delimiter", &options.delimiter);
        request.push_optional("path", &options.path);

        Ok(request)
    }

    /// `GET /{container}/{object}` downloading content
    pub fn get_object(options: GetObjectOptions) -> Result<Self> {
        let mut request = Self::new(Method::GET, object_path(&options.target)?);
        request.sink = options.sink;
        Ok(request)
    }

    /// `PUT /{container}/{object}` uploading content
    pub fn create_object(options: CreateObjectOptions) -> Result<Self> {
        let mut request = Self::new(Method::PUT, object_path(&options.target)?);

        let mut headers = options.headers;
        match options.content_type {
            Some(content_type) => {
                headers.remove(DETECT_CONTENT_TYPE_HEADER);
                headers.insert(CONTENT_TYPE_HEADER, content_type);
            }
            None => {
                headers.remove(CONTENT_TYPE_HEADER);
                headers.insert(DETECT_CONTENT_TYPE_HEADER, "true");
            }
        }
        encode_metadata(&options.metadata, &mut headers);

        request.headers = headers;
        request.body = Some(options.content.into_body());
        Ok(request)
    }

    /// `DELETE /{container}/{object}`
    pub fn delete_object(target: &ObjectRef) -> Result<Self> {
        Ok(Self::new(Method::DELETE, object_path(target)?))
    }

    /// `HEAD /{container}/{object}` fetching metadata only
    pub fn head_object(target: &ObjectRef) -> Result<Self> {
        Ok(Self::new(Method::HEAD, object_path(target)?))
    }

    /// Attach the auth header for `token`, replacing any earlier one
    pub fn authorize(&mut self, token: &Token) {
        self.headers.insert(AUTH_TOKEN_HEADER, token.id());
    }

    fn push_query(&mut self, key: &str, value: impl Into<String>) {
        self.query.push((key.to_string(), value.into()));
    }

    fn push_optional(&mut self, key: &str, value: &Option<String>) {
        if let Some(value) = value {
            self.push_query(key, value.clone());
        }
    }
}

impl std::fmt::Debug for HttpRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpRequest")
            .field("method", &self.method)
            .field("path", &self.path)
            .field("query", &self.query)
            .field("body", &self.body)
            .field("sink", &self.sink.is_some())
            .finish_non_exhaustive()
    }
}

fn container_path(container: &str) -> Result<String> {
    if container.is_empty() {
        return Err(Error::MissingParameter("container_name"));
    }
    if container.contains('/') {
        return Err(Error::InvalidPath(format!(
            "Container name cannot contain '/': {container}"
        )));
    }
    Ok(format!("/{container}"))
}

fn object_path(target: &ObjectRef) -> Result<String> {
    let container = container_path(&target.container)?;
    if target.object.is_empty() {
        return Err(Error::MissingParameter("object_name"));
    }
    Ok(format!("{container}/{}", target.object))
}
