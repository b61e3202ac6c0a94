//! Response parsing
//!
//! Raw transport responses are turned into an [`Envelope`] in a single step,
//! after the transport call has completed. Entities are only attached when
//! the service answered with a 2xx status.

use bytes::Bytes;
use http::StatusCode;
use serde::Deserialize;

use crate::client::ClientHandle;
use crate::container::Container;
use crate::error::{Error, Result};
use crate::headers::Headers;
use crate::object::{ObjectAttributes, StorageObject, parse_listing_timestamp};
use crate::options::ObjectRef;

/// Raw response returned by a transport
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: StatusCode,
    pub headers: Headers,
    /// Empty when the body was streamed to a sink
    pub body: Bytes,
}

impl HttpResponse {
    pub fn new(status: StatusCode) -> Self {
        Self {
            status,
            headers: Headers::new(),
            body: Bytes::new(),
        }
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.append(name, value);
        self
    }

    pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self
    }

    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }
}

/// Uniform return value of every client operation
///
/// Carries the raw response alongside the parsed entity, if any.
#[derive(Debug)]
pub struct Envelope<T> {
    status: StatusCode,
    headers: Headers,
    body: Bytes,
    entity: Option<T>,
}

impl<T> Envelope<T> {
    fn new(response: HttpResponse, entity: Option<T>) -> Self {
        Self {
            status: response.status,
            headers: response.headers,
            body: response.body,
            entity,
        }
    }

    /// Whether the service answered with a 2xx status
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn headers(&self) -> &Headers {
        &self.headers
    }

    pub fn body(&self) -> &Bytes {
        &self.body
    }

    pub fn entity(&self) -> Option<&T> {
        self.entity.as_ref()
    }

    pub fn entity_mut(&mut self) -> Option<&mut T> {
        self.entity.as_mut()
    }

    pub fn into_entity(self) -> Option<T> {
        self.entity
    }

    /// Take the entity, turning a failed response into an error
    ///
    /// `context` names the addressed resource in the error message.
    pub fn into_result(self, context: impl Into<String>) -> Result<T> {
        let status = self.status;
        self.entity
            .ok_or_else(|| Error::from_status(status, context))
    }
}

#[derive(Debug, Deserialize)]
struct ContainerRecord {
    name: String,
    #[serde(default)]
    count: u64,
    #[serde(default)]
    bytes: u64,
    #[serde(default)]
    last_modified: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ObjectRecord {
    Subdir {
        subdir: String,
    },
    Object {
        name: String,
        bytes: Option<u64>,
        hash: Option<String>,
        last_modified: Option<String>,
        content_type: Option<String>,
    },
}

/// Parse a container listing (`GET /`)
///
/// Containers keep the order the service returned them in.
pub fn parse_containers(
    response: HttpResponse,
    client: &ClientHandle,
) -> Result<Envelope<Vec<Container>>> {
    if !response.is_success() {
        return Ok(Envelope::new(response, None));
    }

    let records: Vec<ContainerRecord> = serde_json::from_slice(&response.body)?;
    let containers = records
        .into_iter()
        .map(|r| {
            Container::new(
                r.name,
                r.count,
                r.bytes,
                r.last_modified.as_deref().and_then(parse_listing_timestamp),
                client.clone(),
            )
        })
        .collect();

    Ok(Envelope::new(response, Some(containers)))
}

/// Parse an object listing (`GET /{container}`)
///
/// The container name comes from the call, not from the body.
pub fn parse_objects(
    response: HttpResponse,
    container: &str,
    client: &ClientHandle,
) -> Result<Envelope<Vec<StorageObject>>> {
    if !response.is_success() {
        return Ok(Envelope::new(response, None));
    }

    let records: Vec<ObjectRecord> = serde_json::from_slice(&response.body)?;
    let objects = records
        .into_iter()
        .map(|record| match record {
            ObjectRecord::Subdir { subdir } => {
                StorageObject::dir(container, subdir, client.clone())
            }
            ObjectRecord::Object {
                name,
                bytes,
                hash,
                last_modified,
                content_type,
            } => {
                let attributes = ObjectAttributes {
                    content_type,
                    size: bytes,
                    etag: hash,
                    last_modified: last_modified.as_deref().and_then(parse_listing_timestamp),
                    ..Default::default()
                };
                StorageObject::new(container, name, attributes, client.clone())
            }
        })
        .collect();

    Ok(Envelope::new(response, Some(objects)))
}

/// Build the single object addressed by a request from its response headers
///
/// The body is never inspected, so this works for GET, PUT, DELETE and HEAD.
pub fn parse_object(
    response: HttpResponse,
    target: &ObjectRef,
    client: &ClientHandle,
) -> Envelope<StorageObject> {
    if !response.is_success() {
        return Envelope::new(response, None);
    }

    let attributes = ObjectAttributes::from_headers(&response.headers);
    let object = StorageObject::new(
        &target.container,
        &target.object,
        attributes,
        client.clone(),
    );
    Envelope::new(response, Some(object))
}
