//! Storage object entity

use std::collections::BTreeMap;

use jiff::Timestamp;
use serde::Serialize;

use crate::client::ClientHandle;
use crate::error::Result;
use crate::headers::Headers;
use crate::metadata::decode_metadata;
use crate::options::ObjectRef;
use crate::response::Envelope;

/// Attributes of an object as last reported by the service
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ObjectAttributes {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,

    /// Size in bytes
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,

    /// MD5 of the content as computed by the service
    #[serde(skip_serializing_if = "Option::is_none")]
    pub etag: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_modified: Option<Timestamp>,

    /// User metadata (`X-Object-Meta-*`)
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub metadata: BTreeMap<String, String>,
}

impl ObjectAttributes {
    /// Read attributes from object response headers
    pub fn from_headers(headers: &Headers) -> Self {
        Self {
            content_type: headers.get("Content-Type").map(str::to_string),
            size: headers
                .get("Content-Length")
                .and_then(|v| v.trim().parse().ok()),
            etag: headers
                .get("ETag")
                .map(|v| v.trim_matches('"').to_string()),
            last_modified: headers.get("Last-Modified").and_then(parse_http_date),
            metadata: decode_metadata(headers),
        }
    }
}

/// A single object stored in a container
///
/// This is a snapshot: it only changes when [`StorageObject::reload`] is
/// called.
#[derive(Debug, Clone, Serialize)]
pub struct StorageObject {
    name: String,
    container: String,
    is_dir: bool,
    #[serde(flatten)]
    attributes: ObjectAttributes,
    #[serde(skip)]
    client: ClientHandle,
}

impl StorageObject {
    pub(crate) fn new(
        container: impl Into<String>,
        name: impl Into<String>,
        attributes: ObjectAttributes,
        client: ClientHandle,
    ) -> Self {
        Self {
            name: name.into(),
            container: container.into(),
            is_dir: false,
            attributes,
            client,
        }
    }

    /// Pseudo-directory entry from a delimited listing
    pub(crate) fn dir(
        container: impl Into<String>,
        name: impl Into<String>,
        client: ClientHandle,
    ) -> Self {
        Self {
            is_dir: true,
            ..Self::new(container, name, ObjectAttributes::default(), client)
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn container(&self) -> &str {
        &self.container
    }

    /// Whether this is a `subdir` roll-up rather than a stored object
    pub fn is_dir(&self) -> bool {
        self.is_dir
    }

    pub fn attributes(&self) -> &ObjectAttributes {
        &self.attributes
    }

    pub fn content_type(&self) -> Option<&str> {
        self.attributes.content_type.as_deref()
    }

    pub fn size(&self) -> Option<u64> {
        self.attributes.size
    }

    pub fn etag(&self) -> Option<&str> {
        self.attributes.etag.as_deref()
    }

    pub fn last_modified(&self) -> Option<Timestamp> {
        self.attributes.last_modified
    }

    pub fn metadata(&self) -> &BTreeMap<String, String> {
        &self.attributes.metadata
    }

    pub fn target(&self) -> ObjectRef {
        ObjectRef::new(&self.container, &self.name)
    }

    /// Re-fetch attributes with a HEAD request and overwrite this snapshot
    pub async fn reload(&mut self) -> Result<()> {
        let target = self.target();
        let client = self.client.client(&target.to_string())?;
        let envelope = client.get_object_metadata(target.clone()).await?;
        let fresh = envelope.into_result(target.to_string())?;

        self.attributes = fresh.attributes;
        self.is_dir = false;
        Ok(())
    }

    /// Delete this object from its container
    pub async fn delete(&self) -> Result<Envelope<StorageObject>> {
        let target = self.target();
        let client = self.client.client(&target.to_string())?;
        client.delete_object(target).await
    }
}

/// Parse `last_modified` from a JSON listing
///
/// Swift reports UTC without an offset, e.g. `2024-01-02T03:04:05.123456`.
pub(crate) fn parse_listing_timestamp(value: &str) -> Option<Timestamp> {
    if let Ok(ts) = value.parse::<Timestamp>() {
        return Some(ts);
    }
    value
        .parse::<jiff::civil::DateTime>()
        .ok()?
        .to_zoned(jiff::tz::TimeZone::UTC)
        .ok()
        .map(|zdt| zdt.timestamp())
}

/// Parse an HTTP-date header such as `Last-Modified`
fn parse_http_date(value: &str) -> Option<Timestamp> {
    jiff::fmt::rfc2822::parse(value)
        .ok()
        .map(|zdt| zdt.timestamp())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    #[test]
    fn test_attributes_from_headers() {
        let headers: Headers = [
            ("Content-Type", "text/plain"),
            ("Content-Length", "12"),
            ("ETag", "\"abc123\""),
            ("X-Object-Meta-Owner", "alice"),
            ("X-Timestamp", "1704164645.00000"),
        ]
        .into_iter()
        .collect();
        let attributes = ObjectAttributes::from_headers(&headers);
        assert_eq!(attributes.content_type.as_deref(), Some("text/plain"));
        assert_eq!(attributes.size, Some(12));
        assert_eq!(attributes.etag.as_deref(), Some("abc123"));
        assert!(attributes.last_modified.is_none());
        assert_eq!(attributes.metadata.len(), 1);
        assert_eq!(attributes.metadata["Owner"], "alice");
    }

    #[test]
    fn test_bad_content_length_ignored() {
        let headers: Headers = [("Content-Length", "lots")].into_iter().collect();
        assert!(ObjectAttributes::from_headers(&headers).size.is_none());
    }

    #[test]
    fn test_parse_listing_timestamp() {
        let ts = parse_listing_timestamp("2024-01-02T03:04:05.500000").unwrap();
        assert_eq!(ts.to_string(), "2024-01-02T03:04:05.5Z");

        let ts = parse_listing_timestamp("2024-01-02T03:04:05Z").unwrap();
        assert_eq!(ts.as_second(), 1704164645);

        assert!(parse_listing_timestamp("yesterday").is_none());
    }

    #[test]
    fn test_parse_http_date() {
        let ts = parse_http_date("Tue, 02 Jan 2024 03:04:05 GMT").unwrap();
        assert_eq!(ts.as_second(), 1704164645);
        assert!(parse_http_date("not a date").is_none());
    }

    #[tokio::test]
    async fn test_reload_without_client_fails() {
        let mut object = StorageObject::new(
            "photos",
            "cat.jpg",
            ObjectAttributes::default(),
            ClientHandle::default(),
        );
        assert!(matches!(
            object.reload().await,
            Err(Error::ClientDropped(ref s)) if s == "photos/cat.jpg"
        ));
    }

    #[test]
    fn test_serialize_flattens_attributes() {
        let attributes = ObjectAttributes {
            size: Some(3),
            ..Default::default()
        };
        let object = StorageObject::new("docs", "a.txt", attributes, ClientHandle::default());
        let json = serde_json::to_value(&object).unwrap();
        assert_eq!(json["name"], "a.txt");
        assert_eq!(json["container"], "docs");
        assert_eq!(json["size"], 3);
        assert!(json.get("metadata").is_none());
    }
}
