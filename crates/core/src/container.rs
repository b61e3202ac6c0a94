//! Container entity

use jiff::Timestamp;
use serde::Serialize;

use crate::client::ClientHandle;
use crate::error::Result;
use crate::object::StorageObject;
use crate::options::{ListObjectsOptions, ObjectRef};
use crate::response::Envelope;

/// A container as reported by an account listing
#[derive(Debug, Clone, Serialize)]
pub struct Container {
    name: String,
    /// Number of objects
    count: u64,
    /// Total size of all objects in bytes
    bytes: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    last_modified: Option<Timestamp>,
    #[serde(skip)]
    client: ClientHandle,
}

impl Container {
    pub(crate) fn new(
        name: String,
        count: u64,
        bytes: u64,
        last_modified: Option<Timestamp>,
        client: ClientHandle,
    ) -> Self {
        Self {
            name,
            count,
            bytes,
            last_modified,
            client,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn count(&self) -> u64 {
        self.count
    }

    pub fn bytes(&self) -> u64 {
        self.bytes
    }

    pub fn last_modified(&self) -> Option<Timestamp> {
        self.last_modified
    }

    /// List objects in this container
    ///
    /// The container field of `options` is overridden with this container's name.
    pub async fn list_objects(
        &self,
        mut options: ListObjectsOptions,
    ) -> Result<Envelope<Vec<StorageObject>>> {
        let client = self.client.client(&self.name)?;
        options.container = self.name.clone();
        client.list_objects(options).await
    }

    /// Fetch metadata of one object in this container
    pub async fn get_object_metadata(
        &self,
        object: impl Into<String>,
    ) -> Result<Envelope<StorageObject>> {
        let client = self.client.client(&self.name)?;
        client
            .get_object_metadata(ObjectRef::new(&self.name, object))
            .await
    }
}
