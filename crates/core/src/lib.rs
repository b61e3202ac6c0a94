//! stk-core: Core library for the stacktor Swift client
//!
//! This crate provides:
//! - The request/response model for the Swift object API
//! - The [`Client`] facade and the [`Container`] / [`StorageObject`] entities
//! - Configuration, profile and path handling for the CLI
//!
//! Nothing in here opens a socket. Requests are executed by a [`Transport`]
//! implementation, which keeps the crate testable and independent of any
//! particular HTTP stack.

pub mod body;
pub mod client;
pub mod config;
pub mod container;
pub mod error;
pub mod headers;
pub mod metadata;
pub mod object;
pub mod options;
pub mod path;
pub mod profile;
pub mod request;
pub mod response;
pub mod token;
pub mod transport;

pub use body::{Body, BodySink, Content};
pub use client::{Client, ClientHandle};
pub use config::{Config, ConfigManager};
pub use container::Container;
pub use error::{Error, Result};
pub use headers::Headers;
pub use object::{ObjectAttributes, StorageObject};
pub use options::{
    CreateObjectOptions, GetObjectOptions, ListContainersOptions, ListObjectsOptions, ObjectRef,
};
pub use path::{RemotePath, parse_path};
pub use profile::{Profile, ProfileManager, TimeoutConfig};
pub use request::HttpRequest;
pub use response::{Envelope, HttpResponse};
pub use token::Token;
pub use transport::Transport;
