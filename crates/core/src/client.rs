//! Swift client facade
//!
//! Every operation follows the same path: build an [`HttpRequest`], attach
//! the current token, run it through the [`Transport`], and parse the
//! response into an [`Envelope`].

use std::sync::{Arc, PoisonError, RwLock, Weak};

use crate::container::Container;
use crate::error::{Error, Result};
use crate::object::StorageObject;
use crate::options::{
    CreateObjectOptions, GetObjectOptions, ListContainersOptions, ListObjectsOptions, ObjectRef,
};
use crate::request::HttpRequest;
use crate::response::{Envelope, HttpResponse, parse_containers, parse_object, parse_objects};
use crate::token::Token;
use crate::transport::Transport;

struct ClientInner {
    transport: Arc<dyn Transport>,
    token: RwLock<Option<Token>>,
}

/// Client for one Swift account
///
/// Cloning is cheap; clones share the transport and the token.
#[derive(Clone)]
pub struct Client {
    inner: Arc<ClientInner>,
}

impl Client {
    /// Create a client without a token
    pub fn new(transport: impl Transport + 'static) -> Self {
        Self::from_shared(Arc::new(transport))
    }

    pub fn from_shared(transport: Arc<dyn Transport>) -> Self {
        Self {
            inner: Arc::new(ClientInner {
                transport,
                token: RwLock::new(None),
            }),
        }
    }

    /// Non-owning reference handed to the entities this client creates
    pub fn handle(&self) -> ClientHandle {
        ClientHandle {
            inner: Arc::downgrade(&self.inner),
        }
    }

    /// Current token, if any
    pub fn token(&self) -> Option<Token> {
        self.inner
            .token
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Replace the token used for subsequent requests
    pub fn set_token(&self, token: Token) {
        *self
            .inner
            .token
            .write()
            .unwrap_or_else(PoisonError::into_inner) = Some(token);
    }

    /// Whether a token is set and still valid
    ///
    /// Requests are not blocked on an invalid token; callers decide whether
    /// to refresh first.
    pub fn has_valid_token(&self) -> bool {
        self.token().is_some_and(|t| t.is_valid())
    }

    /// List the containers of the account
    pub async fn list_containers(
        &self,
        options: ListContainersOptions,
    ) -> Result<Envelope<Vec<Container>>> {
        let request = HttpRequest::list_containers(&options);
        let response = self.send(request).await?;
        parse_containers(response, &self.handle())
    }

    /// List one page of objects in a container
    pub async fn list_objects(
        &self,
        options: ListObjectsOptions,
    ) -> Result<Envelope<Vec<StorageObject>>> {
        let request = HttpRequest::list_objects(&options)?;
        let response = self.send(request).await?;
        parse_objects(response, &options.container, &self.handle())
    }

    /// Download an object
    ///
    /// With a sink set, content is streamed to it and the envelope body is empty.
    pub async fn get_object_content(
        &self,
        options: GetObjectOptions,
    ) -> Result<Envelope<StorageObject>> {
        let target = options.target.clone();
        let request = HttpRequest::get_object(options)?;
        let response = self.send(request).await?;
        Ok(parse_object(response, &target, &self.handle()))
    }

    /// Create or overwrite an object
    ///
    /// On success the returned object is reloaded so it carries the
    /// attributes the service computed (hash, detected content type, ...).
    pub async fn create_object(
        &self,
        options: CreateObjectOptions,
    ) -> Result<Envelope<StorageObject>> {
        let target = options.target.clone();
        let request = HttpRequest::create_object(options)?;
        let response = self.send(request).await?;
        let mut envelope = parse_object(response, &target, &self.handle());
        if let Some(object) = envelope.entity_mut() {
            object.reload().await?;
        }
        Ok(envelope)
    }

    /// Delete an object
    pub async fn delete_object(&self, target: ObjectRef) -> Result<Envelope<StorageObject>> {
        let request = HttpRequest::delete_object(&target)?;
        let response = self.send(request).await?;
        Ok(parse_object(response, &target, &self.handle()))
    }

    /// Fetch object attributes and user metadata without the content
    pub async fn get_object_metadata(
        &self,
        target: ObjectRef,
    ) -> Result<Envelope<StorageObject>> {
        let request = HttpRequest::head_object(&target)?;
        let response = self.send(request).await?;
        Ok(parse_object(response, &target, &self.handle()))
    }

    async fn send(&self, mut request: HttpRequest) -> Result<HttpResponse> {
        let token = self
            .token()
            .ok_or_else(|| Error::Auth("no token configured".into()))?;
        request.authorize(&token);

        tracing::debug!(method = %request.method, path = %request.path, "Sending request");
        let response = self.inner.transport.execute(request).await?;
        tracing::debug!(status = %response.status, "Received response");

        Ok(response)
    }
}

impl std::fmt::Debug for Client {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Client")
            .field("token", &self.token())
            .finish_non_exhaustive()
    }
}

/// Weak reference from an entity back to its client
#[derive(Clone, Default)]
pub struct ClientHandle {
    inner: Weak<ClientInner>,
}

impl ClientHandle {
    /// Get the client back, if it is still alive
    pub fn upgrade(&self) -> Option<Client> {
        self.inner.upgrade().map(|inner| Client { inner })
    }

    pub(crate) fn client(&self, context: &str) -> Result<Client> {
        self.upgrade()
            .ok_or_else(|| Error::ClientDropped(context.to_string()))
    }
}

impl std::fmt::Debug for ClientHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientHandle")
            .field("attached", &(self.inner.strong_count() > 0))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::body::Content;
    use crate::transport::MockTransport;
    use bytes::Bytes;
    use futures::stream;
    use http::{Method, StatusCode};
    use std::sync::Mutex;

    fn client_with(transport: MockTransport) -> Client {
        let client = Client::new(transport);
        client.set_token(Token::new("AUTH_tk"));
        client
    }

    fn object_response() -> HttpResponse {
        HttpResponse::new(StatusCode::OK)
            .with_header("content-type", "text/plain")
            .with_header("content-length", "11")
            .with_header("etag", "5eb63bbbe01eeed093cb22bb8f5acdc3")
            .with_header("last-modified", "Tue, 02 Jan 2024 03:04:05 GMT")
            .with_header("x-object-meta-color", "red")
    }

    #[tokio::test]
    async fn test_list_containers() {
        let mut transport = MockTransport::new();
        transport
            .expect_execute()
            .withf(|req| {
                req.method == Method::GET
                    && req.path == "/"
                    && req.query_param("format") == Some("json")
                    && req.headers.get("X-Auth-Token") == Some("AUTH_tk")
            })
            .times(1)
            .returning(|_| {
                Ok(HttpResponse::new(StatusCode::OK).with_body(r#"[{"name":"a"},{"name":"b"}]"#))
            });

        let client = client_with(transport);
        let envelope = client
            .list_containers(ListContainersOptions::new())
            .await
            .unwrap();
        assert!(envelope.is_success());
        let names: Vec<&str> = envelope.entity().unwrap().iter().map(|c| c.name()).collect();
        assert_eq!(names, vec!["a", "b"]);
    }

    #[tokio::test]
    async fn test_failed_call_has_no_entity() {
        let mut transport = MockTransport::new();
        transport
            .expect_execute()
            .returning(|_| Ok(HttpResponse::new(StatusCode::NOT_FOUND).with_body("[]")));

        let client = client_with(transport);
        let envelope = client
            .list_objects(ListObjectsOptions::new("missing"))
            .await
            .unwrap();
        assert!(!envelope.is_success());
        assert!(envelope.entity().is_none());
        assert_eq!(envelope.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_missing_token_never_reaches_transport() {
        let mut transport = MockTransport::new();
        transport.expect_execute().never();

        let client = Client::new(transport);
        let result = client
            .get_object_metadata(ObjectRef::new("photos", "cat.jpg"))
            .await;
        assert!(matches!(result, Err(Error::Auth(_))));
    }

    #[tokio::test]
    async fn test_token_read_at_send_time() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let recorder = seen.clone();

        let mut transport = MockTransport::new();
        transport.expect_execute().times(2).returning(move |req| {
            let token = req.headers.get("X-Auth-Token").unwrap_or_default().to_string();
            recorder.lock().unwrap().push(token);
            Ok(object_response())
        });

        let client = Client::new(transport);
        client.set_token(Token::new("first"));
        assert!(client.has_valid_token());
        let target = ObjectRef::new("photos", "cat.jpg");
        client.get_object_metadata(target.clone()).await.unwrap();
        client.set_token(Token::new("second"));
        client.get_object_metadata(target).await.unwrap();

        assert_eq!(*seen.lock().unwrap(), vec!["first", "second"]);
    }

    #[tokio::test]
    async fn test_invalid_token_still_sent() {
        let mut transport = MockTransport::new();
        transport
            .expect_execute()
            .times(1)
            .returning(|_| Ok(HttpResponse::new(StatusCode::UNAUTHORIZED)));

        let client = Client::new(transport);
        client.set_token(Token::new(""));
        assert!(!client.has_valid_token());
        let envelope = client
            .list_containers(ListContainersOptions::new())
            .await
            .unwrap();
        assert!(!envelope.is_success());
    }

    #[tokio::test]
    async fn test_list_objects_scoped_to_container() {
        let mut transport = MockTransport::new();
        transport
            .expect_execute()
            .withf(|req| req.path == "/")
            .returning(|_| {
                Ok(HttpResponse::new(StatusCode::OK)
                    .with_body(r#"[{"name":"docs","count":1,"bytes":5}]"#))
            });
        transport
            .expect_execute()
            .withf(|req| {
                req.path == "/docs"
                    && req.query_param("prefix") == Some("2024/")
                    && req.query_param("limit") == Some("1000")
            })
            .times(1)
            .returning(|_| {
                Ok(HttpResponse::new(StatusCode::OK)
                    .with_body(r#"[{"name":"2024/a.txt","bytes":5,"hash":"abc"}]"#))
            });

        let client = client_with(transport);
        let containers = client
            .list_containers(ListContainersOptions::new())
            .await
            .unwrap()
            .into_entity()
            .unwrap();

        let options = ListObjectsOptions {
            prefix: Some("2024/".into()),
            ..ListObjectsOptions::new("ignored")
        };
        let objects = containers[0]
            .list_objects(options)
            .await
            .unwrap()
            .into_entity()
            .unwrap();
        assert_eq!(objects.len(), 1);
        assert_eq!(objects[0].container(), "docs");
        assert_eq!(objects[0].name(), "2024/a.txt");
    }

    #[tokio::test]
    async fn test_create_object_reloads() {
        let mut transport = MockTransport::new();
        transport
            .expect_execute()
            .withf(|req| req.method == Method::PUT)
            .times(1)
            .returning(|req| {
                assert_eq!(req.path, "/docs/hello.txt");
                assert_eq!(req.headers.get("X-Detect-Content-Type"), Some("true"));
                assert_eq!(req.headers.get("X-Object-Meta-Color"), Some("red"));
                Ok(HttpResponse::new(StatusCode::CREATED)
                    .with_header("etag", "5eb63bbbe01eeed093cb22bb8f5acdc3")
                    .with_header("content-length", "0"))
            });
        transport
            .expect_execute()
            .withf(|req| req.method == Method::HEAD && req.path == "/docs/hello.txt")
            .times(3)
            .returning(|_| Ok(object_response()));

        let client = client_with(transport);
        let options = CreateObjectOptions::new(ObjectRef::new("docs", "hello.txt"), "hello world")
            .meta("Color", "red");
        let envelope = client.create_object(options).await.unwrap();
        assert_eq!(envelope.status(), StatusCode::CREATED);

        let mut created = envelope.into_entity().unwrap();
        assert_eq!(created.size(), Some(11));
        assert_eq!(created.content_type(), Some("text/plain"));

        let head = client
            .get_object_metadata(ObjectRef::new("docs", "hello.txt"))
            .await
            .unwrap()
            .into_entity()
            .unwrap();
        assert_eq!(created.attributes(), head.attributes());

        created.reload().await.unwrap();
        assert_eq!(created.attributes(), head.attributes());
    }

    #[tokio::test]
    async fn test_create_object_failure_skips_reload() {
        let mut transport = MockTransport::new();
        transport
            .expect_execute()
            .times(1)
            .returning(|_| Ok(HttpResponse::new(StatusCode::NOT_FOUND)));

        let client = client_with(transport);
        let chunks = vec![Ok(Bytes::from_static(b"data"))];
        let options = CreateObjectOptions::new(
            ObjectRef::new("missing", "a.bin"),
            Content::from_stream(stream::iter(chunks)),
        );
        let envelope = client.create_object(options).await.unwrap();
        assert!(!envelope.is_success());
        assert!(envelope.entity().is_none());
    }

    #[tokio::test]
    async fn test_create_object_sends_body() {
        let mut transport = MockTransport::new();
        transport
            .expect_execute()
            .withf(|req| req.method == Method::PUT)
            .returning(|req| {
                let body = req.body.expect("upload body");
                let bytes = futures::executor::block_on(body.collect()).unwrap();
                assert_eq!(&bytes[..], b"payload");
                assert_eq!(req.headers.get("Content-Type"), Some("application/json"));
                Ok(HttpResponse::new(StatusCode::CREATED))
            });
        transport
            .expect_execute()
            .withf(|req| req.method == Method::HEAD)
            .returning(|_| Ok(object_response()));

        let client = client_with(transport);
        let options = CreateObjectOptions::new(ObjectRef::new("docs", "a.json"), "payload")
            .content_type("application/json");
        assert!(client.create_object(options).await.unwrap().is_success());
    }

    #[tokio::test]
    async fn test_head_and_get_metadata_match() {
        let mut transport = MockTransport::new();
        transport
            .expect_execute()
            .withf(|req| req.method == Method::HEAD)
            .returning(|_| Ok(object_response()));
        transport
            .expect_execute()
            .withf(|req| req.method == Method::GET)
            .returning(|_| Ok(object_response().with_body("hello world")));

        let client = client_with(transport);
        let target = ObjectRef::new("docs", "hello.txt");
        let head = client.get_object_metadata(target.clone()).await.unwrap();
        let get = client
            .get_object_content(GetObjectOptions::new(target))
            .await
            .unwrap();

        assert!(head.body().is_empty());
        assert_eq!(&get.body()[..], b"hello world");
        assert_eq!(
            head.entity().unwrap().attributes(),
            get.entity().unwrap().attributes()
        );
    }

    #[tokio::test]
    async fn test_get_object_streams_to_sink() {
        let mut transport = MockTransport::new();
        transport.expect_execute().returning(|req| {
            let mut sink = req.sink.expect("sink passed through");
            sink.write_chunk(b"hello ")?;
            sink.write_chunk(b"world")?;
            Ok(object_response())
        });

        let received = Arc::new(Mutex::new(Vec::new()));
        let writer = received.clone();
        let options = GetObjectOptions::new(ObjectRef::new("docs", "hello.txt")).with_sink(
            move |chunk: &[u8]| -> std::io::Result<()> {
                writer.lock().unwrap().extend_from_slice(chunk);
                Ok(())
            },
        );

        let client = client_with(transport);
        let envelope = client.get_object_content(options).await.unwrap();
        assert!(envelope.body().is_empty());
        assert_eq!(*received.lock().unwrap(), b"hello world");
    }

    #[tokio::test]
    async fn test_delete_object_via_entity() {
        let mut transport = MockTransport::new();
        transport
            .expect_execute()
            .withf(|req| req.method == Method::HEAD)
            .returning(|_| Ok(object_response()));
        transport
            .expect_execute()
            .withf(|req| req.method == Method::DELETE && req.path == "/docs/hello.txt")
            .times(1)
            .returning(|_| Ok(HttpResponse::new(StatusCode::NO_CONTENT)));

        let client = client_with(transport);
        let object = client
            .get_object_metadata(ObjectRef::new("docs", "hello.txt"))
            .await
            .unwrap()
            .into_entity()
            .unwrap();
        let envelope = object.delete().await.unwrap();
        assert!(envelope.is_success());
        assert_eq!(envelope.entity().unwrap().name(), "hello.txt");
    }

    #[tokio::test]
    async fn test_reload_not_found() {
        let mut transport = MockTransport::new();
        let mut calls = 0;
        transport.expect_execute().times(2).returning(move |_| {
            calls += 1;
            if calls == 1 {
                Ok(object_response())
            } else {
                Ok(HttpResponse::new(StatusCode::NOT_FOUND))
            }
        });

        let client = client_with(transport);
        let mut object = client
            .get_object_metadata(ObjectRef::new("docs", "hello.txt"))
            .await
            .unwrap()
            .into_entity()
            .unwrap();
        assert!(matches!(object.reload().await, Err(Error::NotFound(_))));
        assert_eq!(object.size(), Some(11));
    }

    #[tokio::test]
    async fn test_entities_do_not_keep_client_alive() {
        let mut transport = MockTransport::new();
        transport.expect_execute().returning(|_| Ok(object_response()));

        let client = client_with(transport);
        let mut object = client
            .get_object_metadata(ObjectRef::new("docs", "hello.txt"))
            .await
            .unwrap()
            .into_entity()
            .unwrap();
        drop(client);

        assert!(matches!(
            object.reload().await,
            Err(Error::ClientDropped(_))
        ));
    }

    #[tokio::test]
    async fn test_missing_names_fail_fast() {
        let mut transport = MockTransport::new();
        transport.expect_execute().never();

        let client = client_with(transport);
        assert!(matches!(
            client.delete_object(ObjectRef::new("", "a")).await,
            Err(Error::MissingParameter("container_name"))
        ));
        assert!(matches!(
            client
                .get_object_content(GetObjectOptions::new(ObjectRef::new("docs", "")))
                .await,
            Err(Error::MissingParameter("object_name"))
        ));
    }

    #[tokio::test]
    async fn test_malformed_listing_propagates() {
        let mut transport = MockTransport::new();
        transport
            .expect_execute()
            .returning(|_| Ok(HttpResponse::new(StatusCode::OK).with_body("not json")));

        let client = client_with(transport);
        let result = client.list_objects(ListObjectsOptions::new("docs")).await;
        assert!(matches!(result, Err(Error::Json(_))));
    }

    #[tokio::test]
    async fn test_transport_error_propagates() {
        let mut transport = MockTransport::new();
        transport
            .expect_execute()
            .returning(|_| Err(Error::Network("connection refused".into())));

        let client = client_with(transport);
        let result = client.list_containers(ListContainersOptions::new()).await;
        assert!(matches!(result, Err(Error::Network(_))));
    }
}
