//! Request and response body plumbing
//!
//! Upload content arrives either as bytes already in memory or as a stream.
//! Both are normalized into a single [`Body`] stream before reaching the
//! transport. Downloads may be diverted to a [`BodySink`] instead of being
//! buffered.

use std::io;

use bytes::{Bytes, BytesMut};
use futures::stream::{self, BoxStream, StreamExt, TryStreamExt};
use tokio::io::AsyncRead;
use tokio_util::io::ReaderStream;

/// Object content supplied for an upload
pub enum Content {
    /// Bytes held in memory
    Inline(Bytes),
    /// Chunks produced by a stream
    Stream {
        stream: BoxStream<'static, io::Result<Bytes>>,
        /// Total size, when the producer knows it
        length: Option<u64>,
    },
}

impl Content {
    /// Wrap an arbitrary byte stream
    pub fn from_stream<S>(stream: S) -> Self
    where
        S: futures::Stream<Item = io::Result<Bytes>> + Send + 'static,
    {
        Content::Stream {
            stream: stream.boxed(),
            length: None,
        }
    }

    /// Wrap an async reader such as a file or stdin
    pub fn from_reader<R>(reader: R) -> Self
    where
        R: AsyncRead + Send + 'static,
    {
        Content::Stream {
            stream: ReaderStream::new(reader).boxed(),
            length: None,
        }
    }

    /// Declare the total size of streamed content
    ///
    /// Lets the transport send `Content-Length` instead of chunked encoding.
    /// Has no effect on inline content, whose size is always known.
    pub fn with_length(self, length: u64) -> Self {
        match self {
            Content::Stream { stream, .. } => Content::Stream {
                stream,
                length: Some(length),
            },
            inline => inline,
        }
    }

    /// Normalize into the uniform body handed to the transport
    pub fn into_body(self) -> Body {
        match self {
            Content::Inline(bytes) => Body {
                content_length: Some(bytes.len() as u64),
                stream: stream::once(async move { Ok(bytes) }).boxed(),
            },
            Content::Stream { stream, length } => Body {
                content_length: length,
                stream,
            },
        }
    }
}

impl From<String> for Content {
    fn from(value: String) -> Self {
        Content::Inline(Bytes::from(value))
    }
}

impl From<&str> for Content {
    fn from(value: &str) -> Self {
        Content::Inline(Bytes::copy_from_slice(value.as_bytes()))
    }
}

impl From<Vec<u8>> for Content {
    fn from(value: Vec<u8>) -> Self {
        Content::Inline(Bytes::from(value))
    }
}

impl From<Bytes> for Content {
    fn from(value: Bytes) -> Self {
        Content::Inline(value)
    }
}

impl std::fmt::Debug for Content {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Content::Inline(bytes) => f.debug_tuple("Inline").field(&bytes.len()).finish(),
            Content::Stream { length, .. } => {
                f.debug_struct("Stream").field("length", length).finish_non_exhaustive()
            }
        }
    }
}

/// Readable request body
pub struct Body {
    content_length: Option<u64>,
    stream: BoxStream<'static, io::Result<Bytes>>,
}

impl Body {
    /// Length in bytes, when known up front
    pub fn content_length(&self) -> Option<u64> {
        self.content_length
    }

    pub fn into_stream(self) -> BoxStream<'static, io::Result<Bytes>> {
        self.stream
    }

    /// Drain the body into memory
    pub async fn collect(self) -> io::Result<Bytes> {
        let buf = self
            .stream
            .try_fold(BytesMut::new(), |mut buf, chunk| async move {
                buf.extend_from_slice(&chunk);
                Ok(buf)
            })
            .await?;
        Ok(buf.freeze())
    }
}

impl std::fmt::Debug for Body {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Body")
            .field("content_length", &self.content_length)
            .finish_non_exhaustive()
    }
}

/// Receiver for response body chunks as they arrive
pub trait BodySink: Send {
    fn write_chunk(&mut self, chunk: &[u8]) -> io::Result<()>;
}

impl<F> BodySink for F
where
    F: FnMut(&[u8]) -> io::Result<()> + Send,
{
    fn write_chunk(&mut self, chunk: &[u8]) -> io::Result<()> {
        self(chunk)
    }
}
