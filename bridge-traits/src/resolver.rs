//! Remote Track Resolver
//!
//! Opens byte streams for remote media URLs. Only the cache's download
//! worker talks to the resolver; the media engine streams remote URLs on
//! its own.

use async_trait::async_trait;
use tokio::io::AsyncRead;

use crate::error::Result;

/// Boxed byte stream returned by a resolver.
pub type ByteStream = Box<dyn AsyncRead + Send + Unpin>;

/// Async byte-stream fetcher.
///
/// Implementations should:
/// - Follow redirects issued by CDNs
/// - Fail with [`BridgeError::HttpStatus`](crate::BridgeError::HttpStatus) on non-2xx responses
/// - Leave timeouts to the underlying network stack
///
/// # Example
///
/// ```ignore
/// use bridge_traits::resolver::TrackResolver;
/// use tokio::io::AsyncReadExt;
///
/// async fn fetch_all(resolver: &dyn TrackResolver, url: &str) -> Vec<u8> {
///     let mut stream = resolver.download_stream(url.to_string()).await.unwrap();
///     let mut buf = Vec::new();
///     stream.read_to_end(&mut buf).await.unwrap();
///     buf
/// }
/// ```
#[async_trait]
pub trait TrackResolver: Send + Sync {
    /// Open a stream over the full body of `url`.
    async fn download_stream(&self, url: String) -> Result<ByteStream>;
}
