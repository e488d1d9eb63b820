use core::future::Future;

use crate::error::Result;

/// A trait that abstracts over the connection a script streams into.
///
/// `send` is the only suspension point of the streaming protocol: the
/// returned future resolves once the peer has accepted (acknowledged) every
/// byte handed to it, so the caller may reuse the shared buffer afterwards.
/// Only one unacknowledged segment is ever outstanding per connection.
///
/// This allows the driver to be generic over `Tokio` sockets, an embedded
/// TCP stack, or an in-memory mock.
pub trait Transport {
    /// Hands `bytes` to the peer and resolves once they are acknowledged.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConnectionLost`](crate::Error::ConnectionLost) if the
    /// connection goes away before the acknowledgment arrives.
    fn send(&mut self, bytes: &[u8]) -> impl Future<Output = Result<()>>;

    /// Whether the connection is still usable.
    fn is_alive(&self) -> bool;
}

impl<T: Transport + ?Sized> Transport for &mut T {
    fn send(&mut self, bytes: &[u8]) -> impl Future<Output = Result<()>> {
        (**self).send(bytes)
    }

    fn is_alive(&self) -> bool {
        (**self).is_alive()
    }
}
