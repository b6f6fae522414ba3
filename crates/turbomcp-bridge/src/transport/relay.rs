//! Streaming relay from the backend to the client
//!
//! A spawned task pumps backend chunks into a bounded channel whose receiver
//! is the client response body. When the client goes away the receiver is
//! dropped, the task observes `Sender::closed()` and drops the backend
//! stream, which closes the backend connection.

use std::convert::Infallible;
use std::fmt::Display;

use axum::body::Body;
use bytes::Bytes;
use futures::{Stream, StreamExt};
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tracing::{debug, warn};

/// Relay a backend response body as a client body
pub fn relay(response: reqwest::Response, capacity: usize) -> Body {
    relay_stream(response.bytes_stream(), capacity)
}

/// Relay any chunk stream as a client body, preserving chunk order
///
/// A backend error ends the client body without a synthetic frame.
pub fn relay_stream<S, E>(stream: S, capacity: usize) -> Body
where
    S: Stream<Item = Result<Bytes, E>> + Send + 'static,
    E: Display + Send + 'static,
{
    let (tx, rx) = mpsc::channel::<Result<Bytes, Infallible>>(capacity.max(1));

    tokio::spawn(async move {
        let mut stream = std::pin::pin!(stream);
        let mut relayed = 0usize;
        loop {
            tokio::select! {
                () = tx.closed() => {
                    debug!(relayed, "Client disconnected, closing backend stream");
                    break;
                }
                next = stream.next() => match next {
                    Some(Ok(chunk)) => {
                        relayed += chunk.len();
                        if tx.send(Ok(chunk)).await.is_err() {
                            debug!(relayed, "Client disconnected, closing backend stream");
                            break;
                        }
                    }
                    Some(Err(e)) => {
                        warn!(error = %e, relayed, "Backend stream failed");
                        break;
                    }
                    None => {
                        debug!(relayed, "Backend stream finished");
                        break;
                    }
                },
            }
        }
    });

    Body::from_stream(ReceiverStream::new(rx))
}
