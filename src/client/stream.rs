//! Streaming NDJSON event sequences.
//!
//! Several daemon endpoints (`ping`, `dht/findprovs`, `pubsub/sub`,
//! progress-reporting `add`) answer with a long-lived body of
//! newline-delimited JSON: one JSON value per line, emitted as events
//! occur. [`EventStream`] turns such a body into a lazy, cancelable
//! sequence of [`StreamingEvent`]s.
//!
//! # Reading model
//!
//! A detached task reads the body line by line and forwards decoded
//! events over a bounded channel, so registering a handler never blocks
//! the caller. Within one sequence events are delivered strictly in
//! arrival order; nothing is buffered beyond what one line needs.
//!
//! - A literal `{}` line is a placeholder for "no event yet" (old daemons
//!   emit it as the first frame of a subscription) and is skipped.
//! - A line that fails to parse is surfaced as an `Err` item without
//!   ending the sequence.
//! - End-of-stream ends the sequence normally.
//!
//! # Cancellation
//!
//! Line reads have no cooperative cancellation hook, so cancellation is
//! realized by closing the underlying body: the reader task exits and
//! drops the response, which also tells the daemon-side handler (an
//! active subscription, a long poll) to stop. An IO failure observed
//! while cancellation was requested maps to normal termination; the same
//! failure without a prior cancellation request surfaces as
//! [`IpfsError::StreamTermination`]. Dropping the stream cancels it.

use crate::error::{IpfsError, Result};
use futures::{Stream, StreamExt, TryStreamExt};
use serde_json::Value;
use std::io;
use std::pin::Pin;
use std::task::{Context, Poll};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tokio_util::io::StreamReader;
use tokio_util::sync::CancellationToken;

/// One decoded NDJSON record plus its arrival ordinal within the stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamingEvent {
    /// Zero-based position of this event in the sequence; placeholder and
    /// unparseable lines do not consume ordinals
    pub ordinal: u64,
    /// The decoded JSON value
    pub value: Value,
}

/// A lazy, cancelable sequence of NDJSON events from an open response.
///
/// Owned exclusively by the caller that requested it; it must not be read
/// from two consumers concurrently. Dropping it before end-of-stream
/// releases the connection, which doubles as the unsubscribe signal.
pub struct EventStream {
    receiver: ReceiverStream<Result<StreamingEvent>>,
    cancel: CancellationToken,
}

impl EventStream {
    /// Spawn a reader over the response body.
    ///
    /// `token` is the caller's cancellation signal; the stream derives a
    /// child token from it so that dropping the stream cancels the read
    /// without cancelling unrelated work on the caller's token.
    pub(crate) fn new(response: reqwest::Response, token: CancellationToken) -> Self {
        let body = StreamReader::new(
            response
                .bytes_stream()
                .map_err(|e| io::Error::new(io::ErrorKind::Other, e)),
        );
        Self::from_reader(BufReader::new(body), token)
    }

    /// Spawn a reader over any buffered line source.
    fn from_reader<R>(reader: R, token: CancellationToken) -> Self
    where
        R: AsyncBufRead + Unpin + Send + 'static,
    {
        let cancel = token.child_token();
        let (tx, rx) = mpsc::channel(1);

        tokio::spawn(read_lines(reader, tx, cancel.clone()));

        EventStream {
            receiver: ReceiverStream::new(rx),
            cancel,
        }
    }

    /// Receive the next event.
    ///
    /// Returns `None` once the sequence has terminated: benign
    /// end-of-stream and caller-initiated cancellation both end here
    /// silently. After termination every subsequent call returns `None`
    /// immediately.
    pub async fn next(&mut self) -> Option<Result<StreamingEvent>> {
        self.receiver.next().await
    }

    /// Stop the sequence and release the underlying connection.
    ///
    /// Safe to call at any time, including after termination.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }
}

impl Drop for EventStream {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

impl Stream for EventStream {
    type Item = Result<StreamingEvent>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        Pin::new(&mut self.receiver).poll_next(cx)
    }
}

/// Reader loop: one line in, at most one channel item out.
async fn read_lines<R>(
    reader: R,
    tx: mpsc::Sender<Result<StreamingEvent>>,
    cancel: CancellationToken,
) where
    R: AsyncBufRead + Unpin,
{
    let mut lines = reader.lines();
    let mut ordinal: u64 = 0;

    loop {
        let line = tokio::select! {
            // Cancellation wins the race: exiting drops the body, which
            // closes the connection mid-read.
            _ = cancel.cancelled() => break,
            line = lines.next_line() => line,
        };

        match line {
            Ok(Some(line)) => {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }
                // go-ipfs 0.4.13 and earlier send empty JSON as the first
                // frame of a subscription.
                if line == "{}" {
                    tracing::debug!("skipping placeholder frame");
                    continue;
                }

                match serde_json::from_str::<Value>(line) {
                    Ok(value) => {
                        let event = StreamingEvent { ordinal, value };
                        ordinal += 1;
                        if tx.send(Ok(event)).await.is_err() {
                            break; // receiver dropped
                        }
                    }
                    Err(e) => {
                        if cancel.is_cancelled() {
                            break;
                        }
                        tracing::debug!(error = %e, "unparseable stream line");
                        if tx.send(Err(IpfsError::Decode(e.to_string()))).await.is_err() {
                            break;
                        }
                    }
                }
            }
            // Benign end-of-stream.
            Ok(None) => break,
            Err(e) => {
                // Closed-during-cancellation is a normal terminal state.
                if !cancel.is_cancelled() {
                    let _ = tx
                        .send(Err(IpfsError::StreamTermination(e.to_string())))
                        .await;
                }
                break;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::StreamExt;

    fn canned(body: &'static str, token: CancellationToken) -> EventStream {
        EventStream::from_reader(body.as_bytes(), token)
    }

    #[tokio::test]
    async fn placeholder_frames_are_skipped_and_ordinals_assigned() {
        let mut events = canned(
            "{}\n{\"Text\":\"a\"}\n{\"Text\":\"b\"}\n",
            CancellationToken::new(),
        );

        let first = events.next().await.unwrap().unwrap();
        assert_eq!(first.ordinal, 0);
        assert_eq!(first.value["Text"], "a");

        let second = events.next().await.unwrap().unwrap();
        assert_eq!(second.ordinal, 1);
        assert_eq!(second.value["Text"], "b");

        assert!(events.next().await.is_none());
    }

    #[tokio::test]
    async fn parse_failure_does_not_end_the_sequence() {
        let mut events = canned("not json\n{\"ok\":1}\n", CancellationToken::new());

        assert!(matches!(
            events.next().await,
            Some(Err(IpfsError::Decode(_)))
        ));
        let event = events.next().await.unwrap().unwrap();
        assert_eq!(event.value["ok"], 1);
        assert!(events.next().await.is_none());
    }

    #[tokio::test]
    async fn cancellation_terminates_silently() {
        let mut events = canned(
            "{\"n\":1}\n{\"n\":2}\n{\"n\":3}\n",
            CancellationToken::new(),
        );

        let first = events.next().await.unwrap().unwrap();
        assert_eq!(first.value["n"], 1);

        events.cancel();
        // Whatever remains must drain to a silent end, never an error.
        while let Some(item) = events.next().await {
            assert!(item.is_ok());
        }
        // Reads after termination fail fast.
        assert!(events.next().await.is_none());
    }

    #[tokio::test]
    async fn caller_token_cancels_the_sequence() {
        let token = CancellationToken::new();
        let mut events = canned("{\"n\":1}\n{\"n\":2}\n", token.clone());
        token.cancel();
        while let Some(item) = events.next().await {
            assert!(item.is_ok());
        }
    }

    #[tokio::test]
    async fn stream_impl_yields_in_arrival_order() {
        let events = canned("{\"n\":1}\n{\"n\":2}\n", CancellationToken::new());
        let values: Vec<_> = events
            .map(|r| r.unwrap().value["n"].as_i64().unwrap())
            .collect()
            .await;
        assert_eq!(values, vec![1, 2]);
    }

    #[tokio::test]
    async fn missing_trailing_newline_still_emits_last_event() {
        let mut events = canned("{\"n\":1}\n{\"n\":2}", CancellationToken::new());
        assert_eq!(events.next().await.unwrap().unwrap().value["n"], 1);
        assert_eq!(events.next().await.unwrap().unwrap().value["n"], 2);
        assert!(events.next().await.is_none());
    }
}
