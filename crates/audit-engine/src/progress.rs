use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProgressKind {
    Progress,
    /// Transport keep-alive. Emitted by stream consumers, never by the engine.
    Heartbeat,
    Complete,
    Error,
}

/// One discrete progress update. `percentage` is pages visited over the page
/// budget, as an integer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgressEvent {
    #[serde(rename = "type")]
    pub kind: ProgressKind,
    pub message: String,
    pub pages_crawled: usize,
    pub max_pages: usize,
    pub percentage: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payload: Option<serde_json::Value>,
}

impl ProgressEvent {
    pub fn progress(message: impl Into<String>, pages_crawled: usize, max_pages: usize) -> Self {
        let percentage = if max_pages > 0 {
            (pages_crawled * 100 / max_pages) as u32
        } else {
            0
        };
        Self {
            kind: ProgressKind::Progress,
            message: message.into(),
            pages_crawled,
            max_pages,
            percentage,
            payload: None,
        }
    }

    pub fn complete(payload: serde_json::Value, pages_crawled: usize, max_pages: usize) -> Self {
        Self {
            kind: ProgressKind::Complete,
            payload: Some(payload),
            ..Self::progress("Audit complete", pages_crawled, max_pages)
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            kind: ProgressKind::Error,
            ..Self::progress(message, 0, 0)
        }
    }
}

/// Append-only progress channel. `emit` must never block the crawl; sinks
/// that forward to a slow consumer are responsible for their own buffering.
pub trait ProgressSink: Send + Sync {
    fn emit(&self, event: ProgressEvent);
}

/// Discards every event. The default sink.
pub struct NullSink;

impl ProgressSink for NullSink {
    fn emit(&self, _event: ProgressEvent) {}
}

/// Forwards events over an unbounded channel, e.g. to a server-push stream.
/// A dropped receiver silently discards further events rather than failing
/// the crawl.
pub struct ChannelSink {
    tx: mpsc::UnboundedSender<ProgressEvent>,
}

impl ChannelSink {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<ProgressEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl ProgressSink for ChannelSink {
    fn emit(&self, event: ProgressEvent) {
        let _ = self.tx.send(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_percentage_math() {
        assert_eq!(ProgressEvent::progress("x", 0, 50).percentage, 0);
        assert_eq!(ProgressEvent::progress("x", 25, 50).percentage, 50);
        assert_eq!(ProgressEvent::progress("x", 50, 50).percentage, 100);
        assert_eq!(ProgressEvent::progress("x", 3, 0).percentage, 0);
    }

    #[test]
    fn test_event_serialization_shape() {
        let event = ProgressEvent::progress("Crawling: /about", 3, 50);
        let json = serde_json::to_value(&event).unwrap();

        assert_eq!(json["type"], "progress");
        assert_eq!(json["message"], "Crawling: /about");
        assert_eq!(json["pages_crawled"], 3);
        assert_eq!(json["max_pages"], 50);
        assert_eq!(json["percentage"], 6);
        assert!(json.get("payload").is_none());
    }

    #[tokio::test]
    async fn test_channel_sink_forwards_events() {
        let (sink, mut rx) = ChannelSink::new();
        sink.emit(ProgressEvent::progress("one", 1, 10));
        sink.emit(ProgressEvent::complete(serde_json::json!({}), 10, 10));

        assert_eq!(rx.recv().await.unwrap().message, "one");
        assert_eq!(rx.recv().await.unwrap().kind, ProgressKind::Complete);
    }

    #[test]
    fn test_dropped_receiver_does_not_panic() {
        let (sink, rx) = ChannelSink::new();
        drop(rx);
        sink.emit(ProgressEvent::progress("ignored", 1, 10));
    }
}
