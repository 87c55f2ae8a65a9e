use crate::common_types::CaptureRect;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

const BUS_CAPACITY: usize = 64;

/// The closed set of messages surfaces exchange. Serialized action-tagged,
/// matching the persisted wire shapes.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "action", rename_all = "camelCase")]
pub enum SurfaceMessage {
    StartCapture,
    CaptureScreenshot {
        data: Option<CaptureRect>,
    },
    #[serde(rename = "performOCR")]
    PerformOcr,
    OcrProgress {
        message: String,
    },
    OcrComplete {
        text: String,
    },
    OcrError {
        error: String,
    },
    GetAnswerForHistory {
        text: String,
        timestamp: DateTime<Utc>,
    },
}

/// In-process publish/subscribe fan-out: each subscriber sees each message
/// at most once, and publishing never blocks on absent listeners.
#[derive(Debug, Clone)]
pub struct MessageBus {
    sender: broadcast::Sender<SurfaceMessage>,
}

impl MessageBus {
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(BUS_CAPACITY);
        Self { sender }
    }

    pub fn publish(&self, message: SurfaceMessage) {
        // A surface might not be open; that is not an error.
        let _ = self.sender.send(message);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SurfaceMessage> {
        self.sender.subscribe()
    }
}

impl Default for MessageBus {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_serialize_with_action_tags() {
        let message = SurfaceMessage::OcrProgress {
            message: "Extracting text...".to_string(),
        };
        let raw = serde_json::to_string(&message).unwrap();
        assert_eq!(
            raw,
            "{\"action\":\"ocrProgress\",\"message\":\"Extracting text...\"}"
        );

        let raw = serde_json::to_string(&SurfaceMessage::PerformOcr).unwrap();
        assert_eq!(raw, "{\"action\":\"performOCR\"}");

        let raw = serde_json::to_string(&SurfaceMessage::CaptureScreenshot { data: None }).unwrap();
        assert_eq!(raw, "{\"action\":\"captureScreenshot\",\"data\":null}");
    }

    #[test]
    fn test_each_subscriber_sees_a_message_once() {
        let bus = MessageBus::new();
        let mut first = bus.subscribe();
        let mut second = bus.subscribe();
        bus.publish(SurfaceMessage::StartCapture);
        assert_eq!(first.try_recv().unwrap(), SurfaceMessage::StartCapture);
        assert_eq!(second.try_recv().unwrap(), SurfaceMessage::StartCapture);
        assert!(first.try_recv().is_err());
    }

    #[test]
    fn test_publish_without_listeners_is_a_no_op() {
        let bus = MessageBus::new();
        bus.publish(SurfaceMessage::OcrComplete {
            text: "text".to_string(),
        });
    }
}
