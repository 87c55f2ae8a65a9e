use crate::bus::{MessageBus, SurfaceMessage};
use crate::common_types::RecognizedText;
use crate::errors::AppError;
use crate::reporter::AppReporter;
use crate::store::{HistoryEntry, JobStatus, Store};
use crate::AppResult;
use chrono::Utc;

pub const NOTIFICATION_PREVIEW_LIMIT: usize = 100;

/// Terminal boundary of every capture job: persists the outcome, performs
/// the best-effort side effects and publishes exactly one completion or
/// error event. The job status always ends up terminal here.
pub struct ResultSink<'a> {
    store: &'a Store,
    bus: &'a MessageBus,
    reporter: &'a AppReporter<'a>,
}

impl<'a> ResultSink<'a> {
    pub fn new(store: &'a Store, bus: &'a MessageBus, reporter: &'a AppReporter<'a>) -> Self {
        Self {
            store,
            bus,
            reporter,
        }
    }

    pub fn complete(&self, recognized: &RecognizedText) -> AppResult<()> {
        let text = recognized.text.as_str();
        self.store.set_last_result(text)?;
        self.store.append_history(HistoryEntry {
            text: text.to_string(),
            timestamp: Utc::now(),
            answer: None,
        })?;

        if let Err(error) = self.copy_to_clipboard(text) {
            // Clipboard failures must not fail the job.
            tracing::warn!("Failed to copy to clipboard: {}", error);
            let _ = self
                .reporter
                .warn(format!("Could not copy result to clipboard: {}", error));
        }
        if let Err(error) = self.notify("Text captured", text) {
            tracing::warn!("Failed to raise notification: {}", error);
        }

        self.store.set_status(JobStatus::Done)?;
        self.bus.publish(SurfaceMessage::OcrComplete {
            text: text.to_string(),
        });
        Ok(())
    }

    pub fn fail(&self, error: &AppError) -> AppResult<()> {
        let message = error.to_string();
        self.store.set_last_error(&message)?;
        if let Err(transition_error) = self.store.set_status(JobStatus::Error) {
            // The job must never remain observable as processing.
            tracing::warn!(
                "Forcing error status after rejected transition: {}",
                transition_error
            );
            self.store.force_status(JobStatus::Error)?;
        }
        if let Err(notify_error) = self.notify("Text capture failed", &message) {
            tracing::warn!("Failed to raise notification: {}", notify_error);
        }
        self.bus
            .publish(SurfaceMessage::OcrError { error: message });
        Ok(())
    }

    #[cfg(feature = "clipboard")]
    fn copy_to_clipboard(&self, text: &str) -> AppResult<()> {
        let mut clipboard = arboard::Clipboard::new()?;
        clipboard.set_text(text)?;
        Ok(())
    }

    #[cfg(not(feature = "clipboard"))]
    fn copy_to_clipboard(&self, _text: &str) -> AppResult<()> {
        Ok(())
    }

    #[cfg(feature = "notifications")]
    fn notify(&self, title: &str, body: &str) -> AppResult<()> {
        notify_rust::Notification::new()
            .summary(title)
            .body(&notification_preview(body))
            .show()?;
        Ok(())
    }

    #[cfg(not(feature = "notifications"))]
    fn notify(&self, _title: &str, _body: &str) -> AppResult<()> {
        Ok(())
    }
}

pub fn notification_preview(text: &str) -> String {
    if text.chars().count() > NOTIFICATION_PREVIEW_LIMIT {
        let preview: String = text.chars().take(NOTIFICATION_PREVIEW_LIMIT).collect();
        format!("{}...", preview)
    } else {
        text.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preview_truncates_long_text() {
        let long = "a".repeat(250);
        let preview = notification_preview(&long);
        assert_eq!(preview.chars().count(), NOTIFICATION_PREVIEW_LIMIT + 3);
        assert!(preview.ends_with("..."));
    }

    #[test]
    fn test_preview_keeps_short_text_intact() {
        assert_eq!(notification_preview("Hello World"), "Hello World");
    }

    #[test]
    fn test_preview_respects_multibyte_boundaries() {
        let long = "ä".repeat(150);
        let preview = notification_preview(&long);
        assert!(preview.ends_with("..."));
        assert_eq!(preview.chars().count(), NOTIFICATION_PREVIEW_LIMIT + 3);
    }
}
