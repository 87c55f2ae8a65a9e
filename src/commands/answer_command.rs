use crate::bus::{MessageBus, SurfaceMessage};
use crate::store::Store;
use crate::AppResult;
use chrono::{DateTime, Utc};
use console::{Style, Term};

pub fn command_answer(
    term: &Term,
    store: &Store,
    bus: &MessageBus,
    timestamp: DateTime<Utc>,
    answer: &str,
) -> AppResult<bool> {
    let attached = store.attach_answer(timestamp, answer)?;
    if attached {
        if let Some(entry) = store
            .history()
            .into_iter()
            .find(|entry| entry.timestamp == timestamp)
        {
            bus.publish(SurfaceMessage::GetAnswerForHistory {
                text: entry.text,
                timestamp,
            });
        }
        term.write_line(
            Style::new()
                .green()
                .apply_to("Answer attached")
                .to_string()
                .as_str(),
        )?;
    } else {
        term.write_line(
            Style::new()
                .yellow()
                .apply_to(format!("No history entry at {}", timestamp.to_rfc3339()))
                .to_string()
                .as_str(),
        )?;
    }
    Ok(attached)
}
