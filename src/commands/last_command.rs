use crate::store::Store;
use crate::AppResult;
use console::{Style, Term};

pub fn command_last(term: &Term, store: &Store) -> AppResult<()> {
    let bold_style = Style::new().bold();
    let status = store.status();

    if status.is_processing() {
        term.write_line(
            Style::new()
                .yellow()
                .apply_to(format!("A capture is in progress ({})...", status))
                .to_string()
                .as_str(),
        )?;
    } else if let Some(error) = store.last_error().filter(|_| status == crate::store::JobStatus::Error) {
        term.write_line(
            format!(
                "{}: {}",
                bold_style.clone().red().apply_to("Last capture failed"),
                error
            )
            .as_str(),
        )?;
    } else {
        match store.last_result() {
            Some(text) if text.is_empty() => {
                term.write_line(" (No text detected) ")?;
            }
            Some(text) => {
                term.write_line(text.as_str())?;
            }
            None => {
                term.write_line(
                    Style::new().dim().apply_to("No capture yet").to_string().as_str(),
                )?;
            }
        }
    }

    let update = store.update_state();
    if update.update_available {
        let banner = format!(
            "Update available: v{} ({})",
            update.latest_version.unwrap_or_else(|| "unknown".to_string()),
            update.download_url.unwrap_or_default()
        );
        term.write_line(
            Style::new().yellow().bold().apply_to(banner).to_string().as_str(),
        )?;
        if let Some(notes) = update.release_notes {
            if let Some(first_line) = notes.lines().next() {
                term.write_line(
                    Style::new().dim().apply_to(first_line).to_string().as_str(),
                )?;
            }
        }
        term.write_line(
            Style::new()
                .dim()
                .apply_to("Dismiss with: snaptext updates --dismiss")
                .to_string()
                .as_str(),
        )?;
    }
    Ok(())
}
