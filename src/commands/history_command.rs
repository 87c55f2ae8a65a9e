use crate::store::Store;
use crate::AppResult;
use console::{Style, Term};

pub struct HistoryCommandResult {
    pub entries_shown: usize,
    pub entries_total: usize,
}

pub fn command_history(
    term: &Term,
    store: &Store,
    limit: Option<usize>,
) -> AppResult<HistoryCommandResult> {
    let bold_style = Style::new().bold();
    let dim_style = Style::new().dim();

    let history = store.history();
    let entries_total = history.len();
    if history.is_empty() {
        term.write_line(dim_style.apply_to("No history yet").to_string().as_str())?;
        return Ok(HistoryCommandResult {
            entries_shown: 0,
            entries_total: 0,
        });
    }

    let mut entries_shown = 0;
    for entry in history
        .iter()
        .rev()
        .take(limit.unwrap_or(entries_total))
    {
        let search_url = url::Url::parse_with_params(
            "https://www.google.com/search",
            &[("q", entry.text.as_str())],
        )?;
        term.write_line(bold_style.apply_to(&entry.text).to_string().as_str())?;
        term.write_line(
            dim_style
                .apply_to(format!(
                    "  {}  ·  find answer: {}",
                    entry.timestamp.to_rfc3339(),
                    search_url
                ))
                .to_string()
                .as_str(),
        )?;
        if let Some(answer) = &entry.answer {
            term.write_line(
                format!(
                    "  {} {}",
                    Style::new().green().apply_to("answer:"),
                    answer
                )
                .as_str(),
            )?;
        }
        entries_shown += 1;
    }

    Ok(HistoryCommandResult {
        entries_shown,
        entries_total,
    })
}
