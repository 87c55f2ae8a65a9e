use clap::Parser;
use console::{Style, Term};

use std::error::Error;

mod args;
use crate::commands::*;
use crate::errors::AppError;
use args::*;

mod reporter;

mod bus;

mod capture;

mod common_types;

mod errors;

mod commands;

mod overlay;

mod pipeline;

mod preprocess;

mod recognition;

mod sink;

mod store;

mod updates;

pub type AppResult<T> = Result<T, AppError>;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let term = Term::stdout();
    let bold_style = Style::new().bold();

    term.write_line(
        format!(
            "{} v{} (https://github.com/snaptext-dev/snaptext)",
            bold_style.clone().green().apply_to("Snaptext"),
            bold_style.apply_to(env!("CARGO_PKG_VERSION"))
        )
        .as_str(),
    )?;

    let cli = CliArgs::parse();
    if let Err(err) = handle_args(cli, &term).await {
        term.write_line(
            format!(
                "{}: {}\nDetails: {:?}",
                bold_style.clone().red().apply_to("Error"),
                err,
                err.source()
            )
            .as_str(),
        )?;
    }

    Ok(())
}

async fn handle_args(cli: CliArgs, term: &Term) -> AppResult<()> {
    let bold_style = Style::new().bold();
    let store = crate::store::Store::open(crate::store::Store::default_path()?)?;

    match cli.command {
        CliCommand::Capture {
            source,
            region,
            select,
            scale,
            preprocess_args,
        } => {
            let options = CaptureCommandOptions {
                source,
                region,
                select,
                scale,
                pipeline: preprocess_args.pipeline,
            };
            match command_capture(term, &store, options).await? {
                CaptureCommandOutcome::Completed(recognized) => {
                    term.write_line(
                        format!("{}", bold_style.clone().green().apply_to("Text captured ✓"))
                            .as_str(),
                    )?;
                    if recognized.is_empty() {
                        term.write_line(" (No text detected) ")?;
                    } else {
                        term.write_line(recognized.text.as_str())?;
                    }
                }
                CaptureCommandOutcome::Cancelled => {
                    term.write_line(
                        Style::new()
                            .yellow()
                            .apply_to("Selection cancelled")
                            .to_string()
                            .as_str(),
                    )?;
                }
            }
        }
        CliCommand::Last => {
            command_last(term, &store)?;
        }
        CliCommand::History { limit } => {
            let history_result = command_history(term, &store, limit)?;
            if history_result.entries_shown < history_result.entries_total {
                term.write_line(
                    Style::new()
                        .dim()
                        .apply_to(format!(
                            "Showing {} of {} entries.",
                            history_result.entries_shown, history_result.entries_total
                        ))
                        .to_string()
                        .as_str(),
                )?;
            }
        }
        CliCommand::Answer { timestamp, answer } => {
            let bus = crate::bus::MessageBus::new();
            command_answer(term, &store, &bus, timestamp, &answer)?;
        }
        CliCommand::Updates { dismiss } => {
            command_updates(term, &store, dismiss).await?;
        }
    }

    Ok(())
}
