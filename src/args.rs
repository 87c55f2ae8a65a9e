use crate::common_types::CaptureRect;
use crate::preprocess::PreprocessPipeline;
use chrono::{DateTime, Utc};
use clap::*;

#[derive(Parser, Debug)]
#[command(about, version)]
pub struct CliArgs {
    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Subcommand, Debug)]
pub enum CliCommand {
    #[command(about = "Capture a screen region and extract its text")]
    Capture {
        #[arg(
            help = "Capture source such as screen://, clipboard:// or an image file path",
            default_value = "screen://"
        )]
        source: String,

        #[arg(
            short = 'r',
            long,
            help = "Region in logical pixels as X,Y,WxH (e.g. 100,200,640x480)"
        )]
        region: Option<CaptureRect>,

        #[arg(long, help = "Select the region interactively with the keyboard")]
        select: bool,

        #[arg(
            long,
            default_value = "1.0",
            help = "Device pixel ratio used to scale logical coordinates"
        )]
        scale: f64,

        #[command(flatten)]
        preprocess_args: PreprocessArgs,
    },
    #[command(about = "Show the last recognized text")]
    Last,
    #[command(about = "Show the capture history")]
    History {
        #[arg(short = 'n', long, help = "Maximum number of entries to show")]
        limit: Option<usize>,
    },
    #[command(about = "Attach an answer to a history entry")]
    Answer {
        #[arg(help = "Entry timestamp as printed by the history command (RFC 3339)")]
        timestamp: DateTime<Utc>,
        #[arg(help = "Answer text to attach")]
        answer: String,
    },
    #[command(about = "Check for a newer release or dismiss the update banner")]
    Updates {
        #[arg(long, help = "Dismiss the currently shown update banner")]
        dismiss: bool,
    },
}

#[derive(Args, Debug, Clone)]
pub struct PreprocessArgs {
    #[arg(
        short = 'p',
        long = "preprocess",
        default_value = "adaptive",
        help = "Preprocessing pipeline: adaptive, basic or none"
    )]
    pub pipeline: PreprocessPipeline,
}
