use crate::bus::{MessageBus, SurfaceMessage};
use crate::capture::DetectCaptureSource;
use crate::common_types::{CaptureRect, RecognizedText};
use crate::overlay::{SelectionOutcome, SelectionOverlay, TerminalSelectionDriver};
use crate::pipeline::CapturePipeline;
use crate::preprocess::{PreprocessPipeline, Preprocessor};
use crate::reporter::AppReporter;
use crate::sink::ResultSink;
use crate::store::Store;
use crate::updates::{UpdateChecker, Version};
use crate::AppResult;
use console::Term;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

pub enum CaptureCommandOutcome {
    Completed(RecognizedText),
    Cancelled,
}

#[derive(Debug, Clone)]
pub struct CaptureCommandOptions {
    pub source: String,
    pub region: Option<CaptureRect>,
    pub select: bool,
    pub scale: f64,
    pub pipeline: PreprocessPipeline,
}

pub async fn command_capture(
    term: &Term,
    store: &Store,
    options: CaptureCommandOptions,
) -> AppResult<CaptureCommandOutcome> {
    store.reconcile_stale_status()?;
    UpdateChecker::new(store, Version::current()?)
        .check_silently()
        .await;

    let mut overlay = SelectionOverlay::new(options.scale);
    let rect = if options.select {
        match TerminalSelectionDriver::new(term).select(&mut overlay)? {
            Some(rect) => Some(rect),
            None => return Ok(CaptureCommandOutcome::Cancelled),
        }
    } else if let Some(region) = options.region {
        match overlay.select_region(&region) {
            SelectionOutcome::Selected(rect) => Some(rect),
            // Below the minimum selection size: discard without capturing.
            _ => return Ok(CaptureCommandOutcome::Cancelled),
        }
    } else {
        None
    };

    let bus = MessageBus::new();
    bus.publish(SurfaceMessage::StartCapture);
    bus.publish(SurfaceMessage::CaptureScreenshot { data: rect });

    let bar = ProgressBar::new_spinner();
    bar.set_style(
        ProgressStyle::with_template("{spinner:.green} {msg}")
            .unwrap()
            .tick_chars("◐◓◑◒✓"),
    );
    bar.enable_steady_tick(Duration::from_millis(100));

    // The progress surface: renders the processing state reactively, the
    // same way any other listening surface would.
    let mut progress_events = bus.subscribe();
    let progress_bar = bar.clone();
    let progress_surface = tokio::spawn(async move {
        while let Ok(message) = progress_events.recv().await {
            match message {
                SurfaceMessage::OcrProgress { message } => progress_bar.set_message(message),
                SurfaceMessage::OcrComplete { .. } | SurfaceMessage::OcrError { .. } => break,
                _ => {}
            }
        }
    });

    let reporter = AppReporter::from(&bar);
    let sink = ResultSink::new(store, &bus, &reporter);
    let capture_pipeline = CapturePipeline::new(store, &bus);
    let preprocessor = Preprocessor::new(options.pipeline);

    let result = {
        let mut source = DetectCaptureSource::open(&options.source, &reporter).await?;

        #[cfg(feature = "ocr")]
        {
            use crate::capture::CaptureSource;
            reporter.report(format!("Capturing from {}", source.describe()))?;
            let recognizer = crate::recognition::shared_engine().await?;
            capture_pipeline
                .run(&mut source, &preprocessor, recognizer, rect, &sink)
                .await
        }
        #[cfg(not(feature = "ocr"))]
        {
            let _ = (&mut source, &preprocessor, &capture_pipeline, &sink, rect);
            Err(crate::errors::AppError::SystemError {
                message: "This build does not include the ocr feature".to_string(),
            })
        }
    };

    bar.finish_and_clear();
    progress_surface.abort();

    result.map(CaptureCommandOutcome::Completed)
}
