use crate::bus::{MessageBus, SurfaceMessage};
use crate::capture::CaptureSource;
use crate::common_types::{CaptureRect, RecognizedText};
use crate::errors::AppError;
use crate::preprocess::Preprocessor;
use crate::recognition::TextRecognizer;
use crate::sink::ResultSink;
use crate::store::{JobStatus, Store};
use crate::AppResult;
use tokio::sync::Mutex;

/// Orchestrates one capture job through capture, preprocessing and
/// recognition. The capture device and the recognition engine are exclusive
/// resources, so at most one job runs at a time; a second trigger while one
/// is in flight is rejected and requires a new user gesture.
pub struct CapturePipeline<'a> {
    store: &'a Store,
    bus: &'a MessageBus,
    in_flight: Mutex<()>,
}

impl<'a> CapturePipeline<'a> {
    pub fn new(store: &'a Store, bus: &'a MessageBus) -> Self {
        Self {
            store,
            bus,
            in_flight: Mutex::new(()),
        }
    }

    /// Runs a job to its terminal state. Every pipeline error is caught at
    /// the sink boundary, published once, and never retried.
    pub async fn run<'s, S, R>(
        &self,
        source: &mut S,
        preprocessor: &Preprocessor,
        recognizer: &R,
        rect: Option<CaptureRect>,
        sink: &ResultSink<'_>,
    ) -> AppResult<RecognizedText>
    where
        S: CaptureSource<'s>,
        R: TextRecognizer + ?Sized,
    {
        let _guard = self
            .in_flight
            .try_lock()
            .map_err(|_| AppError::CaptureInFlight)?;

        match self.execute(source, preprocessor, recognizer, rect).await {
            Ok(recognized) => {
                sink.complete(&recognized)?;
                Ok(recognized)
            }
            Err(error) => {
                sink.fail(&error)?;
                Err(error)
            }
        }
    }

    async fn execute<'s, S, R>(
        &self,
        source: &mut S,
        preprocessor: &Preprocessor,
        recognizer: &R,
        rect: Option<CaptureRect>,
    ) -> AppResult<RecognizedText>
    where
        S: CaptureSource<'s>,
        R: TextRecognizer + ?Sized,
    {
        self.store.set_status(JobStatus::Capturing)?;
        self.progress("Capturing screenshot...");
        let image = source.capture().await?;

        self.store.set_status(JobStatus::Preprocessing)?;
        self.progress("Processing image...");
        // Non-viewport sources are recognized whole.
        let rect = if source.is_viewport() { rect } else { None };
        let image_buffer = preprocessor.run(&image, rect.as_ref())?;

        self.store.set_status(JobStatus::Recognizing)?;
        self.bus.publish(SurfaceMessage::PerformOcr);
        self.progress("Extracting text...");
        recognizer.recognize(&image_buffer)
    }

    fn progress(&self, message: &str) {
        self.bus.publish(SurfaceMessage::OcrProgress {
            message: message.to_string(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common_types::TextBlock;
    use crate::overlay::{SelectionOutcome, SelectionOverlay};
    use crate::preprocess::PreprocessPipeline;
    use crate::reporter::AppReporter;
    use console::Term;
    use image::{DynamicImage, Rgba, RgbaImage};

    struct StubCaptureSource {
        image: DynamicImage,
        viewport: bool,
        fail: bool,
    }

    impl StubCaptureSource {
        fn viewport(width: u32, height: u32) -> Self {
            let image = RgbaImage::from_pixel(width, height, Rgba([200, 200, 200, 255]));
            Self {
                image: DynamicImage::ImageRgba8(image),
                viewport: true,
                fail: false,
            }
        }

        fn failing() -> Self {
            let mut source = Self::viewport(1, 1);
            source.fail = true;
            source
        }
    }

    impl<'a> CaptureSource<'a> for StubCaptureSource {
        async fn capture(&mut self) -> AppResult<DynamicImage> {
            if self.fail {
                return Err(AppError::CaptureError {
                    message: "permission denied".to_string(),
                });
            }
            Ok(self.image.clone())
        }

        fn describe(&self) -> String {
            "stub".to_string()
        }

        fn is_viewport(&self) -> bool {
            self.viewport
        }
    }

    struct StubRecognizer {
        output: Option<String>,
    }

    impl TextRecognizer for StubRecognizer {
        fn recognize(&self, _image_buffer: &[u8]) -> AppResult<RecognizedText> {
            match &self.output {
                Some(output) => Ok(RecognizedText::new(
                    output.clone(),
                    Some(0.9),
                    vec![TextBlock {
                        text: output.trim().to_string(),
                        confidence: Some(0.9),
                        x1: 0.0,
                        y1: 0.0,
                        x2: 10.0,
                        y2: 10.0,
                    }],
                )),
                None => Err(AppError::OcrRecognitionError {
                    message: "engine exploded".to_string(),
                }),
            }
        }
    }

    fn temp_store() -> (tempfile::TempDir, Store) {
        let dir = tempfile::tempdir().unwrap();
        let store = Store::open(dir.path().join("state.json")).unwrap();
        (dir, store)
    }

    #[tokio::test]
    async fn test_selection_to_history_round_trip() {
        let (_dir, store) = temp_store();
        let bus = MessageBus::new();
        let term = Term::stdout();
        let reporter = AppReporter::from(&term);
        let sink = ResultSink::new(&store, &bus, &reporter);
        let pipeline = CapturePipeline::new(&store, &bus);
        let mut events = bus.subscribe();

        // A 200x100 logical selection at device pixel ratio 2 captures a
        // 400x200 device-pixel region.
        let mut overlay = SelectionOverlay::new(2.0);
        let rect = match overlay.select_region(&CaptureRect {
            x: 10.0,
            y: 20.0,
            width: 200.0,
            height: 100.0,
        }) {
            SelectionOutcome::Selected(rect) => rect,
            other => panic!("expected selection, got {:?}", other),
        };
        assert_eq!((rect.width, rect.height), (400.0, 200.0));

        let mut source = StubCaptureSource::viewport(800, 600);
        let recognizer = StubRecognizer {
            output: Some("Hello World  ".to_string()),
        };
        let preprocessor = Preprocessor::new(PreprocessPipeline::Basic);

        let recognized = pipeline
            .run(&mut source, &preprocessor, &recognizer, Some(rect), &sink)
            .await
            .unwrap();

        assert_eq!(recognized.text, "Hello World");
        assert_eq!(store.last_result().as_deref(), Some("Hello World"));
        assert_eq!(store.status(), JobStatus::Done);
        let history = store.history();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].text, "Hello World");

        let mut saw_complete = false;
        while let Ok(message) = events.try_recv() {
            if let SurfaceMessage::OcrComplete { text } = message {
                assert_eq!(text, "Hello World");
                saw_complete = true;
            }
        }
        assert!(saw_complete);
    }

    #[tokio::test]
    async fn test_progress_messages_are_published_in_stage_order() {
        let (_dir, store) = temp_store();
        let bus = MessageBus::new();
        let term = Term::stdout();
        let reporter = AppReporter::from(&term);
        let sink = ResultSink::new(&store, &bus, &reporter);
        let pipeline = CapturePipeline::new(&store, &bus);
        let mut events = bus.subscribe();

        let mut source = StubCaptureSource::viewport(100, 100);
        let recognizer = StubRecognizer {
            output: Some("ok".to_string()),
        };
        let preprocessor = Preprocessor::new(PreprocessPipeline::None);
        pipeline
            .run(&mut source, &preprocessor, &recognizer, None, &sink)
            .await
            .unwrap();

        let mut progress = vec![];
        while let Ok(message) = events.try_recv() {
            if let SurfaceMessage::OcrProgress { message } = message {
                progress.push(message);
            }
        }
        assert_eq!(
            progress,
            vec![
                "Capturing screenshot...",
                "Processing image...",
                "Extracting text...",
            ]
        );
    }

    #[tokio::test]
    async fn test_failed_recognition_ends_in_error_status() {
        let (_dir, store) = temp_store();
        let bus = MessageBus::new();
        let term = Term::stdout();
        let reporter = AppReporter::from(&term);
        let sink = ResultSink::new(&store, &bus, &reporter);
        let pipeline = CapturePipeline::new(&store, &bus);
        let mut events = bus.subscribe();

        let mut source = StubCaptureSource::viewport(100, 100);
        let recognizer = StubRecognizer { output: None };
        let preprocessor = Preprocessor::new(PreprocessPipeline::Basic);
        let result = pipeline
            .run(&mut source, &preprocessor, &recognizer, None, &sink)
            .await;

        assert!(matches!(result, Err(AppError::OcrRecognitionError { .. })));
        assert_eq!(store.status(), JobStatus::Error);
        assert!(store.last_error().unwrap().contains("engine exploded"));
        let saw_error = std::iter::from_fn(|| events.try_recv().ok())
            .any(|message| matches!(message, SurfaceMessage::OcrError { .. }));
        assert!(saw_error);
    }

    #[tokio::test]
    async fn test_capture_failure_is_terminal_too() {
        let (_dir, store) = temp_store();
        let bus = MessageBus::new();
        let term = Term::stdout();
        let reporter = AppReporter::from(&term);
        let sink = ResultSink::new(&store, &bus, &reporter);
        let pipeline = CapturePipeline::new(&store, &bus);

        let mut source = StubCaptureSource::failing();
        let recognizer = StubRecognizer {
            output: Some("unused".to_string()),
        };
        let preprocessor = Preprocessor::new(PreprocessPipeline::Basic);
        let result = pipeline
            .run(&mut source, &preprocessor, &recognizer, None, &sink)
            .await;

        assert!(matches!(result, Err(AppError::CaptureError { .. })));
        assert_eq!(store.status(), JobStatus::Error);
    }

    #[tokio::test]
    async fn test_second_job_is_rejected_while_one_is_in_flight() {
        let (_dir, store) = temp_store();
        let bus = MessageBus::new();
        let term = Term::stdout();
        let reporter = AppReporter::from(&term);
        let sink = ResultSink::new(&store, &bus, &reporter);
        let pipeline = CapturePipeline::new(&store, &bus);

        let guard = pipeline.in_flight.try_lock().unwrap();
        let mut source = StubCaptureSource::viewport(100, 100);
        let recognizer = StubRecognizer {
            output: Some("unused".to_string()),
        };
        let preprocessor = Preprocessor::new(PreprocessPipeline::Basic);
        let result = pipeline
            .run(&mut source, &preprocessor, &recognizer, None, &sink)
            .await;
        assert!(matches!(result, Err(AppError::CaptureInFlight)));
        drop(guard);

        // After the first job releases the guard a new trigger succeeds.
        let result = pipeline
            .run(&mut source, &preprocessor, &recognizer, None, &sink)
            .await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_non_viewport_sources_are_processed_whole() {
        let (_dir, store) = temp_store();
        let bus = MessageBus::new();
        let term = Term::stdout();
        let reporter = AppReporter::from(&term);
        let sink = ResultSink::new(&store, &bus, &reporter);
        let pipeline = CapturePipeline::new(&store, &bus);

        let mut source = StubCaptureSource {
            image: DynamicImage::ImageRgba8(RgbaImage::from_pixel(
                50,
                50,
                Rgba([255, 255, 255, 255]),
            )),
            viewport: false,
            fail: false,
        };
        let recognizer = StubRecognizer {
            output: Some("whole".to_string()),
        };
        let preprocessor = Preprocessor::new(PreprocessPipeline::Basic);
        // A rectangle larger than the image would fail cropping; for a
        // non-viewport source it is ignored instead.
        let rect = CaptureRect {
            x: 500.0,
            y: 500.0,
            width: 100.0,
            height: 100.0,
        };
        let result = pipeline
            .run(&mut source, &preprocessor, &recognizer, Some(rect), &sink)
            .await;
        assert!(result.is_ok());
    }
}
