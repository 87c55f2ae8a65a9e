use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Unknown capture source is specified: {source_path}")]
    UnknownCaptureSource { source_path: String },
    #[error("Another capture job is already in flight")]
    CaptureInFlight,
    #[error("Screen capture failed: {message}")]
    CaptureError { message: String },
    #[error("Image preprocessing failed: {message}")]
    PreprocessingError { message: String },
    #[error("OCR engine initialization failed: {message}")]
    OcrEngineInitError { message: String },
    #[error("OCR recognition failed: {message}")]
    OcrRecognitionError { message: String },
    #[error("Illegal job status transition: {from} -> {to}")]
    IllegalStatusTransition { from: String, to: String },
    #[error("Input/output error")]
    InputOutputError(#[from] std::io::Error),
    #[error("HTTP client error:\n{0}")]
    HttpClientError(#[from] reqwest::Error),
    #[error("JSON error:\n{0}")]
    JsonError(#[from] serde_json::Error),
    #[error("URL error:\n{0}")]
    UrlError(#[from] url::ParseError),
    #[error("Image conversion error: {0}")]
    ImageError(#[from] image::ImageError),
    #[cfg(feature = "clipboard")]
    #[error("Clipboard error: {0}")]
    ClipboardError(#[from] arboard::Error),
    #[cfg(feature = "notifications")]
    #[error("Notification error: {0}")]
    NotificationError(#[from] notify_rust::error::Error),
    #[error("System error: {message}")]
    SystemError { message: String },
}
