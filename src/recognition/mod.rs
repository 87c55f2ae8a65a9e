use crate::common_types::RecognizedText;
use crate::AppResult;

#[cfg(feature = "ocr")]
mod ocrs_engine;
#[cfg(feature = "ocr")]
pub use ocrs_engine::*;

pub trait TextRecognizer {
    /// Recognizes text in an encoded image buffer. The returned text is
    /// whitespace-trimmed.
    fn recognize(&self, image_buffer: &[u8]) -> AppResult<RecognizedText>;
}

#[cfg(feature = "ocr")]
static SHARED_ENGINE: tokio::sync::OnceCell<OcrsTextRecognizer> =
    tokio::sync::OnceCell::const_new();

/// Initialize-once accessor for the process-wide recognition engine. The
/// engine is created on first use and reused for the process lifetime.
#[cfg(feature = "ocr")]
pub async fn shared_engine() -> AppResult<&'static OcrsTextRecognizer> {
    SHARED_ENGINE
        .get_or_try_init(|| async {
            tokio::task::spawn_blocking(OcrsTextRecognizer::new)
                .await
                .map_err(|e| crate::errors::AppError::OcrEngineInitError {
                    message: format!("Engine initialization task failed: {}", e),
                })?
        })
        .await
}
