use crate::common_types::{RecognizedText, TextBlock};
use crate::errors::AppError;
use crate::recognition::TextRecognizer;
use crate::AppResult;
use ocrs::{ImageSource, OcrEngine, OcrEngineParams, TextItem};
use std::path::PathBuf;

pub struct OcrsTextRecognizer {
    ocr_engine: OcrEngine,
}

impl OcrsTextRecognizer {
    pub fn new() -> AppResult<Self> {
        let models_dir = Self::find_models_dir()?;
        tracing::info!(
            "Loading OCR models from {}",
            models_dir.to_string_lossy()
        );
        let detection_model_path = models_dir.join("text-detection.rten");
        let recognition_model_path = models_dir.join("text-recognition.rten");
        let detection_model =
            rten::Model::load_file(detection_model_path).map_err(|e| init_error(&e))?;
        let recognition_model =
            rten::Model::load_file(recognition_model_path).map_err(|e| init_error(&e))?;
        let ocr_engine = OcrEngine::new(OcrEngineParams {
            detection_model: Some(detection_model),
            recognition_model: Some(recognition_model),
            ..Default::default()
        })
        .map_err(|e| init_error(&e))?;
        Ok(Self { ocr_engine })
    }

    fn find_models_dir() -> AppResult<PathBuf> {
        let executable = std::env::current_exe()?;
        let current_dir = executable.parent().map(|p| p.to_path_buf());

        vec![
            current_dir.clone().map(|p| p.join("models").join("ocrs")),
            current_dir
                .clone()
                .and_then(|p| p.parent().map(|p| p.join("share").join("ocrs"))),
            dirs::home_dir().map(|p| p.join(".cache").join("ocrs")),
        ]
        .into_iter()
        .collect::<Vec<Option<PathBuf>>>()
        .iter()
        .flatten()
        .find(|p| p.exists())
        .cloned()
        .ok_or_else(|| AppError::OcrEngineInitError {
            message: "Could not find models directory".to_string(),
        })
    }
}

impl TextRecognizer for OcrsTextRecognizer {
    fn recognize(&self, image_buffer: &[u8]) -> AppResult<RecognizedText> {
        let rgb_image = image::load_from_memory(image_buffer)
            .map_err(|e| recognition_error(&e))?
            .to_rgb8();
        let image_source = ImageSource::from_bytes(rgb_image.as_raw(), rgb_image.dimensions())
            .map_err(|e| recognition_error(&e))?;
        let input = self
            .ocr_engine
            .prepare_input(image_source)
            .map_err(|e| recognition_error(&e))?;
        let word_rects = self
            .ocr_engine
            .detect_words(&input)
            .map_err(|e| recognition_error(&e))?;
        let line_rects = self.ocr_engine.find_text_lines(&input, &word_rects);

        let mut blocks = vec![];
        let mut lines = vec![];
        for text_line in self
            .ocr_engine
            .recognize_text(&input, &line_rects)
            .map_err(|e| recognition_error(&e))?
            .into_iter()
            .flatten()
        {
            let mut line_text = String::new();
            let mut line_rect: Option<rten_imageproc::Rect> = None;
            for char in text_line.chars() {
                line_text.push(char.char);
                line_rect = Some(match line_rect {
                    Some(rect) => rect.union(char.rect),
                    None => char.rect,
                });
            }
            let trimmed = line_text.trim();
            if trimmed.is_empty() {
                continue;
            }
            if let Some(rect) = line_rect {
                blocks.push(TextBlock {
                    text: trimmed.to_string(),
                    confidence: None,
                    x1: rect.left() as f32,
                    y1: rect.top() as f32,
                    x2: rect.right() as f32,
                    y2: rect.bottom() as f32,
                });
            }
            lines.push(trimmed.to_string());
        }

        Ok(RecognizedText::new(lines.join("\n"), None, blocks))
    }
}

fn init_error<E: std::fmt::Display>(error: &E) -> AppError {
    AppError::OcrEngineInitError {
        message: error.to_string(),
    }
}

fn recognition_error<E: std::fmt::Display>(error: &E) -> AppError {
    AppError::OcrRecognitionError {
        message: error.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    #[cfg_attr(not(feature = "ci-ocr"), ignore)]
    fn test_recognize_png_buffer() -> AppResult<()> {
        let recognizer = OcrsTextRecognizer::new()?;
        let image_buffer = std::fs::read("test-fixtures/media/form-example.png")?;
        let recognized = recognizer.recognize(&image_buffer)?;
        assert!(recognized.blocks.len() > 5);
        assert!(!recognized.text.is_empty());
        Ok(())
    }
}
