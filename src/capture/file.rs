use crate::capture::CaptureSource;
use crate::errors::AppError;
use crate::reporter::AppReporter;
use crate::AppResult;
use image::DynamicImage;
use std::path::PathBuf;

pub struct FileCaptureSource<'a> {
    path: PathBuf,
    reporter: &'a AppReporter<'a>,
}

impl<'a> FileCaptureSource<'a> {
    pub fn new(source_path: &str, reporter: &'a AppReporter<'a>) -> AppResult<Self> {
        let path = PathBuf::from(
            source_path
                .strip_prefix("file://")
                .unwrap_or(source_path),
        );
        let is_image = mime_guess::from_path(&path)
            .first()
            .map(|media_type| media_type.type_() == mime::IMAGE)
            .unwrap_or(false);
        if !is_image {
            return Err(AppError::UnknownCaptureSource {
                source_path: source_path.to_string(),
            });
        }
        Ok(Self { path, reporter })
    }
}

impl<'a> CaptureSource<'a> for FileCaptureSource<'a> {
    async fn capture(&mut self) -> AppResult<DynamicImage> {
        let file_bytes = tokio::fs::read(&self.path).await?;
        let image = image::load_from_memory(&file_bytes)?;
        self.reporter.report(format!(
            "Loaded {} ({}x{})",
            self.path.to_string_lossy(),
            image.width(),
            image.height()
        ))?;
        Ok(image)
    }

    fn describe(&self) -> String {
        self.path.to_string_lossy().to_string()
    }

    fn is_viewport(&self) -> bool {
        false
    }
}
