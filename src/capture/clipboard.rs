use crate::capture::CaptureSource;
use crate::errors::AppError;
use crate::reporter::AppReporter;
use crate::AppResult;
use arboard::Clipboard;
use image::DynamicImage;

pub struct ClipboardCaptureSource<'a> {
    clipboard: Clipboard,
    reporter: &'a AppReporter<'a>,
}

impl<'a> ClipboardCaptureSource<'a> {
    pub fn new(reporter: &'a AppReporter<'a>) -> AppResult<Self> {
        Ok(Self {
            clipboard: Clipboard::new()?,
            reporter,
        })
    }
}

impl<'a> CaptureSource<'a> for ClipboardCaptureSource<'a> {
    async fn capture(&mut self) -> AppResult<DynamicImage> {
        let image_data = self.clipboard.get_image()?;
        let maybe_image: Option<image::RgbaImage> = image::ImageBuffer::from_raw(
            image_data.width as u32,
            image_data.height as u32,
            image_data.bytes.into_owned(),
        );
        let image = maybe_image.ok_or_else(|| AppError::CaptureError {
            message: "Clipboard does not contain a supported image".to_string(),
        })?;
        self.reporter.report(format!(
            "Loaded clipboard image ({}x{})",
            image.width(),
            image.height()
        ))?;
        Ok(DynamicImage::ImageRgba8(image))
    }

    fn describe(&self) -> String {
        "clipboard://".to_string()
    }

    fn is_viewport(&self) -> bool {
        false
    }
}
