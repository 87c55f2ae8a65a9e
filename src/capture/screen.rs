use crate::capture::CaptureSource;
use crate::errors::AppError;
use crate::reporter::AppReporter;
use crate::AppResult;
use image::DynamicImage;
use xcap::Monitor;

pub struct ScreenCaptureSource<'a> {
    reporter: &'a AppReporter<'a>,
}

impl<'a> ScreenCaptureSource<'a> {
    pub fn new(reporter: &'a AppReporter<'a>) -> AppResult<Self> {
        Ok(Self { reporter })
    }
}

impl<'a> CaptureSource<'a> for ScreenCaptureSource<'a> {
    async fn capture(&mut self) -> AppResult<DynamicImage> {
        // xcap talks to the display server, so keep it off the async runtime
        let screenshot = tokio::task::spawn_blocking(|| {
            let monitors = Monitor::all().map_err(|e| AppError::CaptureError {
                message: e.to_string(),
            })?;
            let monitor = monitors
                .iter()
                .find(|monitor| monitor.is_primary().unwrap_or(false))
                .or_else(|| monitors.first())
                .ok_or_else(|| AppError::CaptureError {
                    message: "No monitors detected".to_string(),
                })?;
            monitor.capture_image().map_err(|e| AppError::CaptureError {
                message: e.to_string(),
            })
        })
        .await
        .map_err(|e| AppError::SystemError {
            message: format!("Capture task failed: {}", e),
        })??;

        self.reporter.report(format!(
            "Captured viewport {}x{}",
            screenshot.width(),
            screenshot.height()
        ))?;
        Ok(DynamicImage::ImageRgba8(screenshot))
    }

    fn describe(&self) -> String {
        "screen://".to_string()
    }

    fn is_viewport(&self) -> bool {
        true
    }
}
