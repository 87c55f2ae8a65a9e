use crate::errors::AppError;
use crate::reporter::AppReporter;
use crate::AppResult;
use image::DynamicImage;

mod file;
use file::FileCaptureSource;

#[cfg(feature = "screen")]
mod screen;
#[cfg(feature = "screen")]
use screen::ScreenCaptureSource;

#[cfg(feature = "clipboard")]
mod clipboard;
#[cfg(feature = "clipboard")]
use clipboard::ClipboardCaptureSource;

pub const SCREEN_SCHEME: &str = "screen://";
pub const CLIPBOARD_SCHEME: &str = "clipboard://";

pub trait CaptureSource<'a> {
    /// Produces the full source image; a job's rectangle is applied later by
    /// the preprocessor.
    async fn capture(&mut self) -> AppResult<DynamicImage>;

    fn describe(&self) -> String;

    /// Whether this source captures a live viewport. Non-viewport sources
    /// (files, clipboard images) are processed whole, without a rectangle.
    fn is_viewport(&self) -> bool;
}

pub enum DetectCaptureSource<'a> {
    #[cfg(feature = "screen")]
    Screen(ScreenCaptureSource<'a>),
    #[cfg(feature = "clipboard")]
    Clipboard(ClipboardCaptureSource<'a>),
    File(FileCaptureSource<'a>),
}

impl<'a> DetectCaptureSource<'a> {
    pub async fn open(
        source_path: &str,
        reporter: &'a AppReporter<'a>,
    ) -> AppResult<impl CaptureSource<'a>> {
        if source_path == SCREEN_SCHEME {
            #[cfg(feature = "screen")]
            {
                Ok(DetectCaptureSource::Screen(ScreenCaptureSource::new(
                    reporter,
                )?))
            }
            #[cfg(not(feature = "screen"))]
            {
                Err(AppError::UnknownCaptureSource {
                    source_path: source_path.to_string(),
                })
            }
        } else if source_path == CLIPBOARD_SCHEME {
            #[cfg(feature = "clipboard")]
            {
                Ok(DetectCaptureSource::Clipboard(ClipboardCaptureSource::new(
                    reporter,
                )?))
            }
            #[cfg(not(feature = "clipboard"))]
            {
                Err(AppError::UnknownCaptureSource {
                    source_path: source_path.to_string(),
                })
            }
        } else if source_path.starts_with("file://") || !source_path.contains("://") {
            Ok(DetectCaptureSource::File(FileCaptureSource::new(
                source_path,
                reporter,
            )?))
        } else {
            Err(AppError::UnknownCaptureSource {
                source_path: source_path.to_string(),
            })
        }
    }
}

impl<'a> CaptureSource<'a> for DetectCaptureSource<'a> {
    async fn capture(&mut self) -> AppResult<DynamicImage> {
        match self {
            #[cfg(feature = "screen")]
            DetectCaptureSource::Screen(source) => source.capture().await,
            #[cfg(feature = "clipboard")]
            DetectCaptureSource::Clipboard(source) => source.capture().await,
            DetectCaptureSource::File(source) => source.capture().await,
        }
    }

    fn describe(&self) -> String {
        match self {
            #[cfg(feature = "screen")]
            DetectCaptureSource::Screen(source) => source.describe(),
            #[cfg(feature = "clipboard")]
            DetectCaptureSource::Clipboard(source) => source.describe(),
            DetectCaptureSource::File(source) => source.describe(),
        }
    }

    fn is_viewport(&self) -> bool {
        match self {
            #[cfg(feature = "screen")]
            DetectCaptureSource::Screen(source) => source.is_viewport(),
            #[cfg(feature = "clipboard")]
            DetectCaptureSource::Clipboard(source) => source.is_viewport(),
            DetectCaptureSource::File(source) => source.is_viewport(),
        }
    }
}
