use crate::common_types::CaptureRect;
use crate::errors::AppError;
use crate::AppResult;
use bytes::Bytes;
use image::{DynamicImage, ImageFormat};

const FIXED_THRESHOLD: u8 = 128;
#[cfg(feature = "vision")]
const UPSCALE_FACTOR: u32 = 2;
#[cfg(feature = "vision")]
const BLUR_SIGMA: f32 = 0.8;
#[cfg(feature = "vision")]
const ADAPTIVE_BLOCK_RADIUS: u32 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PreprocessPipeline {
    /// Grayscale, blur, neighborhood threshold, 2x upscale.
    #[default]
    Adaptive,
    /// Grayscale plus one global threshold.
    Basic,
    None,
}

impl std::str::FromStr for PreprocessPipeline {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "adaptive" => Ok(PreprocessPipeline::Adaptive),
            "basic" => Ok(PreprocessPipeline::Basic),
            "none" => Ok(PreprocessPipeline::None),
            _ => Err(format!("Unknown preprocessing pipeline: {}", s)),
        }
    }
}

impl std::fmt::Display for PreprocessPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PreprocessPipeline::Adaptive => write!(f, "adaptive"),
            PreprocessPipeline::Basic => write!(f, "basic"),
            PreprocessPipeline::None => write!(f, "none"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Preprocessor {
    pipeline: PreprocessPipeline,
}

impl Preprocessor {
    pub fn new(pipeline: PreprocessPipeline) -> Self {
        Self { pipeline }
    }

    /// Crops the source to the capture rectangle (whole image when absent)
    /// and applies the configured pipeline. Returns a PNG-encoded buffer.
    pub fn run(&self, image: &DynamicImage, rect: Option<&CaptureRect>) -> AppResult<Bytes> {
        let cropped = crop_to_rect(image, rect)?;
        let processed = match self.pipeline {
            PreprocessPipeline::Adaptive => adaptive_pipeline(&cropped),
            PreprocessPipeline::Basic => basic_pipeline(&cropped),
            PreprocessPipeline::None => cropped,
        };
        encode_png(&processed)
    }
}

fn crop_to_rect(image: &DynamicImage, rect: Option<&CaptureRect>) -> AppResult<DynamicImage> {
    let rect = match rect {
        Some(rect) => rect,
        None => return Ok(image.clone()),
    };
    let x = rect.x.round().max(0.0) as u32;
    let y = rect.y.round().max(0.0) as u32;
    if x >= image.width() || y >= image.height() {
        return Err(AppError::PreprocessingError {
            message: format!(
                "Capture rectangle {} is outside the {}x{} image",
                rect,
                image.width(),
                image.height()
            ),
        });
    }
    let width = (rect.width.round() as u32).min(image.width() - x);
    let height = (rect.height.round() as u32).min(image.height() - y);
    if width == 0 || height == 0 {
        return Err(AppError::PreprocessingError {
            message: format!("Capture rectangle {} is empty after clamping", rect),
        });
    }
    Ok(image.crop_imm(x, y, width, height))
}

#[cfg(feature = "vision")]
fn adaptive_pipeline(image: &DynamicImage) -> DynamicImage {
    let gray = image.to_luma8();
    let blurred = imageproc::filter::gaussian_blur_f32(&gray, BLUR_SIGMA);
    let binarized = imageproc::contrast::adaptive_threshold(&blurred, ADAPTIVE_BLOCK_RADIUS);
    upscale(binarized)
}

// Without the vision library the adaptive request degrades to the flat
// grayscale + fixed threshold pipeline.
#[cfg(not(feature = "vision"))]
fn adaptive_pipeline(image: &DynamicImage) -> DynamicImage {
    basic_pipeline(image)
}

fn basic_pipeline(image: &DynamicImage) -> DynamicImage {
    let mut gray = image.to_luma8();
    for pixel in gray.pixels_mut() {
        pixel.0[0] = if pixel.0[0] < FIXED_THRESHOLD { 0 } else { 255 };
    }
    DynamicImage::ImageLuma8(gray)
}

#[cfg(feature = "vision")]
fn upscale(gray: image::GrayImage) -> DynamicImage {
    let (width, height) = gray.dimensions();
    let upscaled = image::imageops::resize(
        &gray,
        width * UPSCALE_FACTOR,
        height * UPSCALE_FACTOR,
        image::imageops::FilterType::CatmullRom,
    );
    DynamicImage::ImageLuma8(upscaled)
}

fn encode_png(image: &DynamicImage) -> AppResult<Bytes> {
    let mut writer = std::io::Cursor::new(Vec::new());
    image.write_to(&mut writer, ImageFormat::Png)?;
    Ok(Bytes::from(writer.into_inner()))
}
