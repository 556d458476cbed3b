use std::io::Cursor;
use std::path::Path;

use image::imageops::interpolate_bilinear;
use image::{DynamicImage, GenericImageView, GrayImage, ImageBuffer, ImageReader, Luma, Pixel};
use ndarray::Array2;

use crate::error::{RecognizerError, Result};
use crate::models::{ImageTensor, ModelConfiguration};

/// ITU-R BT.601 luma weights for R, G and B.
const LUMA_WEIGHTS: [f32; 3] = [0.299, 0.587, 0.114];

/// Load an image file and turn it into model input
///
/// Applies the following transformations:
/// 1. Decodes the file, guessing the format from its content
/// 2. Converts to single-channel grayscale (BT.601 weights, alpha dropped)
/// 3. Resizes to the configured width and height with bilinear sampling
/// 4. Scales pixel values from [0, 255] to [0, 1] as `f32`
/// 5. Adds batch and channel axes, giving `[1, height, width, 1]`
pub fn load_and_preprocess(
    path: impl AsRef<Path>,
    configuration: &ModelConfiguration,
) -> Result<ImageTensor> {
    let path = path.as_ref();

    let img = ImageReader::open(path)
        .map_err(|e| RecognizerError::ImageLoad(format!("{}: {e}", path.display())))?
        .with_guessed_format()
        .map_err(|e| RecognizerError::ImageLoad(format!("{}: {e}", path.display())))?
        .decode()
        .map_err(|e| RecognizerError::ImageLoad(format!("{}: {e}", path.display())))?;

    preprocess(img, configuration)
}

/// Same pipeline as [`load_and_preprocess`], starting from encoded image bytes.
pub fn preprocess_bytes(bytes: &[u8], configuration: &ModelConfiguration) -> Result<ImageTensor> {
    let img = ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| RecognizerError::ImageLoad(format!("Failed to read image: {e}")))?
        .decode()
        .map_err(|e| RecognizerError::ImageLoad(format!("Failed to decode image: {e}")))?;

    preprocess(img, configuration)
}

fn preprocess(img: DynamicImage, configuration: &ModelConfiguration) -> Result<ImageTensor> {
    let (width, height) = img.dimensions();
    tracing::debug!(width, height, "Decoded input image");

    let gray = DynamicImage::ImageLuma8(to_grayscale(&img));
    let resized = resize(
        &gray,
        configuration.final_image_width(),
        configuration.final_image_height(),
    )?;

    ImageTensor::from_plane(normalize(&resized.to_luma8()))
}

/// Resize to exactly `target_width x target_height`, keeping the pixel format.
///
/// Bilinear in both directions: each output pixel centre is mapped back to
/// `(x + 0.5) * scale - 0.5` in the source and blended from the 2x2
/// neighbourhood around it, with coordinates clamped to the image edges.
/// Shrinking therefore samples rather than area-averages. A constant image
/// stays constant.
pub fn resize(image: &DynamicImage, target_width: u32, target_height: u32) -> Result<DynamicImage> {
    let (width, height) = image.dimensions();
    if width == 0 || height == 0 {
        return Err(RecognizerError::InvalidInput(format!(
            "cannot resize an empty image ({width}x{height})"
        )));
    }
    if target_width == 0 || target_height == 0 {
        return Err(RecognizerError::InvalidInput(format!(
            "target size must be positive, got {target_width}x{target_height}"
        )));
    }

    if (width, height) == (target_width, target_height) {
        return Ok(image.clone());
    }

    let (w, h) = (target_width, target_height);
    let resized = match image {
        DynamicImage::ImageLuma8(img) => DynamicImage::ImageLuma8(resize_linear(img, w, h)),
        DynamicImage::ImageLumaA8(img) => DynamicImage::ImageLumaA8(resize_linear(img, w, h)),
        DynamicImage::ImageRgb8(img) => DynamicImage::ImageRgb8(resize_linear(img, w, h)),
        DynamicImage::ImageRgba8(img) => DynamicImage::ImageRgba8(resize_linear(img, w, h)),
        DynamicImage::ImageLuma16(img) => DynamicImage::ImageLuma16(resize_linear(img, w, h)),
        DynamicImage::ImageLumaA16(img) => DynamicImage::ImageLumaA16(resize_linear(img, w, h)),
        DynamicImage::ImageRgb16(img) => DynamicImage::ImageRgb16(resize_linear(img, w, h)),
        DynamicImage::ImageRgba16(img) => DynamicImage::ImageRgba16(resize_linear(img, w, h)),
        DynamicImage::ImageRgb32F(img) => DynamicImage::ImageRgb32F(resize_linear(img, w, h)),
        DynamicImage::ImageRgba32F(img) => DynamicImage::ImageRgba32F(resize_linear(img, w, h)),
        other => {
            return Err(RecognizerError::InvalidInput(format!(
                "unsupported pixel format {:?}",
                other.color()
            )))
        }
    };

    Ok(resized)
}

fn resize_linear<P: Pixel>(
    image: &ImageBuffer<P, Vec<P::Subpixel>>,
    target_width: u32,
    target_height: u32,
) -> ImageBuffer<P, Vec<P::Subpixel>> {
    let (width, height) = image.dimensions();
    let scale_x = width as f32 / target_width as f32;
    let scale_y = height as f32 / target_height as f32;
    let max_x = (width - 1) as f32;
    let max_y = (height - 1) as f32;

    ImageBuffer::from_fn(target_width, target_height, |x, y| {
        let src_x = ((x as f32 + 0.5) * scale_x - 0.5).clamp(0.0, max_x);
        let src_y = ((y as f32 + 0.5) * scale_y - 0.5).clamp(0.0, max_y);
        interpolate_bilinear(image, src_x, src_y)
            .unwrap_or_else(|| *image.get_pixel(src_x as u32, src_y as u32))
    })
}

/// Convert any color encoding to 8-bit luma
///
/// Color images are weighted with the fixed BT.601 formula
/// `Y = 0.299 R + 0.587 G + 0.114 B`. Alpha is ignored.
pub fn to_grayscale(img: &DynamicImage) -> GrayImage {
    if let DynamicImage::ImageLuma8(gray) = img {
        return gray.clone();
    }

    let rgb = img.to_rgb8();
    GrayImage::from_fn(rgb.width(), rgb.height(), |x, y| {
        let pixel = rgb.get_pixel(x, y);
        let luma: f32 = pixel
            .0
            .iter()
            .zip(LUMA_WEIGHTS)
            .map(|(&channel, weight)| f32::from(channel) * weight)
            .sum();
        Luma([luma.round().clamp(0.0, 255.0) as u8])
    })
}

/// Map 8-bit luma into a `height x width` plane of values in [0, 1].
fn normalize(gray: &GrayImage) -> Array2<f32> {
    let (width, height) = gray.dimensions();
    Array2::from_shape_fn((height as usize, width as usize), |(y, x)| {
        f32::from(gray.get_pixel(x as u32, y as u32)[0]) / 255.0
    })
}
