//! Cost images from raster inputs.
//!
//! The solver consumes a [`CostImage`] whose scalars already encode
//! traversal cost. For a grayscale photograph the usual cost function
//! is an inverted gradient magnitude: strong edges get low cost, so
//! the geodesic path snaps to object boundaries. These helpers build
//! that pipeline: optional Gaussian blur, Sobel gradient magnitude,
//! inversion, min-max normalization to [0, 1].

use image::GrayImage;

use crate::image::CostImage;
use crate::types::GeodesicError;

/// Interpret grayscale intensities directly as cost, scaled to [0, 1].
///
/// Useful when the cost surface is authored as an image: dark pixels
/// are cheap, bright pixels are expensive.
///
/// # Errors
///
/// Returns [`GeodesicError::EmptyImage`] for a zero-sized image.
#[allow(clippy::cast_possible_truncation)]
pub fn cost_from_luma(image: &GrayImage) -> Result<CostImage, GeodesicError> {
    let scalars = image
        .pixels()
        .map(|p| f64::from(p.0[0]) / 255.0)
        .collect();
    CostImage::from_scalars_2d(image.width() as usize, image.height() as usize, scalars)
}

/// Build an inverted-gradient-magnitude cost image.
///
/// Blurs with `blur_sigma` (non-positive sigma skips the blur, since
/// the underlying filter panics on `sigma <= 0.0`), computes the Sobel
/// gradient magnitude, then inverts and normalizes so the strongest
/// edge in the image costs 0 and flat regions cost 1.
///
/// An image with no gradient anywhere (uniform input) yields a uniform
/// cost of 1: there are no edges to prefer.
///
/// # Errors
///
/// Returns [`GeodesicError::EmptyImage`] for a zero-sized image.
#[allow(clippy::cast_possible_truncation)]
pub fn gradient_cost(image: &GrayImage, blur_sigma: f32) -> Result<CostImage, GeodesicError> {
    let blurred = if blur_sigma > 0.0 {
        imageproc::filter::gaussian_blur_f32(image, blur_sigma)
    } else {
        image.clone()
    };

    let gradients = imageproc::gradients::sobel_gradients(&blurred);
    let max_magnitude = gradients.pixels().map(|p| p.0[0]).max().unwrap_or(0);

    let scalars = if max_magnitude == 0 {
        vec![1.0; gradients.pixels().len()]
    } else {
        let inv_max = 1.0 / f64::from(max_magnitude);
        gradients
            .pixels()
            .map(|p| 1.0 - f64::from(p.0[0]) * inv_max)
            .collect()
    };

    CostImage::from_scalars_2d(image.width() as usize, image.height() as usize, scalars)
}

/// Decode raw image bytes (PNG, JPEG, BMP, WebP), convert to grayscale
/// and build the inverted-gradient cost image.
///
/// # Errors
///
/// Returns [`GeodesicError::EmptyInput`] if `bytes` is empty and
/// [`GeodesicError::ImageDecode`] if the format is unrecognized or the
/// data is corrupt.
pub fn decode_gradient_cost(bytes: &[u8], blur_sigma: f32) -> Result<CostImage, GeodesicError> {
    if bytes.is_empty() {
        return Err(GeodesicError::EmptyInput);
    }
    let decoded = image::load_from_memory(bytes)?;
    gradient_cost(&decoded.to_luma8(), blur_sigma)
}
