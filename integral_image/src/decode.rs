use std::path::Path;

use anyhow::{Context, Result};
use image::{io::Reader as ImageReader, DynamicImage, ImageBuffer, Pixel};

use crate::{Error, Image};

fn from_buffer<P>(buf: &ImageBuffer<P, Vec<P::Subpixel>>) -> Result<Image<f32>, Error>
where
    P: Pixel,
    P::Subpixel: Into<f32>,
{
    let (w, h) = buf.dimensions();
    let data = buf.as_raw().iter().map(|&v| v.into()).collect();
    Image::from_vec(h as usize, w as usize, usize::from(P::CHANNEL_COUNT), data)
}

/// Copies a decoded image into an interleaved `Image<f32>`, keeping its
/// channel layout. 8- and 16-bit samples are exact in `f32`.
pub fn image_from_dynamic(img: &DynamicImage) -> Result<Image<f32>, Error> {
    match img {
        DynamicImage::ImageLuma8(b) => from_buffer(b),
        DynamicImage::ImageLumaA8(b) => from_buffer(b),
        DynamicImage::ImageRgb8(b) => from_buffer(b),
        DynamicImage::ImageRgba8(b) => from_buffer(b),
        DynamicImage::ImageLuma16(b) => from_buffer(b),
        DynamicImage::ImageLumaA16(b) => from_buffer(b),
        DynamicImage::ImageRgb16(b) => from_buffer(b),
        DynamicImage::ImageRgba16(b) => from_buffer(b),
        DynamicImage::ImageRgb32F(b) => from_buffer(b),
        DynamicImage::ImageRgba32F(b) => from_buffer(b),
        other => from_buffer(&other.to_rgba32f()),
    }
}

pub fn load_image(path: &Path) -> Result<Image<f32>> {
    let dyn_img = ImageReader::open(path)
        .with_context(|| format!("unable to open image: {}", path.display()))?
        .decode()
        .with_context(|| format!("unable to read image: {}", path.display()))?;
    Ok(image_from_dynamic(&dyn_img)?)
}
