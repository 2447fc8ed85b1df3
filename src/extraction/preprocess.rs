use std::io::Cursor;

use image::{DynamicImage, GrayImage, ImageFormat, Luma};

const CONTRAST: f32 = 2.0;
const BRIGHTNESS: f32 = 30.0;
const THRESHOLD: f32 = 140.0;

/// Grayscale, contrast/brightness boost and binary threshold; returns PNG bytes.
pub fn binarize(image: &DynamicImage) -> Result<Vec<u8>, image::ImageError> {
    let rgba = image.to_rgba8();
    let factor = (259.0 * (CONTRAST + 255.0)) / (255.0 * (259.0 - CONTRAST));

    let mut out = GrayImage::new(rgba.width(), rgba.height());
    for (x, y, pixel) in rgba.enumerate_pixels() {
        let [r, g, b, _] = pixel.0;
        let gray = 0.299 * r as f32 + 0.587 * g as f32 + 0.114 * b as f32;
        let enhanced = (factor * (gray - 128.0) + 128.0 + BRIGHTNESS).clamp(0.0, 255.0);
        let value = if enhanced > THRESHOLD { 255 } else { 0 };
        out.put_pixel(x, y, Luma([value]));
    }

    let mut png = Vec::new();
    DynamicImage::ImageLuma8(out).write_to(&mut Cursor::new(&mut png), ImageFormat::Png)?;
    Ok(png)
}
