//! Image preprocessing for the MRI classifier

use image::{imageops::FilterType, DynamicImage};
use ndarray::Array4;

use crate::error::ClassifyError;

/// Model input size (VGG16-style backbone)
pub const INPUT_SIZE: (u32, u32) = (224, 224);

/// Decode an uploaded image from bytes with EXIF orientation handling
///
/// Mobile phones often store images with EXIF orientation tags instead of
/// rotating pixels, so the orientation is applied before classification.
pub fn decode_image(data: &[u8]) -> Result<DynamicImage, ClassifyError> {
    let image = image::load_from_memory(data).map_err(ClassifyError::unsupported)?;

    if image.width() == 0 || image.height() == 0 {
        return Err(ClassifyError::unsupported("image has zero-sized dimensions"));
    }

    Ok(apply_exif_orientation(data, image))
}

/// Convert an image into the `(1, 224, 224, 3)` tensor the model expects.
///
/// Steps, order-significant: convert to 3-channel RGB, resize to exactly
/// 224x224 with bilinear interpolation, scale intensities from `[0, 255]`
/// to `[0, 1]`, insert a leading batch dimension.
pub fn preprocess(image: &DynamicImage) -> Result<Array4<f32>, ClassifyError> {
    if image.width() == 0 || image.height() == 0 {
        return Err(ClassifyError::unsupported("image has zero-sized dimensions"));
    }

    let (target_w, target_h) = INPUT_SIZE;
    let rgb = image.to_rgb8();
    let resized = if rgb.dimensions() == INPUT_SIZE {
        rgb
    } else {
        image::imageops::resize(&rgb, target_w, target_h, FilterType::Triangle)
    };

    let mut tensor = Array4::<f32>::zeros((1, target_h as usize, target_w as usize, 3));
    for (x, y, pixel) in resized.enumerate_pixels() {
        for c in 0..3 {
            tensor[[0, y as usize, x as usize, c]] = pixel[c] as f32 / 255.0;
        }
    }

    Ok(tensor)
}

/// Apply EXIF orientation to correct image rotation
fn apply_exif_orientation(data: &[u8], image: DynamicImage) -> DynamicImage {
    use std::io::Cursor;

    let orientation = match exif::Reader::new().read_from_container(&mut Cursor::new(data)) {
        Ok(exif_data) => exif_data
            .get_field(exif::Tag::Orientation, exif::In::PRIMARY)
            .and_then(|field| field.value.get_uint(0))
            .unwrap_or(1) as u8,
        Err(_) => 1,
    };

    // See: https://exiftool.org/TagNames/EXIF.html (Orientation)
    match orientation {
        1 => image,
        2 => image.fliph(),
        3 => image.rotate180(),
        4 => image.flipv(),
        5 => image.rotate90().fliph(),
        6 => image.rotate90(),
        7 => image.rotate270().fliph(),
        8 => image.rotate270(),
        _ => image,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};

    fn solid_image(width: u32, height: u32, value: u8) -> DynamicImage {
        DynamicImage::ImageRgb8(RgbImage::from_pixel(width, height, Rgb([value, value, value])))
    }

    #[test]
    fn test_preprocess_shape_and_range() {
        let image = solid_image(100, 100, 128);
        let tensor = preprocess(&image).unwrap();

        assert_eq!(tensor.shape(), &[1, 224, 224, 3]);
        for &v in tensor.iter() {
            assert!((0.0..=1.0).contains(&v));
            assert!((v - 128.0 / 255.0).abs() < 1e-6);
        }
    }

    #[test]
    fn test_preprocess_is_idempotent_on_conforming_input() {
        // An already 224x224 RGB image must map straight to pixel / 255
        // with no resampling drift.
        let mut raw = RgbImage::new(224, 224);
        for (x, y, pixel) in raw.enumerate_pixels_mut() {
            *pixel = Rgb([(x % 256) as u8, (y % 256) as u8, ((x + y) % 256) as u8]);
        }
        let image = DynamicImage::ImageRgb8(raw.clone());

        let first = preprocess(&image).unwrap();
        let second = preprocess(&image).unwrap();
        assert_eq!(first, second);

        for (x, y, pixel) in raw.enumerate_pixels() {
            for c in 0..3 {
                let expected = pixel[c] as f32 / 255.0;
                assert_eq!(first[[0, y as usize, x as usize, c]], expected);
            }
        }
    }

    #[test]
    fn test_preprocess_converts_grayscale_to_rgb() {
        let gray = DynamicImage::ImageLuma8(image::GrayImage::from_pixel(50, 80, image::Luma([200])));
        let tensor = preprocess(&gray).unwrap();
        assert_eq!(tensor.shape(), &[1, 224, 224, 3]);
    }

    #[test]
    fn test_preprocess_rejects_zero_sized_image() {
        let empty = DynamicImage::ImageRgb8(RgbImage::new(0, 0));
        let err = preprocess(&empty).unwrap_err();
        assert!(matches!(err, ClassifyError::UnsupportedImage { .. }));
    }

    #[test]
    fn test_decode_rejects_non_image_bytes() {
        let err = decode_image(b"definitely not an image").unwrap_err();
        assert!(matches!(err, ClassifyError::UnsupportedImage { .. }));
    }

    #[test]
    fn test_decode_round_trip() {
        let image = solid_image(32, 32, 64);
        let mut buffer = std::io::Cursor::new(Vec::new());
        image.write_to(&mut buffer, image::ImageFormat::Png).unwrap();

        let decoded = decode_image(&buffer.into_inner()).unwrap();
        assert_eq!(decoded.width(), 32);
        assert_eq!(decoded.height(), 32);
    }
}
