use crate::error::AppError;
use base64::Engine;
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::ImageReader;
use std::io::{Cursor, Read};
use std::path::Path;

const PREVIEW_SIZE: u32 = 1024;
const PREVIEW_QUALITY: u8 = 75;

/// Render the selected image as a base64 data URL for the preview pane.
/// Downscales before encoding so a multi-hundred-megabyte TIFF never crosses
/// the IPC boundary. Respects EXIF orientation.
pub fn generate_preview(path: &Path) -> Result<String, AppError> {
    let img = ImageReader::open(path)
        .map_err(|e| AppError::Read(format!("Error reading image file: {}", e)))?
        .with_guessed_format()
        .map_err(|e| AppError::Read(format!("Error reading image file: {}", e)))?
        .decode()
        .map_err(|e| AppError::Read(format!("Error reading image file: {}", e)))?;

    let mut img = if img.width() > PREVIEW_SIZE || img.height() > PREVIEW_SIZE {
        img.resize(PREVIEW_SIZE, PREVIEW_SIZE, FilterType::Triangle)
    } else {
        img
    };

    let orientation = read_orientation(path);
    if orientation != 1 {
        img = apply_orientation(img, orientation);
    }

    let mut buffer = Cursor::new(Vec::new());
    let encoder = JpegEncoder::new_with_quality(&mut buffer, PREVIEW_QUALITY);
    img.to_rgb8()
        .write_with_encoder(encoder)
        .map_err(|e| AppError::Read(format!("Error reading image file: {}", e)))?;

    let b64 = base64::engine::general_purpose::STANDARD.encode(buffer.into_inner());
    Ok(format!("data:image/jpeg;base64,{}", b64))
}

/// EXIF orientation from the file header, defaulting to 1 (no rotation).
fn read_orientation(path: &Path) -> u32 {
    let file = match std::fs::File::open(path) {
        Ok(f) => f,
        Err(_) => return 1,
    };

    // The first 128KB covers EXIF headers in practice.
    let mut header_buf = Vec::with_capacity(128 * 1024);
    if file.take(128 * 1024).read_to_end(&mut header_buf).is_err() {
        return 1;
    }

    let exif = match exif::Reader::new().read_from_container(&mut Cursor::new(&header_buf)) {
        Ok(e) => e,
        Err(_) => return 1,
    };

    match exif.get_field(exif::Tag::Orientation, exif::In::PRIMARY) {
        Some(field) => match field.value {
            exif::Value::Short(ref v) => *v.first().unwrap_or(&1) as u32,
            exif::Value::Long(ref v) => *v.first().unwrap_or(&1),
            _ => 1,
        },
        None => 1,
    }
}

fn apply_orientation(img: image::DynamicImage, orientation: u32) -> image::DynamicImage {
    match orientation {
        2 => img.fliph(),
        3 => img.rotate180(),
        4 => img.flipv(),
        5 => img.fliph().rotate90(),
        6 => img.rotate90(),
        7 => img.fliph().rotate270(),
        8 => img.rotate270(),
        _ => img,
    }
}
