//! Still-image decoding with EXIF orientation handling.

use std::io::Cursor;

use exif::{In, Reader, Tag};
use image::{DynamicImage, ImageError, ImageFormat, ImageReader, Limits};
use tracing::debug;

use super::{DecodeError, Orientation, PixelBuffer};

/// Input formats the decoder accepts.
pub const SUPPORTED_INPUT_FORMATS: [ImageFormat; 5] = [
    ImageFormat::Png,
    ImageFormat::Jpeg,
    ImageFormat::WebP,
    ImageFormat::Gif,
    ImageFormat::Bmp,
];

/// Decode an image from bytes into an RGBA pixel buffer.
///
/// The format is sniffed from the leading magic bytes. When sniffing fails and
/// `mime_hint` names a supported format, that format is tried instead. EXIF
/// orientation is applied, so the returned dimensions are the natural,
/// displayed ones. Animated inputs decode to their first frame.
///
/// # Errors
///
/// * `DecodeError::UnsupportedFormat` if no supported format matches.
/// * `DecodeError::Corrupted` if the data is malformed or truncated.
/// * `DecodeError::EmptyImage` if the image reports a zero dimension.
pub fn decode(bytes: &[u8], mime_hint: Option<&str>) -> Result<PixelBuffer, DecodeError> {
    decode_with_limits(bytes, mime_hint, None)
}

/// Decode like [`decode`], refusing images wider or taller than `max_dimension`
/// before their pixels are allocated.
pub fn decode_with_limits(
    bytes: &[u8],
    mime_hint: Option<&str>,
    max_dimension: Option<u32>,
) -> Result<PixelBuffer, DecodeError> {
    let mut reader = open_reader(bytes, mime_hint)?;

    let mut limits = Limits::default();
    limits.max_image_width = max_dimension;
    limits.max_image_height = max_dimension;
    reader.limits(limits);

    let img = reader.decode().map_err(map_image_error)?;
    if img.width() == 0 || img.height() == 0 {
        return Err(DecodeError::EmptyImage);
    }

    let orientation = extract_orientation(bytes);
    let oriented = apply_orientation(img, orientation);
    let buffer = PixelBuffer::from_rgba_image(oriented.into_rgba8());

    debug!(
        width = buffer.width,
        height = buffer.height,
        ?orientation,
        "decoded input image"
    );
    Ok(buffer)
}

/// Read the natural (oriented) dimensions of an image without decoding pixels.
pub fn probe_dimensions(bytes: &[u8], mime_hint: Option<&str>) -> Result<(u32, u32), DecodeError> {
    let reader = open_reader(bytes, mime_hint)?;
    let (width, height) = reader.into_dimensions().map_err(map_image_error)?;
    if width == 0 || height == 0 {
        return Err(DecodeError::EmptyImage);
    }

    if extract_orientation(bytes).swaps_dimensions() {
        Ok((height, width))
    } else {
        Ok((width, height))
    }
}

/// Extract the EXIF orientation value from image bytes.
///
/// Returns `Orientation::Normal` when there is no EXIF data.
pub fn get_orientation(bytes: &[u8]) -> Orientation {
    extract_orientation(bytes)
}

fn open_reader<'a>(
    bytes: &'a [u8],
    mime_hint: Option<&str>,
) -> Result<ImageReader<Cursor<&'a [u8]>>, DecodeError> {
    let mut reader = ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| DecodeError::Corrupted(e.to_string()))?;

    if reader.format().is_none() {
        match mime_hint.and_then(ImageFormat::from_mime_type) {
            Some(format) => reader.set_format(format),
            None => return Err(DecodeError::UnsupportedFormat),
        }
    }

    match reader.format() {
        Some(format) if SUPPORTED_INPUT_FORMATS.contains(&format) => Ok(reader),
        _ => Err(DecodeError::UnsupportedFormat),
    }
}

fn map_image_error(err: ImageError) -> DecodeError {
    match err {
        ImageError::Unsupported(_) => DecodeError::UnsupportedFormat,
        ImageError::Limits(e) => DecodeError::LimitsExceeded(e.to_string()),
        other => DecodeError::Corrupted(other.to_string()),
    }
}

fn extract_orientation(bytes: &[u8]) -> Orientation {
    let mut cursor = Cursor::new(bytes);

    match Reader::new().read_from_container(&mut cursor) {
        Ok(exif) => exif
            .get_field(Tag::Orientation, In::PRIMARY)
            .and_then(|field| field.value.get_uint(0))
            .map(Orientation::from)
            .unwrap_or_default(),
        Err(_) => Orientation::Normal,
    }
}

fn apply_orientation(img: DynamicImage, orientation: Orientation) -> DynamicImage {
    match orientation {
        Orientation::Normal => img,
        Orientation::FlipHorizontal => img.fliph(),
        Orientation::Rotate180 => img.rotate180(),
        Orientation::FlipVertical => img.flipv(),
        Orientation::Transpose => img.rotate90().fliph(),
        Orientation::Rotate90CW => img.rotate90(),
        Orientation::Transverse => img.rotate270().fliph(),
        Orientation::Rotate270CW => img.rotate270(),
    }
}
