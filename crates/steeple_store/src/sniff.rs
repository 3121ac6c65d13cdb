use bytes::Bytes;

/// Container formats the default decoder recognizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    Png,
    Jpeg,
    Gif,
    WebP,
    Bmp,
}

/// A decoded image: the original bytes plus the recognized format.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Image {
    pub bytes: Bytes,
    pub format: ImageFormat,
}

/// Collaborator seam turning downloaded bytes into a displayable image.
/// Returning `None` marks the bytes as undecodable; the store treats that
/// the same as a failed download.
pub trait ImageDecoder: Send + Sync {
    fn decode(&self, bytes: &[u8]) -> Option<Image>;
}

/// Default decoder: validates the container magic number and hands the
/// bytes through. Rendering toolkits supply their own decoder when a pixel
/// buffer is needed.
#[derive(Debug, Default, Clone, Copy)]
pub struct SniffingDecoder;

impl ImageDecoder for SniffingDecoder {
    fn decode(&self, bytes: &[u8]) -> Option<Image> {
        let format = sniff_format(bytes)?;
        Some(Image {
            bytes: Bytes::copy_from_slice(bytes),
            format,
        })
    }
}

fn sniff_format(bytes: &[u8]) -> Option<ImageFormat> {
    if bytes.starts_with(b"\x89PNG\r\n\x1a\n") {
        return Some(ImageFormat::Png);
    }
    if bytes.starts_with(&[0xFF, 0xD8, 0xFF]) {
        return Some(ImageFormat::Jpeg);
    }
    if bytes.starts_with(b"GIF87a") || bytes.starts_with(b"GIF89a") {
        return Some(ImageFormat::Gif);
    }
    if bytes.len() >= 12 && bytes.starts_with(b"RIFF") && &bytes[8..12] == b"WEBP" {
        return Some(ImageFormat::WebP);
    }
    if bytes.starts_with(b"BM") {
        return Some(ImageFormat::Bmp);
    }
    None
}
