//! Test fixtures for generating upload payloads.

use axum::body::Body;
use axum::http::Request;
use bytes::Bytes;
use std::io::Cursor;

/// Minimal MP4 header: an `ftyp` box with the `mp42` brand.
pub const MP4_HEADER: &[u8] = b"\0\0\0\x18ftypmp42\0\0\0\0mp42isom";

/// Encode a solid-color PNG.
pub fn png_bytes(width: u32, height: u32) -> Bytes {
    let img = image::RgbaImage::from_pixel(width, height, image::Rgba([30, 120, 200, 255]));
    let mut out = Cursor::new(Vec::new());
    img.write_to(&mut out, image::ImageFormat::Png)
        .expect("Failed to encode PNG");
    Bytes::from(out.into_inner())
}

/// Bytes that sniff as PNG but cannot be decoded.
#[allow(dead_code)]
pub fn corrupt_png() -> Bytes {
    let mut data = b"\x89PNG\r\n\x1a\n".to_vec();
    data.extend(std::iter::repeat_n(0xAB, 256));
    Bytes::from(data)
}

/// Bytes that sniff as MP4 video.
#[allow(dead_code)]
pub fn mp4_bytes() -> Bytes {
    let mut data = MP4_HEADER.to_vec();
    data.extend(std::iter::repeat_n(0u8, 512));
    Bytes::from(data)
}

/// Hand-built `multipart/form-data` body.
/// Note: #[allow(dead_code)] because each test file compiles common/ separately.
#[allow(dead_code)]
pub struct MultipartForm {
    boundary: String,
    body: Vec<u8>,
}

#[allow(dead_code)]
impl MultipartForm {
    pub fn new() -> Self {
        Self {
            boundary: "gallery-test-boundary-7f3a".to_string(),
            body: Vec::new(),
        }
    }

    /// The usual upload form: title, user_id and a file part.
    pub fn artwork(title: &str, user_id: i64, file_name: &str, data: &[u8]) -> Self {
        Self::new()
            .text("title", title)
            .text("user_id", &user_id.to_string())
            .file("file", file_name, "application/octet-stream", data)
    }

    pub fn text(mut self, name: &str, value: &str) -> Self {
        self.body.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"{}\"\r\n\r\n{}\r\n",
                self.boundary, name, value
            )
            .as_bytes(),
        );
        self
    }

    pub fn file(mut self, name: &str, file_name: &str, content_type: &str, data: &[u8]) -> Self {
        self.body.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\nContent-Type: {}\r\n\r\n",
                self.boundary, name, file_name, content_type
            )
            .as_bytes(),
        );
        self.body.extend_from_slice(data);
        self.body.extend_from_slice(b"\r\n");
        self
    }

    pub fn into_request(mut self, uri: &str) -> Request<Body> {
        self.body
            .extend_from_slice(format!("--{}--\r\n", self.boundary).as_bytes());
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(
                "Content-Type",
                format!("multipart/form-data; boundary={}", self.boundary),
            )
            .body(Body::from(self.body))
            .expect("Failed to build multipart request")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn png_fixture_sniffs_as_image() {
        let sniffed = gallery_core::mime::classify(&png_bytes(4, 4)).unwrap();
        assert_eq!(sniffed.mime_type(), "image/png");
    }
}
