use axum_test::multipart::{MultipartForm, Part};
use bytes::Bytes;

/// A few bytes with a PNG signature; the stubs never decode it.
pub fn png_bytes() -> Bytes {
    Bytes::from_static(b"\x89PNG\r\n\x1a\nfake image body")
}

pub fn pdf_bytes(size: usize) -> Bytes {
    let mut data = b"%PDF-1.4\n".to_vec();
    data.resize(size.max(data.len()), b' ');
    Bytes::from(data)
}

pub fn image_part(filename: &str) -> Part {
    Part::bytes(png_bytes())
        .file_name(filename.to_string())
        .mime_type("image/png")
}

pub fn image_form(filename: &str) -> MultipartForm {
    MultipartForm::new().add_part("image", image_part(filename))
}

pub fn object_form(filename: &str, object: &str) -> MultipartForm {
    MultipartForm::new()
        .add_part("image", image_part(filename))
        .add_text("object", object.to_string())
}

pub fn resume_form(size: usize) -> MultipartForm {
    MultipartForm::new().add_part(
        "resume",
        Part::bytes(pdf_bytes(size))
            .file_name("resume.pdf")
            .mime_type("application/pdf"),
    )
}
