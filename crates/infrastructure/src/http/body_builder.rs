//! Multipart form builder.
//!
//! Converts planned multipart parts into a `reqwest` form. reqwest sets the
//! `multipart/form-data` content type with its boundary.

use graphit_application::ports::{HttpClientError, MultipartPart, PartContent};
use reqwest::multipart::{Form, Part};

/// Builds a multipart form from planned parts, keeping their order.
///
/// File parts get a MIME type guessed from the file name.
///
/// # Errors
///
/// Returns an error if a guessed MIME type is rejected.
pub fn build_form(parts: &[MultipartPart]) -> Result<Form, HttpClientError> {
    let mut form = Form::new();

    for part in parts {
        match &part.content {
            PartContent::Text(value) => {
                form = form.text(part.name.clone(), value.clone());
            }
            PartContent::File { file_name, file } => {
                let mime_type = mime_guess::from_path(file_name)
                    .first_or_octet_stream()
                    .to_string();

                let file_part = Part::bytes(file.bytes().to_vec())
                    .file_name(file_name.clone())
                    .mime_str(&mime_type)
                    .map_err(|e| HttpClientError::Body(format!("Invalid MIME type: {e}")))?;

                form = form.part(part.name.clone(), file_part);
            }
        }
    }

    Ok(form)
}
