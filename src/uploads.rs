/// Multipart upload helpers and static file serving
///
/// Images are buffered to the local upload directory as part of request
/// handling and referenced by `/uploads/<name>` paths in event and
/// organization records. Only a file-extension allowlist is enforced.
use std::path::Path;

use actix_multipart::Field;
use actix_web::{web, HttpResponse};
use chrono::Utc;
use futures_util::StreamExt;
use tokio::io::AsyncWriteExt;

use crate::config::Config;
use crate::error::{ApiError, Result};
use crate::validators;

/// Drain a multipart text field into a string
pub async fn read_text_field(field: &mut Field) -> Result<String> {
    let mut data = Vec::new();
    while let Some(chunk) = field.next().await {
        let bytes =
            chunk.map_err(|e| ApiError::BadRequest(format!("Malformed form field: {e}")))?;
        data.extend_from_slice(&bytes);
    }

    Ok(String::from_utf8_lossy(&data).into_owned())
}

/// Persist an uploaded image under the upload directory and return the
/// `/uploads/<name>` path to store on the record. Filenames are
/// timestamp-prefixed with whitespace collapsed to dashes.
pub async fn save_image_field(field: &mut Field, upload_dir: &str) -> Result<String> {
    let filename = field
        .content_disposition()
        .and_then(|cd| cd.get_filename())
        .map(str::to_string)
        .ok_or_else(|| ApiError::BadRequest("Uploaded file is missing a filename".to_string()))?;

    if validators::allowed_image_extension(&filename).is_none() {
        return Err(ApiError::BadRequest(
            "Only images are allowed (.jpg, .jpeg, .png, .webp)".to_string(),
        ));
    }

    let sanitized: String = filename
        .chars()
        .map(|c| if c.is_whitespace() || c == '/' || c == '\\' { '-' } else { c })
        .collect();
    let stored_name = format!("{}-{}", Utc::now().timestamp_millis(), sanitized);
    let dest = Path::new(upload_dir).join(&stored_name);

    let mut file = tokio::fs::File::create(&dest).await?;
    while let Some(chunk) = field.next().await {
        let bytes =
            chunk.map_err(|e| ApiError::BadRequest(format!("Malformed file upload: {e}")))?;
        file.write_all(&bytes).await?;
    }
    file.flush().await?;

    Ok(format!("/uploads/{stored_name}"))
}

/// GET /uploads/{filename}
pub async fn serve_upload(
    config: web::Data<Config>,
    path: web::Path<String>,
) -> Result<HttpResponse> {
    let filename = path.into_inner();

    // The route only matches a single segment, but stay paranoid about
    // anything that could escape the upload directory.
    if filename.contains("..") || filename.contains('/') || filename.contains('\\') {
        return Err(ApiError::NotFound("File".to_string()));
    }

    let full_path = Path::new(&config.upload_dir).join(&filename);
    let bytes = tokio::fs::read(&full_path)
        .await
        .map_err(|_| ApiError::NotFound("File".to_string()))?;

    let content_type = match filename.rsplit_once('.').map(|(_, ext)| ext.to_lowercase()) {
        Some(ext) if ext == "jpg" || ext == "jpeg" => "image/jpeg",
        Some(ext) if ext == "png" => "image/png",
        Some(ext) if ext == "webp" => "image/webp",
        _ => "application/octet-stream",
    };

    Ok(HttpResponse::Ok().content_type(content_type).body(bytes))
}
