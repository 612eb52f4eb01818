//! Image API routes: upload, list, serve, group, delete.
//!
//! Handlers translate the coordinator's typed errors into HTTP statuses;
//! all error bodies are `{"error": "..."}` with the underlying cause in
//! the message.

use axum::{
    body::Body,
    extract::{Multipart, Path, Query, State},
    http::{header, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use bytes::Bytes;
use galleria_common::media::content_type_for_key;
use galleria_db::models::ImageRecord;
use galleria_db::pool::get_conn;
use galleria_db::queries::images;
use serde::{Deserialize, Serialize};

use super::AppContext;
use crate::gallery::{DeleteError, UploadError};
use crate::store::StoreError;

/// Create image-related routes.
pub fn image_routes() -> Router<AppContext> {
    Router::new()
        .route("/upload", post(upload_image))
        .route("/images", get(list_images))
        .route("/images/:key", get(serve_image).delete(delete_image))
        .route("/categories", get(list_categories))
}

// ============================================================================
// Request/response types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct ListImagesQuery {
    /// Restrict the listing to one category.
    pub category: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub id: i64,
    /// Object-store key the image was stored under.
    pub filename: String,
    /// Backend-reported location of the stored object.
    pub path: String,
}

#[derive(Debug, Serialize)]
pub struct ImageResponse {
    pub id: i64,
    pub image_name: String,
    pub category: String,
    pub url: String,
}

impl From<ImageRecord> for ImageResponse {
    fn from(record: ImageRecord) -> Self {
        let url = image_url(&record.image_name);
        Self {
            id: record.id,
            image_name: record.image_name,
            category: record.category,
            url,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CategoryResponse {
    pub category: String,
    pub images: Vec<CategoryImage>,
}

#[derive(Debug, Serialize)]
pub struct CategoryImage {
    pub id: i64,
    pub name: String,
    pub url: String,
}

fn image_url(image_name: &str) -> String {
    format!("/api/images/{image_name}")
}

fn error_body(message: impl std::fmt::Display) -> Json<serde_json::Value> {
    Json(serde_json::json!({ "error": message.to_string() }))
}

// ============================================================================
// Handlers
// ============================================================================

/// Upload an image with a category label.
///
/// Expects a multipart form with an `image` file field and a `category`
/// text field. A missing category uploads as an empty-string category;
/// a missing or empty file fails with 400.
async fn upload_image(
    State(ctx): State<AppContext>,
    mut multipart: Multipart,
) -> impl IntoResponse {
    let mut data = Bytes::new();
    let mut filename = String::from("upload");
    let mut category = String::new();

    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => break,
            Err(e) => {
                return (
                    StatusCode::BAD_REQUEST,
                    error_body(format!("Malformed multipart body: {e}")),
                )
                    .into_response()
            }
        };

        // Copy the name out before consuming the field body.
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("image") => {
                if let Some(original) = field.file_name() {
                    filename = original.to_string();
                }
                data = match field.bytes().await {
                    Ok(bytes) => bytes,
                    Err(e) => {
                        return (
                            StatusCode::BAD_REQUEST,
                            error_body(format!("Failed to read image field: {e}")),
                        )
                            .into_response()
                    }
                };
            }
            Some("category") => {
                category = match field.text().await {
                    Ok(text) => text,
                    Err(e) => {
                        return (
                            StatusCode::BAD_REQUEST,
                            error_body(format!("Failed to read category field: {e}")),
                        )
                            .into_response()
                    }
                };
            }
            _ => {}
        }
    }

    match ctx.gallery.upload(data, &filename, &category).await {
        Ok(receipt) => Json(UploadResponse {
            id: receipt.id,
            filename: receipt.stored_key,
            path: receipt.location,
        })
        .into_response(),
        Err(e @ UploadError::NoFile) => {
            (StatusCode::BAD_REQUEST, error_body(e)).into_response()
        }
        Err(e) => (StatusCode::INTERNAL_SERVER_ERROR, error_body(e)).into_response(),
    }
}

/// List all images, optionally filtered to one category.
async fn list_images(
    State(ctx): State<AppContext>,
    Query(query): Query<ListImagesQuery>,
) -> impl IntoResponse {
    let conn = match get_conn(&ctx.db_pool) {
        Ok(conn) => conn,
        Err(e) => return (StatusCode::INTERNAL_SERVER_ERROR, error_body(e)).into_response(),
    };

    let records = match query.category.as_deref() {
        Some(category) => images::list_by_category(&conn, category),
        None => images::list_images(&conn),
    };

    match records {
        Ok(records) => {
            let list: Vec<ImageResponse> = records.into_iter().map(ImageResponse::from).collect();
            Json(list).into_response()
        }
        Err(e) => (StatusCode::INTERNAL_SERVER_ERROR, error_body(e)).into_response(),
    }
}

/// Stream an image by its object-store key.
async fn serve_image(State(ctx): State<AppContext>, Path(key): Path<String>) -> impl IntoResponse {
    match ctx.store.get(&key).await {
        Ok(stream) => {
            let body = Body::from_stream(stream);
            (
                StatusCode::OK,
                [
                    (header::CONTENT_TYPE, content_type_for_key(&key)),
                    // Keys are immutable once stored, so responses can be
                    // cached indefinitely.
                    (header::CACHE_CONTROL, "public, max-age=31536000, immutable"),
                ],
                body,
            )
                .into_response()
        }
        Err(StoreError::NotFound(_)) | Err(StoreError::InvalidKey(_)) => {
            (StatusCode::NOT_FOUND, error_body("Image not found")).into_response()
        }
        Err(e) => (StatusCode::INTERNAL_SERVER_ERROR, error_body(e)).into_response(),
    }
}

/// Delete an image by its metadata row id.
async fn delete_image(State(ctx): State<AppContext>, Path(key): Path<String>) -> impl IntoResponse {
    let id: i64 = match key.parse() {
        Ok(id) => id,
        Err(_) => {
            return (StatusCode::BAD_REQUEST, error_body("Invalid image ID")).into_response()
        }
    };

    match ctx.gallery.delete(id).await {
        Ok(()) => Json(serde_json::json!({ "message": "Image deleted successfully" }))
            .into_response(),
        Err(e @ DeleteError::NotFound(_)) => {
            (StatusCode::NOT_FOUND, error_body(e)).into_response()
        }
        Err(e) => (StatusCode::INTERNAL_SERVER_ERROR, error_body(e)).into_response(),
    }
}

/// List all images grouped by category.
async fn list_categories(State(ctx): State<AppContext>) -> impl IntoResponse {
    let conn = match get_conn(&ctx.db_pool) {
        Ok(conn) => conn,
        Err(e) => return (StatusCode::INTERNAL_SERVER_ERROR, error_body(e)).into_response(),
    };

    match images::list_grouped(&conn) {
        Ok(groups) => {
            let list: Vec<CategoryResponse> = groups
                .into_iter()
                .map(|(category, records)| CategoryResponse {
                    category,
                    images: records
                        .into_iter()
                        .map(|r| CategoryImage {
                            id: r.id,
                            url: image_url(&r.image_name),
                            name: r.image_name,
                        })
                        .collect(),
                })
                .collect();
            Json(list).into_response()
        }
        Err(e) => (StatusCode::INTERNAL_SERVER_ERROR, error_body(e)).into_response(),
    }
}
