use axum::{
    body::Body,
    extract::{Multipart, Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use std::sync::Arc;
use tracing::{info, instrument};

use super::service::{PersonForm, PersonService, UploadedFile};
use super::types::{PersonDetailResponse, PersonListResponse, PersonRegisterResponse, SearchParams};
use crate::shared::{AppError, AppState};

const ALLOWED_PHOTO_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "webp"];

fn service(state: &AppState) -> PersonService {
    PersonService::new(
        Arc::clone(&state.person_repository),
        Arc::clone(&state.file_store),
    )
}

/// HTTP handler for registering a personnel record
///
/// POST /api/users/register
/// Multipart form: text fields plus optional `photo` and `cv` file parts.
#[instrument(name = "register_person", skip(state, multipart))]
pub async fn register_person(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<PersonRegisterResponse>), AppError> {
    info!("Registering new personnel record");

    let mut form = PersonForm::default();
    let mut photo: Option<UploadedFile> = None;
    let mut cv: Option<UploadedFile> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|_| AppError::Validation("Failed to read multipart data".to_string()))?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "photo" => {
                let filename = field.file_name().unwrap_or("photo").to_string();
                if !has_allowed_extension(&filename, ALLOWED_PHOTO_EXTENSIONS) {
                    return Err(AppError::Validation(
                        "Photo must be a jpg, jpeg, png, gif or webp file".to_string(),
                    ));
                }
                let bytes = read_file_field(field).await?;
                if !bytes.is_empty() {
                    photo = Some(UploadedFile { filename, bytes });
                }
            }
            "cv" => {
                let filename = field.file_name().unwrap_or("cv").to_string();
                let bytes = read_file_field(field).await?;
                if !bytes.is_empty() {
                    cv = Some(UploadedFile { filename, bytes });
                }
            }
            _ => {
                let value = field
                    .text()
                    .await
                    .map_err(|_| AppError::Validation("Failed to read multipart data".to_string()))?;
                match name.as_str() {
                    "name" => form.name = Some(value),
                    "passportNumber" => form.passport_number = Some(value),
                    "dateOfBirth" => form.date_of_birth = Some(value),
                    "designation" => form.designation = Some(value),
                    "ppType" => form.pp_type = Some(value),
                    "mobileNumber" => form.mobile_number = Some(value),
                    "villageTown" => form.village_town = Some(value),
                    "remark" => form.remark = Some(value),
                    _ => {} // unknown fields are ignored
                }
            }
        }
    }

    let person = service(&state).register(form, photo, cv).await?;

    info!(person_id = %person.id, name = %person.name, "Personnel record registered successfully");

    Ok((
        StatusCode::CREATED,
        Json(PersonRegisterResponse {
            message: "User registered successfully".to_string(),
            user: person,
        }),
    ))
}

/// HTTP handler for searching personnel records
///
/// GET /api/users/search?query=<q>  (protected)
#[instrument(name = "search_persons", skip(state))]
pub async fn search_persons(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<Json<PersonListResponse>, AppError> {
    let users = service(&state).search(params.query).await?;

    info!(count = users.len(), "Search completed");

    Ok(Json(PersonListResponse {
        count: users.len(),
        users,
    }))
}

/// HTTP handler listing all personnel records, newest first
///
/// GET /api/users  (protected)
#[instrument(name = "list_persons", skip(state))]
pub async fn list_persons(
    State(state): State<AppState>,
) -> Result<Json<PersonListResponse>, AppError> {
    let users = service(&state).list_all().await?;

    Ok(Json(PersonListResponse {
        count: users.len(),
        users,
    }))
}

/// HTTP handler for a single personnel record
///
/// GET /api/users/:id  (protected)
#[instrument(name = "get_person", skip(state))]
pub async fn get_person(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<PersonDetailResponse>, AppError> {
    let user = service(&state).get(&id).await?;

    Ok(Json(PersonDetailResponse { user }))
}

/// HTTP handler streaming a record's CV as a download
///
/// GET /api/users/:id/download-cv  (protected)
#[instrument(name = "download_cv", skip(state))]
pub async fn download_cv(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response, AppError> {
    let (filename, bytes) = service(&state).cv_attachment(&id).await?;

    info!(person_id = %id, filename = %filename, "Serving CV download");

    Ok((
        [
            (
                header::CONTENT_TYPE,
                "application/octet-stream".to_string(),
            ),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{filename}\""),
            ),
        ],
        Body::from(bytes),
    )
        .into_response())
}

/// HTTP handler serving a record's photo
///
/// GET /api/users/:id/photo  (public)
#[instrument(name = "get_photo", skip(state))]
pub async fn get_photo(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response, AppError> {
    let bytes = service(&state).photo_bytes(&id).await?;

    Ok((
        [
            (header::CONTENT_TYPE, "image/jpeg".to_string()),
            (
                header::CACHE_CONTROL,
                "public, max-age=3600".to_string(),
            ),
        ],
        Body::from(bytes),
    )
        .into_response())
}

fn has_allowed_extension(filename: &str, allowed: &[&str]) -> bool {
    std::path::Path::new(filename)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| allowed.contains(&e.to_lowercase().as_str()))
        .unwrap_or(false)
}

async fn read_file_field(field: axum::extract::multipart::Field<'_>) -> Result<Vec<u8>, AppError> {
    field
        .bytes()
        .await
        .map(|b| b.to_vec())
        .map_err(|_| AppError::Validation("Failed to read multipart data".to_string()))
}
