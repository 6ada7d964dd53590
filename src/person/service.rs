use chrono::NaiveDate;
use std::path::Path;
use std::sync::Arc;
use tracing::{info, instrument, warn};

use super::models::{NewPerson, PersonModel};
use super::repository::PersonRepository;
use crate::shared::AppError;
use crate::storage::FileStore;

/// Raw multipart text fields for a registration, unvalidated
#[derive(Debug, Default)]
pub struct PersonForm {
    pub name: Option<String>,
    pub passport_number: Option<String>,
    pub date_of_birth: Option<String>,
    pub designation: Option<String>,
    pub pp_type: Option<String>,
    pub mobile_number: Option<String>,
    pub village_town: Option<String>,
    pub remark: Option<String>,
}

/// An uploaded file part: original filename plus content
#[derive(Debug)]
pub struct UploadedFile {
    pub filename: String,
    pub bytes: Vec<u8>,
}

/// Service for personnel-record business logic
pub struct PersonService {
    repository: Arc<dyn PersonRepository + Send + Sync>,
    file_store: Arc<FileStore>,
}

impl PersonService {
    pub fn new(
        repository: Arc<dyn PersonRepository + Send + Sync>,
        file_store: Arc<FileStore>,
    ) -> Self {
        Self {
            repository,
            file_store,
        }
    }

    /// Registers a personnel record, storing any uploaded photo/CV through
    /// the blob store. Files are only written once the fields validate.
    #[instrument(skip(self, form, photo, cv))]
    pub async fn register(
        &self,
        form: PersonForm,
        photo: Option<UploadedFile>,
        cv: Option<UploadedFile>,
    ) -> Result<PersonModel, AppError> {
        let (name, passport_number, date_of_birth, designation, pp_type, mobile_number, village_town) =
            match (
                non_empty(form.name),
                non_empty(form.passport_number),
                non_empty(form.date_of_birth),
                non_empty(form.designation),
                non_empty(form.pp_type),
                non_empty(form.mobile_number),
                non_empty(form.village_town),
            ) {
                (Some(n), Some(p), Some(d), Some(de), Some(pp), Some(m), Some(v)) => {
                    (n, p, d, de, pp, m, v)
                }
                _ => {
                    return Err(AppError::Validation(
                        "All required fields must be filled".to_string(),
                    ));
                }
            };

        let date_of_birth = NaiveDate::parse_from_str(&date_of_birth, "%Y-%m-%d")
            .map_err(|_| AppError::Validation("Invalid date of birth".to_string()))?;

        let photo_name = match photo {
            Some(file) => Some(self.file_store.save(&file.filename, &file.bytes).await?),
            None => None,
        };
        let cv_name = match cv {
            Some(file) => Some(self.file_store.save(&file.filename, &file.bytes).await?),
            None => None,
        };

        let person = PersonModel::new(NewPerson {
            name,
            passport_number,
            date_of_birth,
            designation,
            pp_type,
            mobile_number,
            village_town,
            photo: photo_name,
            cv: cv_name,
            remark: form.remark.unwrap_or_default(),
        });

        self.repository.insert(&person).await?;

        info!(person_id = %person.id, name = %person.name, "Personnel record registered");
        Ok(person)
    }

    #[instrument(skip(self))]
    pub async fn search(&self, query: Option<String>) -> Result<Vec<PersonModel>, AppError> {
        let query = match non_empty(query) {
            Some(q) => q,
            None => {
                return Err(AppError::Validation("Search query is required".to_string()));
            }
        };

        self.repository.search(&query).await
    }

    #[instrument(skip(self))]
    pub async fn list_all(&self) -> Result<Vec<PersonModel>, AppError> {
        self.repository.list_all().await
    }

    #[instrument(skip(self))]
    pub async fn get(&self, id: &str) -> Result<PersonModel, AppError> {
        self.repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))
    }

    /// Fetches a record's CV content plus the download filename
    /// `{name}-CV{ext}`.
    #[instrument(skip(self))]
    pub async fn cv_attachment(&self, id: &str) -> Result<(String, Vec<u8>), AppError> {
        let person = self.get(id).await?;
        let stored = person
            .cv
            .ok_or_else(|| AppError::NotFound("CV not found".to_string()))?;

        let bytes = self.file_store.read(&stored).await.map_err(|e| {
            warn!(person_id = %id, "CV file missing from store");
            e
        })?;

        let extension = Path::new(&stored)
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| format!(".{e}"))
            .unwrap_or_default();
        Ok((format!("{}-CV{}", person.name, extension), bytes))
    }

    /// Fetches a record's photo content
    #[instrument(skip(self))]
    pub async fn photo_bytes(&self, id: &str) -> Result<Vec<u8>, AppError> {
        let person = self.get(id).await?;
        let stored = person
            .photo
            .ok_or_else(|| AppError::NotFound("Photo not found".to_string()))?;

        self.file_store.read(&stored).await
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
