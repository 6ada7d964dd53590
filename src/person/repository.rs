use async_trait::async_trait;
use sqlx::PgPool;
use std::collections::HashMap;
use std::sync::Mutex;
use tracing::{debug, instrument, warn};

use super::models::PersonModel;
use crate::shared::AppError;

/// Trait for personnel-record storage
#[async_trait]
pub trait PersonRepository {
    /// Persists a new record. Passport-number uniqueness is enforced
    /// atomically by the store; a violation fails with `DuplicateRecord`.
    async fn insert(&self, person: &PersonModel) -> Result<(), AppError>;

    async fn find_by_id(&self, id: &str) -> Result<Option<PersonModel>, AppError>;

    /// Case-insensitive substring search over name and mobile number
    async fn search(&self, query: &str) -> Result<Vec<PersonModel>, AppError>;

    /// All records, newest first
    async fn list_all(&self) -> Result<Vec<PersonModel>, AppError>;
}

/// In-memory implementation of PersonRepository for development and testing
pub struct InMemoryPersonRepository {
    persons: Mutex<HashMap<String, PersonModel>>,
}

impl Default for InMemoryPersonRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryPersonRepository {
    /// Creates a new empty in-memory repository
    pub fn new() -> Self {
        Self {
            persons: Mutex::new(HashMap::new()),
        }
    }

    /// Returns the current number of records in the repository
    pub fn person_count(&self) -> usize {
        self.persons.lock().unwrap().len()
    }
}

#[async_trait]
impl PersonRepository for InMemoryPersonRepository {
    #[instrument(skip(self, person))]
    async fn insert(&self, person: &PersonModel) -> Result<(), AppError> {
        debug!(name = %person.name, "Creating personnel record in memory");

        let mut persons = self.persons.lock().unwrap();
        let taken = persons
            .values()
            .any(|p| p.passport_number == person.passport_number);
        if taken {
            warn!(passport_number = %person.passport_number, "Passport number already taken");
            return Err(AppError::DuplicateRecord);
        }
        persons.insert(person.id.clone(), person.clone());

        debug!(person_id = %person.id, "Personnel record created successfully in memory");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn find_by_id(&self, id: &str) -> Result<Option<PersonModel>, AppError> {
        let persons = self.persons.lock().unwrap();
        Ok(persons.get(id).cloned())
    }

    #[instrument(skip(self))]
    async fn search(&self, query: &str) -> Result<Vec<PersonModel>, AppError> {
        let needle = query.to_lowercase();
        let persons = self.persons.lock().unwrap();

        let mut matches: Vec<PersonModel> = persons
            .values()
            .filter(|p| {
                p.name.to_lowercase().contains(&needle)
                    || p.mobile_number.to_lowercase().contains(&needle)
            })
            .cloned()
            .collect();
        matches.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        debug!(query = %query, matched = matches.len(), "Search completed in memory");
        Ok(matches)
    }

    #[instrument(skip(self))]
    async fn list_all(&self) -> Result<Vec<PersonModel>, AppError> {
        let persons = self.persons.lock().unwrap();

        let mut all: Vec<PersonModel> = persons.values().cloned().collect();
        all.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(all)
    }
}

/// PostgreSQL implementation of the personnel-record repository.
///
/// Expects a unique index on `persons.passport_number`.
pub struct PostgresPersonRepository {
    pool: PgPool,
}

impl PostgresPersonRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

const PERSON_COLUMNS: &str = "id, name, passport_number, date_of_birth, designation, pp_type, \
     mobile_number, village_town, photo, cv, remark, created_at";

#[async_trait]
impl PersonRepository for PostgresPersonRepository {
    #[instrument(skip(self, person))]
    async fn insert(&self, person: &PersonModel) -> Result<(), AppError> {
        debug!(name = %person.name, "Creating personnel record in database");

        sqlx::query(
            "INSERT INTO persons (id, name, passport_number, date_of_birth, designation, pp_type, \
             mobile_number, village_town, photo, cv, remark, created_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)",
        )
        .bind(&person.id)
        .bind(&person.name)
        .bind(&person.passport_number)
        .bind(person.date_of_birth)
        .bind(&person.designation)
        .bind(&person.pp_type)
        .bind(&person.mobile_number)
        .bind(&person.village_town)
        .bind(&person.photo)
        .bind(&person.cv)
        .bind(&person.remark)
        .bind(person.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            warn!(error = %e, "Failed to create personnel record in database");
            match &e {
                sqlx::Error::Database(db)
                    if matches!(db.kind(), sqlx::error::ErrorKind::UniqueViolation) =>
                {
                    AppError::DuplicateRecord
                }
                _ => AppError::Database(e.to_string()),
            }
        })?;

        debug!(person_id = %person.id, "Personnel record created successfully in database");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn find_by_id(&self, id: &str) -> Result<Option<PersonModel>, AppError> {
        sqlx::query_as::<_, PersonModel>(&format!(
            "SELECT {PERSON_COLUMNS} FROM persons WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            warn!(error = %e, "Failed to fetch personnel record from database");
            AppError::Database(e.to_string())
        })
    }

    #[instrument(skip(self))]
    async fn search(&self, query: &str) -> Result<Vec<PersonModel>, AppError> {
        let pattern = format!("%{query}%");

        sqlx::query_as::<_, PersonModel>(&format!(
            "SELECT {PERSON_COLUMNS} FROM persons \
             WHERE name ILIKE $1 OR mobile_number ILIKE $1 \
             ORDER BY created_at DESC"
        ))
        .bind(&pattern)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            warn!(error = %e, "Failed to search personnel records");
            AppError::Database(e.to_string())
        })
    }

    #[instrument(skip(self))]
    async fn list_all(&self) -> Result<Vec<PersonModel>, AppError> {
        sqlx::query_as::<_, PersonModel>(&format!(
            "SELECT {PERSON_COLUMNS} FROM persons ORDER BY created_at DESC"
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            warn!(error = %e, "Failed to list personnel records");
            AppError::Database(e.to_string())
        })
    }
}

#[cfg(test)]
pub mod tests {
    use super::*;
    use crate::person::models::NewPerson;
    use chrono::NaiveDate;

    /// Test helper functions for creating test data
    mod helpers {
        use super::*;

        pub fn create_test_person(name: &str, passport: &str, mobile: &str) -> PersonModel {
            PersonModel::new(NewPerson {
                name: name.to_string(),
                passport_number: passport.to_string(),
                date_of_birth: NaiveDate::from_ymd_opt(1990, 5, 17).unwrap(),
                designation: "Officer".to_string(),
                pp_type: "Ordinary".to_string(),
                mobile_number: mobile.to_string(),
                village_town: "Dhaka".to_string(),
                photo: None,
                cv: None,
                remark: String::new(),
            })
        }
    }

    use helpers::*;

    #[tokio::test]
    async fn test_insert_and_find_by_id() {
        let repo = InMemoryPersonRepository::new();
        let person = create_test_person("John Doe", "AB1234567", "01711111111");

        repo.insert(&person).await.unwrap();

        let found = repo.find_by_id(&person.id).await.unwrap();
        assert_eq!(found, Some(person));
    }

    #[tokio::test]
    async fn test_find_nonexistent_person() {
        let repo = InMemoryPersonRepository::new();

        let result = repo.find_by_id("nonexistent-id").await.unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_duplicate_passport_number_rejected() {
        let repo = InMemoryPersonRepository::new();
        repo.insert(&create_test_person("John Doe", "AB1234567", "01711111111"))
            .await
            .unwrap();

        let result = repo
            .insert(&create_test_person("Jane Doe", "AB1234567", "01722222222"))
            .await;
        assert!(matches!(result, Err(AppError::DuplicateRecord)));
        assert_eq!(repo.person_count(), 1);
    }

    #[tokio::test]
    async fn test_search_matches_name_case_insensitively() {
        let repo = InMemoryPersonRepository::new();
        repo.insert(&create_test_person("John Doe", "AB1234567", "01711111111"))
            .await
            .unwrap();
        repo.insert(&create_test_person("Jane Smith", "CD7654321", "01722222222"))
            .await
            .unwrap();

        let results = repo.search("john").await.unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].name, "John Doe");
    }

    #[tokio::test]
    async fn test_search_matches_mobile_number() {
        let repo = InMemoryPersonRepository::new();
        repo.insert(&create_test_person("John Doe", "AB1234567", "01711111111"))
            .await
            .unwrap();
        repo.insert(&create_test_person("Jane Smith", "CD7654321", "01722222222"))
            .await
            .unwrap();

        let results = repo.search("0172").await.unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].name, "Jane Smith");
    }

    #[tokio::test]
    async fn test_search_no_matches() {
        let repo = InMemoryPersonRepository::new();
        repo.insert(&create_test_person("John Doe", "AB1234567", "01711111111"))
            .await
            .unwrap();

        let results = repo.search("zelda").await.unwrap();
        assert!(results.is_empty());
    }

    #[tokio::test]
    async fn test_list_all_newest_first() {
        let repo = InMemoryPersonRepository::new();

        let mut older = create_test_person("John Doe", "AB1234567", "01711111111");
        older.created_at = older.created_at - chrono::Duration::hours(1);
        repo.insert(&older).await.unwrap();

        let newer = create_test_person("Jane Smith", "CD7654321", "01722222222");
        repo.insert(&newer).await.unwrap();

        let all = repo.list_all().await.unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].name, "Jane Smith");
        assert_eq!(all[1].name, "John Doe");
    }
}
