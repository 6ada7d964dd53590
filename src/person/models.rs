use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Database model for personnel records.
///
/// `photo` and `cv` hold blob-store filenames, never paths.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonModel {
    pub id: String, // UUID v4 as string
    pub name: String,
    pub passport_number: String,
    pub date_of_birth: NaiveDate,
    pub designation: String,
    pub pp_type: String,
    pub mobile_number: String,
    pub village_town: String,
    pub photo: Option<String>,
    pub cv: Option<String>,
    pub remark: String,
    pub created_at: DateTime<Utc>,
}

/// Validated field set for creating a record; files are attached after the
/// blob store has accepted them.
#[derive(Debug, Clone)]
pub struct NewPerson {
    pub name: String,
    pub passport_number: String,
    pub date_of_birth: NaiveDate,
    pub designation: String,
    pub pp_type: String,
    pub mobile_number: String,
    pub village_town: String,
    pub photo: Option<String>,
    pub cv: Option<String>,
    pub remark: String,
}

impl PersonModel {
    pub fn new(fields: NewPerson) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name: fields.name,
            passport_number: fields.passport_number,
            date_of_birth: fields.date_of_birth,
            designation: fields.designation,
            pp_type: fields.pp_type,
            mobile_number: fields.mobile_number,
            village_town: fields.village_town,
            photo: fields.photo,
            cv: fields.cv,
            remark: fields.remark,
            created_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    pub fn test_fields(name: &str, passport_number: &str) -> NewPerson {
        NewPerson {
            name: name.to_string(),
            passport_number: passport_number.to_string(),
            date_of_birth: NaiveDate::from_ymd_opt(1990, 5, 17).unwrap(),
            designation: "Officer".to_string(),
            pp_type: "Ordinary".to_string(),
            mobile_number: "01711111111".to_string(),
            village_town: "Dhaka".to_string(),
            photo: None,
            cv: None,
            remark: String::new(),
        }
    }

    #[test]
    fn test_new_person_model() {
        let person = PersonModel::new(test_fields("John Doe", "AB1234567"));

        assert!(!person.id.is_empty());
        assert_eq!(person.name, "John Doe");
        assert_eq!(person.passport_number, "AB1234567");
        assert!(person.photo.is_none());
    }

    #[test]
    fn test_serializes_as_camel_case() {
        let person = PersonModel::new(test_fields("John Doe", "AB1234567"));
        let json = serde_json::to_string(&person).unwrap();

        assert!(json.contains("passportNumber"));
        assert!(json.contains("dateOfBirth"));
        assert!(json.contains("mobileNumber"));
        assert!(json.contains("villageTown"));
        assert!(!json.contains("passport_number"));
    }
}
