use serde::{Deserialize, Serialize};

use super::models::PersonModel;

/// Query string for GET /api/users/search
#[derive(Debug, Deserialize)]
pub struct SearchParams {
    pub query: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PersonRegisterResponse {
    pub message: String,
    pub user: PersonModel,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PersonListResponse {
    pub users: Vec<PersonModel>,
    pub count: usize,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PersonDetailResponse {
    pub user: PersonModel,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::person::models::NewPerson;
    use chrono::NaiveDate;

    #[test]
    fn test_list_response_serialization() {
        let person = PersonModel::new(NewPerson {
            name: "John Doe".to_string(),
            passport_number: "AB1234567".to_string(),
            date_of_birth: NaiveDate::from_ymd_opt(1990, 5, 17).unwrap(),
            designation: "Officer".to_string(),
            pp_type: "Ordinary".to_string(),
            mobile_number: "01711111111".to_string(),
            village_town: "Dhaka".to_string(),
            photo: None,
            cv: None,
            remark: String::new(),
        });

        let response = PersonListResponse {
            users: vec![person],
            count: 1,
        };

        let json = serde_json::to_string(&response).unwrap();
        assert!(json.contains("\"count\":1"));
        assert!(json.contains("John Doe"));
    }
}
