// Public API - what other modules can use
pub use handlers::{
    download_cv, get_person, get_photo, list_persons, register_person, search_persons,
};

// Internal modules
mod handlers;
pub mod models;
pub mod repository;
pub mod service;
pub mod types;
