pub mod extractions;
pub mod health;
pub mod languages;
pub mod sessions;
