pub mod detect_types;
pub mod upload_types;
