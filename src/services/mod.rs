pub mod config;
pub mod detect_client;
pub mod preview_service;
pub mod upload_state;
