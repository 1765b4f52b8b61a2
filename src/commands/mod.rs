pub mod connectivity;
pub mod upload;
