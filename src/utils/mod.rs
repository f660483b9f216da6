pub mod auth;
pub mod backend;
pub mod file_operations;
