pub mod file_repository;
pub mod models;
pub mod repository;
pub mod service;

#[cfg(test)]
mod tests;

pub use file_repository::UserFileRepository;
pub use models::*;
pub use repository::UserRepository;
pub use service::{extension_for, UserFileStore, UserService, UserServiceConfig, UserStore};
