pub mod connection;
pub mod error;
pub mod models;

pub use error::RepositoryError;
