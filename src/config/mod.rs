pub mod app_config;
pub mod minio_config;
pub mod schema_loader;

pub use app_config::*;
pub use minio_config::*;
pub use schema_loader::*;
