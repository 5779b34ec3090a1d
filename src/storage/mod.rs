pub mod json_export;
pub mod minio_client;
pub mod product_source;

pub use json_export::*;
pub use minio_client::*;
pub use product_source::*;
