pub mod composed_name;
pub mod product;
pub mod schema;

pub use composed_name::*;
pub use product::*;
pub use schema::*;
