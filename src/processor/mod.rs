pub mod field_resolver;
pub mod morphology;
pub mod name_composer;
pub mod transformer;

pub use field_resolver::*;
pub use morphology::*;
pub use name_composer::*;
