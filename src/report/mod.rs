pub mod sheet;
pub mod sheet_writer;
pub mod xlsx_writer;

pub use sheet::*;
pub use sheet_writer::*;
