//! Input/output helpers.
//!
//! - star CSV parsing + validation (`star`)
//! - output file naming (`paths`)
//! - parameter tables and run summary (`results`)

pub mod paths;
pub mod results;
pub mod star;

pub use paths::*;
pub use results::*;
pub use star::*;
