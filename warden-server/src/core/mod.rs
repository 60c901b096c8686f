pub mod error;

pub use error::{ErrorBody, WardenError, WardenResult, error_envelope};
