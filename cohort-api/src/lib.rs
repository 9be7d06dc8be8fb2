pub mod error;
pub use error::{ApiError, ApiErrorKind, Detail};

pub mod traits;
pub use traits::Validator;

pub mod cohorts;

#[cfg(feature = "client")]
pub mod client;
