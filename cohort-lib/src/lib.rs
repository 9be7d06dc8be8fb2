pub mod error;
pub mod validation;

pub mod form;
pub mod rules;
pub mod remote;
pub mod binding;

pub mod cohort;

pub use binding::{
    FormBinding,
    FieldError,
    FieldErrorKind,
    FieldState,
    Trigger,
    TriggerOutcome,
    Submission,
    ValidationResult,
    BindError,
};
pub use form::{Form, FieldValue, FileRef};
pub use remote::{RemoteCheck, RemoteVerdict, RemoteError};
pub use rules::{FormConfig, FieldRules, Methods, Rule};
