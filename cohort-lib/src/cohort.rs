use crate::form::{Form, FileRef};
use crate::rules::{FormConfig, FieldRules, Methods, Rule, REMOTE_KEY};
use crate::validation::check_allowed_chars;

/// class marking the cohort upload form
pub const UPLOAD_FORM_CLASS: &str = "upload-cohort";

pub const NAME_FIELD: &str = "name";
pub const CSV_FIELD: &str = "csv";

pub const NAME_METHOD: &str = "cohortName";
pub const NAME_METHOD_MESSAGE: &str =
    "Cohort names should only contain letters, numbers, spaces, dashes, and underscores.";

pub const VALIDATE_NAME_PATH: &str = "/cohorts/validate/name";
pub const NAME_TAKEN_MESSAGE: &str = "This cohort name is taken.";

fn name_char(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || ch == ' ' || ch == '-' || ch == '_'
}

/// the empty string is accepted, emptiness is checked by the required rule
pub fn name_valid(given: &str) -> bool {
    check_allowed_chars(given, None, name_char)
}

/// methods needed by [`upload_config`]
pub fn methods() -> Methods {
    Methods::new().with(NAME_METHOD, name_valid, NAME_METHOD_MESSAGE)
}

pub fn upload_config() -> FormConfig {
    FormConfig::new(UPLOAD_FORM_CLASS)
        .field(FieldRules::new(NAME_FIELD)
            .rule(Rule::Required)
            .rule(Rule::Method(NAME_METHOD.into()))
            .rule(Rule::Remote(VALIDATE_NAME_PATH.into())))
        .field(FieldRules::new(CSV_FIELD)
            .rule(Rule::Required))
        .message(NAME_FIELD, REMOTE_KEY, NAME_TAKEN_MESSAGE)
}

pub fn upload_form<N>(name: N, csv: Option<FileRef>) -> Form
where
    N: Into<String>
{
    Form::new()
        .with_class(UPLOAD_FORM_CLASS)
        .text(NAME_FIELD, name)
        .file(CSV_FIELD, csv)
}
