use std::fmt;

use serde::{Serialize, Deserialize};
use strum::AsRefStr as StrumAsRefStr;

use crate::form::{Form, FieldValue};
use crate::remote::{RemoteCheck, RemoteVerdict, RemoteError};
use crate::rules::{
    Rule,
    FormConfig,
    Methods,
    DEFAULT_REQUIRED_MESSAGE,
    DEFAULT_REMOTE_MESSAGE,
    DEFAULT_METHOD_MESSAGE,
    REMOTE_FAILURE_MESSAGE,
};

#[derive(
    Debug, Clone, Copy, PartialEq, Eq,
    StrumAsRefStr,
    Serialize, Deserialize
)]
pub enum FieldErrorKind {
    MissingField,
    InvalidFormat,
    NameTaken,
    RemoteFailure,
}

impl fmt::Display for FieldErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self.as_ref(), f)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error, Serialize, Deserialize)]
#[error("{field}: {message}")]
pub struct FieldError {
    pub field: String,
    pub kind: FieldErrorKind,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldState {
    Untouched,
    /// validation started but has not finished
    Pending,
    Valid,
    Invalid(FieldError),
}

impl FieldState {
    pub fn is_invalid(&self) -> bool {
        matches!(self, FieldState::Invalid(_))
    }
}

impl fmt::Display for FieldState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldState::Untouched => write!(f, "untouched"),
            FieldState::Pending => write!(f, "pending"),
            FieldState::Valid => write!(f, "valid"),
            FieldState::Invalid(err) => write!(f, "invalid ({}): {}", err.kind, err.message),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Trigger {
    KeyUp(String),
    Blur(String),
    Submit,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationResult {
    errors: Vec<FieldError>,
}

impl ValidationResult {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn errors(&self) -> &[FieldError] {
        &self.errors
    }

    pub fn error_for(&self, field: &str) -> Option<&FieldError> {
        self.errors.iter().find(|e| e.field == field)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Submission {
    Proceed,
    Blocked(ValidationResult),
}

impl Submission {
    pub fn is_proceed(&self) -> bool {
        matches!(self, Submission::Proceed)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TriggerOutcome {
    /// the triggering policy did not call for validation
    Ignored,
    Field(Result<(), FieldError>),
    Submitted(Submission),
}

#[derive(Debug, thiserror::Error)]
pub enum BindError {
    #[error("form does not have the \"{0}\" class")]
    FormMismatch(String),

    #[error("form does not contain the field \"{0}\"")]
    MissingField(String),

    #[error("validation method \"{method}\" for field \"{field}\" is not registered")]
    UnknownMethod {
        field: String,
        method: String,
    },

    #[error("rule {rule} cannot be applied to file field \"{field}\"")]
    UnsupportedRule {
        field: String,
        rule: Rule,
    },
}

#[derive(Debug)]
struct RemoteCache {
    value: String,
    outcome: Result<(), FieldError>,
}

#[derive(Debug)]
struct BoundField {
    name: String,
    rules: Vec<Rule>,
    state: FieldState,
    submitted: bool,
    previous: Option<RemoteCache>,
}

/// a validation configuration attached to a single form.
///
/// the binding owns the per field state so it has to be used with the same
/// form it was bound to.
pub struct FormBinding<R> {
    config: FormConfig,
    methods: Methods,
    remote: R,
    fields: Vec<BoundField>,
}

impl<R> FormBinding<R>
where
    R: RemoteCheck
{
    /// checks that the form matches the configuration and creates the
    /// binding.
    pub fn bind(
        form: &Form,
        config: FormConfig,
        methods: Methods,
        remote: R,
    ) -> Result<Self, BindError> {
        if !form.has_class(&config.form_class) {
            return Err(BindError::FormMismatch(config.form_class.clone()));
        }

        let mut fields = Vec::with_capacity(config.rules.len());

        for field_rules in &config.rules {
            let Some(value) = form.get(&field_rules.field) else {
                return Err(BindError::MissingField(field_rules.field.clone()));
            };

            for rule in &field_rules.rules {
                match rule {
                    Rule::Required => {},
                    Rule::Method(name) => {
                        if !methods.contains(name) {
                            return Err(BindError::UnknownMethod {
                                field: field_rules.field.clone(),
                                method: name.clone(),
                            });
                        }
                    },
                    Rule::Remote(_) => {}
                }

                if !matches!(rule, Rule::Required) && matches!(value, FieldValue::File(_)) {
                    return Err(BindError::UnsupportedRule {
                        field: field_rules.field.clone(),
                        rule: rule.clone(),
                    });
                }
            }

            fields.push(BoundField {
                name: field_rules.field.clone(),
                rules: field_rules.rules.clone(),
                state: FieldState::Untouched,
                submitted: false,
                previous: None,
            });
        }

        tracing::debug!(
            "bound validation to form.{} with {} fields",
            config.form_class,
            fields.len()
        );

        Ok(FormBinding {
            config,
            methods,
            remote,
            fields,
        })
    }

    pub fn state(&self, field: &str) -> Option<&FieldState> {
        self.fields.iter()
            .find(|f| f.name == field)
            .map(|f| &f.state)
    }

    pub fn states(&self) -> impl Iterator<Item = (&str, &FieldState)> {
        self.fields.iter().map(|f| (f.name.as_str(), &f.state))
    }

    /// true if any field has a validation that has not finished
    pub fn is_pending(&self) -> bool {
        self.fields.iter().any(|f| f.state == FieldState::Pending)
    }

    /// validates every bound field in configuration order
    pub async fn validate(&mut self, form: &Form) -> ValidationResult {
        let mut errors = Vec::new();

        for index in 0..self.fields.len() {
            self.fields[index].submitted = true;

            if let Err(err) = self.validate_index(index, form).await {
                errors.push(err);
            }
        }

        ValidationResult { errors }
    }

    pub async fn submit(&mut self, form: &Form) -> Submission {
        let result = self.validate(form).await;

        if result.is_valid() {
            tracing::debug!("form.{} may be submitted", self.config.form_class);

            Submission::Proceed
        } else {
            tracing::debug!(
                "form.{} submission blocked by {} errors",
                self.config.form_class,
                result.errors().len()
            );

            Submission::Blocked(result)
        }
    }

    /// validates a single field. fields without rules are always valid.
    pub async fn validate_field(&mut self, form: &Form, field: &str) -> Result<(), FieldError> {
        match self.index_of(field) {
            Some(index) => self.validate_index(index, form).await,
            None => Ok(())
        }
    }

    /// applies the triggering policy for the given event
    pub async fn trigger(&mut self, form: &Form, trigger: Trigger) -> TriggerOutcome {
        match trigger {
            Trigger::Submit => TriggerOutcome::Submitted(self.submit(form).await),
            Trigger::KeyUp(name) => {
                if !self.config.onkeyup {
                    return TriggerOutcome::Ignored;
                }

                let Some(index) = self.index_of(&name) else {
                    return TriggerOutcome::Ignored;
                };

                let field = &self.fields[index];

                if field.submitted || field.state.is_invalid() {
                    TriggerOutcome::Field(self.validate_index(index, form).await)
                } else {
                    TriggerOutcome::Ignored
                }
            },
            Trigger::Blur(name) => {
                let Some(index) = self.index_of(&name) else {
                    return TriggerOutcome::Ignored;
                };

                let field = &self.fields[index];
                let blank = form.get(&field.name)
                    .map(|v| v.is_blank())
                    .unwrap_or(true);

                if field.submitted || field.state.is_invalid() || !blank {
                    TriggerOutcome::Field(self.validate_index(index, form).await)
                } else {
                    TriggerOutcome::Ignored
                }
            }
        }
    }

    fn index_of(&self, field: &str) -> Option<usize> {
        self.fields.iter().position(|f| f.name == field)
    }

    async fn validate_index(&mut self, index: usize, form: &Form) -> Result<(), FieldError> {
        self.fields[index].state = FieldState::Pending;

        let (outcome, cache) = self.check_rules(index, form).await;
        let field = &mut self.fields[index];

        if let Some(cache) = cache {
            field.previous = Some(cache);
        }

        field.state = match &outcome {
            Ok(()) => FieldState::Valid,
            Err(err) => {
                tracing::debug!("field \"{}\" failed validation: {}", field.name, err.kind);

                FieldState::Invalid(err.clone())
            }
        };

        outcome
    }

    async fn check_rules(
        &self,
        index: usize,
        form: &Form
    ) -> (Result<(), FieldError>, Option<RemoteCache>) {
        let field = &self.fields[index];
        let empty = FieldValue::Text(String::new());
        let value = form.get(&field.name).unwrap_or(&empty);
        let mut cache = None;

        for rule in &field.rules {
            let failed = match rule {
                Rule::Required => if value.is_blank() {
                    Some(self.error(field, rule, FieldErrorKind::MissingField, None))
                } else {
                    None
                },
                Rule::Method(name) => match value.as_text() {
                    Some(text) if !value.is_blank() => {
                        let passed = self.methods.get(name)
                            .map(|m| (m.predicate)(text))
                            .unwrap_or(false);

                        if passed {
                            None
                        } else {
                            Some(self.error(field, rule, FieldErrorKind::InvalidFormat, None))
                        }
                    },
                    // optional and blank
                    _ => None
                },
                Rule::Remote(endpoint) => match value.as_text() {
                    Some(text) if !value.is_blank() => {
                        let outcome = match &field.previous {
                            Some(previous) if previous.value == text => {
                                tracing::debug!("using previous remote result for \"{}\"", field.name);

                                previous.outcome.clone()
                            },
                            _ => match self.remote_check(field, rule, endpoint, text).await {
                                Some(outcome) => {
                                    cache = Some(RemoteCache {
                                        value: text.to_owned(),
                                        outcome: outcome.clone(),
                                    });

                                    outcome
                                },
                                None => Err(FieldError {
                                    field: field.name.clone(),
                                    kind: FieldErrorKind::RemoteFailure,
                                    message: REMOTE_FAILURE_MESSAGE.to_owned(),
                                })
                            }
                        };

                        outcome.err()
                    },
                    _ => None
                }
            };

            if let Some(err) = failed {
                return (Err(err), cache);
            }
        }

        (Ok(()), cache)
    }

    /// queries the endpoint. `None` means the request itself failed and no
    /// verdict was given.
    async fn remote_check(
        &self,
        field: &BoundField,
        rule: &Rule,
        endpoint: &str,
        value: &str,
    ) -> Option<Result<(), FieldError>> {
        tracing::debug!("checking \"{}\" with {endpoint}", field.name);

        match self.remote.check(endpoint, &field.name, value).await {
            Ok(RemoteVerdict::Available) => Some(Ok(())),
            Ok(RemoteVerdict::Taken(msg)) => Some(Err(
                self.error(field, rule, FieldErrorKind::NameTaken, msg)
            )),
            Err(err) => {
                log_remote_error(&field.name, endpoint, &err);

                None
            }
        }
    }

    /// resolves the message for a failed rule. a message given by the remote
    /// endpoint wins, then the form messages, then the registered method
    /// message and finally the built in default.
    fn error(
        &self,
        field: &BoundField,
        rule: &Rule,
        kind: FieldErrorKind,
        given: Option<String>,
    ) -> FieldError {
        let message = given.unwrap_or_else(|| {
            if let Some(msg) = self.config.field_message(&field.name, rule.key()) {
                return msg.to_owned();
            }

            match rule {
                Rule::Required => DEFAULT_REQUIRED_MESSAGE.to_owned(),
                Rule::Method(name) => self.methods.get(name)
                    .map(|m| m.message.clone())
                    .unwrap_or_else(|| DEFAULT_METHOD_MESSAGE.to_owned()),
                Rule::Remote(_) => DEFAULT_REMOTE_MESSAGE.to_owned(),
            }
        });

        FieldError {
            field: field.name.clone(),
            kind,
            message,
        }
    }
}

fn log_remote_error(field: &str, endpoint: &str, err: &RemoteError) {
    match std::error::Error::source(err) {
        Some(src) => tracing::warn!("remote check for \"{field}\" at {endpoint} failed: {err}: {src}"),
        None => tracing::warn!("remote check for \"{field}\" at {endpoint} failed: {err}"),
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::form::FileRef;
    use crate::rules::FieldRules;

    struct Reply(Result<RemoteVerdict, u16>);

    impl RemoteCheck for Reply {
        async fn check(
            &self,
            _endpoint: &str,
            _field: &str,
            _value: &str
        ) -> Result<RemoteVerdict, RemoteError> {
            self.0.clone().map_err(RemoteError::Status)
        }
    }

    fn lowercase(given: &str) -> bool {
        given.chars().all(|c| c.is_ascii_lowercase())
    }

    fn config() -> FormConfig {
        FormConfig::new("signup")
            .field(FieldRules::new("handle")
                .rule(Rule::Required)
                .rule(Rule::Method(String::from("lowercase")))
                .rule(Rule::Remote(String::from("/handles/check"))))
            .field(FieldRules::new("bio")
                .rule(Rule::Method(String::from("lowercase"))))
    }

    fn methods() -> Methods {
        Methods::new().with("lowercase", lowercase, "lowercase only")
    }

    fn form(handle: &str, bio: &str) -> Form {
        Form::new()
            .with_class("signup")
            .text("handle", handle)
            .text("bio", bio)
    }

    #[test]
    fn bind_checks_form() {
        let available = Reply(Ok(RemoteVerdict::Available));

        let wrong_class = Form::new().text("handle", "").text("bio", "");
        let result = FormBinding::bind(&wrong_class, config(), methods(), &available);
        assert!(matches!(result, Err(BindError::FormMismatch(_))));

        let missing = Form::new().with_class("signup").text("handle", "");
        let result = FormBinding::bind(&missing, config(), methods(), &available);
        assert!(matches!(result, Err(BindError::MissingField(ref f)) if f == "bio"));

        let result = FormBinding::bind(&form("", ""), config(), Methods::new(), &available);
        assert!(matches!(result, Err(BindError::UnknownMethod { .. })));

        let file_form = Form::new()
            .with_class("signup")
            .file("handle", Some(FileRef::new("a.csv", 1)))
            .text("bio", "");
        let result = FormBinding::bind(&file_form, config(), methods(), &available);
        assert!(matches!(result, Err(BindError::UnsupportedRule { .. })));

        let binding = FormBinding::bind(&form("", ""), config(), methods(), &available)
            .expect("valid binding");
        assert_eq!(binding.states().count(), 2);
        assert!(binding.states().all(|(_, s)| *s == FieldState::Untouched));
    }

    #[tokio::test]
    async fn optional_field_skips_methods_when_empty() {
        let available = Reply(Ok(RemoteVerdict::Available));
        let given = form("handle", "");
        let mut binding = FormBinding::bind(&given, config(), methods(), &available)
            .expect("valid binding");

        assert!(binding.validate(&given).await.is_valid());

        let given = form("handle", "Not Lowercase");
        let result = binding.validate(&given).await;

        assert_eq!(result.error_for("bio").map(|e| e.message.as_str()), Some("lowercase only"));
    }

    #[tokio::test]
    async fn optional_field_skips_rules_when_whitespace() {
        let available = Reply(Ok(RemoteVerdict::Available));
        let given = form("handle", "   ");
        let mut binding = FormBinding::bind(&given, config(), methods(), &available)
            .expect("valid binding");

        assert!(binding.validate(&given).await.is_valid(), "whitespace bio is not checked");
        assert_eq!(binding.state("bio"), Some(&FieldState::Valid));

        let failing = Reply(Err(500));
        let optional = FormConfig::new("signup")
            .field(FieldRules::new("handle")
                .rule(Rule::Remote(String::from("/handles/check"))))
            .field(FieldRules::new("bio"));
        let given = form(" \t ", "");
        let mut binding = FormBinding::bind(&given, optional, methods(), &failing)
            .expect("valid binding");

        assert!(
            binding.validate_field(&given, "handle").await.is_ok(),
            "whitespace handle is not sent to the remote endpoint"
        );
    }

    #[tokio::test]
    async fn message_resolution() {
        let given = form("handle", "");

        let reply = Reply(Ok(RemoteVerdict::Taken(Some(String::from("reserved handle")))));
        let mut binding = FormBinding::bind(&given, config(), methods(), &reply)
            .expect("valid binding");
        let result = binding.validate(&given).await;
        assert_eq!(
            result.error_for("handle").map(|e| e.message.as_str()),
            Some("reserved handle"),
            "endpoint message wins"
        );

        let reply = Reply(Ok(RemoteVerdict::Taken(None)));
        let mut binding = FormBinding::bind(&given, config(), methods(), &reply)
            .expect("valid binding");
        let result = binding.validate(&given).await;
        assert_eq!(
            result.error_for("handle").map(|e| e.message.as_str()),
            Some(DEFAULT_REMOTE_MESSAGE)
        );

        let custom = config().message("handle", "remote", "handle taken");
        let mut binding = FormBinding::bind(&given, custom, methods(), &reply)
            .expect("valid binding");
        let result = binding.validate(&given).await;
        assert_eq!(
            result.error_for("handle").map(|e| e.message.as_str()),
            Some("handle taken")
        );
    }

    #[tokio::test]
    async fn remote_status_failure() {
        let given = form("handle", "");
        let reply = Reply(Err(500));
        let mut binding = FormBinding::bind(&given, config(), methods(), &reply)
            .expect("valid binding");

        let err = binding.validate_field(&given, "handle").await
            .expect_err("remote failure");

        assert_eq!(err.kind, FieldErrorKind::RemoteFailure);
        assert_eq!(err.message, REMOTE_FAILURE_MESSAGE);
        assert!(binding.validate_field(&given, "missing").await.is_ok());
    }

    #[tokio::test]
    async fn key_up_when_enabled() {
        let available = Reply(Ok(RemoteVerdict::Available));
        let mut enabled = config();
        enabled.onkeyup = true;

        let mut given = form("BAD", "");
        let mut binding = FormBinding::bind(&given, enabled, methods(), &available)
            .expect("valid binding");

        assert_eq!(
            binding.trigger(&given, Trigger::KeyUp(String::from("handle"))).await,
            TriggerOutcome::Ignored,
            "key up before the field was validated"
        );

        let outcome = binding.trigger(&given, Trigger::Blur(String::from("handle"))).await;
        assert!(matches!(outcome, TriggerOutcome::Field(Err(_))));

        given.set_text("handle", "good");

        assert_eq!(
            binding.trigger(&given, Trigger::KeyUp(String::from("handle"))).await,
            TriggerOutcome::Field(Ok(()))
        );
        assert_eq!(binding.state("handle"), Some(&FieldState::Valid));
    }
}
