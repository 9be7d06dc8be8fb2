use cohort_lib::cohort;
use cohort_lib::RemoteVerdict;

use serde::{Serialize, Deserialize};

use crate::{Validator, ApiError, ApiErrorKind, Detail};

/// query sent to the name validation endpoint
#[derive(Debug, Serialize, Deserialize)]
pub struct ValidateName {
    pub name: String,
}

impl Validator for ValidateName {
    fn validate(&self) -> Result<(), ApiError> {
        if self.name.is_empty() || !cohort::name_valid(&self.name) {
            return Err(ApiError::from((
                ApiErrorKind::ValidationFailed,
                Detail::with_key("name"),
                cohort::NAME_METHOD_MESSAGE
            )));
        }

        Ok(())
    }
}

/// body returned by a remote validation endpoint.
///
/// `true` or `"true"` means available. `false` or `null` means taken and
/// any other string is a message describing why it is taken.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Availability {
    Flag(Option<bool>),
    Message(String),
}

impl Availability {
    pub fn is_available(&self) -> bool {
        match self {
            Availability::Flag(flag) => flag.unwrap_or(false),
            Availability::Message(msg) => msg == "true",
        }
    }
}

impl From<Availability> for RemoteVerdict {
    fn from(given: Availability) -> Self {
        if given.is_available() {
            return RemoteVerdict::Available;
        }

        match given {
            Availability::Message(msg) if !msg.is_empty() && msg != "false" => {
                RemoteVerdict::Taken(Some(msg))
            },
            _ => RemoteVerdict::Taken(None)
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn parse(body: &str) -> RemoteVerdict {
        let availability: Availability = serde_json::from_str(body)
            .expect("valid availability body");

        availability.into()
    }

    #[test]
    fn availability_bodies() {
        assert_eq!(parse("true"), RemoteVerdict::Available);
        assert_eq!(parse("\"true\""), RemoteVerdict::Available);
        assert_eq!(parse("false"), RemoteVerdict::Taken(None));
        assert_eq!(parse("null"), RemoteVerdict::Taken(None));
        assert_eq!(parse("\"false\""), RemoteVerdict::Taken(None));
        assert_eq!(
            parse("\"reserved for staff\""),
            RemoteVerdict::Taken(Some(String::from("reserved for staff")))
        );
    }

    #[test]
    fn validate_name_query() {
        let valid = [
            String::from("My Cohort-1"),
            String::from("editors_2014"),
        ];

        for name in valid {
            assert!(ValidateName { name: name.clone() }.validate().is_ok(), "valid name failed {:?}", name);
        }

        let invalid = [
            String::new(),
            String::from("abc!"),
        ];

        for name in invalid {
            let err = ValidateName { name: name.clone() }.validate()
                .expect_err("invalid name passed");

            assert_eq!(*err.kind(), ApiErrorKind::ValidationFailed, "name {:?}", name);
        }
    }
}
