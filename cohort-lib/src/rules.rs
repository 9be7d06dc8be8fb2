use std::collections::{BTreeMap, HashMap};
use std::fmt;

use serde::{Serialize, Deserialize};

pub const REQUIRED_KEY: &str = "required";
pub const REMOTE_KEY: &str = "remote";

pub const DEFAULT_REQUIRED_MESSAGE: &str = "This field is required.";
pub const DEFAULT_REMOTE_MESSAGE: &str = "Please fix this field.";
pub const DEFAULT_METHOD_MESSAGE: &str = "Please enter a valid value.";
pub const REMOTE_FAILURE_MESSAGE: &str = "Unable to verify this value, please try again.";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Rule {
    /// the field must not be blank
    Required,
    /// the named predicate from the [`Methods`] registry must accept the value
    Method(String),
    /// the endpoint must report the value as available
    Remote(String),
}

impl Rule {
    /// the key used to look up messages for this rule
    pub fn key(&self) -> &str {
        match self {
            Rule::Required => REQUIRED_KEY,
            Rule::Method(name) => name.as_str(),
            Rule::Remote(_) => REMOTE_KEY,
        }
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rule::Required => write!(f, "required"),
            Rule::Method(name) => write!(f, "method({})", name),
            Rule::Remote(endpoint) => write!(f, "remote({})", endpoint),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldRules {
    pub field: String,
    pub rules: Vec<Rule>,
}

impl FieldRules {
    pub fn new<F>(field: F) -> Self
    where
        F: Into<String>
    {
        FieldRules {
            field: field.into(),
            rules: Vec::new(),
        }
    }

    pub fn rule(mut self, rule: Rule) -> Self {
        self.rules.push(rule);
        self
    }
}

/// rule and message tables for a single form
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormConfig {
    /// class that marks the form this configuration applies to
    pub form_class: String,

    /// validate fields on key up events
    #[serde(default)]
    pub onkeyup: bool,

    /// fields are validated in the order given
    #[serde(default)]
    pub rules: Vec<FieldRules>,

    /// field name -> rule key -> message
    #[serde(default)]
    pub messages: BTreeMap<String, BTreeMap<String, String>>,
}

impl FormConfig {
    pub fn new<C>(form_class: C) -> Self
    where
        C: Into<String>
    {
        FormConfig {
            form_class: form_class.into(),
            onkeyup: false,
            rules: Vec::new(),
            messages: BTreeMap::new(),
        }
    }

    pub fn field(mut self, rules: FieldRules) -> Self {
        self.rules.push(rules);
        self
    }

    pub fn message<F, K, M>(mut self, field: F, key: K, msg: M) -> Self
    where
        F: Into<String>,
        K: Into<String>,
        M: Into<String>,
    {
        self.messages.entry(field.into())
            .or_default()
            .insert(key.into(), msg.into());
        self
    }

    pub fn field_message(&self, field: &str, key: &str) -> Option<&str> {
        self.messages.get(field)
            .and_then(|m| m.get(key))
            .map(|v| v.as_str())
    }
}

pub type Predicate = fn(&str) -> bool;

#[derive(Clone)]
pub struct Method {
    pub predicate: Predicate,
    pub message: String,
}

impl fmt::Debug for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Method")
            .field("message", &self.message)
            .finish_non_exhaustive()
    }
}

/// registry of named custom predicates that [`Rule::Method`] refers to
#[derive(Debug, Clone, Default)]
pub struct Methods {
    registered: HashMap<String, Method>,
}

impl Methods {
    pub fn new() -> Self {
        Methods {
            registered: HashMap::new(),
        }
    }

    /// registers a predicate under the given name, replacing any previous
    /// predicate with the same name.
    pub fn register<N, M>(&mut self, name: N, predicate: Predicate, message: M)
    where
        N: Into<String>,
        M: Into<String>,
    {
        let name = name.into();

        tracing::debug!("registering validation method \"{name}\"");

        self.registered.insert(name, Method {
            predicate,
            message: message.into(),
        });
    }

    pub fn with<N, M>(mut self, name: N, predicate: Predicate, message: M) -> Self
    where
        N: Into<String>,
        M: Into<String>,
    {
        self.register(name, predicate, message);
        self
    }

    pub fn get(&self, name: &str) -> Option<&Method> {
        self.registered.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.registered.contains_key(name)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn digits(given: &str) -> bool {
        given.chars().all(|c| c.is_ascii_digit())
    }

    #[test]
    fn method_registry() {
        let mut methods = Methods::new();
        methods.register("digits", digits, "digits only");

        let method = methods.get("digits").expect("registered method");

        assert!((method.predicate)("123"));
        assert!(!(method.predicate)("12a"));
        assert_eq!(method.message, "digits only");
        assert!(!methods.contains("letters"));
    }

    #[test]
    fn rule_keys() {
        assert_eq!(Rule::Required.key(), "required");
        assert_eq!(Rule::Method(String::from("digits")).key(), "digits");
        assert_eq!(Rule::Remote(String::from("/check")).key(), "remote");
    }

    #[test]
    fn config_from_json() {
        let json = r#"{
            "form_class": "upload",
            "rules": [
                {"field": "name", "rules": ["required", {"method": "digits"}, {"remote": "/check"}]},
                {"field": "csv", "rules": ["required"]}
            ],
            "messages": {
                "name": {"remote": "taken"}
            }
        }"#;

        let config: FormConfig = serde_json::from_str(json).expect("valid form config");

        assert!(!config.onkeyup, "onkeyup defaults to false");
        assert_eq!(config.rules.len(), 2);
        assert_eq!(config.rules[0].rules, vec![
            Rule::Required,
            Rule::Method(String::from("digits")),
            Rule::Remote(String::from("/check")),
        ]);
        assert_eq!(config.rules[1].rules, vec![Rule::Required]);
        assert_eq!(config.field_message("name", "remote"), Some("taken"));
        assert_eq!(config.field_message("csv", "required"), None);
    }
}
