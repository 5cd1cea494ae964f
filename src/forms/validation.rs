//! Field validation rules shared by every form.
//!
//! A rule inspects the raw submitted string and returns the message to show
//! next to the field, or `None` when the value is acceptable. Apart from
//! [`required`], rules accept an empty value so they can be combined freely.

use std::collections::{BTreeMap, HashMap};
use std::fmt::Display;
use std::sync::{Arc, LazyLock};

use regex::Regex;

static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid regex"));

/// Boxed validation rule.
#[derive(Clone)]
pub struct Rule(Arc<dyn Fn(&str) -> Option<String> + Send + Sync>);

impl Rule {
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&str) -> Option<String> + Send + Sync + 'static,
    {
        Self(Arc::new(f))
    }

    pub fn check(&self, value: &str) -> Option<String> {
        (self.0)(value)
    }
}

impl std::fmt::Debug for Rule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Rule")
    }
}

/// Field name to rule mapping.
pub type Schema = BTreeMap<&'static str, Rule>;

pub fn required(value: &str) -> Option<String> {
    value
        .trim()
        .is_empty()
        .then(|| "This field is required".to_string())
}

pub fn email(value: &str) -> Option<String> {
    if value.is_empty() || EMAIL_RE.is_match(value) {
        return None;
    }
    Some("Please enter a valid email address".to_string())
}

/// Ten digits starting with 6-9 once separators are stripped.
pub fn mobile(value: &str) -> Option<String> {
    if value.is_empty() {
        return None;
    }
    let digits: String = value.chars().filter(char::is_ascii_digit).collect();
    let valid = digits.len() == 10 && matches!(digits.chars().next(), Some('6'..='9'));
    (!valid).then(|| "Please enter a valid 10-digit mobile number".to_string())
}

pub fn password(value: &str) -> Option<String> {
    if value.is_empty() {
        return None;
    }
    if value.chars().count() < 8 {
        return Some("Password must be at least 8 characters long".to_string());
    }
    if !value.chars().any(|c| c.is_ascii_lowercase()) {
        return Some("Password must contain at least one lowercase letter".to_string());
    }
    if !value.chars().any(|c| c.is_ascii_uppercase()) {
        return Some("Password must contain at least one uppercase letter".to_string());
    }
    if !value.chars().any(|c| c.is_ascii_digit()) {
        return Some("Password must contain at least one number".to_string());
    }
    None
}

fn parse_number(value: &str) -> Option<f64> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Some(0.0);
    }
    trimmed.parse::<f64>().ok().filter(|n| n.is_finite())
}

pub fn number(value: &str) -> Option<String> {
    if value.is_empty() || parse_number(value).is_some() {
        return None;
    }
    Some("Must be a valid number".to_string())
}

pub fn min<N>(bound: N) -> Rule
where
    N: Into<f64> + Display + Copy + Send + Sync + 'static,
{
    Rule::new(move |value| {
        if value.is_empty() {
            return None;
        }
        match parse_number(value) {
            Some(n) if n < bound.into() => Some(format!("Must be at least {bound}")),
            _ => None,
        }
    })
}

pub fn max<N>(bound: N) -> Rule
where
    N: Into<f64> + Display + Copy + Send + Sync + 'static,
{
    Rule::new(move |value| {
        if value.is_empty() {
            return None;
        }
        match parse_number(value) {
            Some(n) if n > bound.into() => Some(format!("Must be no more than {bound}")),
            _ => None,
        }
    })
}

pub fn min_length(bound: usize) -> Rule {
    Rule::new(move |value| {
        (!value.is_empty() && value.chars().count() < bound)
            .then(|| format!("Must be at least {bound} characters"))
    })
}

pub fn max_length(bound: usize) -> Rule {
    Rule::new(move |value| {
        (value.chars().count() > bound).then(|| format!("Must be no more than {bound} characters"))
    })
}

/// Regex rule; `message` defaults to "Invalid format".
pub fn pattern(regex: Regex, message: Option<&str>) -> Rule {
    let message = message.unwrap_or("Invalid format").to_string();
    Rule::new(move |value| (!value.is_empty() && !regex.is_match(value)).then(|| message.clone()))
}

/// Runs rules left to right and reports the first failure.
pub fn compose<I>(rules: I) -> Rule
where
    I: IntoIterator<Item = Rule>,
{
    let rules: Vec<Rule> = rules.into_iter().collect();
    Rule::new(move |value| rules.iter().find_map(|rule| rule.check(value)))
}

/// Validates every schema field; missing values count as empty.
pub fn validate_values(
    values: &HashMap<String, String>,
    schema: &Schema,
) -> HashMap<String, String> {
    schema
        .iter()
        .filter_map(|(field, rule)| {
            let value = values.get(*field).map(String::as_str).unwrap_or_default();
            rule.check(value).map(|error| (field.to_string(), error))
        })
        .collect()
}

/// Score shown under the registration password field.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
pub struct PasswordStrength {
    pub score: u8,
    pub label: &'static str,
}

pub fn password_strength(value: &str) -> PasswordStrength {
    const LABELS: [&str; 6] = ["", "Weak", "Fair", "Good", "Strong", "Very Strong"];

    let length = value.chars().count();
    let checks = [
        length >= 6,
        length >= 10,
        value.chars().any(|c| c.is_ascii_lowercase())
            && value.chars().any(|c| c.is_ascii_uppercase()),
        value.chars().any(|c| c.is_ascii_digit()),
        value.chars().any(|c| !c.is_ascii_alphanumeric()),
    ];
    let score = checks.iter().filter(|passed| **passed).count() as u8;

    PasswordStrength {
        score,
        label: LABELS[usize::from(score)],
    }
}
