// Bear form schema - explicit field catalog + pure validation
// Maps (schema, submitted key/value data) -> validated record | field errors

use crate::bear::{Bear, Sex};
use std::collections::HashMap;

/// Raw key/value form submission, as decoded from the request body.
pub type FormData = HashMap<String, String>;

// ============================================================================
// FIELD DEFINITIONS
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
    Text,
    Integer,
    Choice,
}

#[derive(Debug, Clone)]
pub enum ValidationRule {
    Required,
    MaxLen(usize),
    Range { min: i64, max: i64 },
    OneOf(&'static [&'static str]),
}

impl ValidationRule {
    /// Returns the failure message, or `None` when the value passes.
    /// Absence checks belong to `Required`; the other rules accept an
    /// empty value so optional fields stay optional.
    pub fn check(&self, value: &str) -> Option<String> {
        match self {
            ValidationRule::Required => {
                if value.is_empty() {
                    Some("This field is required".to_string())
                } else {
                    None
                }
            }
            ValidationRule::MaxLen(max) => {
                if value.chars().count() > *max {
                    Some(format!("Must be at most {} characters", max))
                } else {
                    None
                }
            }
            ValidationRule::Range { min, max } => {
                if value.is_empty() {
                    return None;
                }
                match value.parse::<i64>() {
                    Ok(n) if n < *min || n > *max => {
                        Some(format!("Must be between {} and {}", min, max))
                    }
                    Ok(_) => None,
                    Err(_) => Some("Must be a whole number".to_string()),
                }
            }
            ValidationRule::OneOf(choices) => {
                if value.is_empty() || choices.contains(&value.to_ascii_lowercase().as_str()) {
                    None
                } else {
                    Some(format!("Must be one of: {}", choices.join(", ")))
                }
            }
        }
    }
}

/// One editable field of the bear form.
#[derive(Debug, Clone)]
pub struct FieldDef {
    pub name: &'static str,
    pub label: &'static str,
    pub field_type: FieldType,
    pub rules: Vec<ValidationRule>,
}

impl FieldDef {
    pub fn new(name: &'static str, label: &'static str, field_type: FieldType) -> Self {
        FieldDef {
            name,
            label,
            field_type,
            rules: Vec::new(),
        }
    }

    /// Builder: add a validation rule
    pub fn with_rule(mut self, rule: ValidationRule) -> Self {
        self.rules.push(rule);
        self
    }

    /// Choice list, when the field carries a `OneOf` rule.
    pub fn choices(&self) -> Option<&'static [&'static str]> {
        self.rules.iter().find_map(|rule| match rule {
            ValidationRule::OneOf(choices) => Some(*choices),
            _ => None,
        })
    }
}

// ============================================================================
// VALIDATION RESULT
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        FieldError {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for FieldError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Validated create/edit payload - the only thing the service persists.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BearInput {
    pub name: String,
    pub sex: Sex,
    pub age: Option<u32>,
}

// ============================================================================
// BEAR SCHEMA
// ============================================================================

/// The schema of the bear create/edit form: every editable field, its type
/// and its validation rules. The renderer builds the form from the same
/// definitions the validator checks against.
pub struct BearSchema {
    fields: Vec<FieldDef>,
}

impl BearSchema {
    pub fn new() -> Self {
        BearSchema {
            fields: vec![
                FieldDef::new("name", "Name", FieldType::Text)
                    .with_rule(ValidationRule::Required)
                    .with_rule(ValidationRule::MaxLen(100)),
                FieldDef::new("sex", "Sex", FieldType::Choice)
                    .with_rule(ValidationRule::Required)
                    .with_rule(ValidationRule::OneOf(Sex::CHOICES)),
                FieldDef::new("age", "Age (years)", FieldType::Integer)
                    .with_rule(ValidationRule::Range { min: 0, max: 100 }),
            ],
        }
    }

    pub fn fields(&self) -> &[FieldDef] {
        &self.fields
    }

    /// Validate one submission. The first failing rule per field produces
    /// that field's error; a clean pass yields the typed input.
    pub fn validate(&self, form: &FormData) -> Result<BearInput, Vec<FieldError>> {
        let mut errors = Vec::new();

        for field in &self.fields {
            let value = trimmed(form, field.name);
            for rule in &field.rules {
                if let Some(message) = rule.check(value) {
                    errors.push(FieldError::new(field.name, message));
                    break;
                }
            }
        }

        if !errors.is_empty() {
            return Err(errors);
        }

        let sex = Sex::parse(trimmed(form, "sex"))
            .ok_or_else(|| vec![FieldError::new("sex", "Select a sex")])?;
        let age = match trimmed(form, "age") {
            "" => None,
            value => Some(
                value
                    .parse::<u32>()
                    .map_err(|_| vec![FieldError::new("age", "Must be a whole number")])?,
            ),
        };

        Ok(BearInput {
            name: trimmed(form, "name").to_string(),
            sex,
            age,
        })
    }
}

impl Default for BearSchema {
    fn default() -> Self {
        Self::new()
    }
}

/// Prefill values for the edit form, keyed by schema field name.
pub fn bear_form_values(bear: &Bear) -> FormData {
    let mut values = FormData::new();
    values.insert("name".to_string(), bear.name.clone());
    values.insert("sex".to_string(), bear.sex.as_str().to_string());
    values.insert(
        "age".to_string(),
        bear.age.map(|a| a.to_string()).unwrap_or_default(),
    );
    values
}

fn trimmed<'a>(form: &'a FormData, key: &str) -> &'a str {
    form.get(key).map(String::as_str).unwrap_or("").trim()
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn form(name: &str, sex: &str, age: &str) -> FormData {
        let mut form = FormData::new();
        form.insert("name".to_string(), name.to_string());
        form.insert("sex".to_string(), sex.to_string());
        form.insert("age".to_string(), age.to_string());
        form
    }

    #[test]
    fn valid_submission_builds_typed_input() {
        let schema = BearSchema::new();

        let input = schema.validate(&form(" Masha ", "female", "4")).unwrap();

        assert_eq!(input.name, "Masha");
        assert_eq!(input.sex, Sex::Female);
        assert_eq!(input.age, Some(4));
    }

    #[test]
    fn age_is_optional() {
        let schema = BearSchema::new();

        let input = schema.validate(&form("Misha", "male", "")).unwrap();
        assert_eq!(input.age, None);

        // Missing key entirely behaves like an empty value
        let mut partial = FormData::new();
        partial.insert("name".to_string(), "Misha".to_string());
        partial.insert("sex".to_string(), "male".to_string());
        let input = schema.validate(&partial).unwrap();
        assert_eq!(input.age, None);
    }

    #[test]
    fn missing_name_is_rejected() {
        let schema = BearSchema::new();

        let errors = schema.validate(&form("   ", "female", "")).unwrap_err();

        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "name");
    }

    #[test]
    fn name_over_max_length_is_rejected() {
        let schema = BearSchema::new();

        let long_name = "b".repeat(101);
        let errors = schema
            .validate(&form(&long_name, "female", ""))
            .unwrap_err();

        assert!(errors.iter().any(|e| e.field == "name"));
    }

    #[test]
    fn unknown_sex_is_rejected() {
        let schema = BearSchema::new();

        let errors = schema.validate(&form("Masha", "grizzly", "")).unwrap_err();

        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "sex");
        assert!(errors[0].message.contains("female"));
    }

    #[test]
    fn age_out_of_range_is_rejected() {
        let schema = BearSchema::new();

        let errors = schema
            .validate(&form("Masha", "female", "200"))
            .unwrap_err();
        assert!(errors.iter().any(|e| e.field == "age"));

        let errors = schema.validate(&form("Masha", "female", "-1")).unwrap_err();
        assert!(errors.iter().any(|e| e.field == "age"));
    }

    #[test]
    fn non_numeric_age_is_rejected() {
        let schema = BearSchema::new();

        let errors = schema
            .validate(&form("Masha", "female", "old"))
            .unwrap_err();

        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "age");
        assert_eq!(errors[0].message, "Must be a whole number");
    }

    #[test]
    fn one_error_per_failing_field() {
        let schema = BearSchema::new();

        let errors = schema.validate(&form("", "grizzly", "abc")).unwrap_err();

        let fields: Vec<&str> = errors.iter().map(|e| e.field.as_str()).collect();
        assert_eq!(fields, vec!["name", "sex", "age"]);
    }

    #[test]
    fn edit_prefill_round_trips_through_validation() {
        let schema = BearSchema::new();
        let bear = Bear::new("Masha".to_string(), Sex::Female, Some(4));

        let values = bear_form_values(&bear);
        let input = schema.validate(&values).unwrap();

        assert_eq!(input.name, bear.name);
        assert_eq!(input.sex, bear.sex);
        assert_eq!(input.age, bear.age);
    }
}
