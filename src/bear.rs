// Bear entity - stable identity + replaceable values

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

// ============================================================================
// SEX
// ============================================================================

/// Recorded sex of a bear. The list view can be narrowed to females only,
/// so the value set is closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sex {
    Female,
    Male,
}

impl Sex {
    /// Accepted form values, in display order.
    pub const CHOICES: &'static [&'static str] = &["female", "male"];

    pub fn as_str(&self) -> &'static str {
        match self {
            Sex::Female => "female",
            Sex::Male => "male",
        }
    }

    /// Parse a submitted or stored value. Case-insensitive.
    pub fn parse(value: &str) -> Option<Sex> {
        match value.trim().to_ascii_lowercase().as_str() {
            "female" => Some(Sex::Female),
            "male" => Some(Sex::Male),
            _ => None,
        }
    }
}

// ============================================================================
// BEAR
// ============================================================================

/// One bear record.
///
/// Identity: `id` (UUID) - assigned at creation, never changes.
/// Values: `name`, `sex`, `age` - replaced wholesale by an edit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bear {
    pub id: String,
    pub name: String,
    pub sex: Sex,
    pub age: Option<u32>,

    /// Set exactly once, when the record is first created.
    pub created_at: DateTime<Utc>,

    /// Touched on every save.
    pub updated_at: DateTime<Utc>,
}

impl Bear {
    pub fn new(name: String, sex: Sex, age: Option<u32>) -> Self {
        let now = Utc::now();

        Bear {
            id: uuid::Uuid::new_v4().to_string(),
            name,
            sex,
            age,
            created_at: now,
            updated_at: now,
        }
    }

    /// Full replace of the editable fields. Identity and `created_at`
    /// survive; `updated_at` is stamped with the current time.
    pub fn apply(&mut self, name: String, sex: Sex, age: Option<u32>) {
        self.name = name;
        self.sex = sex;
        self.age = age;
        self.updated_at = Utc::now();
    }

    /// Content hash used by fixture import to skip rows that are already
    /// present. Deduplication key, not identity - identity is `id`.
    pub fn fingerprint(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(format!(
            "{}|{}|{}",
            self.name.to_lowercase(),
            self.sex.as_str(),
            self.age.map(|a| a.to_string()).unwrap_or_default()
        ));
        format!("{:x}", hasher.finalize())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn apply_preserves_identity_and_created_at() {
        let mut bear = Bear::new("Masha".to_string(), Sex::Female, Some(4));
        let id = bear.id.clone();
        let created_at = bear.created_at;

        bear.apply("Misha".to_string(), Sex::Male, None);

        assert_eq!(bear.id, id);
        assert_eq!(bear.created_at, created_at);
        assert_eq!(bear.name, "Misha");
        assert_eq!(bear.sex, Sex::Male);
        assert_eq!(bear.age, None);
        assert!(bear.updated_at >= created_at);
    }

    #[test]
    fn fingerprint_ignores_identity() {
        let a = Bear::new("Masha".to_string(), Sex::Female, Some(4));
        let b = Bear::new("Masha".to_string(), Sex::Female, Some(4));
        let c = Bear::new("Masha".to_string(), Sex::Female, Some(5));

        assert_ne!(a.id, b.id);
        assert_eq!(a.fingerprint(), b.fingerprint());
        assert_ne!(a.fingerprint(), c.fingerprint());
    }

    #[test]
    fn sex_parse_accepts_mixed_case() {
        assert_eq!(Sex::parse("Female"), Some(Sex::Female));
        assert_eq!(Sex::parse(" MALE "), Some(Sex::Male));
        assert_eq!(Sex::parse("grizzly"), None);
    }
}
