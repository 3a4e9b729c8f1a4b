// CSV fixture import - idempotent seeding for the registry
//
// Rows go through the same schema validation as the web form, then a
// content fingerprint keeps re-runs from inserting duplicates.

use crate::bear::Bear;
use crate::schema::{BearSchema, FormData};
use crate::store::{BearStore, StoreResult};
use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;
use tracing::warn;

/// One row of a bear fixture file.
#[derive(Debug, Deserialize)]
pub struct BearFixture {
    #[serde(rename = "Name")]
    pub name: String,

    #[serde(rename = "Sex")]
    pub sex: String,

    #[serde(rename = "Age", default)]
    pub age: String,
}

impl BearFixture {
    fn as_form(&self) -> FormData {
        let mut form = FormData::new();
        form.insert("name".to_string(), self.name.clone());
        form.insert("sex".to_string(), self.sex.clone());
        form.insert("age".to_string(), self.age.clone());
        form
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ImportReport {
    pub inserted: usize,
    pub skipped: usize,
    pub invalid: usize,
}

pub fn load_fixtures(csv_path: &Path) -> Result<Vec<BearFixture>> {
    let mut rdr = csv::Reader::from_path(csv_path).context("failed to open fixture file")?;

    let mut fixtures = Vec::new();
    for result in rdr.deserialize() {
        let fixture: BearFixture = result.context("failed to deserialize fixture row")?;
        fixtures.push(fixture);
    }

    Ok(fixtures)
}

/// Insert fixtures that pass validation and are not already present.
/// Re-running the same file inserts nothing new.
pub fn import_fixtures<S: BearStore>(
    store: &S,
    schema: &BearSchema,
    fixtures: &[BearFixture],
) -> StoreResult<ImportReport> {
    let mut report = ImportReport::default();

    for fixture in fixtures {
        let input = match schema.validate(&fixture.as_form()) {
            Ok(input) => input,
            Err(errors) => {
                warn!(name = %fixture.name, ?errors, "skipping invalid fixture row");
                report.invalid += 1;
                continue;
            }
        };

        let bear = Bear::new(input.name, input.sex, input.age);
        if store.fingerprint_exists(&bear.fingerprint())? {
            report.skipped += 1;
            continue;
        }

        store.save(&bear)?;
        report.inserted += 1;
    }

    Ok(report)
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::SqliteBearStore;
    use std::io::Write;

    fn fixture(name: &str, sex: &str, age: &str) -> BearFixture {
        BearFixture {
            name: name.to_string(),
            sex: sex.to_string(),
            age: age.to_string(),
        }
    }

    #[test]
    fn import_twice_inserts_once() {
        let store = SqliteBearStore::open_in_memory().unwrap();
        let schema = BearSchema::new();
        let fixtures = vec![
            fixture("Masha", "female", "4"),
            fixture("Misha", "male", "6"),
        ];

        let first = import_fixtures(&store, &schema, &fixtures).unwrap();
        assert_eq!(first.inserted, 2);
        assert_eq!(first.skipped, 0);
        assert_eq!(store.count().unwrap(), 2);

        let second = import_fixtures(&store, &schema, &fixtures).unwrap();
        assert_eq!(second.inserted, 0);
        assert_eq!(second.skipped, 2);
        assert_eq!(store.count().unwrap(), 2);
    }

    #[test]
    fn invalid_rows_are_counted_and_skipped() {
        let store = SqliteBearStore::open_in_memory().unwrap();
        let schema = BearSchema::new();
        let fixtures = vec![
            fixture("Masha", "female", "4"),
            fixture("", "female", ""),
            fixture("Misha", "grizzly", ""),
        ];

        let report = import_fixtures(&store, &schema, &fixtures).unwrap();

        assert_eq!(report.inserted, 1);
        assert_eq!(report.invalid, 2);
        assert_eq!(store.count().unwrap(), 1);
    }

    #[test]
    fn load_fixtures_reads_headed_csv() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "Name,Sex,Age").unwrap();
        writeln!(file, "Masha,female,4").unwrap();
        writeln!(file, "Misha,male,").unwrap();
        file.flush().unwrap();

        let fixtures = load_fixtures(file.path()).unwrap();

        assert_eq!(fixtures.len(), 2);
        assert_eq!(fixtures[0].name, "Masha");
        assert_eq!(fixtures[0].age, "4");
        assert_eq!(fixtures[1].age, "");
    }
}
