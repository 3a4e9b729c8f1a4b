// Bear CRUD service - translates validated submissions into store operations
//
// The functions here are HTTP-free: the server binary maps their outcomes
// onto redirects and re-rendered forms, the CLI prints them. Validation
// failure is a normal branch (`SaveOutcome::Rejected`), never an error;
// the only recognized error besides storage failure is `NotFound`.

use crate::bear::{Bear, Sex};
use crate::schema::{BearSchema, FieldError, FormData};
use crate::session::SessionState;
use crate::store::{BearStore, StoreError, StoreResult};
use tracing::info;

/// Outcome of a create/edit submission.
#[derive(Debug)]
pub enum SaveOutcome {
    /// Persisted; the id names the record to redirect to.
    Saved(String),
    /// Validation failed; re-render the form with these errors.
    Rejected(Vec<FieldError>),
}

/// Validate a creation form and persist a new bear on success.
pub fn create_bear<S: BearStore>(
    store: &S,
    schema: &BearSchema,
    form: &FormData,
) -> StoreResult<SaveOutcome> {
    let input = match schema.validate(form) {
        Ok(input) => input,
        Err(errors) => return Ok(SaveOutcome::Rejected(errors)),
    };

    let bear = Bear::new(input.name, input.sex, input.age);
    store.save(&bear)?;
    info!(id = %bear.id, name = %bear.name, "created bear");

    Ok(SaveOutcome::Saved(bear.id))
}

/// Validate an edit form and replace the editable fields of an existing
/// bear. `NotFound` when the id has no record; the lookup happens before
/// validation so an edit of a missing record never reaches the form logic.
pub fn edit_bear<S: BearStore>(
    store: &S,
    schema: &BearSchema,
    id: &str,
    form: &FormData,
) -> StoreResult<SaveOutcome> {
    let Some(mut bear) = store.get(id)? else {
        return Err(StoreError::NotFound(id.to_string()));
    };

    let input = match schema.validate(form) {
        Ok(input) => input,
        Err(errors) => return Ok(SaveOutcome::Rejected(errors)),
    };

    bear.apply(input.name, input.sex, input.age);
    store.save(&bear)?;
    info!(id = %bear.id, "updated bear");

    Ok(SaveOutcome::Saved(bear.id))
}

/// Remove a bear. The deletion is recorded into session state before the
/// row goes away, so the next list view can show what was deleted.
pub fn delete_bear<S: BearStore>(
    store: &S,
    session: &mut SessionState,
    id: &str,
) -> StoreResult<()> {
    let Some(bear) = store.get(id)? else {
        return Err(StoreError::NotFound(id.to_string()));
    };

    session.record_deleted(&bear);
    store.delete(&bear.id)?;
    info!(id = %bear.id, name = %bear.name, "deleted bear");

    Ok(())
}

/// All bears for the list view.
pub fn list_bears<S: BearStore>(store: &S) -> StoreResult<Vec<Bear>> {
    store.list()
}

/// The female subset, rendered by the same list view.
pub fn female_bears<S: BearStore>(store: &S) -> StoreResult<Vec<Bear>> {
    store.filter_sex(Sex::Female)
}

/// One bear for the detail view. `NotFound` when absent.
pub fn bear_detail<S: BearStore>(store: &S, id: &str) -> StoreResult<Bear> {
    store
        .get(id)?
        .ok_or_else(|| StoreError::NotFound(id.to_string()))
}

// ============================================================================
// TESTS
// ============================================================================
