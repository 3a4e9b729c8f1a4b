// Bear Registry - Core Library
// Exposes all modules for use in the CLI, the web server, and tests

pub mod bear;
pub mod import;
pub mod render;
pub mod schema;
pub mod service;
pub mod session;
pub mod store;

// Re-export commonly used types
pub use bear::{Bear, Sex};
pub use import::{import_fixtures, load_fixtures, BearFixture, ImportReport};
pub use schema::{
    bear_form_values, BearInput, BearSchema, FieldDef, FieldError, FieldType, FormData,
    ValidationRule,
};
pub use service::{
    bear_detail, create_bear, delete_bear, edit_bear, female_bears, list_bears, SaveOutcome,
};
pub use session::{DeletedBear, SessionState};
pub use store::{setup_database, BearStore, SqliteBearStore, StoreError, StoreResult};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
