// Per-session mutable state

use crate::bear::Bear;
use chrono::{DateTime, Utc};

/// Record of the most recent deletion in this session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeletedBear {
    pub id: String,
    pub name: String,
    pub deleted_at: DateTime<Utc>,
}

/// Session state holds exactly one typed field: the last deleted bear.
///
/// Read contract: read-once. `take_last_deleted` clears the slot, so the
/// deletion notice renders on the next list view and then disappears.
/// A later deletion overwrites an unread one.
#[derive(Debug, Default)]
pub struct SessionState {
    last_deleted: Option<DeletedBear>,
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a deletion, overwriting any previously recorded one.
    pub fn record_deleted(&mut self, bear: &Bear) {
        self.last_deleted = Some(DeletedBear {
            id: bear.id.clone(),
            name: bear.name.clone(),
            deleted_at: Utc::now(),
        });
    }

    /// Take the pending deletion notice, leaving the slot empty.
    pub fn take_last_deleted(&mut self) -> Option<DeletedBear> {
        self.last_deleted.take()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bear::Sex;

    #[test]
    fn take_is_read_once() {
        let mut session = SessionState::new();
        let bear = Bear::new("Masha".to_string(), Sex::Female, None);

        session.record_deleted(&bear);

        let first = session.take_last_deleted().unwrap();
        assert_eq!(first.id, bear.id);
        assert_eq!(first.name, "Masha");
        assert!(session.take_last_deleted().is_none());
    }

    #[test]
    fn later_deletion_overwrites_unread_one() {
        let mut session = SessionState::new();
        let first = Bear::new("Masha".to_string(), Sex::Female, None);
        let second = Bear::new("Misha".to_string(), Sex::Male, None);

        session.record_deleted(&first);
        session.record_deleted(&second);

        let taken = session.take_last_deleted().unwrap();
        assert_eq!(taken.id, second.id);
        assert!(session.take_last_deleted().is_none());
    }
}
