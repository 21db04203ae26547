//! Teacher and student read models.
//!
//! # Invariants
//! - `Student::suspended` only ever moves from `false` to `true` in core.

use crate::model::identity::MailId;
use serde::{Deserialize, Serialize};

/// Teacher row. Identity is its only attribute.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Teacher {
    pub mail: MailId,
}

/// Student row with its suspension flag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Student {
    pub mail: MailId,
    /// Suspended students never receive notifications.
    pub suspended: bool,
}

impl Student {
    /// Returns whether this student may receive notifications.
    pub fn is_active(&self) -> bool {
        !self.suspended
    }
}
