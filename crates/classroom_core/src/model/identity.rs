//! Mail identity normalization and canonical value type.
//!
//! # Responsibility
//! - Canonicalize email-like identifiers before any store access.
//! - Accept both bare (`a@b.com`) and legacy pre-quoted (`'a@b.com'`) input.
//!
//! # Invariants
//! - `denormalize(normalize(x)) == x` for every `x` that is not already
//!   wrapped in quotes.
//! - Two inputs that normalize identically denote the same `MailId`.
//! - Strings of 2 chars or fewer pass through both functions unchanged.

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

const QUOTE: char = '\'';

/// Wraps `raw` in one pair of single quotes when it is longer than 2 chars
/// and neither end is already a quote. Half-quoted input such as `'a@b.com`
/// is returned unchanged.
pub fn normalize(raw: &str) -> String {
    if raw.chars().count() > 2 && !raw.starts_with(QUOTE) && !raw.ends_with(QUOTE) {
        format!("{QUOTE}{raw}{QUOTE}")
    } else {
        raw.to_string()
    }
}

/// Strips one pair of wrapping single quotes when present on a string longer
/// than 2 chars.
pub fn denormalize(canonical: &str) -> String {
    if canonical.chars().count() > 2 && is_quoted(canonical) {
        canonical[QUOTE.len_utf8()..canonical.len() - QUOTE.len_utf8()].to_string()
    } else {
        canonical.to_string()
    }
}

fn is_quoted(value: &str) -> bool {
    value.starts_with(QUOTE) && value.ends_with(QUOTE)
}

/// Canonical identity of a teacher or student.
///
/// Holds the bare (unquoted) form. Equality, ordering and hashing operate on
/// that form, so quoted and bare spellings of one address collapse.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct MailId(String);

impl MailId {
    /// Builds the canonical identity from caller-supplied text.
    pub fn new(raw: impl AsRef<str>) -> Self {
        Self(denormalize(&normalize(raw.as_ref())))
    }

    /// Returns the bare form used as the storage key.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    /// Returns whether the identity is empty or whitespace only.
    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl Display for MailId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for MailId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for MailId {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

impl From<MailId> for String {
    fn from(value: MailId) -> Self {
        value.0
    }
}


#[cfg(test)]
mod proptests {
    use super::{denormalize, normalize, MailId};
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn round_trip_restores_any_unwrapped_value(raw in "\\PC{1,64}") {
            prop_assume!(!(raw.starts_with('\'') && raw.ends_with('\'')));
            prop_assert_eq!(denormalize(&normalize(&raw)), raw);
        }

        #[test]
        fn quoting_never_changes_identity(bare in "[a-z0-9._]{1,20}@[a-z0-9.]{1,20}") {
            let quoted = format!("'{bare}'");
            prop_assert_eq!(MailId::new(&bare), MailId::new(&quoted));
            let quoted_id = MailId::new(&quoted);
            prop_assert_eq!(quoted_id.as_str(), bare.as_str());
        }
    }
}
