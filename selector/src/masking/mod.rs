//! Reversible identity masking.
//!
//! Sensitive literal values found in agent profiles (names and phone numbers)
//! are swapped for surrogate tokens before a document leaves the process, and
//! tokens found in the model's answer are swapped back afterwards.
//!
//! | Direction | Input pattern            | Output                                  |
//! |-----------|--------------------------|-----------------------------------------|
//! | mask      | `"name": "<value>",`     | `"name": "ID_<n>",`                     |
//! | mask      | `"phone": "<value>",`    | `"phone": "ID_<n>",`                    |
//! | unmask    | `ID_<digits>`            | `<name> (Phone: <phone>)`               |
//!
//! Each category owns an independent [`Registry`], so `ID_1` can name a person
//! and a phone number at the same time. Registries live for one request: build
//! an [`IdentityMapper`], mask, then consume it with
//! [`IdentityMapper::build_reverse_lists`] to obtain the [`ReverseLists`] used
//! for unmasking. Consuming the mapper means no masking can happen once the
//! reverse lists exist, so they are never stale.

mod mapper;
mod registry;
mod rewrite;

pub use mapper::{FieldRules, IdentityMapper, ReverseLists, UNKNOWN_NAME, UNKNOWN_PHONE};
pub use registry::{Registry, ReverseIndex};

use std::fmt;

/// Failures inside the masking transform.
///
/// Every variant is a transform failure: the caller must not forward the
/// document anywhere once one of these is returned.
#[derive(Debug, thiserror::Error)]
pub enum MaskingError {
    #[error("field pattern failed to compile: {0}")]
    Pattern(#[from] regex::Error),
    #[error("pattern match for {0} is missing its value capture")]
    MissingCapture(&'static str),
    #[error("match span {start}..{end} is not a valid rewrite position (text length {len})")]
    InvalidSpan { start: usize, end: usize, len: usize },
    #[error("token counter exhausted for {0} registry")]
    CounterExhausted(FieldCategory),
}

/// The kinds of sensitive field that get masked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldCategory {
    Name,
    Phone,
}

impl FieldCategory {
    /// JSON-ish key the field appears under in agent profiles.
    pub fn key(&self) -> &'static str {
        match self {
            FieldCategory::Name => "name",
            FieldCategory::Phone => "phone",
        }
    }

    /// Render the masked field, keeping the key and trailing syntax intact.
    pub fn render_field(&self, token: SurrogateToken) -> String {
        format!("\"{}\": \"{}\",", self.key(), token)
    }
}

impl fmt::Display for FieldCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Opaque placeholder rendered as `ID_<serial>`.
///
/// The token text carries no category; the registry that issued it does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SurrogateToken(u64);

impl SurrogateToken {
    pub const PREFIX: &'static str = "ID_";

    pub fn new(serial: u64) -> Self {
        Self(serial)
    }

    pub fn serial(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for SurrogateToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", Self::PREFIX, self.0)
    }
}
