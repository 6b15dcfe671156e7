use regex::Regex;

use super::registry::{Registry, ReverseIndex};
use super::rewrite::{capture_spans, rewrite_spans};
use super::{FieldCategory, MaskingError};

/// Placeholder for the name slot when a token has no name entry.
pub const UNKNOWN_NAME: &str = "Unknown";
/// Placeholder for the phone slot when a token has no phone entry.
pub const UNKNOWN_PHONE: &str = "N/A";

/// Compiled patterns for the masked fields and for token references.
///
/// Cheap to clone; build once and hand a clone to each request's mapper.
#[derive(Debug, Clone)]
pub struct FieldRules {
    name: Regex,
    phone: Regex,
    token: Regex,
}

impl FieldRules {
    /// Custom patterns. Field patterns must capture the value in group 1, the
    /// token pattern must capture the serial digits in group 1.
    pub fn new(name: Regex, phone: Regex, token: Regex) -> Self {
        Self { name, phone, token }
    }

    pub fn standard() -> Result<Self, MaskingError> {
        Ok(Self {
            name: field_pattern(FieldCategory::Name)?,
            phone: field_pattern(FieldCategory::Phone)?,
            token: Regex::new(r"ID_([0-9]+)")?,
        })
    }

    fn field(&self, category: FieldCategory) -> &Regex {
        match category {
            FieldCategory::Name => &self.name,
            FieldCategory::Phone => &self.phone,
        }
    }
}

// Value is the shortest run of non-newline characters closed by `",`.
fn field_pattern(category: FieldCategory) -> Result<Regex, MaskingError> {
    let pattern = format!(r#""{}": "(.*?)","#, regex::escape(category.key()));
    Ok(Regex::new(&pattern)?)
}

/// Session-scoped forward transform. One per request.
#[derive(Debug)]
pub struct IdentityMapper {
    rules: FieldRules,
    names: Registry,
    phones: Registry,
}

impl IdentityMapper {
    pub fn new(rules: FieldRules) -> Self {
        Self {
            rules,
            names: Registry::new(FieldCategory::Name),
            phones: Registry::new(FieldCategory::Phone),
        }
    }

    /// Mask name fields, then phone fields in the result.
    pub fn mask(&mut self, document: &str) -> Result<String, MaskingError> {
        let named = self.mask_field(FieldCategory::Name, document)?;
        self.mask_field(FieldCategory::Phone, &named)
    }

    /// Single substitution pass for one category.
    pub fn mask_field(
        &mut self,
        category: FieldCategory,
        text: &str,
    ) -> Result<String, MaskingError> {
        let Self {
            rules,
            names,
            phones,
        } = self;
        let registry = match category {
            FieldCategory::Name => names,
            FieldCategory::Phone => phones,
        };

        let spans = capture_spans(rules.field(category), text, category.key())?;
        let matches = spans.len();
        let masked = rewrite_spans(text, spans, |value| {
            registry
                .token_for(value)
                .map(|token| category.render_field(token))
        })
        .inspect_err(|e| {
            tracing::error!(category = %category, error = %e, "Masking pass failed");
        })?;

        tracing::debug!(
            category = %category,
            matches,
            registry_size = registry.len(),
            "Masked field values"
        );
        Ok(masked)
    }

    pub fn names(&self) -> &Registry {
        &self.names
    }

    pub fn phones(&self) -> &Registry {
        &self.phones
    }

    /// Finish masking and derive the reverse lists used by unmasking.
    pub fn build_reverse_lists(self) -> ReverseLists {
        ReverseLists {
            token: self.rules.token,
            names: self.names.reverse(),
            phones: self.phones.reverse(),
        }
    }
}

/// Reverse transform for one finished session.
#[derive(Debug, Clone)]
pub struct ReverseLists {
    token: Regex,
    names: ReverseIndex,
    phones: ReverseIndex,
}

impl ReverseLists {
    pub fn names(&self) -> &ReverseIndex {
        &self.names
    }

    pub fn phones(&self) -> &ReverseIndex {
        &self.phones
    }

    /// Replace every `ID_<digits>` in `answer` with a name + phone descriptor.
    ///
    /// The serial is looked up in both indices, so a token always expands to
    /// both slots whichever registry issued it.
    pub fn unmask(&self, answer: &str) -> Result<String, MaskingError> {
        let spans = capture_spans(&self.token, answer, "token")?;
        let tokens = spans.len();
        let restored = rewrite_spans(answer, spans, |digits| {
            Ok(self.describe(digits.parse::<u64>().ok()))
        })
        .inspect_err(|e| {
            tracing::error!(error = %e, "Unmasking pass failed");
        })?;

        tracing::debug!(tokens, "Unmasked token references");
        Ok(restored)
    }

    /// Descriptor for a serial; `None` (unparseable) resolves to placeholders.
    pub fn describe(&self, serial: Option<u64>) -> String {
        let name = serial
            .and_then(|s| self.names.lookup(s))
            .unwrap_or(UNKNOWN_NAME);
        let phone = serial
            .and_then(|s| self.phones.lookup(s))
            .unwrap_or(UNKNOWN_PHONE);
        format!("{name} (Phone: {phone})")
    }
}
