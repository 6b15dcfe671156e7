use std::collections::HashMap;

use super::{FieldCategory, MaskingError, SurrogateToken};

/// Append-only mapping from original value to surrogate token for one category.
///
/// Serials start at 1 and increase by one per new value, so the mapping is
/// injective and insertion order equals serial order.
#[derive(Debug, Clone)]
pub struct Registry {
    category: FieldCategory,
    tokens: HashMap<String, SurrogateToken>,
    entries: Vec<(SurrogateToken, String)>,
    next_serial: u64,
}

impl Registry {
    pub fn new(category: FieldCategory) -> Self {
        Self {
            category,
            tokens: HashMap::new(),
            entries: Vec::new(),
            next_serial: 1,
        }
    }

    pub fn category(&self) -> FieldCategory {
        self.category
    }

    /// Token for `value`, allocating the next serial on first sight.
    pub fn token_for(&mut self, value: &str) -> Result<SurrogateToken, MaskingError> {
        if let Some(token) = self.tokens.get(value) {
            return Ok(*token);
        }

        let token = SurrogateToken::new(self.next_serial);
        self.next_serial = self
            .next_serial
            .checked_add(1)
            .ok_or(MaskingError::CounterExhausted(self.category))?;
        self.tokens.insert(value.to_string(), token);
        self.entries.push((token, value.to_string()));
        Ok(token)
    }

    pub fn get(&self, value: &str) -> Option<SurrogateToken> {
        self.tokens.get(value).copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// `(token, original)` pairs in insertion order.
    pub fn entries(&self) -> &[(SurrogateToken, String)] {
        &self.entries
    }

    /// Invert the registry for unmasking.
    pub fn reverse(&self) -> ReverseIndex {
        let by_serial = self
            .entries
            .iter()
            .enumerate()
            .map(|(idx, (token, _))| (token.serial(), idx))
            .collect();
        ReverseIndex {
            category: self.category,
            entries: self.entries.clone(),
            by_serial,
        }
    }

    #[cfg(test)]
    pub(crate) fn with_next_serial(category: FieldCategory, next_serial: u64) -> Self {
        Self {
            next_serial,
            ..Self::new(category)
        }
    }
}

/// Token serial to original value, derived from a finished [`Registry`].
#[derive(Debug, Clone)]
pub struct ReverseIndex {
    category: FieldCategory,
    entries: Vec<(SurrogateToken, String)>,
    by_serial: HashMap<u64, usize>,
}

impl ReverseIndex {
    pub fn category(&self) -> FieldCategory {
        self.category
    }

    pub fn lookup(&self, serial: u64) -> Option<&str> {
        self.by_serial
            .get(&serial)
            .map(|idx| self.entries[*idx].1.as_str())
    }

    /// `(token, original)` pairs in registry insertion order.
    pub fn entries(&self) -> &[(SurrogateToken, String)] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
