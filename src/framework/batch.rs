//! # Batch Outcomes
//!
//! Batch reads and updates process a list of property names in order and stop
//! at the first failure. Earlier successes are kept (there is no rollback), so
//! the caller gets a partial result plus the error that stopped the batch.

use super::error::{ResourceError, ReturnCode};

/// Outcome of one item in a batch.
#[derive(Debug, Clone, PartialEq)]
pub struct Outcome<T> {
    pub name: String,
    pub result: Result<T, ResourceError>,
}

/// Ordered per-item outcomes of a batch read or update.
///
/// At most one item is a failure, and if present it is always the last one.
#[derive(Debug, Clone, PartialEq)]
pub struct Batch<T> {
    items: Vec<Outcome<T>>,
}

impl<T> Batch<T> {
    pub(crate) fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// A batch rejected before any item was attempted.
    pub(crate) fn rejected(name: impl Into<String>, error: ResourceError) -> Self {
        let mut batch = Self::new();
        batch.push(name, Err(error));
        batch
    }

    pub(crate) fn push(&mut self, name: impl Into<String>, result: Result<T, ResourceError>) {
        self.items.push(Outcome {
            name: name.into(),
            result,
        });
    }

    pub fn items(&self) -> &[Outcome<T>] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// The error that stopped the batch, if any.
    pub fn error(&self) -> Option<&ResourceError> {
        self.items.iter().find_map(|o| o.result.as_ref().err())
    }

    pub fn is_ok(&self) -> bool {
        self.error().is_none()
    }

    /// Code summarising the whole batch: `OK` or the stopping error's code.
    pub fn code(&self) -> ReturnCode {
        self.error().map(ResourceError::code).unwrap_or_default()
    }

    /// Every distinct failure class that occurred, in order of occurrence.
    pub fn codes(&self) -> Vec<ReturnCode> {
        let mut codes = Vec::new();
        for code in self
            .items
            .iter()
            .filter_map(|o| o.result.as_ref().err().map(ResourceError::code))
        {
            if !codes.contains(&code) {
                codes.push(code);
            }
        }
        codes
    }

    /// Successful items only, paired with their names.
    pub fn successes(&self) -> impl Iterator<Item = (&str, &T)> {
        self.items
            .iter()
            .filter_map(|o| o.result.as_ref().ok().map(|v| (o.name.as_str(), v)))
    }

    /// Collapses the batch into a single result, discarding partial values on error.
    pub fn into_result(self) -> Result<Vec<(String, T)>, ResourceError> {
        let mut values = Vec::with_capacity(self.items.len());
        for item in self.items {
            values.push((item.name, item.result?));
        }
        Ok(values)
    }
}
