//! Identifier generation for NEW records.
//!
//! The matcher takes a `&mut dyn IdGenerator` so runs can be made fully
//! deterministic in tests while production uses random UUIDs.

use uuid::Uuid;

/// Source of fresh identifiers.
pub trait IdGenerator {
    fn next_id(&mut self) -> String;
}

/// Random 128-bit identifiers in UUID text form (version 4).
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomIdGenerator;

impl IdGenerator for RandomIdGenerator {
    fn next_id(&mut self) -> String {
        Uuid::new_v4().to_string()
    }
}

/// Deterministic identifiers: `prefix` followed by a zero-padded counter.
///
/// ```
/// use idmatch_core::ids::{IdGenerator, SequentialIdGenerator};
///
/// let mut ids = SequentialIdGenerator::new("id-");
/// assert_eq!(ids.next_id(), "id-000001");
/// assert_eq!(ids.next_id(), "id-000002");
/// ```
#[derive(Debug, Clone)]
pub struct SequentialIdGenerator {
    prefix: String,
    next: u64,
}

impl SequentialIdGenerator {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            next: 1,
        }
    }

    /// Start counting at `start` instead of 1.
    pub fn starting_at(mut self, start: u64) -> Self {
        self.next = start;
        self
    }
}

impl IdGenerator for SequentialIdGenerator {
    fn next_id(&mut self) -> String {
        let id = format!("{}{:06}", self.prefix, self.next);
        self.next += 1;
        id
    }
}
