use std::sync::atomic::{AtomicU64, Ordering};

use uuid::Uuid;

/// Source of entity identifiers, injected into the command handlers.
pub trait UuidGenerator: Send + Sync {
    fn generate(&self) -> Uuid;
}

/// Production generator: UUIDv7, so ids sort by creation time.
#[derive(Debug, Default, Clone, Copy)]
pub struct TimeOrderedUuidGenerator;

impl UuidGenerator for TimeOrderedUuidGenerator {
    fn generate(&self) -> Uuid {
        Uuid::now_v7()
    }
}

/// Deterministic generator for tests: `00000000-0000-0000-0000-000000000001`,
/// `...0002`, and so on.
#[derive(Debug)]
pub struct SequentialUuidGenerator {
    next: AtomicU64,
}

impl SequentialUuidGenerator {
    pub fn new() -> Self {
        Self::starting_at(1)
    }

    pub fn starting_at(first: u64) -> Self {
        Self {
            next: AtomicU64::new(first),
        }
    }
}

impl Default for SequentialUuidGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl UuidGenerator for SequentialUuidGenerator {
    fn generate(&self) -> Uuid {
        let n = self.next.fetch_add(1, Ordering::SeqCst);
        Uuid::from_u128(n as u128)
    }
}
