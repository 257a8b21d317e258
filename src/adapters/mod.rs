// Adapters layer: concrete implementations for external systems (storage, clock, randomness).

pub mod storage;
pub mod system;

pub use storage::{FileStore, MemoryStore, StoreClient};
pub use system::{FixedClock, FixedRandom, SystemClock, SystemRandom};
