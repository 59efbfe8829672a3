pub mod store;
pub mod usage;

pub use store::{FileStore, KeyValueStore, MemoryStore, StoredValue};
pub use usage::{EntryToken, GateConfig, GateDecision, GateState, UsageGate};
