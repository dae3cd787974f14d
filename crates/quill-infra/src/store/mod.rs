//! Post store implementations that need no external services.

mod memory;

pub use memory::InMemoryPostStore;
