//! Domain entities and value objects shared by the persistence and web layers.

pub mod item;
pub mod stats;
pub mod types;
