#[cfg(feature = "server")]
pub mod config;
pub mod mods;
pub mod versions;
