//! Concrete [`crate::engine::Handler`] implementations.

pub mod system;
