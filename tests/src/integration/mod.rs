//! Cross-crate integration scenarios.

pub mod fixtures;

mod codec;
mod hydration;
mod replication;
mod startup;
