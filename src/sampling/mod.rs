//! The sampling loop: periodic sensor polling and the per-cycle pipeline.

pub mod reading;
pub mod sampler;

// Re-export commonly used items
pub use reading::{Reading, PARAMETERS};
pub use sampler::{Pipeline, Sampler};
