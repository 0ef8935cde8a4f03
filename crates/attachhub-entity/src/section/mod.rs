//! Storage section entities.

pub mod model;

pub use model::{CreateSection, Section};
