mod error;
mod engine;

pub use error::PolicyError;
pub use engine::PolicyEngine;
