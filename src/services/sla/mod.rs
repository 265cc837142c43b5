mod types;
mod calculator;

pub use types::{SlaConfig, SlaConfigPatch, SlaKind, SlaVerdict, SlaConfigError, WARNING_BAND_RATIO};
pub use calculator::{compute_verdict, effective_multiplier};
