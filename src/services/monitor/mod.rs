pub mod types;
pub mod lookup;
pub mod events;
pub mod poller;

pub use types::{
    normalize_targets, Cadence, LookupError, MonitorError, MonitorSnapshot, MonitorState,
    MonitorTarget, PollerConfig, PollerPhase, StatusChange, StatusReport, SweepReport,
    SweepTrigger, TargetSnapshot, TargetStatus,
};
pub use lookup::{HttpStatusLookup, StatusLookup};
pub use events::{StatusChangeSink, StatusNotifier, TracingSink};
pub use poller::AdaptivePoller;
