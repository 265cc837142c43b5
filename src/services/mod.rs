pub mod config_store;
pub mod metrics;
pub mod monitor;
pub mod policy;
pub mod schedule;
pub mod sla;
