pub mod chart;
pub mod config;
pub mod dataset;
pub mod error;
pub mod format;
pub mod logging;
pub mod page;
pub mod projection;
pub mod render;
pub mod scale;
pub mod scheduler;
pub mod source;
pub mod tooltip;
pub mod validate;

pub use chart::{ChartSet, Profile};
pub use config::DashboardConfig;
pub use error::DashboardError;
pub use scheduler::{CycleOutcome, Dashboard, SchedulerState};
pub use source::{source_from_config, MetricsSource};
