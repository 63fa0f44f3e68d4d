pub mod config;
pub mod errors;
pub mod telemetry;
pub mod types;

pub use config::ProfileConfig;
pub use errors::{Result, ServiceError};
pub use telemetry::{init_metrics, init_tracing, record_counter, record_gauge};
pub use types::{ActiveUser, NameReservation, PersonalId, UserName, UserProfile, UserSummary};
