//! simulated traffic-monitoring producer
//!
//! builds an observation record every interval and posts it as json to a
//! backend endpoint, printing one line per attempt. see `runtime::Reporter`.

pub mod config;
pub mod domain;
pub mod logging;
pub mod runtime;
pub mod sender;
pub mod source;

pub use domain::ObservationRecord;
pub use runtime::{Reporter, RunSummary};
pub use sender::{SendOutcome, Sender};
pub use source::{build_record, RecordSource, SimulatedSource};
