//! OpenStack service state check
//!
//! Lists the internal services (or agents, or conductors) of one OpenStack
//! project, classifies their health and reports a monitoring verdict with
//! a table of the listed services.

pub mod check;
pub mod config;
pub mod errors;
pub mod health;
pub mod openstack;
pub mod report;
pub mod services;
pub mod timestamp;

pub use check::{CheckOutcome, Completion, execute, run, run_with_deadline};
pub use config::{Config, PLUGIN_NAME};
pub use errors::{CheckError, Result};
pub use health::{Evaluation, ReasonMatcher, Verdict};
pub use services::ServiceFamily;
pub use timestamp::AnyTime;
