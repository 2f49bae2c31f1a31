pub mod branch;
pub mod check;
pub mod config;
pub mod error;
pub mod git;
pub mod lint;
pub mod message;
pub mod mood;
pub mod report;
pub mod resolve;
pub mod revision;
pub mod update;

pub use check::{PushChecker, Verdict};
pub use config::{Config, Policy};
pub use error::{BackendError, Violation};
pub use revision::Revision;
pub use update::RefUpdate;
