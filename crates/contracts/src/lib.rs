//! # Contracts
//!
//! Frozen interface contracts shared by every crate of the workspace: the job
//! and outcome data model, the collaborator traits around the dispatcher and
//! the layered error types.
//!
//! ## Time Model
//! - Elapsed time of a job is measured with a monotonic clock from the moment
//!   its worker starts the fetch until the body has been fully consumed
//! - Session deadlines are absolute instants computed once per session

mod dispatch_config;
mod error;
mod fetch;
mod job;
mod outcome;
mod report;
mod sink;
mod source;

pub use dispatch_config::*;
pub use error::*;
pub use fetch::{FetchBody, Fetcher, LocalFetchBody, LocalFetcher};
pub use job::*;
pub use outcome::*;
pub use report::SessionReport;
pub use sink::*;
pub use source::{JobSource, VecJobSource};
