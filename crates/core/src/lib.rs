//! Core library for the weekly planner
//!
//! This crate contains the business logic shared by every protocol surface:
//! - Week and Task records and their repositories
//! - The pluggable record store
//! - Request decoding with type coercion
//! - The command layer that both REST and GraphQL call into
//! - File attachments and live-connection notifications

pub mod attachment;
pub mod error;
pub mod input;
pub mod notify;
pub mod planner;
pub mod store;
pub mod task;
pub mod week;

pub use error::{Error, ErrorKind};
pub use planner::Planner;
pub type Result<T> = std::result::Result<T, Error>;
