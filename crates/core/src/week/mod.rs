//! Week module
//!
//! A Week is one planning page: a year/week-of-year pair with display hints.

mod model;
mod repository;

pub use model::*;
pub use repository::WeekRepository;
