//! Domain models for the project ledger.
//!
//! # Aggregate
//!
//! A [`ProjectAggregate`] is one consistency unit: the [`Project`] row plus
//! everything hanging off it.
//!
//! - [`Material`] and [`Step`] rows are owned by exactly one project and are
//!   destroyed with it.
//! - [`Category`] rows are shared. Deleting a project only removes its
//!   association rows, never the categories themselves.
//!
//! Every value here is fully materialized; nothing is lazily loaded.

mod category;
mod material;
mod project;
mod step;

pub use category::*;
pub use material::*;
pub use project::*;
pub use step::*;

/// Surrogate key assigned by the store on insert.
pub type ProjectId = i64;
