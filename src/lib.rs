//! Persistence for DIY projects: a project owns its materials and ordered
//! steps and is tagged with shared categories, all stored in SQLite.
//!
//! [`service::ProjectService`] is the entry point. Every call runs in its own
//! transaction through [`db::Database::with_transaction`].

pub mod cli;
pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod service;
