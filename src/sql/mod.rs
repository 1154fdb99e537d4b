//! # SQL Generation
//!
//! Dialect registry, identifier and literal rendering, and the statement
//! generator for MySQL, SQLite and PostgreSQL.

pub mod dialect;
pub mod formatter;
pub mod generator;
pub mod identifier;
