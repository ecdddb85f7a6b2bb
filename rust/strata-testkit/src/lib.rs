//! Test utilities for the Strata crates.
//!
//! This crate provides:
//! - Event scripts: recorded decode event streams that can be replayed
//!   against a record materializer, built fluently or loaded from JSON
//! - A record shredder that turns logical values into the event stream a
//!   columnar reader would produce for the derived physical layout
//! - Sample schemas and statically-typed classes for exercising the object
//!   factory
//! - Seeded random generation of records
//!
//! # Usage
//!
//! This crate is intended for use in the Strata test suites only.

pub mod classes;
pub mod data_gen;
pub mod events;
pub mod shred;
