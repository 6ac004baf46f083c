//! Object model for console-managed classes.
//!
//! # Responsibility
//! - Define the `Model` interface, its attribute values and the generic
//!   `Record` implementation.
//! - Map class names to constructors through an explicit registry.
//!
//! # Invariants
//! - Every object is identified by a stable UUID string.
//! - Class dispatch always goes through `ModelRegistry`; there is no
//!   reflection-style lookup.

pub mod record;
pub mod registry;
pub mod value;
