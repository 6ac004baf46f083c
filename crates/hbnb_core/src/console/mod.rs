//! Line-oriented command console.
//!
//! # Responsibility
//! - Parse direct (`verb Class args`) and dotted (`Class.verb(args)`) input.
//! - Map parse and lookup failures onto the fixed message catalogue.
//! - Drive create/show/update/destroy/count/all against an `ObjectStore`.
//!
//! # Invariants
//! - A dotted call behaves exactly like its direct rewrite.
//! - Mutating verbs persist the store before returning.

pub mod dotted;
pub mod interpreter;
pub mod messages;
pub mod parser;
