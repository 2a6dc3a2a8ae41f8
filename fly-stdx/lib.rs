//! Extensions to the standard library and to ropey used across the fly
//! crates.

pub mod rope;
