//! Text primitives shared by the fly crates: character classes and line
//! endings over ropes.

pub mod chars;
pub mod line_ending;
