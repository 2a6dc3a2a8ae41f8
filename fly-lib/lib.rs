//! Core of the fly modal editing assistant.
//!
//! The host editor owns buffers, views and rendering. This crate owns the
//! modal state and the algorithms behind it: sneak jumps, structural
//! expansion, paragraph navigation. Hosts implement [`host::Host`] and feed
//! their events to a [`controller::Controller`].

use smartstring::{
  LazyCompact,
  SmartString,
};

pub mod buffer;
pub mod clipboard;
pub mod command;
pub mod config;
pub mod context;
pub mod controller;
pub mod expand;
pub mod headless;
pub mod host;
pub mod movement;
pub mod paragraph;
pub mod scope;
pub mod search;
pub mod selection;
pub mod sneak;

pub type Tendril = SmartString<LazyCompact>;
