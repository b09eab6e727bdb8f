//! Adapter utilities for the `virtual-list` crate.
//!
//! The `virtual-list` crate is UI-agnostic and owns the layout and reconcile algorithms. This
//! crate provides small, framework-neutral helpers commonly needed by adapters:
//!
//! - Frame/time scheduling (frame throttle, leading-edge throttle, debounce) with stale-result
//!   tickets
//! - A [`Controller`] that coalesces scroll and resize events into one frame pass
//! - A component [`Registry`] and its [`install`] entry point
//!
//! This crate is intentionally framework-agnostic (no DOM/egui/ratatui bindings).
#![cfg_attr(not(feature = "std"), no_std)]
#![forbid(unsafe_code)]

extern crate alloc;

#[cfg(test)]
extern crate std;

#[macro_use]
mod macros;

mod controller;
mod registry;
mod schedule;


pub use controller::{
    Controller, DEFAULT_END_REACHED_THROTTLE_MS, DEFAULT_RESIZE_DEBOUNCE_MS, ListEngine, Tick,
};
pub use registry::{
    Component, ComponentConfig, ComponentKind, Registry, RegistryError, install,
};
pub use schedule::{Debounce, FrameThrottle, Throttle, Ticket};
