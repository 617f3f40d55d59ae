//! Scheduling core for a tailoring shop.
//!
//! - **`model`**: calendar grid math, timeline features and the host's
//!   order / roster records
//! - **`interaction`**: the per-feature drag controller, move throttling and
//!   long-press disambiguation
//! - **`timeline`**: row layout and the stateful view that turns pointer
//!   input into select / update events
//! - **`workload`**: per-assignee hour buckets, overload detection and the
//!   capacity gauge, plus the timeline items derived from orders
//!
//! `io`, `config` and `error` carry the host-facing plumbing.

pub mod config;
pub mod error;
pub mod interaction;
pub mod io;
pub mod model;
pub mod timeline;
pub mod workload;

pub use error::{Error, Result};
