//! # vmkit — VM instance lifecycle manager
//!
//! Facade crate that re-exports the vmkit workspace crates so consumers
//! can depend on a single `vmkit` library.
//!
//! ## Crate breakdown
//!
//! | Module | Crate | Purpose |
//! |--------|-------|---------|
//! | [`core`] | vmkit-core | Value types, instance specs, VM states |
//! | [`daemon`] | vmkit-daemon | Instance registry, settings subsystem, persistence |

pub use vmkit_core as core;
pub use vmkit_daemon as daemon;
