//! Application-level orchestration.
//!
//! This module owns the discovery run lifecycle (start/reset), the command loop that drives it
//! from UI layers, and post-run reporting. UI/CLI layers call into this module to keep
//! responsibilities separated.

pub(crate) mod classify;
mod controller;
pub(crate) mod discovery;
mod phase;
mod report;

pub(crate) use classify::classify;
pub(crate) use controller::{run_controller, UiCommand};
pub(crate) use discovery::{DiscoverySettings, PhaseController};
pub(crate) use report::{build_report, is_failure};
