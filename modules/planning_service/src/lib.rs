//! Planning Service Module
//!
//! Institutional plans, strategic objectives and their weighted alignment to
//! national (PND) objectives and sustainable development (ODS) goals, plus
//! the investment programs, projects and activities that execute them.

// Public exports
pub mod contract;
pub use contract::{AuthContext, PlanningError, Role};

pub mod module;
pub use module::{ModuleDeps, PlanningServiceModule};

pub mod config;
pub use config::Config;

// Internal modules (hidden from public API)
#[doc(hidden)]
pub mod api;
#[doc(hidden)]
pub mod domain;
#[doc(hidden)]
pub mod infra;
