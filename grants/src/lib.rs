//! Role/permission evaluator for the reservation services.
//!
//! Roles map to flat lists of `(action, resource)` grants; evaluation is a
//! scan over the caller's roles with exact-or-`*` matching on both fields.

pub mod config;
pub mod evaluator;

pub use config::{load_from_env, GrantCfg, GrantsConfig};
pub use evaluator::{Evaluator, PermissionDenied};
