//! Command line front end for the `cognito-session` binary.
//!
//! [`start`] parses flags and `COGNITO_*` variables, installs logging and
//! returns the [`Action`] to run.

pub mod actions;
pub mod commands;
pub mod dispatch;
pub mod telemetry;

mod start;

pub use self::actions::Action;
pub use self::start::start;
