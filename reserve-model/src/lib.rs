//! A deterministic model of a lending pool's reserve accounting. Each action maps a reserve
//! snapshot and a user position at one timestamp to the expected snapshot and position after
//! the action.

pub mod config;
pub mod constants;
pub mod errors;
pub mod math;
pub mod pool;
pub mod testutils;
pub mod validator;

pub use errors::ModelError;
