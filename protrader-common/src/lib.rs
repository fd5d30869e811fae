//! Shared infrastructure for the ProTrader backtesting workspace.
//!
//! Keeps the cross-cutting pieces (error taxonomy, logging bootstrap) out of
//! the engine crate so the simulation core stays pure computation.

#![warn(clippy::all)]
#![allow(clippy::pedantic)]

pub mod error;
pub mod logging;

pub use error::{Error, Result, ResultExt};
