//! Explorer - application state controller
//!
//! Orchestrates the entity repository and the insight service:
//! - `ExplorerState` is the single record the views render
//! - `Explorer` validates transitions and emits `Effect`s
//! - `Dispatcher` runs effects and produces `Outcome`s
//!
//! Search, insight and comparison each carry a generation counter so a
//! response to superseded work never overwrites newer state.

mod controller;
mod effect;
mod state;

pub use controller::{Explorer, Generations};
pub use effect::{Dispatcher, Effect, Outcome};
pub use state::{ANALYSIS_ERROR, ExplorerState, SEARCH_ERROR};
