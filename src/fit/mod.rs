//! Curve matching orchestration.
//!
//! Responsibilities:
//!
//! - match each training curve to its least-squares-best ideal curve (`selection`)
//! - assign test points to the chosen ideal curves within a fixed tolerance (`classify`)

pub mod classify;
pub mod selection;

pub use classify::*;
pub use selection::*;
