//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - column-oriented curve tables (`CurveTable`, `Series`)
//! - exact-x sample lookup (`SampleIndex`)
//! - matching outputs (`SelectionRecord`, `Assignment`, `Classification`)
//! - run configuration (`RunConfig`, `SampleConfig`)

pub mod types;

pub use types::*;
