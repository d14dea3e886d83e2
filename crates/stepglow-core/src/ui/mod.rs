//! Rendering helpers for `embedded-graphics` targets.

pub mod step_grid;

pub use step_grid::StepGrid;
