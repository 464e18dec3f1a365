//! Assigns every visual figure of a surface a non-overlapping slot on the
//! surface's `5x5` placement grid, and computes the walks figures take when
//! they relocate between slots
//!

pub mod grid;
pub mod pathing;
pub mod placement_box;
pub mod randomizer;
pub mod utilities;
