//! This is a plugin for the Bevy game engine to assign every visual figure of
//! a map surface a non-overlapping grid slot and to compute the walks figures
//! take when they relocate between slots
//!

pub mod placement;
pub mod plugin;

pub mod prelude;
