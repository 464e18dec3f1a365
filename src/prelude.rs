//! `use bevy_placement_grid_plugin::prelude::*;` to import common structures and methods
//!

#[doc(hidden)]
pub use crate::placement::{
	grid::*, pathing::*, placement_box::*, randomizer::*, utilities::*, *,
};

#[doc(hidden)]
pub use crate::plugin::{sound_layer::*, *};
