//! Defines the Bevy [Plugin] wiring the placement engine into an [App]
//!

use crate::prelude::*;
use bevy::prelude::*;

pub mod sound_layer;

/// Registers the placement types and keeps the footstep cues of every
/// [PlacementGrid] flowing to the audio layer as events
pub struct PlacementGridPlugin;

impl Plugin for PlacementGridPlugin {
	fn build(&self, app: &mut App) {
		app.register_type::<Move>()
			.register_type::<FigureKind>()
			.register_type::<PathingFrame>()
			.register_type::<PlacementPathing>()
			.register_type::<ClipKind>()
			.register_type::<EventFootstepCue>()
			.add_event::<EventFootstepCue>()
			.add_systems(Update, sound_layer::flush_footstep_cues);
	}
}
