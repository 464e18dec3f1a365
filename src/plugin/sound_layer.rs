//! Forwards the footstep cues gathered by placement grids to the audio layer
//!

use crate::prelude::*;
use bevy::prelude::*;

/// Drain the cues every grid queued while computing walks this frame and
/// publish them as [EventFootstepCue] events for an audio system to consume
pub fn flush_footstep_cues(
	mut grid_q: Query<&mut PlacementGrid>,
	mut cues: EventWriter<EventFootstepCue>,
) {
	for mut grid in grid_q.iter_mut() {
		for cue in grid.drain_footstep_cues() {
			cues.write(cue);
		}
	}
}
