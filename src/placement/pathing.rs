//! Computes the on-screen waypoints a figure visits while walking from its
//! old slot to a freshly drawn one, possibly crossing onto a neighbouring
//! surface. The two 5x5 grids involved are stitched into one combined cell
//! space by travel direction (the same grid twice for a spawn or an in-place
//! move), and every stitched row is split into two half-rows because a
//! figure's footprint is roughly half as tall as it is wide: the upper half
//! of each row is tile territory, the lower half unit territory.
//!
//! Travelling east, with `o` the old slot and `n` the new one:
//!
//! ```text
//!  source grid                   destination grid
//!  ___________________________   ___________________________
//! |     |     |     |     |    | |     |     |     |     |    |
//! |_____|_____|_____|__o__|____|_|_____|_____|_____|_____|____|
//! |     |     |     |     |      |     |  n  |     |     |    |
//! |_____|_____|_____|_____|______|_____|_____|_____|_____|____|
//! ```
//!
//! A weighted breadth-first flood expands outward from the old slot with
//! three time-delay queues: stepping to a vertical neighbour costs one tick,
//! stepping to a horizontal neighbour costs two, modelling the skewed
//! footprint. Walking the flood backward from the destination picks, at every
//! cell, a random one of the cheapest predecessors, so equally short walks do
//! not all take the same robotic line.
//!

use std::sync::{Arc, Mutex};

use crate::prelude::*;
use bevy::prelude::*;
use rand::seq::SliceRandom;
use rand::Rng;

/// Pixel position of one step of a walk plus the relative time the step
/// takes, a pacing unit for interpolation rather than wall-clock time
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[derive(Clone, Copy, PartialEq, Eq, Debug, Reflect)]
pub struct PathingFrame {
	/// Screen position the figure passes through
	pub point: IVec2,
	/// Relative time spent reaching this point from the previous one
	pub delay: u8,
}

/// Ordered waypoints a renderer interpolates to move a figure smoothly. The
/// projected origin and destination cells themselves are never recorded, the
/// final frame is the landing point inside the destination box
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[derive(Clone, Debug, Default, Reflect)]
pub struct PlacementPathing {
	/// The walk, in travel order
	frames: Vec<PathingFrame>,
}

impl PlacementPathing {
	/// Append a frame to the walk
	pub fn push(&mut self, frame: PathingFrame) {
		self.frames.push(frame);
	}
	/// The recorded walk, in travel order
	pub fn frames(&self) -> &[PathingFrame] {
		&self.frames
	}
	/// Whether any walk was recorded
	pub fn is_empty(&self) -> bool {
		self.frames.is_empty()
	}
	/// Number of recorded frames
	pub fn count(&self) -> usize {
		self.frames.len()
	}
	/// Summed relative time of the whole walk
	pub fn total_delay(&self) -> u32 {
		self.frames.iter().map(|frame| u32::from(frame.delay)).sum()
	}
	/// Forget any recorded walk
	pub fn clear(&mut self) {
		self.frames.clear();
	}
}

/// Sound clips the placement engine may cue
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[derive(Clone, Copy, PartialEq, Eq, Debug, Reflect)]
pub enum ClipKind {
	/// Marching feet, cued once per computed walk
	SoldierWalk,
}

/// A request for the audio layer, one is queued for every computed walk
#[derive(Event, Clone, Copy, PartialEq, Debug, Reflect)]
pub struct EventFootstepCue {
	/// Clip to play
	clip: ClipKind,
	/// Playback volume offset
	volume: f32,
}

impl EventFootstepCue {
	/// The cue produced by a walking figure
	pub fn soldier_walk() -> Self {
		EventFootstepCue {
			clip: ClipKind::SoldierWalk,
			volume: 0.0,
		}
	}
	/// Clip to play
	pub fn clip(&self) -> ClipKind {
		self.clip
	}
	/// Playback volume offset
	pub fn volume(&self) -> f32 {
		self.volume
	}
}

/// Per-walk context threaded through a chain of placement calls so that
/// figures moving as one group share a travel direction and know about each
/// other's claims
#[derive(Clone, Debug, Default)]
pub struct PlacementPather {
	/// Direction the group travels
	direction: Move,
	/// Slots already granted to figures of the same group; these are carved
	/// back out of the blocked cells so later members path straight through
	/// their mates
	claimed: Vec<u8>,
}

impl PlacementPather {
	/// Create a context for a group travelling in `direction`
	pub fn new(direction: Move) -> Self {
		PlacementPather {
			direction,
			claimed: Vec::new(),
		}
	}
	/// Direction the group travels
	pub fn direction(&self) -> Move {
		self.direction
	}
	/// Record a slot granted to a member of the group
	pub fn claim(&mut self, index: u8) {
		self.claimed.push(index);
	}
	/// Slots granted to members of the group so far
	pub fn claimed_slots(&self) -> &[u8] {
		&self.claimed
	}
}

/// Placement of one grid inside the stitched cell space, along with the
/// slots on it that live figures currently occupy
struct SheetView {
	/// Whole-cell row offset of the grid inside the stitched space
	row_offset: usize,
	/// Whole-cell column offset of the grid inside the stitched space
	col_offset: usize,
	/// Top-left pixel corner of the grid's surface
	origin: IVec2,
	/// Pixel dimensions of the grid's surface
	size: IVec2,
	/// Tile slots claimed by live figures
	claimed_tiles: Vec<u8>,
	/// Unit slots claimed by live figures
	claimed_units: Vec<u8>,
}

impl SheetView {
	/// Stitched `(half-row, column)` of the tile lane of a slot
	fn tile_cell(&self, index: u8) -> (usize, usize) {
		(
			2 * (usize::from(slot_row(index)) + self.row_offset),
			usize::from(slot_column(index)) + self.col_offset,
		)
	}
	/// Stitched `(half-row, column)` of the unit lane of a slot
	fn unit_cell(&self, index: u8) -> (usize, usize) {
		let (half_row, column) = self.tile_cell(index);
		(half_row + 1, column)
	}
}

/// The combined walkable space of two stitched grids, split into half-rows
struct StitchedGrid {
	/// Number of half-rows
	half_rows: usize,
	/// Number of columns
	columns: usize,
	/// Which cells a walk may pass through
	open: Vec<bool>,
	/// Relative time to reach each cell from the walk's origin, `u16::MAX`
	/// until the flood arrives
	dist: Vec<u16>,
}

impl StitchedGrid {
	/// A fully open space of the given dimensions
	fn new(half_rows: usize, columns: usize) -> Self {
		StitchedGrid {
			half_rows,
			columns,
			open: vec![true; half_rows * columns],
			dist: vec![u16::MAX; half_rows * columns],
		}
	}
	/// Flat offset of a `(half-row, column)` cell
	fn at(&self, cell: (usize, usize)) -> usize {
		cell.0 * self.columns + cell.1
	}
	/// Whether a walk may pass through the cell
	fn is_open(&self, cell: (usize, usize)) -> bool {
		self.open[self.at(cell)]
	}
	/// Mark a cell walkable or blocked
	fn set_open(&mut self, cell: (usize, usize), value: bool) {
		let at = self.at(cell);
		self.open[at] = value;
	}
	/// Relative time to reach the cell from the flood origin
	fn time_to(&self, cell: (usize, usize)) -> u16 {
		self.dist[self.at(cell)]
	}
	/// Block every cell of the view that a live figure occupies
	fn close_claimed(&mut self, view: &SheetView) {
		for &index in &view.claimed_tiles {
			self.set_open(view.tile_cell(index), false);
		}
		for &index in &view.claimed_units {
			self.set_open(view.unit_cell(index), false);
		}
	}
	/// Vertical neighbours of a cell, reached in one tick
	fn vertical_neighbours(&self, cell: (usize, usize)) -> Vec<(usize, usize)> {
		let mut neighbours = Vec::new();
		if cell.0 > 0 {
			neighbours.push((cell.0 - 1, cell.1));
		}
		if cell.0 < self.half_rows - 1 {
			neighbours.push((cell.0 + 1, cell.1));
		}
		neighbours
	}
	/// Horizontal neighbours of a cell, reached in two ticks
	fn horizontal_neighbours(&self, cell: (usize, usize)) -> Vec<(usize, usize)> {
		let mut neighbours = Vec::new();
		if cell.1 > 0 {
			neighbours.push((cell.0, cell.1 - 1));
		}
		if cell.1 < self.columns - 1 {
			neighbours.push((cell.0, cell.1 + 1));
		}
		neighbours
	}
	/// Expand a weighted flood outward from `origin`, filling in the relative
	/// time to reach every open cell. Three queues stagger the expansion:
	/// vertical steps land in the next tick, horizontal steps in the one after
	fn flood(&mut self, origin: (usize, usize)) {
		let start = self.at(origin);
		self.dist[start] = 0;
		let mut now = vec![origin];
		let mut soon: Vec<(usize, usize)> = Vec::new();
		let mut later: Vec<(usize, usize)> = Vec::new();
		let mut time: u16 = 0;
		while !now.is_empty() || !soon.is_empty() || !later.is_empty() {
			for at in 0..now.len() {
				let cell = now[at];
				if self.time_to(cell) != time {
					// a cheaper arrival superseded this entry
					continue;
				}
				for next in self.vertical_neighbours(cell) {
					if self.is_open(next) && self.time_to(next) > time + 1 {
						let offset = self.at(next);
						self.dist[offset] = time + 1;
						soon.push(next);
					}
				}
				for next in self.horizontal_neighbours(cell) {
					if self.is_open(next) && self.time_to(next) > time + 2 {
						let offset = self.at(next);
						self.dist[offset] = time + 2;
						later.push(next);
					}
				}
			}
			now = std::mem::take(&mut soon);
			soon = std::mem::take(&mut later);
			time += 1;
		}
	}
	/// Walk the flood backward from `destination` to the origin, one cheapest
	/// predecessor at a time with ties broken at random. Returns the walk in
	/// reverse travel order. A blocked destination yields whatever fragment
	/// was gathered before the walk ran dry, callers degrade to a shorter or
	/// empty walk rather than failing
	fn rebuild(&self, destination: (usize, usize), rng: &mut impl Rng) -> Vec<(usize, usize)> {
		let mut record = vec![destination];
		let mut current = destination;
		while self.time_to(current) != 0 {
			let mut nearer: Vec<(usize, usize)> = Vec::new();
			for next in self
				.vertical_neighbours(current)
				.into_iter()
				.chain(self.horizontal_neighbours(current))
			{
				if self.is_open(next)
					&& !record.contains(&next)
					&& self.time_to(next) < self.time_to(current)
				{
					nearer.push(next);
				}
			}
			if nearer.is_empty() {
				break;
			}
			// shuffle first so the stable sort keeps a random order among
			// equally cheap predecessors
			nearer.shuffle(rng);
			nearer.sort_by_key(|&next| self.time_to(next));
			current = nearer[0];
			record.push(current);
		}
		record
	}
}

/// Slots of `possible` that no free pool still holds, meaning a live figure
/// occupies them
fn claimed_slots(
	possible: &[u8],
	first: &Arc<Mutex<PlacementLayer>>,
	second: &Arc<Mutex<PlacementLayer>>,
) -> Vec<u8> {
	let first = first.lock().expect("placement pool lock poisoned");
	let second = second.lock().expect("placement pool lock poisoned");
	possible
		.iter()
		.copied()
		.filter(|index| !first.contains(index) && !second.contains(index))
		.collect()
}

/// Project a stitched cell back onto the screen. The owning grid's actual
/// pixel dimensions drive the scaling because surfaces are not always an
/// exact multiple of the grid resolution wide, and the vertical offset
/// alternates between two fixed fractions of the cell height by lane,
/// simulating footfall stagger
fn project(source: &SheetView, destination: &SheetView, cell: (usize, usize)) -> IVec2 {
	let (near, far) = if source.row_offset + source.col_offset > 0 {
		(destination, source)
	} else {
		(source, destination)
	};
	let view = if cell.1 >= far.col_offset && cell.0 >= 2 * far.row_offset {
		far
	} else {
		near
	};
	let resolution = GRID_RESOLUTION as i32;
	let column = (cell.1 - view.col_offset) as i32;
	let half_row = (cell.0 - 2 * view.row_offset) as i32;
	let row = half_row / 2;
	let left = view.origin.x + column * view.size.x / resolution;
	let right = view.origin.x + (column + 1) * view.size.x / resolution;
	let top = view.origin.y + row * view.size.y / resolution;
	let bottom = view.origin.y + (row + 1) * view.size.y / resolution;
	let height = bottom - top;
	let y = if half_row % 2 == 0 {
		top + 3 * height / 10
	} else {
		top + 7 * height / 10
	};
	IVec2::new((left + right) / 2, y)
}

impl PlacementGrid {
	/// Occupancy view of this grid placed at the given whole-cell offsets
	/// inside a stitched space
	fn claimed_view(&self, row_offset: usize, col_offset: usize) -> SheetView {
		SheetView {
			row_offset,
			col_offset,
			origin: self.origin(),
			size: self.size(),
			claimed_tiles: claimed_slots(
				self.possible_tile_slots(),
				self.tile_primary(),
				self.tile_secondary(),
			),
			claimed_units: claimed_slots(
				self.possible_unit_slots(),
				self.unit_primary(),
				self.unit_secondary(),
			),
		}
	}
	/// Fill `placement.pathing()` with the walk from the slot `old_index`
	/// into the box, where the old slot lives on `other` when the figure
	/// crosses a surface boundary and on this grid when [None]. Also queues
	/// one footstep cue for the audio layer. A box that owns no slot, or a
	/// nonsensical old slot, leaves the walk empty
	pub fn add_pathing(
		&mut self,
		placement: &mut PlacementBox,
		old_index: u8,
		pather: &PlacementPather,
		other: Option<&PlacementGrid>,
	) {
		if !placement.is_placed() || usize::from(old_index) >= CELL_COUNT {
			warn!(
				"cannot compute a walk from slot {} into slot {}",
				old_index,
				placement.index()
			);
			return;
		}
		self.route(
			placement,
			old_index,
			pather.direction(),
			pather.claimed_slots(),
			other,
			false,
		);
	}
	/// Variant of [PlacementGrid::add_pathing] for a figure produced by a
	/// building rather than moved: the walk has no direction and gets one
	/// extra half-row of headroom below the grid, because production
	/// buildings occupy the bottom of their cell and the newborn figure
	/// starts underneath it
	pub fn spawn_pathing(
		&mut self,
		placement: &mut PlacementBox,
		old_index: u8,
		pather: &PlacementPather,
	) {
		if !placement.is_placed() || usize::from(old_index) >= CELL_COUNT {
			warn!(
				"cannot compute a spawn walk from slot {} into slot {}",
				old_index,
				placement.index()
			);
			return;
		}
		self.route(
			placement,
			old_index,
			Move::Spawn,
			pather.claimed_slots(),
			None,
			true,
		);
	}
	/// Stitch, flood, rebuild and project one walk into `placement`
	fn route(
		&mut self,
		placement: &mut PlacementBox,
		old_index: u8,
		direction: Move,
		group_claims: &[u8],
		other: Option<&PlacementGrid>,
		headroom: bool,
	) {
		let resolution = GRID_RESOLUTION;
		// whole-cell offsets of the source and destination grids and the
		// stitched dimensions, by travel direction
		let (source_offset, destination_offset, rows, columns) = match direction {
			Move::East => ((0, 0), (0, resolution), resolution, 2 * resolution),
			Move::West => ((0, resolution), (0, 0), resolution, 2 * resolution),
			Move::South => ((0, 0), (resolution, 0), 2 * resolution, resolution),
			Move::North => ((resolution, 0), (0, 0), 2 * resolution, resolution),
			Move::Spawn => ((0, 0), (0, 0), resolution, resolution),
		};
		let source_view = match other {
			Some(grid) => grid.claimed_view(source_offset.0, source_offset.1),
			None => self.claimed_view(source_offset.0, source_offset.1),
		};
		let destination_view = self.claimed_view(destination_offset.0, destination_offset.1);

		let half_rows = 2 * rows + usize::from(headroom);
		let mut stitched = StitchedGrid::new(half_rows, columns);
		stitched.close_claimed(&source_view);
		stitched.close_claimed(&destination_view);
		// figures of the same group do not avoid each other
		// TODO: model group mates as soft obstacles instead of reopening their cells
		for &index in group_claims {
			stitched.set_open(destination_view.unit_cell(index), true);
		}
		let mut origin = source_view.unit_cell(old_index);
		if headroom {
			// start underneath the producing building
			origin.0 += 1;
		}
		let destination = destination_view.unit_cell(placement.index());
		stitched.set_open(origin, true);
		stitched.set_open(destination, true);

		stitched.flood(origin);
		let mut forward = stitched.rebuild(destination, self.rng_mut());
		forward.reverse();

		let mut frames = Vec::new();
		for step in 1..forward.len() {
			let delay = (stitched.time_to(forward[step]) - stitched.time_to(forward[step - 1])) as u8;
			let point = if step < forward.len() - 1 {
				project(&source_view, &destination_view, forward[step])
			} else {
				// the walk ends at the landing point inside the new box, the
				// projected destination cell itself is never recorded
				placement.random(self.rng_mut())
			};
			frames.push(PathingFrame { point, delay });
		}
		let pathing = placement.pathing_mut();
		pathing.clear();
		for frame in frames {
			pathing.push(frame);
		}
		self.queue_footstep(EventFootstepCue::soldier_walk());
	}
}
