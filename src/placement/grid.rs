//! A [PlacementGrid] partitions one surface into a `5x5` grid of placement
//! cells and hands them out as [PlacementBox] claims, one pool per figure
//! category. The constructor solves four interacting layout rules at once,
//! using deterministic formulas where neighbouring surfaces must agree and
//! randomized draws where repeated surfaces of the same type must not look
//! identical:
//!
//! 1. **Visibility** - a tall tile figure occupies its cell plus the cell
//!    above it, so the cell above every tile placement is withheld from both
//!    the tile and the unit pools.
//! 2. **Readability** - the guide stamp covers the bottom-left cell, which is
//!    withheld from the unit pools, and neither the top nor the bottom tile
//!    placement may sit in the left-most column.
//! 3. **Sudoku** - no two tile placements share a column, so tall figures
//!    come out staggered instead of aligned.
//! 4. **No-Clipping** - the tower and bridge reference cells are fixed by
//!    formulas of the surface's map coordinates alone, so adjacent surfaces
//!    agree on where figures wider than one cell meet without ever seeing
//!    each other's state.
//!
//! An example layout (`T` tile placement, `x` withheld for visibility, `G`
//! guide stamp, `a` air slot, the rest unit cells):
//!
//! ```text
//!  _____________________________
//! |     |  T  |     |  x  |     |
//! |_____|_____|_____|_____|_____|
//! |  x  |     |     |  T  |     |
//! |_____|_____|_____|_____|_____|
//! |  T  |  a  |  a  |     |  x  |
//! |_____|_____|_____|_____|_____|
//! |     |     |  x  |     |  T  |
//! |_____|_____|_____|_____|_____|
//! |  G  |     |  T  |     |     |
//! |_____|_____|_____|_____|_____|
//! ```
//!

use std::sync::{Arc, Mutex};

use crate::prelude::*;
use bevy::prelude::*;
use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

/// Column of the tile placement in the top row of the surface at the given
/// map coordinates. The formula is collision-free by construction: vertically
/// adjacent surfaces always produce different columns, so a surface can
/// account for the tower of the surface below it without inspecting it.
/// `rem_euclid` keeps the period-4 progression intact for surfaces at
/// negative map coordinates
pub fn tower_column(map_row: i32, map_column: i32) -> u8 {
	1 + (map_row + 3 * map_column).rem_euclid(4) as u8
}

/// Row of the bridge tile on the boundary at the west edge of the surface at
/// the given map coordinates. Horizontally adjacent surfaces always produce
/// different rows, and both sides of a boundary evaluate the same expression,
/// so wide figures meet at the same row on either side. `rem_euclid` keeps
/// the period-3 progression intact for negative map coordinates
pub fn bridge_row(map_row: i32, map_column: i32) -> u8 {
	1 + (2 * map_row + map_column).rem_euclid(3) as u8
}

/// Remove a specific value from a candidate bag if it is still present
fn take(bag: &mut PlacementLayer, value: u8, rng: &mut impl Rng) -> Option<u8> {
	for position in 0..bag.count() {
		if bag.inspect(position) == Some(&value) {
			bag.select(position);
			return bag.pop(rng);
		}
	}
	None
}

/// Owns the placement geometry and the six slot pools of one surface.
/// Created once when the surface is built; afterwards only pool draws and
/// returns mutate it
#[derive(Component, Debug)]
pub struct PlacementGrid {
	/// Top-left pixel corner of the surface
	origin: IVec2,
	/// Pixel dimensions of the surface
	size: IVec2,
	/// Vertical map coordinate, derived from the pixel origin
	map_row: i32,
	/// Horizontal map coordinate, derived from the pixel origin
	map_column: i32,
	/// Preferred tile slots, interior columns
	tile_primary: Arc<Mutex<PlacementLayer>>,
	/// Fallback tile slots, edge columns
	tile_secondary: Arc<Mutex<PlacementLayer>>,
	/// Preferred unit slots, interior columns clear of overhang warnings
	unit_primary: Arc<Mutex<PlacementLayer>>,
	/// Fallback unit slots, edge columns or cells under a possible overhang
	unit_secondary: Arc<Mutex<PlacementLayer>>,
	/// Slots for airborne figures
	air: Arc<Mutex<PlacementLayer>>,
	/// Slots for fence and barrier figures
	fence: Arc<Mutex<PlacementLayer>>,
	/// Every slot index that was ever set aside for tile figures, pool state
	/// aside; lets pathing reconstruct occupancy without tracking live boxes
	possible_tiles: Vec<u8>,
	/// Every slot index that was ever set aside for unit figures
	possible_units: Vec<u8>,
	/// Randomness source for draws, layout and pathing tie-breaks
	rng: ChaCha8Rng,
	/// Footstep cues produced by pathing, drained by the plugin layer
	pending_cues: Vec<EventFootstepCue>,
}

impl PlacementGrid {
	/// Build the placement grid of the surface whose top-left pixel corner is
	/// `origin` and whose pixel dimensions are `size`. The map coordinates
	/// steering the tower and bridge formulas are derived from the origin, so
	/// grids of adjacent surfaces agree on their shared reference cells.
	/// Panics when `size` is not strictly positive
	pub fn new(origin: IVec2, size: IVec2, seed: u64) -> Self {
		if size.x <= 0 || size.y <= 0 {
			panic!(
				"Cannot build a placement grid for a surface sized ({}, {}), dimensions must be positive",
				size.x, size.y
			);
		}
		let map_column = origin.x.div_euclid(size.x);
		let map_row = origin.y.div_euclid(size.y);
		let mut rng = ChaCha8Rng::seed_from_u64(seed);

		let our_tower = tower_column(map_row, map_column);
		let their_tower = tower_column(map_row + 1, map_column);
		let our_bridge = bridge_row(map_row, map_column);
		let their_bridge = bridge_row(map_row, map_column + 1);

		// the bottom tower may not hide behind our own tower, may not hide the
		// tower of the surface below, and stays out of the left-most column
		let mut candidates = PlacementLayer::new();
		for column in 1..GRID_RESOLUTION as u8 {
			if column != our_tower && column != their_tower {
				candidates.push(column);
			}
		}
		let bottom_tower = candidates
			.pop(&mut rng)
			.expect("two towers occupy at most two of columns 1-4");

		let mut tile_columns = [0u8; GRID_RESOLUTION];
		tile_columns[0] = our_tower;
		tile_columns[GRID_RESOLUTION - 1] = bottom_tower;

		// interior rows draw from the columns the towers left over
		candidates.clear();
		for column in 0..GRID_RESOLUTION as u8 {
			if column != our_tower && column != bottom_tower {
				candidates.push(column);
			}
		}
		// towers pinned to opposite extremes read as a perfect diagonal, which
		// looks unnatural; scatter the bridge rows instead of pinning them
		let scatter_bridges = our_tower == 0 && bottom_tower == GRID_RESOLUTION as u8 - 1;
		let mut interior = [None::<u8>; GRID_RESOLUTION - 2];
		if !scatter_bridges {
			interior[(our_bridge - 1) as usize] = take(&mut candidates, 0, &mut rng);
			interior[(their_bridge - 1) as usize] =
				take(&mut candidates, GRID_RESOLUTION as u8 - 1, &mut rng);
		}
		for (offset, pinned) in interior.iter().enumerate() {
			tile_columns[offset + 1] = pinned.unwrap_or_else(|| {
				candidates
					.pop(&mut rng)
					.expect("a free column remains for every interior row")
			});
		}

		let mut reserved = [false; CELL_COUNT];
		let mut warned = [false; CELL_COUNT];
		let mut possible_tiles = Vec::new();
		let mut tile_primary = PlacementLayer::new();
		let mut tile_secondary = PlacementLayer::new();
		for row in 0..GRID_RESOLUTION as u8 {
			let column = tile_columns[row as usize];
			let index = slot_index(row, column);
			possible_tiles.push(index);
			if (1..GRID_RESOLUTION as u8 - 1).contains(&column) {
				tile_primary.push(index);
			} else {
				tile_secondary.push(index);
			}
			reserved[index as usize] = true;
			if row >= 1 {
				// the cell a tall figure grows into
				reserved[slot_index(row - 1, column) as usize] = true;
			}
			if row >= 2 {
				// a tile figure of the surface below may protrude this far up
				warned[slot_index(row - 2, column) as usize] = true;
			}
		}

		// the guide stamp overlay owns the bottom-left cell
		reserved[slot_index(GRID_RESOLUTION as u8 - 1, 0) as usize] = true;

		// two air slots around the grid center; airborne figures may overlap
		// tile figures, and two slots allow a visible mid-air collision
		let mut air = PlacementLayer::new();
		let center_cell = slot_index(2, 2);
		let beside = if rng.random_range(0..2) == 0 {
			slot_index(2, 1)
		} else {
			slot_index(2, 3)
		};
		air.push(center_cell);
		air.push(beside);
		reserved[center_cell as usize] = true;
		reserved[beside as usize] = true;

		// fences hang from the bottom edge of the bottom tower's cell
		let mut fence = PlacementLayer::new();
		fence.push(slot_index(GRID_RESOLUTION as u8 - 1, bottom_tower));

		// everything not reserved is a unit cell
		let mut possible_units = Vec::new();
		let mut unit_primary = PlacementLayer::new();
		let mut unit_secondary = PlacementLayer::new();
		for index in 0..CELL_COUNT as u8 {
			if reserved[index as usize] {
				continue;
			}
			possible_units.push(index);
			let column = slot_column(index);
			if (1..GRID_RESOLUTION as u8 - 1).contains(&column) && !warned[index as usize] {
				unit_primary.push(index);
			} else {
				unit_secondary.push(index);
			}
		}

		PlacementGrid {
			origin,
			size,
			map_row,
			map_column,
			tile_primary: Arc::new(Mutex::new(tile_primary)),
			tile_secondary: Arc::new(Mutex::new(tile_secondary)),
			unit_primary: Arc::new(Mutex::new(unit_primary)),
			unit_secondary: Arc::new(Mutex::new(unit_secondary)),
			air: Arc::new(Mutex::new(air)),
			fence: Arc::new(Mutex::new(fence)),
			possible_tiles,
			possible_units,
			rng,
			pending_cues: Vec::new(),
		}
	}
	/// Top-left pixel corner of the surface
	pub fn origin(&self) -> IVec2 {
		self.origin
	}
	/// Pixel dimensions of the surface
	pub fn size(&self) -> IVec2 {
		self.size
	}
	/// Pixel center of the surface
	pub fn center(&self) -> IVec2 {
		self.origin + self.size / 2
	}
	/// Vertical map coordinate of the surface
	pub fn map_row(&self) -> i32 {
		self.map_row
	}
	/// Horizontal map coordinate of the surface
	pub fn map_column(&self) -> i32 {
		self.map_column
	}
	/// Preferred tile pool
	pub fn tile_primary(&self) -> &Arc<Mutex<PlacementLayer>> {
		&self.tile_primary
	}
	/// Fallback tile pool
	pub fn tile_secondary(&self) -> &Arc<Mutex<PlacementLayer>> {
		&self.tile_secondary
	}
	/// Preferred unit pool
	pub fn unit_primary(&self) -> &Arc<Mutex<PlacementLayer>> {
		&self.unit_primary
	}
	/// Fallback unit pool
	pub fn unit_secondary(&self) -> &Arc<Mutex<PlacementLayer>> {
		&self.unit_secondary
	}
	/// Pool of airborne slots
	pub fn air(&self) -> &Arc<Mutex<PlacementLayer>> {
		&self.air
	}
	/// Pool of fence slots
	pub fn fence(&self) -> &Arc<Mutex<PlacementLayer>> {
		&self.fence
	}
	/// Every slot index ever set aside for tile figures
	pub fn possible_tile_slots(&self) -> &[u8] {
		&self.possible_tiles
	}
	/// Every slot index ever set aside for unit figures
	pub fn possible_unit_slots(&self) -> &[u8] {
		&self.possible_units
	}
	/// Pixel corners of the cell at `(row, column)`. Surfaces are not always
	/// an exact multiple of the grid resolution in pixels, the remainder is
	/// spread evenly across the cells
	pub fn cell_bounds(&self, row: u8, column: u8) -> (IVec2, IVec2) {
		let resolution = GRID_RESOLUTION as i32;
		let left = self.origin.x + i32::from(column) * self.size.x / resolution;
		let right = self.origin.x + (i32::from(column) + 1) * self.size.x / resolution;
		let top = self.origin.y + i32::from(row) * self.size.y / resolution;
		let bottom = self.origin.y + (i32::from(row) + 1) * self.size.y / resolution;
		(IVec2::new(left, top), IVec2::new(right, bottom))
	}
	/// Draw a free slot for a figure of the given category, preferring the
	/// primary pool of the category where one exists. When every pool of the
	/// category is exhausted this logs an error and returns the sentinel box,
	/// callers render such figures without a slot rather than failing
	pub fn place(&mut self, kind: FigureKind) -> PlacementBox {
		let drawn = match kind {
			FigureKind::Tile => {
				let first = self.tile_primary.clone();
				let second = self.tile_secondary.clone();
				self.draw(&first).or_else(|| self.draw(&second))
			}
			FigureKind::Ground | FigureKind::Bypass => {
				let first = self.unit_primary.clone();
				let second = self.unit_secondary.clone();
				self.draw(&first).or_else(|| self.draw(&second))
			}
			FigureKind::Air => {
				let pool = self.air.clone();
				self.draw(&pool)
			}
			FigureKind::Fence => {
				let pool = self.fence.clone();
				self.draw(&pool)
			}
			FigureKind::None => None,
		};
		match drawn {
			Some(placement) => placement,
			None => {
				error!("no more placements available for {:?} figures", kind);
				PlacementBox::unplaced()
			}
		}
	}
	/// Draw a slot for a figure that is walking over from the slot
	/// `old_index`, which lives on `other` when the figure crosses a surface
	/// boundary and on this grid when [None]. Walking categories get the free
	/// slot whose row (east/west travel) or column (north/south travel and
	/// spawns) lies closest to the old slot, keeping the figure's screen
	/// offset visually continuous, and their box comes back with the pathing
	/// waypoints already attached. Categories that do not walk fall back to a
	/// fresh random draw
	pub fn place_from(
		&mut self,
		kind: FigureKind,
		old_index: u8,
		pather: &mut PlacementPather,
		other: Option<&PlacementGrid>,
	) -> PlacementBox {
		if !kind.walks() {
			return self.place(kind);
		}
		let pool = if !pool_is_empty(&self.unit_primary) {
			self.unit_primary.clone()
		} else if !pool_is_empty(&self.unit_secondary) {
			self.unit_secondary.clone()
		} else {
			error!("no more placements available for {:?} figures", kind);
			return PlacementBox::unplaced();
		};
		{
			let mut guard = pool.lock().expect("placement pool lock poisoned");
			let mut best_at = 0;
			let mut best_score = i32::MAX;
			for position in 0..guard.count() {
				if let Some(&index) = guard.inspect(position) {
					let score = match pather.direction() {
						Move::East | Move::West => {
							(i32::from(slot_row(index)) - i32::from(slot_row(old_index))).abs()
						}
						Move::North | Move::South | Move::Spawn => {
							(i32::from(slot_column(index)) - i32::from(slot_column(old_index)))
								.abs()
						}
					};
					// first-found minimum wins ties
					if score < best_score {
						best_score = score;
						best_at = position;
					}
				}
			}
			guard.select(best_at);
		}
		let mut placement = match self.draw(&pool) {
			Some(placement) => placement,
			None => {
				error!("no more placements available for {:?} figures", kind);
				return PlacementBox::unplaced();
			}
		};
		pather.claim(placement.index());
		self.add_pathing(&mut placement, old_index, pather, other);
		placement
	}
	/// Pop an index from `pool` and wrap it in a claimed box
	fn draw(&mut self, pool: &Arc<Mutex<PlacementLayer>>) -> Option<PlacementBox> {
		let index = pool
			.lock()
			.expect("placement pool lock poisoned")
			.pop(&mut self.rng)?;
		Some(self.claim(pool, index))
	}
	/// Build the claimed box for `index`, resolving its pixel rectangle
	fn claim(&self, pool: &Arc<Mutex<PlacementLayer>>, index: u8) -> PlacementBox {
		let (top_left, bottom_right) = self.cell_bounds(slot_row(index), slot_column(index));
		PlacementBox::claimed(pool, index, top_left, bottom_right, self.center())
	}
	/// Randomness source shared by draws and pathing
	pub(crate) fn rng_mut(&mut self) -> &mut ChaCha8Rng {
		&mut self.rng
	}
	/// Record a footstep cue for the plugin layer to flush
	pub(crate) fn queue_footstep(&mut self, cue: EventFootstepCue) {
		self.pending_cues.push(cue);
	}
	/// Hand over and forget the footstep cues gathered since the last drain
	pub fn drain_footstep_cues(&mut self) -> Vec<EventFootstepCue> {
		std::mem::take(&mut self.pending_cues)
	}
}

/// Whether a pool has been exhausted
fn pool_is_empty(pool: &Arc<Mutex<PlacementLayer>>) -> bool {
	pool.lock().map(|guard| guard.is_empty()).unwrap_or(true)
}

#[cfg(test)]
mod tests {
	use super::*;

	/// Collect the contents of a pool without disturbing it
	fn pool_contents(pool: &Arc<Mutex<PlacementLayer>>) -> Vec<u8> {
		let guard = pool.lock().unwrap();
		(0..guard.count())
			.map(|position| *guard.inspect(position).unwrap())
			.collect()
	}

	fn fresh_grid(seed: u64) -> PlacementGrid {
		PlacementGrid::new(IVec2::new(0, 0), IVec2::new(180, 120), seed)
	}

	#[test]
	fn tower_and_bridge_at_the_map_corner() {
		let result = (tower_column(0, 0), bridge_row(0, 0));
		let actual = (1, 1);
		assert_eq!(actual, result);
	}
	#[test]
	fn vertically_adjacent_towers_never_collide() {
		for map_row in -6..6 {
			for map_column in -6..6 {
				assert_ne!(
					tower_column(map_row, map_column),
					tower_column(map_row + 1, map_column)
				);
			}
		}
	}
	#[test]
	fn horizontally_adjacent_bridges_never_collide() {
		for map_row in -6..6 {
			for map_column in -6..6 {
				assert_ne!(
					bridge_row(map_row, map_column),
					bridge_row(map_row, map_column + 1)
				);
			}
		}
	}
	#[test]
	fn formulas_keep_their_period_across_the_map_edge() {
		// the progressions must continue seamlessly into negative coordinates
		for map_row in -6..6 {
			for map_column in -6..6 {
				assert_eq!(
					tower_column(map_row, map_column),
					tower_column(map_row + 4, map_column)
				);
				assert_eq!(
					bridge_row(map_row, map_column),
					bridge_row(map_row + 3, map_column)
				);
				assert_eq!(
					tower_column(map_row, map_column),
					tower_column(map_row, map_column + 4)
				);
				assert_eq!(
					bridge_row(map_row, map_column),
					bridge_row(map_row, map_column + 3)
				);
			}
		}
	}
	#[test]
	fn towers_avoid_the_left_most_column() {
		for map_row in -6..6 {
			for map_column in -6..6 {
				assert!(tower_column(map_row, map_column) >= 1);
				let row = bridge_row(map_row, map_column);
				assert!((1..=3).contains(&row));
			}
		}
	}
	#[test]
	#[should_panic]
	fn zero_sized_surface_is_rejected() {
		let _grid = PlacementGrid::new(IVec2::new(0, 0), IVec2::new(0, 120), 1);
	}
	#[test]
	fn map_coordinates_derive_from_the_origin() {
		let grid = PlacementGrid::new(IVec2::new(-180, 240), IVec2::new(180, 120), 1);
		assert_eq!(-1, grid.map_column());
		assert_eq!(2, grid.map_row());
	}
	#[test]
	fn tile_placements_never_share_a_column() {
		for seed in 0..16 {
			let grid = fresh_grid(seed);
			let tiles = grid.possible_tile_slots();
			assert_eq!(GRID_RESOLUTION, tiles.len());
			let mut columns: Vec<u8> = tiles.iter().map(|&index| slot_column(index)).collect();
			columns.sort_unstable();
			columns.dedup();
			assert_eq!(GRID_RESOLUTION, columns.len());
			// one placement per row
			let mut rows: Vec<u8> = tiles.iter().map(|&index| slot_row(index)).collect();
			rows.sort_unstable();
			assert_eq!(vec![0, 1, 2, 3, 4], rows);
		}
	}
	#[test]
	fn top_tower_obeys_the_formula() {
		for seed in 0..8 {
			let grid = fresh_grid(seed);
			let top = grid
				.possible_tile_slots()
				.iter()
				.copied()
				.find(|&index| slot_row(index) == 0)
				.unwrap();
			assert_eq!(tower_column(0, 0), slot_column(top));
		}
	}
	#[test]
	fn extreme_tile_rows_avoid_the_left_most_column() {
		for seed in 0..16 {
			let grid = fresh_grid(seed);
			for &index in grid.possible_tile_slots() {
				let row = slot_row(index);
				if row == 0 || row == GRID_RESOLUTION as u8 - 1 {
					assert_ne!(0, slot_column(index));
				}
			}
		}
	}
	#[test]
	fn bottom_tower_dodges_the_tower_of_the_surface_below() {
		for seed in 0..16 {
			let grid = fresh_grid(seed);
			let bottom = grid
				.possible_tile_slots()
				.iter()
				.copied()
				.find(|&index| slot_row(index) == GRID_RESOLUTION as u8 - 1)
				.unwrap();
			assert_ne!(tower_column(1, 0), slot_column(bottom));
		}
	}
	#[test]
	fn cells_above_tiles_are_withheld_from_every_pool() {
		for seed in 0..16 {
			let grid = fresh_grid(seed);
			for &index in grid.possible_tile_slots() {
				let row = slot_row(index);
				if row == 0 {
					continue;
				}
				let above = slot_index(row - 1, slot_column(index));
				assert!(!grid.possible_tile_slots().contains(&above));
				assert!(!grid.possible_unit_slots().contains(&above));
			}
		}
	}
	#[test]
	fn guide_stamp_cell_is_never_issued() {
		let guide = slot_index(GRID_RESOLUTION as u8 - 1, 0);
		for seed in 0..16 {
			let grid = fresh_grid(seed);
			assert!(!grid.possible_unit_slots().contains(&guide));
			assert!(!pool_contents(grid.unit_primary()).contains(&guide));
			assert!(!pool_contents(grid.unit_secondary()).contains(&guide));
		}
	}
	#[test]
	fn unit_pools_partition_the_leftover_cells() {
		for seed in 0..16 {
			let grid = fresh_grid(seed);
			let mut pooled = pool_contents(grid.unit_primary());
			pooled.extend(pool_contents(grid.unit_secondary()));
			pooled.sort_unstable();
			let mut expected = grid.possible_unit_slots().to_vec();
			expected.sort_unstable();
			assert_eq!(expected, pooled);
			// unit cells never overlap tiles, their headroom or the air slots
			for &index in grid.possible_unit_slots() {
				assert!(!grid.possible_tile_slots().contains(&index));
				assert!(!pool_contents(grid.air()).contains(&index));
			}
		}
	}
	#[test]
	fn air_pool_holds_two_center_row_slots() {
		for seed in 0..16 {
			let grid = fresh_grid(seed);
			let slots = pool_contents(grid.air());
			assert_eq!(2, slots.len());
			for &index in &slots {
				assert_eq!(2, slot_row(index));
			}
			assert!(slots.contains(&slot_index(2, 2)));
		}
	}
	#[test]
	fn fence_slot_sits_under_the_bottom_tower() {
		for seed in 0..16 {
			let grid = fresh_grid(seed);
			let slots = pool_contents(grid.fence());
			assert_eq!(1, slots.len());
			let bottom = grid
				.possible_tile_slots()
				.iter()
				.copied()
				.find(|&index| slot_row(index) == GRID_RESOLUTION as u8 - 1)
				.unwrap();
			assert_eq!(bottom, slots[0]);
		}
	}
	#[test]
	fn cell_bounds_spread_the_pixel_remainder() {
		let grid = PlacementGrid::new(IVec2::new(0, 0), IVec2::new(23, 13), 1);
		let mut width = 0;
		for column in 0..GRID_RESOLUTION as u8 {
			let (top_left, bottom_right) = grid.cell_bounds(0, column);
			width += bottom_right.x - top_left.x;
			assert!(bottom_right.x - top_left.x >= 4);
		}
		assert_eq!(23, width);
	}
	#[test]
	fn live_boxes_never_share_an_index() {
		let mut grid = fresh_grid(3);
		let mut boxes = Vec::new();
		loop {
			let placement = grid.place(FigureKind::Ground);
			if !placement.is_placed() {
				break;
			}
			boxes.push(placement);
		}
		let mut indices: Vec<u8> = boxes.iter().map(|placement| placement.index()).collect();
		let issued = indices.len();
		indices.sort_unstable();
		indices.dedup();
		assert_eq!(issued, indices.len());
		assert_eq!(grid.possible_unit_slots().len(), issued);
	}
	#[test]
	fn released_indices_come_back_around() {
		let mut grid = fresh_grid(9);
		let placement = grid.place(FigureKind::Ground);
		let index = placement.index();
		assert!(placement.is_placed());
		drop(placement);
		// rig the pool so the draw is deterministic
		let pool = grid.unit_primary().clone();
		{
			let mut guard = pool.lock().unwrap();
			let position = (0..guard.count())
				.find(|&position| guard.inspect(position) == Some(&index))
				.expect("released index returns to its pool");
			guard.select(position);
		}
		let reissued = grid.place(FigureKind::Ground);
		assert_eq!(index, reissued.index());
	}
	#[test]
	fn uncategorised_figures_get_the_sentinel() {
		let mut grid = fresh_grid(1);
		let placement = grid.place(FigureKind::None);
		assert!(!placement.is_placed());
		assert_eq!(UNPLACED, placement.index());
	}
	#[test]
	fn tile_draws_come_from_the_tile_slots() {
		let mut grid = fresh_grid(5);
		for _ in 0..GRID_RESOLUTION {
			let placement = grid.place(FigureKind::Tile);
			assert!(placement.is_placed());
			assert!(grid.possible_tile_slots().contains(&placement.index()));
			// keep the box alive by leaking it into the test scope
			std::mem::forget(placement);
		}
		let exhausted = grid.place(FigureKind::Tile);
		assert!(!exhausted.is_placed());
	}
}
