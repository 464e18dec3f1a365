//! Shared structures and constants used by the placement grid and the pathing
//! routines
//!

use bevy::prelude::*;

/// Number of placement cells along one edge of a surface grid
pub const GRID_RESOLUTION: usize = 5;
/// Number of placement cells in a surface grid
pub const CELL_COUNT: usize = GRID_RESOLUTION * GRID_RESOLUTION;
/// Sentinel slot index carried by a [crate::prelude::PlacementBox] that could
/// not be backed by a pool (all pools for its category were empty)
pub const UNPLACED: u8 = 255;

/// Direction a figure travels when it relocates from one slot to another,
/// used to decide how two grids are stitched together for pathing
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default, Hash, Reflect)]
pub enum Move {
	/// Travel toward increasing columns, the destination grid sits east
	East,
	/// Travel toward increasing rows, the destination grid sits south
	South,
	/// Travel toward decreasing columns, the destination grid sits west
	West,
	/// Travel toward decreasing rows, the destination grid sits north
	North,
	/// No direction, the figure appears on the grid it already occupies
	#[default]
	Spawn,
}

impl Move {
	/// Returns the opposite travel direction, used by callers that replay a
	/// recorded walk from the other end
	pub fn flip(&self) -> Move {
		match self {
			Move::East => Move::West,
			Move::South => Move::North,
			Move::West => Move::East,
			Move::North => Move::South,
			Move::Spawn => Move::Spawn,
		}
	}
}

/// Category of figure a slot is requested for, it selects which pools a draw
/// comes from
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default, Hash, Reflect)]
pub enum FigureKind {
	/// Tall surface figure such as a tree or building, occupies its cell and
	/// the cell above it
	Tile,
	/// Ground unit figure that walks between slots
	Ground,
	/// Ground figure passing through the surface, placed like [FigureKind::Ground]
	Bypass,
	/// Airborne figure, may visually overlap tile figures
	Air,
	/// Fence or barrier figure hung at the bottom edge of its cell
	Fence,
	/// No category, a request for this kind always yields the sentinel box
	#[default]
	None,
}

impl FigureKind {
	/// Whether figures of this category walk between slots and therefore
	/// receive pathing when relocated
	pub fn walks(&self) -> bool {
		matches!(self, FigureKind::Ground | FigureKind::Bypass)
	}
}

/// Row of a slot index within the 5x5 grid
pub fn slot_row(index: u8) -> u8 {
	index / GRID_RESOLUTION as u8
}

/// Column of a slot index within the 5x5 grid
pub fn slot_column(index: u8) -> u8 {
	index % GRID_RESOLUTION as u8
}

/// Row-major slot index of a `(row, column)` cell
pub fn slot_index(row: u8, column: u8) -> u8 {
	row * GRID_RESOLUTION as u8 + column
}

#[cfg(test)]
mod tests {
	use super::*;
	#[test]
	fn flip_inverts_cardinals() {
		let result = (Move::East.flip(), Move::South.flip(), Move::West.flip(), Move::North.flip());
		let actual = (Move::West, Move::North, Move::East, Move::South);
		assert_eq!(actual, result);
	}
	#[test]
	fn flip_keeps_spawn() {
		let result = Move::Spawn.flip();
		let actual = Move::Spawn;
		assert_eq!(actual, result);
	}
	#[test]
	fn walking_categories() {
		assert!(FigureKind::Ground.walks());
		assert!(FigureKind::Bypass.walks());
		assert!(!FigureKind::Tile.walks());
		assert!(!FigureKind::Air.walks());
		assert!(!FigureKind::Fence.walks());
		assert!(!FigureKind::None.walks());
	}
	#[test]
	fn slot_round_trip() {
		let index = slot_index(3, 2);
		let result = (slot_row(index), slot_column(index));
		let actual = (3, 2);
		assert_eq!(actual, result);
		assert_eq!(17, index);
	}
}
