//! A [PlacementBox] is the scoped handle to one reserved rectangle on a
//! surface grid. The pool it was drawn from stays the owner of the slot
//! index, the box only borrows it through a weak reference: dropping or
//! releasing the box returns the index to the pool, and when the grid has
//! already been torn down the release quietly does nothing.
//!
//! A box is move-only. Copying it would mint a second claim on the same slot
//! and the pool would eventually hand the index out twice.
//!

use std::sync::{Arc, Mutex, Weak};

use crate::prelude::*;
use bevy::prelude::*;
use rand::Rng;

/// One reserved rectangle on a placement grid, plus the visual bias state and
/// pathing attached to the figure that occupies it
#[derive(Component, Debug)]
pub struct PlacementBox {
	/// Pool the slot index returns to, [None] once released or for the sentinel
	layer: Option<Weak<Mutex<PlacementLayer>>>,
	/// Slot index within the grid, [UNPLACED] for the sentinel
	index: u8,
	/// Top-left pixel corner of the reserved rectangle
	top_left: IVec2,
	/// Bottom-right pixel corner of the reserved rectangle
	bottom_right: IVec2,
	/// Pixel center of the owning surface, the anchor [PlacementBox::centralize] pulls toward
	center: IVec2,
	/// Bias points toward the upper third of the box
	raised: bool,
	/// Bias points toward the lower reach of the box
	lowered: bool,
	/// Bias points into a centered vertical band
	entrenched: bool,
	/// Bias points onto the bottom edge of the box
	enfenced: bool,
	/// Waypoints a figure visits while walking into this box
	pathing: PlacementPathing,
}

impl PlacementBox {
	/// Claim `index` from `layer`, recording the rectangle and surface center
	pub(crate) fn claimed(
		layer: &Arc<Mutex<PlacementLayer>>,
		index: u8,
		top_left: IVec2,
		bottom_right: IVec2,
		center: IVec2,
	) -> Self {
		PlacementBox {
			layer: Some(Arc::downgrade(layer)),
			index,
			top_left,
			bottom_right,
			center,
			raised: false,
			lowered: false,
			entrenched: false,
			enfenced: false,
			pathing: PlacementPathing::default(),
		}
	}
	/// The sentinel box handed out when a pool has nothing left. It owns no
	/// slot and releasing it does nothing
	pub fn unplaced() -> Self {
		PlacementBox {
			layer: None,
			index: UNPLACED,
			top_left: IVec2::ZERO,
			bottom_right: IVec2::ZERO,
			center: IVec2::ZERO,
			raised: false,
			lowered: false,
			entrenched: false,
			enfenced: false,
			pathing: PlacementPathing::default(),
		}
	}
	/// Whether this box is backed by an actual slot
	pub fn is_placed(&self) -> bool {
		self.index != UNPLACED
	}
	/// Slot index within the grid
	pub fn index(&self) -> u8 {
		self.index
	}
	/// Top-left pixel corner
	pub fn top_left(&self) -> IVec2 {
		self.top_left
	}
	/// Bottom-right pixel corner
	pub fn bottom_right(&self) -> IVec2 {
		self.bottom_right
	}
	/// Width of the rectangle in pixels
	pub fn width(&self) -> i32 {
		self.bottom_right.x - self.top_left.x
	}
	/// Height of the rectangle in pixels
	pub fn height(&self) -> i32 {
		self.bottom_right.y - self.top_left.y
	}
	/// Waypoints filled in by the grid when the figure walks into this box
	pub fn pathing(&self) -> &PlacementPathing {
		&self.pathing
	}
	/// Mutable access to the waypoint list
	pub fn pathing_mut(&mut self) -> &mut PlacementPathing {
		&mut self.pathing
	}
	/// Whether the box biases points toward its upper third
	pub fn is_raised(&self) -> bool {
		self.raised
	}
	/// Whether the box biases points toward its lower reach
	pub fn is_lowered(&self) -> bool {
		self.lowered
	}
	/// Whether the box biases points into a centered vertical band
	pub fn is_entrenched(&self) -> bool {
		self.entrenched
	}
	/// Whether the box biases points onto its bottom edge
	pub fn is_enfenced(&self) -> bool {
		self.enfenced
	}
	/// A pseudo-random point inside the rectangle, vertically biased by the
	/// box state so that figures assigned to the same slot over time do not
	/// render at pixel-identical positions
	pub fn random(&self, rng: &mut impl Rng) -> IVec2 {
		let width = self.width().max(1);
		let height = self.height().max(1);
		let x = self.top_left.x + width / 2 - 1 + rng.random_range(0..3);
		let y = if self.entrenched {
			// centered vertical band
			self.top_left.y + height / 2 - height / 8 + rng.random_range(0..(height / 4).max(1))
		} else if self.enfenced {
			// hug the bottom edge
			self.bottom_right.y - 1 - rng.random_range(0..2)
		} else if self.raised {
			// upper third
			self.top_left.y + rng.random_range(0..(height / 3).max(1))
		} else if self.lowered {
			// lower seven tenths
			self.top_left.y + (3 * height) / 10 + rng.random_range(0..((7 * height) / 10).max(1))
		} else {
			self.top_left.y + height / 2 - 1 + rng.random_range(0..3)
		};
		IVec2::new(x, y)
	}
	/// Shrink both corners toward the surface center. The pull strength is a
	/// percentage picked per corner and per axis by which side of the center
	/// that coordinate lies on: `east`/`west` for the x axis, `south`/`north`
	/// for the y axis (screen y grows southward). A strength of 100 lands the
	/// coordinate exactly on the center
	pub fn centralize(&mut self, east: i32, south: i32, west: i32, north: i32) {
		self.top_left.x = pull(self.top_left.x, self.center.x, east, west);
		self.top_left.y = pull(self.top_left.y, self.center.y, south, north);
		self.bottom_right.x = pull(self.bottom_right.x, self.center.x, east, west);
		self.bottom_right.y = pull(self.bottom_right.y, self.center.y, south, north);
	}
	/// Bias future points toward the upper third of the box
	pub fn raise(&mut self) {
		self.raised = true;
	}
	/// Bias future points toward the lower reach of the box
	pub fn lower(&mut self) {
		self.lowered = true;
	}
	/// Bias future points into a centered vertical band and pull the box
	/// toward the surface center on both horizontal sides
	pub fn entrench(&mut self) {
		self.entrenched = true;
		self.centralize(15, 0, 15, 0);
	}
	/// Bias future points onto the bottom edge of the box
	pub fn enfence(&mut self) {
		self.enfenced = true;
	}
	/// Return the slot index to its pool. Safe to call more than once and a
	/// quiet no-op when the owning grid no longer exists
	pub fn release(&mut self) {
		if let Some(weak) = self.layer.take() {
			if let Some(pool) = weak.upgrade() {
				if let Ok(mut pool) = pool.lock() {
					pool.push(self.index);
				}
			}
		}
	}
}

impl Drop for PlacementBox {
	fn drop(&mut self) {
		self.release();
	}
}

/// Linear pull of `value` toward `anchor` by a percentage chosen by which
/// side of the anchor the value lies on
fn pull(value: i32, anchor: i32, positive_side: i32, negative_side: i32) -> i32 {
	let strength = if value > anchor {
		positive_side
	} else {
		negative_side
	};
	(value * (100 - strength) + anchor * strength) / 100
}

#[cfg(test)]
mod tests {
	use super::*;
	use rand::SeedableRng;
	use rand_chacha::ChaCha8Rng;

	/// A live pool to claim from in tests
	fn pool_of(indices: &[u8]) -> Arc<Mutex<PlacementLayer>> {
		let mut layer = PlacementLayer::new();
		for &index in indices {
			layer.push(index);
		}
		Arc::new(Mutex::new(layer))
	}

	fn boxed(pool: &Arc<Mutex<PlacementLayer>>, index: u8) -> PlacementBox {
		PlacementBox::claimed(
			pool,
			index,
			IVec2::new(0, 0),
			IVec2::new(20, 10),
			IVec2::new(50, 25),
		)
	}

	#[test]
	fn drop_returns_the_index() {
		let pool = pool_of(&[]);
		{
			let _placement = boxed(&pool, 7);
			assert_eq!(0, pool.lock().unwrap().count());
		}
		let guard = pool.lock().unwrap();
		assert_eq!(1, guard.count());
		assert!(guard.contains(&7));
	}
	#[test]
	fn release_is_idempotent() {
		let pool = pool_of(&[]);
		let mut placement = boxed(&pool, 3);
		placement.release();
		placement.release();
		assert_eq!(1, pool.lock().unwrap().count());
		drop(placement);
		// the drop after an explicit release must not double-free the index
		assert_eq!(1, pool.lock().unwrap().count());
	}
	#[test]
	fn release_on_a_dead_grid_is_a_no_op() {
		let pool = pool_of(&[]);
		let mut placement = boxed(&pool, 3);
		drop(pool);
		// the pool is gone, releasing must neither panic nor dangle
		placement.release();
		assert_eq!(3, placement.index());
	}
	#[test]
	fn sentinel_owns_nothing() {
		let placement = PlacementBox::unplaced();
		assert!(!placement.is_placed());
		assert_eq!(UNPLACED, placement.index());
	}
	#[test]
	fn random_point_stays_inside() {
		let pool = pool_of(&[]);
		let placement = boxed(&pool, 0);
		let mut rng = ChaCha8Rng::seed_from_u64(5);
		for _ in 0..64 {
			let point = placement.random(&mut rng);
			assert!(point.x >= placement.top_left().x);
			assert!(point.x <= placement.bottom_right().x);
			assert!(point.y >= placement.top_left().y);
			assert!(point.y <= placement.bottom_right().y);
		}
	}
	#[test]
	fn raised_points_sit_in_the_upper_third() {
		let pool = pool_of(&[]);
		let mut placement = PlacementBox::claimed(
			&pool,
			0,
			IVec2::new(0, 0),
			IVec2::new(30, 30),
			IVec2::new(75, 75),
		);
		placement.raise();
		let mut rng = ChaCha8Rng::seed_from_u64(5);
		for _ in 0..64 {
			let point = placement.random(&mut rng);
			assert!(point.y < 10);
		}
	}
	#[test]
	fn enfenced_points_hug_the_bottom_edge() {
		let pool = pool_of(&[]);
		let mut placement = PlacementBox::claimed(
			&pool,
			0,
			IVec2::new(0, 0),
			IVec2::new(30, 30),
			IVec2::new(75, 75),
		);
		placement.enfence();
		let mut rng = ChaCha8Rng::seed_from_u64(5);
		for _ in 0..64 {
			let point = placement.random(&mut rng);
			assert!(point.y >= 28);
		}
	}
	#[test]
	fn centralize_full_pull_lands_on_the_center() {
		let pool = pool_of(&[]);
		// top-left west of the surface center
		let mut placement = boxed(&pool, 0);
		placement.centralize(100, 0, 100, 0);
		let result = placement.top_left().x;
		let actual = 50;
		assert_eq!(actual, result);
	}
	#[test]
	fn centralize_pulls_sides_independently() {
		let pool = pool_of(&[]);
		let mut placement = PlacementBox::claimed(
			&pool,
			0,
			IVec2::new(40, 20),
			IVec2::new(60, 30),
			IVec2::new(50, 25),
		);
		placement.centralize(50, 0, 0, 0);
		// west corner untouched, east corner halfway to the center
		assert_eq!(40, placement.top_left().x);
		assert_eq!(55, placement.bottom_right().x);
	}
	#[test]
	fn entrench_narrows_horizontally() {
		let pool = pool_of(&[]);
		let mut placement = PlacementBox::claimed(
			&pool,
			0,
			IVec2::new(0, 0),
			IVec2::new(100, 100),
			IVec2::new(50, 50),
		);
		let before = placement.width();
		placement.entrench();
		assert!(placement.is_entrenched());
		assert!(placement.width() < before);
	}
}
