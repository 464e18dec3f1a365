//! A shuffle bag yielding unique elements in pseudo-random order without
//! replacement, with the twist that a pending draw can be rigged: an external
//! scan may pick the element it wants (by position) and [Randomizer::select]
//! guarantees the next [Randomizer::pop] yields exactly that element. This
//! keeps a single pool abstraction for both "give me any free slot" and
//! "give me the slot I scored best" draws.
//!

use rand::Rng;

/// Pool of free slot indices for one placement category on one grid. Pool
/// sizes are bounded by the 25 cells of a surface grid so indices fit a byte.
pub type PlacementLayer = Randomizer<u8>;

/// Bag of unique values supporting uniform-random extraction without
/// replacement. Callers control uniqueness, the bag does not deduplicate.
#[derive(Clone, Debug, Default)]
pub struct Randomizer<T> {
	/// Remaining elements, in no meaningful order
	items: Vec<T>,
	/// When set the element at the back was placed there by [Randomizer::select]
	/// and the next pop must yield it
	rigged: bool,
}

impl<T> Randomizer<T> {
	/// Create an empty bag
	pub fn new() -> Self {
		Randomizer {
			items: Vec::new(),
			rigged: false,
		}
	}
	/// Add a value to the bag. A push cancels a pending selection
	pub fn push(&mut self, value: T) {
		self.items.push(value);
		self.rigged = false;
	}
	/// Remove and return one element chosen uniformly at random among the
	/// remaining elements, or the element a preceding [Randomizer::select]
	/// rigged. Returns [None] when the bag is empty
	pub fn pop(&mut self, rng: &mut impl Rng) -> Option<T> {
		if self.items.is_empty() {
			return None;
		}
		if self.rigged {
			self.rigged = false;
			return self.items.pop();
		}
		let at = rng.random_range(0..self.items.len());
		Some(self.items.swap_remove(at))
	}
	/// Peek at the element currently held at `position` without removing it,
	/// used to scan remaining elements with an external scoring function
	pub fn inspect(&self, position: usize) -> Option<&T> {
		self.items.get(position)
	}
	/// Reorder so the next [Randomizer::pop] yields the element currently at
	/// `position`
	pub fn select(&mut self, position: usize) {
		if position >= self.items.len() {
			panic!(
				"Cannot select position {} of a bag holding {} elements",
				position,
				self.items.len()
			);
		}
		let last = self.items.len() - 1;
		self.items.swap(position, last);
		self.rigged = true;
	}
	/// Number of elements left in the bag
	pub fn count(&self) -> usize {
		self.items.len()
	}
	/// Whether the bag has been exhausted
	pub fn is_empty(&self) -> bool {
		self.items.is_empty()
	}
	/// Empty the bag, used when rebuilding a temporary bag of candidates
	pub fn clear(&mut self) {
		self.items.clear();
		self.rigged = false;
	}
}

impl<T: PartialEq> Randomizer<T> {
	/// Whether the bag still holds `value`
	pub fn contains(&self, value: &T) -> bool {
		self.items.contains(value)
	}
}
