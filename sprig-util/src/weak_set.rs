//! Iterable weak set
//!
//! A [`WeakSet`] holds weak handles without keeping their referents
//! alive, while still allowing iteration over the ones that are.
//!
//! Entries whose referent was dropped are never yielded nor counted.
//! They are purged lazily whenever the set is iterated, or eagerly by
//! whoever owns the referent through [`WeakSet::remove`].

// Imports
use {
	core::fmt,
	std::{
		collections::{BTreeMap, HashMap},
		rc::{Rc, Weak},
	},
};

/// Weak handle that may be stored in a [`WeakSet`]
pub trait WeakItem: Clone {
	/// Strong handle produced by upgrading
	type Strong;

	/// Upgrades this handle, if the referent is still alive
	fn upgrade(&self) -> Option<Self::Strong>;

	/// Returns a unique identifier for the referent.
	///
	/// The identifier may only be reused once the referent is dropped.
	fn id(&self) -> usize;
}

impl<T: ?Sized> WeakItem for Weak<T> {
	type Strong = Rc<T>;

	fn upgrade(&self) -> Option<Self::Strong> {
		Self::upgrade(self)
	}

	fn id(&self) -> usize {
		Self::as_ptr(self).cast::<()>().addr()
	}
}

/// Iterable weak set
pub struct WeakSet<W> {
	/// Items, by insertion sequence
	items: BTreeMap<u64, W>,

	/// Insertion sequence of each item, by id
	seqs: HashMap<usize, u64>,

	/// Next insertion sequence
	next_seq: u64,
}

impl<W> WeakSet<W> {
	/// Creates an empty set
	#[must_use]
	pub fn new() -> Self {
		Self {
			items:    BTreeMap::new(),
			seqs:     HashMap::new(),
			next_seq: 0,
		}
	}

	/// Returns the number of entries currently tracked, including
	/// the ones whose referent was already dropped.
	#[must_use]
	pub fn tracked_len(&self) -> usize {
		self.items.len()
	}

	/// Removes the entry with id `id`.
	///
	/// Returns whether it was present.
	pub fn remove(&mut self, id: usize) -> bool {
		let Some(seq) = self.seqs.remove(&id) else {
			return false;
		};

		self.items.remove(&seq).is_some()
	}
}

impl<W: WeakItem> WeakSet<W> {
	/// Inserts an item, unless a live one with the same id already exists.
	///
	/// Returns whether the item was inserted.
	pub fn insert(&mut self, item: W) -> bool {
		let id = item.id();
		if let Some(seq) = self.seqs.get(&id) {
			// Note: Ids of dropped referents may be reused, in which case
			//       the dead entry is replaced and the item moves to the back.
			if self.items.get(seq).is_some_and(|cur| cur.upgrade().is_some()) {
				return false;
			}
			self.items.remove(seq);
		}

		let seq = self.next_seq;
		self.next_seq += 1;
		self.seqs.insert(id, seq);
		self.items.insert(seq, item);

		true
	}

	/// Upgrades all live items, in insertion order.
	///
	/// Any dead entries found are removed.
	pub fn live(&mut self) -> Vec<W::Strong> {
		let mut live = Vec::with_capacity(self.items.len());
		self.retain_live(|item| live.push(item));

		live
	}

	/// Removes all dead entries.
	///
	/// Returns the number of entries removed.
	pub fn purge(&mut self) -> usize {
		let before = self.items.len();
		self.retain_live(drop);
		before - self.items.len()
	}

	/// Returns the number of live items.
	///
	/// Purges any dead entries found while counting.
	pub fn len(&mut self) -> usize {
		self.purge();
		self.items.len()
	}

	/// Returns whether there are no live items
	pub fn is_empty(&mut self) -> bool {
		self.len() == 0
	}

	/// Removes all dead entries, passing each live item to `f`, in insertion order
	fn retain_live(&mut self, mut f: impl FnMut(W::Strong)) {
		let seqs = &mut self.seqs;
		self.items.retain(|&seq, item| match item.upgrade() {
			Some(item) => {
				f(item);
				true
			},
			None => {
				let id = item.id();
				if seqs.get(&id) == Some(&seq) {
					seqs.remove(&id);
				}
				false
			},
		});
	}
}

impl<W> Default for WeakSet<W> {
	fn default() -> Self {
		Self::new()
	}
}

impl<W: WeakItem> Extend<W> for WeakSet<W> {
	fn extend<I: IntoIterator<Item = W>>(&mut self, iter: I) {
		for item in iter {
			self.insert(item);
		}
	}
}

impl<W: WeakItem> FromIterator<W> for WeakSet<W> {
	fn from_iter<I: IntoIterator<Item = W>>(iter: I) -> Self {
		let mut set = Self::new();
		set.extend(iter);
		set
	}
}

impl<W> fmt::Debug for WeakSet<W> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("WeakSet")
			.field("tracked_len", &self.items.len())
			.field("next_seq", &self.next_seq)
			.finish_non_exhaustive()
	}
}

#[cfg(test)]
mod tests {
	// Imports
	use {
		super::*,
		std::time::{Duration, Instant},
	};

	/// Weak handle whose id is always `0`, as if its address was reused
	#[derive(Clone)]
	struct Fixed(Weak<i32>);

	impl WeakItem for Fixed {
		type Strong = Rc<i32>;

		fn upgrade(&self) -> Option<Self::Strong> {
			self.0.upgrade()
		}

		fn id(&self) -> usize {
			0
		}
	}

	#[test]
	fn insert_dedup() {
		let value = Rc::new(5_i32);

		let mut set = WeakSet::new();
		assert!(set.insert(Rc::downgrade(&value)), "First insert was rejected");
		assert!(!set.insert(Rc::downgrade(&value)), "Duplicate insert was accepted");
		assert_eq!(set.len(), 1);
	}

	#[test]
	fn insertion_order() {
		let values = [Rc::new(1_i32), Rc::new(2), Rc::new(3)];
		let mut set = values.iter().map(Rc::downgrade).collect::<WeakSet<_>>();

		let live = set.live().into_iter().map(|value| *value).collect::<Vec<_>>();
		assert_eq!(live, [1, 2, 3], "Items weren't yielded in insertion order");
	}

	#[test]
	fn dead_entries_skipped_and_purged() {
		let a = Rc::new(1_i32);
		let b = Rc::new(2_i32);
		let c = Rc::new(3_i32);

		let mut set = WeakSet::new();
		set.insert(Rc::downgrade(&a));
		set.insert(Rc::downgrade(&b));
		set.insert(Rc::downgrade(&c));

		drop(b);
		assert_eq!(set.tracked_len(), 3, "Dead entry was removed before iteration");

		let live = set.live().into_iter().map(|value| *value).collect::<Vec<_>>();
		assert_eq!(live, [1, 3], "Dead entry was yielded");
		assert_eq!(set.tracked_len(), 2, "Dead entry wasn't purged by iteration");
	}

	#[test]
	fn len_counts_live_only() {
		let values = (0..10_i32).map(Rc::new).collect::<Vec<_>>();
		let mut set = values.iter().map(Rc::downgrade).collect::<WeakSet<_>>();
		assert_eq!(set.len(), 10);

		drop(values);
		assert_eq!(set.tracked_len(), 10);
		assert_eq!(set.len(), 0, "Dead entries were counted");
		assert!(set.is_empty());
		assert_eq!(set.tracked_len(), 0, "Counting didn't purge dead entries");
	}

	#[test]
	fn remove_eagerly() {
		let value = Rc::new(5_i32);
		let weak = Rc::downgrade(&value);
		let id = weak.id();

		let mut set = WeakSet::new();
		set.insert(weak);
		assert!(set.remove(id), "Entry wasn't present");
		assert!(!set.remove(id), "Entry was removed twice");
		assert!(set.is_empty(), "Removed entry was still counted while alive");
	}

	#[test]
	fn purge_returns_removed() {
		let keep = Rc::new(1_i32);
		let mut set = WeakSet::new();
		set.insert(Rc::downgrade(&keep));
		for value in 0..4_i32 {
			let value = Rc::new(value);
			set.insert(Rc::downgrade(&value));
		}

		assert_eq!(set.purge(), 4);
		assert_eq!(set.purge(), 0);
		assert_eq!(set.len(), 1);
	}

	#[test]
	fn reinsert_moves_to_back() {
		let values = [Rc::new(1_i32), Rc::new(2), Rc::new(3)];
		let mut set = values.iter().map(Rc::downgrade).collect::<WeakSet<_>>();

		assert!(set.remove(Rc::downgrade(&values[0]).id()));
		assert!(set.insert(Rc::downgrade(&values[0])));

		let live = set.live().into_iter().map(|value| *value).collect::<Vec<_>>();
		assert_eq!(live, [2, 3, 1], "Reinserted entry kept its old position");
	}

	#[test]
	fn dead_entry_replaced_by_reused_id() {
		let mut set = WeakSet::new();
		let dead = Weak::<i32>::new();
		let value = Rc::new(5_i32);

		assert!(set.insert(Fixed(dead)));
		assert!(set.insert(Fixed(Rc::downgrade(&value))), "Dead entry blocked a reused id");
		assert!(!set.insert(Fixed(Rc::downgrade(&value))), "Live entry was inserted twice");
		assert_eq!(set.tracked_len(), 1);
		assert_eq!(set.len(), 1);
	}

	/// Inserts `count` entries, then times removing all of them by id, oldest first
	fn time_removals(count: usize) -> Duration {
		let values = (0..count).map(Rc::new).collect::<Vec<_>>();
		let mut set = values.iter().map(Rc::downgrade).collect::<WeakSet<_>>();
		let ids = values.iter().map(|value| Rc::downgrade(value).id()).collect::<Vec<_>>();

		let start = Instant::now();
		for id in ids {
			assert!(set.remove(id), "Entry wasn't present");
		}
		let elapsed = start.elapsed();

		assert_eq!(set.tracked_len(), 0);
		elapsed
	}

	#[test]
	fn removal_scales_linearly() {
		let small = self::time_removals(20_000);
		let large = self::time_removals(160_000);

		// Note: 8x the entries should take roughly 8x as long,
		//       while a linear-time removal would take 64x.
		assert!(
			large < small * 24,
			"Removing 8x the entries took {large:?} vs {small:?}"
		);
	}
}
