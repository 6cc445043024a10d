//! Dependencies
//!
//! The strong half of a dependency edge: each subscriber owns the
//! primaries it read, while each primary only keeps a weak handle
//! to its subscribers.

// Imports
use {
	crate::{primary::PrimaryNode, subscriber::WeakSubscriber},
	core::{cell::RefCell, fmt},
	indexmap::IndexMap,
	std::rc::Rc,
};

/// Dependency set of a subscriber
pub(crate) struct Dependencies {
	/// Primaries, by id
	primaries: RefCell<IndexMap<usize, Rc<dyn PrimaryNode>>>,
}

impl Dependencies {
	/// Creates an empty dependency set
	pub(crate) fn new() -> Self {
		Self {
			primaries: RefCell::new(IndexMap::new()),
		}
	}

	/// Records an edge between `subscriber` and `primary`.
	pub(crate) fn subscribe(&self, subscriber: &WeakSubscriber, primary: Rc<dyn PrimaryNode>) {
		let inserted = primary.subscribers().borrow_mut().insert(subscriber.clone());
		if inserted {
			tracing::trace!(
				"Adding dependency\nSubscriber: {}\nPrimary   : {}",
				subscriber.defined_loc().map_or_else(|| "<dropped>".to_owned(), |loc| loc.to_string()),
				primary.defined_loc(),
			);
		}

		self.primaries.borrow_mut().entry(primary.id()).or_insert(primary);
	}

	/// Returns the number of primaries depended on
	pub(crate) fn len(&self) -> usize {
		self.primaries.borrow().len()
	}

	/// Returns all primaries depended on, in the order they were first read
	pub(crate) fn snapshot(&self) -> Vec<Rc<dyn PrimaryNode>> {
		self.primaries.borrow().values().cloned().collect()
	}

	/// Removes the subscriber with id `subscriber_id` from all primaries.
	///
	/// Registries that are currently in use are skipped, and will drop the
	/// entry the next time they're iterated.
	pub(crate) fn unsubscribe_all(&self, subscriber_id: usize) {
		let Ok(primaries) = self.primaries.try_borrow() else {
			return;
		};

		for primary in primaries.values() {
			if let Ok(mut subscribers) = primary.subscribers().try_borrow_mut() {
				subscribers.remove(subscriber_id);
			}
		}
	}
}

impl fmt::Debug for Dependencies {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let mut list = f.debug_list();
		match self.primaries.try_borrow() {
			Ok(primaries) => list.entries(primaries.values().map(|primary| primary.defined_loc())).finish(),
			Err(_) => list.finish_non_exhaustive(),
		}
	}
}
