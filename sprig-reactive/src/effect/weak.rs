//! Weak effect

// Imports
use {
	super::{Effect, Inner},
	core::{
		fmt,
		hash::{Hash, Hasher},
	},
	std::rc::Weak,
};

/// Weak effect
///
/// Used to break ownership between a primary and its subscribers,
/// and between a scheduled run and its effect.
pub struct WeakEffect {
	/// Inner
	pub(super) inner: Weak<Inner>,
}

impl WeakEffect {
	/// Upgrades this effect
	#[must_use]
	pub fn upgrade(&self) -> Option<Effect> {
		self.inner.upgrade().map(|inner| Effect { inner })
	}

	/// Returns a unique identifier to this effect.
	///
	/// Upgrading and cloning the effect will retain the same id
	#[must_use]
	pub fn id(&self) -> usize {
		Weak::as_ptr(&self.inner).cast::<()>().addr()
	}
}

impl PartialEq for WeakEffect {
	fn eq(&self, other: &Self) -> bool {
		self.id() == other.id()
	}
}

impl Eq for WeakEffect {}

impl Clone for WeakEffect {
	fn clone(&self) -> Self {
		Self {
			inner: Weak::clone(&self.inner),
		}
	}
}

impl Hash for WeakEffect {
	fn hash<H: Hasher>(&self, state: &mut H) {
		self.id().hash(state);
	}
}

impl fmt::Debug for WeakEffect {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self.upgrade() {
			Some(effect) => f.debug_tuple("WeakEffect").field(&effect.defined_loc()).finish(),
			None => f.debug_tuple("WeakEffect").field(&"<dropped>").finish(),
		}
	}
}
