//! Subscribers
//!
//! Computed nodes and effects are the two kinds of subscribers a primary
//! signal may notify. Primaries store them as [`WeakSubscriber`]s so that
//! being subscribed never keeps a subscriber alive.

// Imports
use {
	crate::{
		computed::ComputedNode,
		effect::{Effect, WeakEffect},
		loc::Loc,
	},
	core::{
		fmt,
		hash::{Hash, Hasher},
	},
	sprig_util::WeakItem,
	std::rc::{Rc, Weak},
};

/// Subscriber
#[derive(Clone)]
pub enum Subscriber {
	/// Computed node
	Computed(Rc<dyn ComputedNode>),

	/// Effect
	Effect(Effect),
}

impl Subscriber {
	/// Notifies this subscriber that one of its dependencies changed.
	///
	/// Computed nodes are marked dirty, while effects are scheduled.
	pub fn notify(&self) {
		match self {
			Self::Computed(computed) => computed.mark_dirty(),
			Self::Effect(effect) => effect.notify(),
		}
	}

	/// Downgrades this subscriber
	#[must_use]
	pub fn downgrade(&self) -> WeakSubscriber {
		match self {
			Self::Computed(computed) => WeakSubscriber::Computed(Rc::downgrade(computed)),
			Self::Effect(effect) => WeakSubscriber::Effect(effect.downgrade()),
		}
	}

	/// Returns a unique identifier to this subscriber
	#[must_use]
	pub fn id(&self) -> usize {
		match self {
			Self::Computed(computed) => Rc::as_ptr(computed).cast::<()>().addr(),
			Self::Effect(effect) => effect.id(),
		}
	}

	/// Returns where this subscriber was defined
	#[must_use]
	pub fn defined_loc(&self) -> Loc {
		match self {
			Self::Computed(computed) => computed.defined_loc(),
			Self::Effect(effect) => effect.defined_loc(),
		}
	}

	/// Returns the number of primaries this subscriber depends on
	#[must_use]
	pub fn dependency_count(&self) -> usize {
		match self {
			Self::Computed(computed) => computed.dependency_count(),
			Self::Effect(effect) => effect.dependency_count(),
		}
	}
}

impl PartialEq for Subscriber {
	fn eq(&self, other: &Self) -> bool {
		self.id() == other.id()
	}
}

impl Eq for Subscriber {}

impl Hash for Subscriber {
	fn hash<H: Hasher>(&self, state: &mut H) {
		self.id().hash(state);
	}
}

impl fmt::Debug for Subscriber {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let kind = match self {
			Self::Computed(_) => "Computed",
			Self::Effect(_) => "Effect",
		};

		f.debug_struct("Subscriber")
			.field("kind", &kind)
			.field("defined_loc", &self.defined_loc())
			.field("dependencies", &self.dependency_count())
			.finish()
	}
}

/// Weak subscriber
#[derive(Clone)]
pub enum WeakSubscriber {
	/// Computed node
	Computed(Weak<dyn ComputedNode>),

	/// Effect
	Effect(WeakEffect),
}

impl WeakSubscriber {
	/// Upgrades this subscriber
	#[must_use]
	pub fn upgrade(&self) -> Option<Subscriber> {
		match self {
			Self::Computed(computed) => computed.upgrade().map(Subscriber::Computed),
			Self::Effect(effect) => effect.upgrade().map(Subscriber::Effect),
		}
	}

	/// Returns a unique identifier to this subscriber.
	///
	/// Upgrading and cloning the subscriber will retain the same id
	#[must_use]
	pub fn id(&self) -> usize {
		match self {
			Self::Computed(computed) => Weak::as_ptr(computed).cast::<()>().addr(),
			Self::Effect(effect) => effect.id(),
		}
	}

	/// Returns where this subscriber was defined, if it's still alive
	#[must_use]
	pub fn defined_loc(&self) -> Option<Loc> {
		self.upgrade().map(|subscriber| subscriber.defined_loc())
	}
}

impl WeakItem for WeakSubscriber {
	type Strong = Subscriber;

	fn upgrade(&self) -> Option<Self::Strong> {
		Self::upgrade(self)
	}

	fn id(&self) -> usize {
		Self::id(self)
	}
}

impl PartialEq for WeakSubscriber {
	fn eq(&self, other: &Self) -> bool {
		self.id() == other.id()
	}
}

impl Eq for WeakSubscriber {}

impl Hash for WeakSubscriber {
	fn hash<H: Hasher>(&self, state: &mut H) {
		self.id().hash(state);
	}
}

impl fmt::Debug for WeakSubscriber {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self.upgrade() {
			Some(subscriber) => subscriber.fmt(f),
			None => f.debug_struct("WeakSubscriber").finish_non_exhaustive(),
		}
	}
}
