//! Signals
//!
//! A signal is anything whose value can be read through a [`Track`](crate::Track):
//! either a [`Primary`] cell or a [`Computed`] node.

// Imports
use {
	crate::{Computed, Primary, Track, compare::SameValue, primary::PrimaryNode},
	std::rc::Rc,
};

/// Signal
pub trait Signal {
	/// Value type
	type Value;

	/// Returns which kind of signal this is
	fn kind(&self) -> SignalKind<'_, Self::Value>;
}

impl<S: ?Sized + Signal> Signal for &'_ S {
	type Value = S::Value;

	fn kind(&self) -> SignalKind<'_, Self::Value> {
		S::kind(self)
	}
}

impl<T> Signal for Primary<T> {
	type Value = T;

	fn kind(&self) -> SignalKind<'_, Self::Value> {
		SignalKind::Primary(self)
	}
}

impl<T> Signal for Computed<T> {
	type Value = T;

	fn kind(&self) -> SignalKind<'_, Self::Value> {
		SignalKind::Computed(self)
	}
}

/// Signal kind
#[derive(Debug)]
pub enum SignalKind<'a, T> {
	/// Primary cell
	Primary(&'a Primary<T>),

	/// Computed node
	Computed(&'a Computed<T>),
}

impl<T: 'static> SignalKind<'_, T> {
	/// Uses the signal's value.
	///
	/// Computed nodes are brought up to date first.
	pub fn with<O>(&self, f: impl FnOnce(&T) -> O) -> O {
		match *self {
			Self::Primary(primary) => primary.with(f),
			Self::Computed(computed) => computed.with(f),
		}
	}

	/// Gets the signal's value, by cloning it.
	#[must_use]
	pub fn get(&self) -> T
	where
		T: Clone,
	{
		self.with(T::clone)
	}

	/// Returns all primaries underneath this signal.
	///
	/// For a primary, that's itself, while for a computed node, those are
	/// the primaries it depends on.
	pub(crate) fn primaries(&self) -> Vec<Rc<dyn PrimaryNode>> {
		match *self {
			Self::Primary(primary) => vec![primary.node()],
			Self::Computed(computed) => computed.dependencies().snapshot(),
		}
	}
}

impl<T> Clone for SignalKind<'_, T> {
	fn clone(&self) -> Self {
		*self
	}
}

impl<T> Copy for SignalKind<'_, T> {}

impl<T> Signal for SignalKind<'_, T> {
	type Value = T;

	fn kind(&self) -> SignalKind<'_, Self::Value> {
		*self
	}
}

impl<'a, T> From<&'a Primary<T>> for SignalKind<'a, T> {
	fn from(primary: &'a Primary<T>) -> Self {
		Self::Primary(primary)
	}
}

impl<'a, T> From<&'a Computed<T>> for SignalKind<'a, T> {
	fn from(computed: &'a Computed<T>) -> Self {
		Self::Computed(computed)
	}
}

/// Creates a primary signal, using the default comparison for `T`
#[track_caller]
pub fn create_signal<T: SameValue + 'static>(value: T) -> Primary<T> {
	Primary::new(value)
}

/// Creates a primary signal for a type without a [`SameValue`] impl.
///
/// See [`Primary::new_eq`].
#[track_caller]
pub fn create_signal_eq<T: PartialEq + 'static>(value: T) -> Primary<T> {
	Primary::new_eq(value)
}

/// Creates a primary signal with a custom comparison
#[track_caller]
pub fn create_signal_with_compare<T: 'static>(value: T, compare: impl Fn(&T, &T) -> bool + 'static) -> Primary<T> {
	Primary::with_compare(value, compare)
}

/// Creates a computed signal
#[track_caller]
pub fn create_computed<T: 'static>(compute: impl Fn(&Track<'_>) -> T + 'static) -> Computed<T> {
	Computed::new(compute)
}
