//! Tracking accessor
//!
//! A [`Track`] is handed to every compute and effect function. Reading a
//! signal through it returns the signal's value, and, the first time a
//! subscriber runs, also subscribes it to every primary underneath the
//! signal.
//!
//! Dependencies always flatten onto primaries: reading a computed node
//! subscribes to the primaries *it* depends on, never to the node itself.

// Imports
use crate::{
	deps::Dependencies,
	signal::{Signal, SignalKind},
	subscriber::WeakSubscriber,
};

/// Subscribing state of a [`Track`]
struct Subscribing<'a> {
	/// Subscriber being run
	subscriber: &'a WeakSubscriber,

	/// The subscriber's dependencies
	deps: &'a Dependencies,
}

/// Tracking accessor
pub struct Track<'a> {
	/// Subscribing state, if subscribing
	subscribing: Option<Subscribing<'a>>,
}

impl<'a> Track<'a> {
	/// Creates a tracking accessor that subscribes `subscriber` to
	/// everything read.
	pub(crate) const fn subscribing(subscriber: &'a WeakSubscriber, deps: &'a Dependencies) -> Self {
		Self {
			subscribing: Some(Subscribing { subscriber, deps }),
		}
	}
}

impl Track<'static> {
	/// Creates a tracking accessor that only reads values
	#[must_use]
	pub const fn untracked() -> Self {
		Self { subscribing: None }
	}
}

impl Track<'_> {
	/// Returns whether reading through this accessor subscribes
	#[must_use]
	pub const fn is_subscribing(&self) -> bool {
		self.subscribing.is_some()
	}

	/// Uses a signal's value, subscribing to it if subscribing.
	pub fn with<S, O>(&self, signal: &S, f: impl FnOnce(&S::Value) -> O) -> O
	where
		S: ?Sized + Signal<Value: 'static>,
	{
		let signal = signal.kind();
		let output = signal.with(f);
		self.subscribe(signal);

		output
	}

	/// Gets a signal's value, subscribing to it if subscribing.
	pub fn get<S>(&self, signal: &S) -> S::Value
	where
		S: ?Sized + Signal<Value: Clone + 'static>,
	{
		let signal = signal.kind();
		let value = signal.get();
		self.subscribe(signal);

		value
	}

	/// Gets the values of all `signals`, in order.
	pub fn all<I>(&self, signals: I) -> Vec<<I::Item as Signal>::Value>
	where
		I: IntoIterator<Item: Signal<Value: Clone + 'static>>,
	{
		signals.into_iter().map(|signal| self.get(&signal)).collect()
	}

	/// Subscribes to all primaries underneath `signal`, if subscribing.
	fn subscribe<T: 'static>(&self, signal: SignalKind<'_, T>) {
		let Some(subscribing) = &self.subscribing else {
			return;
		};

		for primary in signal.primaries() {
			subscribing.deps.subscribe(subscribing.subscriber, primary);
		}
	}
}
