//! Primary signal
//!
//! A read-write value that notifies its subscribers whenever it's
//! set to a different value.
//!
//! Subscribers are only kept weakly: a computed node or effect that's
//! no longer referenced anywhere else is dropped, and its entry in the
//! primary's registry goes away with it.

// Imports
use {
	crate::{
		compare::{self, CompareFn, SameValue},
		error::SignalError,
		loc::Loc,
		subscriber::{Subscriber, WeakSubscriber},
	},
	core::{cell::RefCell, fmt, mem, ptr},
	sprig_util::WeakSet,
	std::rc::Rc,
};

/// Type-erased primary, as seen by its subscribers
pub trait PrimaryNode {
	/// Returns a unique identifier to this primary
	fn id(&self) -> usize;

	/// Returns the subscriber registry
	fn subscribers(&self) -> &RefCell<WeakSet<WeakSubscriber>>;

	/// Returns where this primary was defined
	fn defined_loc(&self) -> Loc;
}

/// Inner
struct Inner<T> {
	/// Value
	value: RefCell<T>,

	/// Comparison
	compare: CompareFn<T>,

	/// Subscribers
	subscribers: RefCell<WeakSet<WeakSubscriber>>,

	/// Where this primary was defined
	defined_loc: Loc,
}

impl<T> PrimaryNode for Inner<T> {
	fn id(&self) -> usize {
		ptr::from_ref(self).cast::<()>().addr()
	}

	fn subscribers(&self) -> &RefCell<WeakSet<WeakSubscriber>> {
		&self.subscribers
	}

	fn defined_loc(&self) -> Loc {
		self.defined_loc
	}
}

/// Primary signal
pub struct Primary<T> {
	/// Inner
	inner: Rc<Inner<T>>,
}

impl<T> Primary<T> {
	/// Creates a new primary signal, using the default comparison for `T`
	#[track_caller]
	pub fn new(value: T) -> Self
	where
		T: SameValue + 'static,
	{
		Self::with_compare_fn(value, compare::default_for::<T>())
	}

	/// Creates a new primary signal for a type without a [`SameValue`] impl.
	///
	/// Uses the default comparison set for `T` with [`compare::set_default`],
	/// or [`PartialEq`] if there is none.
	#[track_caller]
	pub fn new_eq(value: T) -> Self
	where
		T: PartialEq + 'static,
	{
		Self::with_compare_fn(value, compare::default_or_eq::<T>())
	}

	/// Creates a new primary signal with a custom comparison.
	///
	/// Writes for which `compare(current, new)` returns `true` are skipped.
	#[track_caller]
	pub fn with_compare(value: T, compare: impl Fn(&T, &T) -> bool + 'static) -> Self
	where
		T: 'static,
	{
		Self::with_compare_fn(value, Rc::new(compare))
	}

	/// Creates a new primary signal with a shared comparison
	#[track_caller]
	pub fn with_compare_fn(value: T, compare: CompareFn<T>) -> Self {
		let inner = Inner {
			value:       RefCell::new(value),
			compare,
			subscribers: RefCell::new(WeakSet::new()),
			defined_loc: Loc::caller(),
		};
		Self { inner: Rc::new(inner) }
	}

	/// Uses the value.
	///
	/// This never subscribes anything, see [`Track`](crate::Track) for that.
	pub fn with<O>(&self, f: impl FnOnce(&T) -> O) -> O {
		let value = self
			.inner
			.value
			.try_borrow()
			.expect("Cannot read primary signal while it's being written");
		f(&value)
	}

	/// Gets the value, by cloning it.
	#[must_use]
	pub fn get(&self) -> T
	where
		T: Clone,
	{
		self.with(T::clone)
	}

	/// Sets the value.
	///
	/// If the new value compares the same as the current one, nothing happens.
	/// Otherwise the value is replaced, and all live subscribers are notified,
	/// in the order they subscribed, before returning.
	///
	/// # Panics
	/// Panics if the value is currently borrowed by [`Self::with`].
	pub fn set(&self, value: T) {
		self.try_set(value)
			.expect("Cannot set primary signal while it's being read");
	}

	/// Tries to set the value.
	///
	/// Returns whether the value changed.
	pub fn try_set(&self, value: T) -> Result<bool, SignalError> {
		let defined_loc = self.inner.defined_loc;
		let is_same = {
			let current = self
				.inner
				.value
				.try_borrow()
				.map_err(|_err| SignalError::Borrowed { defined_loc })?;
			(self.inner.compare)(&current, &value)
		};
		if is_same {
			tracing::trace!(primary=%defined_loc, "Skipping write of the same value");
			return Ok(false);
		}

		let prev_value = {
			let mut current = self
				.inner
				.value
				.try_borrow_mut()
				.map_err(|_err| SignalError::Borrowed { defined_loc })?;
			mem::replace(&mut *current, value)
		};
		drop(prev_value);

		self.notify_subscribers();
		Ok(true)
	}

	/// Notifies all live subscribers
	fn notify_subscribers(&self) {
		let subscribers = self.inner.subscribers.borrow_mut().live();
		tracing::trace!(
			primary=%self.inner.defined_loc,
			subscribers=subscribers.len(),
			"Notifying subscribers"
		);

		for subscriber in subscribers {
			subscriber.notify();
		}
	}

	/// Returns the number of live subscribers
	#[must_use]
	pub fn subscriber_count(&self) -> usize {
		self.inner.subscribers.borrow_mut().len()
	}

	/// Returns all live subscribers, in the order they subscribed
	#[must_use]
	pub fn subscribers(&self) -> Vec<Subscriber> {
		self.inner.subscribers.borrow_mut().live()
	}

	/// Returns where this primary was defined
	#[must_use]
	pub fn defined_loc(&self) -> Loc {
		self.inner.defined_loc
	}

	/// Returns a unique identifier to this primary.
	///
	/// Cloning the primary will retain the same id
	#[must_use]
	pub fn id(&self) -> usize {
		self.inner.id()
	}

	/// Returns the type-erased node of this primary
	pub(crate) fn node(&self) -> Rc<dyn PrimaryNode>
	where
		T: 'static,
	{
		Rc::<Inner<T>>::clone(&self.inner)
	}
}

impl<T> Clone for Primary<T> {
	fn clone(&self) -> Self {
		Self {
			inner: Rc::clone(&self.inner),
		}
	}
}

impl<T> PartialEq for Primary<T> {
	fn eq(&self, other: &Self) -> bool {
		self.id() == other.id()
	}
}

impl<T> Eq for Primary<T> {}

impl<T: fmt::Debug> fmt::Debug for Primary<T> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let mut s = f.debug_struct("Primary");
		s.field("defined_loc", &self.inner.defined_loc);
		match self.inner.value.try_borrow() {
			Ok(value) => s.field("value", &*value).finish(),
			Err(_) => s.finish_non_exhaustive(),
		}
	}
}

#[cfg(test)]
mod tests {
	// Imports
	use {super::*, crate::Computed};

	#[test]
	fn get_set() {
		let primary = Primary::new(5_i32);
		assert_eq!(primary.get(), 5);

		primary.set(6);
		assert_eq!(primary.get(), 6);
	}

	#[test]
	fn equal_write_skipped() {
		let primary = Primary::new(5_i32);
		let computed = Computed::new({
			let primary = primary.clone();
			move |track| track.get(&primary)
		});
		assert_eq!(computed.get(), 5);
		assert!(!computed.is_dirty());

		assert_eq!(primary.try_set(5), Ok(false), "Equal write changed the value");
		assert!(!computed.is_dirty(), "Equal write notified subscribers");

		assert_eq!(primary.try_set(7), Ok(true));
		assert!(computed.is_dirty(), "Write didn't notify subscribers");
	}

	#[test]
	fn nan_write_skipped() {
		let primary = Primary::new(f64::NAN);
		assert_eq!(primary.try_set(f64::NAN), Ok(false), "NaN write wasn't skipped");
		assert_eq!(primary.try_set(0.0), Ok(true));
		assert_eq!(primary.try_set(-0.0), Ok(true), "-0 write was skipped");
	}

	#[test]
	fn custom_compare() {
		let primary = Primary::with_compare(vec![1_i32, 2], |lhs, rhs| lhs.len() == rhs.len());
		assert_eq!(primary.try_set(vec![3, 4]), Ok(false));
		assert_eq!(primary.get(), [1, 2]);
		assert_eq!(primary.try_set(vec![3]), Ok(true));
		assert_eq!(primary.get(), [3]);
	}

	#[test]
	fn default_compare_override() {
		compare::set_default::<u8>(|_, _| false);
		let primary = Primary::new(1_u8);
		compare::reset_default::<u8>();

		assert_eq!(primary.try_set(1), Ok(true), "Overridden comparison wasn't used");
	}

	#[test]
	fn set_while_reading() {
		let primary = Primary::new(1_i32);
		let res = primary.with(|_| primary.try_set(2));
		assert_eq!(res, Err(SignalError::Borrowed {
			defined_loc: primary.defined_loc(),
		}));
		assert_eq!(primary.get(), 1);
	}

	#[test]
	fn get_never_subscribes() {
		let primary = Primary::new(1_i32);
		let computed = Computed::new({
			let primary = primary.clone();
			move |_track| primary.get()
		});

		assert_eq!(computed.get(), 1);
		assert_eq!(primary.subscriber_count(), 0);
		assert_eq!(computed.dependency_count(), 0);
	}

	#[test]
	fn structural_values() {
		let primary = Primary::new(Vec::from([(1_i32, 2_i32)]));
		assert_eq!(primary.try_set(Vec::from([(1, 2)])), Ok(false), "Equal vector write wasn't skipped");
		assert_eq!(primary.try_set(Vec::from([(1, 3)])), Ok(true));
	}

	#[test]
	fn eq_default_override() {
		#[derive(PartialEq, Clone, Debug)]
		struct Celsius(f32);

		let primary = Primary::new_eq(Celsius(20.0));
		assert_eq!(primary.try_set(Celsius(20.0)), Ok(false));
		assert_eq!(primary.try_set(Celsius(20.4)), Ok(true));

		compare::set_default::<Celsius>(|lhs, rhs| (lhs.0 - rhs.0).abs() < 1.0);
		let rounded = Primary::new_eq(Celsius(20.0));
		compare::reset_default::<Celsius>();

		assert_eq!(rounded.try_set(Celsius(20.4)), Ok(false), "Overridden comparison wasn't used");
		assert_eq!(rounded.try_set(Celsius(25.0)), Ok(true));
	}
}
