//! # Computed signals
//!
//! A computed signal, [`Computed`], lazily caches the result of a compute function
//! of other signals.
//!
//! Nothing is computed until the first [`Computed::get`]. That first computation
//! reads its signals through a subscribing [`Track`], which records the primaries
//! underneath everything read. Afterwards, whenever any of those primaries change,
//! the node is only marked dirty, and the next read recomputes it once, no matter
//! how many primaries changed in between.
//!
//! The dependencies gathered on the first computation are kept for the node's whole
//! lifetime. Later recomputations read through an untracked accessor, so a compute
//! function that branches on its inputs will not pick up signals it didn't read the
//! first time.
//!
//! ## Examples
//! ```rust
//! use sprig_reactive::{Computed, Primary};
//!
//! let a = Primary::new(10);
//! let b = Primary::new(20);
//! let sum = Computed::new({
//! 	let (a, b) = (a.clone(), b.clone());
//! 	move |track| track.get(&a) + track.get(&b)
//! });
//! assert_eq!(sum.get(), 30);
//!
//! a.set(30);
//! b.set(40);
//! assert_eq!(sum.get(), 70);
//! ```

// Imports
use {
	crate::{deps::Dependencies, loc::Loc, subscriber::WeakSubscriber, track::Track},
	core::{
		cell::{Cell, RefCell},
		fmt,
		ptr,
	},
	itertools::Itertools,
	std::rc::Rc,
};

/// Type-erased computed node, as seen by the primaries it depends on
pub trait ComputedNode {
	/// Marks this node as dirty.
	///
	/// The value will be recomputed on the next read.
	fn mark_dirty(&self);

	/// Returns whether this node is dirty
	fn is_dirty(&self) -> bool;

	/// Returns the number of primaries this node depends on
	fn dependency_count(&self) -> usize;

	/// Returns where this node was defined
	fn defined_loc(&self) -> Loc;
}

/// Computation state
#[derive(PartialEq, Eq, Clone, Copy, Debug)]
enum State {
	/// Never computed
	Uninitialized,

	/// Computed at least once, dependencies are fixed
	Ready,
}

/// Inner
struct Inner<T> {
	/// State
	state: Cell<State>,

	/// Whether the value is stale
	dirty: Cell<bool>,

	/// Value
	value: RefCell<Option<T>>,

	/// Dependencies
	deps: Dependencies,

	/// Compute function
	compute: Box<dyn Fn(&Track<'_>) -> T>,

	/// Where this node was defined
	defined_loc: Loc,
}

impl<T> Inner<T> {
	/// Returns a unique identifier to this node
	fn id(&self) -> usize {
		ptr::from_ref(self).cast::<()>().addr()
	}
}

impl<T> ComputedNode for Inner<T> {
	fn mark_dirty(&self) {
		if !self.dirty.replace(true) {
			tracing::trace!(computed=%self.defined_loc, "Marking computed signal dirty");
		}
	}

	fn is_dirty(&self) -> bool {
		self.dirty.get()
	}

	fn dependency_count(&self) -> usize {
		self.deps.len()
	}

	fn defined_loc(&self) -> Loc {
		self.defined_loc
	}
}

impl<T> Drop for Inner<T> {
	fn drop(&mut self) {
		self.deps.unsubscribe_all(self.id());
	}
}

/// Computed signal.
///
/// See the module documentation for more information.
pub struct Computed<T> {
	/// Inner
	inner: Rc<Inner<T>>,
}

impl<T: 'static> Computed<T> {
	/// Creates a new computed signal.
	///
	/// `compute` isn't called until the value is first read.
	#[track_caller]
	pub fn new(compute: impl Fn(&Track<'_>) -> T + 'static) -> Self {
		let inner = Inner {
			state:       Cell::new(State::Uninitialized),
			dirty:       Cell::new(true),
			value:       RefCell::new(None),
			deps:        Dependencies::new(),
			compute:     Box::new(compute),
			defined_loc: Loc::caller(),
		};
		Self { inner: Rc::new(inner) }
	}

	/// Uses the value, recomputing it first if needed.
	///
	/// # Panics
	/// If `compute` panics, the panic is propagated and the node is left
	/// dirty, so the next read will try again.
	pub fn with<O>(&self, f: impl FnOnce(&T) -> O) -> O {
		self.update();

		let value = self
			.inner
			.value
			.try_borrow()
			.expect("Cannot read computed signal while it's being recomputed");
		let value = value.as_ref().expect("Computed value wasn't initialized");
		f(value)
	}

	/// Gets the value, by cloning it.
	///
	/// See [`Self::with`] for details.
	#[must_use]
	pub fn get(&self) -> T
	where
		T: Clone,
	{
		self.with(T::clone)
	}

	/// Brings the value up to date
	fn update(&self) {
		match self.inner.state.get() {
			State::Uninitialized => {
				let this: Rc<dyn ComputedNode> = Rc::<Inner<T>>::clone(&self.inner);
				let subscriber = WeakSubscriber::Computed(Rc::downgrade(&this));
				drop(this);

				self.recompute(&Track::subscribing(&subscriber, &self.inner.deps));
				self.inner.state.set(State::Ready);

				tracing::trace!(
					"Initialized computed signal\nComputed    : {}\nDependencies: [{}]",
					self.inner.defined_loc,
					self.inner
						.deps
						.snapshot()
						.iter()
						.map(|primary| primary.defined_loc())
						.join(", "),
				);
			},
			State::Ready if self.inner.dirty.get() => {
				tracing::trace!(computed=%self.inner.defined_loc, "Recomputing computed signal");
				self.recompute(&Track::untracked());
			},
			State::Ready => (),
		}
	}

	/// Recomputes the value
	fn recompute(&self, track: &Track<'_>) {
		// Note: We clear the flag before computing so that any notifications
		//       during the computation are kept.
		self.inner.dirty.set(false);
		let _restore_dirty = scopeguard::guard_on_unwind((), |()| self.inner.dirty.set(true));

		let value = (self.inner.compute)(track);
		let prev_value = self
			.inner
			.value
			.try_borrow_mut()
			.expect("Cannot recompute computed signal while its value is borrowed")
			.replace(value);
		drop(prev_value);
	}
}

impl<T> Computed<T> {
	/// Returns whether the value is stale, or was never computed
	#[must_use]
	pub fn is_dirty(&self) -> bool {
		self.inner.dirty.get()
	}

	/// Returns whether the value was computed at least once
	#[must_use]
	pub fn is_initialized(&self) -> bool {
		self.inner.state.get() == State::Ready
	}

	/// Returns the number of primaries this node depends on
	#[must_use]
	pub fn dependency_count(&self) -> usize {
		self.inner.deps.len()
	}

	/// Returns where this node was defined
	#[must_use]
	pub fn defined_loc(&self) -> Loc {
		self.inner.defined_loc
	}

	/// Returns a unique identifier to this node.
	///
	/// Cloning the node will retain the same id
	#[must_use]
	pub fn id(&self) -> usize {
		self.inner.id()
	}

	/// Returns the dependencies of this node
	pub(crate) fn dependencies(&self) -> &Dependencies {
		&self.inner.deps
	}
}

impl<T> Clone for Computed<T> {
	fn clone(&self) -> Self {
		Self {
			inner: Rc::clone(&self.inner),
		}
	}
}

impl<T> PartialEq for Computed<T> {
	fn eq(&self, other: &Self) -> bool {
		self.id() == other.id()
	}
}

impl<T> Eq for Computed<T> {}

impl<T: fmt::Debug> fmt::Debug for Computed<T> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let mut s = f.debug_struct("Computed");
		s.field("defined_loc", &self.inner.defined_loc)
			.field("dirty", &self.inner.dirty.get())
			.field("deps", &self.inner.deps);
		match self.inner.value.try_borrow() {
			Ok(value) => s.field("value", &*value).finish(),
			Err(_) => s.finish_non_exhaustive(),
		}
	}
}
