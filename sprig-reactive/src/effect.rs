//! Effect
//!
//! An effect is a function that is re-run whenever one of its dependencies
//! changes.
//!
//! Effects never run within the write that notified them. Instead, a
//! notified effect asks its [`Scheduler`] to run it later, and any further
//! notifications until that run happens are coalesced into it.
//!
//! Like computed signals, effects gather their dependencies only on their
//! first run, which is itself scheduled when the effect is created.

// Modules
mod weak;

// Exports
pub use self::weak::WeakEffect;

// Imports
use {
	crate::{
		deps::Dependencies,
		loc::Loc,
		scheduler::{self, Scheduler},
		subscriber::WeakSubscriber,
		track::Track,
	},
	core::{
		cell::Cell,
		fmt,
		future::Future,
		hash::{Hash, Hasher},
		ptr,
	},
	futures::{FutureExt, future::LocalBoxFuture},
	std::rc::Rc,
};

/// Effect body
enum Body {
	/// Synchronous
	Sync(Box<dyn Fn(&Track<'_>)>),

	/// Asynchronous.
	///
	/// Only the synchronous part may read through the accessor, the
	/// returned future is handed to the scheduler.
	Async(Box<dyn Fn(&Track<'_>) -> LocalBoxFuture<'static, ()>>),
}

/// Effect inner
struct Inner {
	/// Whether a run is pending
	scheduled: Cell<bool>,

	/// Whether this effect was stopped
	stopped: Cell<bool>,

	/// Whether the dependencies have been gathered
	initialized: Cell<bool>,

	/// Dependencies
	deps: Dependencies,

	/// Body
	body: Body,

	/// Scheduler
	scheduler: Rc<dyn Scheduler>,

	/// Where this effect was defined
	defined_loc: Loc,
}

impl Inner {
	/// Returns a unique identifier to this effect
	fn id(&self) -> usize {
		ptr::from_ref(self).cast::<()>().addr()
	}
}

impl Drop for Inner {
	fn drop(&mut self) {
		self.deps.unsubscribe_all(self.id());
	}
}

/// Effect
pub struct Effect {
	/// Inner
	inner: Rc<Inner>,
}

impl Effect {
	/// Creates a new effect, using the default scheduler.
	///
	/// The first run, which gathers dependencies, is scheduled immediately.
	#[track_caller]
	pub fn new(run: impl Fn(&Track<'_>) + 'static) -> Self {
		Self::with_scheduler(run, scheduler::default())
	}

	/// Creates a new effect, using `scheduler` to defer its runs.
	#[track_caller]
	pub fn with_scheduler(run: impl Fn(&Track<'_>) + 'static, scheduler: Rc<dyn Scheduler>) -> Self {
		Self::from_body(Body::Sync(Box::new(run)), scheduler, Loc::caller())
	}

	/// Creates a new asynchronous effect, using the default scheduler.
	///
	/// `run` reads its dependencies synchronously and returns a future,
	/// which is spawned on the scheduler. The effect is considered idle
	/// as soon as `run` returns, without waiting for the future.
	#[track_caller]
	pub fn new_async<F, Fut>(run: F) -> Self
	where
		F: Fn(&Track<'_>) -> Fut + 'static,
		Fut: Future<Output = ()> + 'static,
	{
		Self::with_scheduler_async(run, scheduler::default())
	}

	/// Creates a new asynchronous effect, using `scheduler`.
	///
	/// See [`Self::new_async`] for details.
	#[track_caller]
	pub fn with_scheduler_async<F, Fut>(run: F, scheduler: Rc<dyn Scheduler>) -> Self
	where
		F: Fn(&Track<'_>) -> Fut + 'static,
		Fut: Future<Output = ()> + 'static,
	{
		let body = Body::Async(Box::new(move |track| run(track).boxed_local()));
		Self::from_body(body, scheduler, Loc::caller())
	}

	/// Creates the effect and schedules its first run
	fn from_body(body: Body, scheduler: Rc<dyn Scheduler>, defined_loc: Loc) -> Self {
		let inner = Inner {
			scheduled:   Cell::new(true),
			stopped:     Cell::new(false),
			initialized: Cell::new(false),
			deps:        Dependencies::new(),
			body,
			scheduler,
			defined_loc,
		};
		let effect = Self { inner: Rc::new(inner) };

		tracing::debug!(effect=%effect.inner.defined_loc, "Creating effect");
		effect.schedule();

		effect
	}

	/// Asks the scheduler to run this effect
	fn schedule(&self) {
		let effect = self.downgrade();
		self.inner.scheduler.schedule(Box::new(move || {
			if let Some(effect) = effect.upgrade() {
				effect.run();
			}
		}));
	}

	/// Runs this effect.
	///
	/// The first run gathers dependencies, while later runs only read them.
	/// Does nothing if stopped.
	fn run(&self) {
		if self.inner.stopped.get() {
			tracing::trace!(effect=%self.inner.defined_loc, "Skipping stopped effect");
			return;
		}

		match self.inner.initialized.get() {
			false => {
				let subscriber = WeakSubscriber::Effect(self.downgrade());
				self.run_with(&Track::subscribing(&subscriber, &self.inner.deps));
				self.inner.initialized.set(true);

				tracing::trace!(
					effect=%self.inner.defined_loc,
					dependencies=self.inner.deps.len(),
					"Initialized effect"
				);
			},
			true => {
				tracing::trace!(effect=%self.inner.defined_loc, "Running effect");
				self.run_with(&Track::untracked());
			},
		}
	}

	/// Runs the body with `track`
	fn run_with(&self, track: &Track<'_>) {
		// Note: Even if the body panics we must clear the flag,
		//       or the effect would never be scheduled again.
		//       Stopped effects keep it set so no new runs are enqueued.
		let _reset_scheduled = scopeguard::guard((), |()| self.inner.scheduled.set(self.inner.stopped.get()));

		match &self.inner.body {
			Body::Sync(run) => run(track),
			Body::Async(run) => {
				let fut = run(track);
				self.inner.scheduler.spawn(fut);
			},
		}
	}

	/// Notifies this effect that one of its dependencies changed.
	///
	/// Schedules a run, unless one is already pending.
	pub fn notify(&self) {
		if self.inner.scheduled.replace(true) {
			tracing::trace!(effect=%self.inner.defined_loc, "Coalescing effect notification");
			return;
		}

		tracing::trace!(effect=%self.inner.defined_loc, "Scheduling effect");
		self.schedule();
	}

	/// Stops this effect.
	///
	/// Any pending run becomes a no-op, and no further runs are scheduled.
	pub fn stop(&self) {
		if !self.inner.stopped.replace(true) {
			tracing::debug!(effect=%self.inner.defined_loc, "Stopping effect");
		}
		self.inner.scheduled.set(true);
	}

	/// Returns whether a run is pending
	#[must_use]
	pub fn is_scheduled(&self) -> bool {
		self.inner.scheduled.get()
	}

	/// Returns whether this effect was stopped
	#[must_use]
	pub fn is_stopped(&self) -> bool {
		self.inner.stopped.get()
	}

	/// Returns the number of primaries this effect depends on
	#[must_use]
	pub fn dependency_count(&self) -> usize {
		self.inner.deps.len()
	}

	/// Returns where this effect was defined
	#[must_use]
	pub fn defined_loc(&self) -> Loc {
		self.inner.defined_loc
	}

	/// Downgrades this effect
	#[must_use]
	pub fn downgrade(&self) -> WeakEffect {
		WeakEffect {
			inner: Rc::downgrade(&self.inner),
		}
	}

	/// Returns a unique identifier to this effect.
	///
	/// Downgrading and cloning the effect will retain the same id
	#[must_use]
	pub fn id(&self) -> usize {
		self.inner.id()
	}
}

impl Clone for Effect {
	fn clone(&self) -> Self {
		Self {
			inner: Rc::clone(&self.inner),
		}
	}
}

impl PartialEq for Effect {
	fn eq(&self, other: &Self) -> bool {
		self.id() == other.id()
	}
}

impl Eq for Effect {}

impl Hash for Effect {
	fn hash<H: Hasher>(&self, state: &mut H) {
		self.id().hash(state);
	}
}

impl fmt::Debug for Effect {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Effect")
			.field("defined_loc", &self.inner.defined_loc)
			.field("scheduled", &self.inner.scheduled.get())
			.field("stopped", &self.inner.stopped.get())
			.field("deps", &self.inner.deps)
			.finish()
	}
}
