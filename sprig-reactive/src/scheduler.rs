//! Schedulers
//!
//! Effects never run synchronously when notified. Instead they ask their
//! [`Scheduler`] to run them later, which is what allows several writes to
//! coalesce into a single run.
//!
//! By default, effects use the [`MicrotaskScheduler`], whose queue is drained
//! by [`run_microtasks`]. The default can be changed per thread with
//! [`set_default`], or per effect when creating it.

// Modules
pub mod microtask;
pub mod queue;
#[cfg(feature = "tokio")]
pub mod tokio;

// Exports
#[cfg(feature = "tokio")]
pub use self::tokio::TokioScheduler;
pub use self::{
	microtask::{MicrotaskScheduler, pending_microtasks, run_microtasks},
	queue::QueueScheduler,
};

// Imports
use {core::cell::RefCell, futures::future::LocalBoxFuture, std::rc::Rc};

/// Deferred task
pub type Task = Box<dyn FnOnce()>;

/// Scheduler
pub trait Scheduler {
	/// Schedules `task` to run later
	fn schedule(&self, task: Task);

	/// Spawns `fut` to be run to completion
	fn spawn(&self, fut: LocalBoxFuture<'static, ()>);
}

thread_local! {
	/// Default scheduler
	static DEFAULT: RefCell<Rc<dyn Scheduler>> = RefCell::new(Rc::new(MicrotaskScheduler));
}

/// Returns this thread's default scheduler
#[must_use]
pub fn default() -> Rc<dyn Scheduler> {
	DEFAULT.with_borrow(Rc::clone)
}

/// Sets this thread's default scheduler.
///
/// Only affects effects created afterwards.
/// Returns the previous default scheduler.
#[expect(
	clippy::must_use_candidate,
	reason = "The caller may not want to restore the previous scheduler"
)]
pub fn set_default(scheduler: Rc<dyn Scheduler>) -> Rc<dyn Scheduler> {
	DEFAULT.replace(scheduler)
}

/// Immediate scheduler.
///
/// Runs tasks as soon as they're scheduled, so effects using it run
/// synchronously within the write that notified them.
///
/// Futures are spawned on the thread's microtask queue.
#[derive(Clone, Copy, Default, Debug)]
pub struct ImmediateScheduler;

impl Scheduler for ImmediateScheduler {
	fn schedule(&self, task: Task) {
		task();
	}

	fn spawn(&self, fut: LocalBoxFuture<'static, ()>) {
		MicrotaskScheduler.spawn(fut);
	}
}
