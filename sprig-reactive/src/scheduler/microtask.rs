//! Microtask scheduler

// Imports
use {
	super::{Scheduler, Task, queue::TaskQueue},
	futures::future::LocalBoxFuture,
};

thread_local! {
	/// Microtask queue
	static MICROTASKS: TaskQueue = TaskQueue::new();
}

/// Microtask scheduler.
///
/// Pushes tasks onto this thread's microtask queue, which
/// is drained by [`run_microtasks`].
#[derive(Clone, Copy, Default, Debug)]
pub struct MicrotaskScheduler;

impl Scheduler for MicrotaskScheduler {
	fn schedule(&self, task: Task) {
		// Note: This only fails while the thread is being torn down, at
		//       which point nobody will drain the queue anyway.
		if MICROTASKS.try_with(|queue| queue.push(task)).is_err() {
			tracing::trace!("Dropping task scheduled during thread teardown");
		}
	}

	fn spawn(&self, fut: LocalBoxFuture<'static, ()>) {
		if MICROTASKS.try_with(|queue| queue.spawn(fut)).is_err() {
			tracing::trace!("Dropping future spawned during thread teardown");
		}
	}
}

/// Runs all microtasks on this thread.
///
/// Tasks are run in the order they were scheduled, including any
/// scheduled while running. Spawned futures are polled until they
/// can't make progress, and the whole process is repeated until no
/// tasks remain.
///
/// Returns the number of tasks run.
/// Calling this from within a microtask does nothing and returns `0`.
#[expect(
	clippy::must_use_candidate,
	reason = "The caller may not care how many tasks were run"
)]
pub fn run_microtasks() -> usize {
	MICROTASKS.with(TaskQueue::run)
}

/// Returns the number of pending microtasks on this thread
#[must_use]
pub fn pending_microtasks() -> usize {
	MICROTASKS.with(TaskQueue::len)
}

#[cfg(test)]
mod tests {
	// Imports
	use {
		super::*,
		core::cell::{Cell, RefCell},
		std::rc::Rc,
	};

	#[test]
	fn deferred_until_run() {
		let order = Rc::new(RefCell::new(vec![]));
		for idx in 0..3_usize {
			let order = Rc::clone(&order);
			MicrotaskScheduler.schedule(Box::new(move || order.borrow_mut().push(idx)));
		}

		assert_eq!(pending_microtasks(), 3);
		assert!(order.borrow().is_empty(), "Microtasks ran eagerly");

		assert_eq!(run_microtasks(), 3);
		assert_eq!(*order.borrow(), [0, 1, 2]);
		assert_eq!(pending_microtasks(), 0);
	}

	#[test]
	fn reentrant_run_is_noop() {
		let inner_ran = Rc::new(Cell::new(None));

		let task_inner_ran = Rc::clone(&inner_ran);
		MicrotaskScheduler.schedule(Box::new(move || task_inner_ran.set(Some(run_microtasks()))));

		assert_eq!(run_microtasks(), 1);
		assert_eq!(inner_ran.get(), Some(0), "Reentrant run ran tasks");
	}
}
