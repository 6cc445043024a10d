//! Queue scheduler

// Imports
use {
	super::{Scheduler, Task},
	core::{
		cell::{Cell, RefCell},
		fmt,
	},
	futures::{
		executor::{LocalPool, LocalSpawner},
		future::LocalBoxFuture,
		task::LocalSpawnExt,
	},
	std::collections::VecDeque,
};

/// Task queue.
///
/// Holds tasks in FIFO order, alongside an executor for spawned futures.
pub(crate) struct TaskQueue {
	/// Tasks
	tasks: RefCell<VecDeque<Task>>,

	/// Executor for spawned futures
	pool: RefCell<LocalPool>,

	/// Spawner for `pool`
	spawner: LocalSpawner,

	/// Whether we're currently running
	is_running: Cell<bool>,
}

impl TaskQueue {
	/// Creates an empty queue
	pub(crate) fn new() -> Self {
		let pool = LocalPool::new();
		let spawner = pool.spawner();
		Self {
			tasks:      RefCell::new(VecDeque::new()),
			pool:       RefCell::new(pool),
			spawner,
			is_running: Cell::new(false),
		}
	}

	/// Pushes a task to the back of the queue
	pub(crate) fn push(&self, task: Task) {
		self.tasks.borrow_mut().push_back(task);
	}

	/// Spawns a future onto the executor
	pub(crate) fn spawn(&self, fut: LocalBoxFuture<'static, ()>) {
		if let Err(err) = self.spawner.spawn_local(fut) {
			tracing::warn!(?err, "Unable to spawn effect future");
		}
	}

	/// Returns the number of pending tasks
	pub(crate) fn len(&self) -> usize {
		self.tasks.borrow().len()
	}

	/// Pops the front task
	fn pop(&self) -> Option<Task> {
		self.tasks.borrow_mut().pop_front()
	}

	/// Runs all tasks, including any scheduled while running, and polls all
	/// spawned futures until they can't make progress.
	///
	/// Returns the number of tasks run.
	/// If the queue is already running, returns `0` without running anything.
	pub(crate) fn run(&self) -> usize {
		if self.is_running.replace(true) {
			return 0;
		}
		let _is_running = scopeguard::guard((), |()| self.is_running.set(false));

		let mut tasks_run = 0;
		loop {
			while let Some(task) = self.pop() {
				task();
				tasks_run += 1;
			}

			self.pool.borrow_mut().run_until_stalled();
			if self.tasks.borrow().is_empty() {
				break;
			}
		}

		tasks_run
	}
}

/// Queue scheduler.
///
/// Keeps tasks until [`QueueScheduler::run_pending`] is called, letting the
/// caller decide where the task boundary lies.
pub struct QueueScheduler {
	/// Queue
	queue: TaskQueue,
}

impl QueueScheduler {
	/// Creates a new, empty, queue scheduler
	#[must_use]
	pub fn new() -> Self {
		Self { queue: TaskQueue::new() }
	}

	/// Returns the number of pending tasks
	#[must_use]
	pub fn len(&self) -> usize {
		self.queue.len()
	}

	/// Returns whether there are no pending tasks
	#[must_use]
	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}

	/// Runs all pending tasks and spawned futures.
	///
	/// Returns the number of tasks run.
	#[expect(
		clippy::must_use_candidate,
		reason = "The caller may not care how many tasks were run"
	)]
	pub fn run_pending(&self) -> usize {
		self.queue.run()
	}
}

impl Scheduler for QueueScheduler {
	fn schedule(&self, task: Task) {
		self.queue.push(task);
	}

	fn spawn(&self, fut: LocalBoxFuture<'static, ()>) {
		self.queue.spawn(fut);
	}
}

impl Default for QueueScheduler {
	fn default() -> Self {
		Self::new()
	}
}

impl fmt::Debug for QueueScheduler {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("QueueScheduler")
			.field("pending", &self.len())
			.finish_non_exhaustive()
	}
}

#[cfg(test)]
mod tests {
	// Imports
	use {super::*, std::rc::Rc};

	#[test]
	fn fifo() {
		let order = Rc::new(RefCell::new(vec![]));
		let queue = QueueScheduler::new();
		for idx in 0..3_usize {
			let order = Rc::clone(&order);
			queue.schedule(Box::new(move || order.borrow_mut().push(idx)));
		}

		assert_eq!(queue.len(), 3);
		assert!(order.borrow().is_empty(), "Tasks ran before being drained");

		assert_eq!(queue.run_pending(), 3);
		assert_eq!(*order.borrow(), [0, 1, 2], "Tasks didn't run in FIFO order");
		assert!(queue.is_empty());
	}

	#[test]
	fn tasks_scheduled_while_running() {
		let count = Rc::new(Cell::new(0_usize));
		let queue = Rc::new(QueueScheduler::new());

		let inner_queue = Rc::clone(&queue);
		let inner_count = Rc::clone(&count);
		queue.schedule(Box::new(move || {
			inner_count.set(inner_count.get() + 1);
			inner_queue.schedule(Box::new(move || inner_count.set(inner_count.get() + 1)));
		}));

		assert_eq!(queue.run_pending(), 2, "Task scheduled while running wasn't run");
		assert_eq!(count.get(), 2);
	}

	#[test]
	fn spawned_futures() {
		let done = Rc::new(Cell::new(false));
		let queue = QueueScheduler::new();

		let fut_done = Rc::clone(&done);
		queue.spawn(Box::pin(async move {
			futures::future::ready(()).await;
			fut_done.set(true);
		}));
		assert!(!done.get(), "Future was run eagerly");

		assert_eq!(queue.run_pending(), 0);
		assert!(done.get(), "Future wasn't run");
	}
}
