//! Tokio scheduler

// Imports
use {
	super::{Scheduler, Task},
	futures::future::LocalBoxFuture,
};

/// Tokio scheduler.
///
/// Runs tasks and futures with [`tokio::task::spawn_local`], so it
/// must be used within a [`tokio::task::LocalSet`].
#[derive(Clone, Copy, Default, Debug)]
pub struct TokioScheduler;

impl Scheduler for TokioScheduler {
	fn schedule(&self, task: Task) {
		drop(tokio::task::spawn_local(async move { task() }));
	}

	fn spawn(&self, fut: LocalBoxFuture<'static, ()>) {
		drop(tokio::task::spawn_local(fut));
	}
}
