//! Tokio scheduler tests

#![cfg(feature = "tokio")]

// Imports
use {
	core::cell::Cell,
	sprig_reactive::{Effect, Primary, TokioScheduler},
	std::rc::Rc,
	tokio::task::LocalSet,
};

/// Yields to the local set until spawned tasks had a chance to run
async fn settle() {
	for _ in 0..10 {
		tokio::task::yield_now().await;
	}
}

#[tokio::test(flavor = "current_thread")]
async fn effects_run_on_local_set() {
	sprig_logger::init_test();

	LocalSet::new()
		.run_until(async {
			let a = Primary::new(0_i32);
			let runs = Rc::new(Cell::new(0_usize));
			let _effect = Effect::with_scheduler(
				{
					let (a, runs) = (a.clone(), Rc::clone(&runs));
					move |track| {
						track.get(&a);
						runs.set(runs.get() + 1);
					}
				},
				Rc::new(TokioScheduler),
			);
			assert_eq!(runs.get(), 0);

			self::settle().await;
			assert_eq!(runs.get(), 1, "Effect didn't run on the local set");

			a.set(1);
			a.set(2);
			self::settle().await;
			assert_eq!(runs.get(), 2, "Notifications weren't coalesced");
		})
		.await;
}

#[tokio::test(flavor = "current_thread")]
async fn async_effects_run_on_local_set() {
	sprig_logger::init_test();

	LocalSet::new()
		.run_until(async {
			let a = Primary::new(1_i32);
			let last = Rc::new(Cell::new(0_i32));
			let _effect = Effect::with_scheduler_async(
				{
					let (a, last) = (a.clone(), Rc::clone(&last));
					move |track| {
						let value = track.get(&a);
						let last = Rc::clone(&last);
						async move {
							tokio::task::yield_now().await;
							last.set(value);
						}
					}
				},
				Rc::new(TokioScheduler),
			);

			self::settle().await;
			assert_eq!(last.get(), 1);

			a.set(5);
			self::settle().await;
			assert_eq!(last.get(), 5);
		})
		.await;
}
