//! Sum demo
//!
//! Keeps a running sum of a few signals, logging it whenever it changes.

// Imports
use sprig_reactive::{Computed, Primary, clear_effect, create_effect, pending_microtasks, run_microtasks};

fn main() {
	sprig_logger::init();

	let a = Primary::new(10_i32);
	let b = Primary::new(20_i32);
	let sum = Computed::new({
		let (a, b) = (a.clone(), b.clone());
		move |track| track.get(&a) + track.get(&b)
	});

	let token = create_effect({
		let sum = sum.clone();
		move |track| tracing::info!(sum = track.get(&sum), "Sum changed")
	});
	run_microtasks();

	// Both writes are seen by a single run of the effect
	a.set(30);
	b.set(40);
	tracing::info!(pending = pending_microtasks(), "Wrote both signals");
	run_microtasks();

	// Writing the same value doesn't notify anyone
	b.set(40);
	run_microtasks();

	clear_effect(token);
	a.set(0);
	run_microtasks();

	tracing::info!(sum = sum.get(), subscribers = a.subscriber_count(), "Finished");
}
