//! Computed signal tests

// Imports
use {
	core::cell::Cell,
	sprig_reactive::{Computed, Primary, create_computed, create_signal, create_signal_eq},
	std::rc::Rc,
};

/// Writes to many dependencies in one batch must only recompute once
#[test]
fn batch_recomputes_once() {
	sprig_logger::init_test();

	let primaries = (0..100_i32).map(Primary::new).collect::<Vec<_>>();
	let count = Rc::new(Cell::new(0_usize));
	let sum = Computed::new({
		let (primaries, count) = (primaries.clone(), Rc::clone(&count));
		move |track| {
			count.set(count.get() + 1);
			track.all(&primaries).into_iter().sum::<i32>()
		}
	});

	assert_eq!(sum.get(), (0..100).sum::<i32>());
	assert_eq!(count.get(), 1);
	assert_eq!(sum.dependency_count(), 100);

	for primary in &primaries {
		primary.set(primary.get() + 1);
	}
	assert_eq!(count.get(), 1, "Computed signal recomputed eagerly");

	assert_eq!(sum.get(), (1..=100).sum::<i32>());
	assert_eq!(sum.get(), (1..=100).sum::<i32>());
	assert_eq!(count.get(), 2, "Computed signal recomputed more than once per batch");
}

/// Dependencies flatten onto primaries, even through other computed signals
#[test]
fn scoped_subscription() {
	sprig_logger::init_test();

	let a = create_signal(10_i32);
	let b = create_signal(20_i32);
	let sum = create_computed({
		let (a, b) = (a.clone(), b.clone());
		move |track| track.get(&a) + track.get(&b)
	});
	assert_eq!(sum.get(), 30);
	assert_eq!(sum.dependency_count(), 2);

	let doubled = create_computed({
		let sum = sum.clone();
		move |track| track.get(&sum) * 2
	});
	assert_eq!(doubled.get(), 60);
	assert_eq!(doubled.dependency_count(), 2, "Intermediate computed signal was recorded as a dependency");
	assert_eq!(a.subscriber_count(), 2);
	assert_eq!(b.subscriber_count(), 2);

	a.set(30);
	b.set(40);
	assert!(sum.is_dirty());
	assert!(doubled.is_dirty());
	assert_eq!(doubled.get(), 140);
	assert_eq!(sum.get(), 70);
}

/// Reading a diamond only computes each node once
#[test]
fn diamond() {
	sprig_logger::init_test();

	let a = Primary::new(1_i32);
	let left_count = Rc::new(Cell::new(0_usize));
	let left = Computed::new({
		let (a, left_count) = (a.clone(), Rc::clone(&left_count));
		move |track| {
			left_count.set(left_count.get() + 1);
			track.get(&a) + 1
		}
	});
	let right = Computed::new({
		let a = a.clone();
		move |track| track.get(&a) * 10
	});
	let both = Computed::new({
		let (left, right) = (left.clone(), right.clone());
		move |track| (track.get(&left), track.get(&right))
	});

	assert_eq!(both.get(), (2, 10));
	assert_eq!(both.dependency_count(), 1);

	a.set(2);
	assert_eq!(both.get(), (3, 20));
	assert_eq!(left_count.get(), 2);
}

/// Writing an equal value doesn't invalidate anything
#[test]
fn equal_write_keeps_fresh() {
	sprig_logger::init_test();

	let a = Primary::new(f64::NAN);
	let computed = Computed::new({
		let a = a.clone();
		move |track| track.get(&a).is_nan()
	});
	assert!(computed.get());

	assert_eq!(a.try_set(f64::NAN), Ok(false));
	assert!(!computed.is_dirty(), "Writing `NaN` over `NaN` invalidated the signal");
}

/// Reading without a subscribing accessor never subscribes
#[test]
fn untracked_reads() {
	sprig_logger::init_test();

	let a = Primary::new(1_i32);
	let computed = Computed::new({
		let a = a.clone();
		move |_track| a.get()
	});

	assert_eq!(computed.get(), 1);
	assert_eq!(computed.dependency_count(), 0);
	assert_eq!(a.subscriber_count(), 0);

	a.set(2);
	assert_eq!(computed.get(), 1, "Untracked read was invalidated");
}

/// Compound values are compared structurally by default
#[test]
fn compound_values() {
	sprig_logger::init_test();

	#[derive(PartialEq, Clone, Debug)]
	struct Point {
		x: i32,
		y: i32,
	}

	let items = create_signal(Vec::from([1_i32, 2]));
	let origin = create_signal_eq(Point { x: 0, y: 0 });
	let count = Rc::new(Cell::new(0_usize));
	let summary = create_computed({
		let (items, origin, count) = (items.clone(), origin.clone(), Rc::clone(&count));
		move |track| {
			count.set(count.get() + 1);
			let items = track.get(&items);
			let origin = track.get(&origin);
			(items.len(), origin.x + origin.y)
		}
	});
	assert_eq!(summary.get(), (2, 0));

	items.set(Vec::from([1, 2]));
	origin.set(Point { x: 0, y: 0 });
	assert!(!summary.is_dirty(), "Equal compound writes invalidated the signal");

	origin.set(Point { x: 1, y: 2 });
	assert_eq!(summary.get(), (2, 3));
	assert_eq!(count.get(), 2);
}
