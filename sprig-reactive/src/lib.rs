//! Reactivity for `sprig`
//!
//! A fine-grained dependency-tracking runtime, made of:
//! - [`Primary`] signals, which hold a value and notify their subscribers when it changes.
//! - [`Computed`] signals, which lazily cache a function of other signals.
//! - [`Effect`]s, which re-run a side effect, on a [`Scheduler`], whenever their dependencies change.
//!
//! Primaries only keep their subscribers weakly. Computed signals are dropped like any
//! other value, while effects are kept alive by an [`EffectManager`] until cleared.

// Modules
pub mod compare;
pub mod computed;
mod deps;
pub mod effect;
pub mod error;
pub mod loc;
pub mod manager;
pub mod primary;
pub mod scheduler;
pub mod signal;
pub mod subscriber;
pub mod track;

// Exports
pub use self::{
	compare::{CompareFn, SameValue},
	computed::{Computed, ComputedNode},
	effect::{Effect, WeakEffect},
	error::SignalError,
	loc::Loc,
	manager::{
		EffectManager,
		EffectToken,
		clear_effect,
		create_async_effect,
		create_effect,
		create_effect_with_scheduler,
	},
	primary::{Primary, PrimaryNode},
	scheduler::{
		ImmediateScheduler,
		MicrotaskScheduler,
		QueueScheduler,
		Scheduler,
		pending_microtasks,
		run_microtasks,
	},
	signal::{Signal, SignalKind, create_computed, create_signal, create_signal_eq, create_signal_with_compare},
	subscriber::{Subscriber, WeakSubscriber},
	track::Track,
};
#[cfg(feature = "tokio")]
pub use self::scheduler::TokioScheduler;
