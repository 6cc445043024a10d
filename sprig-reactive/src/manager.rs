//! Effect registry
//!
//! Primaries only hold their effects weakly, so something else must keep
//! an effect alive for it to keep running. An [`EffectManager`] owns its
//! effects until they're cleared through the [`EffectToken`] returned on
//! creation.
//!
//! Each thread also has a default manager, used by [`create_effect`] and
//! [`clear_effect`].

// Imports
use {
	crate::{effect::Effect, scheduler::Scheduler, track::Track},
	core::{
		cell::RefCell,
		fmt,
		future::Future,
		mem,
		sync::atomic::{self, AtomicU64},
	},
	indexmap::IndexMap,
	std::rc::Rc,
};

/// Effect token.
///
/// Unique across all managers and threads.
#[derive(PartialEq, Eq, Clone, Copy, Hash, Debug)]
#[derive(derive_more::Display)]
#[display("#{_0}")]
pub struct EffectToken(u64);

impl EffectToken {
	/// Creates a new, never before seen, token
	fn new() -> Self {
		static NEXT: AtomicU64 = AtomicU64::new(0);
		Self(NEXT.fetch_add(1, atomic::Ordering::Relaxed))
	}
}

/// Effect manager
pub struct EffectManager {
	/// Effects
	effects: RefCell<IndexMap<EffectToken, Effect>>,
}

impl EffectManager {
	/// Creates an empty manager
	#[must_use]
	pub fn new() -> Self {
		Self {
			effects: RefCell::new(IndexMap::new()),
		}
	}

	/// Creates an effect using the default scheduler and registers it
	#[track_caller]
	pub fn create(&self, run: impl Fn(&Track<'_>) + 'static) -> EffectToken {
		self.insert(Effect::new(run))
	}

	/// Creates an effect using `scheduler` and registers it
	#[track_caller]
	pub fn create_with_scheduler(&self, run: impl Fn(&Track<'_>) + 'static, scheduler: Rc<dyn Scheduler>) -> EffectToken {
		self.insert(Effect::with_scheduler(run, scheduler))
	}

	/// Creates an asynchronous effect using the default scheduler and registers it.
	///
	/// See [`Effect::new_async`] for details.
	#[track_caller]
	pub fn create_async<F, Fut>(&self, run: F) -> EffectToken
	where
		F: Fn(&Track<'_>) -> Fut + 'static,
		Fut: Future<Output = ()> + 'static,
	{
		self.insert(Effect::new_async(run))
	}

	/// Registers an existing effect
	pub fn insert(&self, effect: Effect) -> EffectToken {
		let token = EffectToken::new();
		tracing::debug!(%token, effect=%effect.defined_loc(), "Registering effect");
		self.effects.borrow_mut().insert(token, effect);

		token
	}

	/// Returns the effect registered under `token`
	#[must_use]
	pub fn get(&self, token: EffectToken) -> Option<Effect> {
		self.effects.borrow().get(&token).cloned()
	}

	/// Stops and unregisters the effect under `token`.
	///
	/// Returns whether the effect was registered.
	#[expect(
		clippy::must_use_candidate,
		reason = "Clearing an unknown effect isn't an error"
	)]
	pub fn clear(&self, token: EffectToken) -> bool {
		let Some(effect) = self.get(token) else {
			tracing::trace!(%token, "Ignoring clear of unknown effect");
			return false;
		};

		effect.stop();
		let removed = self.effects.borrow_mut().swap_remove(&token);
		tracing::debug!(%token, effect=%effect.defined_loc(), "Cleared effect");

		// Note: Dropping the effect unsubscribes it, which must
		//       happen outside of the borrow.
		drop(removed);
		drop(effect);

		true
	}

	/// Returns whether an effect is registered under `token`
	#[must_use]
	pub fn contains(&self, token: EffectToken) -> bool {
		self.effects.borrow().contains_key(&token)
	}

	/// Returns the number of registered effects
	#[must_use]
	pub fn len(&self) -> usize {
		self.effects.borrow().len()
	}

	/// Returns whether no effects are registered
	#[must_use]
	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}

	/// Stops and unregisters all effects
	pub fn clear_all(&self) {
		let effects = mem::take(&mut *self.effects.borrow_mut());
		for effect in effects.values() {
			effect.stop();
		}

		if !effects.is_empty() {
			tracing::debug!(count = effects.len(), "Cleared all effects");
		}
		drop(effects);
	}
}

impl Default for EffectManager {
	fn default() -> Self {
		Self::new()
	}
}

impl Drop for EffectManager {
	fn drop(&mut self) {
		self.clear_all();
	}
}

impl fmt::Debug for EffectManager {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self.effects.try_borrow() {
			Ok(effects) => f.debug_map().entries(effects.iter()).finish(),
			Err(_) => f.debug_map().finish_non_exhaustive(),
		}
	}
}

thread_local! {
	/// Default manager
	static DEFAULT: EffectManager = EffectManager::new();
}

/// Uses this thread's default manager
pub fn with_default<O>(f: impl FnOnce(&EffectManager) -> O) -> O {
	DEFAULT.with(f)
}

/// Creates an effect on the default manager.
///
/// See [`EffectManager::create`].
#[track_caller]
pub fn create_effect(run: impl Fn(&Track<'_>) + 'static) -> EffectToken {
	let effect = Effect::new(run);
	self::with_default(|manager| manager.insert(effect))
}

/// Creates an effect with a scheduler on the default manager.
///
/// See [`EffectManager::create_with_scheduler`].
#[track_caller]
pub fn create_effect_with_scheduler(run: impl Fn(&Track<'_>) + 'static, scheduler: Rc<dyn Scheduler>) -> EffectToken {
	let effect = Effect::with_scheduler(run, scheduler);
	self::with_default(|manager| manager.insert(effect))
}

/// Creates an asynchronous effect on the default manager.
///
/// See [`EffectManager::create_async`].
#[track_caller]
pub fn create_async_effect<F, Fut>(run: F) -> EffectToken
where
	F: Fn(&Track<'_>) -> Fut + 'static,
	Fut: Future<Output = ()> + 'static,
{
	let effect = Effect::new_async(run);
	self::with_default(|manager| manager.insert(effect))
}

/// Clears an effect from the default manager.
///
/// Clearing an unknown, or already cleared, effect does nothing.
#[expect(
	clippy::must_use_candidate,
	reason = "Clearing an unknown effect isn't an error"
)]
pub fn clear_effect(token: EffectToken) -> bool {
	self::with_default(|manager| manager.clear(token))
}
