//! Value comparison
//!
//! Primary signals skip writes whose value compares equal to the current
//! one. Unless a comparison is given explicitly, the per-type default is
//! used, which is [`SameValue`] unless overridden with [`set_default`].

// Imports
use {
	core::{
		any::{Any, TypeId},
		cell::RefCell,
		future::Future,
	},
	futures::future::Shared,
	std::{collections::HashMap, rc::Rc},
};

/// Comparison function.
///
/// Returns `true` when both values should be considered the same.
pub type CompareFn<T> = Rc<dyn Fn(&T, &T) -> bool>;

/// Default "same value" comparison.
///
/// Plain values compare by value. Floats consider `NaN` equal to itself
/// and distinguish `+0.0` from `-0.0`. Shared pointers compare by identity.
pub trait SameValue {
	/// Returns whether `self` and `other` are the same value
	fn same_value(&self, other: &Self) -> bool;
}

#[duplicate::duplicate_item(
	T;
	[ () ];
	[ bool ];
	[ char ];
	[ u8 ];
	[ u16 ];
	[ u32 ];
	[ u64 ];
	[ u128 ];
	[ usize ];
	[ i8 ];
	[ i16 ];
	[ i32 ];
	[ i64 ];
	[ i128 ];
	[ isize ];
	[ String ];
	[ &'static str ];
)]
impl SameValue for T {
	fn same_value(&self, other: &Self) -> bool {
		self == other
	}
}

#[duplicate::duplicate_item(
	T;
	[ f32 ];
	[ f64 ];
)]
impl SameValue for T {
	fn same_value(&self, other: &Self) -> bool {
		match (self.is_nan(), other.is_nan()) {
			(true, true) => true,
			(false, false) => self.to_bits() == other.to_bits(),
			_ => false,
		}
	}
}

impl<T: SameValue> SameValue for Option<T> {
	fn same_value(&self, other: &Self) -> bool {
		match (self, other) {
			(Some(lhs), Some(rhs)) => lhs.same_value(rhs),
			(None, None) => true,
			_ => false,
		}
	}
}

impl SameValue for str {
	fn same_value(&self, other: &Self) -> bool {
		self == other
	}
}

impl<T: SameValue> SameValue for [T] {
	fn same_value(&self, other: &Self) -> bool {
		self.len() == other.len() && self.iter().zip(other).all(|(lhs, rhs)| lhs.same_value(rhs))
	}
}

impl<T: SameValue, const N: usize> SameValue for [T; N] {
	fn same_value(&self, other: &Self) -> bool {
		self.as_slice().same_value(other.as_slice())
	}
}

impl<T: SameValue> SameValue for Vec<T> {
	fn same_value(&self, other: &Self) -> bool {
		self.as_slice().same_value(other.as_slice())
	}
}

impl<T: ?Sized + SameValue> SameValue for Box<T> {
	fn same_value(&self, other: &Self) -> bool {
		(**self).same_value(&**other)
	}
}

#[duplicate::duplicate_item(
	Generics                                                                                     Tuple                        same_values;
	[ T0: SameValue ]                                                                            [ (T0,) ]                    [ self.0.same_value(&other.0) ];
	[ T0: SameValue, T1: SameValue ]                                                             [ (T0, T1) ]                 [ self.0.same_value(&other.0) && self.1.same_value(&other.1) ];
	[ T0: SameValue, T1: SameValue, T2: SameValue ]                                              [ (T0, T1, T2) ]             [ self.0.same_value(&other.0) && self.1.same_value(&other.1) && self.2.same_value(&other.2) ];
	[ T0: SameValue, T1: SameValue, T2: SameValue, T3: SameValue ]                               [ (T0, T1, T2, T3) ]         [ self.0.same_value(&other.0) && self.1.same_value(&other.1) && self.2.same_value(&other.2) && self.3.same_value(&other.3) ];
	[ T0: SameValue, T1: SameValue, T2: SameValue, T3: SameValue, T4: SameValue ]                [ (T0, T1, T2, T3, T4) ]     [ self.0.same_value(&other.0) && self.1.same_value(&other.1) && self.2.same_value(&other.2) && self.3.same_value(&other.3) && self.4.same_value(&other.4) ];
	[ T0: SameValue, T1: SameValue, T2: SameValue, T3: SameValue, T4: SameValue, T5: SameValue ] [ (T0, T1, T2, T3, T4, T5) ] [ self.0.same_value(&other.0) && self.1.same_value(&other.1) && self.2.same_value(&other.2) && self.3.same_value(&other.3) && self.4.same_value(&other.4) && self.5.same_value(&other.5) ];
)]
impl<Generics> SameValue for Tuple {
	fn same_value(&self, other: &Self) -> bool {
		same_values
	}
}

impl<T: ?Sized> SameValue for Rc<T> {
	fn same_value(&self, other: &Self) -> bool {
		Rc::ptr_eq(self, other)
	}
}

impl<Fut> SameValue for Shared<Fut>
where
	Fut: Future<Output: Clone>,
{
	fn same_value(&self, other: &Self) -> bool {
		Self::ptr_eq(self, other)
	}
}

thread_local! {
	/// Overridden default comparisons, by type.
	///
	/// Each value is a `CompareFn<T>` for the type with the key's id.
	static DEFAULTS: RefCell<HashMap<TypeId, Rc<dyn Any>>> = RefCell::new(HashMap::new());
}

/// Overrides the default comparison for `T` on this thread.
///
/// Only affects primaries created afterwards.
pub fn set_default<T: 'static>(compare: impl Fn(&T, &T) -> bool + 'static) {
	let compare: CompareFn<T> = Rc::new(compare);
	DEFAULTS.with_borrow_mut(|defaults| defaults.insert(TypeId::of::<T>(), Rc::new(compare)));
}

/// Removes any default comparison override for `T` on this thread.
///
/// Returns whether an override existed.
#[expect(
	clippy::must_use_candidate,
	reason = "The caller may not care whether an override existed"
)]
pub fn reset_default<T: 'static>() -> bool {
	DEFAULTS.with_borrow_mut(|defaults| defaults.remove(&TypeId::of::<T>()).is_some())
}

/// Returns the overridden default comparison for `T`, if any
#[must_use]
pub fn overridden<T: 'static>() -> Option<CompareFn<T>> {
	let compare = DEFAULTS.with_borrow(|defaults| defaults.get(&TypeId::of::<T>()).cloned())?;
	let compare = Rc::downcast::<CompareFn<T>>(compare)
		.expect("Default comparison was registered with the wrong type");
	Some(Rc::clone(&compare))
}

/// Returns the default comparison for `T`
#[must_use]
pub fn default_for<T: SameValue + 'static>() -> CompareFn<T> {
	self::overridden::<T>().unwrap_or_else(|| Rc::new(T::same_value) as CompareFn<T>)
}

/// Returns the default comparison for `T`, using [`PartialEq`] if not overridden.
///
/// For types that don't implement [`SameValue`].
#[must_use]
pub fn default_or_eq<T: PartialEq + 'static>() -> CompareFn<T> {
	self::overridden::<T>().unwrap_or_else(|| Rc::new(<T as PartialEq>::eq) as CompareFn<T>)
}
