use std::any::{Any, TypeId};

use rustc_hash::FxHashMap as HashMap;

/// A type-keyed map for configuration extension state.
///
/// Extensions stage build-time state here through the builder and commit it
/// into the sealed configuration from a seal hook.
#[derive(Default)]
pub struct ExtensionMap {
	inner: HashMap<TypeId, Box<dyn Any + Send + Sync>>,
}

impl ExtensionMap {
	pub fn new() -> Self {
		Self::default()
	}

	/// Inserts extension state. Panics if state of this type is already
	/// present.
	pub fn insert<T: Any + Send + Sync>(&mut self, value: T) {
		let type_id = TypeId::of::<T>();
		if self.inner.contains_key(&type_id) {
			panic!(
				"extension state for type {} already registered",
				std::any::type_name::<T>()
			);
		}
		self.inner.insert(type_id, Box::new(value));
	}

	pub fn get<T: Any + Send + Sync>(&self) -> Option<&T> {
		self.inner.get(&TypeId::of::<T>())?.downcast_ref()
	}

	pub fn get_mut<T: Any + Send + Sync>(&mut self) -> Option<&mut T> {
		self.inner.get_mut(&TypeId::of::<T>())?.downcast_mut()
	}

	/// Gets extension state or panics if missing.
	pub fn expect<T: Any + Send + Sync>(&self) -> &T {
		self.get::<T>().unwrap_or_else(|| {
			panic!("extension state for type {} missing", std::any::type_name::<T>())
		})
	}

	/// Gets extension state mutably or panics if missing.
	pub fn expect_mut<T: Any + Send + Sync>(&mut self) -> &mut T {
		self.get_mut::<T>().unwrap_or_else(|| {
			panic!("extension state for type {} missing", std::any::type_name::<T>())
		})
	}

	/// Removes and returns extension state of the given type.
	pub fn take<T: Any + Send + Sync>(&mut self) -> Option<T> {
		let boxed = self.inner.remove(&TypeId::of::<T>())?;
		let value = boxed
			.downcast::<T>()
			.expect("extension state keyed under the wrong type");
		Some(*value)
	}

	/// Gets extension state, initializing it if missing.
	pub fn get_or_init<T: Any + Send + Sync, F: FnOnce() -> T>(&mut self, init: F) -> &mut T {
		self.inner
			.entry(TypeId::of::<T>())
			.or_insert_with(|| Box::new(init()))
			.downcast_mut()
			.expect("extension state keyed under the wrong type")
	}
}
