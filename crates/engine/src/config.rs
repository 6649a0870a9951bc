//! Configuration staging and the sealed mapper configuration.
//!
//! # Lifecycle
//!
//! A [`MapperBuilder`] is the single staging area for one configuration:
//! type maps, the strategy pipeline, and extension state all accumulate on
//! the builder, never in process-wide storage. [`MapperBuilder::build`]
//! runs every seal hook exactly once and freezes the result into an
//! immutable [`MapperConfig`]. After sealing, configuration membership
//! never changes; extensions may only mutate caches they own under their
//! own publication discipline.

use std::any::Any;
use std::sync::Arc;

use rustc_hash::FxHashMap as HashMap;

use crate::extensions::ExtensionMap;
use crate::mapper::Mapper;
use crate::pair::TypePair;
use crate::strategy::{AppendElement, ReplaceCollection, StrategyList};
use crate::type_map::{TypeMap, TypeMapBuilder};

type SealHook = Box<dyn FnOnce(&mut ExtensionMap) + Send>;

/// Mutable staging area for one mapper configuration.
pub struct MapperBuilder {
	type_maps: HashMap<TypePair, TypeMap>,
	strategies: StrategyList,
	extensions: ExtensionMap,
	seal_hooks: Vec<SealHook>,
}

impl MapperBuilder {
	/// Creates a builder seeded with the baseline replace and append
	/// strategies.
	pub fn new() -> Self {
		let mut strategies = StrategyList::new();
		strategies.push(Arc::new(ReplaceCollection));
		strategies.push(Arc::new(AppendElement));
		Self {
			type_maps: HashMap::default(),
			strategies,
			extensions: ExtensionMap::new(),
			seal_hooks: Vec::new(),
		}
	}

	/// Registers a declared type map. Panics if its pair was already
	/// declared.
	pub fn register_type_map<S, D>(&mut self, declaration: TypeMapBuilder<S, D>) -> &mut Self
	where
		S: Any,
		D: Any + Default + Send + Sync,
	{
		let map = declaration.build();
		let pair = map.pair();
		if self.type_maps.insert(pair, map).is_some() {
			panic!("type map for {pair} declared twice");
		}
		self
	}

	/// Returns the strategy pipeline for registration-time edits.
	pub fn strategies_mut(&mut self) -> &mut StrategyList {
		&mut self.strategies
	}

	/// Returns the staging extension state.
	pub fn extensions_mut(&mut self) -> &mut ExtensionMap {
		&mut self.extensions
	}

	/// Registers a hook to run exactly once when the configuration seals.
	pub fn on_seal(&mut self, hook: impl FnOnce(&mut ExtensionMap) + Send + 'static) -> &mut Self {
		self.seal_hooks.push(Box::new(hook));
		self
	}

	/// Seals the configuration: runs every seal hook in registration order,
	/// then freezes everything into an immutable [`Mapper`].
	pub fn build(self) -> Mapper {
		let Self { type_maps, strategies, mut extensions, seal_hooks } = self;
		for hook in seal_hooks {
			hook(&mut extensions);
		}
		tracing::debug!(
			type_maps = type_maps.len(),
			strategies = strategies.len(),
			"mapper configuration sealed"
		);
		Mapper::new(MapperConfig { type_maps, strategies, extensions })
	}
}

impl Default for MapperBuilder {
	fn default() -> Self {
		Self::new()
	}
}

/// A sealed, immutable mapper configuration.
pub struct MapperConfig {
	type_maps: HashMap<TypePair, TypeMap>,
	strategies: StrategyList,
	extensions: ExtensionMap,
}

impl MapperConfig {
	/// Resolves the type map declared for `pair`.
	pub fn type_map(&self, pair: TypePair) -> Option<&TypeMap> {
		self.type_maps.get(&pair)
	}

	/// Returns the sealed extension state.
	pub fn extensions(&self) -> &ExtensionMap {
		&self.extensions
	}

	/// Returns the strategy pipeline.
	pub fn strategies(&self) -> &StrategyList {
		&self.strategies
	}
}
