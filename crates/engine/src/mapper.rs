//! Map-time entry points.

use std::any::Any;
use std::sync::Arc;

use crate::config::MapperConfig;
use crate::error::MapError;
use crate::pair::TypePair;
use crate::strategy::{MapRequest, SourceView};

/// A sealed mapper. Cheap to clone and safe to share across threads.
#[derive(Clone)]
pub struct Mapper {
	config: Arc<MapperConfig>,
}

impl Mapper {
	pub(crate) fn new(config: MapperConfig) -> Self {
		Self { config: Arc::new(config) }
	}

	/// Returns the sealed configuration.
	pub fn config(&self) -> &MapperConfig {
		&self.config
	}

	/// Maps `source` into a fresh destination object.
	pub fn map<S, D>(&self, source: &S) -> Result<D, MapError>
	where
		S: Any,
		D: Any,
	{
		let pair = TypePair::of::<S, D>();
		let type_map = self.config.type_map(pair).ok_or(MapError::MissingTypeMap(pair))?;
		match type_map.map_boxed(source).downcast::<D>() {
			Ok(dest) => Ok(*dest),
			Err(_) => panic!("type map for {pair} constructed the wrong destination type"),
		}
	}

	/// Maps `source` onto an existing destination object in place.
	pub fn map_into<S, D>(&self, source: &S, dest: &mut D) -> Result<(), MapError>
	where
		S: Any,
		D: Any,
	{
		let pair = TypePair::of::<S, D>();
		let type_map = self.config.type_map(pair).ok_or(MapError::MissingTypeMap(pair))?;
		type_map.apply(source, dest);
		Ok(())
	}

	/// Maps a source sequence into a destination collection through the
	/// strategy pipeline.
	pub fn map_collection<S, D>(&self, source: &[S], dest: &mut Vec<D>) -> Result<(), MapError>
	where
		S: Any,
		D: Any,
	{
		self.run(MapRequest {
			config: &self.config,
			pair: TypePair::of::<S, D>(),
			source: SourceView::Collection(&source),
			dest,
		})
	}

	/// Merges a single source element into a destination collection through
	/// the strategy pipeline.
	pub fn merge<S, D>(&self, source: &S, dest: &mut Vec<D>) -> Result<(), MapError>
	where
		S: Any,
		D: Any,
	{
		self.run(MapRequest {
			config: &self.config,
			pair: TypePair::of::<S, D>(),
			source: SourceView::Element(source),
			dest,
		})
	}

	fn run(&self, mut request: MapRequest<'_>) -> Result<(), MapError> {
		for strategy in self.config.strategies().iter() {
			if strategy.handles(&request) {
				return strategy.reconcile(&mut request);
			}
		}
		Err(MapError::NoApplicableStrategy(request.pair))
	}
}
