//! Collection mapping strategies and their ordered pipeline.
//!
//! A strategy is a capability object: `handles` decides whether it takes a
//! request, `reconcile` maps the request's source into its destination
//! collection. The mapper walks the pipeline in order and the first
//! accepting strategy wins. Extensions insert their strategies ahead of the
//! baselines with [`StrategyList::insert_before`].

use std::any::Any;
use std::sync::Arc;

use crate::collection::{ReconcilableCollection, SourceCollection};
use crate::config::MapperConfig;
use crate::error::MapError;
use crate::pair::TypePair;

/// The source side of a collection map request.
#[derive(Clone, Copy)]
pub enum SourceView<'a> {
	/// A sequence of source elements mapped into the destination.
	Collection(&'a dyn SourceCollection),
	/// A single source element merged into the destination.
	Element(&'a dyn Any),
}

/// One collection map request travelling down the strategy pipeline.
pub struct MapRequest<'a> {
	/// The sealed configuration the request runs against.
	pub config: &'a MapperConfig,
	/// The element type pair of the request.
	pub pair: TypePair,
	/// The source side.
	pub source: SourceView<'a>,
	/// The destination collection, updated in place.
	pub dest: &'a mut dyn ReconcilableCollection,
}

/// A collection mapping strategy.
pub trait CollectionStrategy: Send + Sync + 'static {
	/// Returns `self` for strategy-kind identification in [`StrategyList`].
	fn as_any(&self) -> &dyn Any;

	/// Decides whether this strategy takes the request.
	fn handles(&self, request: &MapRequest<'_>) -> bool;

	/// Maps the request's source into its destination collection.
	fn reconcile(&self, request: &mut MapRequest<'_>) -> Result<(), MapError>;
}

/// Ordered strategy pipeline.
#[derive(Default)]
pub struct StrategyList {
	items: Vec<Arc<dyn CollectionStrategy>>,
}

impl StrategyList {
	pub(crate) fn new() -> Self {
		Self { items: Vec::new() }
	}

	/// Appends a strategy at the end of the pipeline.
	pub fn push(&mut self, strategy: Arc<dyn CollectionStrategy>) {
		self.items.push(strategy);
	}

	/// Returns the position of the first strategy of kind `T`.
	pub fn position_of<T: CollectionStrategy>(&self) -> Option<usize> {
		self.items.iter().position(|s| s.as_any().is::<T>())
	}

	/// Returns true if the pipeline contains a strategy of kind `T`.
	pub fn contains<T: CollectionStrategy>(&self) -> bool {
		self.position_of::<T>().is_some()
	}

	/// Inserts the given strategies, preserving their order, at the position
	/// of the first strategy of kind `T` — or at the list start if no such
	/// strategy is registered.
	pub fn insert_before<T: CollectionStrategy>(
		&mut self,
		strategies: impl IntoIterator<Item = Arc<dyn CollectionStrategy>>,
	) {
		let at = self.position_of::<T>().unwrap_or(0);
		for (offset, strategy) in strategies.into_iter().enumerate() {
			self.items.insert(at + offset, strategy);
		}
	}

	/// Returns the number of registered strategies.
	pub fn len(&self) -> usize {
		self.items.len()
	}

	/// Returns true if no strategies are registered.
	pub fn is_empty(&self) -> bool {
		self.items.is_empty()
	}

	pub(crate) fn iter(&self) -> impl Iterator<Item = &Arc<dyn CollectionStrategy>> {
		self.items.iter()
	}
}

/// Baseline: replaces the destination collection with freshly mapped source
/// elements.
pub struct ReplaceCollection;

impl CollectionStrategy for ReplaceCollection {
	fn as_any(&self) -> &dyn Any {
		self
	}

	fn handles(&self, request: &MapRequest<'_>) -> bool {
		matches!(request.source, SourceView::Collection(_))
	}

	fn reconcile(&self, request: &mut MapRequest<'_>) -> Result<(), MapError> {
		let SourceView::Collection(source) = request.source else {
			panic!("replace strategy invoked for an element request");
		};
		let type_map = request
			.config
			.type_map(request.pair)
			.ok_or(MapError::MissingTypeMap(request.pair))?;
		request.dest.clear();
		for index in 0..source.len() {
			request.dest.push_boxed(type_map.map_boxed(source.element(index)));
		}
		Ok(())
	}
}

/// Baseline: appends a freshly mapped element to the destination collection.
pub struct AppendElement;

impl CollectionStrategy for AppendElement {
	fn as_any(&self) -> &dyn Any {
		self
	}

	fn handles(&self, request: &MapRequest<'_>) -> bool {
		matches!(request.source, SourceView::Element(_))
	}

	fn reconcile(&self, request: &mut MapRequest<'_>) -> Result<(), MapError> {
		let SourceView::Element(source) = request.source else {
			panic!("append strategy invoked for a collection request");
		};
		let type_map = request
			.config
			.type_map(request.pair)
			.ok_or(MapError::MissingTypeMap(request.pair))?;
		request.dest.push_boxed(type_map.map_boxed(source));
		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	struct A;
	struct B;
	struct C;

	macro_rules! impl_noop_strategy {
		($ty:ty) => {
			impl CollectionStrategy for $ty {
				fn as_any(&self) -> &dyn Any {
					self
				}

				fn handles(&self, _request: &MapRequest<'_>) -> bool {
					false
				}

				fn reconcile(&self, _request: &mut MapRequest<'_>) -> Result<(), MapError> {
					Ok(())
				}
			}
		};
	}

	impl_noop_strategy!(A);
	impl_noop_strategy!(B);
	impl_noop_strategy!(C);

	#[test]
	fn insert_before_lands_at_target_position_in_given_order() {
		let mut list = StrategyList::new();
		list.push(Arc::new(A));
		list.push(Arc::new(C));

		list.insert_before::<C>([
			Arc::new(B) as Arc<dyn CollectionStrategy>,
			Arc::new(A),
		]);

		assert_eq!(list.len(), 4);
		assert_eq!(list.position_of::<B>(), Some(1));
		assert_eq!(list.position_of::<C>(), Some(3), "target strategy shifted right");
	}

	#[test]
	fn insert_before_missing_target_prepends() {
		let mut list = StrategyList::new();
		list.push(Arc::new(A));

		list.insert_before::<C>([Arc::new(B) as Arc<dyn CollectionStrategy>]);

		assert_eq!(list.position_of::<B>(), Some(0));
		assert_eq!(list.position_of::<A>(), Some(1));
	}

	#[test]
	fn position_of_finds_first_of_kind() {
		let mut list = StrategyList::new();
		list.push(Arc::new(A));
		list.push(Arc::new(B));
		list.push(Arc::new(A));

		assert_eq!(list.position_of::<A>(), Some(0));
		assert!(list.contains::<B>());
		assert!(!list.contains::<C>());
	}
}
