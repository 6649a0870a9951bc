//! The two reconciliation strategies installed ahead of the baseline
//! replace strategy.
//!
//! Both decline requests whose element pair has no type map or no
//! resolvable equivalence, so the pipeline falls through to the engine
//! baselines. Matching is first-available: a destination element claims the
//! first not-yet-matched source element equivalent to it, and later
//! destination elements only see the remaining unmatched sources.

use std::any::Any;

use morph_engine::{CollectionStrategy, MapError, MapRequest, MapperConfig, SourceView};
use tracing::debug;

use crate::registry::EquivalencePartition;

fn partition(config: &MapperConfig) -> &EquivalencePartition {
	config.extensions().get::<EquivalencePartition>().unwrap_or_else(|| {
		panic!(
			"reconciliation strategies require a committed equivalence partition; \
			 register them through add_collection_reconcilers"
		)
	})
}

/// Reconciles a source collection against the existing destination
/// collection: matched destination elements are updated in place, unmatched
/// destination elements are removed, and unmatched source elements are
/// mapped fresh and appended in source order.
pub struct ReconcileByEquivalence;

impl CollectionStrategy for ReconcileByEquivalence {
	fn as_any(&self) -> &dyn Any {
		self
	}

	fn handles(&self, request: &MapRequest<'_>) -> bool {
		if !matches!(request.source, SourceView::Collection(_)) {
			return false;
		}
		match request.config.type_map(request.pair) {
			Some(type_map) => partition(request.config).resolve(type_map).is_some(),
			None => false,
		}
	}

	fn reconcile(&self, request: &mut MapRequest<'_>) -> Result<(), MapError> {
		let SourceView::Collection(source) = request.source else {
			panic!("collection reconciler invoked for an element request");
		};
		let type_map = request
			.config
			.type_map(request.pair)
			.ok_or(MapError::MissingTypeMap(request.pair))?;
		let equivalence = partition(request.config)
			.resolve(type_map)
			.unwrap_or_else(|| panic!("no equivalence function for {}", request.pair));

		let mut matched = vec![false; source.len()];
		let mut updated = 0usize;
		let mut removed = 0usize;

		let mut index = 0;
		while index < request.dest.len() {
			let claim = (0..source.len()).find(|&candidate| {
				!matched[candidate]
					&& equivalence.evaluate(source.element(candidate), request.dest.element(index))
			});
			match claim {
				Some(candidate) => {
					matched[candidate] = true;
					type_map.apply(source.element(candidate), request.dest.element_mut(index));
					updated += 1;
					index += 1;
				}
				None => {
					request.dest.remove(index);
					removed += 1;
				}
			}
		}

		let mut added = 0usize;
		for candidate in 0..source.len() {
			if !matched[candidate] {
				request.dest.push_boxed(type_map.map_boxed(source.element(candidate)));
				added += 1;
			}
		}

		debug!(pair = %request.pair, updated, added, removed, "reconciled collection");
		Ok(())
	}
}

/// Merges a single source element into the destination collection: the
/// first equivalent destination element is updated in place; otherwise the
/// source is mapped fresh and appended.
pub struct MergeByEquivalence;

impl CollectionStrategy for MergeByEquivalence {
	fn as_any(&self) -> &dyn Any {
		self
	}

	fn handles(&self, request: &MapRequest<'_>) -> bool {
		if !matches!(request.source, SourceView::Element(_)) {
			return false;
		}
		match request.config.type_map(request.pair) {
			Some(type_map) => partition(request.config).resolve(type_map).is_some(),
			None => false,
		}
	}

	fn reconcile(&self, request: &mut MapRequest<'_>) -> Result<(), MapError> {
		let SourceView::Element(source) = request.source else {
			panic!("element merger invoked for a collection request");
		};
		let type_map = request
			.config
			.type_map(request.pair)
			.ok_or(MapError::MissingTypeMap(request.pair))?;
		let equivalence = partition(request.config)
			.resolve(type_map)
			.unwrap_or_else(|| panic!("no equivalence function for {}", request.pair));

		for index in 0..request.dest.len() {
			if equivalence.evaluate(source, request.dest.element(index)) {
				type_map.apply(source, request.dest.element_mut(index));
				debug!(pair = %request.pair, index, "merged element into equivalent destination");
				return Ok(());
			}
		}
		request.dest.push_boxed(type_map.map_boxed(source));
		debug!(pair = %request.pair, "no equivalent destination element; appended fresh");
		Ok(())
	}
}
