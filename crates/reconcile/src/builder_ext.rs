//! Builder-side registration surface.

use std::any::Any;
use std::sync::Arc;

use morph_engine::{CollectionStrategy, MapperBuilder, ReplaceCollection};

use crate::equivalence::{PredicateEquivalence, by_members};
use crate::provider::PropertyMapProvider;
use crate::registry::EquivalenceStaging;
use crate::strategies::{MergeByEquivalence, ReconcileByEquivalence};

/// Equivalence declarations and strategy registration on [`MapperBuilder`].
///
/// Every method installs the builder-scoped staging area (and its commit
/// hook) on first use, so declarations reach the partition of exactly the
/// configuration being built.
pub trait EquivalenceBuilderExt {
	/// Installs the two reconciliation strategies immediately ahead of the
	/// baseline replace strategy, plus the commit hook that seals the
	/// staged declarations into the configuration's partition.
	///
	/// Idempotent: a second call finds the strategies already present and
	/// changes nothing.
	fn add_collection_reconcilers(&mut self) -> &mut Self;

	/// Declares an explicit equivalence predicate for `S -> D`. Overrides
	/// synthesis; the last declaration per pair wins.
	fn equivalence<S, D>(
		&mut self,
		predicate: impl Fn(&S, &D) -> bool + Send + Sync + 'static,
	) -> &mut Self
	where
		S: Any,
		D: Any;

	/// Declares an explicit equivalence comparing one selected member from
	/// each side with the value type's default equality.
	fn equivalence_by<S, D, V>(
		&mut self,
		read_source: impl for<'a> Fn(&'a S) -> &'a V + Send + Sync + 'static,
		read_dest: impl for<'a> Fn(&'a D) -> &'a V + Send + Sync + 'static,
	) -> &mut Self
	where
		S: Any,
		D: Any,
		V: PartialEq + 'static;

	/// Appends a custom property-map provider consulted ahead of the
	/// declared-rules default during synthesis.
	fn property_map_provider(&mut self, provider: impl PropertyMapProvider + 'static) -> &mut Self;
}

fn staging(builder: &mut MapperBuilder) -> &mut EquivalenceStaging {
	if builder.extensions_mut().get::<EquivalenceStaging>().is_none() {
		builder.extensions_mut().insert(EquivalenceStaging::default());
		builder.on_seal(|extensions| {
			let staging = extensions
				.take::<EquivalenceStaging>()
				.expect("equivalence staging committed twice");
			extensions.insert(staging.commit());
		});
	}
	builder.extensions_mut().expect_mut::<EquivalenceStaging>()
}

impl EquivalenceBuilderExt for MapperBuilder {
	fn add_collection_reconcilers(&mut self) -> &mut Self {
		staging(self);
		if !self.strategies_mut().contains::<ReconcileByEquivalence>() {
			self.strategies_mut().insert_before::<ReplaceCollection>([
				Arc::new(MergeByEquivalence) as Arc<dyn CollectionStrategy>,
				Arc::new(ReconcileByEquivalence),
			]);
			tracing::debug!("collection reconcilers installed ahead of the replace baseline");
		}
		self
	}

	fn equivalence<S, D>(
		&mut self,
		predicate: impl Fn(&S, &D) -> bool + Send + Sync + 'static,
	) -> &mut Self
	where
		S: Any,
		D: Any,
	{
		staging(self).declare(Arc::new(PredicateEquivalence::new(predicate)));
		self
	}

	fn equivalence_by<S, D, V>(
		&mut self,
		read_source: impl for<'a> Fn(&'a S) -> &'a V + Send + Sync + 'static,
		read_dest: impl for<'a> Fn(&'a D) -> &'a V + Send + Sync + 'static,
	) -> &mut Self
	where
		S: Any,
		D: Any,
		V: PartialEq + 'static,
	{
		staging(self).declare(Arc::new(by_members(read_source, read_dest)));
		self
	}

	fn property_map_provider(&mut self, provider: impl PropertyMapProvider + 'static) -> &mut Self {
		staging(self).add_provider(Arc::new(provider));
		self
	}
}
