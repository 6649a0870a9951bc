//! Per-configuration equivalence registry: staging, commit, and the
//! memoized resolve cache.
//!
//! # Lifecycle
//!
//! [`EquivalenceStaging`] lives in the builder's extension state while a
//! configuration is being built, so declarations can never leak into
//! another configuration built in the same process. The seal hook commits
//! it — exactly once — into an [`EquivalencePartition`] stored in the
//! sealed configuration. Resolving before commit is unrepresentable:
//! `resolve` only exists on the partition.
//!
//! # Concurrency
//!
//! After commit the partition's membership is frozen; only the memo cache
//! changes. Concurrent `resolve` callers may race to synthesize a
//! candidate, but the cache installs the first successful snapshot through
//! a compare-and-swap loop, so exactly one value per pair ever wins and
//! every caller observes it.

use std::sync::Arc;

use arc_swap::ArcSwap;
use morph_engine::{TypeMap, TypePair};
use rustc_hash::FxHashMap as HashMap;

use crate::equivalence::Equivalence;
use crate::provider::{DeclaredMemberProvider, PropertyMapProvider};
use crate::synthesize::synthesize;

/// The memoized pair → equivalence map. `None` is the negative sentinel:
/// synthesis was attempted and failed, distinct from an absent entry.
type Cache = HashMap<TypePair, Option<Arc<dyn Equivalence>>>;

/// Builder-scoped staging area for equivalence declarations.
#[derive(Default)]
pub struct EquivalenceStaging {
	explicit: HashMap<TypePair, Arc<dyn Equivalence>>,
	providers: Vec<Arc<dyn PropertyMapProvider>>,
}

impl EquivalenceStaging {
	/// Declares an explicit equivalence function under its pair. Last write
	/// per pair wins.
	pub fn declare(&mut self, equivalence: Arc<dyn Equivalence>) {
		self.explicit.insert(equivalence.pair(), equivalence);
	}

	/// Appends a property-map provider.
	pub fn add_provider(&mut self, provider: Arc<dyn PropertyMapProvider>) {
		self.providers.push(provider);
	}

	/// Commits the staged declarations into the durable partition for the
	/// configuration being sealed.
	///
	/// Explicit declarations seed the cache, so they always win over
	/// synthesis. The declared-rules default provider is appended after
	/// every user-registered provider, keeping it the fallback.
	pub fn commit(mut self) -> EquivalencePartition {
		self.providers.push(Arc::new(DeclaredMemberProvider));
		let cache: Cache = self
			.explicit
			.into_iter()
			.map(|(pair, equivalence)| (pair, Some(equivalence)))
			.collect();
		EquivalencePartition {
			providers: self.providers,
			cache: ArcSwap::from_pointee(cache),
		}
	}
}

/// The durable per-configuration partition: a frozen provider list and the
/// memoized pair → equivalence cache.
pub struct EquivalencePartition {
	providers: Vec<Arc<dyn PropertyMapProvider>>,
	cache: ArcSwap<Cache>,
}

impl EquivalencePartition {
	/// Resolves the equivalence function for the type map's pair.
	///
	/// The first call per pair synthesizes; every outcome — including the
	/// negative one — is memoized, so synthesis runs at most once per pair.
	/// `None` means no equivalence exists and the caller should fall back
	/// to baseline behavior.
	pub fn resolve(&self, type_map: &TypeMap) -> Option<Arc<dyn Equivalence>> {
		let pair = type_map.pair();
		if let Some(entry) = self.cache.load().get(&pair) {
			return entry.clone();
		}

		let candidate = synthesize(type_map, &self.providers);
		loop {
			let cur = self.cache.load_full();
			if let Some(entry) = cur.get(&pair) {
				return entry.clone();
			}
			let mut next = (*cur).clone();
			next.insert(pair, candidate.clone());
			let prev = self.cache.compare_and_swap(&cur, Arc::new(next));
			if Arc::ptr_eq(&prev, &cur) {
				return candidate;
			}
		}
	}
}
