//! Equivalence synthesis from declared member rules.

use std::sync::Arc;

use morph_engine::TypeMap;
use tracing::debug;

use crate::equivalence::{Equivalence, SynthesizedEquivalence};
use crate::provider::PropertyMapProvider;

/// Attempts to synthesize an equivalence function for `type_map` from the
/// first provider yielding a non-empty rule set.
///
/// Returns `None` — the expected negative result, not an error — when no
/// provider yields rules or when any rule's source and destination member
/// value types disagree.
pub(crate) fn synthesize(
	type_map: &TypeMap,
	providers: &[Arc<dyn PropertyMapProvider>],
) -> Option<Arc<dyn Equivalence>> {
	let pair = type_map.pair();
	let Some(rules) = providers
		.iter()
		.map(|provider| provider.property_maps(type_map))
		.find(|rules| !rules.is_empty())
	else {
		debug!(%pair, "no provider yielded member rules; no equivalence");
		return None;
	};

	for rule in &rules {
		let (source, dest) = rule.value_types();
		if source != dest {
			let (source_name, dest_name) = rule.value_type_names();
			debug!(
				%pair,
				member = rule.name(),
				source_value = source_name,
				dest_value = dest_name,
				"member value types disagree; no equivalence"
			);
			return None;
		}
	}

	debug!(%pair, rules = rules.len(), "synthesized member equivalence");
	Some(Arc::new(SynthesizedEquivalence::new(pair, rules)))
}
