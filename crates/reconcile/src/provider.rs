use morph_engine::{MemberRule, TypeMap};

/// Produces the ordered member rules equivalence synthesis works from.
///
/// Providers run in registration order; the first non-empty result wins and
/// the rest are never consulted.
pub trait PropertyMapProvider: Send + Sync {
	/// Returns the member rules to use for `type_map`, or an empty list to
	/// pass the decision to the next provider.
	fn property_maps(&self, type_map: &TypeMap) -> Vec<MemberRule>;
}

/// Default provider: the type map's own declared member rules.
pub struct DeclaredMemberProvider;

impl PropertyMapProvider for DeclaredMemberProvider {
	fn property_maps(&self, type_map: &TypeMap) -> Vec<MemberRule> {
		type_map.rules().to_vec()
	}
}
