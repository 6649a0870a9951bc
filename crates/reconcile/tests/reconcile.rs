//! End-to-end behavior of the reconciliation pipeline against sealed mapper
//! configurations.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use morph_engine::{
	Mapper, MapperBuilder, MemberRule, ReplaceCollection, TypeMap, TypeMapBuilder, TypePair,
	members,
};
use morph_reconcile::{
	EquivalenceBuilderExt, EquivalencePartition, MergeByEquivalence, PropertyMapProvider,
	ReconcileByEquivalence,
};
use pretty_assertions::assert_eq;

struct Person {
	id: u64,
	name: String,
}

#[derive(Default, Debug, PartialEq, Clone)]
struct PersonDto {
	id: u64,
	name: String,
	// Never mapped; proves matched elements are updated in place rather
	// than rebuilt.
	revision: u32,
}

fn person(id: u64, name: &str) -> Person {
	Person { id, name: name.into() }
}

fn dto(id: u64, name: &str, revision: u32) -> PersonDto {
	PersonDto { id, name: name.into(), revision }
}

fn builder_with_person_map() -> MapperBuilder {
	let mut tm = TypeMapBuilder::<Person, PersonDto>::new();
	members!(tm, { id, name });
	let mut builder = MapperBuilder::new();
	builder.register_type_map(tm);
	builder
}

fn partition(mapper: &Mapper) -> &EquivalencePartition {
	mapper.config().extensions().expect::<EquivalencePartition>()
}

fn person_type_map(mapper: &Mapper) -> &TypeMap {
	mapper
		.config()
		.type_map(TypePair::of::<Person, PersonDto>())
		.expect("person map declared")
}

struct CountingProvider {
	calls: Arc<AtomicUsize>,
}

impl PropertyMapProvider for CountingProvider {
	fn property_maps(&self, type_map: &TypeMap) -> Vec<MemberRule> {
		self.calls.fetch_add(1, Ordering::SeqCst);
		type_map.rules().to_vec()
	}
}

struct EmptyProvider;

impl PropertyMapProvider for EmptyProvider {
	fn property_maps(&self, _type_map: &TypeMap) -> Vec<MemberRule> {
		Vec::new()
	}
}

struct IdOnlyProvider;

impl PropertyMapProvider for IdOnlyProvider {
	fn property_maps(&self, type_map: &TypeMap) -> Vec<MemberRule> {
		type_map.rules().iter().filter(|rule| rule.name() == "id").cloned().collect()
	}
}

/// Resolving the same pair twice returns the installed function both times
/// and runs synthesis exactly once.
#[test]
fn resolve_is_memoized_per_pair() {
	let calls = Arc::new(AtomicUsize::new(0));
	let mut builder = builder_with_person_map();
	builder.add_collection_reconcilers();
	builder.property_map_provider(CountingProvider { calls: Arc::clone(&calls) });
	let mapper = builder.build();

	let first = partition(&mapper).resolve(person_type_map(&mapper)).expect("synthesizes");
	let second = partition(&mapper).resolve(person_type_map(&mapper)).expect("memoized");

	assert!(Arc::ptr_eq(&first, &second), "both calls observe the installed function");
	assert_eq!(calls.load(Ordering::SeqCst), 1, "synthesis ran exactly once");
}

/// An explicit declaration wins over synthesis even though member rules
/// exist: two people with the same id but different names are equivalent.
#[test]
fn explicit_id_equivalence_overrides_synthesis() {
	let mut builder = builder_with_person_map();
	builder.add_collection_reconcilers();
	builder.equivalence_by(|p: &Person| &p.id, |d: &PersonDto| &d.id);
	let mapper = builder.build();

	let eq = partition(&mapper).resolve(person_type_map(&mapper)).expect("explicit");
	assert!(eq.evaluate(&person(1, "A"), &dto(1, "B", 0)), "id matches");
	assert!(!eq.evaluate(&person(1, "A"), &dto(2, "A", 0)), "id differs");
}

/// The last explicit declaration per pair wins.
#[test]
fn last_explicit_declaration_wins() {
	let mut builder = builder_with_person_map();
	builder.add_collection_reconcilers();
	builder.equivalence_by(|p: &Person| &p.id, |d: &PersonDto| &d.id);
	builder.equivalence(|p: &Person, d: &PersonDto| p.name == d.name);
	let mapper = builder.build();

	let eq = partition(&mapper).resolve(person_type_map(&mapper)).expect("explicit");
	assert!(eq.evaluate(&person(1, "A"), &dto(2, "A", 0)), "name equivalence replaced the id one");
}

/// With no explicit declaration the synthesized function is the conjunction
/// of every declared member rule.
#[test]
fn synthesized_equivalence_is_a_conjunction() {
	let mut builder = builder_with_person_map();
	builder.add_collection_reconcilers();
	let mapper = builder.build();

	let eq = partition(&mapper).resolve(person_type_map(&mapper)).expect("synthesizes");
	assert!(eq.evaluate(&person(1, "A"), &dto(1, "A", 9)), "all members equal");
	assert!(!eq.evaluate(&person(1, "A"), &dto(1, "B", 9)), "name flips the result");
	assert!(!eq.evaluate(&person(1, "A"), &dto(2, "A", 9)), "id flips the result");
}

/// Providers are consulted in registration order and the first non-empty
/// rule set wins.
#[test]
fn first_provider_with_rules_wins() {
	let mut builder = builder_with_person_map();
	builder.add_collection_reconcilers();
	builder.property_map_provider(EmptyProvider);
	builder.property_map_provider(IdOnlyProvider);
	let mapper = builder.build();

	let eq = partition(&mapper).resolve(person_type_map(&mapper)).expect("second provider");
	assert!(
		eq.evaluate(&person(3, "A"), &dto(3, "B", 0)),
		"id-only rules came from the second provider, not the declared-rules default"
	);
}

/// A member rule with disagreeing value types makes synthesis yield the
/// stable negative result, and collection mapping falls back to replace.
#[test]
fn mismatched_member_types_fall_back_to_replace() {
	let mut tm = TypeMapBuilder::<Person, PersonDto>::new();
	tm.member_with(
		"name",
		|p| &p.id,
		|id: &u64| id.to_string(),
		|d| &d.name,
		|d, v| d.name = v,
	);
	let mut builder = MapperBuilder::new();
	builder.register_type_map(tm);
	builder.add_collection_reconcilers();
	let mapper = builder.build();

	assert!(partition(&mapper).resolve(person_type_map(&mapper)).is_none());
	assert!(
		partition(&mapper).resolve(person_type_map(&mapper)).is_none(),
		"negative result is stable across calls"
	);

	let mut dtos = vec![dto(1, "1", 7)];
	mapper.map_collection(&[person(1, "ignored")], &mut dtos).unwrap();
	assert_eq!(
		dtos,
		vec![dto(0, "1", 0)],
		"replace rebuilt every element, dropping unmapped destination state"
	);
}

/// The headline reconcile scenario: source `[1, 2]` against destination
/// `[2, 3]` removes 3, updates 2 in place, and appends a fresh 1.
#[test]
fn reconcile_adds_removes_and_updates_in_place() {
	let mut builder = builder_with_person_map();
	builder.add_collection_reconcilers();
	builder.equivalence_by(|p: &Person| &p.id, |d: &PersonDto| &d.id);
	let mapper = builder.build();

	let mut dtos = vec![dto(2, "stale", 7), dto(3, "gone", 9)];
	mapper
		.map_collection(&[person(1, "one"), person(2, "two")], &mut dtos)
		.unwrap();

	assert_eq!(
		dtos,
		vec![dto(2, "two", 7), dto(1, "one", 0)],
		"2 kept its revision (updated in place), 3 removed, 1 mapped fresh"
	);
}

/// Two destination elements equivalent to one source element: the first
/// destination element claims the match, the second is removed.
#[test]
fn duplicate_matches_resolve_first_available() {
	let mut builder = builder_with_person_map();
	builder.add_collection_reconcilers();
	builder.equivalence_by(|p: &Person| &p.id, |d: &PersonDto| &d.id);
	let mapper = builder.build();

	let mut dtos = vec![dto(1, "first", 1), dto(1, "second", 2)];
	mapper.map_collection(&[person(1, "winner")], &mut dtos).unwrap();

	assert_eq!(dtos, vec![dto(1, "winner", 1)]);
}

/// `merge` updates the first equivalent destination element in place, or
/// appends a fresh one when nothing matches.
#[test]
fn merge_upserts_by_equivalence() {
	let mut builder = builder_with_person_map();
	builder.add_collection_reconcilers();
	builder.equivalence_by(|p: &Person| &p.id, |d: &PersonDto| &d.id);
	let mapper = builder.build();

	let mut dtos = vec![dto(2, "old", 5)];

	mapper.merge(&person(2, "renamed"), &mut dtos).unwrap();
	assert_eq!(dtos, vec![dto(2, "renamed", 5)], "updated in place, revision kept");

	mapper.merge(&person(9, "new"), &mut dtos).unwrap();
	assert_eq!(dtos, vec![dto(2, "renamed", 5), dto(9, "new", 0)], "no match appends");
}

/// A pair with no usable rules and no declaration declines reconciliation;
/// the baseline replace strategy takes over.
#[test]
fn no_equivalence_defers_to_replace_baseline() {
	let mut builder = MapperBuilder::new();
	builder.register_type_map(TypeMapBuilder::<Person, PersonDto>::new());
	builder.add_collection_reconcilers();
	let mapper = builder.build();

	assert!(partition(&mapper).resolve(person_type_map(&mapper)).is_none());

	let mut dtos = vec![dto(1, "kept?", 7)];
	mapper.map_collection(&[person(1, "x"), person(2, "y")], &mut dtos).unwrap();

	assert_eq!(
		dtos,
		vec![PersonDto::default(), PersonDto::default()],
		"replace rebuilt the collection from an empty rule set"
	);
}

/// Registration is idempotent and lands immediately ahead of the replace
/// baseline, preserving the given order.
#[test]
fn reconciler_registration_is_idempotent_and_ordered() {
	let mut builder = builder_with_person_map();
	builder.add_collection_reconcilers();
	builder.add_collection_reconcilers();

	let strategies = builder.strategies_mut();
	assert_eq!(strategies.len(), 4, "two baselines plus two reconcilers, once");
	assert_eq!(strategies.position_of::<MergeByEquivalence>(), Some(0));
	assert_eq!(strategies.position_of::<ReconcileByEquivalence>(), Some(1));
	assert_eq!(strategies.position_of::<ReplaceCollection>(), Some(2));
}

/// Concurrent mappings against one sealed configuration agree on a single
/// installed equivalence function.
#[test]
fn concurrent_mappings_share_the_installed_function() {
	let mut builder = builder_with_person_map();
	builder.add_collection_reconcilers();
	let mapper = builder.build();

	std::thread::scope(|scope| {
		for _ in 0..8 {
			let mapper = mapper.clone();
			scope.spawn(move || {
				let mut dtos = vec![dto(1, "a", 3)];
				mapper.map_collection(&[person(1, "a")], &mut dtos).unwrap();
				assert_eq!(dtos, vec![dto(1, "a", 3)], "matched element kept in place");
			});
		}
	});

	let first = partition(&mapper).resolve(person_type_map(&mapper)).expect("installed");
	let second = partition(&mapper).resolve(person_type_map(&mapper)).expect("installed");
	assert!(Arc::ptr_eq(&first, &second));
}
