//! Equivalence functions: the predicate deciding whether a source and a
//! destination object denote the same logical entity.
//!
//! An equivalence is weaker than equality: two objects may differ in every
//! mapped member and still be "the same" entity (a stale row and its
//! incoming update). Every implementation is erased behind the single
//! non-generic [`Equivalence`] interface; type correctness is fixed at
//! construction, never by runtime type activation.

use std::any::Any;

use morph_engine::{MemberRule, TypePair};

/// A typed equivalence predicate erased behind a non-generic interface.
///
/// Immutable once constructed. `evaluate` panics when handed objects of
/// foreign types; construction binds the pair, and the registry only ever
/// evaluates a function against its own pair.
pub trait Equivalence: Send + Sync {
	/// The (source, destination) pair this function is bound to.
	fn pair(&self) -> TypePair;

	/// Returns true when `source` and `dest` denote the same entity.
	fn evaluate(&self, source: &dyn Any, dest: &dyn Any) -> bool;
}

/// Equivalence from a hand-written typed predicate.
pub struct PredicateEquivalence<S, D> {
	predicate: Box<dyn Fn(&S, &D) -> bool + Send + Sync>,
}

impl<S: Any, D: Any> PredicateEquivalence<S, D> {
	/// Wraps a typed two-argument predicate.
	pub fn new(predicate: impl Fn(&S, &D) -> bool + Send + Sync + 'static) -> Self {
		Self { predicate: Box::new(predicate) }
	}
}

impl<S: Any, D: Any> Equivalence for PredicateEquivalence<S, D> {
	fn pair(&self) -> TypePair {
		TypePair::of::<S, D>()
	}

	fn evaluate(&self, source: &dyn Any, dest: &dyn Any) -> bool {
		let pair = self.pair();
		let source = source
			.downcast_ref::<S>()
			.unwrap_or_else(|| panic!("equivalence for {pair} evaluated against a foreign source type"));
		let dest = dest
			.downcast_ref::<D>()
			.unwrap_or_else(|| panic!("equivalence for {pair} evaluated against a foreign destination type"));
		(self.predicate)(source, dest)
	}
}

/// Builds an equivalence comparing one selected member from each side with
/// the value type's default equality.
///
/// Sugar over [`PredicateEquivalence`]; the shared value type is enforced
/// by the compiler.
pub fn by_members<S, D, V>(
	read_source: impl for<'a> Fn(&'a S) -> &'a V + Send + Sync + 'static,
	read_dest: impl for<'a> Fn(&'a D) -> &'a V + Send + Sync + 'static,
) -> PredicateEquivalence<S, D>
where
	S: Any,
	D: Any,
	V: PartialEq + 'static,
{
	PredicateEquivalence::new(move |source: &S, dest: &D| read_source(source) == read_dest(dest))
}

/// Equivalence synthesized as the conjunction of member rules, evaluated
/// left to right in rule order.
pub(crate) struct SynthesizedEquivalence {
	pair: TypePair,
	rules: Vec<MemberRule>,
}

impl SynthesizedEquivalence {
	pub(crate) fn new(pair: TypePair, rules: Vec<MemberRule>) -> Self {
		Self { pair, rules }
	}
}

impl Equivalence for SynthesizedEquivalence {
	fn pair(&self) -> TypePair {
		self.pair
	}

	fn evaluate(&self, source: &dyn Any, dest: &dyn Any) -> bool {
		self.rules.iter().all(|rule| rule.members_equal(source, dest))
	}
}
