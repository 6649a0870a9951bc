use std::any::Any;
use std::marker::PhantomData;
use std::sync::Arc;

use crate::member::MemberRule;
use crate::pair::TypePair;

type ConstructFn = dyn Fn() -> Box<dyn Any + Send + Sync> + Send + Sync;

/// A sealed mapping definition between one source and one destination type:
/// the pair, the ordered member rules, and a fresh-destination constructor.
pub struct TypeMap {
	pair: TypePair,
	rules: Vec<MemberRule>,
	construct: Arc<ConstructFn>,
}

impl TypeMap {
	/// Returns the pair this definition maps.
	pub fn pair(&self) -> TypePair {
		self.pair
	}

	/// Returns the declared member rules in declaration order.
	pub fn rules(&self) -> &[MemberRule] {
		&self.rules
	}

	/// Maps `source` into a freshly constructed destination object.
	pub fn map_boxed(&self, source: &dyn Any) -> Box<dyn Any + Send + Sync> {
		let mut dest = (self.construct)();
		self.apply(source, &mut *dest);
		dest
	}

	/// Updates an existing destination object in place by running every
	/// member rule.
	pub fn apply(&self, source: &dyn Any, dest: &mut dyn Any) {
		for rule in &self.rules {
			rule.apply(source, dest);
		}
	}
}

/// Typed declaration surface for one [`TypeMap`].
pub struct TypeMapBuilder<S, D> {
	rules: Vec<MemberRule>,
	_types: PhantomData<fn(&S, &D)>,
}

impl<S, D> TypeMapBuilder<S, D>
where
	S: Any,
	D: Any + Default + Send + Sync,
{
	/// Creates an empty declaration for the `S -> D` pair.
	pub fn new() -> Self {
		Self { rules: Vec::new(), _types: PhantomData }
	}

	/// Declares a member rule whose source and destination members share a
	/// value type.
	pub fn member<V>(
		&mut self,
		name: &'static str,
		read_source: impl for<'a> Fn(&'a S) -> &'a V + Send + Sync + 'static,
		read_dest: impl for<'a> Fn(&'a D) -> &'a V + Send + Sync + 'static,
		write_dest: impl Fn(&mut D, V) + Send + Sync + 'static,
	) -> &mut Self
	where
		V: PartialEq + Clone + Send + Sync + 'static,
	{
		self.rules.push(MemberRule::direct(name, read_source, read_dest, write_dest));
		self
	}

	/// Declares a converting member rule; the source and destination member
	/// value types may differ.
	pub fn member_with<VS, VD>(
		&mut self,
		name: &'static str,
		read_source: impl for<'a> Fn(&'a S) -> &'a VS + Send + Sync + 'static,
		convert: impl Fn(&VS) -> VD + Send + Sync + 'static,
		read_dest: impl for<'a> Fn(&'a D) -> &'a VD + Send + Sync + 'static,
		write_dest: impl Fn(&mut D, VD) + Send + Sync + 'static,
	) -> &mut Self
	where
		VS: PartialEq + Send + Sync + 'static,
		VD: PartialEq + Send + Sync + 'static,
	{
		self.rules
			.push(MemberRule::converted(name, read_source, convert, read_dest, write_dest));
		self
	}

	pub(crate) fn build(self) -> TypeMap {
		TypeMap {
			pair: TypePair::of::<S, D>(),
			rules: self.rules,
			construct: Arc::new(|| Box::new(D::default())),
		}
	}
}

impl<S, D> Default for TypeMapBuilder<S, D>
where
	S: Any,
	D: Any + Default + Send + Sync,
{
	fn default() -> Self {
		Self::new()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	struct Person {
		id: u64,
		name: String,
	}

	#[derive(Default, Debug, PartialEq)]
	struct PersonDto {
		id: u64,
		name: String,
	}

	fn person_map() -> TypeMap {
		let mut tm = TypeMapBuilder::<Person, PersonDto>::new();
		crate::members!(tm, { id, name });
		tm.build()
	}

	#[test]
	fn map_boxed_constructs_and_fills_destination() {
		let tm = person_map();
		let source = Person { id: 4, name: "Ada".into() };

		let boxed = tm.map_boxed(&source);
		let dto = boxed.downcast::<PersonDto>().expect("destination type");
		assert_eq!(*dto, PersonDto { id: 4, name: "Ada".into() });
	}

	#[test]
	fn apply_updates_only_declared_members() {
		let mut tm = TypeMapBuilder::<Person, PersonDto>::new();
		tm.member("id", |s| &s.id, |d| &d.id, |d, v| d.id = v);
		let tm = tm.build();

		let source = Person { id: 9, name: "Ada".into() };
		let mut dto = PersonDto { id: 1, name: "kept".into() };
		tm.apply(&source, &mut dto);

		assert_eq!(dto.id, 9);
		assert_eq!(dto.name, "kept", "undeclared members stay untouched");
	}
}
