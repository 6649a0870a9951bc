//! Type-erased member-mapping rules.
//!
//! A [`MemberRule`] captures one declared correspondence between a source
//! member and a destination member. The erased accessors are built from
//! typed closures at declaration time, so every downcast inside a rule is
//! guaranteed by construction; a mismatched call is a configuration bug and
//! panics.

use std::any::{Any, TypeId};
use std::fmt;
use std::sync::Arc;

type ReadFn = dyn for<'a> Fn(&'a dyn Any) -> &'a (dyn Any + Send + Sync) + Send + Sync;
type AssignFn = dyn Fn(&dyn Any, &mut dyn Any) + Send + Sync;

pub(crate) fn downcast<'a, T: Any>(value: &'a dyn Any, role: &str) -> &'a T {
	value
		.downcast_ref::<T>()
		.unwrap_or_else(|| panic!("{role} value is not a {}", std::any::type_name::<T>()))
}

pub(crate) fn downcast_mut<'a, T: Any>(value: &'a mut dyn Any, role: &str) -> &'a mut T {
	value
		.downcast_mut::<T>()
		.unwrap_or_else(|| panic!("{role} value is not a {}", std::any::type_name::<T>()))
}

fn value_eq<V: PartialEq + 'static>(a: &dyn Any, b: &dyn Any) -> bool {
	match (a.downcast_ref::<V>(), b.downcast_ref::<V>()) {
		(Some(a), Some(b)) => a == b,
		_ => false,
	}
}

/// One declared source-member to destination-member correspondence.
///
/// Cheap to clone; the accessors are shared.
#[derive(Clone)]
pub struct MemberRule {
	name: &'static str,
	source_value_type: TypeId,
	dest_value_type: TypeId,
	source_value_name: &'static str,
	dest_value_name: &'static str,
	read_source: Arc<ReadFn>,
	read_dest: Arc<ReadFn>,
	assign: Arc<AssignFn>,
	eq: fn(&dyn Any, &dyn Any) -> bool,
}

impl MemberRule {
	pub(crate) fn direct<S, D, V>(
		name: &'static str,
		read_source: impl for<'a> Fn(&'a S) -> &'a V + Send + Sync + 'static,
		read_dest: impl for<'a> Fn(&'a D) -> &'a V + Send + Sync + 'static,
		write_dest: impl Fn(&mut D, V) + Send + Sync + 'static,
	) -> Self
	where
		S: Any,
		D: Any,
		V: PartialEq + Clone + Send + Sync + 'static,
	{
		let source_reader = Arc::new(read_source);
		let assign_reader = Arc::clone(&source_reader);
		let erased_source: Arc<ReadFn> =
			Arc::new(move |obj| (*source_reader)(downcast::<S>(obj, "source")) as &(dyn Any + Send + Sync));
		let erased_dest: Arc<ReadFn> =
			Arc::new(move |obj| read_dest(downcast::<D>(obj, "destination")) as &(dyn Any + Send + Sync));
		let assign: Arc<AssignFn> = Arc::new(move |src, dst| {
			let value = (*assign_reader)(downcast::<S>(src, "source")).clone();
			write_dest(downcast_mut::<D>(dst, "destination"), value);
		});
		Self {
			name,
			source_value_type: TypeId::of::<V>(),
			dest_value_type: TypeId::of::<V>(),
			source_value_name: std::any::type_name::<V>(),
			dest_value_name: std::any::type_name::<V>(),
			read_source: erased_source,
			read_dest: erased_dest,
			assign,
			eq: value_eq::<V>,
		}
	}

	pub(crate) fn converted<S, D, VS, VD>(
		name: &'static str,
		read_source: impl for<'a> Fn(&'a S) -> &'a VS + Send + Sync + 'static,
		convert: impl Fn(&VS) -> VD + Send + Sync + 'static,
		read_dest: impl for<'a> Fn(&'a D) -> &'a VD + Send + Sync + 'static,
		write_dest: impl Fn(&mut D, VD) + Send + Sync + 'static,
	) -> Self
	where
		S: Any,
		D: Any,
		VS: PartialEq + Send + Sync + 'static,
		VD: PartialEq + Send + Sync + 'static,
	{
		let source_reader = Arc::new(read_source);
		let assign_reader = Arc::clone(&source_reader);
		let erased_source: Arc<ReadFn> =
			Arc::new(move |obj| (*source_reader)(downcast::<S>(obj, "source")) as &(dyn Any + Send + Sync));
		let erased_dest: Arc<ReadFn> =
			Arc::new(move |obj| read_dest(downcast::<D>(obj, "destination")) as &(dyn Any + Send + Sync));
		let assign: Arc<AssignFn> = Arc::new(move |src, dst| {
			let value = convert((*assign_reader)(downcast::<S>(src, "source")));
			write_dest(downcast_mut::<D>(dst, "destination"), value);
		});
		Self {
			name,
			source_value_type: TypeId::of::<VS>(),
			dest_value_type: TypeId::of::<VD>(),
			source_value_name: std::any::type_name::<VS>(),
			dest_value_name: std::any::type_name::<VD>(),
			read_source: erased_source,
			read_dest: erased_dest,
			assign,
			eq: value_eq::<VS>,
		}
	}

	/// Returns the member name this rule was declared under.
	pub fn name(&self) -> &'static str {
		self.name
	}

	/// Returns the declared (source, destination) member value types.
	pub fn value_types(&self) -> (TypeId, TypeId) {
		(self.source_value_type, self.dest_value_type)
	}

	/// Returns the declared member value type names.
	pub fn value_type_names(&self) -> (&'static str, &'static str) {
		(self.source_value_name, self.dest_value_name)
	}

	/// Reads the source member of `source`.
	pub fn read_source<'a>(&self, source: &'a dyn Any) -> &'a dyn Any {
		(self.read_source)(source)
	}

	/// Reads the destination member of `dest`.
	pub fn read_dest<'a>(&self, dest: &'a dyn Any) -> &'a dyn Any {
		(self.read_dest)(dest)
	}

	/// Writes the source member's (converted) value into the destination
	/// member.
	pub fn apply(&self, source: &dyn Any, dest: &mut dyn Any) {
		(self.assign)(source, dest);
	}

	/// Compares the two declared members with the value type's default
	/// equality.
	pub fn members_equal(&self, source: &dyn Any, dest: &dyn Any) -> bool {
		(self.eq)((self.read_source)(source), (self.read_dest)(dest))
	}
}

impl fmt::Debug for MemberRule {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("MemberRule")
			.field("name", &self.name)
			.field("source_value", &self.source_value_name)
			.field("dest_value", &self.dest_value_name)
			.finish()
	}
}

/// Declares one direct member rule per listed field, mapping identically
/// named source and destination fields.
#[macro_export]
macro_rules! members {
	($tm:expr, { $($field:ident),+ $(,)? }) => {
		$(
			$tm.member(
				stringify!($field),
				|source| &source.$field,
				|dest| &dest.$field,
				|dest, value| dest.$field = value,
			);
		)+
	};
}
