//! Identity-based collection reconciliation for the morph mapper.
//!
//! Instead of replacing a destination collection wholesale, the strategies
//! in this crate match existing destination elements to incoming source
//! elements by *equivalence* — a predicate weaker than equality deciding
//! whether two objects denote the same logical entity — then update matched
//! elements in place and add/remove the unmatched ones.
//!
//! The equivalence function for a type pair is either declared explicitly
//! on the builder or synthesized once from the pair's declared member rules
//! and memoized in the configuration's [`EquivalencePartition`]. A pair
//! with no resolvable equivalence falls back to the engine's baseline
//! replace behavior.
//!
//! ```
//! use morph_engine::{MapperBuilder, TypeMapBuilder, members};
//! use morph_reconcile::EquivalenceBuilderExt;
//!
//! struct Person {
//! 	id: u64,
//! 	name: String,
//! }
//!
//! #[derive(Default)]
//! struct PersonDto {
//! 	id: u64,
//! 	name: String,
//! }
//!
//! let mut tm = TypeMapBuilder::<Person, PersonDto>::new();
//! members!(tm, { id, name });
//!
//! let mut builder = MapperBuilder::new();
//! builder.register_type_map(tm);
//! builder.add_collection_reconcilers();
//! builder.equivalence_by(|p: &Person| &p.id, |d: &PersonDto| &d.id);
//! let mapper = builder.build();
//!
//! let mut dtos = vec![PersonDto { id: 2, name: "old".into() }];
//! mapper
//! 	.map_collection(&[Person { id: 2, name: "new".into() }], &mut dtos)
//! 	.unwrap();
//! assert_eq!(dtos[0].name, "new");
//! ```

mod builder_ext;
mod equivalence;
mod provider;
mod registry;
mod strategies;
mod synthesize;

pub use builder_ext::EquivalenceBuilderExt;
pub use equivalence::{Equivalence, PredicateEquivalence, by_members};
pub use provider::{DeclaredMemberProvider, PropertyMapProvider};
pub use registry::{EquivalencePartition, EquivalenceStaging};
pub use strategies::{MergeByEquivalence, ReconcileByEquivalence};
