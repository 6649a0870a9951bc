//! Minimal object-to-object mapping host.
//!
//! This crate provides the boundary a mapping extension plugs into: typed
//! member-rule declarations erased behind [`MemberRule`], per-pair
//! [`TypeMap`] definitions, an ordered [`CollectionStrategy`] pipeline with
//! baseline replace/append behavior, and the build → seal → immutable
//! configuration lifecycle.
//!
//! The engine performs no reconciliation itself. An extension inserts its
//! strategies ahead of the baselines via [`StrategyList::insert_before`],
//! accumulates build-time state in the builder's [`ExtensionMap`], and
//! commits that state through an [`MapperBuilder::on_seal`] hook when the
//! configuration seals.

mod collection;
mod config;
mod error;
mod extensions;
mod mapper;
mod member;
mod pair;
mod strategy;
mod type_map;

pub use collection::{ReconcilableCollection, SourceCollection};
pub use config::{MapperBuilder, MapperConfig};
pub use error::MapError;
pub use extensions::ExtensionMap;
pub use mapper::Mapper;
pub use member::MemberRule;
pub use pair::TypePair;
pub use strategy::{
	AppendElement, CollectionStrategy, MapRequest, ReplaceCollection, SourceView, StrategyList,
};
pub use type_map::{TypeMap, TypeMapBuilder};
