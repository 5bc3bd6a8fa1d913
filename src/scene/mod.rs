//! SceneScript domain layer.
//!
//! The three tables describe packages of scripts. A package is an ordered list
//! of members; each member either holds Lua source or includes another
//! package. Source longer than one fragment is split across several
//! `SceneScript` rows linked by `previous` / `next` ids.
//!
//! [`catalog::Catalog`] is the owned, editable view of that data.
//! [`mapper::build_tables`] turns a catalog into table rows (chunking script
//! source via [`chain`]), and [`mapper::resolve_tables`] goes the other way,
//! reassembling chains and reporting rows it cannot place.

pub mod catalog;
pub mod chain;
pub mod mapper;
