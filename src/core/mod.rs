//! core
//!
//! Engine-independent domain types and configuration.
//!
//! # Modules
//!
//! - [`types`] - Strong types: ShortName, Oid, RefName
//! - [`naming`] - Qualifying short names under a ref namespace
//! - [`refspec`] - Push refspecs for branches and tags
//! - [`config`] - Client configuration schema and loading

pub mod config;
pub mod naming;
pub mod refspec;
pub mod types;
