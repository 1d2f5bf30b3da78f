//! # pkgraph
//!
//! Builds a compact graph of every known version of every package from any number of
//! partially-overlapping catalog sources and answers resolution queries against it:
//! which versions of a package exist, and whether picking one of them can still be
//! reconciled with a tentative selection of other packages.

pub mod error;
pub use error::Result;
pub use error::Error;

pub mod config;
pub use config::Config;

pub mod package;

pub mod dependency_graph;
pub use dependency_graph::DependencyGraph;

pub mod repository;
