//! # bibq - CQL front end for bibliographic search
//!
//! bibq compiles Contextual Query Language (CQL) expressions into filtered
//! Lucene-style engine queries and reassembles the engine's flat, ranked hits
//! into a work → unit → manifestation hierarchy for paginated delivery.
//!
//! ## Architecture
//!
//! The crate is organized into these main modules:
//!
//! - [`query`] - Tokenizer, parser, flattened query model, compiler and renderer
//! - [`catalog`] - Field catalog mapping CQL indexes to engine fields
//! - [`profile`] - Access profiles compiled into collection filters
//! - [`engine`] - Index engine boundary (Solr over HTTP, in-memory)
//! - [`assembler`] - Incremental paging and work/unit/manifestation grouping
//! - [`config`] - JSON application configuration
//! - [`output`] - Terminal rendering and caret diagnostics
//!
//! ## Quick Start
//!
//! ```ignore
//! use bibq::assembler::{PageRequest, PagingConfig, ResultAssembler};
//! use bibq::catalog::FieldCatalog;
//! use bibq::engine::{MemoryEngine, TrackingId};
//! use bibq::profile::Profile;
//! use bibq::query::{compile, parse_cql};
//!
//! let catalog = FieldCatalog::default();
//! let profile = Profile::unrestricted();
//!
//! let query = parse_cql("dc.title = \"harry potter\" and dc.date >= 2001")?;
//! let compiled = compile(&query, &catalog, &profile)?;
//! println!("{}", compiled.render());
//!
//! let assembler = ResultAssembler::new(MemoryEngine::new(hits), PagingConfig::default());
//! let assembly = assembler.fetch_works(&compiled, &profile, PageRequest::new(1, 10), TrackingId::new("req"))?;
//! for work in &assembly.works {
//!     println!("{} {:?}", work, assembly.hierarchy.units_for_work(work)?);
//! }
//! ```

pub mod assembler;
pub mod catalog;
pub mod config;
pub mod engine;
pub mod error;
pub mod output;
pub mod profile;
pub mod query;

pub use error::{BibqError, CompileError, Result};
