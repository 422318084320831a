//! Bookfinder loader: Open Library dump ingestion
//!
//! This crate loads the Open Library author and work dumps into a key-value store
//! in two sequential passes:
//!
//! 1. **Authors Pass** -- Stream the author dump, map every line to an [`models::Author`]
//!    and save it under its id
//! 2. **Works Pass** -- Stream the work dump, map every line to a [`models::Book`] and
//!    resolve each referenced author id to the name saved in the first pass
//!
//! Each dump line carries a tab-separated prefix (type, key, revision, timestamp)
//! before the JSON record; only the JSON object is read.
//!
//! # Failure Model
//!
//! - **Per-line errors** -- Malformed JSON, a missing work key, a malformed author
//!   reference or an unparsable `created` timestamp skip that line with a warning
//! - **Per-phase errors** -- An unopenable dump or a failed store write abort the
//!   phase; the other phase still runs
//! - **Unresolved authors** -- A work may reference an author that was never
//!   loaded; its name is recorded as `"NA"`
//!
//! # Key Modules
//!
//! - [`reader`] -- Dump line streaming (plain or BZ2) and JSON extraction
//! - [`author`] -- Author record mapping
//! - [`work`] -- Work record mapping and author name resolution
//! - [`resolve`] -- Author id to name lookup against the store
//! - [`ingest`] -- Two-phase driver with parallel line mapping
//! - [`store`] -- Persistence trait with in-memory and Neo4j backends
//! - [`stats`] -- Thread-safe atomic counters for ingestion metrics
//! - [`config`] -- Constants and run configuration
//!
//! # Example Usage
//!
//! ```bash
//! # Load both dumps into Neo4j
//! bookfinder-loader load --authors ol_dump_authors.txt --works ol_dump_works.txt \
//!     --store neo4j --bolt-uri bolt://localhost:7687
//!
//! # Dry run of the first 10k work lines against an in-memory store
//! bookfinder-loader works --input ol_dump_works.txt.bz2 --limit 10000
//! ```

pub mod author;
pub mod config;
pub mod error;
pub mod ingest;
pub mod models;
pub mod reader;
pub mod resolve;
pub mod stats;
pub mod store;
pub mod work;

pub use error::{Error, Result};
