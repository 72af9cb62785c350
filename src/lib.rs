// Allow common clippy pedantic lints that aren't critical for this codebase
#![allow(clippy::too_many_lines)]
#![allow(clippy::unused_self)]
#![allow(clippy::struct_excessive_bools)]
#![allow(clippy::needless_pass_by_value)]

//! # pagefeed
//!
//! Retrieves a social page's posts through its Graph-style REST API and
//! normalizes them into flat tabular records, optionally enriched with
//! per-post reaction tallies.
//!
//! The interesting part is the pagination loop: the API serves at most 25
//! posts per request and hands back an opaque cursor URL, so retrieving a
//! larger count means walking cursors while juggling the requested total,
//! a caller-supplied time window, transient API errors, and a courtesy
//! delay between requests.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use pagefeed::{ClientConfig, ListOptions, PageClient, Result};
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let client = PageClient::new(ClientConfig::default(), "EAAB-token");
//!
//!     let opts = ListOptions {
//!         count: 100,
//!         with_reactions: true,
//!         ..ListOptions::default()
//!     };
//!     let posts = client.list_posts("nytimes", &opts).await?;
//!
//!     for post in &posts {
//!         println!("{}  {}", post.created_time, post.id);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌───────────────────────────────────────────────────────────┐
//! │                        PageClient                         │
//! │  list_posts(page, options) → Vec<PostRecord>              │
//! │  check(page) → CheckResult                                │
//! └───────────────────────────────────────────────────────────┘
//!                              │
//! ┌──────────────┬─────────────┴─────────────┬────────────────┐
//! │   Request    │      Pagination Loop      │   Enrichment   │
//! ├──────────────┼───────────────────────────┼────────────────┤
//! │ Field list   │ Retry wrapper             │ Reaction       │
//! │ Page size    │ Cursor following          │ tallies        │
//! │ Time bounds  │ Time-window guard         │ joined by id   │
//! └──────────────┴───────────────────────────┴────────────────┘
//! ```

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::doc_markdown)]

// ============================================================================
// Module declarations
// ============================================================================

/// Error types
pub mod error;

/// Common types and type aliases
pub mod types;

/// Client configuration
pub mod config;

/// Initial request construction
pub mod request;

/// Wire format decoding
pub mod decode;

/// Record flattening and table operations
pub mod record;

/// HTTP transport with retry
pub mod http;

/// Reaction tally fetching
pub mod reactions;

/// The posts listing client
pub mod client;

/// Table output
pub mod output;

/// Command-line interface
pub mod cli;

// ============================================================================
// Re-exports
// ============================================================================

pub use error::{Error, Result};
pub use types::*;

// Re-export commonly used types
pub use client::{CheckResult, ListOptions, PageClient};
pub use config::{ClientConfig, RetryPolicy, DEFAULT_BASE_URL};
pub use record::{PostRecord, ReactionTally};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");
