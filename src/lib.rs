//! # Param Miner
//!
//! A reconnaissance helper for web security testing. It fetches a list of
//! URLs, scans the returned HTML for every parameter name it can find, and
//! writes each URL back out with a query string pre-populated with those
//! parameters, ready for a fuzzer.
//!
//! ## Where parameters come from
//!
//! | Source | Elements | Value used |
//! |--------|----------|------------|
//! | `name` attribute | `a`, `form`, `input`, `select`, `textarea` | `value` attribute, or `FUZZ` |
//! | `href` query string | any of the above | each query value |
//! | `action` query string | any of the above | each query value |
//!
//! Blank values are always replaced with the `FUZZ` sentinel, so every
//! position without a seed value is marked as injectable.
//!
//! ## Quick Start
//!
//! ```rust
//! use param_miner::{extract, rewrite};
//!
//! let params = extract(r#"<form action="/search?x=1"><input name="q"></form>"#);
//! let url = rewrite("http://h/page", &params).unwrap();
//! assert_eq!(url, "http://h/page?q=FUZZ&x=1");
//! ```
//!
//! ## CLI Usage
//!
//! ```bash
//! # URLs from a file, 50 workers, through a local proxy
//! param-miner -i urls.txt -o params.txt -c 50 --proxy http://127.0.0.1:8080
//!
//! # URLs from stdin, paths joined onto a base URL, print what was found
//! cat paths.txt | param-miner --baseurl https://example.com -v
//! ```

/// Configuration and settings for the parameter miner
pub mod config;

/// Error types and error handling utilities
pub mod error;

/// HTTP request execution
pub mod executor;

/// Parameter discovery in HTML
pub mod extractor;

/// Multi-valued parameter map and its query encoding
pub mod params;

/// Query-string replacement on input URLs
pub mod rewriter;

/// Worker pool processing the URL stream
pub mod worker;

/// Command-line interface implementation
pub mod cli;

/// Run statistics
pub mod stats;

/// Utility functions and helpers
pub mod utils;


pub use cli::*;
pub use config::*;
pub use error::*;
pub use executor::*;
pub use extractor::*;
pub use params::*;
pub use rewriter::*;
pub use stats::*;
pub use utils::*;
pub use worker::*;
