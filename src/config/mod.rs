//! Configuration loading and validation
//!
//! Runtime configuration comes from environment variables (with safe
//! defaults) plus the search queries given on the command line. All
//! validation happens up front: configuration problems are the only
//! fatal error class, reported before any crawl activity begins.

mod env;
mod types;
mod validation;

pub use env::load_from_env;
pub use types::{Config, SearchQuery};
pub use validation::validate;
