//! Daily box-office sales from Box Office Mojo, cached on disk and in memory

pub mod catalog;
pub mod compare;
pub mod config;
pub mod error;
pub mod fetch;
pub mod memo;
pub mod normalize;
pub mod parse;
pub mod registry;
pub mod retriever;
pub mod store;
pub mod types;

pub use config::Config;
pub use error::{Error, Result};
pub use fetch::{Fetch, HttpFetcher};
pub use registry::IdentifierRegistry;
pub use retriever::{BatchReport, CatalogReport, SalesRetriever};
pub use types::*;
