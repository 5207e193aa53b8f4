pub mod catalog;
pub mod config;
pub mod dedup;
pub mod domain;
pub mod error;
pub mod filter;
pub mod logging;
pub mod normalize;
pub mod paginate;
pub mod rank;
pub mod registry;
pub mod search;
pub mod sources;

pub use catalog::DatasetCatalog;
pub use config::Config;
pub use domain::{ListingCategory, Property, PropertyCategory, RawRecord, SourceShape};
pub use error::{AggregatorError, Result};
pub use filter::{FilterSpec, RangeFilter};
pub use registry::{SourceDescriptor, SourceEndpoint, SourceRegistry};
pub use search::{SearchRequest, SearchResponse, SearchService};
pub use sources::{DatasetFetcher, DatasetProvider, MemoizingProvider};
