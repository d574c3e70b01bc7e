use crate::error::Result;

pub mod batch;
pub mod client;
pub mod endpoints;
pub mod query;
pub mod queue;
pub mod symbols;
pub mod throttle;
pub mod transport;

pub use batch::{chunk_codes, ChunkedOutcome};
pub use client::{QuoteFetcher, StaticInfoReport, TickReport};
pub use endpoints::Endpoint;
pub use queue::SerialQueue;
pub use symbols::{classify, Market};
pub use transport::{CallRequest, Transport, RET_INVALID_CODE, RET_OK};

pub type FetchResult<T> = Result<T>;
