pub mod config;
pub mod logging;

pub mod fetch;
pub mod flexible;
pub mod retry;

pub use fetch::{fetch_bytes, fetch_stream, BodyStream, FetchError, Fetcher};
pub use flexible::{decode_flexible_list, DecodeError, FlexibleList};
pub use retry::RetryPolicy;
