//! Image fetch-and-cache component: HTTP downloads throttled to a fixed
//! number of simultaneous transfers, cached on disk keyed by URL, with a
//! negative cache suppressing refetches of recently failed URLs.
mod cache_key;
mod error;
mod sniff;
mod store;
mod transport;

pub use cache_key::sanitize;
pub use error::{StoreError, TransportError};
pub use sniff::{Image, ImageDecoder, ImageFormat, SniffingDecoder};
pub use store::{Completion, ImageStore, StoreSettings};
pub use transport::{ImageTransport, ReqwestTransport, TransportSettings};
