//! Fincollect Market Data Crate
//!
//! HTTP plumbing and source-specific payload decoding for the collector.
//!
//! # Overview
//!
//! - [`FetchClient`] issues GET requests, decodes JSON bodies and waits out
//!   HTTP 429 responses according to a [`RateLimitPolicy`].
//! - [`PolygonProvider`] fetches daily equity aggregates.
//! - [`FrankfurterProvider`] fetches daily exchange-rate time series.
//!
//! Providers return loosely typed rows ([`AggregateBar`], [`DailyRates`]);
//! validation and normalization into stored records happens in the core crate.
//!
//! # Architecture
//!
//! ```text
//! +------------------+     +------------------+     +------------------+
//! |    Provider      | --> |   FetchClient    | --> |  HttpTransport   |
//! | (Polygon, FX..)  |     | (JSON + backoff) |     |    (reqwest)     |
//! +------------------+     +------------------+     +------------------+
//! ```

pub mod client;
pub mod errors;
pub mod models;
pub mod provider;

#[cfg(any(test, feature = "test-util"))]
pub mod testing;

pub use client::{
    FetchClient, HttpResponse, HttpTransport, RateLimitPolicy, ReqwestTransport,
    DEFAULT_REQUEST_TIMEOUT,
};
pub use errors::MarketDataError;
pub use models::{AggregateBar, DailyRates};
pub use provider::frankfurter::FrankfurterProvider;
pub use provider::polygon::PolygonProvider;
