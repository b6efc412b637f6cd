//! Automation engine implementations.
//!
//! - `HttpBrowser` - static HTML over HTTP (no JavaScript)

pub mod http;

pub use http::HttpBrowser;
