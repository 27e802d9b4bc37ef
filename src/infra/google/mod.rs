//! Google Sheets export target.
//!
//! [`TokenSource`] resolves an OAuth access token from the environment or a
//! credentials file. [`GoogleSheetsSink`] implements
//! [`RowSink`](dash_stuck::export::RowSink) on top of the Sheets v4 REST API.

mod credentials;
mod sheets;

pub use credentials::TokenSource;
pub use sheets::GoogleSheetsSink;
