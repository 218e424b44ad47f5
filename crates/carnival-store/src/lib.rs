//! Event and map-block store for the carnival display engine.
//!
//! # Modules
//!
//! - [`store`] -- The in-memory [`EventStore`], the single writer of
//!   lifecycle status
//! - [`layout`] -- Grid placement and clamping on the venue map
//! - [`ordering`] -- Time-sorted listings, undated events last
//! - [`remote`] -- HTTP client for the persistence backend
//! - [`error`] -- Store and backend error types

pub mod error;
pub mod layout;
pub mod ordering;
pub mod remote;
pub mod store;

pub use error::{RemoteError, StoreError};
pub use remote::{RemoteBackend, initialize_from_api, mirror};
pub use store::{EventStore, StatusChange};
