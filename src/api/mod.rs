//! Purpose: Define the public API boundary for the catalog client.
//! Exports: Transport client, stateful session, and the shared core types they exchange.
//! Role: Public surface used by the CLI and integration tests.
//! Invariants: This module is the only public path to transport primitives.
//! Invariants: Internal helpers stay private; re-exports are additive-only.

mod client;
mod session;

pub use crate::core::catalog::Catalog;
#[doc(hidden)]
pub use crate::core::error::to_exit_code;
pub use crate::core::error::{Error, ErrorKind};
pub use crate::core::filter::Query;
pub use crate::core::movie::{Movie, MovieForm, NewMovie};
pub use client::CatalogClient;
pub use session::CatalogSession;
