//! Purpose: Shared library crate used by the `marquee` CLI and tests.
//! Exports: `core` (movie model, validation, filtering, errors), `api` (HTTP client + session), `render`, `notice`.
//! Role: Internal library backing the binaries; not yet a stable public SDK.
//! Invariants: Treat the crate API as internal until a dedicated library release.
//! Invariants: Core modules prefer explicit inputs/outputs over hidden state.
pub mod api;
pub mod core;
pub mod notice;
pub mod render;
