// Core modules implementing the movie model, filtering, the cached catalog, and error modeling.
pub mod catalog;
pub mod error;
pub mod filter;
pub mod movie;
