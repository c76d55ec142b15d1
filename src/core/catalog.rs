//! Purpose: Hold the client's cached copy of the server's movie collection.
//! Exports: `Catalog`.
//! Role: The single piece of mutable client state; the server stays authoritative.
//! Invariants: `replace` is the only mutator; contents swap wholesale, never row by row.
//! Invariants: Server order is preserved; the catalog never reorders or patches rows.

use crate::core::filter::Query;
use crate::core::movie::Movie;

#[derive(Clone, Debug, Default)]
pub struct Catalog {
    movies: Vec<Movie>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Swap in a fresh server snapshot, discarding whatever was cached.
    pub fn replace(&mut self, movies: Vec<Movie>) {
        self.movies = movies;
    }

    pub fn movies(&self) -> &[Movie] {
        &self.movies
    }

    pub fn select(&self, query: &Query) -> Vec<&Movie> {
        self.movies
            .iter()
            .filter(|movie| query.matches(movie))
            .collect()
    }

    pub fn find(&self, id: u64) -> Option<&Movie> {
        self.movies.iter().find(|movie| movie.id == id)
    }

    pub fn len(&self) -> usize {
        self.movies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.movies.is_empty()
    }
}
