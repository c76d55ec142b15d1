//! Purpose: Drive catalog operations against a client while owning the cached mirror.
//! Exports: `CatalogSession`.
//! Role: The stateful layer between transport and any front end.
//! Invariants: Every successful write is followed by exactly one reload.
//! Invariants: A failed operation leaves the mirror untouched.
//! Invariants: Update merge defaults resolve from the mirror, never from rendered output.
#![allow(clippy::result_large_err)]

use crate::core::catalog::Catalog;
use crate::core::error::{Error, ErrorKind};
use crate::core::filter::Query;
use crate::core::movie::{Movie, MovieForm};

use super::client::CatalogClient;

pub struct CatalogSession {
    client: CatalogClient,
    catalog: Catalog,
}

impl CatalogSession {
    pub fn new(client: CatalogClient) -> Self {
        Self {
            client,
            catalog: Catalog::new(),
        }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Fetch the full collection and swap it into the mirror.
    ///
    /// On failure the previous mirror contents stay as they were.
    pub fn load(&mut self) -> Result<&[Movie], Error> {
        let movies = self.client.list()?;
        self.catalog.replace(movies);
        Ok(self.catalog.movies())
    }

    /// Local filter over the mirror; no request is issued.
    pub fn filtered(&self, query: &Query) -> Vec<&Movie> {
        self.catalog.select(query)
    }

    /// Validate and create a record, then reload.
    ///
    /// Validation failures abort before any request. The server's echo of the
    /// created record is returned for receipts.
    pub fn create(&mut self, form: &MovieForm) -> Result<Movie, Error> {
        let new_movie = form.to_new_movie()?;
        let created = self.client.create(&new_movie)?;
        self.load()?;
        Ok(created)
    }

    /// Validate and replace the identified record in full, then reload.
    ///
    /// Fields the form omits inherit the mirror's cached values for `id`.
    pub fn update(&mut self, id: u64, form: &MovieForm) -> Result<Movie, Error> {
        let current = self.cached(id)?.clone();
        let replacement = form.apply_to(&current)?;
        let updated = self.client.update(&replacement)?;
        self.load()?;
        Ok(updated)
    }

    /// Delete the identified record, then reload.
    ///
    /// The server is authoritative for existence; an absent id comes back as
    /// its 404 and no reload happens.
    pub fn delete(&mut self, id: u64) -> Result<(), Error> {
        self.client.delete(id)?;
        self.load()?;
        Ok(())
    }

    /// Resolve an id against the mirror; absent ids fail without a request.
    pub fn cached(&self, id: u64) -> Result<&Movie, Error> {
        self.catalog.find(id).ok_or_else(|| {
            Error::new(ErrorKind::NotFound)
                .with_message(format!("no record with id {id} in the loaded catalog"))
                .with_id(id)
        })
    }
}
