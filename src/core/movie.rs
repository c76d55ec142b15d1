//! Purpose: Define the movie record model and form-input validation.
//! Exports: `Movie`, `NewMovie`, `MovieForm`.
//! Role: Stable wire shape aligned with the catalog API contract.
//! Invariants: `id` is server-assigned; clients never invent or rewrite it.
//! Invariants: Form validation fails before any request is issued.
#![allow(clippy::result_large_err)]

use crate::core::error::{Error, ErrorKind};
use serde::{Deserialize, Serialize};

/// One catalog record as the server stores it.
///
/// `title`, `year`, and `genre` default when absent so one sparse record
/// cannot poison a whole list response; `id` is required.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Movie {
    pub id: u64,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub year: i32,
    #[serde(default)]
    pub genre: String,
}

/// Create payload; the server assigns the id.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct NewMovie {
    pub title: String,
    pub year: i32,
    pub genre: String,
}

/// Raw user input for create and update flows.
///
/// Fields stay as entered until validated; `None` means "not provided",
/// which updates fill from the cached record's current values.
#[derive(Clone, Debug, Default)]
pub struct MovieForm {
    pub title: Option<String>,
    pub year: Option<String>,
    pub genre: Option<String>,
}

impl MovieForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_year(mut self, year: impl Into<String>) -> Self {
        self.year = Some(year.into());
        self
    }

    pub fn with_genre(mut self, genre: impl Into<String>) -> Self {
        self.genre = Some(genre.into());
        self
    }

    /// Validate the form as a create payload. Missing genre defaults to "".
    pub fn to_new_movie(&self) -> Result<NewMovie, Error> {
        let title = parse_title(self.title.as_deref())?;
        let year = parse_year(self.year.as_deref())?;
        let genre = self
            .genre
            .as_deref()
            .map(str::trim)
            .unwrap_or_default()
            .to_string();
        Ok(NewMovie { title, year, genre })
    }

    /// Validate the form as a full replacement for `current`.
    ///
    /// Fields the form leaves out inherit the current record's values, so a
    /// partial edit still produces the complete record a PUT requires.
    pub fn apply_to(&self, current: &Movie) -> Result<Movie, Error> {
        let title = match self.title.as_deref() {
            Some(title) => parse_title(Some(title))?,
            None => current.title.clone(),
        };
        let year = match self.year.as_deref() {
            Some(year) => parse_year(Some(year))?,
            None => current.year,
        };
        let genre = match self.genre.as_deref() {
            Some(genre) => genre.trim().to_string(),
            None => current.genre.clone(),
        };
        Ok(Movie {
            id: current.id,
            title,
            year,
            genre,
        })
    }
}

fn parse_title(input: Option<&str>) -> Result<String, Error> {
    let title = input.map(str::trim).unwrap_or_default();
    if title.is_empty() {
        return Err(Error::new(ErrorKind::Validation).with_message("title must not be empty"));
    }
    Ok(title.to_string())
}

fn parse_year(input: Option<&str>) -> Result<i32, Error> {
    let raw = input.map(str::trim).unwrap_or_default();
    raw.parse::<i32>().map_err(|err| {
        Error::new(ErrorKind::Validation)
            .with_message("year must be a whole number")
            .with_source(err)
    })
}
