//! Purpose: Evaluate free-text queries against movie records.
//! Exports: `Query`.
//! Role: Local, pure filtering applied to the cached list after fetch; never issues requests.
//! Invariants: Matching is a case-insensitive substring test over title and genre.
//! Invariants: An empty or whitespace-only query matches every record.

use crate::core::movie::Movie;

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Query {
    term: String,
}

impl Query {
    /// Normalize raw search input: trim, then lowercase.
    pub fn parse(input: &str) -> Self {
        Self {
            term: input.trim().to_lowercase(),
        }
    }

    /// The query that selects everything.
    pub fn all() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.term.is_empty()
    }

    pub fn matches(&self, movie: &Movie) -> bool {
        if self.term.is_empty() {
            return true;
        }
        movie.title.to_lowercase().contains(&self.term)
            || movie.genre.to_lowercase().contains(&self.term)
    }
}

#[cfg(test)]
mod tests {
    use super::Query;
    use crate::core::movie::Movie;

    fn sample() -> Vec<Movie> {
        vec![
            Movie {
                id: 1,
                title: "Alien".to_string(),
                year: 1979,
                genre: "Horror".to_string(),
            },
            Movie {
                id: 2,
                title: "Amélie".to_string(),
                year: 2001,
                genre: "Romance".to_string(),
            },
        ]
    }

    fn ids(movies: &[Movie], query: &Query) -> Vec<u64> {
        movies
            .iter()
            .filter(|movie| query.matches(movie))
            .map(|movie| movie.id)
            .collect()
    }

    #[test]
    fn matches_genre_substring_case_insensitively() {
        let movies = sample();
        assert_eq!(ids(&movies, &Query::parse("hor")), vec![1]);
        assert_eq!(ids(&movies, &Query::parse("HOR")), vec![1]);
    }

    #[test]
    fn matches_title_substring_unanchored() {
        let movies = sample();
        assert_eq!(ids(&movies, &Query::parse("mél")), vec![2]);
        assert_eq!(ids(&movies, &Query::parse("lie")), vec![1, 2]);
    }

    #[test]
    fn empty_query_matches_everything() {
        let movies = sample();
        assert_eq!(ids(&movies, &Query::parse("")), vec![1, 2]);
        assert_eq!(ids(&movies, &Query::parse("   ")), vec![1, 2]);
        assert_eq!(ids(&movies, &Query::all()), vec![1, 2]);
    }

    #[test]
    fn year_values_are_not_searched() {
        let movies = sample();
        assert!(ids(&movies, &Query::parse("1979")).is_empty());
    }

    #[test]
    fn surrounding_whitespace_is_trimmed() {
        let movies = sample();
        assert_eq!(ids(&movies, &Query::parse("  romance ")), vec![2]);
    }
}
