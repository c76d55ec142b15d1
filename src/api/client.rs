//! Purpose: Provide the HTTP client for the movie-catalog REST endpoints.
//! Exports: `CatalogClient`.
//! Role: Transport layer; one method per wire operation, no local state.
//! Invariants: The collection route is `/movies`; items are `/movies/{id}`.
//! Invariants: Non-2xx statuses and transport failures map to stable error kinds.
//! Invariants: No retries and no timeouts; every failure is terminal for its operation.
#![allow(clippy::result_large_err)]

use crate::core::error::{Error, ErrorKind};
use crate::core::movie::{Movie, NewMovie};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};
use url::Url;

type ApiResult<T> = Result<T, Error>;

const COLLECTION: &str = "movies";
const MAX_SNIPPET_BYTES: usize = 200;

#[derive(Clone)]
pub struct CatalogClient {
    base_url: Url,
    agent: ureq::Agent,
}

impl CatalogClient {
    pub fn new(base_url: impl Into<String>) -> ApiResult<Self> {
        let base_url = normalize_base_url(base_url.into())?;
        let agent = ureq::AgentBuilder::new().build();
        Ok(Self { base_url, agent })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn list(&self) -> ApiResult<Vec<Movie>> {
        let url = collection_url(&self.base_url)?;
        self.request_json("GET", &url, &())
    }

    pub fn create(&self, movie: &NewMovie) -> ApiResult<Movie> {
        let url = collection_url(&self.base_url)?;
        self.request_json("POST", &url, movie)
    }

    pub fn update(&self, movie: &Movie) -> ApiResult<Movie> {
        let url = item_url(&self.base_url, movie.id)?;
        self.request_json("PUT", &url, movie)
            .map_err(|err| err.with_id(movie.id))
    }

    pub fn delete(&self, id: u64) -> ApiResult<()> {
        let url = item_url(&self.base_url, id)?;
        debug!("DELETE {url}");
        let response = self
            .agent
            .request("DELETE", url.as_str())
            .set("Accept", "application/json")
            .call();
        match response {
            Ok(resp) => {
                // The status line carries the outcome; delete bodies vary by server.
                let _ = resp.into_string();
                Ok(())
            }
            Err(ureq::Error::Status(code, resp)) => {
                warn!("DELETE {url} returned status {code}");
                Err(status_error(code, resp).with_url(url.as_str()).with_id(id))
            }
            Err(ureq::Error::Transport(err)) => {
                warn!("DELETE {url} failed in transport");
                Err(Error::new(ErrorKind::Io)
                    .with_message("request failed")
                    .with_url(url.as_str())
                    .with_id(id)
                    .with_source(err))
            }
        }
    }

    fn request_json<T, R>(&self, method: &str, url: &Url, body: &T) -> ApiResult<R>
    where
        T: Serialize,
        R: DeserializeOwned,
    {
        debug!("{method} {url}");
        let request = self
            .agent
            .request(method, url.as_str())
            .set("Accept", "application/json");
        let response = if method == "GET" {
            request.call()
        } else {
            let payload = serde_json::to_string(body).map_err(|err| {
                Error::new(ErrorKind::Internal)
                    .with_message("failed to encode request json")
                    .with_source(err)
            })?;
            request
                .set("Content-Type", "application/json")
                .send_string(&payload)
        };

        match response {
            Ok(resp) => read_json_response(resp).map_err(|err| err.with_url(url.as_str())),
            Err(ureq::Error::Status(code, resp)) => {
                warn!("{method} {url} returned status {code}");
                Err(status_error(code, resp).with_url(url.as_str()))
            }
            Err(ureq::Error::Transport(err)) => {
                warn!("{method} {url} failed in transport");
                Err(Error::new(ErrorKind::Io)
                    .with_message("request failed")
                    .with_url(url.as_str())
                    .with_source(err))
            }
        }
    }
}

fn normalize_base_url(raw: String) -> ApiResult<Url> {
    let mut url = Url::parse(&raw).map_err(|err| {
        Error::new(ErrorKind::Usage)
            .with_message("invalid base url")
            .with_source(err)
    })?;
    let scheme = url.scheme();
    if scheme != "http" && scheme != "https" {
        return Err(Error::new(ErrorKind::Usage).with_message("base url must use http or https scheme"));
    }
    if url.path() != "/" && !url.path().is_empty() {
        return Err(Error::new(ErrorKind::Usage).with_message("base url must not include a path"));
    }
    url.set_path("/");
    url.set_query(None);
    url.set_fragment(None);
    Ok(url)
}

fn build_url(base_url: &Url, segments: &[&str]) -> ApiResult<Url> {
    let mut url = base_url.clone();
    {
        let mut path = url
            .path_segments_mut()
            .map_err(|_| Error::new(ErrorKind::Usage).with_message("base url cannot be a base"))?;
        path.clear();
        for segment in segments {
            path.push(segment);
        }
    }
    Ok(url)
}

fn collection_url(base_url: &Url) -> ApiResult<Url> {
    build_url(base_url, &[COLLECTION])
}

fn item_url(base_url: &Url, id: u64) -> ApiResult<Url> {
    build_url(base_url, &[COLLECTION, &id.to_string()])
}

fn read_json_response<R>(response: ureq::Response) -> ApiResult<R>
where
    R: DeserializeOwned,
{
    let body = response.into_string().map_err(|err| {
        Error::new(ErrorKind::Io)
            .with_message("failed to read response body")
            .with_source(err)
    })?;
    serde_json::from_str(&body).map_err(|err| {
        Error::new(ErrorKind::Internal)
            .with_message("invalid response json")
            .with_source(err)
    })
}

fn status_error(status: u16, response: ureq::Response) -> Error {
    let body = response.into_string().unwrap_or_default();
    let message = match body_snippet(&body) {
        Some(snippet) => format!("server returned status {status}: {snippet}"),
        None => format!("server returned status {status}"),
    };
    Error::new(error_kind_from_status(status))
        .with_message(message)
        .with_status(status)
}

fn error_kind_from_status(status: u16) -> ErrorKind {
    match status {
        404 => ErrorKind::NotFound,
        _ => ErrorKind::Remote,
    }
}

fn body_snippet(body: &str) -> Option<String> {
    let flattened = body.split_whitespace().collect::<Vec<_>>().join(" ");
    if flattened.is_empty() {
        return None;
    }
    let mut snippet = String::new();
    for ch in flattened.chars() {
        if snippet.len() + ch.len_utf8() > MAX_SNIPPET_BYTES {
            snippet.push_str("...");
            break;
        }
        snippet.push(ch);
    }
    Some(snippet)
}

#[cfg(test)]
mod tests {
    use super::{
        body_snippet, collection_url, error_kind_from_status, item_url, normalize_base_url,
    };
    use crate::core::error::ErrorKind;

    #[test]
    fn normalize_base_url_strips_query_and_fragment() {
        let url = normalize_base_url("http://localhost:3000?x=1#top".to_string()).expect("url");
        assert_eq!(url.as_str(), "http://localhost:3000/");
    }

    #[test]
    fn normalize_base_url_rejects_path() {
        let err = normalize_base_url("http://localhost:3000/api".to_string()).expect_err("err");
        assert_eq!(err.kind(), ErrorKind::Usage);
    }

    #[test]
    fn normalize_base_url_rejects_non_http_scheme() {
        let err = normalize_base_url("ftp://localhost:3000".to_string()).expect_err("err");
        assert_eq!(err.kind(), ErrorKind::Usage);
    }

    #[test]
    fn routes_follow_the_collection_layout() {
        let base = normalize_base_url("http://localhost:3000".to_string()).expect("url");
        assert_eq!(
            collection_url(&base).expect("url").as_str(),
            "http://localhost:3000/movies"
        );
        assert_eq!(
            item_url(&base, 12).expect("url").as_str(),
            "http://localhost:3000/movies/12"
        );
    }

    #[test]
    fn only_404_maps_to_not_found() {
        assert_eq!(error_kind_from_status(404), ErrorKind::NotFound);
        assert_eq!(error_kind_from_status(400), ErrorKind::Remote);
        assert_eq!(error_kind_from_status(500), ErrorKind::Remote);
        assert_eq!(error_kind_from_status(503), ErrorKind::Remote);
    }

    #[test]
    fn body_snippet_flattens_and_truncates() {
        assert_eq!(body_snippet("  \n "), None);
        assert_eq!(
            body_snippet("bad\nrequest").as_deref(),
            Some("bad request")
        );
        let long = "x".repeat(500);
        let snippet = body_snippet(&long).expect("snippet");
        assert!(snippet.ends_with("..."));
        assert!(snippet.len() <= 203 + 3);
    }
}
