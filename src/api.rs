//! GitLab REST accessor.
//!
//! A thin blocking wrapper over the v4 API: authenticate a token, list the
//! projects owned by the user, create a project. Everything else (retries,
//! timeouts, TLS) is whatever `reqwest` does by default.

use reqwest::StatusCode;
use reqwest::blocking::{Client, Response};
use reqwest::header::{ACCEPT, HeaderMap, HeaderValue, USER_AGENT};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// A project hosted on the GitLab server, as returned by the API.
#[derive(Debug, Clone, Deserialize)]
pub struct Project {
    pub name: String,
    pub ssh_url_to_repo: String,
    pub http_url_to_repo: String,
    #[serde(default)]
    pub wiki_enabled: bool,
    #[serde(default)]
    pub visibility: String,
}

#[derive(Serialize)]
struct NewProject<'a> {
    name: &'a str,
    wiki_enabled: bool,
    visibility: &'a str,
}

/// An authenticated connection to a GitLab server.
///
/// Constructed only through [`Api::connect`], so holding an `Api` implies
/// the token was accepted.
#[derive(Debug)]
pub struct Api {
    http: Client,
    base: String,
}

impl Api {
    /// Authenticate `token` against the server at `base_url`.
    ///
    /// Sends the token as a `PRIVATE-TOKEN` default header and probes
    /// `GET /api/v4/user`.
    ///
    /// # Errors
    /// - [`Error::Unauthorized`] if the server answers 401.
    /// - [`Error::Authentication`] for any other login failure (unusable
    ///   token bytes, unreachable server, non-401 error status).
    pub fn connect(base_url: &str, token: &str) -> Result<Api> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(
            USER_AGENT,
            HeaderValue::from_static(concat!("lab/", env!("CARGO_PKG_VERSION"))),
        );
        let tok = HeaderValue::from_str(token)
            .map_err(|e| Error::Authentication(format!("unusable token: {}", e)))?;
        headers.insert("PRIVATE-TOKEN", tok);

        let http = Client::builder()
            .default_headers(headers)
            .build()
            .map_err(|e| Error::Authentication(e.to_string()))?;
        let api = Api {
            http,
            base: base_url.trim_end_matches('/').to_string(),
        };

        let resp = api
            .http
            .get(api.endpoint("user"))
            .send()
            .map_err(|e| Error::Authentication(e.to_string()))?;
        match resp.status() {
            s if s.is_success() => Ok(api),
            StatusCode::UNAUTHORIZED => Err(Error::Unauthorized(body_message(resp))),
            _ => Err(Error::Authentication(body_message(resp))),
        }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/api/v4/{}", self.base, path)
    }

    /// Fetch the projects owned by the authenticated user.
    ///
    /// Single bounded fetch with a large page size (1000); accounts with
    /// more projects than that would need a pagination loop here.
    pub fn owned_projects(&self) -> Result<Vec<Project>> {
        let resp = self
            .http
            .get(self.endpoint("projects"))
            .query(&[("owned", "true"), ("per_page", "1000")])
            .send()?
            .error_for_status()?;
        Ok(resp.json()?)
    }

    /// Create a project with the given name and flags. Persists immediately
    /// on the server and returns the created entity.
    pub fn create_project(&self, name: &str, wiki_enabled: bool, public: bool) -> Result<Project> {
        let body = NewProject {
            name,
            wiki_enabled,
            visibility: if public { "public" } else { "private" },
        };
        let resp = self
            .http
            .post(self.endpoint("projects"))
            .json(&body)
            .send()?
            .error_for_status()?;
        Ok(resp.json()?)
    }
}

/// Pull a human-readable message out of an error response body.
///
/// GitLab error bodies are JSON with a `message` (sometimes `error`) field;
/// fall back to the bare status code when the body is something else.
fn body_message(resp: Response) -> String {
    let status = resp.status();
    let parsed: Option<serde_json::Value> = resp.json().ok();
    parsed
        .as_ref()
        .and_then(|v| {
            v.get("message")
                .or_else(|| v.get("error"))
                .and_then(|m| m.as_str())
                .map(str::to_string)
        })
        .unwrap_or_else(|| status.to_string())
}
