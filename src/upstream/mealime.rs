use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::cookie::Jar;
use reqwest::header::ACCEPT;
use reqwest::{RequestBuilder, Response, StatusCode};
use serde_json::Value;
use tracing::{debug, info, warn};

use super::base::{AddResult, UpstreamError, UpstreamSession};
use crate::config::UpstreamConfig;

const LOGIN_PATH: &str = "/login";
const SESSION_PATH: &str = "/sessions";
const LIST_PATH: &str = "/grocery_list";
const ADD_PATH: &str = "/grocery_list/items";

/// Logged-in state: the CSRF token every mutating request must carry.
#[derive(Debug)]
struct Session {
    csrf_token: String,
}

/// Cookie-based session against the Mealime web app.
///
/// Redirects are not followed. The cookie jar still records what a `302`
/// sets, and a reset swaps in an empty jar.
pub struct MealimeClient {
    config: UpstreamConfig,
    http: reqwest::Client,
    session: Option<Session>,
}

fn build_http(config: &UpstreamConfig, jar: Arc<Jar>) -> Result<reqwest::Client, String> {
    reqwest::Client::builder()
        .cookie_provider(jar)
        .redirect(reqwest::redirect::Policy::none())
        .timeout(Duration::from_millis(config.timeout_in_ms))
        .build()
        .map_err(|e| format!("Could not build upstream HTTP client: {}", e))
}

impl MealimeClient {
    pub fn new(config: &UpstreamConfig) -> Result<Self, String> {
        info!(
            "Creating Mealime session client for '{}' (timeout {} ms)",
            config.base_url, config.timeout_in_ms
        );
        let http = build_http(config, Arc::new(Jar::default()))?;

        Ok(Self {
            config: config.clone(),
            http,
            session: None,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.base_url.trim_end_matches('/'), path)
    }

    fn credentials(&self) -> Option<(String, String)> {
        match (&self.config.email, &self.config.password) {
            (Some(email), Some(password)) if !email.is_empty() && !password.is_empty() => {
                Some((email.clone(), password.clone()))
            }
            _ => None,
        }
    }

    async fn send(&self, request: RequestBuilder) -> Result<Response, UpstreamError> {
        request.send().await.map_err(|e| {
            if e.is_timeout() {
                UpstreamError::Other("upstream request timed out".to_string())
            } else {
                UpstreamError::Other(format!("Error sending request: {}", e))
            }
        })
    }

    async fn fetch_csrf_token(&self, path: &str) -> Result<String, UpstreamError> {
        let request = self.http.get(self.url(path));
        let response = self.send(request).await?;
        let status = response.status();
        if !status.is_success() {
            return Err(UpstreamError::Other(format!(
                "GET {} answered with status {}",
                path, status
            )));
        }
        let html = response
            .text()
            .await
            .map_err(|e| UpstreamError::Other(format!("Error reading response body: {}", e)))?;
        extract_csrf_token(&html)
            .ok_or_else(|| UpstreamError::Other(format!("No CSRF token on {}", path)))
    }
}

#[async_trait]
impl UpstreamSession for MealimeClient {
    async fn login(&mut self) -> Result<(), UpstreamError> {
        if self.session.is_some() {
            return Ok(());
        }
        let (email, password) = self.credentials().ok_or_else(|| {
            UpstreamError::Other("upstream credentials are not configured".to_string())
        })?;

        debug!("Logging in to Mealime as '{}'", email);
        let login_token = self.fetch_csrf_token(LOGIN_PATH).await?;

        let form = [
            ("user[email]", email.as_str()),
            ("user[password]", password.as_str()),
            ("authenticity_token", login_token.as_str()),
        ];
        let request = self.http.post(self.url(SESSION_PATH)).form(&form);
        let response = self.send(request).await?;
        let status = response.status();
        if !(status.is_success() || status.is_redirection()) {
            return Err(UpstreamError::Other(format!(
                "login rejected with status {}",
                status
            )));
        }

        // the token rotates once the session is authenticated
        let csrf_token = self.fetch_csrf_token(LIST_PATH).await?;
        self.session = Some(Session { csrf_token });
        info!("Mealime session established");
        Ok(())
    }

    async fn add_query(&mut self, text: &str) -> Result<AddResult, UpstreamError> {
        let csrf_token = match &self.session {
            Some(session) => session.csrf_token.clone(),
            None => {
                return Err(UpstreamError::SessionInvalid(
                    "no active session".to_string(),
                ))
            }
        };

        let request = self
            .http
            .post(self.url(ADD_PATH))
            .header("X-CSRF-Token", csrf_token)
            .header(ACCEPT, "application/json")
            .form(&[("query", text)]);
        let response = self.send(request).await?;

        match response.status() {
            status if status.is_success() => {
                let body = response.text().await.map_err(|e| {
                    UpstreamError::Other(format!("Error reading response body: {}", e))
                })?;
                Ok(AddResult {
                    result: result_text(body),
                })
            }
            StatusCode::UNPROCESSABLE_ENTITY => {
                warn!("Mealime rejected the CSRF token");
                Err(UpstreamError::SessionInvalid(
                    "CSRF token rejected".to_string(),
                ))
            }
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                warn!("Mealime denied access to the grocery list");
                Err(UpstreamError::SessionInvalid("permission denied".to_string()))
            }
            status => Err(UpstreamError::Other(format!(
                "Unexpected status code: {}",
                status
            ))),
        }
    }

    async fn reset(&mut self) -> Result<(), UpstreamError> {
        info!("Resetting Mealime session");
        self.session = None;
        self.http = build_http(&self.config, Arc::new(Jar::default()))
            .map_err(UpstreamError::Other)?;
        self.login().await
    }
}

/// Pull the `content` of `<meta name="csrf-token" ...>` out of a page.
/// Attributes may come in any order, quoted with `"` or `'`.
fn extract_csrf_token(html: &str) -> Option<String> {
    let mut rest = html;
    while let Some(start) = rest.find('<') {
        let after = &rest[start + 1..];
        let end = after.find('>')?;
        let tag = &after[..end];
        rest = &after[end..];

        let is_meta = tag.get(..4).is_some_and(|name| name.eq_ignore_ascii_case("meta"));
        if !is_meta || attribute(tag, "name") != Some("csrf-token") {
            continue;
        }
        return attribute(tag, "content")
            .filter(|token| !token.is_empty())
            .map(str::to_string);
    }
    None
}

/// Quoted value of `name=` inside a tag body.
fn attribute<'a>(tag: &'a str, name: &str) -> Option<&'a str> {
    let mut rest = tag;
    loop {
        let at = rest.find(name)?;
        let preceded_by_space = rest[..at]
            .chars()
            .next_back()
            .is_some_and(|c| c.is_ascii_whitespace());
        let after = rest[at + name.len()..].trim_start();
        rest = &rest[at + name.len()..];

        let Some(value) = after.strip_prefix('=') else {
            continue;
        };
        if !preceded_by_space {
            continue;
        }
        let value = value.trim_start();
        let quote = value.chars().next().filter(|c| *c == '"' || *c == '\'')?;
        let value = &value[1..];
        return value.find(quote).map(|len| &value[..len]);
    }
}

/// JSON answers carry the text under `result`; anything else is relayed as is.
fn result_text(body: String) -> String {
    match serde_json::from_str::<Value>(&body) {
        Ok(Value::Object(map)) => match map.get("result").and_then(Value::as_str) {
            Some(result) => result.to_string(),
            None => body,
        },
        _ => body,
    }
}
