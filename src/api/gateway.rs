//! Gateway API client for authenticated Deezer operations.
//!
//! This module provides a client for the Deezer Gateway API
//! (deezer.com/ajax/gw-light.php). Lyrics are only served through the
//! gateway, which requires an ARL session cookie.

use reqwest::{cookie::Jar, Client, Url};
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{debug, error, info};

use crate::api::public::{REQUEST_TIMEOUT, USER_AGENT};
use crate::error::{PosterError, Result};

/// Gateway API private endpoint.
const GATEWAY_URL: &str = "https://www.deezer.com/ajax/gw-light.php";

/// Site the ARL cookie is scoped to.
const DEEZER_SITE: &str = "https://www.deezer.com";

/// Gateway error key reported for songs that have no lyrics.
const NO_DATA_ERROR: &str = "DATA_ERROR";

/// Gateway API client with authentication.
///
/// # Authentication
///
/// Requires an ARL (Authentication Request Locator) token, which can be
/// obtained from a logged-in browser session.
///
/// # Example
///
/// ```rust,no_run
/// use lyric_poster::GatewayApi;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let gw = GatewayApi::new("your_arl_token_here").await?;
///     let lyrics = gw.get_lyrics("3135556").await?;
///     println!("Lyrics: {:?}", lyrics);
///     Ok(())
/// }
/// ```
#[derive(Debug)]
pub struct GatewayApi {
    client: Client,
    api_token: String,
}

impl GatewayApi {
    /// Create a new Gateway API client with an ARL token.
    ///
    /// This will set the ARL cookie and fetch user data to get the API token.
    ///
    /// # Errors
    ///
    /// Returns `BadCredentials` if the ARL token is invalid.
    pub async fn new(arl: &str) -> Result<Self> {
        let jar = Arc::new(Jar::default());
        let url = DEEZER_SITE
            .parse::<Url>()
            .map_err(|e| PosterError::ApiError(format!("Invalid gateway site URL: {}", e)))?;
        jar.add_cookie_str(&format!("arl={}", arl), &url);

        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(REQUEST_TIMEOUT)
            .cookie_provider(jar)
            .build()
            .map_err(|e| PosterError::ApiError(format!("Failed to create client: {}", e)))?;

        let mut api = Self {
            client,
            api_token: "null".to_string(),
        };

        api.refresh_token().await?;

        Ok(api)
    }

    /// Refresh the API token from the logged-in user's data.
    async fn refresh_token(&mut self) -> Result<()> {
        let user_data = self.call_api("deezer.getUserData", None).await?;

        let user_id = user_data
            .get("USER")
            .and_then(|u| u.get("USER_ID"))
            .and_then(|id| id.as_u64())
            .unwrap_or(0);

        if user_id == 0 {
            return Err(PosterError::BadCredentials(
                "ARL token is invalid or expired".to_string(),
            ));
        }

        self.api_token = user_data
            .get("checkForm")
            .and_then(|t| t.as_str())
            .unwrap_or("null")
            .to_string();

        info!("Gateway API authenticated. User ID: {}", user_id);

        Ok(())
    }

    /// Make a request to the Gateway API and return the whole envelope.
    async fn call_api_envelope(&self, method: &str, json_data: Option<Value>) -> Result<Value> {
        let params = [
            ("api_version", "1.0"),
            ("api_token", self.api_token.as_str()),
            ("input", "3"),
            ("method", method),
        ];

        // Deezer answers 411 Length Required without a body.
        let body = json_data.unwrap_or_else(|| json!({}));

        let response = self
            .client
            .post(GATEWAY_URL)
            .query(&params)
            .json(&body)
            .send()
            .await?;
        let status = response.status();
        let text = response.text().await?;

        serde_json::from_str(&text).map_err(|e| {
            let preview: String = text.chars().take(500).collect();
            error!(
                "Failed to parse Gateway response (status {}): {}",
                status, preview
            );
            PosterError::ApiError(format!(
                "Invalid JSON response (status {}): {}",
                status, e
            ))
        })
    }

    /// Make a request to the Gateway API and return its `results`.
    async fn call_api(&self, method: &str, json_data: Option<Value>) -> Result<Value> {
        let envelope = self.call_api_envelope(method, json_data).await?;
        let results = envelope.get("results").cloned().unwrap_or(Value::Null);

        if results.is_null() {
            if let Some(error) = gateway_error(&envelope) {
                let error_msg = error.to_string();
                error!("Gateway API error: {}", error_msg);
                return Err(PosterError::ApiError(error_msg));
            }
        }

        Ok(results)
    }

    /// Get the unsynced lyrics of a song.
    ///
    /// Returns `Ok(None)` when Deezer has no lyrics for the song.
    pub async fn get_lyrics(&self, song_id: &str) -> Result<Option<String>> {
        let json_data = json!({
            "sng_id": song_id
        });

        let envelope = self
            .call_api_envelope("song.getLyrics", Some(json_data))
            .await?;

        if let Some(error) = gateway_error(&envelope) {
            if error.get(NO_DATA_ERROR).is_some() {
                debug!("No lyrics for song {}", song_id);
                return Ok(None);
            }
            error!("Gateway API error for song {}: {}", song_id, error);
            return Err(PosterError::ApiError(error.to_string()));
        }

        Ok(lyrics_text(&envelope))
    }
}

/// The envelope's error payload, ignoring the empty `[]`/`{}` Deezer sends
/// on success.
fn gateway_error(envelope: &Value) -> Option<&Value> {
    envelope.get("error").filter(|e| match e {
        Value::Array(items) => !items.is_empty(),
        Value::Object(fields) => !fields.is_empty(),
        Value::Null => false,
        _ => true,
    })
}

fn lyrics_text(envelope: &Value) -> Option<String> {
    envelope
        .get("results")
        .and_then(|r| r.get("LYRICS_TEXT"))
        .and_then(|t| t.as_str())
        .filter(|t| !t.trim().is_empty())
        .map(|t| t.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gateway_error_ignores_empty_payloads() {
        assert!(gateway_error(&json!({ "error": [], "results": {} })).is_none());
        assert!(gateway_error(&json!({ "error": {}, "results": {} })).is_none());
        assert!(gateway_error(&json!({ "results": {} })).is_none());
        assert!(gateway_error(&json!({ "error": { "DATA_ERROR": "x" } })).is_some());
    }

    #[test]
    fn test_lyrics_text() {
        let envelope = json!({
            "error": [],
            "results": { "LYRICS_ID": "1", "LYRICS_TEXT": "One more time\nWe're gonna celebrate" }
        });
        assert_eq!(
            lyrics_text(&envelope).as_deref(),
            Some("One more time\nWe're gonna celebrate")
        );
        assert_eq!(lyrics_text(&json!({ "results": { "LYRICS_TEXT": "  " } })), None);
    }
}
