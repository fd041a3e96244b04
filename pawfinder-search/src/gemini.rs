use crate::query::{BuiltQuery, Tool, ToolConfig};
use crate::shape::shape_places;
use crate::traits::PlaceSearch;
use crate::types::{GroundingChunk, NO_RESULTS_TEXT, SearchResult};
use async_trait::async_trait;
use pawfinder_common::{PawError, Result};
use pawfinder_config::GeminiSettings;
use pawfinder_http::{Auth, HttpClient, HttpError, RequestOpts};
use serde::{Deserialize, Serialize};
use std::time::Duration;

const API_KEY_HEADER: &str = "x-goog-api-key";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiRequest<'a> {
    contents: Vec<GeminiContent<'a>>,
    tools: &'a [Tool],
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_config: Option<&'a ToolConfig>,
}

#[derive(Debug, Serialize)]
struct GeminiContent<'a> {
    role: &'static str,
    parts: Vec<GeminiPart<'a>>,
}

#[derive(Debug, Serialize)]
struct GeminiPart<'a> {
    text: &'a str,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct GeminiResponse {
    #[serde(default)]
    candidates: Option<Vec<GeminiCandidate>>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiCandidate {
    #[serde(default)]
    content: Option<GeminiResponseContent>,
    #[serde(default)]
    grounding_metadata: Option<GroundingMetadata>,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct GeminiResponseContent {
    #[serde(default)]
    parts: Option<Vec<GeminiResponsePart>>,
}

#[derive(Debug, Default, Deserialize)]
struct GeminiResponsePart {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GroundingMetadata {
    #[serde(default)]
    grounding_chunks: Option<Vec<GroundingChunk>>,
}

impl GeminiResponse {
    /// Reduce a raw response to what the view needs.
    ///
    /// Only the first part of the first candidate is read as text. A missing
    /// or empty string falls back to [`NO_RESULTS_TEXT`], later parts are
    /// ignored. Grounding chunks are shaped.
    pub(crate) fn into_search_result(self) -> SearchResult {
        let first = self.candidates.and_then(|c| c.into_iter().next());
        let Some(candidate) = first else {
            return SearchResult {
                text: NO_RESULTS_TEXT.to_string(),
                places: Vec::new(),
            };
        };

        if let Some(reason) = candidate.finish_reason.as_deref() {
            tracing::debug!(finish_reason = reason, "search.gemini.finish");
        }

        let text = candidate
            .content
            .and_then(|c| c.parts)
            .and_then(|parts| parts.into_iter().next())
            .and_then(|p| p.text)
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| NO_RESULTS_TEXT.to_string());

        let chunks = candidate
            .grounding_metadata
            .and_then(|m| m.grounding_chunks)
            .unwrap_or_default();

        SearchResult {
            text,
            places: shape_places(chunks),
        }
    }
}

/// Gemini `generateContent` client with Google Maps grounding.
///
/// Requires a valid API key and internet access.
pub struct GeminiSearchClient {
    http: HttpClient,
    auth: Auth<'static>,
    model: String,
}

impl GeminiSearchClient {
    /// Create a client against `endpoint` (the `v1beta/` root).
    pub fn new(api_key: &str, model: impl Into<String>, endpoint: &str) -> Result<Self> {
        let http = HttpClient::new(endpoint).map_err(config_error)?;
        let auth = Auth::api_key_header(API_KEY_HEADER, api_key).map_err(config_error)?;
        Ok(Self {
            http,
            auth,
            model: model.into(),
        })
    }

    /// Build from loaded settings. A missing or blank key is a configuration
    /// error and no client is created.
    pub fn from_settings(settings: &GeminiSettings) -> Result<Self> {
        let key = settings
            .api_key
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .ok_or_else(|| {
                PawError::Config(
                    "Gemini API key is not configured (set gemini.api_key or PAWFINDER__GEMINI__API_KEY)"
                        .to_string(),
                )
            })?;

        let http = HttpClient::with_connect_timeout(
            &settings.endpoint,
            Duration::from_secs(settings.connect_timeout_secs),
        )
        .map_err(config_error)?
        .with_timeout(Duration::from_secs(settings.timeout_secs));
        let auth = Auth::api_key_header(API_KEY_HEADER, key).map_err(config_error)?;

        Ok(Self {
            http,
            auth,
            model: settings.model.clone(),
        })
    }
}

fn config_error(e: HttpError) -> PawError {
    PawError::Config(format!("Failed to create Gemini client: {e}"))
}

#[async_trait]
impl PlaceSearch for GeminiSearchClient {
    async fn search(&self, query: &BuiltQuery) -> Result<SearchResult> {
        let path = format!("models/{}:generateContent", self.model);

        let request = GeminiRequest {
            contents: vec![GeminiContent {
                role: "user",
                parts: vec![GeminiPart {
                    text: &query.prompt,
                }],
            }],
            tools: &query.tools,
            tool_config: query.tool_config.as_ref(),
        };

        tracing::debug!(
            model = %self.model,
            url = %format!("{}{}", self.http.base(), path),
            biased = query.tool_config.is_some(),
            "search.gemini.start"
        );

        let response: GeminiResponse = self
            .http
            .post_json_opts(
                &path,
                &request,
                RequestOpts {
                    auth: Some(self.auth.clone()),
                    ..Default::default()
                },
            )
            .await
            .map_err(|e| {
                tracing::warn!(model = %self.model, error = %e, "search.gemini.failed");
                PawError::SearchFailed(e.to_string())
            })?;

        let result = response.into_search_result();
        tracing::info!(
            model = %self.model,
            places = result.places.len(),
            "search.gemini.done"
        );
        Ok(result)
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}
