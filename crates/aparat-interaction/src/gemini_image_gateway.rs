//! GeminiImageGateway - Direct REST API implementation for Gemini image models.
//!
//! Sends the uploaded product shot as an inline image together with the
//! studio prompt and reads the rendered image back from the first candidate.

use aparat_core::error::{AparatError, Result};
use aparat_core::generation::{GeneratedImage, GenerationGateway, GenerationRequest};
use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use reqwest::{Client, StatusCode, header::HeaderValue};
use serde::{Deserialize, Serialize};
use std::time::Duration;

const BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/models";
const API_KEY_HEADER: &str = "x-goog-api-key";

/// Mime type assumed when the API omits one on an image part.
const DEFAULT_OUTPUT_MIME: &str = "image/png";

/// Gateway implementation that talks to the Gemini HTTP API.
#[derive(Clone)]
pub struct GeminiImageGateway {
    client: Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl GeminiImageGateway {
    /// Creates a new gateway with the provided API key and model.
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.into(),
            model: model.into(),
            base_url: BASE_URL.to_string(),
        }
    }

    /// Points the gateway at another endpoint (proxies, test servers).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// The key travels in a header so it never appears in the URL.
    fn endpoint(&self) -> String {
        format!("{}/{}:generateContent", self.base_url, self.model)
    }

    async fn send_request(&self, body: &GenerateContentRequest) -> Result<GeneratedImage> {
        let response = self
            .client
            .post(self.endpoint())
            .header(API_KEY_HEADER, &self.api_key)
            .json(body)
            .send()
            .await
            .map_err(|err| {
                let kind = if err.is_connect() {
                    "connect"
                } else if err.is_timeout() {
                    "timeout"
                } else {
                    "request"
                };
                AparatError::gateway(format!("Gemini API {kind} failed: {}", err.without_url()))
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let retry_after = parse_retry_after(response.headers().get("retry-after"));
            let body_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to read Gemini error body".to_string());
            return Err(map_http_error(status, body_text, retry_after));
        }

        let parsed: GenerateContentResponse = response
            .json()
            .await
            .map_err(|err| {
                AparatError::gateway(format!(
                    "Failed to parse Gemini response: {}",
                    err.without_url()
                ))
            })?;

        extract_image_response(parsed)
    }
}

#[async_trait]
impl GenerationGateway for GeminiImageGateway {
    fn name(&self) -> &str {
        "gemini"
    }

    async fn generate(&self, request: GenerationRequest) -> Result<GeneratedImage> {
        tracing::debug!(
            model = %self.model,
            input_bytes = request.image.len(),
            mime_type = %request.mime_type,
            aspect_ratio = %request.aspect_ratio,
            "Sending Gemini image request"
        );

        let body = build_request(&request);
        let image = self.send_request(&body).await?;

        tracing::debug!(
            output_bytes = image.bytes.len(),
            mime_type = %image.mime_type,
            "Gemini image received"
        );
        Ok(image)
    }
}

fn build_request(request: &GenerationRequest) -> GenerateContentRequest {
    let mut parts = vec![Part::InlineData {
        inline_data: InlineDataPayload {
            mime_type: request.mime_type.clone(),
            data: BASE64_STANDARD.encode(&request.image),
        },
    }];
    if !request.prompt.trim().is_empty() {
        parts.push(Part::Text {
            text: request.prompt.clone(),
        });
    }

    GenerateContentRequest {
        contents: vec![Content {
            role: "user".to_string(),
            parts,
        }],
        generation_config: GenerationConfigPayload {
            image_config: ImageConfigPayload {
                aspect_ratio: request.aspect_ratio.as_str().to_string(),
            },
        },
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    contents: Vec<Content>,
    generation_config: GenerationConfigPayload,
}

#[derive(Serialize)]
struct Content {
    role: String,
    parts: Vec<Part>,
}

#[derive(Serialize)]
#[serde(untagged)]
enum Part {
    Text {
        text: String,
    },
    InlineData {
        #[serde(rename = "inlineData")]
        inline_data: InlineDataPayload,
    },
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct InlineDataPayload {
    mime_type: String,
    data: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfigPayload {
    image_config: ImageConfigPayload,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ImageConfigPayload {
    aspect_ratio: String,
}

#[derive(Deserialize)]
struct GenerateContentResponse {
    candidates: Option<Vec<Candidate>>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<ContentResponse>,
}

#[derive(Deserialize)]
struct ContentResponse {
    #[serde(default)]
    parts: Vec<PartResponse>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PartResponse {
    inline_data: Option<InlineDataResponse>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct InlineDataResponse {
    mime_type: Option<String>,
    data: String,
}

#[derive(Deserialize)]
struct ErrorWrapper {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    #[allow(dead_code)]
    code: Option<i32>,
    message: Option<String>,
    status: Option<String>,
}

fn extract_image_response(response: GenerateContentResponse) -> Result<GeneratedImage> {
    let inline = response
        .candidates
        .and_then(|candidates| candidates.into_iter().next())
        .and_then(|candidate| candidate.content)
        .and_then(|content| content.parts.into_iter().find_map(|part| part.inline_data))
        .ok_or_else(|| {
            AparatError::gateway("Gemini API returned no image in the response candidates")
        })?;

    let bytes = BASE64_STANDARD
        .decode(inline.data.as_bytes())
        .map_err(|err| AparatError::gateway(format!("Gemini image payload is not base64: {err}")))?;
    if bytes.is_empty() {
        return Err(AparatError::gateway("Gemini API returned an empty image"));
    }

    let mime_type = inline
        .mime_type
        .filter(|mime| !mime.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_OUTPUT_MIME.to_string());

    Ok(GeneratedImage { bytes, mime_type })
}

fn map_http_error(status: StatusCode, body: String, retry_after: Option<Duration>) -> AparatError {
    let message = serde_json::from_str::<ErrorWrapper>(&body)
        .map(|wrapper| {
            let status_text = wrapper.error.status.unwrap_or_default();
            let msg = wrapper.error.message.unwrap_or_else(|| body.clone());
            if status_text.is_empty() {
                msg
            } else {
                format!("{status_text}: {msg}")
            }
        })
        .unwrap_or_else(|_| body.clone());

    let is_retryable = matches!(
        status,
        StatusCode::TOO_MANY_REQUESTS
            | StatusCode::INTERNAL_SERVER_ERROR
            | StatusCode::BAD_GATEWAY
            | StatusCode::SERVICE_UNAVAILABLE
            | StatusCode::GATEWAY_TIMEOUT
    );

    let mut detail = format!("Gemini API error {}: {}", status.as_u16(), message);
    if is_retryable {
        match retry_after {
            Some(delay) => detail.push_str(&format!(" (retry after {}s)", delay.as_secs())),
            None => detail.push_str(" (retryable)"),
        }
    }
    AparatError::gateway(detail)
}

fn parse_retry_after(header: Option<&HeaderValue>) -> Option<Duration> {
    let value = header?.to_str().ok()?;
    value.trim().parse::<u64>().ok().map(Duration::from_secs)
}
