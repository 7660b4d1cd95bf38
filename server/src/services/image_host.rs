//! External image host client
//!
//! Product images are not stored locally; validated uploads are forwarded
//! to an ImgBB-compatible hosting API and only the returned URL is kept.

use base64::Engine;
use serde::Deserialize;

use crate::utils::AppError;

const DEFAULT_ENDPOINT: &str = "https://api.imgbb.com/1/upload";
const UPLOAD_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Deserialize)]
struct HostResponse {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    data: Option<HostData>,
}

#[derive(Debug, Deserialize)]
struct HostData {
    url: String,
}

#[derive(Clone)]
pub struct ImageHostClient {
    http: reqwest::Client,
    endpoint: String,
    api_key: String,
}

impl ImageHostClient {
    pub fn new(api_key: String, endpoint: Option<String>) -> Self {
        let http = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(UPLOAD_TIMEOUT_SECS))
            .build()
            .unwrap_or_default();
        Self {
            http,
            endpoint: endpoint.unwrap_or_else(|| DEFAULT_ENDPOINT.to_string()),
            api_key,
        }
    }

    pub fn is_configured(&self) -> bool {
        !self.api_key.is_empty()
    }

    /// Upload JPEG bytes, return the hosted URL.
    pub async fn upload(&self, jpeg: &[u8]) -> Result<String, AppError> {
        if !self.is_configured() {
            return Err(AppError::internal("Image host API key not configured"));
        }

        let payload = base64::engine::general_purpose::STANDARD.encode(jpeg);
        let form = [("image", payload)];

        let response = self
            .http
            .post(&self.endpoint)
            .query(&[("key", self.api_key.as_str())])
            .form(&form)
            .send()
            .await
            .map_err(|e| AppError::internal(format!("Image host request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(AppError::internal(format!(
                "Image host returned status {status}"
            )));
        }

        let body: HostResponse = response
            .json()
            .await
            .map_err(|e| AppError::internal(format!("Invalid image host response: {e}")))?;

        match body.data {
            Some(data) if body.success => Ok(data.url),
            _ => Err(AppError::internal("Image host rejected the upload")),
        }
    }
}
