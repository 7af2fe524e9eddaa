use std::path::Path;
use std::time::Duration;

use anyhow::{anyhow, bail, Context, Result};
use reqwest::blocking::{Client, RequestBuilder};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use spdlog::{debug, info};

use crate::config::Instagram;
use crate::instagram::credentials::Credentials;
use crate::instagram::{InstagramApi, MediaInfo};

const MEDIA_FIELDS: &str = "id,caption,permalink,like_count,comments_count";

#[derive(Deserialize)]
struct IdResponse {
    id: String,
}

#[derive(Deserialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Deserialize)]
struct ErrorDetail {
    message: String,
    #[serde(default)]
    code: Option<i64>,
}

/// Message of a Graph API error body, or the raw body when it is not one.
pub fn error_message(body: &str) -> String {
    match serde_json::from_str::<ErrorBody>(body) {
        Ok(ErrorBody { error }) => match error.code {
            Some(code) => format!("{} (code {})", error.message, code),
            None => error.message,
        },
        Err(_) => body.trim().to_string(),
    }
}

/// Public URL of an uploaded image: the API fetches images itself, so they must be
/// reachable under `base_url`.
pub fn public_image_url(base_url: &str, image: &Path) -> Result<String> {
    let file_name = image.file_name()
        .and_then(|f| f.to_str())
        .ok_or_else(|| anyhow!("Invalid image path {}", image.display()))?;
    Ok(format!("{}/{}", base_url.trim_end_matches('/'), file_name))
}

/// Instagram Graph API client (content publishing + media lookups).
pub struct GraphClient {
    http: Client,
    api_base: String,
    public_image_base_url: Option<String>,
    credentials: Credentials,
}

impl GraphClient {
    pub fn new(settings: &Instagram, credentials: Credentials) -> Result<GraphClient> {
        let http = Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()
            .context("Error building HTTP client")?;

        Ok(GraphClient {
            http,
            api_base: settings.api_base.trim_end_matches('/').to_string(),
            public_image_base_url: settings.public_image_base_url.clone(),
            credentials,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.api_base, path)
    }

    fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<Option<T>> {
        let response = request.send().context("Error calling the Graph API")?;
        let status = response.status();
        let body = response.text().context("Error reading Graph API response")?;

        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !status.is_success() {
            bail!("Graph API returned {}: {}", status, error_message(&body));
        }

        let parsed = serde_json::from_str::<T>(&body)
            .with_context(|| format!("Unexpected Graph API response: {}", body))?;
        Ok(Some(parsed))
    }

    fn post_for_id(&self, path: &str, params: &[(&str, &str)]) -> Result<String> {
        let request = self.http.post(self.url(path))
            .query(&[("access_token", self.credentials.access_token.as_str())])
            .form(params);
        match self.send::<IdResponse>(request)? {
            Some(res) => Ok(res.id),
            None => bail!("Graph API endpoint {} not found", path),
        }
    }
}

impl InstagramApi for GraphClient {
    fn publish_photo(&self, image: &Path, caption: &str) -> Result<String> {
        let Some(ref base_url) = self.public_image_base_url else {
            bail!("instagram.public_image_base_url is not configured, images can't be published");
        };
        let image_url = public_image_url(base_url, image)?;
        let user_id = self.credentials.user_id.as_str();

        debug!("Creating media container for {}", image_url);
        let container_id = self.post_for_id(&format!("{}/media", user_id), &[
            ("image_url", image_url.as_str()),
            ("caption", caption),
        ])?;

        let post_id = self.post_for_id(&format!("{}/media_publish", user_id), &[
            ("creation_id", container_id.as_str()),
        ])?;
        info!("Media container {} published as {}", container_id, post_id);

        Ok(post_id)
    }

    fn media_info(&self, media_id: &str) -> Result<Option<MediaInfo>> {
        let request = self.http.get(self.url(media_id))
            .query(&[
                ("fields", MEDIA_FIELDS),
                ("access_token", self.credentials.access_token.as_str()),
            ]);
        self.send::<MediaInfo>(request)
    }

    fn health(&self) -> Result<()> {
        let request = self.http.get(self.url(&self.credentials.user_id))
            .query(&[
                ("fields", "id"),
                ("access_token", self.credentials.access_token.as_str()),
            ]);
        match self.send::<IdResponse>(request)? {
            Some(_) => Ok(()),
            None => bail!("Instagram account {} not found", self.credentials.user_id),
        }
    }
}
