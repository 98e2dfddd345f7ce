pub mod error;
pub mod oauth;
pub mod types;

pub use error::{Result, XError};
pub use oauth::Credentials;
pub use types::{CreatedPost, MediaUploadResponse};

use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use reqwest::multipart::{Form, Part};
use types::{CreatePostRequest, CreatePostResponse, PostMedia};

const API_URL: &str = "https://api.twitter.com";
const UPLOAD_URL: &str = "https://upload.twitter.com";

pub struct XClient {
    client: reqwest::Client,
    credentials: Credentials,
}

impl XClient {
    pub fn new(credentials: Credentials) -> Self {
        Self {
            client: reqwest::Client::new(),
            credentials,
        }
    }

    /// Upload an image through the v1.1 media endpoint. Returns the media id
    /// to attach to a post.
    pub async fn upload_media(&self, bytes: &[u8], file_name: &str) -> Result<String> {
        let url = format!("{UPLOAD_URL}/1.1/media/upload.json");
        let auth = self.credentials.authorization("POST", &url, &[]);

        let part = Part::bytes(bytes.to_vec()).file_name(file_name.to_string());
        let form = Form::new().part("media", part);

        tracing::debug!(bytes = bytes.len(), "Uploading media to X");

        let resp = self
            .client
            .post(&url)
            .header(AUTHORIZATION, auth)
            .multipart(form)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(XError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        let upload: MediaUploadResponse = resp.json().await?;
        if upload.media_id_string.is_empty() {
            return Err(XError::NoConfirmation("media upload returned no media id"));
        }

        tracing::info!(media_id = %upload.media_id_string, "Media uploaded");
        Ok(upload.media_id_string)
    }

    /// Create a post through the v2 API, optionally attaching uploaded media.
    pub async fn create_post(&self, text: &str, media_ids: &[&str]) -> Result<CreatedPost> {
        let url = format!("{API_URL}/2/tweets");
        let auth = self.credentials.authorization("POST", &url, &[]);

        let request = CreatePostRequest {
            text,
            media: (!media_ids.is_empty()).then(|| PostMedia {
                media_ids: media_ids.to_vec(),
            }),
        };

        let resp = self
            .client
            .post(&url)
            .header(AUTHORIZATION, auth)
            .header(CONTENT_TYPE, "application/json")
            .json(&request)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(XError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        let created: CreatePostResponse = resp.json().await?;
        let post = created
            .data
            .ok_or(XError::NoConfirmation("post creation returned no data"))?;

        tracing::info!(post_id = %post.id, url = %post.url(), "Post created");
        Ok(post)
    }

    /// Upload `image` and publish `text` with it attached.
    pub async fn post_with_image(
        &self,
        text: &str,
        image: &[u8],
        file_name: &str,
    ) -> Result<CreatedPost> {
        let media_id = self.upload_media(image, file_name).await?;
        self.create_post(text, &[media_id.as_str()]).await
    }
}
