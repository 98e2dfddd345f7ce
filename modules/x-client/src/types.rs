use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize)]
pub struct MediaUploadResponse {
    pub media_id_string: String,
    #[serde(default)]
    pub size: Option<u64>,
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct CreatePostRequest<'a> {
    pub text: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub media: Option<PostMedia<'a>>,
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct PostMedia<'a> {
    pub media_ids: Vec<&'a str>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct CreatePostResponse {
    #[serde(default)]
    pub data: Option<CreatedPost>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreatedPost {
    pub id: String,
    #[serde(default)]
    pub text: String,
}

impl CreatedPost {
    pub fn url(&self) -> String {
        format!("https://twitter.com/i/web/status/{}", self.id)
    }
}
