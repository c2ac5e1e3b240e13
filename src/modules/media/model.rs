use serde::Deserialize;
use validator::Validate;

#[derive(Debug, Clone)]
pub struct UploadConfig {
    pub max_file_size: usize,
    pub max_files: usize,
    pub allowed_mime_types: Vec<String>,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            max_file_size: 10 * 1024 * 1024, // 10MB
            max_files: 20,
            allowed_mime_types: vec![
                "image/jpeg".to_string(),
                "image/png".to_string(),
                "image/gif".to_string(),
                "image/webp".to_string(),
            ],
        }
    }
}

/// One file field read from a multipart upload.
#[derive(Debug, Clone)]
pub struct IncomingImage {
    pub original_filename: String,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct PhotoArrangement {
    #[validate(length(min = 1))]
    pub filename: String,
    #[validate(length(max = 300))]
    #[serde(default)]
    pub alt_text: String,
    pub order: i32,
}

#[derive(Debug, Deserialize, Validate)]
pub struct ArrangePhotosModel {
    #[validate(nested)]
    pub photos: Vec<PhotoArrangement>,
}
