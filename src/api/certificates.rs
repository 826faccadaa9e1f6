//! Certificate configuration endpoints

use std::path::Path;

use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use serde::de::IgnoredAny;

use super::client::ApiClient;
use super::error::ApiError;
use crate::certificate::CertificateConfig;

/// Response of the template upload
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadedTemplate {
    #[serde(alias = "templateUrl")]
    pub url: String,
}

impl ApiClient {
    /// Fetch a course's certificate configuration (empty if none saved yet)
    pub async fn get_certificate_config(
        &self,
        course_id: &str,
    ) -> Result<CertificateConfig, ApiError> {
        match self.get(&format!("courses/{}/certificate-config", course_id)).await {
            Err(e) if e.is_not_found() => Ok(CertificateConfig::default()),
            other => other,
        }
    }

    /// Save a course's certificate configuration; validate it first
    pub async fn save_certificate_config(
        &self,
        course_id: &str,
        config: &CertificateConfig,
    ) -> Result<(), ApiError> {
        self.put::<_, IgnoredAny>(&format!("courses/{}/certificate-config", course_id), config)
            .await?;
        Ok(())
    }

    /// Upload a template image and return its server URL
    pub async fn upload_certificate_template(
        &self,
        course_id: &str,
        image: &Path,
    ) -> Result<String, ApiError> {
        let bytes = tokio::fs::read(image).await?;
        let file_name = image
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "template".to_string());

        let form = Form::new().part("template", Part::bytes(bytes).file_name(file_name));
        let uploaded: UploadedTemplate = self
            .post_multipart(&format!("courses/{}/certificate-template", course_id), form)
            .await?;
        Ok(uploaded.url)
    }
}
