//! Text-extraction client
//!
//! Sends a label photo to the backend OCR endpoint and returns the extracted
//! text plus the parsed ingredient list, verbatim. Supplies no product
//! metadata; that only exists on the barcode path.

use crate::config::BackendConfig;
use crate::error::AcquisitionError;
use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

/// OCR endpoint path on the backend
const EXTRACT_TEXT_PATH: &str = "/api/ocr/extract-text";

/// Text extraction from a photographed product label
#[async_trait]
pub trait TextExtraction: Send + Sync {
    /// Extract label text and ingredient list from an image payload
    ///
    /// # Errors
    /// `AcquisitionError::ExtractionFailed` on transport error, non-success
    /// response, or a response missing the expected fields.
    async fn extract(&self, image: &[u8]) -> Result<LabelExtraction, AcquisitionError>;
}

/// Successful extraction outcome
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelExtraction {
    /// Raw text read off the label; possibly empty
    pub extracted_text: String,
    /// Ingredient names parsed out of the text; possibly empty
    pub ingredients: Vec<String>,
}

/// HTTP implementation of [`TextExtraction`]
pub struct ExtractionClient {
    http_client: Client,
    base_url: String,
}

impl ExtractionClient {
    /// Create a client against the configured backend
    pub fn new(config: &BackendConfig) -> Self {
        Self {
            http_client: Client::builder()
                .timeout(config.timeout)
                .build()
                .expect("Failed to create HTTP client"),
            base_url: config.base_url.clone(),
        }
    }
}

#[async_trait]
impl TextExtraction for ExtractionClient {
    async fn extract(&self, image: &[u8]) -> Result<LabelExtraction, AcquisitionError> {
        debug!(bytes = image.len(), "Uploading label image for extraction");

        let form = Form::new().part(
            "file",
            Part::bytes(image.to_vec()).file_name("label-image"),
        );

        let response = self
            .http_client
            .post(format!("{}{}", self.base_url, EXTRACT_TEXT_PATH))
            .multipart(form)
            .send()
            .await
            .map_err(|e| {
                AcquisitionError::ExtractionFailed(format!("extraction request failed: {}", e))
            })?;

        if !response.status().is_success() {
            return Err(AcquisitionError::ExtractionFailed(format!(
                "extraction service returned {}",
                response.status()
            )));
        }

        let body: ExtractTextResponse = response.json().await.map_err(|e| {
            AcquisitionError::ExtractionFailed(format!(
                "failed to parse extraction response: {}",
                e
            ))
        })?;

        let extraction = extraction_from_response(body)?;

        debug!(
            ingredients = extraction.ingredients.len(),
            text_len = extraction.extracted_text.len(),
            "Label extraction complete"
        );

        Ok(extraction)
    }
}

/// Validate the wire response and lift it into the domain type
///
/// A body reporting `success: false`, or missing either expected field, is
/// an extraction failure. An empty text or ingredient list is not.
fn extraction_from_response(
    body: ExtractTextResponse,
) -> Result<LabelExtraction, AcquisitionError> {
    if !body.success {
        let message = body
            .message
            .unwrap_or_else(|| "extraction reported failure".to_string());
        return Err(AcquisitionError::ExtractionFailed(message));
    }

    let extracted_text = body.extracted_text.ok_or_else(|| {
        AcquisitionError::ExtractionFailed("response missing extracted_text".to_string())
    })?;
    let ingredients = body.ingredients.ok_or_else(|| {
        AcquisitionError::ExtractionFailed("response missing ingredients".to_string())
    })?;

    Ok(LabelExtraction {
        extracted_text,
        ingredients,
    })
}

// ============================================================================
// Wire Types
// ============================================================================

#[derive(Debug, Deserialize)]
struct ExtractTextResponse {
    #[serde(default = "default_success")]
    success: bool,
    message: Option<String>,
    extracted_text: Option<String>,
    ingredients: Option<Vec<String>>,
}

fn default_success() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn well_formed_response_is_passed_through_verbatim() {
        let body: ExtractTextResponse = serde_json::from_str(
            r#"{
                "success": true,
                "filename": "label.jpg",
                "message": "ok",
                "extracted_text": "Water, Fragrance",
                "ingredients": ["Water", "Fragrance"]
            }"#,
        )
        .expect("parse");

        let extraction = extraction_from_response(body).expect("should succeed");
        assert_eq!(extraction.extracted_text, "Water, Fragrance");
        assert_eq!(extraction.ingredients, vec!["Water", "Fragrance"]);
    }

    #[test]
    fn empty_text_and_list_are_valid() {
        let body: ExtractTextResponse =
            serde_json::from_str(r#"{"extracted_text": "", "ingredients": []}"#).expect("parse");
        let extraction = extraction_from_response(body).expect("should succeed");
        assert!(extraction.extracted_text.is_empty());
        assert!(extraction.ingredients.is_empty());
    }

    #[test]
    fn missing_ingredients_field_is_a_failure() {
        let body: ExtractTextResponse =
            serde_json::from_str(r#"{"extracted_text": "Water"}"#).expect("parse");
        let err = extraction_from_response(body).expect_err("should fail");
        assert!(matches!(err, AcquisitionError::ExtractionFailed(_)));
    }

    #[test]
    fn explicit_unsuccess_carries_the_service_message() {
        let body: ExtractTextResponse = serde_json::from_str(
            r#"{"success": false, "message": "Scan failed"}"#,
        )
        .expect("parse");
        match extraction_from_response(body) {
            Err(AcquisitionError::ExtractionFailed(msg)) => assert_eq!(msg, "Scan failed"),
            other => panic!("expected ExtractionFailed, got {:?}", other),
        }
    }
}
