//! Barcode catalog client
//!
//! Looks a barcode up in the product catalog. "No match" is an expected
//! outcome reported as `AcquisitionError::NotFound` so callers can suggest
//! the image path instead of showing a generic error.

use crate::config::BackendConfig;
use crate::error::AcquisitionError;
use crate::models::ProductMetadata;
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

/// Catalog lookup endpoint path; the barcode is appended
const CATALOG_LOOKUP_PATH: &str = "/api/beauty/lookup";

/// Barcode lookup against the product catalog
#[async_trait]
pub trait CatalogLookup: Send + Sync {
    /// Resolve a barcode to catalog ingredient data and product metadata
    ///
    /// # Errors
    /// - `AcquisitionError::NotFound` when the catalog has no entry for the
    ///   barcode (a normal outcome, not a fault)
    /// - `AcquisitionError::ExtractionFailed` on transport error or a
    ///   malformed response
    async fn lookup(&self, barcode: &str) -> Result<CatalogMatch, AcquisitionError>;
}

/// A matched catalog entry
///
/// The catalog may omit ingredient text or the parsed list on a match;
/// both default to empty rather than failing the lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogMatch {
    /// Raw ingredient text as listed in the catalog; possibly empty
    pub ingredients_text: String,
    /// Parsed ingredient names; possibly empty
    pub ingredients_list: Vec<String>,
    /// Product identity from the catalog entry
    pub metadata: ProductMetadata,
}

/// HTTP implementation of [`CatalogLookup`]
pub struct CatalogClient {
    http_client: Client,
    base_url: String,
}

impl CatalogClient {
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
impl CatalogLookup for CatalogClient {
    async fn lookup(&self, barcode: &str) -> Result<CatalogMatch, AcquisitionError> {
        debug!(barcode = %barcode, "Looking up barcode in catalog");

        let response = self
            .http_client
            .get(format!(
                "{}{}/{}",
                self.base_url, CATALOG_LOOKUP_PATH, barcode
            ))
            .send()
            .await
            .map_err(|e| {
                AcquisitionError::ExtractionFailed(format!("catalog request failed: {}", e))
            })?;

        if !response.status().is_success() {
            return Err(AcquisitionError::ExtractionFailed(format!(
                "catalog service returned {}",
                response.status()
            )));
        }

        let body: CatalogLookupResponse = response.json().await.map_err(|e| {
            AcquisitionError::ExtractionFailed(format!("failed to parse catalog response: {}", e))
        })?;

        let matched = match_from_response(barcode, body)?;

        debug!(
            barcode = %barcode,
            product = ?matched.metadata.name,
            ingredients = matched.ingredients_list.len(),
            "Catalog lookup matched"
        );

        Ok(matched)
    }
}

/// Lift the wire response into a domain match, or `NotFound`
fn match_from_response(
    barcode: &str,
    body: CatalogLookupResponse,
) -> Result<CatalogMatch, AcquisitionError> {
    if !body.success {
        return Err(AcquisitionError::NotFound(barcode.to_string()));
    }

    Ok(CatalogMatch {
        ingredients_text: body.ingredients_text.unwrap_or_default(),
        ingredients_list: body.ingredients_list.unwrap_or_default(),
        metadata: ProductMetadata {
            name: body.product_name,
            brand: body.brands,
            source: body.source,
        },
    })
}

// ============================================================================
// Wire Types
// ============================================================================

#[derive(Debug, Deserialize)]
struct CatalogLookupResponse {
    #[serde(default)]
    success: bool,
    product_name: Option<String>,
    brands: Option<String>,
    source: Option<String>,
    ingredients_text: Option<String>,
    ingredients_list: Option<Vec<String>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matched_entry_carries_metadata_and_ingredients() {
        let body: CatalogLookupResponse = serde_json::from_str(
            r#"{
                "success": true,
                "product_name": "Hydra Cream",
                "brands": "Nivea",
                "source": "Open Beauty Facts",
                "ingredients_text": "Aqua, Glycerin",
                "ingredients_list": ["Aqua", "Glycerin"]
            }"#,
        )
        .expect("parse");

        let matched = match_from_response("4005900001504", body).expect("should match");
        assert_eq!(matched.metadata.name.as_deref(), Some("Hydra Cream"));
        assert_eq!(matched.metadata.brand.as_deref(), Some("Nivea"));
        assert_eq!(matched.metadata.source.as_deref(), Some("Open Beauty Facts"));
        assert_eq!(matched.ingredients_text, "Aqua, Glycerin");
        assert_eq!(matched.ingredients_list, vec!["Aqua", "Glycerin"]);
    }

    #[test]
    fn unmatched_barcode_is_not_found_with_the_barcode() {
        let body: CatalogLookupResponse =
            serde_json::from_str(r#"{"success": false}"#).expect("parse");
        match match_from_response("0000000000000", body) {
            Err(AcquisitionError::NotFound(code)) => assert_eq!(code, "0000000000000"),
            other => panic!("expected NotFound, got {:?}", other),
        }
    }

    #[test]
    fn match_without_ingredient_data_yields_empty_sequences() {
        let body: CatalogLookupResponse = serde_json::from_str(
            r#"{"success": true, "product_name": "Mystery Soap"}"#,
        )
        .expect("parse");

        let matched = match_from_response("123", body).expect("still a match");
        assert!(matched.ingredients_text.is_empty());
        assert!(matched.ingredients_list.is_empty());
        assert_eq!(matched.metadata.name.as_deref(), Some("Mystery Soap"));
        assert_eq!(matched.metadata.brand, None);
    }

    #[test]
    fn missing_success_field_defaults_to_no_match() {
        let body: CatalogLookupResponse = serde_json::from_str(r#"{}"#).expect("parse");
        assert!(matches!(
            match_from_response("42", body),
            Err(AcquisitionError::NotFound(_))
        ));
    }
}
