//! Ingredient-source resolver
//!
//! Converts the user's input into a canonical acquisition result by
//! delegating to exactly one of the two acquisition strategies. Stateless:
//! nothing is retained between calls.

use crate::clients::{CatalogLookup, TextExtraction};
use crate::error::AcquisitionError;
use crate::models::{AcquisitionResult, ScanInput};
use std::sync::Arc;

/// Dispatches a scan input to the matching acquisition strategy
pub struct SourceResolver {
    extraction: Arc<dyn TextExtraction>,
    catalog: Arc<dyn CatalogLookup>,
}

impl SourceResolver {
    pub fn new(extraction: Arc<dyn TextExtraction>, catalog: Arc<dyn CatalogLookup>) -> Self {
        Self {
            extraction,
            catalog,
        }
    }

    /// Resolve an input to extracted text, ingredient list, and (barcode
    /// path only) product metadata
    ///
    /// # Errors
    /// Propagates the strategy's `AcquisitionError` unchanged so the caller
    /// can distinguish a missing catalog entry from a transport fault.
    pub async fn resolve(&self, input: &ScanInput) -> Result<AcquisitionResult, AcquisitionError> {
        match input {
            ScanInput::Image(image) => {
                let extraction = self.extraction.extract(image).await?;
                Ok(AcquisitionResult {
                    extracted_text: extraction.extracted_text,
                    ingredients: extraction.ingredients,
                    product_metadata: None,
                })
            }
            ScanInput::Barcode(barcode) => {
                let matched = self.catalog.lookup(barcode).await?;
                Ok(AcquisitionResult {
                    extracted_text: matched.ingredients_text,
                    ingredients: matched.ingredients_list,
                    product_metadata: Some(matched.metadata),
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clients::{CatalogMatch, LabelExtraction};
    use crate::models::ProductMetadata;
    use async_trait::async_trait;

    struct FixedExtraction(Result<LabelExtraction, AcquisitionError>);

    #[async_trait]
    impl TextExtraction for FixedExtraction {
        async fn extract(&self, _image: &[u8]) -> Result<LabelExtraction, AcquisitionError> {
            self.0.clone()
        }
    }

    struct FixedCatalog(Result<CatalogMatch, AcquisitionError>);

    #[async_trait]
    impl CatalogLookup for FixedCatalog {
        async fn lookup(&self, _barcode: &str) -> Result<CatalogMatch, AcquisitionError> {
            self.0.clone()
        }
    }

    fn resolver(
        extraction: Result<LabelExtraction, AcquisitionError>,
        catalog: Result<CatalogMatch, AcquisitionError>,
    ) -> SourceResolver {
        SourceResolver::new(
            Arc::new(FixedExtraction(extraction)),
            Arc::new(FixedCatalog(catalog)),
        )
    }

    fn unused_catalog() -> Result<CatalogMatch, AcquisitionError> {
        Err(AcquisitionError::ExtractionFailed("unused".into()))
    }

    fn unused_extraction() -> Result<LabelExtraction, AcquisitionError> {
        Err(AcquisitionError::ExtractionFailed("unused".into()))
    }

    #[tokio::test]
    async fn image_path_never_supplies_metadata() {
        let resolver = resolver(
            Ok(LabelExtraction {
                extracted_text: "Water, Fragrance".into(),
                ingredients: vec!["Water".into(), "Fragrance".into()],
            }),
            unused_catalog(),
        );

        let result = resolver
            .resolve(&ScanInput::Image(vec![1, 2, 3]))
            .await
            .expect("resolves");
        assert_eq!(result.extracted_text, "Water, Fragrance");
        assert_eq!(result.ingredients.len(), 2);
        assert!(result.product_metadata.is_none());
    }

    #[tokio::test]
    async fn barcode_match_carries_metadata() {
        let resolver = resolver(
            unused_extraction(),
            Ok(CatalogMatch {
                ingredients_text: "Aqua".into(),
                ingredients_list: vec!["Aqua".into()],
                metadata: ProductMetadata {
                    name: Some("Hydra Cream".into()),
                    brand: Some("Nivea".into()),
                    source: Some("Open Beauty Facts".into()),
                },
            }),
        );

        let result = resolver
            .resolve(&ScanInput::Barcode("4005900001504".into()))
            .await
            .expect("resolves");
        let metadata = result.product_metadata.expect("metadata present");
        assert_eq!(metadata.name.as_deref(), Some("Hydra Cream"));
        assert_eq!(result.ingredients, vec!["Aqua"]);
    }

    #[tokio::test]
    async fn barcode_match_with_no_ingredients_is_still_a_match() {
        let resolver = resolver(
            unused_extraction(),
            Ok(CatalogMatch {
                ingredients_text: String::new(),
                ingredients_list: vec![],
                metadata: ProductMetadata {
                    name: Some("Mystery Soap".into()),
                    brand: None,
                    source: None,
                },
            }),
        );

        let result = resolver
            .resolve(&ScanInput::Barcode("123".into()))
            .await
            .expect("resolves");
        assert!(result.ingredients.is_empty());
        assert!(result.product_metadata.is_some());
    }

    #[tokio::test]
    async fn not_found_propagates_unchanged() {
        let resolver = resolver(
            unused_extraction(),
            Err(AcquisitionError::NotFound("999".into())),
        );

        let err = resolver
            .resolve(&ScanInput::Barcode("999".into()))
            .await
            .expect_err("fails");
        assert_eq!(err, AcquisitionError::NotFound("999".into()));
    }
}
