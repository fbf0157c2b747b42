use std::io::Cursor;
use std::sync::Arc;

use image::{DynamicImage, ImageFormat};
use serde_json::Value;
use thiserror::Error;
use tracing::warn;

use crate::inference::{InferenceClient, InferenceRequest};
use crate::models::{DocumentCategory, PageRecord};
use crate::pipeline::dates;
use crate::pipeline::parse::parse_json_object;
use crate::pipeline::schema::{self, DATE_FIELDS};

const EXTRACTION_MAX_TOKENS: u32 = 2000;

#[derive(Debug, Error)]
enum ExtractError {
    #[error(transparent)]
    Inference(#[from] crate::error::InferenceError),

    #[error("failed to encode page image: {0}")]
    Encode(#[from] image::ImageError),

    #[error("unparseable model reply: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Extracts one page's fields through the inference service, constrained to
/// the category schema.
pub struct PageExtractor {
    client: Arc<dyn InferenceClient>,
    model: String,
}

impl PageExtractor {
    pub fn new(client: Arc<dyn InferenceClient>, model: impl Into<String>) -> Self {
        Self {
            client,
            model: model.into(),
        }
    }

    /// Never fails: any inference, encoding, or parse problem degrades the
    /// page to the category's default schema. One bad page must not abort
    /// the batch.
    pub async fn extract(&self, image: &DynamicImage, category: DocumentCategory) -> PageRecord {
        match self.try_extract(image, category).await {
            Ok(record) => record,
            Err(error) => {
                warn!(
                    category = %category,
                    error = %error,
                    "page extraction degraded to schema defaults"
                );
                schema::schema_for(category)
            }
        }
    }

    async fn try_extract(
        &self,
        image: &DynamicImage,
        category: DocumentCategory,
    ) -> Result<PageRecord, ExtractError> {
        let defaults = schema::schema_for(category);
        let prompt = extraction_prompt(category, &defaults);
        let png = encode_png(image)?;

        let reply = self
            .client
            .complete(InferenceRequest {
                model: &self.model,
                prompt: &prompt,
                image_png: Some(&png),
                max_tokens: EXTRACTION_MAX_TOKENS,
            })
            .await?;

        let mut record = parse_json_object(&reply)?;

        // Every schema key must be present afterwards; unknown keys from the
        // model are kept as-is.
        for (field, default) in defaults {
            record.entry(field).or_insert(default);
        }

        for field in DATE_FIELDS {
            if let Some(value) = record.get_mut(field) {
                let normalized = value.as_str().map(dates::normalize).unwrap_or_default();
                *value = Value::String(normalized);
            }
        }

        Ok(record)
    }
}

fn extraction_prompt(category: DocumentCategory, defaults: &schema::Schema) -> String {
    format!(
        "Analyze the image of a '{category}' and extract information into this exact JSON format.\n\
         Ensure all date fields are formatted as dd/mm/yyyy.\n\
         If a value is missing, not found, or ambiguous, return an empty string \"\" or an empty \
         list [] as appropriate. Do not guess or fabricate information. Do not add explanations \
         or markdown.\n\
         Schema: {}",
        Value::Object(defaults.clone())
    )
}

fn encode_png(image: &DynamicImage) -> Result<Vec<u8>, image::ImageError> {
    let mut buffer = Vec::new();
    image.write_to(&mut Cursor::new(&mut buffer), ImageFormat::Png)?;
    Ok(buffer)
}
