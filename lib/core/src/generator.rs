//! Description generator collaborator.
//!
//! The generative model is an external black box: given a natural-language
//! prompt, it returns a string. The live variant POSTs to a configured
//! HTTP endpoint; the canned variant returns a deterministic template and
//! backs the mock backend and tests.

use crate::error::{Error, Result};
use crate::record::Record;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Build the generation prompt from product attributes.
#[must_use]
pub fn build_prompt(record: &Record) -> String {
    format!(
        "Generate a creative and engaging product description for: {} by {}. \
         Category: {}. Material: {}. Color: {}. \
         Make it appealing and highlight key features.",
        record.title, record.brand, record.categories, record.material, record.color
    )
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    prompt: &'a str,
}

#[derive(Deserialize)]
struct GenerateResponse {
    generated: String,
}

/// HTTP client for an external text-generation service.
#[derive(Debug, Clone)]
pub struct HttpGenerator {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpGenerator {
    pub fn new(endpoint: String, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::InvalidConfig(e.to_string()))?;
        Ok(Self { client, endpoint })
    }

    async fn generate(&self, prompt: &str) -> Result<String> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(&GenerateRequest { prompt })
            .send()
            .await
            .map_err(|e| Error::Generation(e.to_string()))?
            .error_for_status()
            .map_err(|e| Error::Generation(e.to_string()))?;

        let body: GenerateResponse = response
            .json()
            .await
            .map_err(|e| Error::Generation(e.to_string()))?;
        Ok(body.generated)
    }
}

/// Synchronous-looking black-box call: `generate(prompt) -> string`.
#[derive(Debug, Clone)]
pub enum DescriptionGenerator {
    Http(HttpGenerator),
    Canned,
}

impl DescriptionGenerator {
    pub async fn generate(&self, prompt: &str) -> Result<String> {
        match self {
            Self::Http(generator) => generator.generate(prompt).await,
            Self::Canned => Ok(format!("[generated] {prompt}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_record() -> Record {
        Record {
            id: "p-1".to_string(),
            uniq_id: "p-1".to_string(),
            title: "Red Chair".to_string(),
            brand: "Acme".to_string(),
            categories: "['Furniture']".to_string(),
            material: "Oak".to_string(),
            color: "Red".to_string(),
            price: Some(20.0),
            description: String::new(),
            cluster: None,
        }
    }

    #[test]
    fn test_build_prompt_interpolates_attributes() {
        let prompt = build_prompt(&sample_record());
        assert!(prompt.contains("Red Chair by Acme"));
        assert!(prompt.contains("Material: Oak"));
        assert!(prompt.contains("Color: Red"));
    }

    #[tokio::test]
    async fn test_canned_generation_is_deterministic() {
        let generator = DescriptionGenerator::Canned;
        let prompt = build_prompt(&sample_record());
        let first = generator.generate(&prompt).await.unwrap();
        let second = generator.generate(&prompt).await.unwrap();
        assert_eq!(first, second);
        assert!(first.contains("Red Chair"));
    }

    #[tokio::test]
    async fn test_http_generation_unreachable_endpoint_errors() {
        let generator = HttpGenerator::new(
            "http://127.0.0.1:1/generate".to_string(),
            Duration::from_millis(200),
        )
        .unwrap();
        let result = DescriptionGenerator::Http(generator).generate("prompt").await;
        assert!(matches!(result, Err(Error::Generation(_))));
    }
}
