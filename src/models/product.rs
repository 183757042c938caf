use serde::{Deserialize, Serialize};

pub const PLACEHOLDER_IMAGE: &str = "img/product-1.png";

/// A catalog entry as stored in the static products JSON file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub brand: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    /// Filled from the enclosing category key when the record omits it
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub price: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_price: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discount: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<String>,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub review_count: Option<u32>,
    #[serde(default)]
    pub in_stock: bool,
    #[serde(default)]
    pub is_new: bool,
    #[serde(default)]
    pub is_featured: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub storage: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub short_description: Option<String>,
    /// ISO-8601 date or timestamp
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

impl Product {
    /// Display image: thumbnail, then first gallery image, then the placeholder.
    pub fn image(&self) -> &str {
        self.thumbnail
            .as_deref()
            .or_else(|| self.images.first().map(String::as_str))
            .unwrap_or(PLACEHOLDER_IMAGE)
    }

    pub fn rating_or_zero(&self) -> f64 {
        self.rating.unwrap_or(0.0)
    }

    /// Unix timestamp of `created_at`; 0 when absent or unparseable.
    pub fn created_at_timestamp(&self) -> i64 {
        let Some(raw) = self.created_at.as_deref() else {
            return 0;
        };
        chrono::DateTime::parse_from_rfc3339(raw)
            .map(|dt| dt.timestamp())
            .or_else(|_| {
                chrono::NaiveDate::parse_from_str(raw, "%Y-%m-%d").map(|d| {
                    d.and_hms_opt(0, 0, 0)
                        .map(|dt| dt.and_utc().timestamp())
                        .unwrap_or(0)
                })
            })
            .unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_camel_case_record() {
        let product: Product = serde_json::from_str(
            r#"{"id":"iphone-15","title":"iPhone 15 Pro 128GB","brand":"Apple","price":1229,
                "originalPrice":1299,"inStock":true,"isFeatured":true,"reviewCount":124,"storage":"128 GB"}"#,
        )
        .unwrap();

        assert_eq!(product.original_price, Some(1299.0));
        assert!(product.in_stock);
        assert!(product.is_featured);
        assert!(!product.is_new);
        assert_eq!(product.review_count, Some(124));
        assert_eq!(product.category, "");
    }

    #[test]
    fn test_image_fallbacks() {
        let mut product: Product =
            serde_json::from_str(r#"{"id":"a","title":"A","images":["img/a.png"]}"#).unwrap();
        assert_eq!(product.image(), "img/a.png");

        product.thumbnail = Some("img/thumb.png".into());
        assert_eq!(product.image(), "img/thumb.png");

        product.thumbnail = None;
        product.images.clear();
        assert_eq!(product.image(), PLACEHOLDER_IMAGE);
    }

    #[test]
    fn test_created_at_formats() {
        let mut product: Product = serde_json::from_str(r#"{"id":"a","title":"A"}"#).unwrap();
        assert_eq!(product.created_at_timestamp(), 0);

        product.created_at = Some("2024-01-15".into());
        let date_only = product.created_at_timestamp();
        product.created_at = Some("2024-01-15T00:00:00Z".into());
        assert_eq!(product.created_at_timestamp(), date_only);
        assert!(date_only > 0);
    }
}
