//! Remote catalog DTOs and their mapping into domain products.
//!
//! The remote schema is read-only input and arrives loosely typed: numeric
//! fields may be strings, prices are minor units, descriptions carry HTML.
//! Coercion treats unparsable or missing numerics as zero rather than failing
//! the whole record.

use std::sync::LazyLock;

use chrono::{DateTime, NaiveDateTime, Utc};
use regex::Regex;
use serde::Deserialize;

use crate::domain::entities::{NEW_PRODUCT_WINDOW_DAYS, Product, derive_pricing};

/// Substitute image reference for records that ship none.
pub const PLACEHOLDER_IMAGE: &str = "https://via.placeholder.com/800x1000?text=No+Image";

/// Price block as shipped by the store API: minor units, often as text.
#[derive(Debug, Default, Deserialize)]
pub struct RemotePrices {
    /// Current price in minor units.
    #[serde(default, deserialize_with = "lenient::minor_units")]
    pub price: f64,
    /// Previous (regular) price in minor units.
    #[serde(default, deserialize_with = "lenient::minor_units")]
    pub regular_price: f64,
}

/// Category entry on a remote record.
#[derive(Debug, Deserialize)]
pub struct RemoteCategory {
    /// Category display name.
    pub name: String,
}

/// Image entry on a remote record.
#[derive(Debug, Deserialize)]
pub struct RemoteImage {
    /// Source URL.
    #[serde(default)]
    pub src: String,
}

/// One product as returned by the remote catalog endpoint.
#[derive(Debug, Deserialize)]
pub struct RemoteProductRecord {
    /// Remote identifier, string or number on the wire.
    #[serde(deserialize_with = "lenient::string")]
    pub id: String,
    /// Display name.
    pub name: String,
    /// Routing slug, when provided.
    #[serde(default)]
    pub slug: Option<String>,
    /// Stock-keeping unit, when provided.
    #[serde(default)]
    pub sku: Option<String>,
    /// Long HTML description.
    #[serde(default)]
    pub description: String,
    /// Short HTML description, preferred when present.
    #[serde(default)]
    pub short_description: String,
    /// Price block.
    #[serde(default)]
    pub prices: RemotePrices,
    /// Category labels; only the first is used.
    #[serde(default)]
    pub categories: Vec<RemoteCategory>,
    /// Ordered image references.
    #[serde(default)]
    pub images: Vec<RemoteImage>,
    /// Units in stock; may be text, missing, or negative.
    #[serde(default, deserialize_with = "lenient::integer")]
    pub stock_quantity: i64,
    /// Creation timestamp (UTC, usually without offset).
    #[serde(default)]
    pub date_created_gmt: Option<String>,
}

impl RemoteProductRecord {
    /// Maps the record into a domain product.
    ///
    /// Pure and deterministic given `now`: pricing and the out-of-stock flag
    /// are derived here on every mapping, never read from source flags.
    #[must_use]
    pub fn into_product(self, now: DateTime<Utc>) -> Product {
        let current = self.prices.price;
        let previous = self.prices.regular_price;
        let (display_price, sale_price) = derive_pricing(current, previous);

        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let stock = self.stock_quantity.clamp(0, i64::from(u32::MAX)) as u32;

        let slug = match self.slug {
            Some(s) if !s.is_empty() => s,
            _ => slug::slugify(&self.name),
        };

        let raw_description = if self.short_description.trim().is_empty() {
            &self.description
        } else {
            &self.short_description
        };

        let is_new = self
            .date_created_gmt
            .as_deref()
            .and_then(parse_remote_timestamp)
            .is_some_and(|created| now - created < chrono::Duration::days(NEW_PRODUCT_WINDOW_DAYS));

        let mut images: Vec<String> = self
            .images
            .into_iter()
            .map(|i| i.src)
            .filter(|src| !src.is_empty())
            .collect();
        if images.is_empty() {
            images.push(PLACEHOLDER_IMAGE.to_string());
        }

        Product {
            id: self.id,
            sku: self.sku.filter(|s| !s.is_empty()),
            title: self.name,
            slug,
            category: self
                .categories
                .into_iter()
                .next()
                .map_or_else(|| "Allgemein".to_string(), |c| c.name),
            description: strip_html(raw_description),
            display_price,
            sale_price,
            stock,
            out_of_stock: stock == 0,
            images,
            is_new,
        }
    }
}

/// Parses the endpoint's timestamp format, with and without offset.
fn parse_remote_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .ok()
        .or_else(|| {
            NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S")
                .map(|naive| naive.and_utc())
                .ok()
        })
}

static TAG_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<[^>]*>").expect("tag pattern compiles"));

/// Reduces an HTML fragment to plain text.
fn strip_html(html: &str) -> String {
    let text = TAG_PATTERN.replace_all(html, "");
    text.replace("&nbsp;", " ")
        .replace("&amp;", "&")
        .trim()
        .to_string()
}

mod lenient {
    //! Deserializers for fields that arrive as strings or numbers.

    use std::fmt;

    use serde::Deserializer;
    use serde::de::{self, Visitor};

    /// Deserializes a minor-unit amount (string or number) into major units.
    /// Unparsable or missing values become zero.
    pub fn minor_units<'de, D>(deserializer: D) -> Result<f64, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct MinorUnitsVisitor;

        impl Visitor<'_> for MinorUnitsVisitor {
            type Value = f64;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("a minor-unit amount as a string or number")
            }

            fn visit_str<E: de::Error>(self, value: &str) -> Result<f64, E> {
                Ok(value.parse::<f64>().unwrap_or(0.0) / 100.0)
            }

            fn visit_u64<E: de::Error>(self, value: u64) -> Result<f64, E> {
                #[allow(clippy::cast_precision_loss)]
                Ok(value as f64 / 100.0)
            }

            fn visit_i64<E: de::Error>(self, value: i64) -> Result<f64, E> {
                #[allow(clippy::cast_precision_loss)]
                Ok(value as f64 / 100.0)
            }

            fn visit_f64<E: de::Error>(self, value: f64) -> Result<f64, E> {
                Ok(value / 100.0)
            }

            fn visit_none<E: de::Error>(self) -> Result<f64, E> {
                Ok(0.0)
            }

            fn visit_unit<E: de::Error>(self) -> Result<f64, E> {
                Ok(0.0)
            }
        }

        deserializer.deserialize_any(MinorUnitsVisitor)
    }

    /// Deserializes an integer that may arrive as text, missing, or null.
    pub fn integer<'de, D>(deserializer: D) -> Result<i64, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct IntegerVisitor;

        impl Visitor<'_> for IntegerVisitor {
            type Value = i64;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("an integer as a string or number")
            }

            fn visit_str<E: de::Error>(self, value: &str) -> Result<i64, E> {
                Ok(value.parse().unwrap_or(0))
            }

            fn visit_u64<E: de::Error>(self, value: u64) -> Result<i64, E> {
                Ok(i64::try_from(value).unwrap_or(i64::MAX))
            }

            fn visit_i64<E: de::Error>(self, value: i64) -> Result<i64, E> {
                Ok(value)
            }

            fn visit_f64<E: de::Error>(self, value: f64) -> Result<i64, E> {
                #[allow(clippy::cast_possible_truncation)]
                Ok(value as i64)
            }

            fn visit_none<E: de::Error>(self) -> Result<i64, E> {
                Ok(0)
            }

            fn visit_unit<E: de::Error>(self) -> Result<i64, E> {
                Ok(0)
            }
        }

        deserializer.deserialize_any(IntegerVisitor)
    }

    /// Deserializes a string that may arrive as a number.
    pub fn string<'de, D>(deserializer: D) -> Result<String, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct StringVisitor;

        impl Visitor<'_> for StringVisitor {
            type Value = String;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("a string or number identifier")
            }

            fn visit_str<E: de::Error>(self, value: &str) -> Result<String, E> {
                Ok(value.to_string())
            }

            fn visit_u64<E: de::Error>(self, value: u64) -> Result<String, E> {
                Ok(value.to_string())
            }

            fn visit_i64<E: de::Error>(self, value: i64) -> Result<String, E> {
                Ok(value.to_string())
            }
        }

        deserializer.deserialize_any(StringVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(json: serde_json::Value) -> RemoteProductRecord {
        serde_json::from_value(json).unwrap()
    }

    #[test]
    fn test_sale_mapping_scenario() {
        let p = record(serde_json::json!({
            "id": 7,
            "name": "Wollteppich Nordic",
            "prices": { "price": "6990", "regular_price": "8900" },
        }))
        .into_product(Utc::now());

        assert!((p.display_price - 89.00).abs() < f64::EPSILON);
        assert_eq!(p.sale_price, Some(69.90));
    }

    #[test]
    fn test_regular_price_without_sale() {
        let p = record(serde_json::json!({
            "id": "8",
            "name": "Vase",
            "prices": { "price": "4990", "regular_price": "4990" },
        }))
        .into_product(Utc::now());

        assert!((p.display_price - 49.90).abs() < f64::EPSILON);
        assert_eq!(p.sale_price, None);
    }

    #[test]
    fn test_unparsable_numerics_become_zero() {
        let p = record(serde_json::json!({
            "id": 1,
            "name": "Broken",
            "prices": { "price": "not a number", "regular_price": null },
            "stock_quantity": "many",
        }))
        .into_product(Utc::now());

        assert!(p.display_price.abs() < f64::EPSILON);
        assert_eq!(p.stock, 0);
        assert!(p.out_of_stock);
    }

    #[test]
    fn test_out_of_stock_derived_from_quantity() {
        let in_stock = record(serde_json::json!({
            "id": 1, "name": "A", "stock_quantity": 3,
        }))
        .into_product(Utc::now());
        assert!(!in_stock.out_of_stock);

        let empty = record(serde_json::json!({
            "id": 2, "name": "B", "stock_quantity": 0,
        }))
        .into_product(Utc::now());
        assert!(empty.out_of_stock);

        let negative = record(serde_json::json!({
            "id": 3, "name": "C", "stock_quantity": -4,
        }))
        .into_product(Utc::now());
        assert_eq!(negative.stock, 0);
        assert!(negative.out_of_stock);
    }

    #[test]
    fn test_stock_accepts_text() {
        let p = record(serde_json::json!({
            "id": 1, "name": "A", "stock_quantity": "12",
        }))
        .into_product(Utc::now());
        assert_eq!(p.stock, 12);
    }

    #[test]
    fn test_slug_falls_back_to_slugified_name() {
        let explicit = record(serde_json::json!({
            "id": 1, "name": "Keramik Vase \"Luna\"", "slug": "keramik-vase-luna",
        }))
        .into_product(Utc::now());
        assert_eq!(explicit.slug, "keramik-vase-luna");

        let derived = record(serde_json::json!({
            "id": 2, "name": "Keramik Vase \"Luna\"",
        }))
        .into_product(Utc::now());
        assert_eq!(derived.slug, "keramik-vase-luna");
    }

    #[test]
    fn test_description_is_stripped_and_short_preferred() {
        let p = record(serde_json::json!({
            "id": 1,
            "name": "A",
            "description": "<p>Long text</p>",
            "short_description": "<p>Weicher <strong>Teppich</strong>&nbsp;aus Wolle.</p>",
        }))
        .into_product(Utc::now());

        assert_eq!(p.description, "Weicher Teppich aus Wolle.");
    }

    #[test]
    fn test_is_new_window() {
        let now = Utc::now();
        let recent = (now - chrono::Duration::days(5))
            .format("%Y-%m-%dT%H:%M:%S")
            .to_string();
        let old = (now - chrono::Duration::days(45))
            .format("%Y-%m-%dT%H:%M:%S")
            .to_string();

        let p = record(serde_json::json!({
            "id": 1, "name": "A", "date_created_gmt": recent,
        }))
        .into_product(now);
        assert!(p.is_new);

        let p = record(serde_json::json!({
            "id": 2, "name": "B", "date_created_gmt": old,
        }))
        .into_product(now);
        assert!(!p.is_new);

        let p = record(serde_json::json!({ "id": 3, "name": "C" })).into_product(now);
        assert!(!p.is_new);
    }

    #[test]
    fn test_missing_images_get_placeholder() {
        let p = record(serde_json::json!({ "id": 1, "name": "A" })).into_product(Utc::now());
        assert_eq!(p.images, vec![PLACEHOLDER_IMAGE.to_string()]);

        let p = record(serde_json::json!({
            "id": 2, "name": "B",
            "images": [{ "src": "https://example.com/1.jpg" }, { "src": "https://example.com/2.jpg" }],
        }))
        .into_product(Utc::now());
        assert_eq!(p.images.len(), 2);
    }

    #[test]
    fn test_category_defaults() {
        let p = record(serde_json::json!({
            "id": 1, "name": "A", "categories": [{ "name": "Wohnen" }, { "name": "Deko" }],
        }))
        .into_product(Utc::now());
        assert_eq!(p.category, "Wohnen");

        let p = record(serde_json::json!({ "id": 2, "name": "B" })).into_product(Utc::now());
        assert_eq!(p.category, "Allgemein");
    }
}
