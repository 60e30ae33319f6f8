//! Product entity and pricing/stock derivation rules.

/// Days after creation during which a product carries the "new" badge.
pub const NEW_PRODUCT_WINDOW_DAYS: i64 = 30;

/// A catalog product as consumed by the presentation layer.
///
/// Instances are created by mapping a remote record (or taken verbatim from
/// the bundled fallback dataset) and are immutable afterwards; a fresh fetch
/// supersedes the whole list rather than mutating entries.
#[derive(Debug, Clone, PartialEq)]
pub struct Product {
    /// Remote identifier.
    pub id: String,
    /// Optional stock-keeping unit.
    pub sku: Option<String>,
    /// Display name.
    pub title: String,
    /// Routing key.
    pub slug: String,
    /// Category label.
    pub category: String,
    /// Plain-text description.
    pub description: String,
    /// Canonical display price. When a sale is active this is the struck-out
    /// previous price.
    pub display_price: f64,
    /// Active sale price, present only when it undercuts the display price.
    pub sale_price: Option<f64>,
    /// Units in stock.
    pub stock: u32,
    /// Derived from `stock` on every mapping, never taken from source flags.
    pub out_of_stock: bool,
    /// Ordered image references.
    pub images: Vec<String>,
    /// Whether the product was created within the "new" window.
    pub is_new: bool,
}

impl Product {
    /// Returns the price a buyer actually pays.
    #[must_use]
    pub fn effective_price(&self) -> f64 {
        self.sale_price.unwrap_or(self.display_price)
    }

    /// Returns the first image reference, if any.
    #[must_use]
    pub fn primary_image(&self) -> Option<&str> {
        self.images.first().map(String::as_str)
    }

    /// Returns true if `key` equals the identifier, slug, or SKU.
    #[must_use]
    pub fn matches_key(&self, key: &str) -> bool {
        self.id == key || self.slug == key || self.sku.as_deref() == Some(key)
    }
}

/// Derives the `(display_price, sale_price)` pair from a remote record's
/// current and previous price.
///
/// A previous price above the current one marks a sale: the previous price is
/// displayed (struck out) and the current one becomes the sale price. In every
/// other case the current price is displayed and no sale is active.
#[must_use]
pub fn derive_pricing(current: f64, previous: f64) -> (f64, Option<f64>) {
    if previous > current {
        (previous, Some(current))
    } else {
        (current, None)
    }
}
