//! Domain entity definitions.

mod catalog;
mod image;
mod product;

pub use catalog::{CatalogOrigin, CatalogSnapshot};
pub use image::{
    DeliveredImage, DeliveryOrigin, EncodedImage, ImageVariant, STORE_NAMESPACE, VariantKey,
    is_inline,
};
pub use product::{NEW_PRODUCT_WINDOW_DAYS, Product, derive_pricing};
