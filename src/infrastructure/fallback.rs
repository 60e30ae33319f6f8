//! Bundled fallback catalog.
//!
//! A fixed, in-process dataset served verbatim when the remote endpoint is
//! unreachable. The shop stays browsable over being current.

use crate::domain::entities::Product;

/// Returns the bundled fallback products in catalog order.
#[must_use]
pub fn fallback_catalog() -> Vec<Product> {
    vec![
        Product {
            id: "1".to_string(),
            sku: Some("keramik-vase-luna".to_string()),
            title: "Keramik Vase \"Luna\"".to_string(),
            slug: "keramik-vase-luna".to_string(),
            category: "Wohnen".to_string(),
            description: "Handgefertigte Keramikvase in mattem Weiß. Perfekt für \
                          Trockenblumen oder als solitäres Deko-Objekt."
                .to_string(),
            display_price: 49.90,
            sale_price: None,
            stock: 45,
            out_of_stock: false,
            images: vec!["https://picsum.photos/id/106/800/800".to_string()],
            is_new: true,
        },
        Product {
            id: "2".to_string(),
            sku: Some("wollteppich-nordic".to_string()),
            title: "Wollteppich \"Nordic\"".to_string(),
            slug: "wollteppich-nordic".to_string(),
            category: "Textilien".to_string(),
            description: "Weicher Teppich aus 100% nachhaltiger Wolle. Minimalistisches \
                          Muster in Beige und Grau."
                .to_string(),
            display_price: 129.00,
            sale_price: Some(99.00),
            stock: 15,
            out_of_stock: false,
            images: vec!["https://picsum.photos/id/111/800/800".to_string()],
            is_new: false,
        },
        Product {
            id: "3".to_string(),
            sku: Some("leinen-kissen-sand".to_string()),
            title: "Leinen Kissen Sand".to_string(),
            slug: "leinen-kissen-sand".to_string(),
            category: "Textilien".to_string(),
            description: "Kissenbezug aus stonewashed Leinen mit verdecktem \
                          Reißverschluss, Ton Sand."
                .to_string(),
            display_price: 24.90,
            sale_price: None,
            stock: 8,
            out_of_stock: false,
            images: vec!["https://picsum.photos/id/112/800/800".to_string()],
            is_new: false,
        },
        Product {
            id: "4".to_string(),
            sku: Some("eichenholz-brett".to_string()),
            title: "Schneidebrett Eiche".to_string(),
            slug: "eichenholz-brett".to_string(),
            category: "Küche".to_string(),
            description: "Massives Schneidebrett aus geölter Eiche, beidseitig \
                          verwendbar mit Saftrille."
                .to_string(),
            display_price: 39.00,
            sale_price: None,
            stock: 0,
            out_of_stock: true,
            images: vec!["https://picsum.photos/id/113/800/800".to_string()],
            is_new: false,
        },
        Product {
            id: "5".to_string(),
            sku: Some("steingut-tassen-set".to_string()),
            title: "Steingut Tassen 4er-Set".to_string(),
            slug: "steingut-tassen-set".to_string(),
            category: "Küche".to_string(),
            description: "Vier handglasierte Tassen aus Steingut, jede mit leicht \
                          eigener Glasur."
                .to_string(),
            display_price: 34.90,
            sale_price: Some(29.90),
            stock: 22,
            out_of_stock: false,
            images: vec!["https://picsum.photos/id/30/800/800".to_string()],
            is_new: true,
        },
    ]
}
