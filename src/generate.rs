//! Static HTML rendering of the catalog.
//!
//! Stage 3 of the catalog pipeline. Reads `catalogo.json` and writes a single
//! `index.html` next to it.
//!
//! ## Page layout
//!
//! - **Filter bar**: one anchor per category, in first-appearance order, plus
//!   a "Todos" link back to the top. Anchors target `#cat-<category>` with
//!   spaces replaced by `-`.
//! - **Category sections**: one `<section>` per category holding its product
//!   cards.
//! - **Product card**: cover image, remaining images as a strip, name, price
//!   with `.` thousands separators, optional shipping note, description, and
//!   an optional WhatsApp inquiry link.
//!
//! The page has no JavaScript. Image paths from the catalog are used as-is,
//! so the page expects to sit in the directory the catalog paths are relative
//! to.
//!
//! ## HTML Generation
//!
//! Uses [maud](https://maud.lambda.xyz/) for compile-time HTML templating.
//! All catalog text is escaped by maud.

use crate::catalog::{self, CatalogError};
use crate::config::SiteConfig;
use crate::types::ProductRecord;
use maud::{DOCTYPE, Markup, PreEscaped, html};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum GenerateError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),
}

const CSS: &str = include_str!("../static/style.css");

/// Name of the rendered page inside the output directory.
pub const INDEX_FILENAME: &str = "index.html";

/// Render `catalog_path` into `output_dir/index.html`. Returns the page path.
pub fn generate(
    catalog_path: &Path,
    output_dir: &Path,
    site: &SiteConfig,
) -> Result<PathBuf, GenerateError> {
    let records = catalog::read_catalog(catalog_path)?;
    fs::create_dir_all(output_dir)?;

    let page = output_dir.join(INDEX_FILENAME);
    fs::write(&page, render_catalog(&records, site).into_string())?;
    tracing::info!(products = records.len(), page = %page.display(), "page rendered");
    Ok(page)
}

/// Render the full catalog page.
pub fn render_catalog(records: &[ProductRecord], site: &SiteConfig) -> Markup {
    let groups = group_by_category(records);

    let content = html! {
        header.site-header {
            h1 { (site.title) }
            nav.filter-bar {
                a.filter href="#" { "Todos" }
                @for (category, _) in &groups {
                    a.filter href={ "#" (category_anchor(category)) } { (category_label(category)) }
                }
            }
        }
        main {
            @if groups.is_empty() {
                p.empty-catalog { "No hay productos disponibles." }
            }
            @for (category, products) in &groups {
                section.category id=(category_anchor(category)) {
                    h2 { (category_label(category)) }
                    div.product-grid {
                        @for product in products {
                            (render_product(product, site))
                        }
                    }
                }
            }
        }
    };

    base_document(&site.title, CSS, content)
}

fn render_product(product: &ProductRecord, site: &SiteConfig) -> Markup {
    let (cover, rest) = match product.images.split_first() {
        Some((cover, rest)) => (Some(cover), rest),
        None => (None, &[][..]),
    };

    html! {
        article.product {
            @if let Some(src) = cover {
                img.product-cover src=(src) alt=(product.name) loading="lazy";
            }
            @if !rest.is_empty() {
                div.product-strip {
                    @for src in rest {
                        img src=(src) alt=(product.name) loading="lazy";
                    }
                }
            }
            h3.product-name { (product.name) }
            p.product-price { (format_price(product.price, &site.currency_symbol)) }
            @if let Some(shipping) = &site.shipping {
                p.product-shipping {
                    @match shipping.cost_for(product.price) {
                        0 => { "Envío gratis" }
                        fee => { "Envío: " (format_price(fee, &site.currency_symbol)) }
                    }
                }
            }
            p.product-description { (product.description) }
            @if let Some(phone) = &site.whatsapp_phone {
                a.product-whatsapp
                    href=(whatsapp_link(phone, &site.whatsapp_message, &product.name))
                    target="_blank" rel="noopener" {
                    "Consultar por WhatsApp"
                }
            }
        }
    }
}

/// Base HTML document structure.
fn base_document(title: &str, css: &str, content: Markup) -> Markup {
    html! {
        (DOCTYPE)
        html lang="es" {
            head {
                meta charset="UTF-8";
                meta name="viewport" content="width=device-width, initial-scale=1.0";
                title { (title) }
                style { (PreEscaped(css)) }
            }
            body {
                (content)
            }
        }
    }
}

/// Records grouped by category, categories in first-appearance order.
fn group_by_category(records: &[ProductRecord]) -> Vec<(&str, Vec<&ProductRecord>)> {
    let mut groups: Vec<(&str, Vec<&ProductRecord>)> = Vec::new();
    for record in records {
        match groups.iter_mut().find(|(c, _)| *c == record.category) {
            Some((_, products)) => products.push(record),
            None => groups.push((record.category.as_str(), vec![record])),
        }
    }
    groups
}

/// Fragment id for a category section.
pub fn category_anchor(category: &str) -> String {
    let slug: String = category
        .chars()
        .map(|c| if c.is_whitespace() { '-' } else { c })
        .collect();
    format!("cat-{slug}")
}

/// Category with its first letter upper-cased.
fn category_label(category: &str) -> String {
    let mut chars = category.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Format a price with `.` thousands separators: `15000` → `$15.000`.
pub fn format_price(price: u64, symbol: &str) -> String {
    let digits = price.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(c);
    }
    format!("{symbol}{grouped}")
}

/// WhatsApp inquiry link for one product. Non-digits are dropped from `phone`.
pub fn whatsapp_link(phone: &str, message: &str, product_name: &str) -> String {
    let phone: String = phone.chars().filter(char::is_ascii_digit).collect();
    let text = format!("{message} {product_name}");
    format!(
        "https://api.whatsapp.com/send?phone={}&text={}",
        phone,
        urlencoding::encode(&text)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ShippingConfig;

    fn product(category: &str, name: &str, price: u64, images: &[&str]) -> ProductRecord {
        ProductRecord {
            category: category.to_string(),
            name: name.to_string(),
            price,
            description: "Descripcion del producto".to_string(),
            images: images.iter().map(|s| s.to_string()).collect(),
        }
    }

    fn render(records: &[ProductRecord], site: &SiteConfig) -> String {
        render_catalog(records, site).into_string()
    }

    // =========================================================================
    // Helpers
    // =========================================================================

    #[test]
    fn price_thousands_separator() {
        assert_eq!(format_price(15000, "$"), "$15.000");
        assert_eq!(format_price(1234567, "$"), "$1.234.567");
        assert_eq!(format_price(999, "$"), "$999");
        assert_eq!(format_price(0, "$"), "$0");
        assert_eq!(format_price(100000, "US$ "), "US$ 100.000");
    }

    #[test]
    fn anchor_replaces_spaces() {
        assert_eq!(category_anchor("sillas"), "cat-sillas");
        assert_eq!(category_anchor("mesas de luz"), "cat-mesas-de-luz");
    }

    #[test]
    fn label_capitalizes_first_letter() {
        assert_eq!(category_label("sillas"), "Sillas");
        assert_eq!(category_label("ñandú"), "Ñandú");
        assert_eq!(category_label(""), "");
    }

    #[test]
    fn whatsapp_link_encodes_message() {
        let link = whatsapp_link("+54 9 11 7058-3125", "Hola, quiero comprar", "Silla Roja");
        assert_eq!(
            link,
            "https://api.whatsapp.com/send?phone=5491170583125&text=Hola%2C%20quiero%20comprar%20Silla%20Roja"
        );
    }

    #[test]
    fn base_document_includes_doctype() {
        let doc = base_document("Test", "body {}", html! { p { "test" } }).into_string();
        assert!(doc.starts_with("<!DOCTYPE html>"));
        assert!(doc.contains("<title>Test</title>"));
    }

    // =========================================================================
    // Page rendering
    // =========================================================================

    #[test]
    fn filter_bar_lists_categories_in_order() {
        let records = vec![
            product("sillas", "A", 1, &["a.jpg"]),
            product("mesas de luz", "B", 1, &["b.jpg"]),
            product("sillas", "C", 1, &["c.jpg"]),
        ];
        let html = render(&records, &SiteConfig::default());

        let todos = html.find(r##"href="#">Todos"##).unwrap();
        let sillas = html.find(r##"href="#cat-sillas""##).unwrap();
        let mesas = html.find(r##"href="#cat-mesas-de-luz""##).unwrap();
        assert!(todos < sillas && sillas < mesas);
        assert_eq!(html.matches(r#"class="category""#).count(), 2);
        assert!(html.contains(r#"id="cat-mesas-de-luz""#));
    }

    #[test]
    fn card_shows_cover_strip_and_price() {
        let records = vec![product("sillas", "Silla Roja", 15000, &["1.jpg", "2.jpg", "3.jpg"])];
        let html = render(&records, &SiteConfig::default());

        assert!(html.contains(r#"class="product-cover" src="1.jpg""#));
        assert!(html.contains(r#"src="2.jpg""#));
        assert!(html.contains(r#"src="3.jpg""#));
        assert!(html.contains("$15.000"));
        assert!(html.contains("Silla Roja"));
    }

    #[test]
    fn catalog_text_is_escaped() {
        let records = vec![product("sillas", "<script>alert(1)</script>", 1, &["1.jpg"])];
        let html = render(&records, &SiteConfig::default());

        assert!(!html.contains("<script>alert"));
        assert!(html.contains("&lt;script&gt;"));
    }

    #[test]
    fn shipping_note_free_above_threshold() {
        let site = SiteConfig {
            shipping: Some(ShippingConfig {
                free_threshold: 50000,
                flat_fee: 3500,
            }),
            ..SiteConfig::default()
        };
        let cheap = render(&[product("a", "Barata", 10000, &["1.jpg"])], &site);
        assert!(cheap.contains(r#"class="product-shipping""#));
        assert!(cheap.contains("Envío: $3.500"));

        let pricey = render(&[product("a", "Cara", 50000, &["1.jpg"])], &site);
        assert!(pricey.contains("Envío gratis"));
    }

    #[test]
    fn no_shipping_note_by_default() {
        let html = render(&[product("a", "X", 1, &["1.jpg"])], &SiteConfig::default());
        // The inlined stylesheet names these classes too; look for the elements
        assert!(!html.contains(r#"class="product-shipping""#));
        assert!(!html.contains(r#"class="product-whatsapp""#));
        assert!(!html.contains("api.whatsapp.com"));
    }

    #[test]
    fn whatsapp_link_rendered_when_phone_set() {
        let site = SiteConfig {
            whatsapp_phone: Some("5491170583125".to_string()),
            ..SiteConfig::default()
        };
        let html = render(&[product("a", "Mesa & Silla", 1, &["1.jpg"])], &site);

        assert!(html.contains(r#"class="product-whatsapp""#));
        // `&` in the href is entity-escaped by maud
        assert!(html.contains("https://api.whatsapp.com/send?phone=5491170583125&amp;text="));
        assert!(html.contains("Mesa%20%26%20Silla"));
    }

    #[test]
    fn empty_catalog_message() {
        let html = render(&[], &SiteConfig::default());
        assert!(html.contains("No hay productos disponibles."));
        assert!(!html.contains(r#"class="category""#));
    }

    #[test]
    fn generate_writes_index_from_catalog_file() {
        let tmp = tempfile::TempDir::new().unwrap();
        let catalog_path = tmp.path().join("catalogo.json");
        crate::catalog::write_catalog(&[product("sillas", "Silla", 100, &["1.jpg"])], &catalog_path)
            .unwrap();

        let page = generate(&catalog_path, &tmp.path().join("site"), &SiteConfig::default()).unwrap();

        assert_eq!(page, tmp.path().join("site/index.html"));
        let html = fs::read_to_string(page).unwrap();
        assert!(html.contains("Silla"));
        assert!(html.contains("<style>"));
    }

    #[test]
    fn generate_missing_catalog_errors() {
        let tmp = tempfile::TempDir::new().unwrap();
        let result = generate(
            &tmp.path().join("catalogo.json"),
            tmp.path(),
            &SiteConfig::default(),
        );
        assert!(matches!(result, Err(GenerateError::Catalog(_))));
    }
}
