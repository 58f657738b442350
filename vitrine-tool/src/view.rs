use std::fmt::Write;

use vitrine_core::{DetailView, ProductCard, estimate_size, format_price};

/// Short description of an image reference for terminal output.
pub fn describe_image(image: &str) -> String {
    match image.strip_prefix("data:") {
        Some(rest) => {
            let content_type = rest.split([';', ',']).next().unwrap_or_default();
            format!("inline {content_type}, ~{} bytes", estimate_size(image))
        }
        None => image.to_string(),
    }
}

pub fn render_cards(cards: &[ProductCard<'_>], currency: &str) -> String {
    if cards.is_empty() {
        return "No products yet.\n".to_string();
    }

    let mut out = String::new();
    for card in cards {
        let _ = writeln!(
            out,
            "[{}] {}  {}  ({})",
            card.index,
            card.name,
            format_price(card.price, currency),
            describe_image(card.image)
        );
    }
    out
}

pub fn render_detail(view: &DetailView<'_>, currency: &str) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}  {}", view.name(), format_price(view.price(), currency));
    if let Some(description) = view.description() {
        let _ = writeln!(out, "{description}");
    }
    let _ = writeln!(out, "Image: {}", describe_image(view.primary()));
    for (i, thumbnail) in view.thumbnails().iter().enumerate() {
        let _ = writeln!(out, "  thumbnail {i}: {}", describe_image(thumbnail));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use vitrine_core::Product;
    use vitrine_core::render::cards;

    #[test]
    fn describes_inline_and_linked_images() {
        assert_eq!(describe_image("data:image/png;base64,YWJj"), "inline image/png, ~3 bytes");
        assert_eq!(describe_image("https://cdn/a.png"), "https://cdn/a.png");
    }

    #[test]
    fn empty_gallery() {
        assert_eq!(render_cards(&[], "₹"), "No products yet.\n");
    }

    #[test]
    fn gallery_and_detail() {
        let products = vec![
            Product::new("Vase", 40.0, Some("Blue glass"), "https://cdn/vase.png".into(), vec![
                "https://cdn/vase-top.png".into(),
            ])
            .unwrap(),
        ];

        assert_eq!(
            render_cards(&cards(&products), "₹"),
            "[0] Vase  ₹40.00  (https://cdn/vase.png)\n"
        );

        let mut view = DetailView::new(&products[0]);
        view.promote(0);
        assert_eq!(
            render_detail(&view, "$"),
            "Vase  $40.00\nBlue glass\nImage: https://cdn/vase-top.png\n  thumbnail 0: https://cdn/vase.png\n"
        );
    }
}
