use crate::product::Product;

pub const DEFAULT_CURRENCY: &str = "₹";

/// Formats a price with a currency symbol and two decimals, e.g. `₹12.50`.
pub fn format_price(price: f64, currency: &str) -> String {
    format!("{currency}{price:.2}")
}

/// Summary of one product in the customer gallery.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProductCard<'a> {
    /// Position in the catalog, used to open the detail view.
    pub index: usize,
    pub name: &'a str,
    pub price: f64,
    pub image: &'a str,
}

/// Builds one card per product, in catalog order.
pub fn cards(products: &[Product]) -> Vec<ProductCard<'_>> {
    products
        .iter()
        .enumerate()
        .map(|(index, product)| ProductCard {
            index,
            name: &product.name,
            price: product.price,
            image: &product.main_image,
        })
        .collect()
}

/// The detail view of one product.
///
/// Selecting a thumbnail promotes it to the displayed primary image; the
/// previously displayed image takes the thumbnail's place. The product itself
/// is never modified.
#[derive(Debug, Clone)]
pub struct DetailView<'a> {
    product: &'a Product,
    primary: &'a str,
    thumbnails: Vec<&'a str>,
}

impl<'a> DetailView<'a> {
    pub fn new(product: &'a Product) -> Self {
        Self {
            product,
            primary: &product.main_image,
            thumbnails: product.other_images.iter().map(String::as_str).collect(),
        }
    }

    /// Opens the product at `index`, or None when out of range.
    pub fn open(products: &'a [Product], index: usize) -> Option<Self> {
        products.get(index).map(Self::new)
    }

    pub fn name(&self) -> &'a str {
        &self.product.name
    }

    pub fn price(&self) -> f64 {
        self.product.price
    }

    pub fn description(&self) -> Option<&'a str> {
        self.product.description.as_deref()
    }

    pub fn primary(&self) -> &'a str {
        self.primary
    }

    pub fn thumbnails(&self) -> &[&'a str] {
        &self.thumbnails
    }

    /// Displays thumbnail `index` as the primary image.
    ///
    /// Returns false if there is no such thumbnail.
    pub fn promote(&mut self, index: usize) -> bool {
        match self.thumbnails.get_mut(index) {
            Some(thumbnail) => {
                std::mem::swap(thumbnail, &mut self.primary);
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vase() -> Product {
        Product::new("Vase", 40.0, Some("Blue"), "main".into(), vec!["t1".into(), "t2".into()]).unwrap()
    }

    #[test]
    fn price_formatting() {
        assert_eq!(format_price(12.5, DEFAULT_CURRENCY), "₹12.50");
        assert_eq!(format_price(3.0, "$"), "$3.00");
    }

    #[test]
    fn cards_follow_catalog_order() {
        let products = vec![vase(), Product::new("Rug", 9.0, None, "rug".into(), vec![]).unwrap()];

        let cards = cards(&products);

        assert_eq!(cards.len(), 2);
        assert_eq!(cards[1].index, 1);
        assert_eq!(cards[1].name, "Rug");
        assert_eq!(cards[0].image, "main");
    }

    #[test]
    fn detail_view_out_of_range() {
        assert!(DetailView::open(&[vase()], 1).is_none());
    }

    #[test]
    fn promote_swaps_thumbnail_and_primary() {
        let product = vase();
        let mut view = DetailView::new(&product);

        assert!(view.promote(1));
        assert_eq!(view.primary(), "t2");
        assert_eq!(view.thumbnails(), &["t1", "main"]);

        assert!(!view.promote(5));
        assert_eq!(product.main_image, "main");
        assert_eq!(view.description(), Some("Blue"));
    }
}
