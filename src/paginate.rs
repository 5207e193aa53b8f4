use serde::Serialize;

use crate::domain::Property;

/// One page of a ranked result set.
#[derive(Debug, Serialize)]
pub struct Page {
    pub items: Vec<Property>,
    pub total_count: usize,
    pub page: usize,
    pub page_size: usize,
}

/// Stateless slice of the ranked list. `page` is 1-based; values below 1
/// are clamped to the first page.
pub fn paginate(ranked: Vec<Property>, page: usize, page_size: usize) -> Page {
    let page = page.max(1);
    let total_count = ranked.len();
    let items = ranked
        .into_iter()
        .skip((page - 1) * page_size)
        .take(page_size)
        .collect();
    Page {
        items,
        total_count,
        page,
        page_size,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Address, ListingCategory, Price, PropertyCategory, SizeMetrics};

    fn pool(n: usize) -> Vec<Property> {
        (0..n)
            .map(|i| Property {
                id: format!("p{i}"),
                source_dataset: "test".to_string(),
                listing_category: ListingCategory::Sale,
                property_category: PropertyCategory::Commercial,
                property_type: None,
                property_subtype: None,
                address: Address::default(),
                price: Price::default(),
                size: SizeMetrics::default(),
                images: Vec::new(),
                cap_rate: None,
                coordinates: None,
                description: None,
                highlights: Vec::new(),
                completeness: 0,
                raw: serde_json::Value::Null,
            })
            .collect()
    }

    #[test]
    fn slices_requested_page() {
        let page = paginate(pool(45), 2, 20);
        assert_eq!(page.total_count, 45);
        assert_eq!(page.items.len(), 20);
        assert_eq!(page.items[0].id, "p20");
    }

    #[test]
    fn last_page_is_partial() {
        let page = paginate(pool(45), 3, 20);
        assert_eq!(page.items.len(), 5);
    }

    #[test]
    fn page_past_the_end_is_empty_but_keeps_total() {
        let page = paginate(pool(5), 9, 20);
        assert!(page.items.is_empty());
        assert_eq!(page.total_count, 5);
    }

    #[test]
    fn page_zero_clamps_to_first() {
        let page = paginate(pool(5), 0, 20);
        assert_eq!(page.page, 1);
        assert_eq!(page.items.len(), 5);
    }
}
