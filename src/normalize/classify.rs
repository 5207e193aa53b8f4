use crate::domain::ListingCategory;

/// Ordered keyword rules for classifying free-text listing-type strings.
/// Evaluated top to bottom, first match wins. The auction rule must stay
/// first: "Auction - Sale Pending" is an auction, not a sale.
const RULES: &[(&[&str], ListingCategory)] = &[
    (&["auction"], ListingCategory::Auction),
    (&["lease", "rent"], ListingCategory::Lease),
    (&["sale"], ListingCategory::Sale),
];

/// Classify a listing-type string. Unmatched text maps to `Unknown`.
pub fn classify_listing(text: &str) -> ListingCategory {
    let text = text.to_lowercase();
    for (keywords, category) in RULES {
        if keywords.iter().any(|k| text.contains(k)) {
            return *category;
        }
    }
    ListingCategory::Unknown
}
