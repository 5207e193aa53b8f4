use crate::domain::{Address, Price};

// Display-data weights. The score only ever feeds ranking tie-breaks, so
// the absolute values matter less than their relative size.
const W_HAS_IMAGE: u32 = 20;
const W_MANY_IMAGES: u32 = 5;
const W_LOTS_OF_IMAGES: u32 = 5;
const W_HAS_PRICE: u32 = 20;
const W_STREET: u32 = 10;
const W_CITY: u32 = 5;
const W_STATE: u32 = 5;
const W_TYPE: u32 = 10;
const W_DESCRIPTION: u32 = 10;
const W_HIGHLIGHTS: u32 = 10;

const MIN_STREET_LEN: usize = 5;
const MIN_DESCRIPTION_LEN: usize = 50;

/// Weighted sum of how much useful display data a record carries. Computed
/// once at normalization time and never recomputed.
pub fn completeness_score(
    images: &[String],
    price: &Price,
    address: &Address,
    has_type: bool,
    description: Option<&str>,
    highlights: &[String],
) -> u32 {
    let mut score = 0;

    if !images.is_empty() {
        score += W_HAS_IMAGE;
        if images.len() > 3 {
            score += W_MANY_IMAGES;
        }
        if images.len() > 10 {
            score += W_LOTS_OF_IMAGES;
        }
    }

    if price.amount.is_some() || price.display.is_some() {
        score += W_HAS_PRICE;
    }

    if address
        .street
        .as_deref()
        .map_or(false, |s| s.trim().len() > MIN_STREET_LEN)
    {
        score += W_STREET;
    }
    if address.city.as_deref().map_or(false, |s| !s.trim().is_empty()) {
        score += W_CITY;
    }
    if address.state.as_deref().map_or(false, |s| !s.trim().is_empty()) {
        score += W_STATE;
    }

    if has_type {
        score += W_TYPE;
    }

    if description.map_or(false, |d| d.trim().len() >= MIN_DESCRIPTION_LEN) {
        score += W_DESCRIPTION;
    }

    if !highlights.is_empty() {
        score += W_HIGHLIGHTS;
    }

    score
}
