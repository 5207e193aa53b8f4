use std::collections::HashMap;

use once_cell::sync::Lazy;
use tracing::debug;

/// Fixed table of state names and abbreviations used to strip a trailing
/// state suffix from location queries ("Boca Raton, FL" -> "boca raton").
static STATE_SUFFIXES: Lazy<Vec<&'static str>> = Lazy::new(|| {
    vec![
        "alabama", "al", "alaska", "ak", "arizona", "az", "arkansas", "ar", "california", "ca",
        "colorado", "co", "connecticut", "ct", "delaware", "de", "florida", "fl", "georgia", "ga",
        "hawaii", "hi", "idaho", "id", "illinois", "il", "indiana", "in", "iowa", "ia", "kansas",
        "ks", "kentucky", "ky", "louisiana", "la", "maine", "me", "maryland", "md",
        "massachusetts", "ma", "michigan", "mi", "minnesota", "mn", "mississippi", "ms",
        "missouri", "mo", "montana", "mt", "nebraska", "ne", "nevada", "nv", "new hampshire",
        "nh", "new jersey", "nj", "new mexico", "nm", "new york", "ny", "north carolina", "nc",
        "north dakota", "nd", "ohio", "oh", "oklahoma", "ok", "oregon", "or", "pennsylvania",
        "pa", "rhode island", "ri", "south carolina", "sc", "south dakota", "sd", "tennessee",
        "tn", "texas", "tx", "utah", "ut", "vermont", "vt", "virginia", "va", "washington", "wa",
        "west virginia", "wv", "wisconsin", "wi", "wyoming", "wy",
    ]
});

/// Decode percent-escapes and `+` separators in a query string segment.
/// Invalid escapes are passed through untouched rather than rejected.
fn percent_decode(input: &str) -> String {
    let bytes = input.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'%' if i + 2 < bytes.len() => {
                let hex = std::str::from_utf8(&bytes[i + 1..i + 3]).unwrap_or("");
                if let Ok(v) = u8::from_str_radix(hex, 16) {
                    out.push(v);
                    i += 3;
                } else {
                    out.push(b'%');
                    i += 1;
                }
            }
            b'+' => {
                out.push(b' ');
                i += 1;
            }
            b => {
                out.push(b);
                i += 1;
            }
        }
    }
    String::from_utf8_lossy(&out).into_owned()
}

/// Normalize a free-text location query: lowercase, trim, percent-decode,
/// then strip one trailing state name or abbreviation.
pub fn normalize_location(query: &str) -> String {
    let decoded = percent_decode(query.trim());
    let mut q = decoded.to_lowercase().trim().to_string();

    // "city, st" form first, then a bare trailing token ("city st").
    if let Some(idx) = q.rfind(',') {
        let tail = q[idx + 1..].trim().to_string();
        if STATE_SUFFIXES.contains(&tail.as_str()) {
            q = q[..idx].trim().to_string();
        }
    } else if let Some(idx) = q.rfind(' ') {
        let tail = q[idx + 1..].trim().to_string();
        if STATE_SUFFIXES.contains(&tail.as_str()) {
            let head = q[..idx].trim().to_string();
            if !head.is_empty() {
                q = head;
            }
        }
    }

    q
}

/// Maps a free-text location query to the ordered set of dataset sources
/// that must be consulted for it. Resolution is deterministic: identical
/// input always yields the identical source list in the identical order.
#[derive(Debug, Clone)]
pub struct DatasetCatalog {
    /// City key -> ordered source ids, exact-match index.
    routes: HashMap<String, Vec<String>>,
    /// City keys sorted by length descending (ties alphabetical) for the
    /// substring pass, so "miami beach" wins over "miami".
    keys_by_length: Vec<String>,
    default_sources: Vec<String>,
}

impl DatasetCatalog {
    pub fn new(routes: Vec<(&str, Vec<&str>)>, default_sources: Vec<&str>) -> Self {
        let mut map = HashMap::new();
        let mut keys = Vec::new();
        for (city, sources) in routes {
            let key = city.to_lowercase();
            keys.push(key.clone());
            map.insert(key, sources.into_iter().map(String::from).collect());
        }
        keys.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));
        Self {
            routes: map,
            keys_by_length: keys,
            default_sources: default_sources.into_iter().map(String::from).collect(),
        }
    }

    /// Routing table for the South Florida datasets this binary ships with.
    pub fn builtin() -> Self {
        Self::new(
            vec![
                (
                    "miami",
                    vec![
                        "miami_commercial",
                        "aggregator_sale",
                        "aggregator_lease",
                        "south_florida_residential",
                    ],
                ),
                (
                    "miami beach",
                    vec![
                        "miami_beach_commercial",
                        "aggregator_sale",
                        "aggregator_lease",
                        "south_florida_residential",
                    ],
                ),
                (
                    "fort lauderdale",
                    vec![
                        "fort_lauderdale_commercial",
                        "aggregator_sale",
                        "aggregator_lease",
                        "south_florida_residential",
                    ],
                ),
                (
                    "boca raton",
                    vec![
                        "boca_raton_commercial",
                        "aggregator_sale",
                        "aggregator_lease",
                        "south_florida_residential",
                    ],
                ),
                (
                    "palm beach",
                    vec![
                        "palm_beach_commercial",
                        "aggregator_sale",
                        "aggregator_lease",
                        "south_florida_residential",
                    ],
                ),
                (
                    "west palm beach",
                    vec![
                        "west_palm_beach_commercial",
                        "aggregator_sale",
                        "aggregator_lease",
                        "south_florida_residential",
                    ],
                ),
                (
                    "delray beach",
                    vec![
                        "delray_beach_commercial",
                        "aggregator_sale",
                        "aggregator_lease",
                        "south_florida_residential",
                    ],
                ),
                (
                    "naples",
                    vec![
                        "naples_commercial",
                        "aggregator_sale",
                        "aggregator_lease",
                        "south_florida_residential",
                    ],
                ),
            ],
            vec![
                "combined_commercial",
                "aggregator_sale",
                "aggregator_lease",
                "south_florida_residential",
            ],
        )
    }

    /// Resolve a location query to the ordered dataset sources to consult.
    ///
    /// Exact match on the normalized city first; then substring containment
    /// against keys longest-first; then the default combined set. Same-named
    /// cities in different states are not disambiguated beyond substring
    /// matching; known limitation of the routing table.
    pub fn resolve(&self, location_query: &str) -> Vec<String> {
        let city = normalize_location(location_query);

        if let Some(sources) = self.routes.get(&city) {
            debug!(city = %city, "catalog exact match");
            return sources.clone();
        }

        if !city.is_empty() {
            for key in &self.keys_by_length {
                if key.contains(&city) || city.contains(key.as_str()) {
                    debug!(city = %city, key = %key, "catalog substring match");
                    return self.routes[key].clone();
                }
            }
        }

        debug!(city = %city, "catalog fallback to default sources");
        self.default_sources.clone()
    }
}
