/// Heuristic city extraction from a free-form address string.
///
/// Addresses in the order store are comma-separated, usually
/// "street, city, country" or "city, country". The city is taken as the
/// second-to-last segment when there are at least two, otherwise the whole
/// string. Matching is case-insensitive, so the result is lowercased.
pub fn extract_city(address: &str) -> String {
    let segments: Vec<&str> = address
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect();

    let city = match segments.len() {
        0 => "",
        1 => segments[0],
        n => segments[n - 2],
    };

    city.to_lowercase()
}
