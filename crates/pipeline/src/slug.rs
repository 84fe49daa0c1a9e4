//! Market slugs from user input.
//!
//! Input is either a bare slug or a polymarket.com URL.

const HOST: &str = "polymarket.com";

/// Market slug from a slug or a market URL.
///
/// URLs resolve to their last non-empty path segment, ignoring query and
/// fragment.
pub fn parse_market_slug(input: &str) -> String {
    let input = input.trim();
    if !input.contains(HOST) {
        return input.to_string();
    }
    let path = input.split(['?', '#']).next().unwrap_or_default();
    path.split('/')
        .filter(|s| !s.is_empty())
        .next_back()
        .unwrap_or(path)
        .to_string()
}
