//! Cursor pagination via the `Link` response header.
//!
//! Shopify returns adjacent pages as URLs carrying a `page_info` cursor:
//!
//! ```text
//! <https://shop.myshopify.com/admin/api/2024-01/products.json?limit=50&page_info=PREV>; rel="previous",
//! <https://shop.myshopify.com/admin/api/2024-01/products.json?limit=50&page_info=NEXT>; rel="next"
//! ```

/// Extract the `page_info` cursor of the `rel="next"` link, if any.
#[must_use]
pub fn next_page_info(link_header: Option<&str>) -> Option<String> {
    link_header?
        .split(',')
        .map(str::trim)
        .find(|segment| segment.contains(r#"rel="next""#))
        .and_then(bracketed_url)
        .and_then(|url| query_value(url, "page_info"))
}

fn bracketed_url(segment: &str) -> Option<&str> {
    let start = segment.find('<')? + 1;
    let end = segment.find('>')?;
    segment.get(start..end)
}

fn query_value(url: &str, key: &str) -> Option<String> {
    let (_, query) = url.split_once('?')?;
    query
        .split('&')
        .filter_map(|pair| pair.split_once('='))
        .find(|(k, v)| *k == key && !v.is_empty())
        .map(|(_, v)| v.split('#').next().unwrap_or(v).to_string())
}
