//! Navigation metadata for a page: typed links plus their HTTP header form.
//!
//! Every link carries the query, filter and seed of the request it was built
//! from, so a client can walk the listing without re-deriving the seed.

use std::fmt::Write as _;

use seedpage_core::types::{PageLinks, PageRef, PageResult};

pub const TOTAL_COUNT_HEADER: &str = "X-Total-Count";
pub const LINK_HEADER: &str = "Link";

/// What a link must preserve from the originating request.
#[derive(Debug, Clone, Copy)]
pub struct LinkContext<'a> {
    pub query: Option<&'a str>,
    pub promoted: Option<bool>,
    pub seed: &'a str,
}

impl LinkContext<'_> {
    fn at(&self, page: u64, size: u64) -> PageRef {
        PageRef {
            page,
            size,
            query: self.query.map(str::to_string),
            promoted: self.promoted,
            seed: self.seed.to_string(),
        }
    }
}

/// Links for `page` of a listing with `total` matches. `last` is page 0 for
/// an empty listing. `prev` exists whenever `page > 0`, also past the end.
pub fn build_links(ctx: &LinkContext<'_>, page: u64, size: u64, total: u64) -> PageLinks {
    let total_pages = total.div_ceil(size);
    let last = total_pages.saturating_sub(1);
    PageLinks {
        first: ctx.at(0, size),
        prev: (page > 0).then(|| ctx.at(page - 1, size)),
        next: (page.saturating_add(1) < total_pages).then(|| ctx.at(page + 1, size)),
        last: ctx.at(last, size),
    }
}

/// RFC 8288 `Link` header value, relations in next, prev, last, first order.
pub fn link_header(base: &str, links: &PageLinks) -> String {
    let rels = [("next", links.next.as_ref()), ("prev", links.prev.as_ref()), ("last", Some(&links.last)), ("first", Some(&links.first))];
    rels.into_iter()
        .filter_map(|(rel, page_ref)| page_ref.map(|r| format!("<{}>; rel=\"{}\"", page_url(base, r), rel)))
        .collect::<Vec<_>>()
        .join(",")
}

/// Header pairs a transport can attach to a page response.
pub fn pagination_headers(base: &str, result: &PageResult) -> Vec<(&'static str, String)> {
    vec![
        (TOTAL_COUNT_HEADER, result.total_count.to_string()),
        (LINK_HEADER, link_header(base, &result.links)),
    ]
}

pub fn page_url(base: &str, page_ref: &PageRef) -> String {
    let mut url = format!("{}?page={}&size={}", base, page_ref.page, page_ref.size);
    if let Some(query) = &page_ref.query { let _ = write!(url, "&query={}", encode_component(query)); }
    if let Some(promoted) = page_ref.promoted { let _ = write!(url, "&promoted={}", promoted); }
    let _ = write!(url, "&seed={}", encode_component(&page_ref.seed));
    url
}

/// Percent-encode everything outside the RFC 3986 unreserved set.
fn encode_component(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for byte in value.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'.' | b'_' | b'~' => out.push(byte as char),
            _ => { let _ = write!(out, "%{:02X}", byte); }
        }
    }
    out
}
