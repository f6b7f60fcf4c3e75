use std::sync::Arc;

use seedpage_core::traits::IndexStore;
use seedpage_core::types::{Document, PageRequest};
use seedpage_query::{link_header, pagination_headers, QueryEngine, LINK_HEADER, TOTAL_COUNT_HEADER};
use seedpage_text::TantivyStore;

fn engine(n: u64) -> QueryEngine<TantivyStore> {
    let store = TantivyStore::in_memory().expect("store");
    let docs: Vec<Document> = (1..=n).map(|id| Document::new(id, format!("tom {id}"))).collect();
    store.replace_all(&docs).expect("seed");
    QueryEngine::new(Arc::new(store))
}

#[test]
fn middle_page_links_everywhere() {
    let page = engine(23).query(&PageRequest::list(1, 9, "abc")).expect("query");
    let links = &page.links;
    assert_eq!(links.first.page, 0);
    assert_eq!(links.prev.as_ref().map(|r| r.page), Some(0));
    assert_eq!(links.next.as_ref().map(|r| r.page), Some(2));
    assert_eq!(links.last.page, 2);
    assert!([&links.first, &links.last].iter().all(|r| r.seed == "abc" && r.size == 9));
}

#[test]
fn edge_pages_omit_prev_and_next() {
    let engine = engine(18);
    let first = engine.query(&PageRequest::list(0, 9, "abc")).expect("first");
    assert!(first.links.prev.is_none());
    assert_eq!(first.links.next.as_ref().map(|r| r.page), Some(1));
    let last = engine.query(&PageRequest::list(1, 9, "abc")).expect("last");
    assert!(last.links.next.is_none(), "18 items fill exactly two pages");
    assert_eq!(last.links.last.page, 1);
}

#[test]
fn following_links_walks_the_whole_listing() {
    let engine = engine(23);
    let mut request = PageRequest::search("tom", 0, 4, "walk");
    let mut seen = Vec::new();
    loop {
        let page = engine.query(&request).expect("query");
        seen.extend(page.ids());
        match page.links.next {
            Some(next) => request = next.to_request(),
            None => break,
        }
    }
    let all = engine.query(&PageRequest::search("tom", 0, 23, "walk")).expect("all");
    assert_eq!(seen, all.ids());
}

#[test]
fn link_header_carries_query_and_seed() {
    let page = engine(23).query(&PageRequest::search("tom tom", 1, 9, "a&b")).expect("query");
    let header = link_header("/api/_search/animals", &page.links);
    assert_eq!(
        header,
        "</api/_search/animals?page=2&size=9&query=tom%20tom&seed=a%26b>; rel=\"next\",\
         </api/_search/animals?page=0&size=9&query=tom%20tom&seed=a%26b>; rel=\"prev\",\
         </api/_search/animals?page=2&size=9&query=tom%20tom&seed=a%26b>; rel=\"last\",\
         </api/_search/animals?page=0&size=9&query=tom%20tom&seed=a%26b>; rel=\"first\""
    );
}

#[test]
fn pagination_headers_expose_total_count() {
    let page = engine(23).query(&PageRequest::list(0, 9, "abc").with_promoted(false)).expect("query");
    let headers = pagination_headers("/api/animals", &page);
    assert_eq!(headers[0], (TOTAL_COUNT_HEADER, "23".to_string()));
    assert_eq!(headers[1].0, LINK_HEADER);
    assert!(headers[1].1.starts_with("</api/animals?page=1&size=9&promoted=false&seed=abc>; rel=\"next\""));
}
