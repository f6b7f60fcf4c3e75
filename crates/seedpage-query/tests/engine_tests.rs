use std::collections::HashSet;
use std::sync::Arc;

use seedpage_core::config::PagingSettings;
use seedpage_core::error::Error;
use seedpage_core::traits::IndexStore;
use seedpage_core::types::{Document, PageRequest};
use seedpage_query::QueryEngine;
use seedpage_rank::Ranker;
use seedpage_text::TantivyStore;

fn store_with(ids: impl IntoIterator<Item = u64>) -> Arc<TantivyStore> {
    let store = TantivyStore::in_memory().expect("store");
    let docs: Vec<Document> = ids.into_iter().map(|id| Document::new(id, format!("animal {id}"))).collect();
    store.replace_all(&docs).expect("seed documents");
    Arc::new(store)
}

fn expected_order(seed: &str, ids: impl IntoIterator<Item = u64>) -> Vec<u64> {
    let ranker = Ranker::new(seed);
    let mut ids: Vec<u64> = ids.into_iter().collect();
    ids.sort_by_key(|&id| ranker.key(id));
    ids
}

#[test]
fn consecutive_pages_equal_one_double_page() {
    let engine = QueryEngine::new(store_with(1..=40));
    for seed in ["abc", "s2", "another seed"] {
        let p0 = engine.query(&PageRequest::list(0, 7, seed)).expect("page 0");
        let p1 = engine.query(&PageRequest::list(1, 7, seed)).expect("page 1");
        let double = engine.query(&PageRequest::list(0, 14, seed)).expect("double page");
        let joined: Vec<u64> = p0.ids().into_iter().chain(p1.ids()).collect();
        assert_eq!(joined, double.ids(), "seed {seed}");
    }
}

#[test]
fn different_seeds_show_different_first_pages() {
    let engine = QueryEngine::new(store_with(1..=20));
    let a = engine.query(&PageRequest::list(0, 9, "abc")).expect("abc");
    let b = engine.query(&PageRequest::list(0, 9, "xyz")).expect("xyz");
    assert_ne!(a.ids(), b.ids());
}

#[test]
fn items_carry_their_rank_as_score() {
    let engine = QueryEngine::new(store_with(1..=10));
    let page = engine.query(&PageRequest::list(0, 10, "abc")).expect("page");
    let ranker = Ranker::new("abc");
    for doc in &page.items {
        assert_eq!(doc.score, Some(ranker.rank(doc.id)));
    }
    let scores: Vec<f64> = page.items.iter().filter_map(|d| d.score).collect();
    assert!(scores.windows(2).all(|w| w[0] <= w[1]), "ascending rank");
}

#[test]
fn total_count_matches_direct_match() {
    let store = store_with(1..=30);
    store.upsert(&Document::new(31, "Tiger")).expect("upsert");
    store.upsert(&Document::new(32, "Tigress")).expect("upsert");
    let engine = QueryEngine::new(Arc::clone(&store));
    for query in [None, Some("animal"), Some("tig"), Some("nothing")] {
        let request = PageRequest { query: query.map(str::to_string), promoted: None, page: 0, size: 5, seed: Some("abc".into()) };
        let page = engine.query(&request).expect("query");
        let direct = store.match_documents(query).expect("match");
        assert_eq!(page.total_count, direct.len() as u64, "query {query:?}");
        assert_eq!(page.generation, direct.generation);
    }
}

#[test]
fn page_past_the_end_is_empty_with_unchanged_total() {
    let engine = QueryEngine::new(store_with(1..=23));
    let last = engine.query(&PageRequest::list(2, 9, "abc")).expect("last page");
    assert_eq!(last.items.len(), 5);
    for page in [3, 4, 1_000_000, i64::MAX] {
        let beyond = engine.query(&PageRequest::list(page, 9, "abc")).expect("beyond");
        assert!(beyond.items.is_empty(), "page {page}");
        assert_eq!(beyond.total_count, last.total_count);
    }
}

#[test]
fn scenario_23_documents_three_pages_with_promotion_in_between() {
    let store = store_with(1..=23);
    let engine = QueryEngine::new(Arc::clone(&store));
    let expected = expected_order("abc", 1..=23);

    let p0 = engine.query(&PageRequest::list(0, 9, "abc")).expect("page 0");
    let p1_before = engine.query(&PageRequest::list(1, 9, "abc")).expect("page 1 preview");

    store.upsert(&Document::new(5, "animal 5").promoted(true)).expect("promote 5");

    let p1 = engine.query(&PageRequest::list(1, 9, "abc")).expect("page 1");
    let p2 = engine.query(&PageRequest::list(2, 9, "abc")).expect("page 2");

    assert_eq!(p1.ids(), p1_before.ids(), "promotion does not move documents between pages");
    let all: Vec<u64> = p0.ids().into_iter().chain(p1.ids()).chain(p2.ids()).collect();
    assert_eq!(all, expected);
    assert_eq!(all.iter().collect::<HashSet<_>>().len(), 23);
    assert_eq!((p0.items.len(), p1.items.len(), p2.items.len()), (9, 9, 5));
    let five = all.iter().position(|&id| id == 5).expect("5 listed");
    let page_of_five = [&p0, &p1, &p2][five / 9];
    assert!(page_of_five.items.iter().any(|d| d.id == 5));
    if five >= 9 {
        assert!(page_of_five.items.iter().find(|d| d.id == 5).expect("5").promoted, "fresh fetch sees the promotion");
    }
}

#[test]
fn search_pages_only_matching_documents() {
    let store = store_with(1..=10);
    for id in 11..=15 { store.upsert(&Document::new(id, format!("zebra {id}"))).expect("upsert"); }
    let engine = QueryEngine::new(store);
    let page = engine.query(&PageRequest::search("ZEB", 0, 10, "abc")).expect("search");
    assert_eq!(page.total_count, 5);
    assert_eq!(page.ids(), expected_order("abc", 11..=15));
}

#[test]
fn search_for_punctuation_only_is_an_empty_page() {
    let engine = QueryEngine::new(store_with(1..=5));
    for query in ["!!!", "?", "***"] {
        let page = engine.query(&PageRequest::search(query, 0, 10, "abc")).expect("search");
        assert_eq!(page.total_count, 0, "query {query:?}");
        assert!(page.items.is_empty());
    }
    let blank = engine.query(&PageRequest::search("  ", 0, 10, "abc")).expect("blank search");
    assert_eq!(blank.total_count, 5, "blank text still lists everything");
}

#[test]
fn promoted_filter_narrows_the_listing() {
    let store = store_with(1..=10);
    for id in [2, 4, 6] { store.upsert(&Document::new(id, format!("animal {id}")).promoted(true)).expect("promote"); }
    let engine = QueryEngine::new(store);
    let page = engine.query(&PageRequest::list(0, 10, "abc").with_promoted(true)).expect("query");
    assert_eq!(page.ids(), expected_order("abc", [2, 4, 6]));
    assert_eq!(page.links.first.promoted, Some(true));
}

#[test]
fn malformed_requests_are_rejected_before_touching_the_store() {
    let store = store_with(1..=3);
    store.close();
    let engine = QueryEngine::new(store);
    for (page, size) in [(0, 0), (0, -1), (-1, 5), (0, 2001)] {
        let err = engine.query(&PageRequest::list(page, size, "abc")).unwrap_err();
        assert!(matches!(err, Error::InvalidPageRequest(_)), "({page}, {size}) -> {err:?}");
    }
    let mut request = PageRequest::list(0, 5, "abc");
    request.seed = None;
    assert!(matches!(engine.query(&request), Err(Error::MissingSeed)));
    request.seed = Some(String::new());
    assert!(matches!(engine.query(&request), Err(Error::MissingSeed)));
}

#[test]
fn max_size_follows_paging_settings() {
    let paging = PagingSettings { default_size: 5, max_size: 10 };
    let engine = QueryEngine::with_paging(store_with(1..=30), &paging);
    assert!(engine.query(&PageRequest::list(0, 10, "abc")).is_ok());
    assert!(matches!(engine.query(&PageRequest::list(0, 11, "abc")), Err(Error::InvalidPageRequest(_))));
}

#[test]
fn unavailable_store_is_an_error_not_an_empty_page() {
    let store = store_with(1..=3);
    let engine = QueryEngine::new(Arc::clone(&store));
    store.close();
    let err = engine.query(&PageRequest::list(0, 5, "abc")).unwrap_err();
    assert!(matches!(err, Error::StoreUnavailable(_)));
    assert!(err.is_retryable());
}

#[test]
fn get_reports_missing_ids() {
    let engine = QueryEngine::new(store_with(1..=3));
    assert_eq!(engine.get(2).expect("get").name, "animal 2");
    assert!(matches!(engine.get(99), Err(Error::NotFound(99))));
}

#[test]
fn empty_store_lists_nothing() {
    let engine = QueryEngine::new(store_with(std::iter::empty()));
    let page = engine.query(&PageRequest::list(0, 9, "abc")).expect("query");
    assert!(page.items.is_empty());
    assert_eq!(page.total_count, 0);
    assert_eq!(page.links.last.page, 0);
    assert!(page.links.next.is_none() && page.links.prev.is_none());
}
