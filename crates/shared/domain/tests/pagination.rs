use vhub_domain::pagination::{MAX_PAGE_SIZE, PageRequest};

#[test]
fn defaults_and_clamping() {
    let req = PageRequest::default();
    assert_eq!(req.page, 1);
    assert_eq!(req.page_size, 10);
    assert_eq!(req.offset(), 0);

    let wild = PageRequest { page: 0, page_size: 100_000 };
    let clamped = wild.clamped();
    assert_eq!(clamped.page, 1);
    assert_eq!(clamped.page_size, MAX_PAGE_SIZE);
}

#[test]
fn offset_and_total_pages() {
    let req = PageRequest { page: 3, page_size: 10 };
    assert_eq!(req.offset(), 20);
    assert_eq!(req.total_pages(0), 1);
    assert_eq!(req.total_pages(10), 1);
    assert_eq!(req.total_pages(11), 2);
    assert_eq!(req.total_pages(95), 10);
}

#[test]
fn page_request_deserializes_with_defaults() {
    let req: PageRequest = serde_json::from_str("{}").expect("empty object");
    assert_eq!(req.page, 1);
    assert_eq!(req.page_size, 10);

    let req: PageRequest = serde_json::from_str(r#"{"page": 4, "page_size": 50}"#).expect("full");
    assert_eq!(req.page, 4);
    assert_eq!(req.page_size, 50);
}
