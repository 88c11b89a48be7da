use webserver::http::request::{DYNAMIC_MARKER, Method, RequestBuilder};

#[test]
fn test_request_builder_defaults() {
    let req = RequestBuilder::new()
        .method(Method::GET)
        .target("/docs/")
        .build()
        .unwrap();

    assert_eq!(req.version, "HTTP/1.0");
    assert_eq!(req.request_line, "GET /docs/ HTTP/1.0");
    assert!(req.headers.is_empty());
}

#[test]
fn test_request_builder_requires_method_and_target() {
    assert!(RequestBuilder::new().target("/").build().is_err());
    assert!(RequestBuilder::new().method(Method::GET).build().is_err());
}

#[test]
fn test_request_header_lookup_is_case_sensitive() {
    let req = RequestBuilder::new()
        .method(Method::GET)
        .target("/")
        .header("If-Modified-Since", "Thu, 01 Jan 1970 00:00:00 GMT")
        .build()
        .unwrap();

    assert!(req.header("If-Modified-Since").is_some());
    assert!(req.header("if-modified-since").is_none());
}

#[test]
fn test_request_path_and_query() {
    let req = RequestBuilder::new()
        .method(Method::GET)
        .target("/search.do?nombre=report&extension=.txt")
        .build()
        .unwrap();

    assert_eq!(req.path(), "/search.do");
    assert_eq!(req.query(), Some("nombre=report&extension=.txt"));
    assert!(req.is_dynamic());

    let req = RequestBuilder::new()
        .method(Method::HEAD)
        .target("/index.html")
        .build()
        .unwrap();

    assert_eq!(req.path(), "/index.html");
    assert_eq!(req.query(), None);
    assert!(!req.is_dynamic());
    assert!(!req.wants_body());
}

#[test]
fn test_dynamic_marker() {
    assert_eq!(DYNAMIC_MARKER, ".do");
}

#[test]
fn test_method_round_trip_names() {
    for method in [Method::GET, Method::HEAD, Method::POST, Method::PUT] {
        assert_eq!(Method::from_str(method.as_str()), Some(method));
    }
    assert!(Method::POST.is_unsupported());
    assert!(Method::PUT.is_unsupported());
    assert!(!Method::GET.is_unsupported());
    assert!(!Method::HEAD.is_unsupported());
}
