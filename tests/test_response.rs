use std::time::{Duration, SystemTime, UNIX_EPOCH};

use webserver::http::response::{Body, ResponseEnvelope, StatusCode};
use webserver::http::writer::{SERVER_NAME, serialize_head, write_response};

fn fixed_date() -> SystemTime {
    // Sun, 06 Nov 1994 08:49:37 GMT
    UNIX_EPOCH + Duration::from_secs(784_111_777)
}

#[test]
fn test_status_code_as_u16() {
    assert_eq!(StatusCode::Ok.as_u16(), 200);
    assert_eq!(StatusCode::NotModified.as_u16(), 304);
    assert_eq!(StatusCode::BadRequest.as_u16(), 400);
    assert_eq!(StatusCode::Forbidden.as_u16(), 403);
    assert_eq!(StatusCode::NotFound.as_u16(), 404);
    assert_eq!(StatusCode::NotImplemented.as_u16(), 501);
    assert_eq!(StatusCode::HttpVersionNotSupported.as_u16(), 505);
}

#[test]
fn test_status_code_names() {
    assert_eq!(StatusCode::Ok.name(), "OK");
    assert_eq!(StatusCode::NotModified.name(), "NOT_MODIFIED");
    assert_eq!(StatusCode::NotFound.name(), "NOT_FOUND");
    assert_eq!(
        StatusCode::HttpVersionNotSupported.name(),
        "HTTP_VERSION_NOT_SUPPORTED"
    );
    assert_eq!(StatusCode::NotFound.to_string(), "404 NOT_FOUND");
}

#[test]
fn test_error_page_only_for_errors() {
    assert!(StatusCode::Ok.error_page().is_none());
    assert!(StatusCode::NotModified.error_page().is_none());

    let page = StatusCode::Forbidden.error_page().unwrap();
    assert!(page.starts_with("<html>"));
    assert!(page.contains("<h1>Error 403</h1>"));
    assert!(page.contains("<h3>FORBIDDEN</h3>"));
    assert!(page.contains(StatusCode::Forbidden.reason()));
}

#[test]
fn test_serialize_head_html_body() {
    let resp = ResponseEnvelope {
        status: StatusCode::NotFound,
        date: fixed_date(),
        body: StatusCode::NotFound.error_page().map(Body::Html),
        send_body: true,
    };
    let page_len = StatusCode::NotFound.error_page().unwrap().len();

    let head = serialize_head(&resp);
    let expected = format!(
        "HTTP/1.0 404 NOT_FOUND\r\n\
         Date: Sun, 06 Nov 1994 08:49:37 GMT\r\n\
         Server: {SERVER_NAME}\r\n\
         Content-Type: text/html\r\n\
         Content-Length: {page_len}\r\n\
         \r\n"
    );
    assert_eq!(head, expected.as_bytes());
}

#[test]
fn test_serialize_head_without_body() {
    let resp = ResponseEnvelope {
        status: StatusCode::NotModified,
        date: fixed_date(),
        body: None,
        send_body: false,
    };

    let head = String::from_utf8(serialize_head(&resp).to_vec()).unwrap();
    assert!(head.starts_with("HTTP/1.0 304 NOT_MODIFIED\r\n"));
    assert!(!head.contains("Content-Length"));
    assert!(!head.contains("Content-Type"));
    assert!(head.ends_with("\r\n\r\n"));
    assert_eq!(resp.body_size(), 0);
}

#[test]
fn test_content_length_counts_bytes() {
    let body = Body::Html("ñandú".to_string());
    assert_eq!(body.len(), 7);
}

#[tokio::test]
async fn test_write_response_head_only_when_body_suppressed() {
    let mut resp = ResponseEnvelope {
        status: StatusCode::Ok,
        date: fixed_date(),
        body: Some(Body::Html("<html>hi</html>".to_string())),
        send_body: false,
    };

    let mut out: Vec<u8> = Vec::new();
    write_response(&mut out, &mut resp).await.unwrap();

    let text = String::from_utf8(out).unwrap();
    assert!(text.contains("Content-Length: 15\r\n"));
    assert!(text.ends_with("\r\n\r\n"));
    assert_eq!(resp.body_size(), 0);
}

#[tokio::test]
async fn test_write_response_streams_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("notes.txt");
    std::fs::write(&path, b"line one\nline two\n").unwrap();

    let file = tokio::fs::File::open(&path).await.unwrap();
    let mut resp = ResponseEnvelope {
        status: StatusCode::Ok,
        date: fixed_date(),
        body: Some(Body::File {
            file,
            len: 18,
            modified: fixed_date(),
            content_type: "text/plain",
        }),
        send_body: true,
    };

    let mut out: Vec<u8> = Vec::new();
    write_response(&mut out, &mut resp).await.unwrap();

    let text = String::from_utf8(out).unwrap();
    let (head, body) = text.split_once("\r\n\r\n").unwrap();
    assert!(head.contains("Last-Modified: Sun, 06 Nov 1994 08:49:37 GMT\r\n"));
    assert!(head.contains("Content-Type: text/plain\r\n"));
    assert!(head.ends_with("Content-Length: 18"));
    assert_eq!(body, "line one\nline two\n");
    assert_eq!(resp.body_size(), 18);
}
