use std::net::{IpAddr, Ipv4Addr};
use std::sync::Arc;
use std::time::{Duration, UNIX_EPOCH};

use webserver::access_log::{AccessLog, LogRecord};
use webserver::http::response::StatusCode;

fn record(status: StatusCode, body_size: u64) -> LogRecord {
    LogRecord {
        request_line: "GET /index.html HTTP/1.0".to_string(),
        client: IpAddr::V4(Ipv4Addr::LOCALHOST),
        date: UNIX_EPOCH + Duration::from_secs(784_111_777),
        status,
        body_size,
    }
}

#[test]
fn test_access_record_format() {
    assert_eq!(
        record(StatusCode::Ok, 42).format(),
        "Request=GET /index.html HTTP/1.0\n\
         IP=127.0.0.1\n\
         Date=Sun, 06 Nov 1994 08:49:37 GMT\n\
         Code=200\n\
         Size=42\n\
         \n"
    );
}

#[test]
fn test_error_record_format() {
    let text = record(StatusCode::NotFound, 0).format();
    assert!(text.ends_with(&format!("Error={}\n\n", StatusCode::NotFound.reason())));
    assert!(!text.contains("Code="));
}

#[test]
fn test_record_classification() {
    assert!(record(StatusCode::Ok, 1).is_access());
    assert!(record(StatusCode::NotModified, 0).is_access());
    assert!(!record(StatusCode::BadRequest, 0).is_access());
    assert!(!record(StatusCode::HttpVersionNotSupported, 0).is_access());
}

#[tokio::test]
async fn test_records_routed_to_matching_file() {
    let dir = tempfile::tempdir().unwrap();
    let access = dir.path().join("logs").join("access.log");
    let errors = dir.path().join("logs").join("error.log");

    let log = AccessLog::open(&access, &errors).await.unwrap();
    log.record(&record(StatusCode::Ok, 10)).await.unwrap();
    log.record(&record(StatusCode::Forbidden, 0)).await.unwrap();
    log.record(&record(StatusCode::NotModified, 0)).await.unwrap();

    let access_text = std::fs::read_to_string(&access).unwrap();
    let error_text = std::fs::read_to_string(&errors).unwrap();

    assert_eq!(access_text.matches("Request=").count(), 2);
    assert!(access_text.contains("Code=304\nSize=0\n"));
    assert_eq!(error_text.matches("Request=").count(), 1);
    assert!(error_text.contains(StatusCode::Forbidden.reason()));
}

#[tokio::test]
async fn test_reopen_appends() {
    let dir = tempfile::tempdir().unwrap();
    let access = dir.path().join("access.log");
    let errors = dir.path().join("error.log");

    for _ in 0..2 {
        let log = AccessLog::open(&access, &errors).await.unwrap();
        log.record(&record(StatusCode::Ok, 1)).await.unwrap();
    }

    let text = std::fs::read_to_string(&access).unwrap();
    assert_eq!(text.matches("Request=").count(), 2);
}

#[tokio::test]
async fn test_concurrent_records_do_not_interleave() {
    let dir = tempfile::tempdir().unwrap();
    let access = dir.path().join("access.log");
    let log = Arc::new(
        AccessLog::open(&access, &dir.path().join("error.log"))
            .await
            .unwrap(),
    );

    let mut tasks = Vec::new();
    for i in 0..32u64 {
        let log = Arc::clone(&log);
        tasks.push(tokio::spawn(async move {
            log.record(&record(StatusCode::Ok, i)).await.unwrap();
        }));
    }
    for task in tasks {
        task.await.unwrap();
    }

    let text = std::fs::read_to_string(&access).unwrap();
    let records: Vec<&str> = text.split_terminator("\n\n").collect();
    assert_eq!(records.len(), 32);
    for rec in records {
        let lines: Vec<&str> = rec.lines().collect();
        assert_eq!(lines.len(), 5);
        assert!(lines[0].starts_with("Request="));
        assert!(lines[4].starts_with("Size="));
    }
}
