use bytes::{BufMut, Bytes, BytesMut};
use tokio::io::{AsyncWrite, AsyncWriteExt};

use crate::http::mime;
use crate::http::response::{Body, ResponseEnvelope};

/// Response version token. Sent even when the request said HTTP/1.1.
const HTTP_VERSION: &str = "HTTP/1.0";

pub const SERVER_NAME: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

fn put_header(buf: &mut BytesMut, key: &str, value: &str) {
    buf.put_slice(key.as_bytes());
    buf.put_slice(b": ");
    buf.put_slice(value.as_bytes());
    buf.put_slice(b"\r\n");
}

/// Serializes the status line and headers, blank line included.
///
/// Header order is fixed: `Date`, `Server`, then the body description if
/// there is a body source.
pub fn serialize_head(resp: &ResponseEnvelope) -> Bytes {
    let mut buf = BytesMut::with_capacity(256);

    let status_line = format!(
        "{} {} {}\r\n",
        HTTP_VERSION,
        resp.status.as_u16(),
        resp.status.name()
    );
    buf.put_slice(status_line.as_bytes());

    put_header(&mut buf, "Date", &httpdate::fmt_http_date(resp.date));
    put_header(&mut buf, "Server", SERVER_NAME);

    match &resp.body {
        Some(Body::File { len, modified, content_type, .. }) => {
            put_header(&mut buf, "Last-Modified", &httpdate::fmt_http_date(*modified));
            put_header(&mut buf, "Content-Type", content_type);
            put_header(&mut buf, "Content-Length", &len.to_string());
        }
        Some(Body::Html(html)) => {
            put_header(&mut buf, "Content-Type", mime::HTML);
            put_header(&mut buf, "Content-Length", &html.len().to_string());
        }
        None => {}
    }

    // Header/body separator
    buf.put_slice(b"\r\n");

    buf.freeze()
}

/// Writes the whole response: head, then the body unless `send_body` is
/// false.
pub async fn write_response<W>(stream: &mut W, resp: &mut ResponseEnvelope) -> std::io::Result<()>
where
    W: AsyncWrite + Unpin,
{
    let head = serialize_head(resp);
    stream.write_all(&head).await?;

    if resp.send_body {
        match &mut resp.body {
            Some(Body::File { file, .. }) => {
                tokio::io::copy(file, stream).await?;
            }
            Some(Body::Html(html)) => {
                stream.write_all(html.as_bytes()).await?;
            }
            None => {}
        }
    }

    stream.flush().await
}
