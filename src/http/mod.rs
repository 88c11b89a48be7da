//! HTTP/1.0 protocol handling.
//!
//! # Architecture
//!
//! - **`connection`**: the per-connection request pipeline
//! - **`parser`**: request line and header parsing
//! - **`request`**: request representation
//! - **`response`**: status codes, error pages and the response envelope
//! - **`writer`**: serializes and writes responses to the client
//! - **`mime`**: Content-Type detection based on file extensions
//!
//! # Request Pipeline
//!
//! Each connection carries exactly one request through these stages, never
//! going back:
//!
//! ```text
//!        ┌─────────────┐
//!        │   Reading   │ ← Lines up to the first blank line
//!        └──────┬──────┘   (nothing read → Closed, no response)
//!               ▼
//!        ┌─────────────┐
//!        │   Parsing   │ ← Request line: tokens, method, then version
//!        └──────┬──────┘
//!               ▼
//!        ┌─────────────┐
//!        │  Resolving  │ ← Dynamic dispatch or resource resolver
//!        └──────┬──────┘
//!               ▼
//!        ┌─────────────┐
//!        │  Checking   │ ← If-Modified-Since, files only
//!        └──────┬──────┘
//!               ▼
//!        ┌─────────────┐
//!        │  Composing  │ ← Status, headers, body source
//!        └──────┬──────┘
//!               ▼
//!        ┌──────────────┐
//!        │ Transmitting │ ← Head, then body unless HEAD or 304
//!        └──────┬───────┘
//!               ▼
//!        ┌─────────────┐
//!        │   Logging   │ ← One access/error log record
//!        └──────┬──────┘
//!               ▼
//!            Closed
//! ```
//!
//! Parsing and resolution failures jump straight to `Composing` with an
//! error status. An I/O error at any stage closes the connection without a
//! log record.

pub mod connection;
pub mod mime;
pub mod parser;
pub mod request;
pub mod response;
pub mod writer;
