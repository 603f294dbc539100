//! Synchronous client for a document-database HTTP API.
//!
//! # Overview
//! Lists, creates and deletes databases; lists, counts, creates, fetches and
//! deletes documents; runs temporary views. Every operation is one blocking
//! HTTP exchange followed by a JSON parse, with no caching and no retries.
//!
//! # Design
//! - `CouchClient` is stateless. It holds the base URL and a `Transport`,
//!   both fixed at construction.
//! - Each operation is split into `build_*` (produces an `HttpRequest`) and
//!   `parse_*` (consumes an `HttpResponse`). The blocking methods join them
//!   through the transport; callers with their own HTTP stack can use the
//!   pairs directly.
//! - `UreqTransport` is the default transport. Statuses are returned as data
//!   and interpreted by the client.
//! - Failures are one `ApiError` enum, classified by `ApiError::kind`.
//!
//! ```no_run
//! use couch_core::CouchClient;
//!
//! let client = CouchClient::new("http://localhost:5984");
//! client.create_database("albums")?;
//! client.create_document("albums", r#"{"_id":"blue","artist":"Joni Mitchell"}"#)?;
//! for doc in client.list_documents("albums")? {
//!     println!("{} @ {}", doc.id, doc.revision);
//! }
//! # Ok::<(), couch_core::ApiError>(())
//! ```

pub mod client;
pub mod error;
pub mod http;
pub mod transport;
pub mod types;

pub use client::{CouchClient, OK_MARKER};
pub use error::{ApiError, ErrorKind};
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use transport::{Transport, TransportConfig, UreqTransport};
pub use types::DocumentInfo;
