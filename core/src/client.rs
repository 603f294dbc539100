//! Document-database client: request building, execution and response parsing.
//!
//! # Design
//! `CouchClient` holds only the server's base URL and a `Transport`, neither of
//! which changes after construction. Each operation is split into a `build_*`
//! method producing an `HttpRequest` and a `parse_*` method consuming an
//! `HttpResponse`, so callers with their own HTTP stack can drive the pairs
//! directly. The blocking methods (`list_databases`, `get_document`, ...) run
//! build, one `Transport::execute`, then parse.
//!
//! Database names and document ids are percent-encoded as single path
//! segments.

use serde::de::IgnoredAny;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::transport::{Transport, TransportConfig, UreqTransport};
use crate::types::{AllDocs, DocumentInfo};

/// Body the server returns when a database was created or deleted.
pub const OK_MARKER: &str = r#"{"ok":true}"#;

const JSON: &str = "application/json";
const JAVASCRIPT: &str = "application/javascript";

/// Synchronous, stateless client for a document-database HTTP API.
#[derive(Debug, Clone)]
pub struct CouchClient<T = UreqTransport> {
    base_url: String,
    transport: T,
}

impl CouchClient<UreqTransport> {
    pub fn new(base_url: &str) -> Self {
        Self::with_transport(base_url, UreqTransport::new())
    }

    pub fn with_config(base_url: &str, config: &TransportConfig) -> Self {
        Self::with_transport(base_url, UreqTransport::with_config(config))
    }
}

impl<T> CouchClient<T> {
    pub fn with_transport(base_url: &str, transport: T) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            transport,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, segments: &[&str]) -> String {
        let mut url = self.base_url.clone();
        for segment in segments {
            url.push('/');
            url.push_str(&urlencoding::encode(segment));
        }
        url
    }

    pub fn build_list_databases(&self) -> HttpRequest {
        HttpRequest::new(HttpMethod::Get, self.url(&["_all_dbs"]))
    }

    /// Shared by `count_documents` and `list_documents`.
    pub fn build_all_docs(&self, db: &str) -> HttpRequest {
        HttpRequest::new(HttpMethod::Get, self.url(&[db, "_all_docs"]))
    }

    pub fn build_create_database(&self, db: &str) -> HttpRequest {
        HttpRequest::new(HttpMethod::Put, self.url(&[db]))
    }

    pub fn build_delete_database(&self, db: &str) -> HttpRequest {
        HttpRequest::new(HttpMethod::Delete, self.url(&[db]))
    }

    /// `view` is map/reduce script source and is sent verbatim.
    pub fn build_temp_view(&self, db: &str, view: &str) -> HttpRequest {
        HttpRequest::new(HttpMethod::Post, self.url(&[db, "_temp_view"])).with_body(view, JAVASCRIPT)
    }

    /// `content` is a JSON document and is sent verbatim.
    pub fn build_create_document(&self, db: &str, content: &str) -> HttpRequest {
        HttpRequest::new(HttpMethod::Post, self.url(&[db])).with_body(content, JSON)
    }

    pub fn build_get_document(&self, db: &str, doc_id: &str) -> HttpRequest {
        HttpRequest::new(HttpMethod::Get, self.url(&[db, doc_id]))
    }

    pub fn build_delete_document(&self, db: &str, doc_id: &str) -> HttpRequest {
        HttpRequest::new(HttpMethod::Delete, self.url(&[db, doc_id]))
    }

    pub fn parse_list_databases(&self, response: HttpResponse) -> Result<Vec<String>, ApiError> {
        let body = check_status(response)?;
        Ok(serde_json::from_str(&body)?)
    }

    pub fn parse_count_documents(&self, response: HttpResponse) -> Result<usize, ApiError> {
        #[derive(Deserialize)]
        struct Rows {
            rows: Vec<IgnoredAny>,
        }

        let body = check_status(response)?;
        let listing: Rows = serde_json::from_str(&body)?;
        Ok(listing.rows.len())
    }

    pub fn parse_list_documents(
        &self,
        response: HttpResponse,
    ) -> Result<Vec<DocumentInfo>, ApiError> {
        let body = check_status(response)?;
        let listing: AllDocs = serde_json::from_str(&body)?;
        Ok(listing.rows.into_iter().map(DocumentInfo::from).collect())
    }

    /// Succeeds only on the `{"ok":true}` marker, whatever the status.
    pub fn parse_create_database(&self, response: HttpResponse) -> Result<(), ApiError> {
        expect_ok(response)
    }

    /// Succeeds only on the `{"ok":true}` marker, whatever the status.
    pub fn parse_delete_database(&self, response: HttpResponse) -> Result<(), ApiError> {
        expect_ok(response)
    }

    pub fn parse_temp_view(&self, response: HttpResponse) -> Result<String, ApiError> {
        check_status(response)
    }

    /// The body, which names the assigned id and revision, is discarded.
    pub fn parse_create_document(&self, response: HttpResponse) -> Result<(), ApiError> {
        check_status(response).map(drop)
    }

    pub fn parse_get_document(&self, response: HttpResponse) -> Result<String, ApiError> {
        check_status(response)
    }

    pub fn parse_delete_document(&self, response: HttpResponse) -> Result<(), ApiError> {
        check_status(response).map(drop)
    }
}

impl<T: Transport> CouchClient<T> {
    fn request(&self, request: HttpRequest) -> Result<HttpResponse, ApiError> {
        debug!(
            method = %request.method,
            url = %request.url,
            bytes = request.body.as_ref().map_or(0, String::len),
            "sending request"
        );
        self.transport.execute(&request)
    }

    /// Names of all databases, in server order.
    pub fn list_databases(&self) -> Result<Vec<String>, ApiError> {
        let response = self.request(self.build_list_databases())?;
        self.parse_list_databases(response)
    }

    /// Number of rows in the database's full `_all_docs` listing.
    pub fn count_documents(&self, db: &str) -> Result<usize, ApiError> {
        let response = self.request(self.build_all_docs(db))?;
        self.parse_count_documents(response)
    }

    /// Id and revision of every document, in listing order.
    pub fn list_documents(&self, db: &str) -> Result<Vec<DocumentInfo>, ApiError> {
        let response = self.request(self.build_all_docs(db))?;
        self.parse_list_documents(response)
    }

    pub fn create_database(&self, db: &str) -> Result<(), ApiError> {
        let response = self.request(self.build_create_database(db))?;
        self.parse_create_database(response)
    }

    pub fn delete_database(&self, db: &str) -> Result<(), ApiError> {
        let response = self.request(self.build_delete_database(db))?;
        self.parse_delete_database(response)
    }

    /// Run an ad-hoc view and return the server's raw JSON result.
    pub fn temp_view(&self, db: &str, view: &str) -> Result<String, ApiError> {
        let response = self.request(self.build_temp_view(db, view))?;
        self.parse_temp_view(response)
    }

    pub fn create_document(&self, db: &str, content: &str) -> Result<(), ApiError> {
        let response = self.request(self.build_create_document(db, content))?;
        self.parse_create_document(response)
    }

    /// Raw JSON of the document exactly as the server sent it.
    pub fn get_document(&self, db: &str, doc_id: &str) -> Result<String, ApiError> {
        let response = self.request(self.build_get_document(db, doc_id))?;
        self.parse_get_document(response)
    }

    pub fn delete_document(&self, db: &str, doc_id: &str) -> Result<(), ApiError> {
        let response = self.request(self.build_delete_document(db, doc_id))?;
        self.parse_delete_document(response)
    }
}

/// Return the body of a 2xx response, otherwise `ApiError::HttpStatus`.
fn check_status(response: HttpResponse) -> Result<String, ApiError> {
    if response.is_success() {
        return Ok(response.body);
    }
    Err(ApiError::HttpStatus {
        status: response.status,
        body: response.body,
    })
}

fn expect_ok(response: HttpResponse) -> Result<(), ApiError> {
    // The server terminates the body with a newline.
    if response.body.trim_end() == OK_MARKER {
        return Ok(());
    }
    warn!(status = response.status, body = %response.body, "unexpected response");
    Err(ApiError::UnexpectedResponse(response.body))
}
