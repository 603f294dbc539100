//! Wire and domain types for the document-database API.
//!
//! `AllDocs` mirrors the `_all_docs` listing as the server sends it;
//! `DocumentInfo` is the projection handed to callers.

use serde::Deserialize;

/// Identity of one stored document: its id and current revision.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DocumentInfo {
    pub id: String,
    pub revision: String,
}

/// Response body of `GET /{db}/_all_docs`. Fields other than `rows` are
/// ignored.
#[derive(Debug, Clone, Deserialize)]
pub struct AllDocs {
    pub rows: Vec<AllDocsRow>,
}

/// One row of an `_all_docs` listing.
#[derive(Debug, Clone, Deserialize)]
pub struct AllDocsRow {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(rename = "_rev")]
    pub rev: String,
}

impl From<AllDocsRow> for DocumentInfo {
    fn from(row: AllDocsRow) -> Self {
        Self {
            id: row.id,
            revision: row.rev,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_docs_ignores_extra_fields() {
        let listing: AllDocs = serde_json::from_str(
            r#"{"total_rows":1,"offset":0,"rows":[{"_id":"a","_rev":"1-x","key":"a","value":{"rev":"1-x"}}]}"#,
        )
        .unwrap();
        assert_eq!(listing.rows.len(), 1);
        assert_eq!(listing.rows[0].id, "a");
        assert_eq!(listing.rows[0].rev, "1-x");
    }

    #[test]
    fn row_without_rev_is_rejected() {
        let result: Result<AllDocs, _> = serde_json::from_str(r#"{"rows":[{"_id":"a"}]}"#);
        assert!(result.is_err());
    }

    #[test]
    fn row_converts_to_document_info() {
        let info = DocumentInfo::from(AllDocsRow {
            id: "doc".to_string(),
            rev: "2-abc".to_string(),
        });
        assert_eq!(
            info,
            DocumentInfo {
                id: "doc".to_string(),
                revision: "2-abc".to_string(),
            }
        );
    }
}
