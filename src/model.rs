//! Types shared between the API client and the extraction pipeline.

use serde::Deserialize;
use serde_json::Value;

/// One trackable object type discovered in the tenant's catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryEntity {
    pub name: String,
    pub describe_uri: String,
    /// Field names in the order the describe endpoint returned them.
    pub fields: Vec<String>,
}

impl HistoryEntity {
    pub fn new(name: impl Into<String>, describe_uri: impl Into<String>, fields: Vec<String>) -> Self {
        Self {
            name: name.into(),
            describe_uri: describe_uri.into(),
            fields,
        }
    }
}

/// A batch of query results.
///
/// `next_records_url` is the continuation token; it is present iff more
/// records remain.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page {
    pub records: Vec<Value>,
    #[serde(default)]
    pub next_records_url: Option<String>,
    #[serde(default)]
    pub total_size: Option<u64>,
    #[serde(default)]
    pub done: Option<bool>,
}

impl Page {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// One field-history change, decoded and validated from a query record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeRecord {
    pub id: String,
    pub parent_reference: String,
    pub field: String,
    pub old_value: Option<String>,
    pub new_value: Option<String>,
    pub created_by_id: String,
    pub created_date: String,
    pub is_deleted: bool,
    pub record_url: String,
    pub record_type: String,
}

impl ChangeRecord {
    /// Project into the canonical column order used by the header row.
    pub fn into_row(self) -> Vec<String> {
        vec![
            self.id,
            self.old_value.unwrap_or_default(),
            self.new_value.unwrap_or_default(),
            self.field,
            self.created_by_id,
            self.created_date,
            self.record_url,
            self.record_type,
            self.is_deleted.to_string(),
            self.parent_reference,
        ]
    }
}

/// Global object catalog (`/sobjects/`).
#[derive(Debug, Clone, Deserialize)]
pub struct Catalog {
    pub sobjects: Vec<CatalogEntry>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CatalogEntry {
    pub name: String,
    pub urls: CatalogUrls,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CatalogUrls {
    pub describe: String,
}

/// Field metadata for one object (`/sobjects/<name>/describe`).
#[derive(Debug, Clone, Deserialize)]
pub struct DescribeResult {
    pub fields: Vec<FieldDescribe>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FieldDescribe {
    pub name: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_page_with_continuation() {
        let page: Page = serde_json::from_value(json!({
            "totalSize": 4000,
            "done": false,
            "nextRecordsUrl": "/services/data/v37.0/query/01gD0000002HU6KIAW-2000",
            "records": [{"Id": "017r00000471xrmAAA"}]
        }))
        .unwrap();

        assert_eq!(page.len(), 1);
        assert_eq!(page.total_size, Some(4000));
        assert_eq!(
            page.next_records_url.as_deref(),
            Some("/services/data/v37.0/query/01gD0000002HU6KIAW-2000")
        );
    }

    #[test]
    fn test_page_requires_records() {
        let result: Result<Page, _> = serde_json::from_value(json!({"done": true}));
        assert!(result.is_err());
    }

    #[test]
    fn test_row_projection_order() {
        let record = ChangeRecord {
            id: "017".to_string(),
            parent_reference: "001".to_string(),
            field: "Name".to_string(),
            old_value: None,
            new_value: Some("Acme".to_string()),
            created_by_id: "005".to_string(),
            created_date: "2018-12-18T18:49:40.000+0000".to_string(),
            is_deleted: false,
            record_url: "/services/data/v37.0/sobjects/AccountHistory/017".to_string(),
            record_type: "AccountHistory".to_string(),
        };

        assert_eq!(
            record.into_row(),
            vec![
                "017",
                "",
                "Acme",
                "Name",
                "005",
                "2018-12-18T18:49:40.000+0000",
                "/services/data/v37.0/sobjects/AccountHistory/017",
                "AccountHistory",
                "false",
                "001",
            ]
        );
    }
}
