//! Extraction orchestration
//!
//! One run authenticates, discovers history entities and then extracts them
//! one at a time. A failure while extracting an entity ends that entity only.

use super::cursor;
use super::sink::{PageOutcome, RecordSink};
use crate::client::{SalesforceClient, Transport};
use crate::error::Result;
use crate::model::HistoryEntity;
use crate::storage::OutputLayout;
use std::path::PathBuf;

/// Outcome of extracting a single entity.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntityReport {
    pub entity: String,
    /// Extraction file, if it was created.
    pub path: Option<PathBuf>,
    pub pages_fetched: usize,
    pub rows_written: usize,
    pub pages_skipped: usize,
    /// Why extraction stopped early.
    pub error: Option<String>,
}

impl EntityReport {
    fn new(entity: &str) -> Self {
        Self {
            entity: entity.to_string(),
            ..Self::default()
        }
    }

    fn record(&mut self, outcome: &PageOutcome) {
        self.rows_written += outcome.rows_written();
        if outcome.is_skipped() {
            self.pages_skipped += 1;
        }
    }

    /// Every page was fetched and written.
    pub fn is_complete(&self) -> bool {
        self.error.is_none() && self.pages_skipped == 0
    }
}

/// Reports for every entity of a run, in processing order.
#[derive(Debug, Clone, Default)]
pub struct RunSummary {
    pub entities: Vec<EntityReport>,
}

impl RunSummary {
    pub fn rows_written(&self) -> usize {
        self.entities.iter().map(|e| e.rows_written).sum()
    }

    pub fn failed(&self) -> impl Iterator<Item = &EntityReport> {
        self.entities.iter().filter(|e| e.error.is_some())
    }

    pub fn degraded(&self) -> impl Iterator<Item = &EntityReport> {
        self.entities
            .iter()
            .filter(|e| e.error.is_none() && e.pages_skipped > 0)
    }
}

/// Field history extraction for one tenant.
///
/// # Example
/// ```no_run
/// use field_history_extractor::client::{ReqwestTransport, SalesforceClient};
/// use field_history_extractor::config::CredentialStore;
/// use field_history_extractor::etl::Extraction;
/// use field_history_extractor::storage::{OutputLayout, RunStamp};
///
/// # async fn example() -> eyre::Result<()> {
/// let tenant = CredentialStore::read(".env")?.tenant("acme")?;
/// let layout = OutputLayout::new("data", tenant.host()?, RunStamp::now());
/// let client = SalesforceClient::try_new(tenant, ReqwestTransport::try_new()?)?;
///
/// let mut extraction = Extraction::new(client, layout);
/// let summary = extraction.run().await?;
/// println!("Wrote {} rows", summary.rows_written());
/// # Ok(())
/// # }
/// ```
pub struct Extraction<T> {
    client: SalesforceClient<T>,
    layout: OutputLayout,
}

impl<T: Transport> Extraction<T> {
    pub fn new(client: SalesforceClient<T>, layout: OutputLayout) -> Self {
        Self { client, layout }
    }

    pub fn client(&self) -> &SalesforceClient<T> {
        &self.client
    }

    pub fn layout(&self) -> &OutputLayout {
        &self.layout
    }

    /// Run the complete extraction
    ///
    /// Steps:
    /// 1. Authenticate
    /// 2. Discover history entities
    /// 3. Extract each entity into its own file
    ///
    /// # Errors
    /// Authentication and catalog failures abort the run. Failures while
    /// extracting an entity are logged and recorded in its [`EntityReport`].
    pub async fn run(&mut self) -> Result<RunSummary> {
        log::info!("Starting field history extraction");

        self.client.authenticate().await?;
        let entities = self.client.list_candidate_entities().await?;

        if entities.is_empty() {
            log::warn!("No field history entities found, extraction complete");
            return Ok(RunSummary::default());
        }

        let mut summary = RunSummary::default();
        for entity in &entities {
            log::info!("Processing: {}", entity.name);
            let mut report = EntityReport::new(&entity.name);

            match self.extract_entity(entity, &mut report).await {
                Ok(()) => log::info!(
                    "Extracted {} row(s) from {} page(s) of {}",
                    report.rows_written,
                    report.pages_fetched,
                    entity.name
                ),
                Err(e) if e.is_fatal() => return Err(e),
                Err(e) => {
                    log::warn!("Stopped extracting {}: {}", entity.name, e);
                    report.error = Some(e.to_string());
                }
            }

            summary.entities.push(report);
        }

        log::info!(
            "Extraction complete: {} row(s) across {} entities",
            summary.rows_written(),
            summary.entities.len()
        );
        Ok(summary)
    }

    /// Extract one entity: header, first page, then follow continuation
    /// tokens until a page arrives without one.
    pub async fn extract_entity(
        &self,
        entity: &HistoryEntity,
        report: &mut EntityReport,
    ) -> Result<()> {
        let sink = RecordSink::create(self.layout.entity_path(&entity.name), entity)?;
        report.path = Some(sink.path().to_path_buf());
        log::debug!("New file created at {}", sink.path().display());

        sink.write_header()?;

        let mut page = self.client.query(&entity.fields, &entity.name).await?;
        loop {
            report.pages_fetched += 1;
            let outcome = sink.write_records(&page)?;
            report.record(&outcome);

            let Some(token) = cursor::next_token(&page).map(str::to_owned) else {
                break;
            };
            page = self.client.fetch_next(&token).await?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::transport::HttpResponse;
    use crate::client::transport::mock::ScriptedTransport;
    use crate::config::CredentialStore;
    use crate::storage::RunStamp;
    use serde_json::{Value, json};
    use tempfile::TempDir;

    const CATALOG: &str = "/services/data/v37.0/sobjects/";
    const QUERY: &str = "/services/data/v37.0/queryAll";

    fn client(transport: ScriptedTransport) -> SalesforceClient<ScriptedTransport> {
        let tenant = CredentialStore::from_json(
            r#"{"acme": {
                "username": "u", "password": "p", "securityToken": "t",
                "consumerKey": "k", "consumerSecret": "s",
                "salesforceURL": "acme.my.salesforce.com"
            }}"#,
        )
        .unwrap()
        .tenant("acme")
        .unwrap();
        SalesforceClient::try_new(tenant, transport).unwrap()
    }

    fn catalog(names: &[&str]) -> Value {
        json!({"sobjects": names.iter().map(|n| json!({
            "name": n,
            "urls": {"describe": format!("/services/data/v37.0/sobjects/{}/describe", n)}
        })).collect::<Vec<_>>()})
    }

    fn describe(parent: &str) -> Value {
        let names = [
            "Id",
            "IsDeleted",
            parent,
            "CreatedById",
            "CreatedDate",
            "Field",
            "OldValue",
            "NewValue",
        ];
        let fields: Vec<Value> = names.iter().map(|f| json!({"name": f})).collect();
        json!({ "fields": fields })
    }

    fn record(id: &str, parent: &str) -> Value {
        json!({
            "attributes": {"type": "CaseHistory", "url": format!("/x/{}", id)},
            "Id": id, "IsDeleted": false, (parent): "500A",
            "CreatedById": "005A", "CreatedDate": "2020-01-01T00:00:00.000+0000",
            "Field": "Status", "OldValue": "New", "NewValue": "Closed"
        })
    }

    fn base(names: &[&str]) -> ScriptedTransport {
        ScriptedTransport::new()
            .json("/services/oauth2/token", json!({"access_token": "tok"}))
            .json(CATALOG, catalog(names))
    }

    fn layout(dir: &TempDir) -> OutputLayout {
        OutputLayout::new(dir.path(), "acme.my.salesforce.com", RunStamp::now())
    }

    #[tokio::test]
    async fn test_follows_tokens_until_exhausted() {
        let transport = base(&["CaseHistory"])
            .json("/services/data/v37.0/sobjects/CaseHistory/describe", describe("CaseId"))
            .json(QUERY, json!({"records": [record("1", "CaseId")], "nextRecordsUrl": "/services/data/v37.0/query/c-1"}))
            .json("/services/data/v37.0/query/c-1", json!({"records": [record("2", "CaseId")], "nextRecordsUrl": "/services/data/v37.0/query/c-2"}))
            .json("/services/data/v37.0/query/c-2", json!({"records": [record("3", "CaseId")], "done": true}));

        let temp_dir = TempDir::new().unwrap();
        let mut extraction = Extraction::new(client(transport), layout(&temp_dir));
        let summary = extraction.run().await.unwrap();

        assert_eq!(summary.entities.len(), 1);
        let report = &summary.entities[0];
        assert!(report.is_complete());
        assert_eq!(report.pages_fetched, 3);
        assert_eq!(report.rows_written, 3);

        let transport = extraction.client().transport();
        assert_eq!(transport.requests_to(QUERY), 1);
        assert_eq!(transport.requests_to("/services/data/v37.0/query/c-1"), 1);
        assert_eq!(transport.requests_to("/services/data/v37.0/query/c-2"), 1);
        // token, catalog, describe, query, two follow-ups
        assert_eq!(transport.requests().len(), 6);
    }

    #[tokio::test]
    async fn test_malformed_page_isolated_to_entity() {
        let transport = base(&["CaseHistory", "LeadHistory"])
            .json("/services/data/v37.0/sobjects/CaseHistory/describe", describe("CaseId"))
            .json("/services/data/v37.0/sobjects/LeadHistory/describe", describe("LeadId"))
            .route(QUERY, HttpResponse::ok("upstream connect error"))
            .json(QUERY, json!({"records": [record("9", "LeadId")]}));

        let temp_dir = TempDir::new().unwrap();
        let mut extraction = Extraction::new(client(transport), layout(&temp_dir));
        let summary = extraction.run().await.unwrap();

        assert_eq!(summary.entities.len(), 2);
        let case = &summary.entities[0];
        assert!(case.error.as_deref().unwrap().contains("upstream connect error"));
        assert_eq!(case.pages_fetched, 0);
        assert!(case.path.as_ref().unwrap().exists());

        let lead = &summary.entities[1];
        assert!(lead.is_complete());
        assert_eq!(lead.rows_written, 1);
        assert_eq!(summary.failed().count(), 1);
    }

    #[tokio::test]
    async fn test_ambiguous_schema_skips_entity_without_file() {
        let ambiguous = json!({"fields": [
            {"name": "Id"}, {"name": "CaseId"}, {"name": "DataType"}, {"name": "Field"}
        ]});
        let transport = base(&["CaseHistory"])
            .json("/services/data/v37.0/sobjects/CaseHistory/describe", ambiguous);

        let temp_dir = TempDir::new().unwrap();
        let mut extraction = Extraction::new(client(transport), layout(&temp_dir));
        let summary = extraction.run().await.unwrap();

        let report = &summary.entities[0];
        assert!(report.path.is_none());
        assert!(report.error.as_deref().unwrap().contains("CaseId, DataType"));
        assert_eq!(extraction.client().transport().requests_to(QUERY), 0);
    }

    #[tokio::test]
    async fn test_skipped_page_keeps_paginating() {
        let mut broken = record("2", "ParentId");
        broken.as_object_mut().unwrap().remove("Field");
        let transport = base(&["Custom__History"])
            .json("/services/data/v37.0/sobjects/Custom__History/describe", describe("ParentId"))
            .json(QUERY, json!({"records": [broken], "nextRecordsUrl": "/services/data/v37.0/query/p-1"}))
            .json("/services/data/v37.0/query/p-1", json!({"records": [record("3", "ParentId")]}));

        let temp_dir = TempDir::new().unwrap();
        let mut extraction = Extraction::new(client(transport), layout(&temp_dir));
        let summary = extraction.run().await.unwrap();

        let report = &summary.entities[0];
        assert!(report.error.is_none());
        assert!(!report.is_complete());
        assert_eq!(report.pages_fetched, 2);
        assert_eq!(report.pages_skipped, 1);
        assert_eq!(report.rows_written, 1);
        assert_eq!(summary.degraded().count(), 1);
    }

    #[tokio::test]
    async fn test_authentication_failure_aborts_run() {
        let transport = ScriptedTransport::new().route(
            "/services/oauth2/token",
            HttpResponse::new(400, r#"{"error":"invalid_grant","error_description":"authentication failure"}"#),
        );

        let temp_dir = TempDir::new().unwrap();
        let mut extraction = Extraction::new(client(transport), layout(&temp_dir));
        let err = extraction.run().await.unwrap_err();

        assert!(err.is_fatal());
        assert_eq!(extraction.client().transport().requests_to(CATALOG), 0);
    }
}
