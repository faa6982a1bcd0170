//! CLI helper functions

use crate::{
    client::{ReqwestTransport, SalesforceClient},
    config::{CredentialStore, TenantConfig},
    etl::{Extraction, RunSummary},
    storage::{OutputLayout, RunStamp},
};
use eyre::{Context, Result};
use owo_colors::OwoColorize;
use std::path::Path;

/// Load one tenant's credentials from the credential file.
pub fn load_tenant(credentials: impl AsRef<Path>, key: &str) -> Result<TenantConfig> {
    let credentials = credentials.as_ref();
    let store = CredentialStore::read(credentials)?;
    store
        .tenant(key)
        .with_context(|| format!("Failed to load tenant from {}", credentials.display()))
}

/// Tenant keys stored in the credential file.
pub fn list_tenants(credentials: impl AsRef<Path>) -> Result<Vec<String>> {
    let store = CredentialStore::read(credentials)?;
    Ok(store.keys().into_iter().map(str::to_string).collect())
}

/// Extract all field history for a tenant into `output_dir`.
///
/// Pipeline: authenticate → discover → per entity query/paginate → CSV
pub async fn extract(
    credentials: impl AsRef<Path>,
    tenant_key: &str,
    output_dir: impl AsRef<Path>,
    stamp: RunStamp,
) -> Result<RunSummary> {
    let tenant = load_tenant(credentials, tenant_key)?;
    let host = tenant.host()?;
    let layout = OutputLayout::new(output_dir, &host, stamp);

    log::info!(
        "Fetching history from {}. Data will be stored in {}",
        tenant_key.cyan(),
        layout.run_dir().display().bright_black()
    );

    let transport = ReqwestTransport::try_new()?;
    let client = SalesforceClient::try_new(tenant, transport)?;
    let mut extraction = Extraction::new(client, layout);

    let summary = extraction
        .run()
        .await
        .with_context(|| format!("Extraction from {} failed", host))?;
    Ok(summary)
}

/// Log one line per entity and a total.
pub fn report(summary: &RunSummary) {
    for entity in &summary.entities {
        let path = entity
            .path
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "-".to_string());
        match &entity.error {
            Some(error) => log::warn!("✗ {}: {}", entity.entity.red(), error),
            None if entity.pages_skipped > 0 => log::warn!(
                "! {}: {} row(s), {} page(s) skipped → {}",
                entity.entity.yellow(),
                entity.rows_written,
                entity.pages_skipped,
                path.bright_black()
            ),
            None => log::info!(
                "✓ {}: {} row(s) → {}",
                entity.entity.green(),
                entity.rows_written,
                path.bright_black()
            ),
        }
    }
    log::info!(
        "{} row(s) from {} entities",
        summary.rows_written(),
        summary.entities.len()
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn credentials() -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{
                "sandbox": {{"username": "u", "password": "p", "securityToken": "t",
                    "consumerKey": "k", "consumerSecret": "s", "salesforceURL": "acme--dev.sandbox.my.salesforce.com"}},
                "prod": {{"username": "u", "password": "p", "securityToken": "t",
                    "consumerKey": "k", "consumerSecret": "s", "salesforceURL": "acme.my.salesforce.com"}}
            }}"#
        )
        .unwrap();
        file
    }

    #[test]
    fn test_list_tenants() {
        let file = credentials();
        assert_eq!(list_tenants(file.path()).unwrap(), vec!["prod", "sandbox"]);
    }

    #[test]
    fn test_load_tenant() {
        let file = credentials();
        let tenant = load_tenant(file.path(), "sandbox").unwrap();
        assert_eq!(tenant.host().unwrap(), "acme--dev.sandbox.my.salesforce.com");
        assert!(load_tenant(file.path(), "staging").is_err());
    }

    #[tokio::test]
    async fn test_extract_fails_before_network_for_unknown_tenant() {
        let file = credentials();
        let out = tempfile::TempDir::new().unwrap();
        let err = extract(file.path(), "staging", out.path(), RunStamp::now())
            .await
            .unwrap_err();
        assert!(
            err.chain()
                .any(|cause| cause.to_string().contains("unknown tenant 'staging'"))
        );
        assert!(std::fs::read_dir(out.path()).unwrap().next().is_none());
    }
}
