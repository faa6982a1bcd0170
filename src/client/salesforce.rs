//! Salesforce REST client
//!
//! Provides [`SalesforceClient`], which authenticates once per run and then
//! serves catalog, describe and query requests with the stored bearer token.

use super::auth::{AccessToken, PasswordGrant, TOKEN_PATH};
use super::transport::Transport;
use crate::config::TenantConfig;
use crate::error::{Error, Result};
use crate::etl::query::build_query;
use crate::model::{Catalog, CatalogEntry, DescribeResult, HistoryEntity, Page};
use serde::de::DeserializeOwned;
use serde_json::Value;
use url::Url;

/// Objects that record field history all end with this suffix.
pub const HISTORY_SUFFIX: &str = "History";

/// Objects ending in [`HISTORY_SUFFIX`] that are not field history tables.
pub const NON_HISTORY_ENTITIES: &[&str] = &[
    "ActivityHistory",
    "Application__VersionHistory",
    "Blog__VersionHistory",
    "KnowledgeArticleVersionHistory",
    "LinkedArticleHistory",
    "LoginHistory",
    "OpportunityHistory",
    "ProcessInstanceHistory",
    "Product2History",
    "Publication__VersionHistory",
    "VerificationHistory",
];

pub fn is_history_candidate(name: &str) -> bool {
    name.ends_with(HISTORY_SUFFIX) && !NON_HISTORY_ENTITIES.contains(&name)
}

/// Catalog entries worth describing, in catalog order.
pub fn filter_candidates(catalog: &Catalog) -> Vec<&CatalogEntry> {
    catalog
        .sobjects
        .iter()
        .filter(|entry| is_history_candidate(&entry.name))
        .collect()
}

/// Salesforce client for one tenant.
///
/// Every data method requires a prior successful [`authenticate`](Self::authenticate).
///
/// # Example
/// ```no_run
/// use field_history_extractor::client::{ReqwestTransport, SalesforceClient};
/// use field_history_extractor::config::CredentialStore;
///
/// # async fn example() -> eyre::Result<()> {
/// let tenant = CredentialStore::read(".env")?.tenant("acme")?;
/// let mut client = SalesforceClient::try_new(tenant, ReqwestTransport::try_new()?)?;
/// client.authenticate().await?;
///
/// for entity in client.list_candidate_entities().await? {
///     let page = client.query(&entity.fields, &entity.name).await?;
///     println!("{}: {} records", entity.name, page.len());
/// }
/// # Ok(())
/// # }
/// ```
pub struct SalesforceClient<T> {
    transport: T,
    tenant: TenantConfig,
    base_url: Url,
    token: Option<AccessToken>,
}

impl<T: Transport> SalesforceClient<T> {
    pub fn try_new(tenant: TenantConfig, transport: T) -> Result<Self> {
        let base_url = tenant.base_url()?;
        Ok(Self {
            transport,
            tenant,
            base_url,
            token: None,
        })
    }

    pub fn tenant(&self) -> &TenantConfig {
        &self.tenant
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    /// Exchange the tenant credentials for a bearer token.
    ///
    /// The token is kept for the rest of the run and never refreshed.
    pub async fn authenticate(&mut self) -> Result<()> {
        if self.token.is_some() {
            log::debug!("Already authenticated against {}", self.base_url);
            return Ok(());
        }

        let url = self.endpoint(TOKEN_PATH)?;
        let grant = PasswordGrant::new(&self.tenant);
        log::info!("Authenticating {} at {}", self.tenant.username, self.base_url);

        let response = self.transport.post_form(&url, &grant.form()).await?;
        let token = AccessToken::from_response(response.status, &response.body)?;
        self.token = Some(token);

        log::debug!("Authenticated against {}", self.base_url);
        Ok(())
    }

    /// Fetch the global object catalog.
    pub async fn catalog(&self) -> Result<Catalog> {
        let path = format!("/services/data/{}/sobjects/", self.tenant.api_version());
        let url = self.endpoint(&path)?;
        self.get_json(url, "object catalog").await
    }

    /// Discover all field history entities and their field lists.
    ///
    /// Candidates whose describe call fails are skipped with a warning.
    pub async fn list_candidate_entities(&self) -> Result<Vec<HistoryEntity>> {
        let catalog = self.catalog().await?;
        log::debug!("Catalog lists {} objects", catalog.sobjects.len());

        let mut entities = Vec::new();
        for entry in filter_candidates(&catalog) {
            match self.describe(&entry.urls.describe).await {
                Ok(described) => {
                    let fields = Self::list_fields(&described);
                    log::debug!("{} fields: {}", entry.name, fields.join(","));
                    entities.push(HistoryEntity::new(
                        entry.name.clone(),
                        entry.urls.describe.clone(),
                        fields,
                    ));
                }
                Err(e) if e.is_fatal() => return Err(e),
                Err(e) => log::warn!("Skipping {}: {}", entry.name, e),
            }
        }

        log::info!("Discovered {} history entities", entities.len());
        Ok(entities)
    }

    /// Fetch field metadata from a catalog-supplied describe URI.
    pub async fn describe(&self, uri: &str) -> Result<DescribeResult> {
        let url = self.server_url(uri, "describe uri")?;
        self.get_json(url, &format!("describe {}", uri)).await
    }

    /// Field names in server order.
    pub fn list_fields(described: &DescribeResult) -> Vec<String> {
        described.fields.iter().map(|f| f.name.clone()).collect()
    }

    /// Run a `queryAll` for the given fields and return the first page.
    pub async fn query(&self, fields: &[String], entity: &str) -> Result<Page> {
        let path = format!("/services/data/{}/queryAll", self.tenant.api_version());
        let mut url = self.endpoint(&path)?;
        let soql = build_query(fields, entity);
        log::debug!("Query: {}", soql);
        url.query_pairs_mut().append_pair("q", &soql);

        self.get_json(url, &format!("query {}", entity)).await
    }

    /// Follow a continuation token (a `nextRecordsUrl` path) to the next page.
    pub async fn fetch_next(&self, token: &str) -> Result<Page> {
        log::debug!("Fetching the next records at {}", token);
        let url = self.server_url(token, "continuation token")?;
        self.get_json(url, &format!("next page {}", token)).await
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        self.base_url.join(path).map_err(|e| {
            Error::Configuration(format!("cannot build URL {}{}: {}", self.base_url, path, e))
        })
    }

    /// Resolve a server-supplied URI against the tenant, refusing any that
    /// points at another scheme, host or port.
    fn server_url(&self, uri: &str, what: &str) -> Result<Url> {
        let url = self
            .base_url
            .join(uri)
            .map_err(|_| Error::malformed(what, uri))?;
        if url.origin() != self.base_url.origin() {
            log::warn!("Refusing {} outside {}: {}", what, self.base_url, uri);
            return Err(Error::malformed(
                format!("{} outside the tenant host", what),
                uri,
            ));
        }
        Ok(url)
    }

    /// GET `url` and decode a JSON object response into `D`.
    async fn get_json<D: DeserializeOwned>(&self, url: Url, context: &str) -> Result<D> {
        let token = self.token.as_ref().ok_or(Error::NotAuthenticated)?;
        let response = self.transport.get(&url, token.as_str()).await?;
        log::trace!("{} response: {}", context, response.body);

        if !response.is_success() {
            return Err(Error::malformed(
                format!("{} (HTTP {})", context, response.status),
                response.body,
            ));
        }

        let value: Value = serde_json::from_str(&response.body)
            .map_err(|_| Error::malformed(context, &response.body))?;
        if !value.is_object() {
            return Err(Error::malformed(context, response.body));
        }
        serde_json::from_value(value).map_err(|_| Error::malformed(context, response.body))
    }
}
