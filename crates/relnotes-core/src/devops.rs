//! Azure DevOps work-tracking client.
//!
//! Executes a saved query to find the work items flagged for release, then
//! fetches the title and description of each one. All requests are blocking
//! and issued one at a time, in order.

use std::collections::HashMap;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use relnotes_models::{WorkItem, WorkItemId};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::StatusCode;
use serde::Deserialize;
use tracing::{debug, info, warn};
use url::Url;

use crate::config::Credentials;
use crate::error::{ReleaseNotesError, Result};

/// REST API version requested on every call.
pub const API_VERSION: &str = "7.1";

/// Default Azure DevOps host.
pub const DEFAULT_HOST: &str = "https://dev.azure.com";

/// Content type sent on every request.
const REQUEST_CONTENT_TYPE: &str = "application/json-patch+json";

/// Field holding the work item title.
pub const TITLE_FIELD: &str = "System.Title";

/// Field holding the work item description.
pub const DESCRIPTION_FIELD: &str = "System.Description";

/// Source of work items flagged for release.
pub trait WorkItemSource {
    /// Run a saved query and return the identifiers it yields, in order.
    fn fetch_item_identifiers(&self, query_id: &str) -> Result<Vec<WorkItemId>>;

    /// Fetch title and description for each identifier, preserving order.
    ///
    /// Stops at the first item that cannot be looked up.
    fn fetch_item_details(&self, ids: &[WorkItemId]) -> Result<Vec<WorkItem>>;
}

impl<S: WorkItemSource + ?Sized> WorkItemSource for &S {
    fn fetch_item_identifiers(&self, query_id: &str) -> Result<Vec<WorkItemId>> {
        (**self).fetch_item_identifiers(query_id)
    }

    fn fetch_item_details(&self, ids: &[WorkItemId]) -> Result<Vec<WorkItem>> {
        (**self).fetch_item_details(ids)
    }
}

/// Result of executing a saved query.
///
/// Link queries nest each item under `workItemRelations[].target`; flat
/// queries list them directly under `workItems[]`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryResult {
    /// Either `workItemLink` or `workItem`.
    pub query_result_type: String,

    /// Populated for link queries.
    #[serde(default)]
    pub work_item_relations: Vec<WorkItemLink>,

    /// Populated for flat queries.
    #[serde(default)]
    pub work_items: Vec<WorkItemReference>,
}

/// One relation in a link query result.
#[derive(Debug, Clone, Deserialize)]
pub struct WorkItemLink {
    /// Link type, absent for top-level rows.
    #[serde(default)]
    pub rel: Option<String>,

    /// Linked-from item, absent for top-level rows.
    #[serde(default)]
    pub source: Option<WorkItemReference>,

    /// Linked-to item.
    pub target: WorkItemReference,
}

/// Reference to a work item inside a query result.
#[derive(Debug, Clone, Deserialize)]
pub struct WorkItemReference {
    /// Work item identifier.
    pub id: u64,

    /// REST URL of the work item.
    #[serde(default)]
    pub url: Option<String>,
}

impl QueryResult {
    /// Extract work item identifiers in payload order.
    ///
    /// An unrecognized `queryResultType` yields an empty list rather than an
    /// error.
    pub fn work_item_ids(&self) -> Vec<WorkItemId> {
        match self.query_result_type.as_str() {
            "workItemLink" => self
                .work_item_relations
                .iter()
                .map(|link| WorkItemId(link.target.id))
                .collect(),
            "workItem" => self
                .work_items
                .iter()
                .map(|item| WorkItemId(item.id))
                .collect(),
            other => {
                warn!(query_result_type = %other, "Unrecognized query result type, no items extracted");
                Vec::new()
            }
        }
    }
}

/// Response of the per-item endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct WorkItemResponse {
    /// Identifier echoed by the service.
    #[serde(default)]
    pub id: Option<u64>,

    /// Field reference name to value.
    #[serde(default)]
    pub fields: Option<HashMap<String, serde_json::Value>>,
}

impl WorkItemResponse {
    /// Build a [`WorkItem`] from this response.
    ///
    /// The title is required. A missing or null description becomes empty.
    pub fn into_work_item(self, id: WorkItemId) -> Result<WorkItem> {
        let lookup_error = |reason: String| ReleaseNotesError::DetailLookup { id, reason };

        let fields = self
            .fields
            .ok_or_else(|| lookup_error("response has no fields".into()))?;

        let title = match fields.get(TITLE_FIELD) {
            Some(serde_json::Value::String(title)) => title.clone(),
            Some(other) => {
                return Err(lookup_error(format!(
                    "{} is not a string: {}",
                    TITLE_FIELD, other
                )))
            }
            None => return Err(lookup_error(format!("missing field {}", TITLE_FIELD))),
        };

        let description = match fields.get(DESCRIPTION_FIELD) {
            Some(serde_json::Value::String(description)) => description.clone(),
            Some(serde_json::Value::Null) | None => String::new(),
            Some(other) => {
                return Err(lookup_error(format!(
                    "{} is not a string: {}",
                    DESCRIPTION_FIELD, other
                )))
            }
        };

        Ok(WorkItem::new(id, title, description))
    }
}

/// Encode a personal access token for HTTP basic authentication.
///
/// The service expects an empty user name, so the encoded value is
/// `base64(":" + token)`.
pub fn encode_pat(token: &str) -> String {
    STANDARD.encode(format!(":{}", token))
}

fn default_headers(token: &str) -> Result<HeaderMap> {
    let mut auth = HeaderValue::from_str(&format!("Basic {}", encode_pat(token)))
        .map_err(|e| ReleaseNotesError::Config(format!("invalid personal access token: {}", e)))?;
    auth.set_sensitive(true);

    let mut headers = HeaderMap::new();
    headers.insert(AUTHORIZATION, auth);
    headers.insert(CONTENT_TYPE, HeaderValue::from_static(REQUEST_CONTENT_TYPE));
    Ok(headers)
}

/// Blocking Azure DevOps REST client.
///
/// The authorization and content-type headers are fixed at construction and
/// reused read-only for every request.
#[derive(Debug, Clone)]
pub struct DevOpsClient {
    http: reqwest::blocking::Client,
    base_url: Url,
}

impl DevOpsClient {
    /// Create a client for `https://dev.azure.com/{organization}/{project}`.
    pub fn new(credentials: &Credentials) -> Result<Self> {
        Self::with_host(DEFAULT_HOST, credentials)
    }

    /// Create a client against a different host, such as an on-premises
    /// server.
    pub fn with_host(host: &str, credentials: &Credentials) -> Result<Self> {
        let mut base_url = Url::parse(host)
            .map_err(|e| ReleaseNotesError::Config(format!("invalid host {}: {}", host, e)))?;
        base_url
            .path_segments_mut()
            .map_err(|_| ReleaseNotesError::Config(format!("host cannot be a base URL: {}", host)))?
            .pop_if_empty()
            .push(&credentials.organization)
            .push(&credentials.project);

        let http = reqwest::blocking::Client::builder()
            .default_headers(default_headers(&credentials.personal_access_token)?)
            .timeout(None::<std::time::Duration>)
            .build()
            .map_err(|e| ReleaseNotesError::Http(e.to_string()))?;

        Ok(Self { http, base_url })
    }

    /// Organization/project URL all endpoints hang off.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// URL of the saved query execution endpoint.
    pub fn query_url(&self, query_id: &str) -> Result<Url> {
        self.endpoint(&["_apis", "wit", "wiql", query_id])
    }

    /// URL of the per-item endpoint.
    pub fn item_url(&self, id: WorkItemId) -> Result<Url> {
        self.endpoint(&["_apis", "wit", "workitems", &id.to_string()])
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| ReleaseNotesError::Config(format!("invalid base URL: {}", self.base_url)))?
            .extend(segments);
        url.query_pairs_mut().append_pair("api-version", API_VERSION);
        Ok(url)
    }

    fn fetch_item(&self, id: WorkItemId) -> Result<WorkItem> {
        let url = self.item_url(id)?;
        debug!(work_item_id = %id, %url, "Fetching work item");

        let response = self
            .http
            .get(url)
            .send()
            .map_err(|e| ReleaseNotesError::Http(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ReleaseNotesError::DetailLookup {
                id,
                reason: format!("service answered {}", status),
            });
        }

        let body: WorkItemResponse =
            response.json().map_err(|e| ReleaseNotesError::DetailLookup {
                id,
                reason: format!("malformed response: {}", e),
            })?;

        body.into_work_item(id)
    }
}

impl WorkItemSource for DevOpsClient {
    fn fetch_item_identifiers(&self, query_id: &str) -> Result<Vec<WorkItemId>> {
        let url = self.query_url(query_id)?;
        debug!(%url, "Executing saved query");

        let response = self
            .http
            .get(url)
            .send()
            .map_err(|e| ReleaseNotesError::Http(e.to_string()))?;

        let status = response.status();
        if status != StatusCode::OK {
            let body = response.text().unwrap_or_default();
            return Err(ReleaseNotesError::QueryExecution {
                status: status.as_u16(),
                body,
            });
        }

        let result: QueryResult = response
            .json()
            .map_err(|e| ReleaseNotesError::ResponseParse(format!("query result: {}", e)))?;

        let ids = result.work_item_ids();
        info!(count = ids.len(), query_result_type = %result.query_result_type, "Query executed");
        Ok(ids)
    }

    fn fetch_item_details(&self, ids: &[WorkItemId]) -> Result<Vec<WorkItem>> {
        ids.iter().map(|&id| self.fetch_item(id)).collect()
    }
}
