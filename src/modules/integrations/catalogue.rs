//! National Library Board (Openweb) catalogue integration
//!
//! Three read-only endpoints are used: the branch listing, free-text title
//! search, and per-title availability. Every request carries the API key and
//! app code headers from [`CatalogueConfig`].

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::fmt;
use std::time::Duration;

use crate::domain::DomainError;
use crate::models::{AvailabilityEntry, Branch};

const USER_AGENT: &str = "BookHound/1.0";
const BRANCHES_PATH: &str = "v1/Library/GetBranches";
const SEARCH_PATH: &str = "v2/Catalogue/SearchTitles";
const AVAILABILITY_PATH: &str = "v2/Catalogue/GetAvailabilityInfo";

/// Connection settings for the catalogue API.
#[derive(Debug, Clone)]
pub struct CatalogueConfig {
    pub base_url: String,
    pub api_key: String,
    pub app_code: String,
    /// Maximum candidates requested per title search
    pub search_limit: u32,
}

#[derive(Debug)]
pub enum CatalogueError {
    /// HTTP 429 from the catalogue
    RateLimited { operation: &'static str },
    /// Any other non-success status
    Http { operation: &'static str, status: u16 },
    /// Transport failure (DNS, TLS, timeout, bad URL)
    Network { operation: &'static str, message: String },
    /// Response body did not have the expected shape
    Decode { operation: &'static str, message: String },
}

impl CatalogueError {
    pub fn operation(&self) -> &'static str {
        match self {
            CatalogueError::RateLimited { operation }
            | CatalogueError::Http { operation, .. }
            | CatalogueError::Network { operation, .. }
            | CatalogueError::Decode { operation, .. } => operation,
        }
    }

    pub fn is_rate_limited(&self) -> bool {
        matches!(self, CatalogueError::RateLimited { .. })
    }
}

impl fmt::Display for CatalogueError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CatalogueError::RateLimited { operation } => {
                write!(f, "{}: rate limited by catalogue", operation)
            }
            CatalogueError::Http { operation, status } => {
                write!(f, "Failed to {}: HTTP {}", operation, status)
            }
            CatalogueError::Network { operation, message } => {
                write!(f, "Failed to {}: {}", operation, message)
            }
            CatalogueError::Decode { operation, message } => {
                write!(f, "Failed to {}: unexpected response ({})", operation, message)
            }
        }
    }
}

impl std::error::Error for CatalogueError {}

impl From<CatalogueError> for DomainError {
    fn from(e: CatalogueError) -> Self {
        DomainError::External(e.to_string())
    }
}

/// A title returned by the catalogue search, flattened for matching.
#[derive(Debug, Clone, PartialEq)]
pub struct TitleCandidate {
    pub brn: String,
    pub title: String,
    pub author: String,
    pub format: String,
    pub languages: Vec<String>,
}

/// Read operations the enrichment pipeline and branch refresh depend on
#[async_trait]
pub trait Catalogue: Send + Sync {
    /// Onsite regional and public library branches
    async fn fetch_branches(&self) -> Result<Vec<Branch>, CatalogueError>;

    /// Free-text title search. Matching is left to the caller.
    async fn search_titles(
        &self,
        title: &str,
        author: &str,
    ) -> Result<Vec<TitleCandidate>, CatalogueError>;

    /// Per-branch availability for one bibliographic record
    async fn fetch_availability(
        &self,
        brn: &str,
        limit: u32,
    ) -> Result<Vec<AvailabilityEntry>, CatalogueError>;
}

// ---------------------------------------------------------------------------
// Wire format
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct BranchesResponse {
    #[serde(default)]
    branches: Vec<BranchRecord>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BranchRecord {
    branch_code: String,
    branch_name: String,
    #[serde(default)]
    timing: Timing,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Timing {
    #[serde(default)]
    opening_hours: String,
}

impl From<BranchRecord> for Branch {
    fn from(record: BranchRecord) -> Self {
        Branch {
            closed: record.timing.opening_hours.is_empty(),
            branch_code: record.branch_code,
            branch_name: record.branch_name,
        }
    }
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    titles: Vec<TitleRecord>,
}

#[derive(Debug, Deserialize)]
struct TitleRecord {
    brn: Brn,
    #[serde(default)]
    title: String,
    #[serde(default)]
    author: String,
    #[serde(default)]
    format: Option<Format>,
    #[serde(default)]
    language: Vec<String>,
}

/// BRNs arrive as numbers from some endpoints and strings from others
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Brn {
    Number(u64),
    Text(String),
}

impl fmt::Display for Brn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Brn::Number(n) => write!(f, "{}", n),
            Brn::Text(s) => f.write_str(s),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Format {
    Name(String),
    Coded { name: String },
}

impl Format {
    fn into_name(self) -> String {
        match self {
            Format::Name(name) | Format::Coded { name, .. } => name,
        }
    }
}

impl From<TitleRecord> for TitleCandidate {
    fn from(record: TitleRecord) -> Self {
        TitleCandidate {
            brn: record.brn.to_string(),
            title: record.title,
            author: record.author,
            format: record.format.map(Format::into_name).unwrap_or_default(),
            languages: record.language,
        }
    }
}

#[derive(Debug, Deserialize)]
struct AvailabilityResponse {
    #[serde(default)]
    items: Vec<ItemRecord>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ItemRecord {
    location: CodeName,
    status: CodeName,
    #[serde(default)]
    call_number: String,
    #[serde(default)]
    usage_level: Option<CodeName>,
}

#[derive(Debug, Deserialize)]
struct CodeName {
    #[serde(default)]
    code: String,
    #[serde(default)]
    name: String,
}

impl From<ItemRecord> for AvailabilityEntry {
    fn from(item: ItemRecord) -> Self {
        AvailabilityEntry {
            avail: item.status.name.trim().eq_ignore_ascii_case("available"),
            library: item.location.code,
            code: item.call_number,
            category: item.usage_level.map(|u| u.name).unwrap_or_default(),
        }
    }
}

// ---------------------------------------------------------------------------
// HTTP client
// ---------------------------------------------------------------------------

/// reqwest-backed catalogue client
pub struct NlbCatalogueClient {
    http: reqwest::Client,
    config: CatalogueConfig,
}

impl NlbCatalogueClient {
    pub fn new(config: CatalogueConfig) -> Result<Self, CatalogueError> {
        let http = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| CatalogueError::Network {
                operation: "build client",
                message: e.to_string(),
            })?;

        Ok(Self { http, config })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.config.base_url.trim_end_matches('/'), path)
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        operation: &'static str,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, CatalogueError> {
        let url = self.url(path);
        tracing::debug!(operation, url = %url, "Querying catalogue");

        let resp = self
            .http
            .get(&url)
            .header("X-Api-Key", &self.config.api_key)
            .header("X-App-Code", &self.config.app_code)
            .query(query)
            .send()
            .await
            .map_err(|e| CatalogueError::Network {
                operation,
                message: e.to_string(),
            })?;

        let status = resp.status();
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            tracing::warn!(operation, "Catalogue rate limit hit");
            return Err(CatalogueError::RateLimited { operation });
        }
        if !status.is_success() {
            return Err(CatalogueError::Http {
                operation,
                status: status.as_u16(),
            });
        }

        let body = resp.text().await.map_err(|e| CatalogueError::Network {
            operation,
            message: e.to_string(),
        })?;

        serde_json::from_str(&body).map_err(|e| CatalogueError::Decode {
            operation,
            message: e.to_string(),
        })
    }
}

#[async_trait]
impl Catalogue for NlbCatalogueClient {
    async fn fetch_branches(&self) -> Result<Vec<Branch>, CatalogueError> {
        let parsed: BranchesResponse = self
            .get_json(
                "fetch branches",
                BRANCHES_PATH,
                &[
                    ("LibraryTypes", "RL,PL".to_string()),
                    ("ListType", "onsite".to_string()),
                ],
            )
            .await?;

        let branches: Vec<Branch> = parsed.branches.into_iter().map(Branch::from).collect();
        tracing::info!("Catalogue listed {} branches", branches.len());
        Ok(branches)
    }

    async fn search_titles(
        &self,
        title: &str,
        author: &str,
    ) -> Result<Vec<TitleCandidate>, CatalogueError> {
        let keywords = format!("{} {}", title, author).trim().to_string();

        let parsed: SearchResponse = self
            .get_json(
                "search titles",
                SEARCH_PATH,
                &[
                    ("Keywords", keywords),
                    ("Limit", self.config.search_limit.to_string()),
                ],
            )
            .await?;

        Ok(parsed.titles.into_iter().map(TitleCandidate::from).collect())
    }

    async fn fetch_availability(
        &self,
        brn: &str,
        limit: u32,
    ) -> Result<Vec<AvailabilityEntry>, CatalogueError> {
        let parsed: AvailabilityResponse = self
            .get_json(
                "fetch availability",
                AVAILABILITY_PATH,
                &[("BRN", brn.to_string()), ("Limit", limit.to_string())],
            )
            .await?;

        Ok(parsed
            .items
            .into_iter()
            .map(AvailabilityEntry::from)
            .collect())
    }
}
