//! Package-registry search for installable generators.
//!
//! A search runs in stages: load the keyword listing (once per client), drop
//! deny-listed and already-installed packages, match the user's term, fetch
//! every survivor's metadata concurrently, then sort official generators first.

use crate::config::Config;
use crate::error::RegistryError;
use crate::generators::UpdateChecker;
use crate::http_client::HttpClient;
use async_trait::async_trait;
use futures::future::try_join_all;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tokio::sync::OnceCell;
use tracing::{debug, info, warn};

/// Generators published by the core maintainers; listed first in results.
pub const OFFICIAL_GENERATORS: &[&str] = &[
    "generator-angular",
    "generator-backbone",
    "generator-bootstrap",
    "generator-chrome-extension",
    "generator-chromeapp",
    "generator-commonjs",
    "generator-generator",
    "generator-gruntplugin",
    "generator-gulp-webapp",
    "generator-jasmine",
    "generator-jquery",
    "generator-karma",
    "generator-mobile",
    "generator-mocha",
    "generator-node",
    "generator-polymer",
    "generator-webapp",
];

const JSON_ACCEPT: (&str, &str) = ("Accept", "application/json");

/// An entry of the keyword listing.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PackageSummary {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

impl PackageSummary {
    /// Case-sensitive substring match on name or description. `""` matches all.
    pub fn matches(&self, term: &str) -> bool {
        self.name.contains(term)
            || self
                .description
                .as_deref()
                .is_some_and(|description| description.contains(term))
    }
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    objects: Vec<SearchObject>,
}

#[derive(Debug, Deserialize)]
struct SearchObject {
    package: PackageSummary,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum Person {
    Name(String),
    Details {
        #[serde(default)]
        name: Option<String>,
    },
}

impl Person {
    fn name(&self) -> Option<&str> {
        match self {
            Person::Name(name) => Some(name),
            Person::Details { name } => name.as_deref(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
struct VersionManifest {
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    author: Option<Person>,
}

/// Full registry document for one package.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Packument {
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    author: Option<Person>,
    #[serde(rename = "dist-tags", default)]
    dist_tags: HashMap<String, String>,
    #[serde(default)]
    versions: HashMap<String, VersionManifest>,
}

impl Packument {
    pub fn latest_version(&self) -> Option<&str> {
        self.dist_tags.get("latest").map(String::as_str)
    }

    fn latest_manifest(&self) -> Option<&VersionManifest> {
        self.latest_version().and_then(|v| self.versions.get(v))
    }

    pub fn description(&self) -> Option<&str> {
        self.latest_manifest()
            .and_then(|m| m.description.as_deref())
            .or(self.description.as_deref())
    }

    pub fn author(&self) -> Option<&str> {
        self.latest_manifest()
            .and_then(|m| m.author.as_ref())
            .or(self.author.as_ref())
            .and_then(Person::name)
    }
}

/// A package offered for installation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub name: String,
    pub description: String,
    pub author: Option<String>,
    pub version: Option<String>,
    pub official: bool,
}

impl Candidate {
    /// Name without the `generator-` prefix.
    pub fn display_name(&self) -> &str {
        self.name.strip_prefix("generator-").unwrap_or(&self.name)
    }
}

/// One row of the search-results menu.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InstallChoice {
    Package(Candidate),
    SearchAgain,
    Home,
}

#[derive(Debug, Clone, Default)]
pub struct SearchResults {
    pub candidates: Vec<Candidate>,
}

impl SearchResults {
    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }

    /// The sorted candidates followed by "search again" and "return home".
    pub fn choices(&self) -> Vec<InstallChoice> {
        self.candidates
            .iter()
            .cloned()
            .map(InstallChoice::Package)
            .chain([InstallChoice::SearchAgain, InstallChoice::Home])
            .collect()
    }
}

/// Official generators first, then by display name.
pub fn sort_candidates(candidates: &mut [Candidate]) {
    candidates.sort_by(|a, b| {
        b.official
            .cmp(&a.official)
            .then_with(|| a.display_name().cmp(b.display_name()))
    });
}

pub struct RegistryClient {
    http: Arc<dyn HttpClient>,
    registry_url: String,
    keyword: String,
    search_size: u32,
    deny_list: HashSet<String>,
    deny_list_url: Option<String>,
    official: HashSet<String>,
    all_generators: OnceCell<Vec<PackageSummary>>,
}

impl RegistryClient {
    pub fn from_config(http: Arc<dyn HttpClient>, config: &Config) -> Self {
        Self {
            http,
            registry_url: config.registry_url.trim_end_matches('/').to_string(),
            keyword: config.keyword.clone(),
            search_size: config.search_size,
            deny_list: config.deny_list.iter().cloned().collect(),
            deny_list_url: config.deny_list_url.clone(),
            official: OFFICIAL_GENERATORS.iter().map(|s| s.to_string()).collect(),
            all_generators: OnceCell::new(),
        }
    }

    pub fn keyword_url(&self) -> String {
        format!(
            "{}/-/v1/search?text=keywords:{}&size={}",
            self.registry_url, self.keyword, self.search_size
        )
    }

    /// Scoped names keep their `@` but escape the slash.
    pub fn package_url(&self, name: &str) -> String {
        format!("{}/{}", self.registry_url, name.replace('/', "%2F"))
    }

    pub fn is_official(&self, name: &str) -> bool {
        self.official.contains(name)
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, RegistryError> {
        let body = self.http.get_text(url, &[JSON_ACCEPT]).await?;
        serde_json::from_str(&body).map_err(|e| RegistryError::InvalidResponse {
            url: url.to_string(),
            message: e.to_string(),
        })
    }

    /// Every package carrying the generator keyword. Fetched once; a failed
    /// fetch is retried on the next call.
    pub async fn all_generators(&self) -> Result<&[PackageSummary], RegistryError> {
        let listing = self
            .all_generators
            .get_or_try_init(|| async {
                let url = self.keyword_url();
                let response: SearchResponse = self.get_json(&url).await?;
                info!("Registry lists {} generator packages", response.objects.len());
                Ok::<_, RegistryError>(
                    response
                        .objects
                        .into_iter()
                        .map(|object| object.package)
                        .collect(),
                )
            })
            .await?;
        Ok(listing.as_slice())
    }

    /// The static deny-list, merged with the remote one when configured.
    async fn deny_list(&self) -> HashSet<String> {
        let mut deny_list = self.deny_list.clone();
        if let Some(url) = &self.deny_list_url {
            match self.get_json::<Vec<String>>(url).await {
                Ok(remote) => deny_list.extend(remote),
                Err(e) => warn!("Using built-in deny-list only: {}", e),
            }
        }
        deny_list
    }

    pub async fn fetch_packument(&self, name: &str) -> Result<Packument, RegistryError> {
        self.get_json(&self.package_url(name)).await
    }

    async fn fetch_candidate(&self, summary: &PackageSummary) -> Result<Candidate, RegistryError> {
        let packument = self.fetch_packument(&summary.name).await?;
        Ok(Candidate {
            name: summary.name.clone(),
            description: packument
                .description()
                .or(summary.description.as_deref())
                .unwrap_or_default()
                .to_string(),
            author: packument.author().map(str::to_string),
            version: packument.latest_version().map(str::to_string),
            official: self.is_official(&summary.name),
        })
    }

    /// Installable generators matching `term`, excluding `installed`.
    ///
    /// # Errors
    ///
    /// Any failed registry call aborts the search; there are no partial results.
    pub async fn search(
        &self,
        term: &str,
        installed: &HashSet<String>,
    ) -> Result<SearchResults, RegistryError> {
        let deny_list = self.deny_list().await;
        let all = self.all_generators().await?;

        let matching: Vec<&PackageSummary> = all
            .iter()
            .filter(|summary| !deny_list.contains(&summary.name))
            .filter(|summary| !installed.contains(&summary.name))
            .filter(|summary| summary.matches(term))
            .collect();
        debug!("{} packages match {:?}", matching.len(), term);

        let mut candidates =
            try_join_all(matching.into_iter().map(|summary| self.fetch_candidate(summary))).await?;
        sort_candidates(&mut candidates);

        Ok(SearchResults { candidates })
    }
}

#[async_trait]
impl UpdateChecker for RegistryClient {
    async fn latest_version(&self, package: &str) -> Option<String> {
        match self.fetch_packument(package).await {
            Ok(packument) => packument.latest_version().map(str::to_string),
            Err(e) => {
                debug!("Update check for {} failed: {}", package, e);
                None
            }
        }
    }
}
