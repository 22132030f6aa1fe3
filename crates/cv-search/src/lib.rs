//! Lookup of wines in an external catalogue, turned into add-form drafts.

use cv_core::WineDraft;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, warn};

pub mod mapping;

pub use mapping::to_draft;

/// Header carrying the catalogue API key.
pub const API_KEY_HEADER: &str = "x-api-key";

/// Errors returned by the catalogue client.
#[derive(Debug, Error)]
pub enum SearchError {
    #[error("catalogue request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("catalogue answered {status}: {body}")]
    Status { status: u16, body: String },
    #[error("unexpected catalogue payload: {0}")]
    Payload(#[from] serde_json::Error),
}

pub type SearchResult<T> = Result<T, SearchError>;

/// One hit of a catalogue search.
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct CatalogueWine {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub region: Option<String>,
    #[serde(default)]
    pub winery: Option<String>,
    #[serde(default)]
    pub year: Option<i32>,
    #[serde(default)]
    pub type_id: u32,
    /// Average rating on a 0-5 scale.
    #[serde(default)]
    pub rating: Option<f64>,
    #[serde(default)]
    pub grapes: Vec<String>,
    #[serde(default)]
    pub image: Option<String>,
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct SearchPage {
    pub matches: Vec<CatalogueWine>,
    #[serde(default = "first_page")]
    pub page: u32,
    #[serde(default = "first_page")]
    pub total_pages: u32,
}

fn first_page() -> u32 {
    1
}

/// Taste axes on a 1-5 scale; any of them may be unknown.
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
pub struct TasteStructure {
    pub acidity: Option<f64>,
    pub intensity: Option<f64>,
    pub sweetness: Option<f64>,
    pub tannin: Option<f64>,
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct FlavourGroup {
    pub group: String,
    /// Number of reviewer mentions.
    pub score: f64,
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
pub struct TasteProfile {
    #[serde(default)]
    pub structure: TasteStructure,
    #[serde(default)]
    pub flavour: Vec<FlavourGroup>,
}

/// HTTP client for the wine catalogue.
#[derive(Clone, Debug)]
pub struct SearchClient {
    http: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
}

impl SearchClient {
    pub fn new(base_url: impl Into<String>, api_key: Option<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Search the catalogue by free text.
    pub async fn search(&self, query: &str, page: u32) -> SearchResult<SearchPage> {
        let url = format!("{}/wines", self.base_url);
        let page = page.max(1).to_string();
        self.get_json(&url, &[("q", query), ("page", page.as_str())])
            .await
    }

    /// Fetch the taste profile of a catalogue wine.
    pub async fn taste(&self, wine_id: u64) -> SearchResult<TasteProfile> {
        let url = format!("{}/wines/{wine_id}/taste", self.base_url);
        self.get_json(&url, &[]).await
    }

    /// Search and turn up to `limit` hits into drafts.
    ///
    /// A hit whose taste profile cannot be fetched still yields a draft with the
    /// default profile.
    pub async fn find(&self, query: &str, limit: usize) -> SearchResult<Vec<WineDraft>> {
        let mut hits = Vec::new();
        let mut page = 1;
        while hits.len() < limit {
            let found = self.search(query, page).await?;
            let exhausted = found.matches.is_empty() || found.page >= found.total_pages;
            hits.extend(found.matches);
            if exhausted {
                break;
            }
            page += 1;
        }
        hits.truncate(limit);

        let mut drafts = Vec::with_capacity(hits.len());
        for hit in &hits {
            let taste = match self.taste(hit.id).await {
                Ok(taste) => taste,
                Err(err) => {
                    warn!(catalogue_id = hit.id, error = %err, "taste profile unavailable");
                    TasteProfile::default()
                }
            };
            drafts.push(to_draft(hit, &taste));
        }
        debug!(query, found = drafts.len(), "catalogue search finished");
        Ok(drafts)
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, &str)],
    ) -> SearchResult<T> {
        let mut request = self.http.get(url).query(query);
        if let Some(api_key) = &self.api_key {
            request = request.header(API_KEY_HEADER, api_key);
        }
        let response = request.send().await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(SearchError::Status {
                status: status.as_u16(),
                body,
            });
        }
        Ok(serde_json::from_str(&body)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cv_core::{Aroma, Body, Sweetness, Tannins, WineType};
    use serde_json::json;
    use wiremock::matchers::{header, method, path, path_regex, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn hit(id: u64, name: &str) -> serde_json::Value {
        json!({"id": id, "name": name, "type_id": 1, "rating": 4.0, "grapes": ["Nebbiolo"]})
    }

    async fn mount_page(server: &MockServer, page: u32, total: u32, hits: Vec<serde_json::Value>) {
        Mock::given(method("GET"))
            .and(path("/wines"))
            .and(query_param("page", page.to_string()))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "matches": hits,
                "page": page,
                "total_pages": total,
            })))
            .expect(1)
            .mount(server)
            .await;
    }

    async fn mount_taste(server: &MockServer, response: ResponseTemplate) {
        Mock::given(method("GET"))
            .and(path_regex(r"^/wines/\d+/taste$"))
            .respond_with(response)
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn find_walks_pages_until_the_limit() {
        let server = MockServer::start().await;
        mount_page(&server, 1, 3, vec![hit(1, "Barolo"), hit(2, "Barbaresco")]).await;
        mount_page(&server, 2, 3, vec![hit(3, "Roero"), hit(4, "Gattinara")]).await;
        Mock::given(method("GET"))
            .and(path("/wines"))
            .and(query_param("page", "3"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;
        mount_taste(
            &server,
            ResponseTemplate::new(200).set_body_json(json!({
                "structure": {"intensity": 4.5, "tannin": 4.2, "sweetness": 1.1},
                "flavour": [{"group": "earth", "score": 12.0}],
            })),
        )
        .await;

        let client = SearchClient::new(server.uri(), None);
        let drafts = client.find("nebbiolo", 3).await.unwrap();

        let names: Vec<_> = drafts.iter().filter_map(|draft| draft.name.as_deref()).collect();
        assert_eq!(names, vec!["Barolo", "Barbaresco", "Roero"]);
        let first = &drafts[0];
        assert_eq!(first.wine_type, Some(WineType::Red));
        assert_eq!(first.body, Some(Body::Corposo));
        assert_eq!(first.tannins, Some(Tannins::Tannico));
        assert_eq!(first.aroma, Some(Aroma::Evoluto));
        assert_eq!(first.rating, Some(8));
    }

    #[tokio::test]
    async fn find_stops_at_the_last_page() {
        let server = MockServer::start().await;
        mount_page(&server, 1, 1, vec![hit(9, "Lagrein")]).await;
        mount_taste(&server, ResponseTemplate::new(200).set_body_json(json!({}))).await;

        let client = SearchClient::new(server.uri(), None);
        let drafts = client.find("lagrein", 5).await.unwrap();

        assert_eq!(drafts.len(), 1);
        assert_eq!(drafts[0].name.as_deref(), Some("Lagrein"));
    }

    #[tokio::test]
    async fn missing_taste_profile_falls_back_to_defaults() {
        let server = MockServer::start().await;
        mount_page(&server, 1, 1, vec![hit(5, "Sagrantino")]).await;
        mount_taste(&server, ResponseTemplate::new(500).set_body_string("boom")).await;

        let client = SearchClient::new(server.uri(), None);
        let drafts = client.find("sagrantino", 2).await.unwrap();

        assert_eq!(drafts.len(), 1);
        let draft = &drafts[0];
        assert_eq!(draft.body, Some(Body::Medio));
        assert_eq!(draft.tannins, Some(Tannins::Equilibrato));
        assert_eq!(draft.sweetness, Some(Sweetness::Secco));
        assert_eq!(draft.aroma, Some(Aroma::Fruttato));
    }

    #[tokio::test]
    async fn error_status_is_reported_with_its_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/wines"))
            .respond_with(ResponseTemplate::new(503).set_body_string("maintenance"))
            .mount(&server)
            .await;

        let client = SearchClient::new(server.uri(), None);
        let err = client.search("barolo", 1).await.unwrap_err();

        assert!(
            matches!(err, SearchError::Status { status: 503, ref body } if body == "maintenance"),
            "unexpected error: {err}"
        );
        assert!(client.find("barolo", 3).await.is_err());
    }

    #[tokio::test]
    async fn api_key_travels_in_its_header() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/wines"))
            .and(header(API_KEY_HEADER, "secret"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"matches": []})))
            .expect(1)
            .mount(&server)
            .await;

        let keyed = SearchClient::new(server.uri(), Some("secret".into()));
        let page = keyed.search("barolo", 0).await.unwrap();
        assert!(page.matches.is_empty());

        let anonymous = SearchClient::new(server.uri(), None);
        let err = anonymous.search("barolo", 1).await.unwrap_err();
        assert!(matches!(err, SearchError::Status { status: 404, .. }));
    }

    #[tokio::test]
    async fn malformed_payload_is_a_payload_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/wines"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;

        let client = SearchClient::new(server.uri(), None);
        let err = client.search("barolo", 1).await.unwrap_err();
        assert!(matches!(err, SearchError::Payload(_)));
    }

    #[test]
    fn search_page_tolerates_missing_fields() {
        let page: SearchPage = serde_json::from_str(
            r#"{"matches":[{"id":7,"name":"Barolo","type_id":1,"grapes":["Nebbiolo"]}]}"#,
        )
        .unwrap();

        assert_eq!(page.page, 1);
        assert_eq!(page.total_pages, 1);
        assert_eq!(page.matches[0].region, None);
        assert_eq!(page.matches[0].grapes, vec!["Nebbiolo".to_string()]);
    }

    #[test]
    fn taste_profile_defaults_to_empty() {
        let taste: TasteProfile = serde_json::from_str("{}").unwrap();
        assert_eq!(taste, TasteProfile::default());
    }

    #[test]
    fn base_url_drops_trailing_slash() {
        let client = SearchClient::new("https://catalogue.example/api/", None);
        assert_eq!(client.base_url(), "https://catalogue.example/api");
    }
}
