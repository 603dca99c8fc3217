use reqwest::header::USER_AGENT;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use stream_check_models::{canonical_service_id, AvailabilityOffer, MonetizationType, TitleCandidate};
use tracing::debug;

use crate::error::SourceError;

pub const DEFAULT_API_URL: &str = "https://apis.justwatch.com/graphql";

const IMAGE_BASE: &str = "https://images.justwatch.com";
const POSTER_PROFILE: &str = "s592";
const REQUEST_USER_AGENT: &str = "Mozilla/5.0";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(8);

/// Candidates requested per search. The watchlist side already narrows the
/// query to one title, so a handful of candidates is enough for the year
/// tie-break.
const CANDIDATE_LIMIT: u32 = 5;

const SEARCH_QUERY: &str = r#"
query GetSearchTitles($searchTitlesFilter: TitleFilter!, $country: Country!, $language: Language!, $first: Int!) {
    popularTitles(filter: $searchTitlesFilter, country: $country, first: $first) {
        edges {
            node {
                content(country: $country, language: $language) {
                    title
                    originalReleaseYear
                    posterUrl
                }
                offers(country: $country, platform: WEB) {
                    monetizationType
                    standardWebURL
                    package { clearName }
                }
            }
        }
    }
}
"#;

#[derive(Debug, Serialize)]
struct SearchRequest<'a> {
    query: &'static str,
    variables: SearchVariables<'a>,
}

#[derive(Debug, Serialize)]
struct SearchVariables<'a> {
    #[serde(rename = "searchTitlesFilter")]
    filter: TitleFilter<'a>,
    country: &'a str,
    language: &'a str,
    first: u32,
}

#[derive(Debug, Serialize)]
struct TitleFilter<'a> {
    #[serde(rename = "searchQuery")]
    search_query: &'a str,
    #[serde(rename = "objectTypes")]
    object_types: [&'static str; 1],
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    data: Option<SearchData>,
}

#[derive(Debug, Deserialize)]
struct SearchData {
    #[serde(rename = "popularTitles")]
    popular_titles: Option<PopularTitles>,
}

#[derive(Debug, Deserialize)]
struct PopularTitles {
    edges: Option<Vec<Edge>>,
}

#[derive(Debug, Deserialize)]
struct Edge {
    node: Option<Node>,
}

#[derive(Debug, Deserialize)]
struct Node {
    content: Option<Content>,
    offers: Option<Vec<RawOffer>>,
}

#[derive(Debug, Deserialize)]
struct Content {
    title: Option<String>,
    #[serde(rename = "originalReleaseYear")]
    original_release_year: Option<u32>,
    #[serde(rename = "posterUrl")]
    poster_url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawOffer {
    #[serde(rename = "monetizationType")]
    monetization_type: Option<String>,
    #[serde(rename = "standardWebURL")]
    standard_web_url: Option<String>,
    package: Option<RawPackage>,
}

#[derive(Debug, Deserialize)]
struct RawPackage {
    #[serde(rename = "clearName")]
    clear_name: Option<String>,
}

/// Search the aggregator for `search_key`, returning candidates in the
/// aggregator's relevance order. A non-2xx response is a transport failure;
/// a 2xx body that does not deserialize is a parse failure and is never
/// retried.
pub async fn search_titles(
    client: &Client,
    api_url: &str,
    search_key: &str,
    country: &str,
    language: &str,
) -> Result<Vec<TitleCandidate>, SourceError> {
    let body = SearchRequest {
        query: SEARCH_QUERY,
        variables: SearchVariables {
            filter: TitleFilter {
                search_query: search_key,
                object_types: ["MOVIE"],
            },
            country,
            language,
            first: CANDIDATE_LIMIT,
        },
    };

    let response = client
        .post(api_url)
        .header(USER_AGENT, REQUEST_USER_AGENT)
        .timeout(REQUEST_TIMEOUT)
        .json(&body)
        .send()
        .await?;

    let status = response.status();
    if !status.is_success() {
        return Err(SourceError::transport(
            Some(status.as_u16()),
            format!("availability query for {search_key:?} rejected"),
        ));
    }

    let text = response.text().await?;
    let payload: SearchResponse = serde_json::from_str(&text)
        .map_err(|e| SourceError::parse(format!("malformed availability response: {e}")))?;

    Ok(map_candidates(payload))
}

fn map_candidates(payload: SearchResponse) -> Vec<TitleCandidate> {
    let edges = payload
        .data
        .and_then(|d| d.popular_titles)
        .and_then(|t| t.edges)
        .unwrap_or_default();

    edges
        .into_iter()
        .filter_map(|edge| edge.node)
        .filter_map(map_node)
        .collect()
}

fn map_node(node: Node) -> Option<TitleCandidate> {
    let content = node.content?;
    let title = content.title.filter(|t| !t.is_empty())?;

    let offers = node
        .offers
        .unwrap_or_default()
        .into_iter()
        .filter_map(map_offer)
        .collect();

    Some(TitleCandidate {
        title,
        year: content.original_release_year,
        poster_url: content.poster_url.as_deref().map(expand_poster_url),
        offers,
    })
}

fn map_offer(raw: RawOffer) -> Option<AvailabilityOffer> {
    let service = raw
        .package
        .and_then(|p| p.clear_name)
        .filter(|n| !n.is_empty())?;
    let monetization = match raw.monetization_type.as_deref() {
        Some(value) => map_monetization(value)?,
        None => return None,
    };
    Some(AvailabilityOffer {
        service_id: canonical_service_id(&service),
        monetization,
        deep_link_url: raw.standard_web_url.unwrap_or_default(),
    })
}

fn map_monetization(value: &str) -> Option<MonetizationType> {
    match value {
        "FLATRATE" | "FLATRATE_AND_BUY" => Some(MonetizationType::Subscription),
        "RENT" => Some(MonetizationType::Rent),
        "BUY" => Some(MonetizationType::Buy),
        "FREE" | "ADS" => Some(MonetizationType::Free),
        other => {
            debug!(monetization = other, "dropping offer with unknown monetization");
            None
        }
    }
}

/// The API returns poster paths relative to its image host, with a
/// `{profile}` placeholder for the rendition size.
fn expand_poster_url(path: &str) -> String {
    let absolute = if path.starts_with('/') {
        format!("{IMAGE_BASE}{path}")
    } else {
        path.to_string()
    };
    absolute.replace("{profile}", POSTER_PROFILE)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "data": {
            "popularTitles": {
                "edges": [
                    {
                        "node": {
                            "content": {
                                "title": "Parasite",
                                "originalReleaseYear": 2019,
                                "posterUrl": "/poster/12345/{profile}/parasite.webp"
                            },
                            "offers": [
                                {
                                    "monetizationType": "FLATRATE",
                                    "standardWebURL": "https://www.netflix.com/title/81221938",
                                    "package": { "clearName": "Netflix" }
                                },
                                {
                                    "monetizationType": "RENT",
                                    "standardWebURL": "https://tv.apple.com/movie/parasite",
                                    "package": { "clearName": "Apple TV" }
                                },
                                {
                                    "monetizationType": "CINEMA",
                                    "standardWebURL": "https://example.com",
                                    "package": { "clearName": "Somewhere" }
                                }
                            ]
                        }
                    },
                    {
                        "node": {
                            "content": {
                                "title": "Parasite",
                                "originalReleaseYear": 1982,
                                "posterUrl": null
                            },
                            "offers": null
                        }
                    }
                ]
            }
        }
    }"#;

    #[test]
    fn test_maps_candidates_in_response_order() {
        let payload: SearchResponse = serde_json::from_str(SAMPLE).unwrap();
        let candidates = map_candidates(payload);

        assert_eq!(candidates.len(), 2);
        assert_eq!(candidates[0].title, "Parasite");
        assert_eq!(candidates[0].year, Some(2019));
        assert_eq!(candidates[1].year, Some(1982));
        assert!(candidates[1].offers.is_empty());
    }

    #[test]
    fn test_offer_mapping_and_unknown_monetization_dropped() {
        let payload: SearchResponse = serde_json::from_str(SAMPLE).unwrap();
        let candidates = map_candidates(payload);

        let offers = &candidates[0].offers;
        assert_eq!(offers.len(), 2);
        assert_eq!(offers[0].service_id, "netflix");
        assert_eq!(offers[0].monetization, MonetizationType::Subscription);
        assert_eq!(offers[1].service_id, "apple tv");
        assert_eq!(offers[1].monetization, MonetizationType::Rent);
    }

    #[test]
    fn test_poster_url_expansion() {
        assert_eq!(
            expand_poster_url("/poster/12345/{profile}/parasite.webp"),
            "https://images.justwatch.com/poster/12345/s592/parasite.webp"
        );
        assert_eq!(
            expand_poster_url("https://cdn.example/full.jpg"),
            "https://cdn.example/full.jpg"
        );
    }

    #[test]
    fn test_empty_response_maps_to_no_candidates() {
        let payload: SearchResponse = serde_json::from_str(r#"{"data": null}"#).unwrap();
        assert!(map_candidates(payload).is_empty());
    }

    #[test]
    fn test_offer_without_package_name_is_dropped() {
        let raw = RawOffer {
            monetization_type: Some("FLATRATE".to_string()),
            standard_web_url: Some("https://example.com".to_string()),
            package: None,
        };
        assert!(map_offer(raw).is_none());
    }
}
