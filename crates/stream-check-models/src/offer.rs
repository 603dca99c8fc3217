use serde::{Deserialize, Serialize};

/// Commercial model of an offer.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MonetizationType {
    Subscription,
    Rent,
    Buy,
    Free,
}

/// One concrete way to stream/rent/buy a title on a named service.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AvailabilityOffer {
    /// Canonical service identifier, see [`canonical_service_id`].
    pub service_id: String,
    pub monetization: MonetizationType,
    pub deep_link_url: String,
}

/// One candidate title returned by the availability aggregator for a search,
/// in the aggregator's own relevance order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TitleCandidate {
    pub title: String,
    pub year: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub poster_url: Option<String>,
    pub offers: Vec<AvailabilityOffer>,
}

/// Canonical form of a streaming-service name, shared by the aggregator
/// mapping and the user's service selection so the two compare equal
/// ("Amazon Prime Video" == "amazon  prime video").
pub fn canonical_service_id(name: &str) -> String {
    name.split_whitespace()
        .map(|word| word.to_lowercase())
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonical_service_id() {
        assert_eq!(canonical_service_id("Netflix"), "netflix");
        assert_eq!(canonical_service_id("Amazon  Prime Video"), "amazon prime video");
        assert_eq!(canonical_service_id(" Max "), "max");
    }

    #[test]
    fn test_monetization_serializes_lowercase() {
        let json = serde_json::to_string(&MonetizationType::Subscription).unwrap();
        assert_eq!(json, "\"subscription\"");
    }
}
