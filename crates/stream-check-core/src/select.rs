use std::collections::HashSet;
use stream_check_models::{AvailabilityOffer, TitleCandidate};

/// Pick the candidate to match a watchlist entry against.
///
/// A candidate whose year equals the entry's parsed year wins outright.
/// Entries without a year, and entries whose year no candidate matches, take
/// the first candidate (the aggregator's own relevance ordering) — a
/// near-match beats a false negative.
pub fn select_candidate<'a>(
    candidates: &'a [TitleCandidate],
    year: Option<u32>,
) -> Option<&'a TitleCandidate> {
    if let Some(year) = year {
        if let Some(exact) = candidates.iter().find(|c| c.year == Some(year)) {
            return Some(exact);
        }
    }
    candidates.first()
}

/// Keep only offers for the user's selected services (canonical ids).
pub fn filter_offers(
    offers: &[AvailabilityOffer],
    services: &HashSet<String>,
) -> Vec<AvailabilityOffer> {
    offers
        .iter()
        .filter(|offer| services.contains(&offer.service_id))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use stream_check_models::MonetizationType;

    fn candidate(year: Option<u32>, services: &[&str]) -> TitleCandidate {
        TitleCandidate {
            title: "Parasite".to_string(),
            year,
            poster_url: None,
            offers: services
                .iter()
                .map(|s| AvailabilityOffer {
                    service_id: s.to_string(),
                    monetization: MonetizationType::Subscription,
                    deep_link_url: format!("https://{s}.example/watch"),
                })
                .collect(),
        }
    }

    #[test]
    fn test_exact_year_beats_rank() {
        let candidates = vec![
            candidate(Some(1982), &["hulu"]),
            candidate(Some(2019), &["netflix"]),
        ];
        let chosen = select_candidate(&candidates, Some(2019)).unwrap();
        assert_eq!(chosen.year, Some(2019));
    }

    #[test]
    fn test_no_year_takes_best_ranked() {
        let candidates = vec![
            candidate(Some(1982), &["hulu"]),
            candidate(Some(2019), &["netflix"]),
        ];
        let chosen = select_candidate(&candidates, None).unwrap();
        assert_eq!(chosen.year, Some(1982));
    }

    #[test]
    fn test_unmatched_year_falls_back_to_best_ranked() {
        let candidates = vec![
            candidate(Some(1982), &["hulu"]),
            candidate(Some(2019), &["netflix"]),
        ];
        let chosen = select_candidate(&candidates, Some(1995)).unwrap();
        assert_eq!(chosen.year, Some(1982));
    }

    #[test]
    fn test_no_candidates() {
        assert!(select_candidate(&[], Some(2019)).is_none());
        assert!(select_candidate(&[], None).is_none());
    }

    #[test]
    fn test_filter_keeps_only_selected_services() {
        let offers = candidate(None, &["netflix", "hulu", "max"]).offers;
        let services: HashSet<String> = ["netflix".to_string()].into_iter().collect();

        let filtered = filter_offers(&offers, &services);
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].service_id, "netflix");
    }

    #[test]
    fn test_filter_can_drop_everything() {
        let offers = candidate(None, &["hulu", "max"]).offers;
        let services: HashSet<String> = ["netflix".to_string()].into_iter().collect();
        assert!(filter_offers(&offers, &services).is_empty());
    }
}
