use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};
use stream_check_models::{NormalizedTitle, WatchlistEntry};
use tracing::debug;

use crate::error::SourceError;

// Structural anchors. `#content` is the site's main content container and
// must be present on every rendered watchlist page; the poster containers
// carry the entry data as attributes, so the parser survives styling churn
// around them.
static CONTENT: Lazy<Selector> = Lazy::new(|| selector("div#content"));
static POSTER: Lazy<Selector> = Lazy::new(|| selector("div[data-component-class='LazyPoster']"));
static POSTER_IMG: Lazy<Selector> = Lazy::new(|| selector("img"));
static PAGINATION: Lazy<Selector> = Lazy::new(|| selector("div.paginate-nextprev"));
static NEXT_LINK: Lazy<Selector> = Lazy::new(|| selector("div.paginate-nextprev a.next"));

fn selector(source: &str) -> Selector {
    Selector::parse(source).expect("static selector")
}

/// One parsed watchlist page.
#[derive(Debug, Clone)]
pub struct ParsedPage {
    pub entries: Vec<WatchlistEntry>,
    /// True when the page carries no entries, or when a pagination block is
    /// present without a next-page link.
    pub is_last_page: bool,
}

/// Extract the ordered watchlist entries from one page of raw markup.
///
/// Pure function of its input, no network access. Fails with
/// [`SourceError::Parse`] when the page was retrieved but the expected
/// structural anchor is absent, which is distinct from a transport failure.
pub fn parse_watchlist_page(html: &str, page: u32) -> Result<ParsedPage, SourceError> {
    let document = Html::parse_document(html);

    if document.select(&CONTENT).next().is_none() {
        return Err(SourceError::parse(format!(
            "watchlist page {page}: content container missing, markup shape changed"
        )));
    }

    let mut entries = Vec::new();
    for poster in document.select(&POSTER) {
        match parse_poster(&poster) {
            Some(entry) => entries.push(entry),
            None => debug!(page, "skipping poster with missing name or slug"),
        }
    }

    let paginated = document.select(&PAGINATION).next().is_some();
    let has_next = document.select(&NEXT_LINK).next().is_some();
    let is_last_page = entries.is_empty() || (paginated && !has_next);

    debug!(page, entries = entries.len(), is_last_page, "parsed watchlist page");

    Ok(ParsedPage {
        entries,
        is_last_page,
    })
}

fn parse_poster(poster: &ElementRef<'_>) -> Option<WatchlistEntry> {
    let element = poster.value();
    let display_title = element.attr("data-item-name")?.trim();
    let slug = element.attr("data-item-slug")?.trim();
    if display_title.is_empty() || slug.is_empty() {
        return None;
    }

    let poster_url = poster
        .select(&POSTER_IMG)
        .next()
        .and_then(|img| img.value().attr("src"))
        .map(str::to_string);

    Some(WatchlistEntry {
        year: NormalizedTitle::from_display(display_title).year,
        display_title: display_title.to_string(),
        slug: slug.to_string(),
        poster_url,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page_with(posters: &str, pagination: &str) -> String {
        format!(
            r#"<html><body><div id="content"><ul class="poster-list">{posters}</ul>{pagination}</div></body></html>"#
        )
    }

    fn poster(name: &str, slug: &str, img: Option<&str>) -> String {
        let img_tag = img
            .map(|src| format!(r#"<img src="{src}" alt="{name}">"#))
            .unwrap_or_default();
        format!(
            r#"<div data-component-class="LazyPoster" data-item-name="{name}" data-item-slug="{slug}">{img_tag}</div>"#
        )
    }

    #[test]
    fn test_extracts_entries_in_order() {
        let html = page_with(
            &format!(
                "{}{}",
                poster("Parasite (2019)", "parasite-2019", Some("https://img.example/parasite.jpg")),
                poster("Se7en", "se7en", None),
            ),
            "",
        );

        let parsed = parse_watchlist_page(&html, 1).unwrap();
        assert_eq!(parsed.entries.len(), 2);
        assert_eq!(parsed.entries[0].display_title, "Parasite (2019)");
        assert_eq!(parsed.entries[0].slug, "parasite-2019");
        assert_eq!(parsed.entries[0].year, Some(2019));
        assert_eq!(
            parsed.entries[0].poster_url.as_deref(),
            Some("https://img.example/parasite.jpg")
        );
        assert_eq!(parsed.entries[1].display_title, "Se7en");
        assert_eq!(parsed.entries[1].year, None);
        assert_eq!(parsed.entries[1].poster_url, None);
    }

    #[test]
    fn test_empty_page_is_last() {
        let html = page_with("", "");
        let parsed = parse_watchlist_page(&html, 3).unwrap();
        assert!(parsed.entries.is_empty());
        assert!(parsed.is_last_page);
    }

    #[test]
    fn test_pagination_with_next_link_continues() {
        let html = page_with(
            &poster("Dune: Part Two", "dune-part-two", None),
            r#"<div class="paginate-nextprev"><a class="next" href="/u/watchlist/page/2/">Older</a></div>"#,
        );
        let parsed = parse_watchlist_page(&html, 1).unwrap();
        assert!(!parsed.is_last_page);
    }

    #[test]
    fn test_pagination_without_next_link_is_last() {
        let html = page_with(
            &poster("Dune: Part Two", "dune-part-two", None),
            r#"<div class="paginate-nextprev"><a class="previous" href="/u/watchlist/page/1/">Newer</a></div>"#,
        );
        let parsed = parse_watchlist_page(&html, 2).unwrap();
        assert_eq!(parsed.entries.len(), 1);
        assert!(parsed.is_last_page);
    }

    #[test]
    fn test_unpaginated_page_with_entries_continues() {
        // Single-page watchlists carry no pagination block at all; the run
        // ends on the following empty page instead.
        let html = page_with(&poster("Okja", "okja", None), "");
        let parsed = parse_watchlist_page(&html, 1).unwrap();
        assert!(!parsed.is_last_page);
    }

    #[test]
    fn test_missing_content_anchor_is_parse_error() {
        let err = parse_watchlist_page("<html><body><p>maintenance</p></body></html>", 2)
            .unwrap_err();
        assert!(matches!(err, SourceError::Parse(_)));
        assert!(err.to_string().contains("page 2"));
    }

    #[test]
    fn test_poster_without_slug_is_skipped() {
        let html = page_with(
            &format!(
                "{}{}",
                r#"<div data-component-class="LazyPoster" data-item-name="Broken"></div>"#,
                poster("Okja", "okja", None),
            ),
            "",
        );
        let parsed = parse_watchlist_page(&html, 1).unwrap();
        assert_eq!(parsed.entries.len(), 1);
        assert_eq!(parsed.entries[0].slug, "okja");
    }
}
