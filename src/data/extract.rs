//! HTML extraction for nps.gov pages
//!
//! Pure functions that turn the HTML of the home page, a state listing page,
//! or a site detail page into structured data. Nothing here touches the
//! network or the cache.

use reqwest::Url;
use scraper::{ElementRef, Html, Selector};
use thiserror::Error;

use super::{Site, StateIndex, NO_ADDRESS, NO_CATEGORY, NO_LOCALITY, NO_NAME, NO_REGION};

/// "Find a Park by State" dropdown on the home page
const STATE_DROPDOWN: &str = "ul.dropdown-menu.SearchBar-keywordSearch";
/// Container of the parks on a state page
const PARKS_LIST: &str = "ul#list_parks";
/// Suffix appended to a park's relative URL to reach its detail page
const DETAIL_PAGE_SUFFIX: &str = "index.htm";

const CATEGORY: &str = "span.Hero-designation";
const NAME: &str = "a.Hero-title";
const LOCALITY: &str = r#"span[itemprop="addressLocality"]"#;
const REGION: &str = r#"span[itemprop="addressRegion"]"#;
const POSTAL_CODE: &str = r#"span[itemprop="postalCode"]"#;
const TELEPHONE: &str = r#"span[itemprop="telephone"]"#;

/// Errors that can occur when extracting data from a page
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ExtractError {
    /// A container the page must have was not found
    #[error("Page has no element matching `{0}`")]
    MissingElement(&'static str),

    /// A required field of a detail page was not found
    #[error("Detail page is missing required field: {0}")]
    MissingField(&'static str),

    /// A CSS selector failed to parse
    #[error("Invalid selector {0}")]
    InvalidSelector(String),

    /// A link could not be resolved against the base URL
    #[error("Cannot resolve link '{href}': {reason}")]
    InvalidUrl { href: String, reason: String },
}

fn selector(css: &'static str) -> Result<Selector, ExtractError> {
    Selector::parse(css).map_err(|e| ExtractError::InvalidSelector(format!("`{}`: {}", css, e)))
}

/// Trimmed text content of an element, `None` when it is blank
fn text_of(element: ElementRef<'_>) -> Option<String> {
    let text = element.text().collect::<String>();
    let trimmed = text.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Text of the first element matching `css`, `None` if absent or blank
fn first_text(document: &Html, css: &'static str) -> Result<Option<String>, ExtractError> {
    let selector = selector(css)?;
    Ok(document.select(&selector).next().and_then(text_of))
}

fn join_url(base: &Url, href: &str) -> Result<String, ExtractError> {
    base.join(href)
        .map(String::from)
        .map_err(|e| ExtractError::InvalidUrl {
            href: href.to_string(),
            reason: e.to_string(),
        })
}

/// Builds the state index from the home page
///
/// Each entry of the state dropdown becomes a lowercase state name mapped to
/// the absolute URL of that state's listing page. Entries without a link or
/// without text are skipped.
pub fn extract_state_index(html: &str, base: &Url) -> Result<StateIndex, ExtractError> {
    let document = Html::parse_document(html);
    let dropdown_sel = selector(STATE_DROPDOWN)?;
    let item_sel = selector("li")?;
    let link_sel = selector("a[href]")?;

    let dropdown = document
        .select(&dropdown_sel)
        .next()
        .ok_or(ExtractError::MissingElement(STATE_DROPDOWN))?;

    let mut index = StateIndex::new();
    for item in dropdown.select(&item_sel) {
        let Some(link) = item.select(&link_sel).next() else {
            tracing::debug!("skipping state entry without a link");
            continue;
        };
        let (Some(name), Some(href)) = (text_of(link), link.value().attr("href")) else {
            tracing::debug!("skipping state entry without a name");
            continue;
        };
        index.insert(&name, join_url(base, href)?);
    }

    Ok(index)
}

/// Collects the detail-page URLs of every park on a state listing page
///
/// URLs are returned in page order. Each is the park's relative link with the
/// detail-page suffix appended, resolved against `base`.
pub fn extract_site_urls(html: &str, base: &Url) -> Result<Vec<String>, ExtractError> {
    let document = Html::parse_document(html);
    let list_sel = selector(PARKS_LIST)?;
    let heading_sel = selector("h3")?;
    let link_sel = selector("a[href]")?;

    let list = document
        .select(&list_sel)
        .next()
        .ok_or(ExtractError::MissingElement(PARKS_LIST))?;

    let mut urls = Vec::new();
    for heading in list.select(&heading_sel) {
        let Some(href) = heading
            .select(&link_sel)
            .next()
            .and_then(|link| link.value().attr("href"))
        else {
            tracing::debug!("skipping park heading without a link");
            continue;
        };
        urls.push(join_url(base, &format!("{}{}", href, DETAIL_PAGE_SUFFIX))?);
    }

    Ok(urls)
}

/// Parses a site detail page into a `Site`
///
/// Category, name, locality and region fall back to placeholders. Postal code
/// and phone are required and their absence is an `ExtractError::MissingField`.
pub fn extract_site(html: &str) -> Result<Site, ExtractError> {
    let document = Html::parse_document(html);

    let category = first_text(&document, CATEGORY)?.unwrap_or_else(|| NO_CATEGORY.to_string());
    let name = first_text(&document, NAME)?.unwrap_or_else(|| NO_NAME.to_string());

    let locality = first_text(&document, LOCALITY)?;
    let region = first_text(&document, REGION)?;
    let address = match (locality, region) {
        (None, None) => NO_ADDRESS.to_string(),
        (locality, region) => format!(
            "{}, {}",
            locality.as_deref().unwrap_or(NO_LOCALITY),
            region.as_deref().unwrap_or(NO_REGION)
        ),
    };

    let postal_code =
        first_text(&document, POSTAL_CODE)?.ok_or(ExtractError::MissingField("postal code"))?;
    let phone = first_text(&document, TELEPHONE)?.ok_or(ExtractError::MissingField("phone"))?;

    Ok(Site {
        category,
        name,
        address,
        postal_code,
        phone,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const ROOT_PAGE: &str = include_str!("../../tests/fixtures/root.html");
    const MICHIGAN_PAGE: &str = include_str!("../../tests/fixtures/michigan.html");
    const ISRO_PAGE: &str = include_str!("../../tests/fixtures/isro.html");
    const SLBE_PAGE: &str = include_str!("../../tests/fixtures/slbe.html");

    fn base() -> Url {
        Url::parse("https://www.nps.gov").unwrap()
    }

    /// Wraps detail-page fragments in a minimal document
    fn detail_page(body: &str) -> String {
        format!("<html><body>{}</body></html>", body)
    }

    const FULL_ADDRESS: &str = r#"
        <span itemprop="postalCode">49931</span>
        <span itemprop="telephone">(906) 482-0984</span>
    "#;

    #[test]
    fn test_state_index_has_every_dropdown_entry() {
        let index = extract_state_index(ROOT_PAGE, &base()).unwrap();

        assert_eq!(index.len(), 3);
        let names: Vec<&str> = index.iter().map(|(name, _)| name).collect();
        assert_eq!(names, vec!["alabama", "michigan", "wyoming"]);
    }

    #[test]
    fn test_state_index_urls_are_absolute() {
        let index = extract_state_index(ROOT_PAGE, &base()).unwrap();

        assert_eq!(
            index.lookup("michigan"),
            Some("https://www.nps.gov/state/mi/index.htm")
        );
        assert_eq!(
            index.lookup("Wyoming"),
            Some("https://www.nps.gov/state/wy/index.htm")
        );
    }

    #[test]
    fn test_state_index_ignores_other_dropdowns() {
        let index = extract_state_index(ROOT_PAGE, &base()).unwrap();
        assert!(index.lookup("about us").is_none());
    }

    #[test]
    fn test_state_index_uses_given_base() {
        let base = Url::parse("http://127.0.0.1:8080").unwrap();
        let index = extract_state_index(ROOT_PAGE, &base).unwrap();

        assert_eq!(
            index.lookup("alabama"),
            Some("http://127.0.0.1:8080/state/al/index.htm")
        );
    }

    #[test]
    fn test_state_index_skips_entries_without_links() {
        let html = r#"<ul class="dropdown-menu SearchBar-keywordSearch">
            <li>Nowhere</li>
            <li><a href="/state/oh/index.htm">Ohio</a></li>
            <li><a href="/state/xx/index.htm">  </a></li>
        </ul>"#;

        let index = extract_state_index(html, &base()).unwrap();
        assert_eq!(index.len(), 1);
        assert!(index.lookup("ohio").is_some());
    }

    #[test]
    fn test_state_index_missing_dropdown_is_error() {
        let result = extract_state_index("<html><body></body></html>", &base());
        assert_eq!(result, Err(ExtractError::MissingElement(STATE_DROPDOWN)));
    }

    #[test]
    fn test_site_urls_in_page_order_with_suffix() {
        let urls = extract_site_urls(MICHIGAN_PAGE, &base()).unwrap();

        assert_eq!(
            urls,
            vec![
                "https://www.nps.gov/isro/index.htm".to_string(),
                "https://www.nps.gov/slbe/index.htm".to_string(),
            ]
        );
    }

    #[test]
    fn test_site_urls_empty_list() {
        let urls = extract_site_urls(r#"<ul id="list_parks"></ul>"#, &base()).unwrap();
        assert!(urls.is_empty());
    }

    #[test]
    fn test_site_urls_missing_container_is_error() {
        let result = extract_site_urls("<html></html>", &base());
        assert_eq!(result, Err(ExtractError::MissingElement(PARKS_LIST)));
    }

    #[test]
    fn test_extract_full_detail_page() {
        let site = extract_site(ISRO_PAGE).unwrap();

        assert_eq!(site.category, "National Park");
        assert_eq!(site.name, "Isle Royale");
        assert_eq!(site.address, "Houghton, MI");
        assert_eq!(site.postal_code, "49931");
        assert_eq!(site.phone, "(906) 482-0984");
    }

    #[test]
    fn test_blank_category_uses_placeholder() {
        let site = extract_site(SLBE_PAGE).unwrap();

        assert_eq!(site.category, NO_CATEGORY);
        assert_eq!(site.name, "Sleeping Bear Dunes");
        assert_eq!(site.address, "Empire, MI");
        assert_eq!(site.postal_code, "49630");
    }

    #[test]
    fn test_missing_category_element_uses_placeholder() {
        let html = detail_page(&format!(
            r#"<a class="Hero-title">Isle Royale</a>
               <span itemprop="addressLocality">Houghton</span>
               <span itemprop="addressRegion">MI</span>{}"#,
            FULL_ADDRESS
        ));
        let site = extract_site(&html).unwrap();

        assert_eq!(site.category, "no category");
        assert_eq!(site.name, "Isle Royale");
        assert_eq!(site.address, "Houghton, MI");
    }

    #[test]
    fn test_missing_name_uses_placeholder() {
        let html = detail_page(&format!(
            r#"<span class="Hero-designation">National Park</span>{}"#,
            FULL_ADDRESS
        ));
        let site = extract_site(&html).unwrap();
        assert_eq!(site.name, "no name");
    }

    #[test]
    fn test_missing_locality_and_region_uses_address_placeholder() {
        let html = detail_page(&format!(
            r#"<a class="Hero-title">Isle Royale</a>{}"#,
            FULL_ADDRESS
        ));
        let site = extract_site(&html).unwrap();
        assert_eq!(site.address, "no address");
    }

    #[test]
    fn test_missing_region_keeps_locality() {
        let html = detail_page(&format!(
            r#"<span itemprop="addressLocality">Houghton</span>{}"#,
            FULL_ADDRESS
        ));
        let site = extract_site(&html).unwrap();
        assert_eq!(site.address, "Houghton, no region");
    }

    #[test]
    fn test_missing_locality_keeps_region() {
        let html = detail_page(&format!(
            r#"<span itemprop="addressRegion">MI</span>{}"#,
            FULL_ADDRESS
        ));
        let site = extract_site(&html).unwrap();
        assert_eq!(site.address, "no locality, MI");
    }

    #[test]
    fn test_missing_postal_code_is_error() {
        let html = detail_page(r#"<span itemprop="telephone">(906) 482-0984</span>"#);
        assert_eq!(
            extract_site(&html),
            Err(ExtractError::MissingField("postal code"))
        );
    }

    #[test]
    fn test_missing_phone_is_error() {
        let html = detail_page(r#"<span itemprop="postalCode">49931</span>"#);
        assert_eq!(extract_site(&html), Err(ExtractError::MissingField("phone")));
    }
}
