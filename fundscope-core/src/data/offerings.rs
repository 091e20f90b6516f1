//! Secondary provider offerings: paginated fund listing.
//!
//! The listing is walked page by page up to a fixed bound. A page that fails
//! (non-success status, undecodable body) is skipped; an empty page ends the
//! walk. The result is the set of identifiers the provider offers.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::maisretorno::{build_client, HttpSettings};
use super::provider::DataError;

/// One listed fund, with the provider's own fields kept verbatim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OfferingRecord {
    pub identifier: String,
    pub raw: Map<String, Value>,
}

/// One decoded listing page.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OfferingsPage {
    pub records: Vec<OfferingRecord>,
}

impl OfferingsPage {
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Pagination parameters for the listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    pub page_size: usize,
    pub max_pages: usize,
    pub sort_field: String,
    pub sort_direction: String,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page_size: 100,
            max_pages: 50,
            sort_field: "name".into(),
            sort_direction: "asc".into(),
        }
    }
}

/// Source of listing pages. Pages are numbered from 1.
pub trait OfferingsSource {
    fn fetch_page(&self, page: usize, request: &PageRequest) -> Result<OfferingsPage, DataError>;
}

/// Everything accumulated from the listing.
#[derive(Debug, Clone, Default)]
pub struct OfferingsCatalog {
    pub records: Vec<OfferingRecord>,
    pub pages_fetched: usize,
    pub pages_skipped: usize,
}

impl OfferingsCatalog {
    /// Identifiers as reported by the provider.
    pub fn identifiers(&self) -> HashSet<String> {
        self.records.iter().map(|r| r.identifier.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Walk the listing from page 1 to `max_pages`, accumulating rows.
pub fn collect_offerings(source: &dyn OfferingsSource, request: &PageRequest) -> OfferingsCatalog {
    let mut catalog = OfferingsCatalog::default();

    for page in 1..=request.max_pages {
        match source.fetch_page(page, request) {
            Ok(p) if p.is_empty() => {
                tracing::debug!(page, "empty offerings page, stopping");
                break;
            }
            Ok(p) => {
                catalog.pages_fetched += 1;
                catalog.records.extend(p.records);
            }
            Err(e) => {
                tracing::warn!(page, error = %e, "skipping offerings page");
                catalog.pages_skipped += 1;
            }
        }
    }

    tracing::info!(
        rows = catalog.records.len(),
        pages = catalog.pages_fetched,
        skipped = catalog.pages_skipped,
        "collected offerings"
    );
    catalog
}

/// String form of an item's identifier: strings as-is, numbers in decimal.
fn identifier_of(item: &Map<String, Value>, field: &str) -> Option<String> {
    match item.get(field)? {
        Value::String(s) => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Decode a listing body. Items without an identifier are dropped.
pub fn parse_page(body: &str, identifier_field: &str) -> Result<OfferingsPage, DataError> {
    #[derive(Deserialize)]
    struct Listing {
        items: Vec<Map<String, Value>>,
    }

    let listing: Listing = serde_json::from_str(body)
        .map_err(|e| DataError::ResponseFormatChanged(format!("offerings listing: {e}")))?;

    let records = listing
        .items
        .into_iter()
        .filter_map(|raw| {
            identifier_of(&raw, identifier_field).map(|identifier| OfferingRecord { identifier, raw })
        })
        .collect();
    Ok(OfferingsPage { records })
}

/// HTTP listing source.
pub struct OfferingsProvider {
    client: reqwest::blocking::Client,
    base_url: String,
    identifier_field: String,
}

impl OfferingsProvider {
    pub fn new(settings: &HttpSettings, identifier_field: impl Into<String>) -> Result<Self, DataError> {
        Ok(Self {
            client: build_client(settings)?,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            identifier_field: identifier_field.into(),
        })
    }

    pub fn page_url(&self, page: usize, request: &PageRequest) -> String {
        format!(
            "{}?page={page}&pageSize={}&sortField={}&sortDirection={}",
            self.base_url, request.page_size, request.sort_field, request.sort_direction
        )
    }
}

impl OfferingsSource for OfferingsProvider {
    fn fetch_page(&self, page: usize, request: &PageRequest) -> Result<OfferingsPage, DataError> {
        let url = self.page_url(page, request);
        tracing::debug!(%url, "requesting offerings page");

        let resp = self.client.get(&url).send()?;
        let status = resp.status();
        if !status.is_success() {
            return Err(DataError::HttpStatus {
                status: status.as_u16(),
                url,
            });
        }

        let body = resp.text()?;
        parse_page(&body, &self.identifier_field)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    /// Serves canned pages; pages beyond the list are empty.
    struct ScriptedSource {
        pages: Vec<Result<Vec<&'static str>, u16>>,
        requested: RefCell<Vec<usize>>,
    }

    impl OfferingsSource for ScriptedSource {
        fn fetch_page(&self, page: usize, _request: &PageRequest) -> Result<OfferingsPage, DataError> {
            self.requested.borrow_mut().push(page);
            match self.pages.get(page - 1) {
                None => Ok(OfferingsPage::default()),
                Some(Err(status)) => Err(DataError::HttpStatus {
                    status: *status,
                    url: format!("page {page}"),
                }),
                Some(Ok(ids)) => Ok(OfferingsPage {
                    records: ids
                        .iter()
                        .map(|id| OfferingRecord {
                            identifier: id.to_string(),
                            raw: Map::new(),
                        })
                        .collect(),
                }),
            }
        }
    }

    fn request(max_pages: usize) -> PageRequest {
        PageRequest {
            max_pages,
            ..PageRequest::default()
        }
    }

    #[test]
    fn stops_at_first_empty_page() {
        let source = ScriptedSource {
            pages: vec![Ok(vec!["1", "2"]), Ok(vec!["3"]), Ok(vec![]), Ok(vec!["4"])],
            requested: RefCell::new(Vec::new()),
        };
        let catalog = collect_offerings(&source, &request(10));
        assert_eq!(catalog.len(), 3);
        assert_eq!(catalog.pages_fetched, 2);
        assert_eq!(*source.requested.borrow(), vec![1, 2, 3]);
        assert!(!catalog.identifiers().contains("4"));
    }

    #[test]
    fn failed_page_is_skipped_not_fatal() {
        let source = ScriptedSource {
            pages: vec![Ok(vec!["1"]), Err(500), Ok(vec!["3"])],
            requested: RefCell::new(Vec::new()),
        };
        let catalog = collect_offerings(&source, &request(10));
        assert_eq!(catalog.pages_skipped, 1);
        let ids = catalog.identifiers();
        assert!(ids.contains("1") && ids.contains("3"));
    }

    #[test]
    fn respects_max_pages() {
        let source = ScriptedSource {
            pages: vec![Ok(vec!["1"]), Ok(vec!["2"]), Ok(vec!["3"])],
            requested: RefCell::new(Vec::new()),
        };
        let catalog = collect_offerings(&source, &request(2));
        assert_eq!(catalog.len(), 2);
        assert_eq!(*source.requested.borrow(), vec![1, 2]);
    }

    #[test]
    fn parse_page_reads_string_and_numeric_ids() {
        let body = r#"{"items": [
            {"cnpj": "35940266000107", "name": "A"},
            {"cnpj": 11222333000144},
            {"name": "no id"}
        ], "total": 3}"#;
        let page = parse_page(body, "cnpj").unwrap();
        let ids: Vec<&str> = page.records.iter().map(|r| r.identifier.as_str()).collect();
        assert_eq!(ids, vec!["35940266000107", "11222333000144"]);
        assert_eq!(page.records[0].raw.get("name"), Some(&Value::from("A")));
    }

    #[test]
    fn parse_page_without_items_fails() {
        assert!(parse_page(r#"{"data": []}"#, "cnpj").is_err());
    }

    #[test]
    fn page_url_carries_pagination_params() {
        let provider = OfferingsProvider::new(
            &HttpSettings {
                base_url: "https://broker.example.com/funds".into(),
                ..HttpSettings::default()
            },
            "cnpj",
        )
        .unwrap();
        assert_eq!(
            provider.page_url(3, &PageRequest::default()),
            "https://broker.example.com/funds?page=3&pageSize=100&sortField=name&sortDirection=asc"
        );
    }
}
