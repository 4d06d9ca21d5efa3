use crate::config::CatalogConfig;
use crate::io::http::HttpTransport;
use crate::types::{locator_file_name, GranuleLocator, SlcError, SlcResult};
use serde::Deserialize;

/// CMR JSON envelope: `{"feed": {"entry": [...]}}`
#[derive(Debug, Deserialize)]
struct Feed<E> {
    feed: FeedBody<E>,
}

#[derive(Debug, Deserialize)]
struct FeedBody<E> {
    #[serde(default = "Vec::new")]
    entry: Vec<E>,
}

#[derive(Debug, Deserialize)]
struct CollectionEntry {
    id: String,
}

#[derive(Debug, Deserialize)]
struct GranuleEntry {
    #[serde(default)]
    links: Vec<GranuleLink>,
}

#[derive(Debug, Deserialize)]
struct GranuleLink {
    href: String,
}

/// Scheme prefix of direct object-store links
const S3_SCHEME: &str = "s3://";

/// Metadata catalog client: DOI -> collection -> granule locators
pub struct CatalogClient<T: HttpTransport> {
    transport: T,
    config: CatalogConfig,
}

impl<T: HttpTransport> CatalogClient<T> {
    pub fn new(transport: T, config: CatalogConfig) -> Self {
        Self { transport, config }
    }

    /// Resolve a dataset DOI to its collection concept id
    pub fn resolve_collection(&self, doi: &str) -> SlcResult<String> {
        let url = format!("{}/collections.json", self.config.base_url);
        let body = self.transport.get(&url, &[("doi", doi.to_string())], None)?;

        let feed: Feed<CollectionEntry> = parse_json(&body, "collection lookup")?;
        let concept_id = feed
            .feed
            .entry
            .into_iter()
            .next()
            .map(|entry| entry.id)
            .ok_or_else(|| SlcError::CollectionNotFound(doi.to_string()))?;

        log::info!("Resolved DOI {} to collection {}", doi, concept_id);
        Ok(concept_id)
    }

    /// Page through all granules of a collection and collect their `s3://` links.
    ///
    /// Stops at the first empty page. A failed page aborts the whole search.
    pub fn granule_links(&self, concept_id: &str) -> SlcResult<Vec<GranuleLocator>> {
        let url = format!("{}/granules.json", self.config.base_url);
        let mut links = Vec::new();
        let mut page_num = 1usize;

        loop {
            let form = [
                ("collection_concept_id", concept_id.to_string()),
                ("page_size", self.config.page_size.to_string()),
                ("page_num", page_num.to_string()),
            ];
            let body = self.transport.post_form(&url, &form)?;
            let page: Feed<GranuleEntry> = parse_json(&body, "granule listing")?;

            if page.feed.entry.is_empty() {
                break;
            }

            log::debug!(
                "Granule page {} for {}: {} entries",
                page_num,
                concept_id,
                page.feed.entry.len()
            );

            links.extend(
                page.feed
                    .entry
                    .into_iter()
                    .flat_map(|granule| granule.links)
                    .map(|link| link.href)
                    .filter(|href| href.starts_with(S3_SCHEME)),
            );
            page_num += 1;
        }

        log::info!(
            "Collected {} object-store links for {} over {} page(s)",
            links.len(),
            concept_id,
            page_num - 1
        );
        Ok(links)
    }

    /// Resolve `doi` and list all its granule locators
    pub fn search_doi(&self, doi: &str) -> SlcResult<Vec<GranuleLocator>> {
        let concept_id = self.resolve_collection(doi)?;
        self.granule_links(&concept_id)
    }
}

/// Keep locators whose file name starts with `prefix`, preserving order
pub fn filter_by_prefix(links: &[GranuleLocator], prefix: &str) -> Vec<GranuleLocator> {
    links
        .iter()
        .filter(|link| locator_file_name(link).starts_with(prefix))
        .cloned()
        .collect()
}

fn parse_json<D: serde::de::DeserializeOwned>(body: &str, what: &str) -> SlcResult<D> {
    serde_json::from_str(body)
        .map_err(|e| SlcError::MalformedResponse(format!("{} response: {}", what, e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::collections::VecDeque;

    /// Replays canned bodies and records every request
    struct ScriptedTransport {
        responses: RefCell<VecDeque<SlcResult<String>>>,
        requests: RefCell<Vec<(String, Vec<(String, String)>)>>,
    }

    impl ScriptedTransport {
        fn new(responses: Vec<SlcResult<String>>) -> Self {
            Self {
                responses: RefCell::new(responses.into()),
                requests: RefCell::new(Vec::new()),
            }
        }

        fn next(&self, url: &str, params: &[(&str, String)]) -> SlcResult<String> {
            self.requests.borrow_mut().push((
                url.to_string(),
                params.iter().map(|(k, v)| (k.to_string(), v.clone())).collect(),
            ));
            self.responses
                .borrow_mut()
                .pop_front()
                .unwrap_or_else(|| Err(SlcError::Processing("no scripted response".into())))
        }
    }

    impl HttpTransport for ScriptedTransport {
        fn get(&self, url: &str, query: &[(&str, String)], _bearer: Option<&str>) -> SlcResult<String> {
            self.next(url, query)
        }

        fn post_form(&self, url: &str, form: &[(&str, String)]) -> SlcResult<String> {
            self.next(url, form)
        }
    }

    fn config() -> CatalogConfig {
        CatalogConfig {
            base_url: "http://cmr.test/search".to_string(),
            page_size: 2,
        }
    }

    #[test]
    fn test_resolve_collection() {
        let transport = ScriptedTransport::new(vec![Ok(
            r#"{"feed": {"entry": [{"id": "C1214354031-ASF", "title": "UAVSAR"}]}}"#.to_string(),
        )]);
        let client = CatalogClient::new(&transport, config());

        let id = client.resolve_collection("10.5067/SOMETHING").unwrap();
        assert_eq!(id, "C1214354031-ASF");

        let requests = transport.requests.borrow();
        assert_eq!(requests[0].0, "http://cmr.test/search/collections.json");
        assert_eq!(requests[0].1, vec![("doi".to_string(), "10.5067/SOMETHING".to_string())]);
    }

    #[test]
    fn test_resolve_collection_not_found() {
        let transport = ScriptedTransport::new(vec![Ok(r#"{"feed": {"entry": []}}"#.to_string())]);
        let client = CatalogClient::new(&transport, config());

        let err = client.resolve_collection("10.0/none").unwrap_err();
        assert!(matches!(err, SlcError::CollectionNotFound(doi) if doi == "10.0/none"));
    }

    #[test]
    fn test_resolve_collection_malformed() {
        let transport = ScriptedTransport::new(vec![Ok(r#"{"items": []}"#.to_string())]);
        let client = CatalogClient::new(&transport, config());

        assert!(matches!(
            client.resolve_collection("10.0/x"),
            Err(SlcError::MalformedResponse(_))
        ));
    }

    #[test]
    fn test_link_filtering_keeps_only_s3() {
        let transport = ScriptedTransport::new(vec![
            Ok(r#"{"feed": {"entry": [{"links": [
                {"href": "s3://bucket/a.slc"},
                {"href": "https://mirror/a.slc"},
                {"href": "ftp://mirror/a.slc"}
            ]}]}}"#
                .to_string()),
            Ok(r#"{"feed": {"entry": []}}"#.to_string()),
        ]);
        let client = CatalogClient::new(&transport, config());

        let links = client.granule_links("C1").unwrap();
        assert_eq!(links, vec!["s3://bucket/a.slc".to_string()]);
    }

    #[test]
    fn test_failed_page_aborts_search() {
        let transport = ScriptedTransport::new(vec![
            Ok(r#"{"feed": {"entry": [{"links": [{"href": "s3://b/1"}]}]}}"#.to_string()),
            Err(SlcError::Http {
                url: "http://cmr.test/search/granules.json".to_string(),
                status: 503,
            }),
        ]);
        let client = CatalogClient::new(&transport, config());

        assert!(matches!(
            client.granule_links("C1"),
            Err(SlcError::Http { status: 503, .. })
        ));
        assert_eq!(transport.requests.borrow().len(), 2);
    }

    #[test]
    fn test_granule_without_links() {
        let transport = ScriptedTransport::new(vec![
            Ok(r#"{"feed": {"entry": [{"title": "no links here"}]}}"#.to_string()),
            Ok(r#"{"feed": {"entry": []}}"#.to_string()),
        ]);
        let client = CatalogClient::new(&transport, config());

        assert!(client.granule_links("C1").unwrap().is_empty());
    }

    #[test]
    fn test_filter_by_prefix() {
        let links = vec![
            "s3://b/dir/SanAnd_26526_17121_004_s1_1x1.slc".to_string(),
            "s3://b/dir/SanAnd_26526_17122_001_s1_1x1.slc".to_string(),
            "s3://b/dir/SanAnd_26526_17121_004.ann".to_string(),
        ];
        let picked = filter_by_prefix(&links, "SanAnd_26526_17121_004");
        assert_eq!(picked, vec![links[0].clone(), links[2].clone()]);
    }
}
