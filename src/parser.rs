// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

/**
 * Bountyy Oy - Surface Parser & Fingerprinter
 * Transforms raw crawl output into the typed attack-surface model
 *
 * @copyright 2026 Bountyy Oy
 * @license Proprietary
 */

use scraper::{Html, Selector};
use url::Url;

use crate::signatures::{
    API_PATH_PATTERN, HEADER_NOT_SET, SCRIPT_FILE_PATTERN, SECURITY_HEADER_CATALOG,
    TECH_SIGNATURES,
};
use crate::types::{DetectedForm, EnrichmentRecord, HeaderStatus, RawCrawlRecord, SurfaceModel};

/// Form extraction cap. Truncation for storage economy, not sampling;
/// document order is preserved.
const MAX_FORMS: usize = 20;

/// Endpoint subset cap. Same truncation contract as forms.
const MAX_ENDPOINTS: usize = 100;

/// Derive the typed surface model from a raw crawl record.
pub fn parse_surface(record: &RawCrawlRecord) -> SurfaceModel {
    let target_host = Url::parse(&record.target_url)
        .ok()
        .and_then(|u| u.host_str().map(|h| h.to_lowercase()));

    SurfaceModel {
        links: record.links.clone(),
        technologies: fingerprint_technologies(&record.html),
        js_files: script_files(&record.links),
        external_dependencies: external_dependencies(&record.links, target_host.as_deref()),
        forms: extract_forms(&record.html),
        endpoints: endpoint_subset(&record.links),
        security_headers: header_table(record),
    }
}

/// Every signature regex that matches anywhere in the HTML fires
/// independently; there is no mutual exclusion between technologies.
pub fn fingerprint_technologies(html: &str) -> Vec<String> {
    TECH_SIGNATURES
        .iter()
        .filter(|sig| sig.pattern.is_match(html))
        .map(|sig| sig.name.to_string())
        .collect()
}

fn script_files(links: &[String]) -> Vec<String> {
    links
        .iter()
        .filter(|link| SCRIPT_FILE_PATTERN.is_match(link))
        .cloned()
        .collect()
}

/// Links whose host differs from the target's host. Relative and
/// unparseable links count as internal.
fn external_dependencies(links: &[String], target_host: Option<&str>) -> Vec<String> {
    let Some(target_host) = target_host else {
        return Vec::new();
    };

    links
        .iter()
        .filter(|link| {
            Url::parse(link)
                .ok()
                .and_then(|u| u.host_str().map(|h| h.to_lowercase() != target_host))
                .unwrap_or(false)
        })
        .cloned()
        .collect()
}

/// Tag-level form extraction: action, method (defaulting to GET), and
/// declared input names. Capped at MAX_FORMS.
fn extract_forms(html: &str) -> Vec<DetectedForm> {
    let document = Html::parse_document(html);

    // Static selectors; unwrap is safe for literal CSS
    let form_selector = Selector::parse("form").unwrap();
    let input_selector = Selector::parse("input[name], textarea[name], select[name]").unwrap();

    document
        .select(&form_selector)
        .take(MAX_FORMS)
        .map(|form| {
            let action = form.value().attr("action").unwrap_or("").to_string();
            let method = form
                .value()
                .attr("method")
                .map(|m| m.to_uppercase())
                .unwrap_or_else(|| "GET".to_string());

            let inputs = form
                .select(&input_selector)
                .filter_map(|input| input.value().attr("name"))
                .filter(|name| !name.is_empty())
                .map(|name| name.to_string())
                .collect();

            DetectedForm {
                action,
                method,
                inputs,
            }
        })
        .collect()
}

/// Links containing a query string or matching API/admin-like path
/// patterns. Capped at MAX_ENDPOINTS, source order preserved.
fn endpoint_subset(links: &[String]) -> Vec<String> {
    links
        .iter()
        .filter(|link| link.contains('?') || API_PATH_PATTERN.is_match(link))
        .take(MAX_ENDPOINTS)
        .cloned()
        .collect()
}

/// Fixed 7-entry security-header table: literal value or "Not Set".
/// Response headers arrive in crawl metadata as "header:<name>" tags.
fn header_table(record: &RawCrawlRecord) -> Vec<HeaderStatus> {
    SECURITY_HEADER_CATALOG
        .iter()
        .map(|name| {
            let value = record
                .metadata
                .get(&format!("header:{}", name))
                .cloned()
                .unwrap_or_else(|| HEADER_NOT_SET.to_string());
            HeaderStatus {
                name: name.to_string(),
                value,
            }
        })
        .collect()
}

/// Derived metadata attached to the scan after parsing.
pub fn derive_enrichment(record: &RawCrawlRecord, surface: &SurfaceModel) -> EnrichmentRecord {
    let total = surface.links.len() as u32;
    let external = surface.external_dependencies.len() as u32;

    EnrichmentRecord {
        page_title: record
            .metadata
            .get("title")
            .cloned()
            .or_else(|| extract_title(&record.html)),
        server: record.metadata.get("header:server").cloned(),
        total_links: total,
        internal_links: total.saturating_sub(external),
        external_links: external,
        form_count: surface.forms.len() as u32,
        technology_count: surface.technologies.len() as u32,
    }
}

fn extract_title(html: &str) -> Option<String> {
    let document = Html::parse_document(html);
    let selector = Selector::parse("title").unwrap();
    document
        .select(&selector)
        .next()
        .map(|el| el.text().collect::<String>().trim().to_string())
        .filter(|title| !title.is_empty())
}
