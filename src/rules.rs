// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

/**
 * Bountyy Oy - Finding Rule Engine
 * Evaluates the surface model against the static rule tables
 *
 * @copyright 2026 Bountyy Oy
 * @license Proprietary
 */

use url::Url;

use crate::signatures::{
    FREE_TEXT_INPUTS, HEADER_NOT_SET, HEADER_WEAKNESS_RULES, SENSITIVE_PATH_RULES,
    SUSPICIOUS_PARAMS,
};
use crate::types::{FindingDetails, NewFinding, Severity, SurfaceModel};

/// External-dependency count above which the supply-chain rule fires
const SUPPLY_CHAIN_THRESHOLD: usize = 10;

/// Number of dependency URLs included as evidence in the supply-chain finding
const SUPPLY_CHAIN_SAMPLE: usize = 5;

/// Generate findings from a surface model and its technology list.
///
/// Pure function: identical inputs always yield the identical finding
/// set, in rule-table order then input iteration order. Rules are
/// independent and stackable; one crawl can trigger many at once.
pub fn generate_findings(surface: &SurfaceModel, technologies: &[String]) -> Vec<NewFinding> {
    let mut findings = Vec::new();

    header_findings(surface, &mut findings);
    sensitive_path_findings(surface, &mut findings);
    suspicious_parameter_findings(surface, &mut findings);
    form_input_findings(surface, &mut findings);
    technology_findings(technologies, &mut findings);
    supply_chain_findings(surface, &mut findings);

    findings
}

/// Each "Not Set" header among the weakness catalog yields one finding
/// at its fixed severity.
fn header_findings(surface: &SurfaceModel, findings: &mut Vec<NewFinding>) {
    for (header, severity, title) in HEADER_WEAKNESS_RULES {
        let missing = surface
            .security_headers
            .iter()
            .any(|h| h.name == *header && h.value == HEADER_NOT_SET);

        if missing {
            findings.push(NewFinding {
                title: title.to_string(),
                description: format!(
                    "The {} response header is not set, weakening browser-side defenses",
                    header
                ),
                severity: *severity,
                details: FindingDetails::MissingHeader {
                    header: header.to_string(),
                },
            });
        }
    }
}

/// Every discovered URL matching a sensitive-path signature yields a
/// finding carrying the matched URL.
fn sensitive_path_findings(surface: &SurfaceModel, findings: &mut Vec<NewFinding>) {
    for rule in SENSITIVE_PATH_RULES.iter() {
        for link in &surface.links {
            if rule.pattern.is_match(link) {
                findings.push(NewFinding {
                    title: rule.title.to_string(),
                    description: format!("{}: {}", rule.description, link),
                    severity: rule.severity,
                    details: FindingDetails::SensitivePath {
                        url: link.clone(),
                        pattern: rule.pattern.as_str().to_string(),
                    },
                });
            }
        }
    }
}

/// One finding per suspicious parameter per endpoint URL. A URL with
/// several suspicious parameters yields several findings.
fn suspicious_parameter_findings(surface: &SurfaceModel, findings: &mut Vec<NewFinding>) {
    for endpoint in &surface.endpoints {
        for param in query_param_names(endpoint) {
            let lowered = param.to_lowercase();
            if let Some((name, severity)) =
                SUSPICIOUS_PARAMS.iter().find(|(name, _)| *name == lowered)
            {
                findings.push(NewFinding {
                    title: format!("Suspicious Parameter: {}", name),
                    description: format!(
                        "Endpoint {} accepts the '{}' parameter, a common injection or redirect primitive",
                        endpoint, param
                    ),
                    severity: *severity,
                    details: FindingDetails::SuspiciousParameter {
                        url: endpoint.clone(),
                        parameter: param.clone(),
                    },
                });
            }
        }
    }
}

/// Each form with a free-text-like input yields one potential-XSS finding.
fn form_input_findings(surface: &SurfaceModel, findings: &mut Vec<NewFinding>) {
    for form in &surface.forms {
        let free_text = form.inputs.iter().find(|input| {
            let lowered = input.to_lowercase();
            FREE_TEXT_INPUTS.iter().any(|name| *name == lowered)
        });

        if let Some(input) = free_text {
            findings.push(NewFinding {
                title: "Potential XSS Input Point".to_string(),
                description: format!(
                    "Form {} exposes free-text input '{}' which may reach a renderer unescaped",
                    form.action, input
                ),
                severity: Severity::Medium,
                details: FindingDetails::XssInputPoint {
                    form_action: form.action.clone(),
                    input: input.clone(),
                },
            });
        }
    }
}

/// Fixed findings for specific detected technologies
fn technology_findings(technologies: &[String], findings: &mut Vec<NewFinding>) {
    for tech in technologies {
        match tech.as_str() {
            "jQuery" => findings.push(NewFinding {
                title: "Outdated JavaScript Library".to_string(),
                description:
                    "jQuery detected; older versions carry known prototype-pollution and XSS issues"
                        .to_string(),
                severity: Severity::Low,
                details: FindingDetails::TechnologyRisk {
                    technology: tech.clone(),
                },
            }),
            "WordPress" => findings.push(NewFinding {
                title: "CMS Security Exposure".to_string(),
                description:
                    "WordPress detected; unpatched cores and plugins are a frequent compromise vector"
                        .to_string(),
                severity: Severity::Medium,
                details: FindingDetails::TechnologyRisk {
                    technology: tech.clone(),
                },
            }),
            _ => {}
        }
    }
}

/// One low-severity finding when the page pulls more than the threshold
/// number of external dependencies.
fn supply_chain_findings(surface: &SurfaceModel, findings: &mut Vec<NewFinding>) {
    let count = surface.external_dependencies.len();
    if count > SUPPLY_CHAIN_THRESHOLD {
        let sample: Vec<String> = surface
            .external_dependencies
            .iter()
            .take(SUPPLY_CHAIN_SAMPLE)
            .cloned()
            .collect();

        findings.push(NewFinding {
            title: "High Number of External Dependencies".to_string(),
            description: format!(
                "Page loads {} external dependencies, widening the supply-chain attack surface",
                count
            ),
            severity: Severity::Low,
            details: FindingDetails::SupplyChain { count, sample },
        });
    }
}

fn query_param_names(endpoint: &str) -> Vec<String> {
    if let Ok(url) = Url::parse(endpoint) {
        return url.query_pairs().map(|(name, _)| name.into_owned()).collect();
    }

    // Relative endpoint; fall back to manual query-string splitting
    endpoint
        .split_once('?')
        .map(|(_, query)| {
            query
                .split('&')
                .filter_map(|pair| pair.split('=').next())
                .filter(|name| !name.is_empty())
                .map(|name| name.to_string())
                .collect()
        })
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scorer::risk_score;
    use crate::signatures::{HEADER_NOT_SET, SECURITY_HEADER_CATALOG};
    use crate::types::{DetectedForm, HeaderStatus};

    fn headers_all_unset() -> Vec<HeaderStatus> {
        SECURITY_HEADER_CATALOG
            .iter()
            .map(|name| HeaderStatus {
                name: name.to_string(),
                value: HEADER_NOT_SET.to_string(),
            })
            .collect()
    }

    #[test]
    fn test_wordpress_with_missing_headers_scenario() {
        // Crawl of a WordPress site with no CSP/HSTS/X-Frame-Options:
        // exactly 3 header findings (high, medium, medium) plus the CMS
        // risk finding (medium). Score = 15 + 8 + 8 + 8 = 39.
        let surface = SurfaceModel {
            security_headers: headers_all_unset(),
            ..Default::default()
        };
        let technologies = vec!["WordPress".to_string()];

        let findings = generate_findings(&surface, &technologies);
        assert_eq!(findings.len(), 4);

        let severities: Vec<_> = findings.iter().map(|f| f.severity).collect();
        assert_eq!(
            severities,
            vec![Severity::High, Severity::Medium, Severity::Medium, Severity::Medium]
        );
        assert_eq!(risk_score(&findings), 39);
    }

    #[test]
    fn test_external_dependency_scenario() {
        // 15 external dependencies, nothing else: exactly one low
        // supply-chain finding with count=15, score 3.
        let surface = SurfaceModel {
            external_dependencies: (0..15)
                .map(|i| format!("https://cdn{}.example.net/lib.js", i))
                .collect(),
            ..Default::default()
        };

        let findings = generate_findings(&surface, &[]);
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].title, "High Number of External Dependencies");
        assert_eq!(findings[0].severity, Severity::Low);
        match &findings[0].details {
            FindingDetails::SupplyChain { count, sample } => {
                assert_eq!(*count, 15);
                assert_eq!(sample.len(), 5);
            }
            other => panic!("unexpected details: {:?}", other),
        }
        assert_eq!(risk_score(&findings), 3);
    }

    #[test]
    fn test_ten_external_dependencies_do_not_fire() {
        let surface = SurfaceModel {
            external_dependencies: (0..10)
                .map(|i| format!("https://cdn{}.example.net/lib.js", i))
                .collect(),
            ..Default::default()
        };
        assert!(generate_findings(&surface, &[]).is_empty());
    }

    #[test]
    fn test_multiple_suspicious_params_stack() {
        let surface = SurfaceModel {
            endpoints: vec!["https://example.com/go?redirect=/x&debug=1".to_string()],
            ..Default::default()
        };

        let findings = generate_findings(&surface, &[]);
        assert_eq!(findings.len(), 2);
        assert_eq!(findings[0].severity, Severity::High);
        assert_eq!(findings[1].severity, Severity::Medium);
    }

    #[test]
    fn test_relative_endpoint_params_are_parsed() {
        let surface = SurfaceModel {
            endpoints: vec!["/search?url=https://evil.example".to_string()],
            ..Default::default()
        };

        let findings = generate_findings(&surface, &[]);
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].severity, Severity::High);
    }

    #[test]
    fn test_sensitive_paths_yield_one_finding_per_url() {
        let surface = SurfaceModel {
            links: vec![
                "https://example.com/about".to_string(),
                "https://example.com/admin/".to_string(),
                "https://example.com/.env".to_string(),
            ],
            ..Default::default()
        };

        let findings = generate_findings(&surface, &[]);
        assert_eq!(findings.len(), 2);
        assert_eq!(findings[0].severity, Severity::High);
        assert_eq!(findings[1].severity, Severity::Critical);
    }

    #[test]
    fn test_form_with_free_text_input_yields_one_finding() {
        let surface = SurfaceModel {
            forms: vec![DetectedForm {
                action: "/feedback".to_string(),
                method: "POST".to_string(),
                inputs: vec!["email".to_string(), "comment".to_string(), "message".to_string()],
            }],
            ..Default::default()
        };

        // One finding per form, not per matching input
        let findings = generate_findings(&surface, &[]);
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].title, "Potential XSS Input Point");
        assert_eq!(findings[0].severity, Severity::Medium);
    }

    #[test]
    fn test_engine_is_deterministic() {
        let surface = SurfaceModel {
            links: vec!["https://example.com/admin".to_string()],
            endpoints: vec!["https://example.com/go?next=/a".to_string()],
            security_headers: headers_all_unset(),
            ..Default::default()
        };
        let technologies = vec!["jQuery".to_string(), "WordPress".to_string()];

        let first = generate_findings(&surface, &technologies);
        let second = generate_findings(&surface, &technologies);
        assert_eq!(first, second);
    }
}
