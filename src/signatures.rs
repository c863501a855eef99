// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

/**
 * Bountyy Oy - Fingerprint & Rule Tables
 * Static signature tables consumed by the surface parser and rule engine
 *
 * @copyright 2026 Bountyy Oy
 * @license Proprietary
 */

use once_cell::sync::Lazy;
use regex::Regex;

use crate::types::Severity;

/// Technology fingerprint: fires when its pattern matches anywhere in
/// the page HTML. Matches are independent; several may fire at once.
pub struct TechSignature {
    pub name: &'static str,
    pub pattern: Lazy<Regex>,
}

macro_rules! tech {
    ($name:expr, $pattern:expr) => {
        TechSignature {
            name: $name,
            pattern: Lazy::new(|| Regex::new($pattern).expect("invalid tech signature")),
        }
    };
}

pub static TECH_SIGNATURES: [TechSignature; 15] = [
    tech!("WordPress", r"(?i)wp-content|wp-includes|wp-json"),
    tech!("jQuery", r"(?i)jquery[.\-]?[0-9]*"),
    tech!("React", r#"(?i)data-reactroot|react\.production|__NEXT_DATA__"#),
    tech!("Vue.js", r"(?i)data-v-[0-9a-f]{8}|__vue__|vue(?:\.min)?\.js"),
    tech!("Angular", r"(?i)ng-version|ng-app|angular(?:\.min)?\.js"),
    tech!("Next.js", r"(?i)__next|_next/static"),
    tech!("Nuxt.js", r"(?i)__nuxt|_nuxt/"),
    tech!("Bootstrap", r"(?i)bootstrap(?:\.min)?\.(?:css|js)"),
    tech!("Drupal", r"(?i)drupal-settings-json|/sites/default/files"),
    tech!("Shopify", r"(?i)cdn\.shopify\.com|shopify\.theme"),
    tech!("Laravel", r"(?i)laravel_session|x-csrf-token.+laravel"),
    tech!("PHP", r"(?i)\.php[\x22'?/]|x-powered-by:\s*php"),
    tech!("ASP.NET", r"(?i)__viewstate|asp\.net"),
    tech!("Google Analytics", r"(?i)google-analytics\.com|gtag\("),
    tech!("Cloudflare", r"(?i)cdn-cgi/|cloudflare"),
];

/// Sensitive-path signature with its finding shape
pub struct SensitivePathRule {
    pub pattern: Lazy<Regex>,
    pub severity: Severity,
    pub title: &'static str,
    pub description: &'static str,
}

macro_rules! path_rule {
    ($pattern:expr, $severity:expr, $title:expr, $description:expr) => {
        SensitivePathRule {
            pattern: Lazy::new(|| Regex::new($pattern).expect("invalid path signature")),
            severity: $severity,
            title: $title,
            description: $description,
        }
    };
}

pub static SENSITIVE_PATH_RULES: [SensitivePathRule; 3] = [
    path_rule!(
        r"(?i)/(?:admin|administrator|wp-admin|cpanel|manage|dashboard)(?:[/?#]|$)",
        Severity::High,
        "Exposed Admin Panel",
        "An administrative interface is reachable from the public crawl"
    ),
    path_rule!(
        r"(?i)(?:\.env|\.git|config\.(?:php|json|ya?ml)|settings\.py|credentials|id_rsa|\.bak|backup|\.sql)(?:[/?#]|$)",
        Severity::Critical,
        "Sensitive File Exposure",
        "A credential, configuration, or backup artifact is linked from the site"
    ),
    path_rule!(
        r"(?i)/(?:phpmyadmin|adminer|pgadmin|dbadmin|mysqladmin)(?:[/?#]|$)",
        Severity::Critical,
        "Database Admin Tool Exposed",
        "A database administration tool is reachable from the public crawl"
    ),
];

/// Suspicious query-parameter names. Redirect/URL-like names carry
/// higher severity (open-redirect and SSRF primitives).
pub static SUSPICIOUS_PARAMS: &[(&str, Severity)] = &[
    ("redirect", Severity::High),
    ("redirect_uri", Severity::High),
    ("redirect_url", Severity::High),
    ("url", Severity::High),
    ("next", Severity::High),
    ("return", Severity::High),
    ("return_url", Severity::High),
    ("returnurl", Severity::High),
    ("goto", Severity::High),
    ("dest", Severity::High),
    ("continue", Severity::High),
    ("file", Severity::Medium),
    ("path", Severity::Medium),
    ("page", Severity::Medium),
    ("include", Severity::Medium),
    ("template", Severity::Medium),
    ("cmd", Severity::Medium),
    ("exec", Severity::Medium),
    ("debug", Severity::Medium),
    ("token", Severity::Medium),
];

/// Form input names that accept free text and commonly reach a renderer
pub static FREE_TEXT_INPUTS: &[&str] = &[
    "search", "query", "q", "comment", "message", "feedback", "body", "content", "description",
    "text", "note", "title", "name", "subject",
];

/// The fixed security-header catalog inspected on every scan.
/// Each entry surfaces either its literal value or the "Not Set" sentinel.
pub static SECURITY_HEADER_CATALOG: &[&str] = &[
    "content-security-policy",
    "strict-transport-security",
    "x-frame-options",
    "x-content-type-options",
    "referrer-policy",
    "permissions-policy",
    "x-xss-protection",
];

/// Sentinel value recorded when a catalogued header is absent
pub const HEADER_NOT_SET: &str = "Not Set";

/// Missing-header findings and their fixed severities
pub static HEADER_WEAKNESS_RULES: &[(&str, Severity, &str)] = &[
    (
        "content-security-policy",
        Severity::High,
        "Missing Content-Security-Policy Header",
    ),
    (
        "strict-transport-security",
        Severity::Medium,
        "Missing Strict-Transport-Security Header",
    ),
    (
        "x-frame-options",
        Severity::Medium,
        "Missing X-Frame-Options Header",
    ),
];

/// Links matching this pattern (or carrying a query string) are kept in
/// the endpoint subset of the surface model.
pub static API_PATH_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)/(?:api|graphql|v[0-9]+|rest|rpc|admin|login|auth|oauth)(?:[/?#]|$)")
        .expect("invalid api path pattern")
});

/// Script-file extensions collected into the JS file list
pub static SCRIPT_FILE_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\.m?js(?:\?|#|$)").expect("invalid script file pattern"));

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_signature_tables_compile() {
        assert_eq!(TECH_SIGNATURES.len(), 15);
        for sig in TECH_SIGNATURES.iter() {
            assert!(!sig.pattern.as_str().is_empty(), "{} pattern empty", sig.name);
        }
        for rule in SENSITIVE_PATH_RULES.iter() {
            assert!(!rule.pattern.as_str().is_empty());
        }
        assert!(API_PATH_PATTERN.is_match("/api/users"));
        assert!(SCRIPT_FILE_PATTERN.is_match("https://cdn.example.com/app.js"));
    }

    #[test]
    fn wordpress_signature_fires_on_wp_content() {
        let sig = TECH_SIGNATURES.iter().find(|s| s.name == "WordPress").unwrap();
        assert!(sig.pattern.is_match(r#"<link href="/wp-content/themes/x/style.css">"#));
    }

    #[test]
    fn sensitive_path_severities_match_catalog() {
        let admin = &SENSITIVE_PATH_RULES[0];
        assert_eq!(admin.severity, Severity::High);
        assert!(admin.pattern.is_match("https://example.com/admin/"));

        let creds = &SENSITIVE_PATH_RULES[1];
        assert_eq!(creds.severity, Severity::Critical);
        assert!(creds.pattern.is_match("https://example.com/.env"));
        assert!(creds.pattern.is_match("https://example.com/db.sql"));

        let dbtool = &SENSITIVE_PATH_RULES[2];
        assert_eq!(dbtool.severity, Severity::Critical);
        assert!(dbtool.pattern.is_match("https://example.com/phpmyadmin/"));
    }

    #[test]
    fn header_catalog_has_seven_entries() {
        assert_eq!(SECURITY_HEADER_CATALOG.len(), 7);
    }
}
