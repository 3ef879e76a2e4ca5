//! Route table and lookup.
//!
//! # Responsibilities
//! - Store compiled routes in configuration order
//! - Look up the route for a request path
//! - Return matched route or explicit no-match
//!
//! # Design Decisions
//! - Immutable after construction (thread-safe without locks)
//! - O(n) path prefix scan (acceptable for typical route counts)
//! - First match wins, in configuration order
//! - Explicit None rather than silent default

use std::collections::HashSet;

use axum::http::HeaderName;
use url::Url;

use crate::config::validation::{is_valid_prefix, parse_target};
use crate::config::{ConfigError, GatewayConfig, RouteConfig, Secrets, TransformConfig};
use crate::routing::matcher::PathPrefixMatcher;
use crate::routing::transform::RequestTransform;

/// A single prefix → upstream rule.
#[derive(Debug, Clone)]
pub struct RouteEntry {
    matcher: PathPrefixMatcher,
    target: Url,
    transform: RequestTransform,
    secure_upstream: bool,
}

impl RouteEntry {
    /// Build an entry. Fails if the prefix is malformed or the target is not
    /// an absolute http(s) URL.
    pub fn new(prefix: &str, target: &str) -> Result<Self, ConfigError> {
        if !is_valid_prefix(prefix) {
            return Err(ConfigError::Route {
                prefix: prefix.to_string(),
                reason: "prefix must start with `/`, must not end with `/` and must not be `/`"
                    .to_string(),
            });
        }
        let target = parse_target(target).map_err(|reason| ConfigError::Route {
            prefix: prefix.to_string(),
            reason,
        })?;

        Ok(Self {
            matcher: PathPrefixMatcher::new(prefix),
            target,
            transform: RequestTransform::None,
            secure_upstream: true,
        })
    }

    pub fn with_transform(mut self, transform: RequestTransform) -> Self {
        self.transform = transform;
        self
    }

    pub fn with_secure_upstream(mut self, secure: bool) -> Self {
        self.secure_upstream = secure;
        self
    }

    pub fn prefix(&self) -> &str {
        self.matcher.prefix()
    }

    pub fn target(&self) -> &Url {
        &self.target
    }

    pub fn transform(&self) -> &RequestTransform {
        &self.transform
    }

    /// Whether TLS certificates are validated when contacting the target.
    pub fn secure_upstream(&self) -> bool {
        self.secure_upstream
    }

    /// Remove this entry's prefix from `path`, if it matches.
    pub fn strip_prefix<'a>(&self, path: &'a str) -> Option<&'a str> {
        self.matcher.strip(path)
    }

    /// Upstream URL for an already stripped path and final query string.
    ///
    /// The target's own query comes first; `query` is appended after it.
    pub fn upstream_url(&self, path: &str, query: Option<&str>) -> Url {
        let mut url = self.target.clone();
        if !path.is_empty() {
            let base = self.target.path().trim_end_matches('/');
            let sep = if path.starts_with('/') { "" } else { "/" };
            url.set_path(&format!("{}{}{}", base, sep, path));
        }

        let query = query.filter(|q| !q.is_empty());
        let merged = match (self.target.query().filter(|q| !q.is_empty()), query) {
            (Some(own), Some(extra)) => Some(format!("{}&{}", own, extra)),
            (Some(own), None) => Some(own.to_string()),
            (None, extra) => extra.map(str::to_string),
        };
        url.set_query(merged.as_deref());
        url
    }

    fn from_config(
        route: &RouteConfig,
        config: &GatewayConfig,
        secrets: &Secrets,
    ) -> Result<Self, ConfigError> {
        let secure = route
            .secure
            .unwrap_or_else(|| config.environment.is_production());

        let transform = match &route.transform {
            None => RequestTransform::None,
            Some(t) => {
                let key = t.secret_key();
                let value = secrets
                    .get(key)
                    .cloned()
                    .ok_or_else(|| ConfigError::MissingSecret {
                        prefix: route.prefix.clone(),
                        key: key.to_string(),
                    })?;
                match t {
                    TransformConfig::AppendQueryParam { name, .. } => {
                        RequestTransform::AppendQueryParam {
                            name: name.clone(),
                            key: key.to_string(),
                            value,
                        }
                    }
                    TransformConfig::SetHeader { name, .. } => {
                        let name = HeaderName::from_bytes(name.as_bytes()).map_err(|e| {
                            ConfigError::Route {
                                prefix: route.prefix.clone(),
                                reason: format!("invalid header name `{}`: {}", name, e),
                            }
                        })?;
                        RequestTransform::SetHeader {
                            name,
                            key: key.to_string(),
                            value,
                        }
                    }
                }
            }
        };

        Ok(Self::new(&route.prefix, &route.target)?
            .with_transform(transform)
            .with_secure_upstream(secure))
    }
}

/// Ordered, immutable set of routes.
#[derive(Debug, Clone, Default)]
pub struct RouteTable {
    entries: Vec<RouteEntry>,
}

impl RouteTable {
    /// Build a table from entries, rejecting duplicate prefixes.
    pub fn new(entries: Vec<RouteEntry>) -> Result<Self, ConfigError> {
        let mut seen = HashSet::new();
        for entry in &entries {
            if !seen.insert(entry.prefix()) {
                return Err(ConfigError::Route {
                    prefix: entry.prefix().to_string(),
                    reason: "duplicate prefix".to_string(),
                });
            }
        }
        Ok(Self { entries })
    }

    /// Compile the configured routes, resolving transform secrets.
    pub fn from_config(config: &GatewayConfig, secrets: &Secrets) -> Result<Self, ConfigError> {
        let entries = config
            .routes
            .iter()
            .map(|route| RouteEntry::from_config(route, config, secrets))
            .collect::<Result<Vec<_>, _>>()?;

        let table = Self::new(entries)?;
        for entry in table.entries() {
            tracing::info!(
                prefix = %entry.prefix(),
                upstream = %entry.target(),
                secure_upstream = entry.secure_upstream(),
                transform = ?entry.transform(),
                "Route registered"
            );
        }
        Ok(table)
    }

    pub fn entries(&self) -> &[RouteEntry] {
        &self.entries
    }

    /// First entry matching `path`, with the remaining path after stripping.
    pub fn find<'a, 'p>(&'a self, path: &'p str) -> Option<(&'a RouteEntry, &'p str)> {
        self.entries
            .iter()
            .find_map(|entry| entry.strip_prefix(path).map(|rest| (entry, rest)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Environment;

    fn weather_config(environment: Environment) -> GatewayConfig {
        GatewayConfig {
            environment,
            ..GatewayConfig::default()
        }
    }

    fn secrets() -> Secrets {
        let mut secrets = Secrets::new();
        secrets.insert("API_KEY", "k3y");
        secrets
    }

    #[test]
    fn preserves_configuration_order() {
        let table = RouteTable::from_config(&GatewayConfig::default(), &secrets()).unwrap();
        let prefixes: Vec<_> = table.entries().iter().map(|e| e.prefix()).collect();
        assert_eq!(prefixes, vec!["/api1", "/api2", "/weather"]);
    }

    #[test]
    fn secure_upstream_follows_environment() {
        let prod = RouteTable::from_config(&weather_config(Environment::Production), &secrets()).unwrap();
        assert!(prod.entries().iter().all(|e| e.secure_upstream()));

        let dev = RouteTable::from_config(&weather_config(Environment::Development), &secrets()).unwrap();
        assert!(dev.entries().iter().all(|e| !e.secure_upstream()));
    }

    #[test]
    fn secure_upstream_override() {
        let mut config = weather_config(Environment::Development);
        config.routes = vec![RouteConfig {
            secure: Some(true),
            ..RouteConfig::new("/echo", "https://example.test/echo")
        }];
        let table = RouteTable::from_config(&config, &Secrets::new()).unwrap();
        assert!(table.entries()[0].secure_upstream());
    }

    #[test]
    fn missing_secret_is_an_error() {
        let err = RouteTable::from_config(&GatewayConfig::default(), &Secrets::new()).unwrap_err();
        match err {
            ConfigError::MissingSecret { prefix, key } => {
                assert_eq!(prefix, "/weather");
                assert_eq!(key, "API_KEY");
            }
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn rejects_duplicates() {
        let entries = vec![
            RouteEntry::new("/echo", "https://a.test").unwrap(),
            RouteEntry::new("/echo", "https://b.test").unwrap(),
        ];
        assert!(RouteTable::new(entries).is_err());
    }

    #[test]
    fn find_first_match() {
        let table = RouteTable::new(vec![
            RouteEntry::new("/a", "https://first.test").unwrap(),
            RouteEntry::new("/a/b", "https://second.test").unwrap(),
            RouteEntry::new("/c", "https://third.test").unwrap(),
        ])
        .unwrap();

        let (entry, rest) = table.find("/a/b/c").unwrap();
        assert_eq!(entry.target().host_str(), Some("first.test"));
        assert_eq!(rest, "/b/c");

        let (entry, rest) = table.find("/c").unwrap();
        assert_eq!(entry.prefix(), "/c");
        assert_eq!(rest, "");

        assert!(table.find("/nope").is_none());
        assert!(table.find("/ab").is_none());
    }

    #[test]
    fn upstream_url_joins_paths() {
        let entry = RouteEntry::new("/echo", "https://example.test/echo").unwrap();
        let rest = entry.strip_prefix("/echo/42").unwrap();
        assert_eq!(
            entry.upstream_url(rest, Some("x=1")).as_str(),
            "https://example.test/echo/42?x=1"
        );
        assert_eq!(
            entry.upstream_url("", None).as_str(),
            "https://example.test/echo"
        );
        assert_eq!(
            entry.upstream_url("/a/b/c", None).as_str(),
            "https://example.test/echo/a/b/c"
        );

        let slash = RouteEntry::new("/s", "https://example.test/base/").unwrap();
        assert_eq!(slash.upstream_url("/x", None).as_str(), "https://example.test/base/x");

        let root = RouteEntry::new("/r", "http://127.0.0.1:8080").unwrap();
        assert_eq!(root.upstream_url("/x", Some("q=1")).as_str(), "http://127.0.0.1:8080/x?q=1");
        assert_eq!(root.upstream_url("", None).as_str(), "http://127.0.0.1:8080/");
    }

    #[test]
    fn upstream_url_keeps_target_query() {
        let entry = RouteEntry::new("/svc", "https://example.test/base?token=abc").unwrap();
        assert_eq!(
            entry.upstream_url("/x", None).as_str(),
            "https://example.test/base/x?token=abc"
        );
        assert_eq!(
            entry.upstream_url("/x", Some("q=1")).as_str(),
            "https://example.test/base/x?token=abc&q=1"
        );
        assert_eq!(
            entry.upstream_url("", Some("q=1&appid=k")).as_str(),
            "https://example.test/base?token=abc&q=1&appid=k"
        );
    }

    #[test]
    fn upstream_url_inserts_missing_slash() {
        let entry = RouteEntry::new("/svc", "https://example.test/base").unwrap();
        assert_eq!(entry.upstream_url("v2", None).as_str(), "https://example.test/base/v2");

        let root = RouteEntry::new("/r", "http://127.0.0.1:8080").unwrap();
        assert_eq!(root.upstream_url("v2", None).as_str(), "http://127.0.0.1:8080/v2");
    }

    #[test]
    fn rejects_bad_entries() {
        assert!(RouteEntry::new("weather", "https://example.test").is_err());
        assert!(RouteEntry::new("/weather", "not a url").is_err());
    }
}
