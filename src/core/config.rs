use std::time::Duration;

pub const DEFAULT_USER_AGENT: &str = concat!("turboperf/", env!("CARGO_PKG_VERSION"));
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);
pub const DEFAULT_PAGESPEED_TIMEOUT: Duration = Duration::from_secs(60);
pub const DEFAULT_MAX_REDIRECTS: usize = 10;
pub const PAGESPEED_API_URL: &str = "https://www.googleapis.com/pagespeedonline/v5/runPagespeed";

/// Lighthouse emulation profile requested from PageSpeed Insights.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Strategy {
    #[default]
    Desktop,
    Mobile,
}

impl Strategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Strategy::Desktop => "desktop",
            Strategy::Mobile => "mobile",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ProbeBackend {
    /// Time a plain GET of the page itself.
    #[default]
    Direct,
    /// Ask the PageSpeed Insights API for a Lighthouse run of the page.
    PageSpeed {
        api_url: String,
        api_key: Option<String>,
        strategy: Strategy,
    },
}

impl ProbeBackend {
    pub fn pagespeed(api_key: Option<String>, strategy: Strategy) -> Self {
        ProbeBackend::PageSpeed {
            api_url: PAGESPEED_API_URL.to_string(),
            api_key,
            strategy,
        }
    }
}

#[derive(Debug, Clone)]
pub struct CollectorConfig {
    pub backend: ProbeBackend,
    /// `None` picks the backend default.
    pub timeout: Option<Duration>,
    pub user_agent: String,
    pub headers: Vec<(String, String)>,
    pub max_redirects: usize,
}

impl Default for CollectorConfig {
    fn default() -> Self {
        Self {
            backend: ProbeBackend::default(),
            timeout: None,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            headers: Vec::new(),
            max_redirects: DEFAULT_MAX_REDIRECTS,
        }
    }
}

impl CollectorConfig {
    pub fn with_backend(mut self, backend: ProbeBackend) -> Self {
        self.backend = backend;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    pub fn with_headers(mut self, headers: Vec<(&str, &str)>) -> Self {
        self.headers = headers
            .into_iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        self
    }

    pub fn with_max_redirects(mut self, max_redirects: usize) -> Self {
        self.max_redirects = max_redirects;
        self
    }

    pub fn effective_timeout(&self) -> Duration {
        self.timeout.unwrap_or(match self.backend {
            ProbeBackend::Direct => DEFAULT_TIMEOUT,
            ProbeBackend::PageSpeed { .. } => DEFAULT_PAGESPEED_TIMEOUT,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timeout_defaults_follow_backend() {
        let direct = CollectorConfig::default();
        assert_eq!(direct.effective_timeout(), DEFAULT_TIMEOUT);

        let psi = CollectorConfig::default()
            .with_backend(ProbeBackend::pagespeed(None, Strategy::Mobile));
        assert_eq!(psi.effective_timeout(), DEFAULT_PAGESPEED_TIMEOUT);

        let explicit = psi.with_timeout(Duration::from_secs(3));
        assert_eq!(explicit.effective_timeout(), Duration::from_secs(3));
    }

    #[test]
    fn test_builder_sets_headers() {
        let config = CollectorConfig::default()
            .with_user_agent("bench/1.0")
            .with_headers(vec![("accept-language", "en")]);
        assert_eq!(config.user_agent, "bench/1.0");
        assert_eq!(
            config.headers,
            vec![("accept-language".to_string(), "en".to_string())]
        );
    }
}
