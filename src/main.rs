use anyhow::Context;
use clap::{Parser, ValueEnum};
use log::info;
use std::path::PathBuf;
use std::time::Duration;

use turboperf::core::{ProbeBackend, Strategy, DEFAULT_MAX_REDIRECTS};
use turboperf::{load_urls, Collector, CollectorConfig};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Backend {
    /// Time a GET of each page
    Direct,
    /// Query PageSpeed Insights for a Lighthouse report of each page
    Pagespeed,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum StrategyArg {
    Desktop,
    Mobile,
}

impl From<StrategyArg> for Strategy {
    fn from(arg: StrategyArg) -> Self {
        match arg {
            StrategyArg::Desktop => Strategy::Desktop,
            StrategyArg::Mobile => Strategy::Mobile,
        }
    }
}

/// Measure web performance for a list of URLs and save it as CSV and JSON.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Cli {
    /// Line-delimited list of URLs; blank and '#' lines are ignored
    #[arg(long, default_value = "urls.txt")]
    urls_file: PathBuf,

    #[arg(long, default_value = "performance_data.csv")]
    csv_output: PathBuf,

    #[arg(long, default_value = "performance_data.json")]
    json_output: PathBuf,

    /// Per-request timeout in seconds (default: 10 direct, 60 pagespeed)
    #[arg(long)]
    timeout: Option<f64>,

    #[arg(long)]
    user_agent: Option<String>,

    /// Redirects followed before a fetch counts as a network error
    #[arg(long, default_value_t = DEFAULT_MAX_REDIRECTS)]
    max_redirects: usize,

    #[arg(long, value_enum, default_value_t = Backend::Direct)]
    backend: Backend,

    /// Lighthouse strategy, pagespeed backend only
    #[arg(long, value_enum, default_value_t = StrategyArg::Desktop)]
    strategy: StrategyArg,

    /// PageSpeed Insights API key, pagespeed backend only
    #[arg(long, env = "PAGESPEED_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Only report how many URLs would be measured
    #[arg(long)]
    check: bool,
}

impl Cli {
    fn config(&self) -> anyhow::Result<CollectorConfig> {
        let backend = match self.backend {
            Backend::Direct => ProbeBackend::Direct,
            Backend::Pagespeed => {
                ProbeBackend::pagespeed(self.api_key.clone(), self.strategy.into())
            }
        };

        let mut config = CollectorConfig::default()
            .with_backend(backend)
            .with_max_redirects(self.max_redirects);
        if let Some(secs) = self.timeout {
            let timeout = Duration::try_from_secs_f64(secs)
                .with_context(|| format!("invalid --timeout {}", secs))?;
            config = config.with_timeout(timeout);
        }
        if let Some(user_agent) = &self.user_agent {
            config = config.with_user_agent(user_agent.as_str());
        }
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::builder()
        .filter_level(log::LevelFilter::Info)
        .filter_module("html5ever", log::LevelFilter::Error)
        .filter_module("selectors", log::LevelFilter::Warn)
        .parse_default_env()
        .init();

    let cli = Cli::parse();

    if cli.check {
        let entries = load_urls(&cli.urls_file)
            .with_context(|| format!("failed to load {}", cli.urls_file.display()))?;
        println!(
            "{} URLs in {} would be measured. Check mode - exiting without fetching.",
            entries.len(),
            cli.urls_file.display()
        );
        return Ok(());
    }

    let collector = Collector::from_config(&cli.config()?)?;
    let result = collector
        .run(&cli.urls_file, &cli.csv_output, &cli.json_output)
        .await
        .context("performance collection aborted")?;

    collector.stats().print_summary();
    info!(
        "Done. Total records: {} ({} failed)",
        result.records.len(),
        result.failures()
    );
    Ok(())
}
