use anyhow::{bail, Context};
use clap::{Args, Parser};
use nf_client::gateway::DEFAULT_GATEWAY_URL;
use nf_client::presenter::DEFAULT_MAX_ITEMS;
use nf_client::seen::DEFAULT_SEEN_CAPACITY;
use nf_client::{
    ClientConfig, FeedPresenter, FeedScheduler, GatewayClient, HtmlFileSink, MultiSink,
    RefreshOutcome, TerminalSink,
};
use nf_core::KeywordSet;
use nf_gateway::GatewayConfig;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct HumanDuration(Duration);

impl FromStr for HumanDuration {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let mut total_seconds = 0u64;
        let mut current_number = String::new();
        let mut has_number = false;

        for c in s.trim().chars() {
            if c.is_ascii_digit() {
                current_number.push(c);
            } else if let Ok(num) = current_number.parse::<u64>() {
                let factor = match c {
                    's' => 1,
                    'm' => 60,
                    'h' => 3600,
                    'd' => 86400,
                    _ => return Err(format!("Invalid duration unit: {}", c)),
                };
                total_seconds = num
                    .checked_mul(factor)
                    .and_then(|n| total_seconds.checked_add(n))
                    .ok_or_else(|| "Duration is too large".to_string())?;
                current_number.clear();
                has_number = true;
            } else if !c.is_whitespace() {
                return Err(format!("Invalid character in duration: {}", c));
            }
        }

        // A trailing bare number counts as seconds
        if !current_number.is_empty() {
            let num = current_number
                .parse::<u64>()
                .map_err(|_| "Invalid number in duration".to_string())?;
            total_seconds = total_seconds
                .checked_add(num)
                .ok_or_else(|| "Duration is too large".to_string())?;
            has_number = true;
        }

        if !has_number {
            return Err("Duration must include a number".to_string());
        }
        if total_seconds == 0 {
            return Err("Duration must be greater than zero".to_string());
        }

        Ok(HumanDuration(Duration::from_secs(total_seconds)))
    }
}

#[derive(Parser, Debug)]
#[command(author, version, about = "Keyword news feed: gateway and terminal client", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Run the news gateway. Requires NEWS_API_KEY.
    Serve(ServeArgs),
    /// Refresh the feed now, then on every interval until Ctrl-C
    Watch {
        #[command(flatten)]
        client: ClientArgs,
        /// Time between refreshes (e.g. 10m, 1h, 1h15m30s)
        #[arg(long, default_value = "10m")]
        interval: HumanDuration,
    },
    /// Run a single refresh cycle and exit
    Once {
        #[command(flatten)]
        client: ClientArgs,
    },
}

/// Flags override the environment.
#[derive(Args, Debug)]
struct ServeArgs {
    #[arg(long)]
    port: Option<u16>,
    /// Directory served for every path other than the API
    #[arg(long)]
    static_dir: Option<PathBuf>,
    /// Base URL of the news search API
    #[arg(long)]
    upstream_url: Option<String>,
    #[arg(long)]
    language: Option<String>,
    #[arg(long)]
    page_size: Option<u32>,
    /// Keywords used when a request has none, as `a OR b`
    #[arg(long)]
    fallback_keywords: Option<String>,
}

impl ServeArgs {
    fn apply(self, mut config: GatewayConfig) -> GatewayConfig {
        if let Some(port) = self.port {
            config.port = port;
        }
        if let Some(dir) = self.static_dir {
            config.static_dir = Some(dir);
        }
        if let Some(url) = self.upstream_url {
            config.upstream_url = url;
        }
        if let Some(language) = self.language {
            config.language = language;
        }
        if let Some(page_size) = self.page_size.filter(|&n| n > 0) {
            config.page_size = page_size;
        }
        if let Some(fallback) = self
            .fallback_keywords
            .map(|s| KeywordSet::parse(&s))
            .filter(|k| !k.is_empty())
        {
            config.fallback = fallback;
        }
        config.normalized()
    }
}

#[derive(Args, Debug)]
struct ClientArgs {
    #[arg(long, env = "NEWS_GATEWAY_URL", default_value = DEFAULT_GATEWAY_URL)]
    gateway_url: String,
    /// Keywords of the primary query, as `a OR b`
    #[arg(long, env = "NEWS_KEYWORDS")]
    keywords: Option<String>,
    /// Also write the feed as an HTML fragment to this file
    #[arg(long)]
    html_out: Option<PathBuf>,
    /// Do not print the feed to stdout
    #[arg(long)]
    quiet: bool,
    #[arg(long, default_value_t = DEFAULT_MAX_ITEMS)]
    max_items: usize,
    /// Fingerprints remembered across cycles; 0 keeps all of them
    #[arg(long, default_value_t = DEFAULT_SEEN_CAPACITY)]
    seen_capacity: usize,
    /// Per-request timeout (e.g. 30s)
    #[arg(long)]
    timeout: Option<HumanDuration>,
}

impl ClientArgs {
    fn presenter(self) -> anyhow::Result<FeedPresenter<GatewayClient, MultiSink>> {
        let source = GatewayClient::new(&self.gateway_url, self.timeout.map(|t| t.0))
            .context("Failed to create gateway client")?;

        let mut sink = MultiSink::new();
        if !self.quiet {
            sink = sink.with(TerminalSink::stdout());
        }
        if let Some(path) = self.html_out {
            info!("📝 Writing feed to {}", path.display());
            sink = sink.with(HtmlFileSink::new(path));
        }

        let mut config = ClientConfig {
            max_items: self.max_items,
            seen_capacity: self.seen_capacity,
            ..ClientConfig::default()
        };
        if let Some(keywords) = self
            .keywords
            .map(|s| KeywordSet::parse(&s))
            .filter(|k| !k.is_empty())
        {
            config.primary = keywords;
        }

        info!(
            gateway = %source.endpoint(),
            keywords = %config.primary,
            "📰 Feed client ready"
        );
        Ok(FeedPresenter::new(source, sink, config))
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    nf_client::init_logging();
    let cli = Cli::parse();

    match cli.command {
        Commands::Serve(args) => {
            let config = args.apply(GatewayConfig::from_env()?);
            nf_gateway::serve(config).await?;
        }
        Commands::Watch { client, interval } => {
            let presenter = client.presenter()?;
            info!("Running in periodic mode with {}s interval", interval.0.as_secs());
            FeedScheduler::new(presenter, interval.0).run().await;
        }
        Commands::Once { client } => {
            let mut presenter = client.presenter()?;
            match presenter.refresh().await {
                RefreshOutcome::Failed => bail!("Failed to load news"),
                RefreshOutcome::NotDisplayed => bail!("Failed to display news"),
                _ => {}
            }
        }
    }

    Ok(())
}
