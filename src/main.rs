use clap::{Parser, ValueEnum};
use cart_scrape_rs::crawler::CartCrawler;
use cart_scrape_rs::dom::HtmlNode;
use cart_scrape_rs::models::{CrawlerRunConfig, WaitStrategy};
use cart_scrape_rs::share::ShareLinkResolver;
use cart_scrape_rs::{CartExtractor, ExtractionReport, ExtractorConfig, PagePayload};
use std::fs;
use std::path::{Path, PathBuf};
use anyhow::{Context, Result};
use log::{info, error};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Cart or share URL to scrape
    #[arg(required_unless_present = "html_file")]
    url: Option<String>,

    /// Extract from a saved HTML file instead of a live page
    #[arg(long, conflicts_with = "url")]
    html_file: Option<PathBuf>,

    /// Run DOM heuristics over the saved HTML as well
    #[arg(long, requires = "html_file", default_value_t = false)]
    static_dom: bool,

    /// Extractor configuration (JSON, partial allowed)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Show the browser window
    #[arg(long, default_value_t = false)]
    headful: bool,

    /// Fixed wait after navigation, in milliseconds
    #[arg(long, default_value_t = 5000)]
    settle_ms: u64,

    /// Wait for this selector instead of a fixed delay
    #[arg(long)]
    wait_for: Option<String>,

    /// Give up waiting for --wait-for after this many milliseconds
    #[arg(long, default_value_t = 15000)]
    wait_timeout_ms: u64,

    /// Output file path (optional)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Pretty)]
    format: OutputFormat,
}

#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, ValueEnum, Debug)]
enum OutputFormat {
    Pretty,
    Json,
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let config = load_config(args.config.as_deref())?;
    let extractor = CartExtractor::new(config).context("invalid extractor configuration")?;

    let report = match (&args.html_file, &args.url) {
        (Some(path), _) => extract_from_file(&extractor, path, args.static_dom).await?,
        (None, Some(url)) => extract_from_url(&extractor, url, &args).await?,
        (None, None) => anyhow::bail!("a URL or --html-file is required"),
    };

    handle_output(&report, &args)?;

    if !report.success || report.items.is_empty() {
        error!(
            "No items extracted: {}",
            report.message.as_deref().unwrap_or("unknown reason")
        );
        std::process::exit(1);
    }

    Ok(())
}

fn load_config(path: Option<&Path>) -> Result<ExtractorConfig> {
    match path {
        Some(path) => {
            let raw = fs::read_to_string(path)
                .with_context(|| format!("reading config {:?}", path))?;
            ExtractorConfig::from_json_str(&raw)
                .with_context(|| format!("parsing config {:?}", path))
        }
        None => Ok(ExtractorConfig::default()),
    }
}

async fn extract_from_file(
    extractor: &CartExtractor,
    path: &Path,
    static_dom: bool,
) -> Result<ExtractionReport> {
    let html = fs::read_to_string(path).with_context(|| format!("reading {:?}", path))?;
    info!("Extracting from {:?} ({} bytes)", path, html.len());

    let report = if static_dom {
        let root = HtmlNode::parse(&html);
        extractor.extract(&PagePayload::with_dom(html, root)).await
    } else {
        extractor.extract(&PagePayload::from_html(html)).await
    };
    Ok(report)
}

async fn extract_from_url(
    extractor: &CartExtractor,
    url: &str,
    args: &Args,
) -> Result<ExtractionReport> {
    let wait_for = match &args.wait_for {
        Some(selector) => WaitStrategy::Selector {
            selector: selector.clone(),
            timeout_ms: args.wait_timeout_ms,
        },
        None => WaitStrategy::Fixed(args.settle_ms),
    };
    let run_config = CrawlerRunConfig {
        headless: !args.headful,
        wait_for,
        ..Default::default()
    };

    let client = reqwest::Client::builder()
        .user_agent(run_config.user_agent.as_str())
        .build()?;
    let resolver = ShareLinkResolver::new(client)?;
    let cart_url = resolver.resolve(url).await?;

    info!("Starting crawl for URL: {}", cart_url);
    let mut crawler = CartCrawler::new();
    crawler.arun(&cart_url, &run_config, extractor).await
}

fn handle_output(report: &ExtractionReport, args: &Args) -> Result<()> {
    let content = match args.format {
        OutputFormat::Pretty => serde_json::to_string_pretty(report)?,
        OutputFormat::Json => serde_json::to_string(report)?,
    };

    if let Some(path) = &args.output {
        fs::write(path, content)?;
        println!("Output written to {:?}", path);
    } else {
        println!("{}", content);
    }

    Ok(())
}
