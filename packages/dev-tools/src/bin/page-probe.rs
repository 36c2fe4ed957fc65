//! Page Probe Binary
//!
//! Loads one page from a live site-material API, prints it, and resolves its
//! previous and next siblings the same way the navigator does.
//!
//! # Usage
//!
//! ```bash
//! PROBE_BASE_URL=https://lms.example.com PROBE_MATERIAL=1234 PROBE_PAGE=5678 \
//!     cargo run --bin page-probe
//! ```
//!
//! # Environment Variables
//!
//! - `PROBE_BASE_URL`: Site origin (required)
//! - `PROBE_MATERIAL`: Material id (required)
//! - `PROBE_PAGE`: Page id (defaults to the material's last viewed page)
//! - `PROBE_CONFIG`: Optional navigator config JSON file; the variables above
//!   override its fields
//! - `RUST_LOG`: Logging level (e.g., "info", "debug", "trace")

use std::env;
use std::sync::Arc;

use async_trait::async_trait;
use pagenav_core::{
    BrowserHost, HistoryState, HttpClient, NavigationOutcome, Navigator, NavigatorConfig,
    PageChangeOptions, PageKey, ScoreAggregator,
};
use serde_json::Value;

struct ReqwestClient {
    client: reqwest::Client,
}

#[async_trait]
impl HttpClient for ReqwestClient {
    async fn get(&self, url: &str) -> anyhow::Result<String> {
        let response = self.client.get(url).send().await?.error_for_status()?;
        Ok(response.text().await?)
    }

    async fn post(&self, url: &str, body: &Value) -> anyhow::Result<String> {
        let response = self
            .client
            .post(url)
            .json(body)
            .send()
            .await?
            .error_for_status()?;
        Ok(response.text().await?)
    }
}

/// No browser here; history and location changes are only logged
struct LoggingBrowser;

impl BrowserHost for LoggingBrowser {
    fn push_state(&self, state: &HistoryState, title: &str) {
        tracing::info!("history push {:?} ({})", state, title);
    }

    fn replace_state(&self, state: &HistoryState, title: &str) {
        tracing::info!("history replace {:?} ({})", state, title);
    }

    fn assign(&self, url: &str) {
        tracing::info!("location -> {}", url);
    }
}

fn print_neighbour(label: &str, outcome: &NavigationOutcome) {
    match outcome.displayed_page() {
        Some(page) => println!("  {}: {} - {}", label, page.id, page.title),
        None => println!("  {}: none", label),
    }
}

fn required_var(name: &str) -> anyhow::Result<String> {
    env::var(name).map_err(|_| anyhow::anyhow!("{} must be set", name))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let mut config = match env::var("PROBE_CONFIG") {
        Ok(path) => NavigatorConfig::load(&path).await?,
        Err(_) => NavigatorConfig::default(),
    };
    config.base_url = required_var("PROBE_BASE_URL")?;
    config.material_id = required_var("PROBE_MATERIAL")?;
    let material_id = config.material_id.clone();

    tracing::info!("Probing material {} at {}", material_id, config.base_url);

    let http = Arc::new(ReqwestClient {
        client: reqwest::Client::new(),
    });
    let navigator = Navigator::new(config, http, Arc::new(LoggingBrowser))?;

    let options = PageChangeOptions::default().load_content(false);
    let outcome = match env::var("PROBE_PAGE") {
        Ok(page_id) => navigator.change_page(page_id, options).await?,
        Err(_) => navigator
            .open_last_viewed(options)
            .await?
            .ok_or_else(|| anyhow::anyhow!("PROBE_PAGE not set and no last viewed page known"))?,
    };

    let page = match outcome {
        NavigationOutcome::Displayed { page, .. } => page,
        other => {
            tracing::warn!("Page was not displayed in place: {:?}", other);
            return Ok(());
        }
    };

    let achievement = ScoreAggregator::achievement(&page.scores);
    println!("{} - {}", page.key(), page.title);
    println!("  lock state: {:?}", page.lock_state);
    println!("  breadcrumb: {}", page.breadcrumb.join(" / "));
    println!("  children:   {}", page.children.len());
    println!(
        "  scores:     {}/{} ({} of {} stars, achievement {}/{})",
        page.scores.score,
        page.scores.score_max,
        page.scores.stars,
        page.scores.stars_max,
        achievement.tier,
        achievement.max
    );

    let here = PageKey::new(material_id, page.id.clone());
    let no_content = PageChangeOptions::default().load_content(false);

    let previous = navigator.previous_page(no_content.clone()).await?;
    print_neighbour("previous", &previous);

    // step back onto the probed page so "next" is relative to it
    navigator
        .change_page(here, no_content.clone().add_to_history(false))
        .await?;
    let next = navigator.next_page(no_content).await?;
    print_neighbour("next", &next);

    tracing::info!(
        "{} page(s) cached after probe",
        navigator.loader().cached_page_count().await
    );
    Ok(())
}
