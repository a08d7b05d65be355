mod app;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

const DEFAULT_START_URL: &str = "https://www.linkedin.com/jobs/search/?f_AL=true";

#[derive(Parser)]
#[command(name = "applybot", version, about = "Easy Apply form automation")]
struct Args {
    #[command(subcommand)]
    mode: Mode,

    /// Config file (defaults to ./applybot.yaml, then ~/.applybot/config.yaml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Mode {
    /// Drive Chromium over CDP
    Headless {
        /// Launch browser in visible mode (not headless)
        #[arg(long)]
        visible: bool,
        /// Page opened before the operator logs in
        #[arg(long, default_value = DEFAULT_START_URL)]
        start_url: String,
    },
    /// Drive any browser through a WebDriver endpoint
    Webdriver {
        #[arg(long)]
        driver_url: String,
        #[arg(long, default_value = DEFAULT_START_URL)]
        start_url: String,
    },
    /// Print the answer the knowledge base gives for a question label
    Resolve { label: String },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // stdout carries command output; logs go to stderr.
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    let config = app::load_config(args.config.as_deref()).await?;

    match args.mode {
        Mode::Resolve { label } => app::resolve(&config, &label).await,
        Mode::Headless { visible, start_url } => {
            let mut driver = applybot_h::HeadlessDriver::new_with_visibility(visible);
            app::run_batch(&mut driver, &config, &start_url).await
        }
        Mode::Webdriver {
            driver_url,
            start_url,
        } => {
            let mut driver = applybot_e::RemoteDriver::new(driver_url);
            app::run_batch(&mut driver, &config, &start_url).await
        }
    }
}
