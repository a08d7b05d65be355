use anyhow::Context;
use applybot_engine::config::{ApplyConfig, ConfigLoader};
use applybot_engine::failure::{FailureHandler, recovery};
use applybot_engine::knowledge::{KnowledgeBase, KnowledgeResolver};
use applybot_engine::logs::QuestionLogger;
use applybot_engine::navigation::{BatchReport, JobBoard};
use applybot_engine::stepper::FormStepper;
use applybot_engine::{Label, PageDriver};
use std::path::Path;
use tokio::io::{AsyncBufReadExt, BufReader, Stdin};
use tracing::warn;
use url::Url;

pub async fn load_config(path: Option<&Path>) -> anyhow::Result<ApplyConfig> {
    ConfigLoader::load(path).await.context("Failed to load config")
}

async fn load_knowledge(config: &ApplyConfig) -> anyhow::Result<KnowledgeResolver> {
    let kb = KnowledgeBase::load(&config.knowledge)
        .await
        .context("Failed to load knowledge base")?;
    Ok(KnowledgeResolver::new(kb))
}

/// `applybot resolve <LABEL>`: show what a label would be answered with.
pub async fn resolve(config: &ApplyConfig, label: &str) -> anyhow::Result<()> {
    let resolver = load_knowledge(config).await?;
    let label = Label::normalize(label);
    match resolver.lookup(&label) {
        Some(resolved) => println!("{}\t{:?}", resolved.answer, resolved.source),
        None => println!("(no answer for \"{}\")", label),
    }
    Ok(())
}

/// The operator's terminal. The start prompt and the recovery policy share one buffer.
type OperatorInput = BufReader<Stdin>;

fn build_board(
    config: &ApplyConfig,
    resolver: KnowledgeResolver,
    input: OperatorInput,
) -> JobBoard {
    let failures = FailureHandler::new(
        config.logs.failure_log.clone(),
        config.selectors.clone(),
        recovery::with_input(&config.recovery, input),
        config.stepper.settle(),
    );
    let stepper = FormStepper::new(
        config,
        resolver,
        QuestionLogger::new(config.logs.question_log.clone()),
        failures,
    );
    JobBoard::new(config, stepper)
}

pub async fn run_batch<D: PageDriver + ?Sized>(
    driver: &mut D,
    config: &ApplyConfig,
    start_url: &str,
) -> anyhow::Result<()> {
    let start_url = Url::parse(start_url).context("Invalid start URL")?;
    let resolver = load_knowledge(config).await?;

    driver.launch().await.context("Failed to launch browser")?;
    let result = drive(driver, config, resolver, &start_url).await;
    if let Err(e) = driver.close().await {
        warn!("Failed to close browser: {}", e);
    }

    let report = result?;
    println!(
        "Applied: {}  Failed: {}  Skipped: {}  Incomplete: {}  Errors: {}  Pages: {}{}",
        report.applied,
        report.failed,
        report.skipped,
        report.incomplete,
        report.errors,
        report.pages,
        if report.aborted { "  (aborted)" } else { "" }
    );
    Ok(())
}

async fn drive<D: PageDriver + ?Sized>(
    driver: &mut D,
    config: &ApplyConfig,
    resolver: KnowledgeResolver,
    start_url: &Url,
) -> anyhow::Result<BatchReport> {
    driver
        .navigate(start_url.as_str())
        .await
        .context("Failed to open start page")?;

    eprintln!("Log in, open the job search results, then press Enter to start.");
    let mut input: OperatorInput = BufReader::new(tokio::io::stdin());
    let mut line = String::new();
    input
        .read_line(&mut line)
        .await
        .context("Failed to read from stdin")?;

    let board = build_board(config, resolver, input);
    Ok(board.run(driver).await?)
}
