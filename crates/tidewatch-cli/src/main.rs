mod cli;

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, bail};
use clap::Parser;
use tidewatch_core::impls::{HttpTransport, JsonPointerFetcher, QuipBook};
use tidewatch_core::ports::{Clock, ContentSource, SystemClock};
use tidewatch_core::store::RecipientStore;
use tidewatch_core::{EngineBuilder, EngineConfig, MessageTemplate, Recipient};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::cli::{Cli, Command, DataFileArg, RegisterArgs, RunArgs};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(&cli.log_level)?;

    match cli.command {
        Command::Run(args) => run(args).await,
        Command::Register(args) => register(args),
        Command::List(args) => list(args),
    }
}

/// `RUST_LOG` が無ければ --log-level を使う。不正なレベルは起動エラー
fn init_tracing(level: &str) -> anyhow::Result<()> {
    if level.parse::<tracing::Level>().is_err() {
        bail!("invalid log level {level:?}: expected trace, debug, info, warn or error");
    }
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt().with_env_filter(filter).init();
    Ok(())
}

/// 割り込み（Ctrl-C）を受けたら新規受付を止め、残りの配信を待ってから終了
async fn run(args: RunArgs) -> anyhow::Result<()> {
    let timeout = Duration::from_secs(args.http_timeout_secs);

    let mut config = EngineConfig::new(&args.data.data_file);
    config.poll_interval = Duration::from_secs(args.poll_interval_secs);
    config.message = MessageTemplate {
        headline: args.headline,
        link: args.link,
    };

    let content: Arc<dyn ContentSource> = match &args.quips_file {
        Some(path) => Arc::new(
            QuipBook::from_file(path)
                .with_context(|| format!("reading quips from {}", path.display()))?,
        ),
        None => Arc::new(QuipBook::builtin()),
    };

    let mut engine = EngineBuilder::new(config)
        .fetcher(Arc::new(JsonPointerFetcher::new(
            args.source_url,
            args.source_pointer,
            timeout,
        )?))
        .transport(Arc::new(HttpTransport::new(timeout)?))
        .content(content)
        .build()
        .context("error instantiating engine")?;

    if args.once {
        let outcome = engine.run_cycle().await;
        info!(?outcome, "single cycle finished");
        let counts = engine.start_draining().stop().await;
        info!(delivered = counts.delivered, exhausted = counts.exhausted, "exiting");
        return Ok(());
    }

    let running = engine.start();
    tokio::signal::ctrl_c()
        .await
        .context("error waiting for interrupt")?;
    info!("received interrupt - waiting for all work to be done");
    let counts = running.stop().await;
    info!(delivered = counts.delivered, exhausted = counts.exhausted, "work is done - exiting");
    Ok(())
}

/// エンジンを起動せずにデータファイルだけを更新する
fn register(args: RegisterArgs) -> anyhow::Result<()> {
    let mut recipient = Recipient::new(args.id, args.name, args.endpoint);
    for (key, value) in args.metadata {
        recipient = recipient.with_metadata(key, serde_json::Value::String(value));
    }
    register_offline(&args.data.data_file, recipient, &SystemClock)
}

/// 検証はエンジン経由の登録と同じ（`Recipient::validate`）。不正ならファイルに触れない
fn register_offline(path: &Path, recipient: Recipient, clock: &dyn Clock) -> anyhow::Result<()> {
    recipient.validate()?;

    let mut store = RecipientStore::load(path);
    if let Some(previous) = store.upsert(recipient) {
        warn!(recipient = %previous.id, "replacing existing recipient");
    }

    store
        .save(path, clock)
        .with_context(|| format!("saving {}", path.display()))?;
    info!(path = %path.display(), recipients = store.len(), "saved");
    Ok(())
}

fn list(args: DataFileArg) -> anyhow::Result<()> {
    let store = RecipientStore::load(&args.data_file);
    let recipients: Vec<&Recipient> = store.iter().collect();
    println!("{}", serde_json::to_string_pretty(&recipients)?);
    Ok(())
}
