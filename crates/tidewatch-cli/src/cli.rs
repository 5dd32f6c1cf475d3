//! コマンドライン定義（clap derive）

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// tidewatch: 値をポーリングし、変化したら webhook に通知する
#[derive(Debug, Parser)]
#[command(name = "tidewatch", version, about)]
pub struct Cli {
    /// ログレベル（trace / debug / info / warn / error）。`RUST_LOG` があればそちらが優先
    #[arg(long, global = true, env = "TIDEWATCH_LOG_LEVEL", default_value = "info")]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// 割り込みまでポーリングと配信を続ける
    Run(RunArgs),

    /// データファイルに受信者を追加（同じ id なら置き換え）
    Register(RegisterArgs),

    /// 保存済みの受信者を JSON で出力
    List(DataFileArg),
}

#[derive(Debug, Args)]
pub struct DataFileArg {
    /// JSON データファイルのパス
    #[arg(long, env = "TIDEWATCH_DATA_FILE")]
    pub data_file: PathBuf,
}

#[derive(Debug, Args)]
pub struct RunArgs {
    #[command(flatten)]
    pub data: DataFileArg,

    /// 監視する値を含む JSON ドキュメントの URL
    #[arg(long, env = "TIDEWATCH_SOURCE_URL")]
    pub source_url: String,

    /// ドキュメント内の値を指す JSON pointer（例: `/forecast/value`）
    #[arg(long, env = "TIDEWATCH_SOURCE_POINTER")]
    pub source_pointer: String,

    /// ポーリング間隔（秒）
    #[arg(long, default_value_t = 300)]
    pub poll_interval_secs: u64,

    /// メッセージ先頭の見出し
    #[arg(long, default_value = "Current value")]
    pub headline: String,

    /// メッセージ末尾に付けるリンク
    #[arg(long)]
    pub link: Option<String>,

    /// 1行1件の添え文ファイル。省略時は組み込みのリスト
    #[arg(long)]
    pub quips_file: Option<PathBuf>,

    /// 外向き HTTP リクエストのタイムアウト（秒）
    #[arg(long, default_value_t = 10)]
    pub http_timeout_secs: u64,

    /// 1回だけポーリングし、出た通知を配信して終了
    #[arg(long)]
    pub once: bool,
}

#[derive(Debug, Args)]
pub struct RegisterArgs {
    #[command(flatten)]
    pub data: DataFileArg,

    /// 受信者 id
    #[arg(long)]
    pub id: String,

    /// 表示名
    #[arg(long)]
    pub name: String,

    /// 通知の送り先 webhook URL
    #[arg(long)]
    pub endpoint: String,

    /// 追加メタデータ（key=value、複数指定可）
    #[arg(long = "meta", value_parser = parse_key_value)]
    pub metadata: Vec<(String, String)>,
}

fn parse_key_value(s: &str) -> Result<(String, String), String> {
    let (k, v) = s
        .split_once('=')
        .ok_or_else(|| format!("expected key=value, got {s:?}"))?;
    if k.is_empty() {
        return Err(format!("empty key in {s:?}"));
    }
    Ok((k.to_string(), v.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_run_command() {
        let cli = Cli::try_parse_from([
            "tidewatch",
            "--log-level",
            "debug",
            "run",
            "--data-file",
            "/tmp/db.json",
            "--source-url",
            "https://forecast.example/api",
            "--source-pointer",
            "/value",
            "--once",
        ])
        .unwrap();
        assert_eq!(cli.log_level, "debug");
        let Command::Run(args) = cli.command else {
            panic!("expected run");
        };
        assert_eq!(args.poll_interval_secs, 300);
        assert!(args.once);
        assert_eq!(args.data.data_file, PathBuf::from("/tmp/db.json"));
    }

    #[test]
    fn register_collects_metadata() {
        let cli = Cli::try_parse_from([
            "tidewatch",
            "register",
            "--data-file",
            "db.json",
            "--id",
            "T1",
            "--name",
            "Team One",
            "--endpoint",
            "https://hooks.example/T1",
            "--meta",
            "channel=#general",
            "--meta",
            "scope=incoming-webhook",
        ])
        .unwrap();
        let Command::Register(args) = cli.command else {
            panic!("expected register");
        };
        assert_eq!(
            args.metadata,
            vec![
                ("channel".to_string(), "#general".to_string()),
                ("scope".to_string(), "incoming-webhook".to_string()),
            ]
        );
    }

    #[test]
    fn bad_metadata_is_rejected() {
        assert!(parse_key_value("novalue").is_err());
        assert!(parse_key_value("=x").is_err());
        assert_eq!(parse_key_value("a=b=c").unwrap(), ("a".into(), "b=c".into()));
    }
}
