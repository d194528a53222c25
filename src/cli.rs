use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "catalog-recon")]
#[command(about = "商品カテゴリ階層ツリーとコード割当表の照合ツール", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// 詳細ログを出力
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// OPMLアウトラインから新しいプロジェクトを作成
    Import {
        /// OPMLファイル
        #[arg(required = true)]
        opml: PathBuf,

        /// 出力プロジェクトJSON（デフォルト: 入力と同名の .json）
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// ルールファイルでコードを照合・適用
    Reconcile {
        /// プロジェクトJSON
        #[arg(required = true)]
        project: PathBuf,

        /// ルールファイル (csv/xlsx/xls/ods)
        #[arg(required = true)]
        rules: PathBuf,

        #[command(flatten)]
        source: SourceArgs,

        /// あいまい一致をすべて承認
        #[arg(long, conflicts_with = "reject_fuzzy")]
        accept_all: bool,

        /// あいまい一致をすべて却下（完全一致のみ適用）
        #[arg(long)]
        reject_fuzzy: bool,

        /// 保存先（デフォルト: プロジェクトを上書き）
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// 保存せずに結果だけ表示
        #[arg(long)]
        dry_run: bool,
    },

    /// インデント付きテキストに出力
    Export {
        /// プロジェクトJSON
        #[arg(required = true)]
        project: PathBuf,

        /// 出力ファイル（デフォルト: 標準出力）
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// ノードをあいまい検索
    Search {
        /// プロジェクトJSON
        #[arg(required = true)]
        project: PathBuf,

        /// 検索語（名前またはフルパス）
        #[arg(required = true)]
        query: String,
    },

    /// ツリーの集計を表示
    Stats {
        /// プロジェクトJSON
        #[arg(required = true)]
        project: PathBuf,
    },

    /// 設定を表示・変更
    Config {
        /// 設定を表示
        #[arg(long)]
        show: bool,

        /// パス列とコード列を設定
        #[arg(long, num_args = 2, value_names = ["PATH_COLUMN", "CODE_COLUMN"])]
        set_columns: Option<Vec<String>>,

        /// 読み込む行範囲を設定（ヘッダが1行目）
        #[arg(long, num_args = 2, value_names = ["START", "END"])]
        set_range: Option<Vec<usize>>,

        /// 既定値に戻す
        #[arg(long)]
        reset: bool,
    },
}

/// ルールファイルの読み込み条件（設定より優先）
#[derive(Args, Debug, Default)]
pub struct SourceArgs {
    /// 最初の行（ヘッダが1行目）
    #[arg(long)]
    pub start: Option<usize>,

    /// 最後の行
    #[arg(long)]
    pub end: Option<usize>,

    /// パス列名
    #[arg(long)]
    pub path_column: Option<String>,

    /// コード列名
    #[arg(long)]
    pub code_column: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_reconcile() {
        let cli = Cli::parse_from([
            "catalog-recon", "reconcile", "p.json", "rules.csv", "--start", "3", "--end", "40",
            "--code-column", "Code", "--reject-fuzzy", "--dry-run",
        ]);
        match cli.command {
            Commands::Reconcile { project, source, reject_fuzzy, accept_all, dry_run, .. } => {
                assert_eq!(project, PathBuf::from("p.json"));
                assert_eq!(source.start, Some(3));
                assert_eq!(source.end, Some(40));
                assert_eq!(source.code_column.as_deref(), Some("Code"));
                assert!(source.path_column.is_none());
                assert!(reject_fuzzy && dry_run && !accept_all);
            }
            _ => panic!("reconcile expected"),
        }
    }

    #[test]
    fn test_accept_and_reject_conflict() {
        let result = Cli::try_parse_from([
            "catalog-recon", "reconcile", "p.json", "r.csv", "--accept-all", "--reject-fuzzy",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_parse_config_columns() {
        let cli = Cli::parse_from(["catalog-recon", "config", "--set-columns", "Path", "Code", "-v"]);
        assert!(cli.verbose);
        match cli.command {
            Commands::Config { set_columns, set_range, .. } => {
                assert_eq!(set_columns, Some(vec!["Path".to_string(), "Code".to_string()]));
                assert!(set_range.is_none());
            }
            _ => panic!("config expected"),
        }
    }
}
