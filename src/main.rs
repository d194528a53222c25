use catalog_recon::{cli, config, error, project, reconcile, review, rule_source};
use catalog_recon_common::{codec, find_best, ReconciliationSession};
use clap::Parser;
use cli::{Cli, Commands, SourceArgs};
use config::Config;
use error::Result;
use review::{AcceptAll, InteractiveReviewer, RejectAll, Reviewer};
use rule_source::RuleSourceOptions;

fn main() {
    let cli = Cli::parse();
    init_logger(cli.verbose);

    if let Err(e) = run(cli) {
        eprintln!("❌ {}", e);
        std::process::exit(1);
    }
}

fn init_logger(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .format_timestamp(None)
        .init();
}

fn run(cli: Cli) -> Result<()> {
    // 壊れた設定ファイルでも --reset だけは通す
    let config = match (&cli.command, Config::load()) {
        (Commands::Config { reset: true, .. }, Err(e)) => {
            log::warn!("ignoring unreadable config: {}", e);
            Config::default()
        }
        (_, loaded) => loaded?,
    };

    match cli.command {
        Commands::Import { opml, output } => {
            println!("🌳 catalog-recon - アウトライン取込\n");

            println!("[1/2] OPMLを解析中...");
            let mut tree = project::import_opml_file(&opml, config.progress_interval)?;
            let stats = tree.stats();
            println!("✔ {}ノード ({}フォルダ, {}リーフ)\n", stats.nodes, stats.folders, stats.leaves);

            println!("[2/2] プロジェクトを保存中...");
            let output = output.unwrap_or_else(|| opml.with_extension("json"));
            project::save_project(&mut tree, &output)?;
            println!("✔ 保存: {}", output.display());

            println!("\n✅ 取込完了");
        }

        Commands::Reconcile { project: project_path, rules, source, accept_all, reject_fuzzy, output, dry_run } => {
            println!("🔗 catalog-recon - コード照合\n");

            println!("[1/4] プロジェクトを読み込み中...");
            let mut tree = project::load_project(&project_path, config.progress_interval)?;
            println!("✔ {}ノード\n", tree.stats().nodes);

            println!("[2/4] ルールファイルを読み込み中...");
            let options = source_options(&config, source);
            let rows = rule_source::load_rules(&rules, &options)?;
            println!("✔ {}行 ({}〜{}行目)\n", rows.len(), options.first_row(), options.row_end);

            println!("[3/4] 照合中...");
            let mut session = ReconciliationSession::for_tree(&tree, config.color_assigner(), config.match_options());
            let mut reviewer: Box<dyn Reviewer> = if accept_all {
                Box::new(AcceptAll)
            } else if reject_fuzzy {
                Box::new(RejectAll)
            } else {
                Box::new(InteractiveReviewer)
            };
            let outcome = reconcile::reconcile(&mut tree, &rows, &mut session, reviewer.as_mut())?;
            let summary = &outcome.summary;
            println!("✔ 完全一致 {}件 / あいまい一致 {}件 / 不一致 {}件", outcome.exact, outcome.fuzzy, summary.unmatched);
            println!("  ルール {}件 (読み飛ばし {}行)", summary.rules, summary.skipped_rows);
            if !summary.overwritten.is_empty() {
                println!("⚠ 重複したパス {}件 は後の行を採用: {}", summary.overwritten.len(), summary.overwritten.join(", "));
            }
            let report = &outcome.report;
            println!("✔ 更新 {}件 (完全一致 {}, あいまい一致 {})", report.applied, report.exact_applied, report.fuzzy_applied);
            if report.stale > 0 {
                println!("⚠ 見つからない候補 {}件 をスキップ", report.stale);
            }
            println!();

            println!("[4/4] 保存中...");
            if dry_run {
                println!("- ドライラン: 保存しません");
            } else if let Some(target) = reconcile::save_target(&project_path, output.as_deref(), tree.is_dirty()) {
                project::save_project(&mut tree, &target)?;
                println!("✔ 保存: {}", target.display());
            } else {
                println!("- 変更なし");
            }

            println!("\n✅ 照合完了");
        }

        Commands::Export { project: project_path, output } => {
            let tree = project::load_project(&project_path, config.progress_interval)?;
            match output {
                Some(output) => {
                    project::export_outline_file(&tree, &output)?;
                    println!("✔ 出力: {}", output.display());
                }
                None => print!("{}", codec::export_outline(&tree)),
            }
        }

        Commands::Search { project: project_path, query } => {
            let tree = project::load_project(&project_path, config.progress_interval)?;
            match find_best(&tree, &query) {
                Some(hit) => {
                    let code = tree.node(&hit.path).map(|node| node.code()).unwrap_or_default();
                    println!("✔ {} ({:.2})", hit.full_path, hit.score);
                    if !code.is_empty() {
                        println!("  コード: {}", code);
                    }
                }
                None => println!("一致するノードが見つかりません: {}", query),
            }
        }

        Commands::Stats { project: project_path } => {
            let tree = project::load_project(&project_path, config.progress_interval)?;
            let stats = tree.stats();
            println!("集計: {}", project_path.display());
            println!("  ノード: {}", stats.nodes);
            println!("  フォルダ: {}", stats.folders);
            println!("  リーフ: {}", stats.leaves);
            println!("  コード設定済み: {}", stats.coded);
            println!("  お気に入り: {}", stats.favorites);
        }

        Commands::Config { show, set_columns, set_range, reset } => {
            let mut config = if reset { Config::default() } else { config };

            if let Some(columns) = set_columns {
                if let [path_column, code_column] = columns.as_slice() {
                    config.set_columns(path_column, code_column)?;
                }
            }
            if let Some(range) = set_range {
                if let [start, end] = range.as_slice() {
                    config.set_range(*start, *end)?;
                }
            }

            let changed = reset || differs_from_saved(&config)?;
            if changed {
                config.save()?;
                println!("✔ 設定を保存しました");
            }

            if show {
                println!("設定:");
                println!("  パス列: {}", config.path_column);
                println!("  コード列: {}", config.code_column);
                println!("  行範囲: {}〜{}", config.row_start, config.row_end);
                println!("  あいまい一致の閾値: {}", config.fuzzy_threshold);
                println!("  OCR誤字の閾値: {}", config.typo_threshold);
                println!("  長さの許容差: {}", config.length_slack);
                println!("  進捗間隔: {}ノード", config.progress_interval);
                println!("  パレット: {}", config.palette.join(" "));
            }
        }
    }

    Ok(())
}

/// 保存済みの設定と違うか
fn differs_from_saved(config: &Config) -> Result<bool> {
    Ok(Config::load()? != *config)
}

fn source_options(config: &Config, source: SourceArgs) -> RuleSourceOptions {
    let mut options = RuleSourceOptions::from_config(config);
    if let Some(start) = source.start {
        options.row_start = start;
    }
    if let Some(end) = source.end {
        options.row_end = end;
    }
    if let Some(column) = source.path_column {
        options.path_column = column;
    }
    if let Some(column) = source.code_column {
        options.code_column = column;
    }
    options
}
