use clap::Parser;
use std::process::ExitCode;
use textaudit::{
    cli, config, counter, error, evaluate, extractor, organizer, outcome, renamer, scorer,
    textstats,
};
use cli::{Cli, Commands};
use config::Config;
use error::Result;
use outcome::RunSummary;
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(cli) {
        Ok(summary) => summary.exit_code(),
        Err(e) => {
            tracing::error!("{}", e);
            eprintln!("❌ {}", e);
            if e.is_configuration() {
                eprintln!("   引数と設定ファイル（textaudit config --show）を確認してください");
            }
            ExitCode::FAILURE
        }
    }
}

fn init_logging(verbose: bool) {
    let default = if verbose { "textaudit=debug,info" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)),
        )
        .with_target(false)
        .init();
}

fn run(cli: Cli) -> Result<RunSummary> {
    let config = match (&cli.command, cli.config.as_deref()) {
        // init は未作成の設定ファイルを指定できる
        (Commands::Config { init: true, .. }, Some(path)) if !path.exists() => Config::default(),
        (_, explicit) => Config::load(explicit)?,
    };

    let summary = match cli.command {
        Commands::Organize { input, output, dry_run } => {
            println!("📁 textaudit - ファイル整理{}\n", if dry_run { " (DRY RUN)" } else { "" });

            let options = organizer::OrganizeOptions {
                input_dir: input,
                output_dir: output.clone(),
                dry_run,
            };
            let (summary, stats) = organizer::organize(&options, &config.classifier())?;

            println!(
                "\n✔ {}件中 {}件を整理 / 未分類 {}件",
                stats.total,
                stats.organized,
                stats.unclassified.len()
            );
            if !dry_run && stats.total > 0 {
                println!("✔ レポート: {}", output.join(organizer::REPORT_FILE_NAME).display());
            }
            summary
        }

        Commands::Rename {
            input,
            output,
            pattern,
            replacement,
            recursive,
            dry_run,
            no_preserve_extension,
        } => {
            println!("✏️  textaudit - ファイル名置換{}\n", if dry_run { " (DRY RUN)" } else { "" });

            let options = renamer::RenameOptions {
                input_dir: input,
                output_dir: output,
                pattern,
                replacement,
                recursive,
                dry_run,
                preserve_extension: !no_preserve_extension,
            };
            let summary = renamer::run(&options)?;
            println!("\n✔ {}件を処理", summary.processed);
            summary
        }

        Commands::Extract {
            target_directory,
            output,
            patterns,
            recursive,
            plain_text,
        } => {
            println!("📄 textaudit - セクション抽出\n");

            let options = extractor::ExtractOptions {
                target_dir: target_directory,
                output_dir: output,
                title_patterns: patterns,
                recursive,
            };
            let summary = if plain_text {
                extractor::run(&options, &extractor::PlainTextExtractor)?
            } else {
                extractor::run(&options, &extractor::DocxExtractor)?
            };
            println!("\n✔ {}文書を処理", summary.processed);
            summary
        }

        Commands::CountTags { input, output_file, tags } => {
            println!("🏷️  textaudit - 注釈タグ集計\n");

            let options = counter::CountTagsOptions {
                input_dir: input,
                output_file,
                tags: if tags.is_empty() { config.tags.clone() } else { tags },
                precision: config.float_precision,
            };
            let summary = counter::count_tags(&options)?;
            println!("\n✔ {}ファイルを集計", summary.processed);
            summary
        }

        Commands::CountStrings {
            root_dir,
            file_pattern,
            strings,
            output_file,
        } => {
            println!("🔎 textaudit - 文字列出現頻度\n");

            let options = counter::CountStringsOptions {
                root_dir,
                file_prefix: file_pattern,
                strings,
                output_file: output_file.clone(),
            };
            let summary = counter::count_strings(&options)?;
            if summary.succeeded() {
                println!("✔ 結果を保存: {}", output_file.display());
            }
            summary
        }

        Commands::Stats { directory, output } => {
            println!("📊 textaudit - テキスト統計\n");

            let options = textstats::StatsOptions {
                directory,
                output_file: output,
                precision: config.float_precision,
            };
            let (summary, corpus) = textstats::run(&options, &textstats::SimpleTokenizer)?;
            if summary.succeeded() {
                println!("==== 集計結果 ====");
                println!("処理ファイル数: {}", corpus.files);
                println!("文数: {}", corpus.num_sentences);
                println!("語数: {}", corpus.num_tokens);
                println!("異なり語数: {}", corpus.num_unique_words);
                println!("平均文長（語）: {:.2}", corpus.avg_sentence_length);
            }
            summary
        }

        Commands::Evaluate {
            generated_dir,
            reference_dir,
            output,
            summary,
            duplicate_policy,
            dry_run,
        } => {
            println!("🧮 textaudit - 自動評価{}\n", if dry_run { " (DRY RUN)" } else { "" });

            let scorers = scorer::scorers_from_config(&config.scorers);
            let options = evaluate::EvaluateOptions {
                generated_dir,
                reference_dir,
                output,
                summary,
                duplicate_policy: duplicate_policy.unwrap_or(config.duplicate_policy),
                dry_run,
                precision: config.float_precision,
                show_progress: !cli.verbose,
            };
            let summary = evaluate::run(&options, &config.classifier(), &scorers)?;
            println!("\n✔ {}組を{}", summary.processed, if dry_run { "照合" } else { "評価" });
            summary
        }

        Commands::Config { show, init } => {
            let path = match &cli.config {
                Some(path) => path.clone(),
                None => Config::config_path()?,
            };

            if init {
                if path.exists() {
                    println!("設定ファイルは既に存在します: {}", path.display());
                } else {
                    Config::default().save(&path)?;
                    println!("✔ 設定ファイルを作成: {}", path.display());
                }
            }

            if show || !init {
                println!("設定 ({}):", path.display());
                println!("{}", serde_json::to_string_pretty(&config)?);
            }

            RunSummary { processed: 1, skipped: 0 }
        }
    };

    Ok(summary)
}
