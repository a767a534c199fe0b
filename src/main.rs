//! 命令行入口
//!
//! `extract` 输出原文记录的 JSON，`apply` 读取填好译文的段落 JSON 并写回文档。

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process;

use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use interleaf::core::{
    apply_translations, extract_records, print_error_message, DocumentFormat, InterleafOptions,
};
use interleaf::translation::error::helpers;
use interleaf::translation::{
    config_file_exists, ConfigManager, ErrorCategory, Paragraph, Position, TranslationError,
    TranslationResult,
};

#[derive(Parser, Debug)]
#[command(name = "interleaf")]
#[command(version)]
#[command(about = "Extract translatable units and weave translations back into documents")]
struct Cli {
    /// Increase logging verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Print original records of a document as JSON
    Extract {
        #[command(flatten)]
        common: CommonArgs,
    },

    /// Write translations back into a document
    Apply {
        #[command(flatten)]
        common: CommonArgs,

        /// JSON file holding translated paragraphs
        #[arg(short, long, value_name = "JSON")]
        translations: PathBuf,
    },

    /// Write an example configuration file
    InitConfig {
        #[arg(value_name = "PATH", default_value = "interleaf.toml")]
        path: String,
    },
}

#[derive(Args, Debug)]
struct CommonArgs {
    /// Source document (.html, .xhtml, .srt, .pgn)
    #[arg(value_name = "FILE")]
    input: PathBuf,

    /// Configuration file (TOML or JSON)
    #[arg(short, long, value_name = "PATH")]
    config: Option<String>,

    /// Enable merging with the given length
    #[arg(short, long, value_name = "N")]
    merge_length: Option<usize>,

    /// Override the translation position
    #[arg(short, long, value_name = "POSITION")]
    position: Option<Position>,

    /// Input charset for HTML documents
    #[arg(short, long, value_name = "CHARSET")]
    encoding: Option<String>,

    /// Write output to a file instead of stdout
    #[arg(short, long, value_name = "PATH")]
    output: Option<PathBuf>,
}

fn init_logging(verbose: u8) {
    let filter = match verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn load_options(args: &CommonArgs) -> TranslationResult<InterleafOptions> {
    let manager = match &args.config {
        Some(path) => ConfigManager::from_file(path)?,
        None => {
            if !config_file_exists() {
                tracing::debug!("未找到配置文件，使用默认配置");
            }
            ConfigManager::new()?
        }
    };

    let mut config = manager.into_config();
    if let Some(merge_length) = args.merge_length {
        config.merge_enabled = true;
        config.merge_length = merge_length;
    }
    if let Some(position) = args.position {
        config.translation_position = position;
    }

    Ok(InterleafOptions {
        config: ConfigManager::from_config(config)?.into_config(),
        encoding: args.encoding.clone(),
        ..Default::default()
    })
}

fn read_input(path: &Path) -> TranslationResult<(DocumentFormat, String, Vec<u8>)> {
    let format = DocumentFormat::from_path(path)?;
    let data = fs::read(path).map_err(|e| TranslationError::from(e).with_context(path.display()))?;
    let name = path
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or("document")
        .to_string();
    Ok((format, name, data))
}

fn write_output(output: Option<&Path>, data: &[u8]) -> TranslationResult<()> {
    match output {
        Some(path) => fs::write(path, data)?,
        None => {
            let mut stdout = io::stdout().lock();
            stdout.write_all(data)?;
            stdout.flush()?;
        }
    }
    Ok(())
}

fn run(cli: Cli) -> TranslationResult<()> {
    match cli.command {
        Commands::Extract { common } => {
            let options = load_options(&common)?;
            let (format, name, data) = read_input(&common.input)?;
            let records = extract_records(format, &name, &data, &options)?;

            let mut json = serde_json::to_string_pretty(&records)?;
            json.push('\n');
            write_output(common.output.as_deref(), json.as_bytes())
        }
        Commands::Apply {
            common,
            translations,
        } => {
            let options = load_options(&common)?;
            let (format, name, data) = read_input(&common.input)?;
            let content = fs::read_to_string(&translations)
                .map_err(|e| TranslationError::from(e).with_context(translations.display()))?;
            let paragraphs: Vec<Paragraph> = serde_json::from_str(&content)?;

            let (output, applied) = apply_translations(format, &name, &data, &paragraphs, &options)?;
            tracing::info!("共写回 {} 条译文", applied);
            write_output(common.output.as_deref(), &output)
        }
        Commands::InitConfig { path } => {
            ConfigManager::generate_example_config(&path)?;
            eprintln!("已生成示例配置文件: {}", path);
            Ok(())
        }
    }
}

/// 配置和输入问题以 2 退出，其余失败以 1 退出
fn exit_code(error: &TranslationError) -> i32 {
    match error.category() {
        ErrorCategory::Configuration | ErrorCategory::Input => 2,
        _ => 1,
    }
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(e) = run(cli).or_else(helpers::log_error) {
        print_error_message(&e.to_string());
        process::exit(exit_code(&e));
    }
}
