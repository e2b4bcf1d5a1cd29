//! 保存された `nav_msgs/Path` の一覧表示と形式変換を行うコマンドラインツール。
//!
//!   saved-paths list ./paths
//!   saved-paths export ./paths --format msgpack --output paths.msgpack
//!   saved-paths import paths.msgpack --format msgpack ./restored

use std::error::Error as StdError;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use log::LevelFilter;
use log4rs::append::console::{ConsoleAppender, Target};
use log4rs::config::{Appender, Config, Root};
use log4rs::encode::pattern::PatternEncoder;

use saved_paths::cli;
use saved_paths::msg::codec::Format;

type BoxResult<T> = std::result::Result<T, Box<dyn StdError>>;

#[derive(Parser)]
#[command(name = "saved-paths")]
#[command(about = "Inspect and convert nav_msgs/Path files saved as path1.json, path2.json, ...", long_about = None)]
#[command(version)]
struct Cli {
  /// Enable debug logging
  #[arg(short, long, global = true)]
  verbose: bool,

  /// log4rs configuration file (YAML)
  #[arg(long, global = true)]
  log_config: Option<PathBuf>,

  #[command(subcommand)]
  command: Commands,
}

#[derive(Subcommand)]
enum Commands {
  /// Print a summary line for each saved path
  List {
    /// Folder containing path1.json, path2.json, ...
    folder: PathBuf,
  },

  /// Write all saved paths in a folder into a single bundle
  Export {
    folder: PathBuf,

    /// Bundle format: json, ros or msgpack
    #[arg(short, long, default_value = "json")]
    format: Format,

    /// Output file (standard output if omitted)
    #[arg(short, long)]
    output: Option<PathBuf>,
  },

  /// Restore path1.json, path2.json, ... from a bundle
  Import {
    input: PathBuf,

    /// Folder to write the path files into
    folder: PathBuf,

    /// Bundle format: json, ros or msgpack
    #[arg(short, long, default_value = "json")]
    format: Format,
  },
}

fn main() -> BoxResult<()> {
  let args = Cli::parse();
  init_logging(args.log_config.as_ref(), args.verbose)?;

  match args.command {
    Commands::List { folder } => {
      let stdout = std::io::stdout();
      cli::list(&folder, &mut stdout.lock())?;
    }
    Commands::Export { folder, format, output } => {
      let stdout = std::io::stdout();
      cli::export(&folder, format, output.as_deref(), &mut stdout.lock())?;
    }
    Commands::Import { input, folder, format } => {
      cli::import_file(&input, format, &folder)?;
    }
  }
  Ok(())
}

fn init_logging(config_file: Option<&PathBuf>, verbose: bool) -> BoxResult<()> {
  if let Some(config_file) = config_file {
    log4rs::init_file(config_file, Default::default()).map_err(|err| err.to_string())?;
    return Ok(());
  }
  let level = if verbose { LevelFilter::Debug } else { LevelFilter::Info };
  let stderr = ConsoleAppender::builder()
    .target(Target::Stderr)
    .encoder(Box::new(PatternEncoder::new("{d(%Y-%m-%d %H:%M:%S%.3f)} {h({l:5})} {t} - {m}{n}")))
    .build();
  let config = Config::builder()
    .appender(Appender::builder().build("stderr", Box::new(stderr)))
    .build(Root::builder().appender("stderr").build(level))?;
  log4rs::init_config(config)?;
  Ok(())
}
