use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use dioxus::LaunchBuilder;
use dioxus::desktop::{Config as DesktopConfig, WindowBuilder};
use services::{AppServices, CatalogSource, Clock, Tracker};
use tokio::sync::Mutex;
use tracker_core::model::CategoryMeta;
use ui::{App, SharedTracker, UiApp, build_app_context};

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    MissingImportFile,
    UnknownArg(String),
    InvalidDbUrl { raw: String },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::MissingImportFile => write!(f, "import requires a file path"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::InvalidDbUrl { raw } => write!(f, "invalid --db value: {raw}"),
        }
    }
}

impl std::error::Error for ArgsError {}

fn require_value(
    args: &mut impl Iterator<Item = String>,
    flag: &'static str,
) -> Result<String, ArgsError> {
    args.next().ok_or(ArgsError::MissingValue { flag })
}

struct DesktopApp {
    tracker: SharedTracker,
    export_dir: PathBuf,
    startup_notice: Option<String>,
}

impl UiApp for DesktopApp {
    fn tracker(&self) -> SharedTracker {
        Arc::clone(&self.tracker)
    }

    fn export_dir(&self) -> PathBuf {
        self.export_dir.clone()
    }

    fn startup_notice(&self) -> Option<String> {
        self.startup_notice.clone()
    }
}

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  cargo run -p app -- ui     [--db <sqlite_url>] [--topics <url|path>] [--out <dir>]");
    eprintln!("  cargo run -p app -- stats  [--db <sqlite_url>] [--topics <url|path>]");
    eprintln!("  cargo run -p app -- export [--db <sqlite_url>] [--topics <url|path>] [--out <dir>]");
    eprintln!("  cargo run -p app -- import <file> [--db <sqlite_url>] [--topics <url|path>]");
    eprintln!("  cargo run -p app -- reset  [--db <sqlite_url>] [--topics <url|path>]");
    eprintln!();
    eprintln!("Defaults:");
    eprintln!("  --db sqlite://learning-progress.sqlite3");
    eprintln!("  --topics data/topics.json   (use `builtin` to skip loading)");
    eprintln!("  --out .");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  LEARN_DB_URL, LEARN_TOPICS_URL, LEARN_EXPORT_DIR, RUST_LOG");
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Ui,
    Stats,
    Export,
    Import,
    Reset,
}

impl Command {
    fn from_arg(arg: &str) -> Option<Self> {
        match arg {
            "ui" => Some(Self::Ui),
            "stats" => Some(Self::Stats),
            "export" => Some(Self::Export),
            "import" => Some(Self::Import),
            "reset" => Some(Self::Reset),
            _ => None,
        }
    }
}

#[derive(Debug)]
struct Args {
    db_url: String,
    topics: CatalogSource,
    export_dir: PathBuf,
    import_file: Option<PathBuf>,
    verbose: bool,
}

impl Args {
    fn parse(cmd: Command, args: &mut impl Iterator<Item = String>) -> Result<Self, ArgsError> {
        let mut db_url = std::env::var("LEARN_DB_URL").ok().map_or_else(
            || "sqlite://learning-progress.sqlite3".into(),
            normalize_sqlite_url,
        );
        let mut topics = std::env::var("LEARN_TOPICS_URL")
            .ok()
            .map_or_else(CatalogSource::default, |raw| CatalogSource::parse(&raw));
        let mut export_dir = std::env::var("LEARN_EXPORT_DIR")
            .ok()
            .map_or_else(|| PathBuf::from("."), PathBuf::from);
        let mut import_file = None;
        let mut verbose = false;

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--db" => {
                    let value = require_value(args, "--db")?;
                    if value.trim().is_empty() {
                        return Err(ArgsError::InvalidDbUrl { raw: value });
                    }
                    db_url = normalize_sqlite_url(value);
                }
                "--topics" => {
                    let value = require_value(args, "--topics")?;
                    topics = CatalogSource::parse(&value);
                }
                "--out" if matches!(cmd, Command::Ui | Command::Export) => {
                    export_dir = PathBuf::from(require_value(args, "--out")?);
                }
                "--verbose" | "-v" => verbose = true,
                "--help" | "-h" => {
                    print_usage();
                    std::process::exit(0);
                }
                positional
                    if cmd == Command::Import
                        && import_file.is_none()
                        && !positional.starts_with("--") =>
                {
                    import_file = Some(PathBuf::from(positional));
                }
                _ => return Err(ArgsError::UnknownArg(arg)),
            }
        }

        if cmd == Command::Import && import_file.is_none() {
            return Err(ArgsError::MissingImportFile);
        }

        Ok(Self {
            db_url,
            topics,
            export_dir,
            import_file,
            verbose,
        })
    }
}

fn normalize_sqlite_url(raw: String) -> String {
    if raw == "sqlite::memory:" || raw.starts_with("sqlite://") {
        return raw;
    }

    let trimmed = raw.trim().to_string();
    let path_str = trimmed
        .strip_prefix("sqlite:")
        .unwrap_or(trimmed.as_str())
        .to_string();
    let path = std::path::Path::new(&path_str);
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .unwrap_or_else(|_| PathBuf::from("."))
            .join(path)
    };
    format!("sqlite://{}", absolute.display())
}

fn init_logging(verbose: bool) {
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"));
    if verbose {
        builder.filter_level(log::LevelFilter::Debug);
    }
    // sqlx logs every statement at info.
    builder.filter_module("sqlx", log::LevelFilter::Warn);
    builder.target(env_logger::Target::Stderr).init();
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let mut argv: Vec<String> = std::env::args().skip(1).collect();

    // No subcommand launches the UI.
    let cmd = match argv.first().map(String::as_str) {
        None => Command::Ui,
        Some("--help" | "-h") => {
            print_usage();
            return Ok(());
        }
        Some(first) if first.starts_with('-') => Command::Ui,
        Some(first) => Command::from_arg(first).ok_or_else(|| {
            eprintln!("unknown subcommand: {first}");
            print_usage();
            std::io::Error::new(std::io::ErrorKind::InvalidInput, "unknown subcommand")
        })?,
    };

    if argv.first().is_some_and(|first| !first.starts_with('-')) {
        argv.remove(0);
    }

    let mut iter = argv.into_iter();
    let parsed = Args::parse(cmd, &mut iter).map_err(|e| {
        eprintln!("{e}");
        print_usage();
        e
    })?;
    init_logging(parsed.verbose);
    log::debug!("starting {cmd:?} with {parsed:?}");

    prepare_sqlite_file(&parsed.db_url)?;
    let services =
        AppServices::new_sqlite(&parsed.db_url, Clock::system(), parsed.topics.clone()).await?;
    let (mut tracker, warning) = Tracker::bootstrap(services).await;
    let startup_notice = warning.map(|err| {
        format!(
            "Could not load topics from {}; using fallback topics ({err})",
            parsed.topics
        )
    });

    match cmd {
        Command::Ui => {
            let app: Arc<dyn UiApp> = Arc::new(DesktopApp {
                tracker: Arc::new(Mutex::new(tracker)),
                export_dir: parsed.export_dir,
                startup_notice,
            });
            let context = build_app_context(&app);

            // Some dev setups default to an always-on-top window.
            let desktop_cfg = DesktopConfig::new().with_window(
                WindowBuilder::new()
                    .with_title("Learning Path Tracker")
                    .with_always_on_top(false),
            );

            LaunchBuilder::desktop()
                .with_cfg(desktop_cfg)
                .with_context(context)
                .launch(App);
            Ok(())
        }
        Command::Stats => {
            if let Some(notice) = startup_notice {
                eprintln!("warning: {notice}");
            }
            print_stats(&tracker);
            Ok(())
        }
        Command::Export => {
            let path = tracker.export_to_dir(&parsed.export_dir).await?;
            println!("{}", path.display());
            Ok(())
        }
        Command::Import => {
            let Some(file) = parsed.import_file else {
                return Err(ArgsError::MissingImportFile.into());
            };
            let outcome = tracker.import_file(&file).await?;
            println!(
                "imported {} (topics replaced: {}, progress replaced: {})",
                file.display(),
                outcome.replaced_topics,
                outcome.replaced_progress
            );
            Ok(())
        }
        Command::Reset => {
            tracker.reset().await?;
            println!("progress reset");
            Ok(())
        }
    }
}

fn print_stats(tracker: &Tracker) {
    let catalog = tracker.catalog();
    for id in catalog.categories() {
        let progress = tracker.category_progress(id);
        let meta = CategoryMeta::for_category(id);
        println!(
            "{} {:<24} {:>4}/{:<4} {:>3}%",
            meta.icon(),
            meta.label(),
            progress.completed,
            progress.total,
            progress.percentage
        );
    }
    let overall = tracker.overall_progress();
    println!(
        "   {:<24} {:>4}/{:<4} {:>3}%",
        "Overall", overall.completed, overall.total, overall.percentage
    );
    let orphaned = tracker.progress().orphaned_keys(catalog).len();
    if orphaned > 0 {
        println!("   ({orphaned} completed entries are not in the current catalog)");
    }
}

fn prepare_sqlite_file(db_url: &str) -> Result<(), Box<dyn std::error::Error>> {
    if db_url == "sqlite::memory:" {
        return Ok(());
    }

    let path = db_url
        .strip_prefix("sqlite://")
        .ok_or_else(|| ArgsError::InvalidDbUrl {
            raw: db_url.to_string(),
        })?;
    let path = path.split('?').next().unwrap_or(path);
    if path.is_empty() {
        return Err(ArgsError::InvalidDbUrl {
            raw: db_url.to_string(),
        }
        .into());
    }

    let path = std::path::Path::new(path);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    if !path.exists() {
        std::fs::OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(path)?;
    }

    Ok(())
}

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        eprintln!("{err}");
        std::process::exit(2);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(cmd: Command, raw: &[&str]) -> Result<Args, ArgsError> {
        let mut iter = raw.iter().map(|s| (*s).to_string());
        Args::parse(cmd, &mut iter)
    }

    #[test]
    fn import_takes_one_positional_file() {
        let args = parse(Command::Import, &["progress.json", "--topics", "builtin"]).unwrap();
        assert_eq!(args.import_file, Some(PathBuf::from("progress.json")));
        assert_eq!(args.topics, CatalogSource::Builtin);

        assert!(matches!(
            parse(Command::Import, &[]),
            Err(ArgsError::MissingImportFile)
        ));
        assert!(matches!(
            parse(Command::Import, &["a.json", "b.json"]),
            Err(ArgsError::UnknownArg(arg)) if arg == "b.json"
        ));
    }

    #[test]
    fn out_is_only_accepted_where_files_are_written() {
        let args = parse(Command::Export, &["--out", "exports"]).unwrap();
        assert_eq!(args.export_dir, PathBuf::from("exports"));
        assert!(matches!(
            parse(Command::Stats, &["--out", "exports"]),
            Err(ArgsError::UnknownArg(_))
        ));
    }

    #[test]
    fn flags_require_values() {
        assert!(matches!(
            parse(Command::Ui, &["--db"]),
            Err(ArgsError::MissingValue { flag: "--db" })
        ));
        assert!(matches!(
            parse(Command::Ui, &["--db", "  "]),
            Err(ArgsError::InvalidDbUrl { .. })
        ));
    }

    #[test]
    fn sqlite_urls_are_made_absolute() {
        assert_eq!(normalize_sqlite_url("sqlite::memory:".into()), "sqlite::memory:");
        assert_eq!(
            normalize_sqlite_url("sqlite:///tmp/p.sqlite3".into()),
            "sqlite:///tmp/p.sqlite3"
        );
        assert_eq!(
            normalize_sqlite_url("sqlite:/tmp/p.sqlite3".into()),
            "sqlite:///tmp/p.sqlite3"
        );
        assert!(normalize_sqlite_url("progress.sqlite3".into()).starts_with("sqlite:///"));
    }

    #[test]
    fn prepare_rejects_non_file_urls() {
        assert!(prepare_sqlite_file("sqlite::memory:").is_ok());
        assert!(prepare_sqlite_file("postgres://localhost/db").is_err());
    }
}
