use std::fmt;
use std::sync::Arc;

use dioxus::LaunchBuilder;
use dioxus::desktop::{Config as DesktopConfig, WindowBuilder, WindowCloseBehaviour};
use services::{AppServices, Clock, DashboardClient, SubmitConfig, WizardLoopService};
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt as log_fmt};
use ui::{App, UiApp, build_app_context};

const DEFAULT_DB_URL: &str = "sqlite://survey.sqlite3";
const DEFAULT_API_BASE: &str = "http://localhost:5000";

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    UnknownArg(String),
    InvalidDbUrl { raw: String },
    EmptyValue { flag: &'static str },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::InvalidDbUrl { raw } => write!(f, "invalid --db value: {raw}"),
            ArgsError::EmptyValue { flag } => write!(f, "{flag} must not be empty"),
        }
    }
}

impl std::error::Error for ArgsError {}

fn require_value(
    args: &mut impl Iterator<Item = String>,
    flag: &'static str,
) -> Result<String, ArgsError> {
    let value = args.next().ok_or(ArgsError::MissingValue { flag })?;
    if value.trim().is_empty() {
        return Err(ArgsError::EmptyValue { flag });
    }
    Ok(value)
}

struct DesktopApp {
    services: AppServices,
}

impl UiApp for DesktopApp {
    fn wizard(&self) -> Arc<WizardLoopService> {
        self.services.wizard()
    }

    fn dashboard(&self) -> Arc<DashboardClient> {
        self.services.dashboard()
    }
}

#[derive(Debug)]
struct Args {
    db_url: String,
    api_base: String,
    survey_token: Option<String>,
    user_agent: Option<String>,
    dashboard_token: Option<String>,
}

fn print_usage() {
    eprintln!("Usage:");
    eprintln!(
        "  cargo run -p app -- [--db <sqlite_url>] [--api-base <url>] [--token <survey_token>] [--user-agent <text>]"
    );
    eprintln!();
    eprintln!("Defaults:");
    eprintln!("  --db {DEFAULT_DB_URL}");
    eprintln!("  --api-base {DEFAULT_API_BASE}");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  SURVEY_DB_URL, SURVEY_API_BASE_URL, SURVEY_TOKEN, SURVEY_USER_AGENT,");
    eprintln!("  SURVEY_DASHBOARD_TOKEN, RUST_LOG");
}

fn env_value(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .filter(|value| !value.trim().is_empty())
}

impl Args {
    fn parse(args: &mut impl Iterator<Item = String>) -> Result<Self, ArgsError> {
        let mut parsed = Self {
            db_url: env_value("SURVEY_DB_URL")
                .map_or_else(|| DEFAULT_DB_URL.into(), normalize_sqlite_url),
            api_base: env_value("SURVEY_API_BASE_URL").unwrap_or_else(|| DEFAULT_API_BASE.into()),
            survey_token: env_value("SURVEY_TOKEN"),
            user_agent: env_value("SURVEY_USER_AGENT"),
            dashboard_token: env_value("SURVEY_DASHBOARD_TOKEN"),
        };

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--db" => {
                    let value = require_value(args, "--db")?;
                    parsed.db_url = normalize_sqlite_url(value);
                }
                "--api-base" => parsed.api_base = require_value(args, "--api-base")?,
                "--token" => parsed.survey_token = Some(require_value(args, "--token")?),
                "--user-agent" => parsed.user_agent = Some(require_value(args, "--user-agent")?),
                "--help" | "-h" => {
                    print_usage();
                    std::process::exit(0);
                }
                _ => return Err(ArgsError::UnknownArg(arg)),
            }
        }

        Ok(parsed)
    }

    fn submit_config(&self) -> Result<SubmitConfig, services::SubmissionError> {
        let config =
            SubmitConfig::new(&self.api_base)?.with_survey_token(self.survey_token.clone());
        Ok(match &self.user_agent {
            Some(agent) => config.with_user_agent(agent.clone()),
            None => config,
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
            .unwrap_or_else(|_| std::path::PathBuf::from("."))
            .join(path)
    };
    format!("sqlite://{}", absolute.display())
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

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    log_fmt().with_env_filter(filter).init();
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let mut argv = std::env::args().skip(1);
    let parsed = Args::parse(&mut argv).map_err(|e| {
        eprintln!("{e}");
        print_usage();
        e
    })?;

    init_tracing();

    // Open + migrate SQLite at startup; the session scope starts empty every launch.
    prepare_sqlite_file(&parsed.db_url)?;
    let config = parsed.submit_config()?;
    info!(
        db = %parsed.db_url,
        api_base = %config.base_url(),
        has_token = parsed.survey_token.is_some(),
        "starting survey"
    );
    let services = AppServices::new_sqlite(
        &parsed.db_url,
        Clock::default_clock(),
        config,
        parsed.dashboard_token.clone(),
    )
    .await?;

    let app: Arc<dyn UiApp> = Arc::new(DesktopApp { services });
    let context = build_app_context(&app);

    // On macOS, Dioxus/tao can default to an always-on-top window in some dev setups.
    // Closing only hides the window; the survey view asks before it really closes.
    let desktop_cfg = DesktopConfig::new()
        .with_window(
            WindowBuilder::new()
                .with_title("従業員満足度調査")
                .with_always_on_top(false),
        )
        .with_close_behaviour(WindowCloseBehaviour::WindowHides);

    LaunchBuilder::desktop()
        .with_cfg(desktop_cfg)
        .with_context(context)
        .launch(App);
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

    fn parse(args: &[&str]) -> Result<Args, ArgsError> {
        let mut iter = args.iter().map(|arg| (*arg).to_string());
        Args::parse(&mut iter)
    }

    #[test]
    fn relative_sqlite_paths_become_absolute() {
        let url = normalize_sqlite_url("sqlite:data/survey.db".to_string());
        assert!(url.starts_with("sqlite:///"), "{url}");
        assert!(url.ends_with("data/survey.db"));
        assert_eq!(normalize_sqlite_url("sqlite::memory:".into()), "sqlite::memory:");
    }

    #[test]
    fn flags_override_defaults() {
        let args = parse(&["--api-base", "https://survey.example", "--token", "abc"])
            .expect("parse args");
        assert_eq!(args.api_base, "https://survey.example");
        assert_eq!(args.survey_token.as_deref(), Some("abc"));
        let config = args.submit_config().expect("config");
        assert_eq!(config.survey_token(), Some("abc"));
    }

    #[test]
    fn flags_need_values() {
        assert!(matches!(
            parse(&["--token"]),
            Err(ArgsError::MissingValue { flag: "--token" })
        ));
        assert!(matches!(
            parse(&["--db", " "]),
            Err(ArgsError::EmptyValue { flag: "--db" })
        ));
        assert!(matches!(parse(&["--nope"]), Err(ArgsError::UnknownArg(_))));
    }
}
