use std::env;
use std::fs;
use std::path::Path;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use orderdesk_core::actions::AppAction;
use orderdesk_core::actions::RuntimeAction;
use orderdesk_core::actions::UserAction;
use orderdesk_core::config::Config;
use orderdesk_core::reducer::reduce;
use orderdesk_core::reducer::OrderEffect;
use orderdesk_core::state::AppState;
use orderdesk_core::state::FeedStatus;
use orderdesk_core::view::detail_view;
use orderdesk_core::view::list_view;
use orderdesk_core::view::ListView;
use orderdesk_core::view::OrderDetail;
use orderdesk_source::fetch_orders;
use orderdesk_source::FixtureOrderSource;
use orderdesk_source::HttpOrderSource;
use orderdesk_source::OrderSource;
use orderdesk_source::PollSchedule;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

mod ui;

fn main() {
    if let Err(err) = run() {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Command {
    Help,
    Version,
    View,
    List { json: bool },
    Show { order_id: String },
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct Overrides {
    config_path: Option<PathBuf>,
    base_url: Option<String>,
    use_fixture: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct CliArgs {
    command: Command,
    overrides: Overrides,
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = parse_args(env::args().skip(1).collect())?;

    match cli.command {
        Command::Help => {
            print_help();
            Ok(())
        }
        Command::Version => {
            println!("orderdesk {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
        command => {
            let config = resolve_config(&cli.overrides)?;
            let _log_guard = match dirs::data_local_dir() {
                Some(dir) => Some(init_logging(&dir.join("orderdesk"))?),
                None => None,
            };
            let source = build_source(&config)?;
            tracing::info!(source = source.label(), "orderdesk starting");
            match command {
                Command::View => {
                    let state = AppState::new(source.label());
                    let poll = PollSchedule::new(config.source.poll_interval(), Instant::now());
                    ui::run(state, source, poll, &config.ui)
                }
                Command::List { json } => list_orders(source.as_ref(), json),
                Command::Show { order_id } => show_order(source.as_ref(), &order_id),
                Command::Help | Command::Version => Ok(()),
            }
        }
    }
}

fn parse_args(args: Vec<String>) -> Result<CliArgs, Box<dyn std::error::Error>> {
    let mut command = None;
    let mut overrides = Overrides::default();
    let mut json = false;
    let mut positional = Vec::new();
    let mut i = 0;

    while i < args.len() {
        match args[i].as_str() {
            "--help" | "-h" | "help" => return Ok(CliArgs::new(Command::Help, overrides)),
            "--version" | "-V" | "version" => {
                return Ok(CliArgs::new(Command::Version, overrides))
            }
            "--config" => {
                let Some(value) = args.get(i + 1) else {
                    return Err("--config requires a path".into());
                };
                overrides.config_path = Some(PathBuf::from(value));
                i += 2;
                continue;
            }
            "--base-url" => {
                let Some(value) = args.get(i + 1) else {
                    return Err("--base-url requires a URL".into());
                };
                overrides.base_url = Some(value.clone());
                i += 2;
                continue;
            }
            "--fixture" => overrides.use_fixture = Some(true),
            "--live" => overrides.use_fixture = Some(false),
            "--json" => json = true,
            "view" | "list" | "show" if command.is_none() => command = Some(args[i].clone()),
            other if other.starts_with('-') => {
                return Err(format!("unsupported argument: {other}").into());
            }
            other => positional.push(other.to_string()),
        }
        i += 1;
    }

    let command = match command.as_deref() {
        None | Some("view") => {
            if let Some(extra) = positional.first() {
                return Err(format!("unknown command: {extra}").into());
            }
            Command::View
        }
        Some("list") => Command::List { json },
        Some(_) => {
            let Some(order_id) = positional.first() else {
                return Err("show requires an order id".into());
            };
            Command::Show {
                order_id: order_id.clone(),
            }
        }
    };
    Ok(CliArgs::new(command, overrides))
}

impl CliArgs {
    fn new(command: Command, overrides: Overrides) -> Self {
        Self { command, overrides }
    }
}

fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("orderdesk").join("config.toml"))
}

fn resolve_config(overrides: &Overrides) -> Result<Config, Box<dyn std::error::Error>> {
    let mut config = match overrides.config_path.clone().or_else(default_config_path) {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };
    apply_overrides(&mut config, overrides);
    Ok(config)
}

fn apply_overrides(config: &mut Config, overrides: &Overrides) {
    if let Some(base_url) = &overrides.base_url {
        config.source.base_url = base_url.clone();
        config.source.use_fixture = false;
    }
    if let Some(use_fixture) = overrides.use_fixture {
        config.source.use_fixture = use_fixture;
    }
}

fn build_source(config: &Config) -> Result<Arc<dyn OrderSource>, Box<dyn std::error::Error>> {
    if config.source.use_fixture {
        return Ok(Arc::new(FixtureOrderSource::default()));
    }
    Ok(Arc::new(HttpOrderSource::new(&config.source)?))
}

/// Routes `tracing` output to `orderdesk.log` in `dir` so the terminal UI
/// stays clean. Filter comes from `ORDERDESK_LOG`, defaulting to `info`.
/// Buffered lines are flushed when the returned guard drops.
fn init_logging(dir: &Path) -> Result<WorkerGuard, Box<dyn std::error::Error>> {
    fs::create_dir_all(dir)
        .map_err(|err| format!("failed to create log directory {}: {err}", dir.display()))?;
    let appender = tracing_appender::rolling::never(dir, "orderdesk.log");
    let (writer, guard) = tracing_appender::non_blocking(appender);
    let filter =
        EnvFilter::try_from_env("ORDERDESK_LOG").unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(false)
        .with_target(false)
        .try_init()
        .map_err(|err| format!("failed to initialise logging: {err}"))?;
    Ok(guard)
}

/// Drives one fetch through the reducer, as the TUI does.
fn load_once(source: &dyn OrderSource) -> AppState {
    let mut state = AppState::new(source.label());
    for effect in reduce(&mut state, AppAction::User(UserAction::Refresh)) {
        let OrderEffect::StartFetch { fetch_id } = effect else {
            continue;
        };
        let action = match fetch_orders(source) {
            Ok(orders) => RuntimeAction::FetchSucceeded { fetch_id, orders },
            Err(err) => RuntimeAction::FetchFailed {
                fetch_id,
                message: err.to_string(),
            },
        };
        reduce(&mut state, AppAction::Runtime(action));
    }
    state
}

fn list_orders(source: &dyn OrderSource, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let state = load_once(source);
    if let FeedStatus::Failed { message } = &state.feed {
        return Err(format!("Failed to load orders: {message}").into());
    }
    if json {
        println!("{}", serde_json::to_string_pretty(state.orders())?);
    } else {
        print!("{}", list_text(&list_view(&state)));
    }
    Ok(())
}

fn show_order(source: &dyn OrderSource, order_id: &str) -> Result<(), Box<dyn std::error::Error>> {
    let mut state = load_once(source);
    if let FeedStatus::Failed { message } = &state.feed {
        return Err(format!("Failed to load orders: {message}").into());
    }
    reduce(
        &mut state,
        AppAction::User(UserAction::SelectOrder {
            id: order_id.to_string(),
        }),
    );
    let Some(detail) = detail_view(&state) else {
        return Err(format!("order not found: {order_id}").into());
    };
    print!("{}", detail_text(&detail));
    Ok(())
}

fn list_text(view: &ListView) -> String {
    match view {
        ListView::Loading => "Loading orders...\n".to_string(),
        ListView::Empty => "No orders found.\n".to_string(),
        ListView::Rows(rows) | ListView::Failed { rows, .. } => {
            let mut out = String::new();
            for row in rows {
                out.push_str(&format!(
                    "{:<10} {:<20} {}\n",
                    row.id, row.customer_name, row.meta
                ));
            }
            out
        }
    }
}

fn detail_text(detail: &OrderDetail) -> String {
    let mut out = format!(
        "{}\n{}\n{}\n\n{}\n",
        detail.id, detail.customer_name, detail.placed_at, detail.items_heading
    );
    for item in &detail.items {
        out.push_str(&format!(
            "  {:<10} {:<26} {:<16} {:>12}  ${}\n",
            item.id, item.product_name, item.sku_label, item.price_line, item.line_total
        ));
    }
    out.push_str(&format!("\nTotal Amount: ${}\n", detail.total));
    out
}

fn print_help() {
    println!(
        "orderdesk {}

Browse customer orders from the terminal.

USAGE:
    orderdesk [view]                 Interactive order viewer
    orderdesk list [--json]          Print all orders
    orderdesk show <ORDER_ID>        Print one order with its items

OPTIONS:
    --fixture                        Use the built-in sample orders
    --live                           Use the configured HTTP endpoint
    --base-url <URL>                 Override the endpoint base URL (implies --live)
    --config <PATH>                  Config file (default: <config dir>/orderdesk/config.toml)
    -h, --help                       Print help
    -V, --version                    Print version

ENVIRONMENT:
    ORDERDESK_LOG                    Log filter for the log file (e.g. debug)",
        env!("CARGO_PKG_VERSION")
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(values: &[&str]) -> Vec<String> {
        values.iter().map(|value| value.to_string()).collect()
    }

    #[test]
    fn no_arguments_opens_viewer() {
        let cli = parse_args(Vec::new()).unwrap();
        assert_eq!(cli.command, Command::View);
        assert_eq!(cli.overrides, Overrides::default());
    }

    #[test]
    fn show_takes_order_id_and_flags_anywhere() {
        let cli = parse_args(args(&["--fixture", "show", "ORD-1002"])).unwrap();
        assert_eq!(
            cli.command,
            Command::Show {
                order_id: "ORD-1002".to_string()
            }
        );
        assert_eq!(cli.overrides.use_fixture, Some(true));
    }

    #[test]
    fn show_without_id_is_an_error() {
        assert!(parse_args(args(&["show"])).is_err());
    }

    #[test]
    fn unknown_flag_is_an_error() {
        assert!(parse_args(args(&["list", "--verbose"])).is_err());
    }

    #[test]
    fn base_url_switches_to_live_source() {
        let cli = parse_args(args(&[
            "list",
            "--json",
            "--base-url",
            "http://localhost:9000",
        ]))
        .unwrap();
        assert_eq!(cli.command, Command::List { json: true });

        let mut config = Config::default();
        apply_overrides(&mut config, &cli.overrides);
        assert!(!config.source.use_fixture);
        assert_eq!(config.source.orders_url(), "http://localhost:9000/orders");
    }

    #[test]
    fn explicit_fixture_wins_over_base_url() {
        let cli =
            parse_args(args(&["--base-url", "http://localhost:9000", "--fixture"])).unwrap();
        let mut config = Config::default();
        apply_overrides(&mut config, &cli.overrides);
        assert!(config.source.use_fixture);
    }

    #[test]
    fn fixture_list_text_has_one_line_per_order() {
        let state = load_once(&FixtureOrderSource::default());
        let text = list_text(&list_view(&state));
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[1].starts_with("ORD-1002"));
        assert!(lines[1].ends_with("3 item(s) • $64.47"));
    }

    #[test]
    fn detail_text_lists_line_totals() {
        let mut state = load_once(&FixtureOrderSource::default());
        reduce(
            &mut state,
            AppAction::User(UserAction::SelectOrder {
                id: "ORD-1002".to_string(),
            }),
        );
        let text = detail_text(&detail_view(&state).unwrap());
        assert!(text.contains("$29.99\n"));
        assert!(text.contains("$14.50\n"));
        assert!(text.contains("$19.98\n"));
        assert!(text.ends_with("Total Amount: $64.47\n"));
    }

    #[test]
    fn failed_load_reports_error() {
        let source = FixtureOrderSource::with_body("not json");
        let state = load_once(&source);
        assert!(matches!(state.feed, FeedStatus::Failed { .. }));
        assert!(list_orders(&source, false).is_err());
    }

    #[test]
    fn logging_writes_under_dir_and_reports_second_init() {
        let dir = tempfile::tempdir().unwrap();
        let log_dir = dir.path().join("orderdesk");

        let guard = init_logging(&log_dir).unwrap();
        tracing::info!("logging ready");
        drop(guard);
        let written = fs::read_to_string(log_dir.join("orderdesk.log")).unwrap();
        assert!(written.contains("logging ready"));

        let err = init_logging(&log_dir).unwrap_err();
        assert!(err.to_string().starts_with("failed to initialise logging"));
    }
}
