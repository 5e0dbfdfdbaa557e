//! CLI argument parsing module
//!
//! This module handles command-line argument parsing and application entry point.

use crate::browser::{json, BrowserCookieExtractor};
use crate::clipboard::SystemClipboard;
use crate::collector::Collector;
use crate::config::{BrowserCookieConfig, Config, CookieSourceConfig, KeyCase};
use crate::error::{HeapError, Result};
use crate::exit_code::exit_code_for_error;
use crate::export::Exporter;
use crate::holder::spawn_holder;
use crate::output::OutputWriter;
use crate::platform::{ActiveTab, ClipboardSink, CookieSource, FixedTab};
use crate::session::{Popup, EMPTY_BUFFER_MESSAGE};
use crate::utils::FileUtils;
use anyhow::Context;
use clap::{Arg, ArgAction, ArgMatches, Command};
use std::sync::Arc;

pub mod interactive;

/// Main entry point for the CLI application
pub fn run() {
    let matches = create_app().get_matches();

    if let Err(err) = run_with_args(&matches) {
        let code = err
            .downcast_ref::<HeapError>()
            .map(exit_code_for_error)
            .unwrap_or(1);
        eprintln!("cookieheap: error: {:#}", err);
        std::process::exit(code);
    }
}

/// Run cookieheap with parsed command line arguments
fn run_with_args(matches: &ArgMatches) -> anyhow::Result<()> {
    let config = build_config_from_args(matches)?;
    crate::logging::init(config.verbosity);
    let rt = tokio::runtime::Runtime::new().context("Failed to create async runtime")?;
    rt.block_on(execute(config))?;
    Ok(())
}

/// Create the CLI application structure
pub fn create_app() -> Command {
    Command::new("cookieheap")
        .version(crate::VERSION)
        .about("Collect cookies for a site and its subdomains and copy them as JSON")
        .arg(
            Arg::new("url")
                .help("Pages to collect cookies for, in order")
                .num_args(1..)
                .action(ArgAction::Append)
                .required_unless_present("interactive")
                .index(1),
        )
        .arg(
            Arg::new("browser")
                .short('b')
                .long("browser")
                .value_name("BROWSER[:PROFILE]")
                .env("COOKIEHEAP_BROWSER")
                .help("Read cookies from a browser profile (chrome, chromium, edge, brave, opera, vivaldi, whale, firefox)"),
        )
        .arg(
            Arg::new("cookies-file")
                .short('f')
                .long("cookies-file")
                .value_name("FILE")
                .help("Read cookies from a JSON export instead of a browser (takes precedence over --browser)"),
        )
        .arg(
            Arg::new("safe-storage-password")
                .long("safe-storage-password")
                .value_name("PASSWORD")
                .env("COOKIEHEAP_SAFE_STORAGE_PASSWORD")
                .hide_env_values(true)
                .help("Keyring password used by Chromium browsers to encrypt cookies"),
        )
        .arg(
            Arg::new("key-case")
                .short('k')
                .long("key-case")
                .value_name("CASE")
                .env("COOKIEHEAP_KEY_CASE")
                .default_value("as-is")
                .help("Rename JSON keys on export: as-is, snake, camel, kebab, pascal"),
        )
        .arg(
            Arg::new("print")
                .short('p')
                .long("print")
                .help("Print the export to stdout instead of the clipboard")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("output")
                .short('o')
                .long("output")
                .value_name("FILE")
                .conflicts_with("print")
                .help("Write the export to a file instead of the clipboard"),
        )
        .arg(
            Arg::new("interactive")
                .short('i')
                .long("interactive")
                .help("Start a session reading commands from stdin")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("silent")
                .short('s')
                .long("silent")
                .help("Silent mode")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Verbose output (repeat for more)")
                .action(ArgAction::Count),
        )
}

/// Build configuration from command line arguments
pub fn build_config_from_args(matches: &ArgMatches) -> Result<Config> {
    let mut config = Config::default();

    if let Some(urls) = matches.get_many::<String>("url") {
        config.urls = urls.cloned().collect();
    }

    // Cookie source
    if let Some(path) = matches.get_one::<String>("cookies-file") {
        config.source = CookieSourceConfig::File(FileUtils::expand_path(path)?);
    } else if let Some(browser_str) = matches.get_one::<String>("browser") {
        config.source = CookieSourceConfig::Browser(BrowserCookieConfig::parse(browser_str)?);
    }
    if let CookieSourceConfig::Browser(browser) = &mut config.source {
        browser.safe_storage_password = matches.get_one::<String>("safe-storage-password").cloned();
    }

    if let Some(case_str) = matches.get_one::<String>("key-case") {
        config.key_case = case_str
            .parse::<KeyCase>()
            .map_err(|_| HeapError::Config(format!("Unknown key case: {}", case_str)))?;
    }

    // Configure output
    config.output.print = matches.get_flag("print");
    config.output.silent = matches.get_flag("silent");
    if let Some(output_file) = matches.get_one::<String>("output") {
        config.output.file = Some(FileUtils::expand_path(output_file)?);
    }

    config.interactive = matches.get_flag("interactive");
    config.verbosity = matches.get_count("verbose");

    Ok(config)
}

/// Load the configured cookie store
pub async fn load_source(config: &CookieSourceConfig) -> Result<Arc<dyn CookieSource>> {
    let snapshot = match config {
        CookieSourceConfig::Browser(browser) => {
            BrowserCookieExtractor::new(browser.clone())
                .extract_cookies()
                .await?
        }
        CookieSourceConfig::File(path) => json::load_cookie_file(path).await?,
    };
    Ok(Arc::new(snapshot))
}

/// A batch run exits right after exporting, so its clipboard write has to
/// outlive the copy; a session keeps the clipboard open itself.
pub fn system_clipboard(config: &Config) -> SystemClipboard {
    if config.interactive {
        SystemClipboard::new()
    } else {
        SystemClipboard::until_replaced()
    }
}

/// Wire up holder, collector and exporter, then run batch or interactive mode
pub async fn execute(config: Config) -> Result<()> {
    let source = load_source(&config.source).await?;
    let output = Arc::new(OutputWriter::new(config.output.clone()));
    let clipboard: Arc<dyn ClipboardSink> = if config.output.uses_clipboard() {
        Arc::new(system_clipboard(&config))
    } else {
        output.clone()
    };

    let holder = spawn_holder();
    let tab = Arc::new(FixedTab::new());
    let collector = Collector::new(source, holder.clone());
    let exporter = Exporter::new(holder.clone(), clipboard, config.key_case);

    if config.interactive {
        let mut popup = Popup::new(tab.clone(), holder, collector, exporter);
        interactive::collect_pages(&mut popup, &tab, &config.urls, &output).await?;
        return interactive::run(&mut popup, &tab, &output).await;
    }

    for url in &config.urls {
        let page = tab.open(url)?;
        let outcome = collector.handle_get_cookies(tab.as_ref() as &dyn ActiveTab).await?;
        output.write_notice(&format!("{}: {}", page, outcome));
    }

    match exporter.handle_copy_to_clipboard().await {
        Ok(count) if config.output.uses_clipboard() => {
            output.write_notice(&format!("Copied {} cookies to clipboard", count));
        }
        Ok(count) => output.write_notice(&format!("Exported {} cookies", count)),
        Err(HeapError::EmptyBuffer) => output.write_notice(EMPTY_BUFFER_MESSAGE),
        Err(err) => return Err(err),
    }
    Ok(())
}
