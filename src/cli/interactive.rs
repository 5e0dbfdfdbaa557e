//! Line-oriented session standing in for the popup buttons

use crate::error::{HeapError, Result};
use crate::output::OutputWriter;
use crate::platform::FixedTab;
use crate::session::{Notice, Popup};
use std::str::FromStr;
use tokio::io::{AsyncBufReadExt, BufReader};

const HELP: &str = "\
Commands:
  open URL     make URL the active page
  get [URL]    collect cookies for the active page (or URL)
  copy         export collected cookies and clear the buffer
  count        show how many cookies are collected
  help         show this help
  quit         leave the session";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplCommand {
    Open(String),
    Get(Option<String>),
    Copy,
    Count,
    Help,
    Quit,
}

impl FromStr for ReplCommand {
    type Err = HeapError;

    fn from_str(line: &str) -> Result<Self> {
        let mut parts = line.split_whitespace();
        let command = parts.next().unwrap_or_default().to_lowercase();
        let argument = parts.next().map(str::to_string);
        if parts.next().is_some() {
            return Err(HeapError::Config(format!("Too many arguments: {}", line.trim())));
        }

        match (command.as_str(), argument) {
            ("open", Some(url)) => Ok(ReplCommand::Open(url)),
            ("open", None) => Err(HeapError::Config("open needs a URL".to_string())),
            ("get" | "g", url) => Ok(ReplCommand::Get(url)),
            ("copy" | "c", None) => Ok(ReplCommand::Copy),
            ("count" | "n", None) => Ok(ReplCommand::Count),
            ("help" | "?", None) => Ok(ReplCommand::Help),
            ("quit" | "exit" | "q", None) => Ok(ReplCommand::Quit),
            ("", _) => Err(HeapError::Config("Empty command".to_string())),
            _ => Err(HeapError::Config(format!("Unknown command: {}", line.trim()))),
        }
    }
}

/// Collect each page given on the command line, in order
pub async fn collect_pages(
    popup: &mut Popup,
    tab: &FixedTab,
    urls: &[String],
    output: &OutputWriter,
) -> Result<()> {
    for url in urls {
        let page = tab.open(url)?;
        let notice = popup.get_cookies().await;
        if notice.is_error {
            output.write_error(&format!("{}: {}", page, notice.message));
        } else {
            output.write_notice(&format!("{}: {}", page, notice.message));
        }
    }
    Ok(())
}

/// Read commands from stdin until `quit` or end of input
pub async fn run(popup: &mut Popup, tab: &FixedTab, output: &OutputWriter) -> Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    output.write_notice("Type `help` for commands");

    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }
        let command = match line.parse::<ReplCommand>() {
            Ok(command) => command,
            Err(err) => {
                output.write_error(&err.to_string());
                continue;
            }
        };

        match command {
            ReplCommand::Quit => break,
            ReplCommand::Help => output.write_notice(HELP),
            ReplCommand::Open(url) => match tab.open(&url) {
                Ok(page) => output.write_notice(&format!("Active page: {}", page)),
                Err(err) => output.write_error(&err.to_string()),
            },
            ReplCommand::Get(url) => {
                if let Some(url) = url {
                    if let Err(err) = tab.open(&url) {
                        output.write_error(&err.to_string());
                        continue;
                    }
                }
                show(output, &popup.get_cookies().await);
            }
            ReplCommand::Copy => show(output, &popup.copy_to_clipboard().await),
            ReplCommand::Count => match popup.refresh_count().await {
                Ok(count) => output.write_notice(&format!("{} cookies collected", count)),
                Err(err) => output.write_error(&err.to_string()),
            },
        }
    }
    Ok(())
}

fn show(output: &OutputWriter, notice: &Notice) {
    if notice.is_error {
        output.write_error(&notice.message);
    } else {
        output.write_notice(&notice.message);
    }
}
