//! Interactive stock search and valuation client
//!
//! # Usage
//!
//! ```bash
//! # Point the client at the valuation backend
//! export VALUATION_API_BASE="http://127.0.0.1:5000"
//!
//! cargo run --bin valuation-cli -p valuation-cli
//! ```

mod command;
mod renderer;

use clap::Parser;
use command::{Command, parse_command};
use renderer::TerminalRenderer;
use std::io::{self, Write};
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::task::JoinHandle;
use tracing::info;
use valuation_client::{ClientConfig, UiHandlers, ValuationApp};

#[derive(Parser, Debug)]
#[command(name = "valuation-cli")]
#[command(about = "Search stocks and run DCF valuations", long_about = None)]
struct Args {
    /// Backend base URL (overrides VALUATION_API_BASE)
    #[arg(long)]
    api_base: Option<String>,

    /// Results per search page
    #[arg(long)]
    page_size: Option<u32>,

    /// Request timeout in seconds for search and analysis
    #[arg(long)]
    timeout_secs: Option<u64>,
}

fn print_banner() {
    println!(
        r#"
╔══════════════════════════════════════════════════════════════╗
║                   Stock Valuation Client                     ║
║                                                              ║
║  Commands:                                                   ║
║    <keyword> | /search <keyword>  - 搜索股票 (Search)        ║
║    /more                          - 加载更多 (Load more)     ║
║    /analyze <code>                - 估值分析 (Analyze)       ║
║    /set <discount|growth|period> <value> - 调整参数          ║
║    /help                          - 显示帮助 (Help)          ║
║    /exit                          - 退出 (Exit)              ║
╚══════════════════════════════════════════════════════════════╝
"#
    );
}

fn load_config(args: &Args) -> anyhow::Result<ClientConfig> {
    let mut config = ClientConfig::from_env()?;

    if let Some(api_base) = &args.api_base {
        config.base_url.clone_from(api_base);
    }
    if let Some(page_size) = args.page_size {
        config.page_size = page_size;
    }
    if let Some(secs) = args.timeout_secs {
        config.search_timeout = Duration::from_secs(secs);
        config.analysis_timeout = Duration::from_secs(secs);
    }

    config.validate()?;
    Ok(config)
}

/// Run one command against the app
///
/// Network-bound actions are spawned and their handle returned; the sequence
/// guard inside the app settles overlapping calls.
async fn dispatch(app: &Arc<ValuationApp>, command: Command) -> Option<JoinHandle<()>> {
    match command {
        Command::Search(keyword) => {
            let app = Arc::clone(app);
            Some(tokio::spawn(async move { app.on_submit(&keyword).await }))
        }
        Command::LoadMore => {
            let app = Arc::clone(app);
            Some(tokio::spawn(async move { app.on_load_more().await }))
        }
        Command::Analyze(code) => {
            let app = Arc::clone(app);
            Some(tokio::spawn(async move { app.on_analyze(&code).await }))
        }
        Command::Set(field, value) => {
            app.on_input_change(field, &value).await;
            None
        }
        Command::Help => {
            print_banner();
            None
        }
        Command::Exit => None,
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    valuation_utils::init_tracing_with("warn,valuation_client=info");

    let args = Args::parse();
    let config = load_config(&args)?;

    print_banner();
    println!("Backend: {}\n", config.base_url);
    info!("Starting valuation-cli against {}", config.base_url);

    let app = Arc::new(ValuationApp::new(config, Arc::new(TerminalRenderer))?);
    app.initialize();

    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        print!("> ");
        io::stdout().flush()?;

        let input = match lines.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) => {
                println!("\nGoodbye!");
                break;
            }
            Err(e) => {
                eprintln!("Error reading input: {e}");
                continue;
            }
        };

        if input.trim().is_empty() {
            continue;
        }

        match parse_command(&input) {
            Ok(Command::Exit) => {
                println!("Goodbye!");
                break;
            }
            Ok(command) => {
                dispatch(&app, command).await;
            }
            Err(message) => eprintln!("{message}"),
        }
    }

    Ok(())
}
