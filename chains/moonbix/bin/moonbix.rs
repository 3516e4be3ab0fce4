use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use core_logic::{
    AccountManager, ProxyManager, SESSION_TARGET, ShutdownListener, setup_logger,
    setup_quiet_logger,
};
use dialoguer::{Confirm, theme::ColorfulTheme};
use dotenv::dotenv;
use moonbix::{MoonbixConfig, ReqwestProvider, Scheduler};
use std::sync::Arc;
use tracing::{error, info};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ProxyChoice {
    Yes,
    No,
}

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[arg(short, long, default_value = "config/config.toml")]
    config: String,

    #[arg(short, long, default_value = AccountManager::ACCOUNTS_FILE)]
    accounts: String,

    #[arg(long, default_value = ProxyManager::PROXY_FILE)]
    proxy_config: String,

    /// Answer the "Use proxy?" prompt up front
    #[arg(long, value_enum)]
    use_proxy: Option<ProxyChoice>,

    #[arg(short, long)]
    quiet: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();

    let args = Args::parse();

    // Guard flushes the file appender when main returns
    let _log_guard = if args.quiet {
        setup_quiet_logger();
        None
    } else {
        setup_logger()
    };

    if !args.quiet {
        println!(
            r#"
        ╔════════════════════════════════════════════════════════════╗
        ║                 MOONBIX AUTO PLAYER - LIVE LOG             ║
        ╚════════════════════════════════════════════════════════════╝
        "#
        );
    }
    info!(target: SESSION_TARGET, "Application started successfully!");

    let config = MoonbixConfig::from_path(&args.config).context("Failed to load config")?;
    let proxy = ProxyManager::load(&args.proxy_config);

    let use_proxy = match args.use_proxy {
        Some(ProxyChoice::Yes) => true,
        Some(ProxyChoice::No) => false,
        None => Confirm::with_theme(&ColorfulTheme::default())
            .with_prompt("Use proxy?")
            .default(false)
            .interact()
            .context("Failed to read proxy choice")?,
    };

    let accounts = AccountManager::load(&args.accounts).context("Failed to load accounts")?;
    info!(
        target: SESSION_TARGET,
        "Starting Moonbix script with {} account(s)",
        accounts.len()
    );

    let provider = Arc::new(ReqwestProvider::new(config.request_timeout()));
    let mut scheduler =
        Scheduler::new(config, provider, proxy, use_proxy).with_countdown(!args.quiet);

    let token = ShutdownListener::install();
    if let Err(e) = scheduler.run(accounts.accounts(), token).await {
        error!("Scheduler aborted: {}", e);
        return Err(e).context("Scheduler aborted before the first cycle");
    }

    info!(target: SESSION_TARGET, "🛑 Shutdown Complete.");
    Ok(())
}
