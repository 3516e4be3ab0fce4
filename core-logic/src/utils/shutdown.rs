use tokio::signal;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

pub struct ShutdownListener;

impl ShutdownListener {
    /// Spawns a Ctrl+C listener and returns the token it cancels.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn install() -> CancellationToken {
        let token = CancellationToken::new();
        let cloned_token = token.clone();

        tokio::spawn(async move {
            match signal::ctrl_c().await {
                Ok(()) => {
                    info!("🛑 Received Ctrl+C. Initiating graceful shutdown...");
                    cloned_token.cancel();
                }
                Err(err) => {
                    error!("Unable to listen for shutdown signal: {}", err);
                }
            }
        });

        token
    }
}
