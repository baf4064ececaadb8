//! Headless notification relay.
//!
//! Reads one notification per line from stdin, e.g.
//! `{"packageName":"com.bank.app","extras":{"android.title":"Payment received"}}`,
//! pushes it through the listener service, the broadcast channel and the
//! bridge, and writes each resulting scripting-layer event to stdout as a
//! JSON line. Logs go to stderr.

mod config;
mod sink;

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tracing_subscriber::EnvFilter;

use screenmind_bridge::NotificationBridge;
use screenmind_events::EventBusRef;
use screenmind_listener::{ListenerService, PostOutcome, StatusBarNotification};
use screenmind_transport::LocalBroadcastChannel;

use crate::config::RelayConfig;
use crate::sink::LineEventBus;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,screenmind=debug")),
        )
        .init();

    let config = RelayConfig::load()?;
    tracing::info!(package = %config.host_package, "starting notification relay");

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    let bus = Arc::new(LineEventBus::new(std::io::stdout()));
    let result = runtime.block_on(run(config, tokio::io::stdin(), bus, interrupted()));

    // Stdin reads cannot be cancelled; don't wait on them.
    runtime.shutdown_timeout(Duration::from_millis(100));
    result
}

async fn interrupted() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "cannot listen for Ctrl-C");
        std::future::pending::<()>().await;
    }
}

/// Relay notification lines from `input` to `bus` until end of input or
/// `shutdown` completes.
async fn run<R>(
    config: RelayConfig,
    input: R,
    bus: EventBusRef,
    shutdown: impl Future<Output = ()>,
) -> anyhow::Result<()>
where
    R: AsyncRead + Unpin,
{
    let channel = Arc::new(LocalBroadcastChannel::new());
    let mut bridge = NotificationBridge::init(&*channel, bus, config.bridge_config())?;
    let listener = ListenerService::new(channel.clone(), config.listener_config());

    tokio::pin!(shutdown);
    let mut lines = BufReader::new(input).split(b'\n');
    let result = loop {
        tokio::select! {
            line = lines.next_segment() => match line {
                Ok(Some(line)) => {
                    process_line(&listener, &line);
                }
                Ok(None) => {
                    tracing::info!("input closed");
                    break Ok(());
                }
                Err(e) => break Err(anyhow::Error::new(e).context("failed to read input")),
            },
            _ = &mut shutdown => {
                tracing::info!("interrupted");
                break Ok(());
            }
        }
    };

    bridge.teardown();
    channel.close();
    tracing::info!(
        sent = channel.sent_count(),
        dropped = channel.dropped_count(),
        emitted = bridge.stats().emitted(),
        "notification relay stopped"
    );
    result
}

/// Feed one input line to the listener. Blank and unreadable lines are
/// skipped.
fn process_line(listener: &ListenerService, line: &[u8]) -> Option<PostOutcome> {
    if line.iter().all(u8::is_ascii_whitespace) {
        return None;
    }

    match serde_json::from_slice::<StatusBarNotification>(line) {
        Ok(notification) => Some(listener.on_notification_posted(&notification)),
        Err(e) => {
            tracing::warn!(error = %e, "skipping unreadable notification line");
            None
        }
    }
}
