//! Line-based TCP control surface: `force <input-id>`, `clear-force`,
//! `status`. One reply line per command line.

use std::sync::Arc;
use std::time::Duration;
use stream_router::{InputId, Router};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

const COMPONENT: &str = "control";
const ACCEPT_RETRY_DELAY: Duration = Duration::from_millis(250);

/// Spawns the control accept loop. Each client gets its own handler task;
/// everything winds down when the shutdown signal flips to `true`.
pub fn spawn_control(
    router: Arc<Router>,
    listener: TcpListener,
    mut shutdown: watch::Receiver<bool>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            tokio::select! {
                _ = shutdown.changed() => {
                    if *shutdown.borrow() {
                        info!(
                            component = COMPONENT,
                            "shutdown signalled; stopping control listener"
                        );
                        break;
                    }
                }
                accepted = listener.accept() => match accepted {
                    Ok((stream, peer)) => {
                        debug!(component = COMPONENT, peer = %peer, "control client connected");
                        tokio::spawn(handle_client(
                            router.clone(),
                            stream,
                            shutdown.clone(),
                        ));
                    }
                    Err(err) => {
                        warn!(component = COMPONENT, err = %err, "accept failed; retrying");
                        tokio::time::sleep(ACCEPT_RETRY_DELAY).await;
                    }
                }
            }
        }
    })
}

async fn handle_client(router: Arc<Router>, stream: TcpStream, mut shutdown: watch::Receiver<bool>) {
    let (reader, mut writer) = stream.into_split();
    let mut lines = BufReader::new(reader).lines();

    loop {
        tokio::select! {
            _ = shutdown.changed() => {
                if *shutdown.borrow() {
                    break;
                }
            }
            line = lines.next_line() => match line {
                Ok(Some(line)) => {
                    let reply = dispatch(&router, line.trim()).await;
                    if writer.write_all(reply.as_bytes()).await.is_err()
                        || writer.write_all(b"\n").await.is_err()
                    {
                        break;
                    }
                }
                Ok(None) | Err(_) => break,
            }
        }
    }
}

async fn dispatch(router: &Router, line: &str) -> String {
    let mut parts = line.split_whitespace();
    match parts.next() {
        Some("status") => router.status().await.to_string(),
        Some("force") => match parts.next() {
            Some(id) => match router.force(&InputId::new(id)).await {
                Ok(()) => "ok".to_string(),
                Err(err) => format!("error: {err}"),
            },
            None => "error: force requires an input id".to_string(),
        },
        Some("clear-force") => {
            router.clear_force().await;
            "ok".to_string()
        }
        _ => "error: unknown command (force <input-id> | clear-force | status)".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::dispatch;
    use std::sync::Arc;
    use std::time::Duration;
    use stream_router::{InputConfig, InputId, NoProbe, Router, RouterConfig};

    fn router() -> Router {
        let config = RouterConfig {
            inputs: vec![
                InputConfig::new(InputId::new("a"), Duration::from_secs(5)),
                InputConfig::new(InputId::new("b"), Duration::from_secs(5)),
            ],
            egress_queue_size: 8,
        };
        Router::new("control-test", config, Arc::new(NoProbe)).expect("valid config")
    }

    #[tokio::test]
    async fn status_renders_the_snapshot() {
        let router = router();

        let reply = dispatch(&router, "status").await;

        assert!(reply.contains("no-input"));
    }

    #[tokio::test]
    async fn force_and_clear_force_round_trip() {
        let router = router();

        assert_eq!(dispatch(&router, "force b").await, "ok");
        assert!(dispatch(&router, "status").await.contains("forced b"));
        assert_eq!(dispatch(&router, "clear-force").await, "ok");
        assert!(!dispatch(&router, "status").await.contains("forced"));
    }

    #[tokio::test]
    async fn force_unknown_input_reports_the_error() {
        let router = router();

        let reply = dispatch(&router, "force nope").await;

        assert_eq!(reply, "error: no such input: nope");
    }

    #[tokio::test]
    async fn force_without_id_and_unknown_commands_are_rejected() {
        let router = router();

        assert!(dispatch(&router, "force").await.starts_with("error:"));
        assert!(dispatch(&router, "reboot").await.starts_with("error:"));
        assert!(dispatch(&router, "").await.starts_with("error:"));
    }
}
