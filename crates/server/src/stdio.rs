//! Line-delimited stdio transport.
//!
//! One JSON-RPC message per line on stdin, responses on stdout. Requests
//! dispatch concurrently; a writer task serializes stdout so interleaved
//! responses never corrupt the stream. Logs go to stderr only.

use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::sync::mpsc;

use crate::mcp::McpServer;

pub async fn run(server: Arc<McpServer>) -> anyhow::Result<()> {
    let stdin = tokio::io::stdin();
    let mut lines = BufReader::new(stdin).lines();

    let (tx, mut rx) = mpsc::channel::<String>(32);
    let writer = tokio::spawn(async move {
        let mut stdout = tokio::io::stdout();
        while let Some(line) = rx.recv().await {
            stdout.write_all(line.as_bytes()).await?;
            stdout.write_all(b"\n").await?;
            stdout.flush().await?;
        }
        Ok::<_, std::io::Error>(())
    });

    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }

        let server = Arc::clone(&server);
        let tx = tx.clone();
        tokio::spawn(async move {
            let Some(response) = server.handle_line(&line).await else {
                return;
            };
            match serde_json::to_string(&response) {
                Ok(json) => {
                    let _ = tx.send(json).await;
                }
                Err(e) => tracing::error!(error = %e, "failed to serialize response"),
            }
        });
    }

    // stdin closed: drain in-flight responses, then stop.
    drop(tx);
    writer.await??;
    tracing::info!("stdin closed, shutting down");
    Ok(())
}
