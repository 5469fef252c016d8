//! Line-delimited JSON transport for the request channel.
//!
//! Every request runs on its own task, so slow scans do not hold up other
//! requests; replies can therefore arrive out of order and carry the request
//! `id`. A single writer task owns the output so reply lines never interleave.

use crate::channel::{Dispatcher, Reply};
use crate::lifecycle::{AppEvent, Controller};
use anyhow::{Context, Result};
use std::sync::Arc;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tracing::{error, info};

/// Open a window, answer requests until `input` closes, then close and quit
pub async fn run<R, W>(dispatcher: Dispatcher, input: R, output: W) -> Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin + Send + 'static,
{
    let mut controller = Controller::new();
    controller.handle(AppEvent::Ready);

    let served = serve(dispatcher, input, output).await;

    controller.handle(AppEvent::WindowClosed);
    controller.handle(AppEvent::AllWindowsClosed);

    let requests = served?;
    info!("Channel closed after {requests} requests");
    Ok(())
}

/// Answer every request line from `input`, returning how many were read
pub async fn serve<R, W>(dispatcher: Dispatcher, input: R, output: W) -> Result<usize>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin + Send + 'static,
{
    let dispatcher = Arc::new(dispatcher);
    let (tx, rx) = mpsc::unbounded_channel::<Reply>();
    let writer = tokio::spawn(write_replies(rx, output));

    let mut handlers = JoinSet::new();
    let mut lines = input.lines();
    let mut requests = 0;

    while let Some(line) = lines
        .next_line()
        .await
        .context("Failed to read request")?
    {
        if line.trim().is_empty() {
            continue;
        }
        requests += 1;

        let dispatcher = Arc::clone(&dispatcher);
        let tx = tx.clone();
        handlers.spawn(async move {
            match tokio::task::spawn_blocking(move || dispatcher.dispatch_line(&line)).await {
                Ok(reply) => {
                    // Only fails once the writer is gone, which it reports itself
                    let _ = tx.send(reply);
                }
                Err(e) => error!("Request handler panicked: {e}"),
            }
        });
    }

    while handlers.join_next().await.is_some() {}
    drop(tx);

    writer.await.context("Reply writer panicked")??;
    Ok(requests)
}

async fn write_replies<W>(mut rx: mpsc::UnboundedReceiver<Reply>, mut output: W) -> Result<()>
where
    W: AsyncWrite + Unpin,
{
    while let Some(reply) = rx.recv().await {
        let mut line = serde_json::to_string(&reply).context("Failed to serialize reply")?;
        line.push('\n');
        output
            .write_all(line.as_bytes())
            .await
            .context("Failed to write reply")?;
        output.flush().await.context("Failed to flush reply")?;
    }
    Ok(())
}
