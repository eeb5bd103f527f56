//! Consumer of the `mediaitems` stream.

use std::path::PathBuf;

use anyhow::{Context, Result};
use tokio::io::AsyncWriteExt;
use tokio::sync::mpsc;

use crate::config::MEDIA_STREAM;
use crate::route::MediaEmission;

/// Drains the media stream, appending each emission as a JSON line to `out`,
/// or logging it when no file is given. Returns the number of items consumed.
pub async fn consume_media(
    mut rx: mpsc::Receiver<MediaEmission>,
    out: Option<PathBuf>,
) -> Result<usize> {
    let mut file = match &out {
        Some(path) => Some(
            tokio::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .await
                .with_context(|| format!("Failed to open media output {}", path.display()))?,
        ),
        None => None,
    };

    let mut consumed = 0;
    while let Some(emission) = rx.recv().await {
        let line = serde_json::to_string(&emission).context("Failed to serialize media item")?;
        match file.as_mut() {
            Some(file) => {
                file.write_all(line.as_bytes()).await?;
                file.write_all(b"\n").await?;
            }
            None => log::info!("{}: {}", MEDIA_STREAM, line),
        }
        consumed += 1;
    }

    if let Some(mut file) = file {
        file.flush().await?;
    }
    Ok(consumed)
}
