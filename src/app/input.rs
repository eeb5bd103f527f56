//! Input reading.

use std::path::Path;
use std::sync::Arc;

use log::{info, warn};
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader, Lines};
use tokio::sync::mpsc;

use crate::error_handling::{ErrorType, ProcessingStats};
use crate::models::InputItem;

pub type InputLines = Lines<BufReader<Box<dyn AsyncRead + Unpin + Send>>>;

/// Opens `path` for line reading; `-` means stdin.
pub async fn open_input(path: &Path) -> std::io::Result<InputLines> {
    let reader: Box<dyn AsyncRead + Unpin + Send> = if path.as_os_str() == "-" {
        info!("Reading items from stdin");
        Box::new(tokio::io::stdin())
    } else {
        Box::new(tokio::fs::File::open(path).await?)
    };
    Ok(BufReader::new(reader).lines())
}

/// Parses every line and forwards the items to `tx`. Returns how many were sent.
///
/// Blank lines and comments are skipped; lines that fail to parse are logged
/// and counted as `MalformedInput`. A read error ends the input.
pub async fn read_input(
    mut lines: InputLines,
    tx: mpsc::Sender<InputItem>,
    stats: Arc<ProcessingStats>,
) -> usize {
    let mut sent = 0;
    loop {
        let line = match lines.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) => break,
            Err(e) => {
                warn!("Stopped reading input after {} item(s): {e}", sent);
                stats.increment_error(ErrorType::MalformedInput);
                break;
            }
        };

        match InputItem::parse_line(&line) {
            Ok(Some(item)) => {
                if tx.send(item).await.is_err() {
                    warn!("Dispatcher stopped, {} item(s) read so far", sent);
                    break;
                }
                sent += 1;
            }
            Ok(None) => {}
            Err(e) => {
                warn!("Skipping malformed input line: {e}");
                stats.increment_error(ErrorType::MalformedInput);
            }
        }
    }
    sent
}
