//! Newline-delimited JSON transport: one request per input line, one reply
//! per output line, in request order.

use anyhow::{Context, Result};
use lgit_core::domain::Outcome;
use lgit_core::protocol::Response;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tracing::{debug, warn};

use crate::services::SessionHandle;

/// Code for input lines that are not a request envelope
pub const PARSE_ERROR: &str = "EPARSE";

/// Serve requests from `reader` until end of input
pub async fn serve<R, W>(mut reader: R, mut writer: W, handle: SessionHandle) -> Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    // Raw bytes: a line that is not UTF-8 is a bad request, not a broken stream
    let mut buf = Vec::new();

    loop {
        buf.clear();
        let read = reader
            .read_until(b'\n', &mut buf)
            .await
            .context("Failed to read request line")?;
        if read == 0 {
            break;
        }

        let line = buf.trim_ascii();
        if line.is_empty() {
            continue;
        }

        let response = match serde_json::from_slice(line) {
            Ok(request) => handle.send(request).await?,
            Err(e) => {
                warn!("Rejecting malformed request line: {}", e);
                parse_failure(&e)
            }
        };

        write_response(&mut writer, &response).await?;
    }

    debug!("Input closed");
    Ok(())
}

fn parse_failure(err: &serde_json::Error) -> Response {
    Response {
        id: 0,
        cmd: String::new(),
        repository: String::new(),
        result: Outcome::failure(PARSE_ERROR, format!("Invalid request: {}", err)),
    }
}

async fn write_response<W: AsyncWrite + Unpin>(writer: &mut W, response: &Response) -> Result<()> {
    let mut line = serde_json::to_string(response).context("Failed to serialize response")?;
    line.push('\n');

    writer
        .write_all(line.as_bytes())
        .await
        .context("Failed to write response")?;
    writer.flush().await.context("Failed to flush response")
}
