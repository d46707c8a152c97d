use futures_util::StreamExt;
use std::io::{self, Write};

use super::Spinner;
use crate::llm::{CancellationToken, ChatError, ChatStream, StreamEvent};

/// Prints a chat stream to stdout as it arrives.
///
/// A spinner shows `message` until the first chunk. Ctrl+C cancels
/// `signal`, which ends the stream quietly. Returns the final text, or
/// `None` when the request was cancelled before completing.
pub async fn print_stream(
    mut stream: ChatStream,
    signal: &CancellationToken,
    message: &str,
) -> Result<Option<String>, ChatError> {
    let spinner = Spinner::new(message);
    let mut printed = 0;
    let mut interrupted = false;
    let mut result = None;

    loop {
        tokio::select! {
            event = stream.next() => match event {
                None => break,
                Some(StreamEvent::Status(status)) => {
                    tracing::debug!(status, "response headers received");
                }
                Some(StreamEvent::Chunk { text, done }) => {
                    spinner.stop();
                    if let Some(delta) = text.get(printed..) {
                        print!("{delta}");
                        let _ = io::stdout().flush();
                    }
                    printed = text.len();
                    if done {
                        result = Some(text);
                    }
                }
                Some(StreamEvent::Error(e)) => {
                    spinner.stop();
                    if printed > 0 {
                        println!();
                    }
                    return Err(e);
                }
            },
            signalled = tokio::signal::ctrl_c(), if !interrupted => {
                interrupted = true;
                if signalled.is_ok() {
                    signal.cancel();
                }
            }
        }
    }

    spinner.stop();
    if printed > 0 {
        println!();
    }

    Ok(result)
}
