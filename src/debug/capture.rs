//! Captures everything the process writes to stdout so it can be shown in the
//! debug log pane.
//!
//! stdout is swapped for the write end of a pipe for as long as the
//! [`OutputCapture`] lives. One background thread keeps reading the other end
//! and splitting it into lines, so writers never wait on the UI; a second
//! hands those lines over a rendezvous channel one at a time. The UI takes at
//! most one per frame with [`LineSource::try_next`], which never blocks.

use crate::error::CaptureError;
use gag::{Redirect, RedirectError};
use os_pipe::PipeWriter;
use std::io::{self, BufRead, BufReader, Read, Write};
use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};
use std::thread;

/// Somewhere finished lines of output can be taken from without waiting.
pub trait LineSource {
    /// the next waiting line, if there is one right now
    fn try_next(&self) -> Option<String>;
}

impl LineSource for Receiver<String> {
    fn try_next(&self) -> Option<String> {
        match self.try_recv() {
            Ok(line) => Some(line),
            Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => None,
        }
    }
}

/// stdout redirected into a line channel. Dropping this restores stdout.
pub struct OutputCapture {
    redirect: Redirect<PipeWriter>,
    lines: Receiver<String>,
}

impl OutputCapture {
    /// take over the process's stdout. Only one capture can exist at a time.
    pub fn stdout() -> Result<OutputCapture, CaptureError> {
        Self::with_redirect(Redirect::stdout)
    }

    fn with_redirect<F>(redirect: F) -> Result<OutputCapture, CaptureError>
    where
        F: FnOnce(PipeWriter) -> Result<Redirect<PipeWriter>, RedirectError<PipeWriter>>,
    {
        let (reader, writer) = os_pipe::pipe().map_err(CaptureError::Pipe)?;
        let redirect = redirect(writer).map_err(|e| CaptureError::Redirect(e.error))?;
        let lines = spawn_line_reader(reader)?;
        Ok(OutputCapture { redirect, lines })
    }

    /// Restore the stream and return every line not yet taken, including
    /// anything still in the pipe.
    pub fn finish(self) -> Result<Vec<String>, io::Error> {
        io::stdout().flush()?;
        let OutputCapture { redirect, lines } = self;
        // closes the last write end, so the reader sees end of stream
        drop(redirect);
        Ok(lines.iter().collect())
    }
}

impl LineSource for OutputCapture {
    fn try_next(&self) -> Option<String> {
        self.lines.try_next()
    }
}

/// Start the threads that split `reader` into lines and offer them one at a
/// time. The returned channel has no buffer, but reading runs ahead of it, so
/// whatever writes into `reader` never waits for lines to be taken.
pub fn spawn_line_reader<R>(reader: R) -> Result<Receiver<String>, CaptureError>
where
    R: Read + Send + 'static,
{
    let (read_tx, read_rx) = mpsc::channel();
    thread::Builder::new()
        .name("stdout-capture".into())
        .spawn(move || read_lines(reader, read_tx))
        .map_err(CaptureError::Thread)?;

    let (tx, rx) = mpsc::sync_channel(0);
    thread::Builder::new()
        .name("stdout-handoff".into())
        .spawn(move || {
            for line in read_rx {
                if tx.send(line).is_err() {
                    break;
                }
            }
        })
        .map_err(CaptureError::Thread)?;
    Ok(rx)
}

fn read_lines(reader: impl Read, tx: Sender<String>) {
    let mut reader = BufReader::new(reader);
    loop {
        match read_line(&mut reader) {
            Ok(Some(line)) => {
                if tx.send(line).is_err() {
                    break;
                }
            }
            Ok(None) => break,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(_) => break,
        }
    }
}

/// one line without its terminator; `None` at end of stream. Bytes that
/// aren't UTF-8 are replaced rather than dropping the line.
fn read_line(reader: &mut impl BufRead) -> Result<Option<String>, io::Error> {
    let mut buf = Vec::new();
    if reader.read_until(b'\n', &mut buf)? == 0 {
        return Ok(None);
    }
    if buf.last() == Some(&b'\n') {
        buf.pop();
        if buf.last() == Some(&b'\r') {
            buf.pop();
        }
    }
    Ok(Some(String::from_utf8_lossy(&buf).into_owned()))
}
