use crate::history::History;
use crate::signals;
use anyhow::Result;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use std::cell::RefCell;
use std::io::{BufRead, Result as IoResult, Write};
use std::rc::Rc;

/// Result of asking a [`LineSource`] for the next line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReadOutcome {
    /// A line, without its trailing newline.
    Line(String),
    /// Ctrl-C at the prompt: the partial line is discarded.
    Interrupted,
    /// End of input.
    Eof,
}

/// Where the session loop gets its lines from.
pub trait LineSource {
    /// Read the next line, showing `prompt` first if the source is interactive.
    fn read_line(&mut self, prompt: &str) -> Result<ReadOutcome>;
}

/// Interactive terminal input with line editing.
pub struct EditorSource {
    editor: DefaultEditor,
}

impl EditorSource {
    /// Create an editor whose recall list starts with the session's history.
    pub fn new(history: &History) -> Result<Self> {
        let mut editor = DefaultEditor::new()?;
        for (_, line) in history.iter() {
            editor.add_history_entry(line)?;
        }
        Ok(Self { editor })
    }
}

impl LineSource for EditorSource {
    fn read_line(&mut self, prompt: &str) -> Result<ReadOutcome> {
        match self.editor.readline(prompt) {
            Ok(line) => {
                self.editor.add_history_entry(line.as_str())?;
                // The editor owns SIGINT while reading; take it back before the line runs.
                if let Err(e) = signals::install() {
                    tracing::warn!("could not restore SIGINT handler: {}", e);
                }
                Ok(ReadOutcome::Line(line))
            }
            Err(ReadlineError::Interrupted) => Ok(ReadOutcome::Interrupted),
            Err(ReadlineError::Eof) => Ok(ReadOutcome::Eof),
            Err(err) => Err(err.into()),
        }
    }
}

/// Script file, piped input, or a terminal without line editing.
pub struct ReaderSource<R> {
    reader: R,
    prompt_to: Option<Box<dyn Write>>,
}

impl<R: BufRead> ReaderSource<R> {
    /// A source that never prompts.
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            prompt_to: None,
        }
    }

    /// A source that writes the prompt to `out` before every read.
    pub fn prompting(reader: R, out: Box<dyn Write>) -> Self {
        Self {
            reader,
            prompt_to: Some(out),
        }
    }
}

impl<R: BufRead> LineSource for ReaderSource<R> {
    fn read_line(&mut self, prompt: &str) -> Result<ReadOutcome> {
        if let Some(out) = &mut self.prompt_to {
            out.write_all(prompt.as_bytes())?;
            out.flush()?;
        }
        let mut buf = Vec::new();
        if self.reader.read_until(b'\n', &mut buf)? == 0 {
            return Ok(ReadOutcome::Eof);
        }
        if buf.last() == Some(&b'\n') {
            buf.pop();
            if buf.last() == Some(&b'\r') {
                buf.pop();
            }
        }
        Ok(ReadOutcome::Line(String::from_utf8_lossy(&buf).into_owned()))
    }
}

/// Memory-backed writer for capturing builtin output and diagnostics.
#[derive(Clone, Default)]
pub struct MemWriter {
    buf: Rc<RefCell<Vec<u8>>>,
}

impl MemWriter {
    /// Public constructor.
    pub fn new() -> Self {
        Self::default()
    }

    /// Convenience: create writer and return (writer, rc_handle).
    pub fn with_handle() -> (Self, Rc<RefCell<Vec<u8>>>) {
        let mw = MemWriter::new();
        let rc = mw.buf.clone();
        (mw, rc)
    }

    /// Everything written so far, lossily decoded.
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.buf.borrow()).into_owned()
    }
}

impl Write for MemWriter {
    fn write(&mut self, data: &[u8]) -> IoResult<usize> {
        self.buf.borrow_mut().extend_from_slice(data);
        Ok(data.len())
    }

    fn flush(&mut self) -> IoResult<()> {
        Ok(())
    }
}
