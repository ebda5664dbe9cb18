use crate::redirection::{Mode, Redirections, Stream, StreamSet};
use std::fs::OpenOptions;
use std::io::{self, Write};

/// One tagged unit of command output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputRecord {
    pub text: String,
    pub stream: Stream,
}

impl OutputRecord {
    pub fn stdout(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            stream: Stream::Stdout,
        }
    }

    pub fn stderr(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            stream: Stream::Stderr,
        }
    }
}

/// Concatenates, in order, the records whose stream is in `streams`.
fn collect(records: &[OutputRecord], streams: StreamSet) -> String {
    records
        .iter()
        .filter(|r| streams.claims(r.stream))
        .map(|r| r.text.as_str())
        .collect()
}

/// Writes content to a file, creating it and either truncating or appending.
pub fn write_to_file(file: &str, content: &str, mode: Mode) -> io::Result<()> {
    let mut options = OpenOptions::new();
    options.create(true);
    match mode {
        Mode::Truncate => options.write(true).truncate(true),
        Mode::Append => options.append(true),
    };
    // The handle is dropped, and the file closed, before returning.
    options.open(file)?.write_all(content.as_bytes())
}

/// Sends command output to its redirection targets and the terminal.
///
/// Each target file is written once, with the records of every stream it
/// claims. Records of streams no target claims go to `stdout` or `stderr`
/// according to their tag. Files that cannot be written are skipped.
pub fn multiplex(
    records: &[OutputRecord],
    redirections: &Redirections,
    stdout: &mut impl Write,
    stderr: &mut impl Write,
) -> io::Result<()> {
    let targets = redirections
        .truncate
        .iter()
        .map(|(path, streams)| (path, streams, Mode::Truncate))
        .chain(
            redirections
                .append
                .iter()
                .map(|(path, streams)| (path, streams, Mode::Append)),
        );
    for (path, streams, mode) in targets {
        if let Err(e) = write_to_file(path, &collect(records, streams), mode) {
            log::debug!("skipping redirection to {}: {}", path, e);
        }
    }

    // A failing terminal stream stops receiving records; the other one
    // still gets all of its output. The first error is returned.
    let mut stdout_result: io::Result<()> = Ok(());
    let mut stderr_result: io::Result<()> = Ok(());
    for record in records
        .iter()
        .filter(|r| !redirections.aggregated.claims(r.stream))
    {
        let (writer, result) = match record.stream {
            Stream::Stdout => (&mut *stdout as &mut dyn Write, &mut stdout_result),
            Stream::Stderr => (&mut *stderr as &mut dyn Write, &mut stderr_result),
        };
        if result.is_ok() {
            *result = writer.write_all(record.text.as_bytes());
        }
    }
    if stdout_result.is_ok() {
        stdout_result = stdout.flush();
    }
    if stderr_result.is_ok() {
        stderr_result = stderr.flush();
    }
    stdout_result.and(stderr_result)
}
