use crate::tokenize::Token;
use bitflags::bitflags;
use thiserror::Error;

/// Logical output stream an output record belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stream {
    Stdout,
    Stderr,
}

bitflags! {
    /// Set of streams claimed by a redirection target.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct StreamSet: u8 {
        const STDOUT = 0b01;
        const STDERR = 0b10;
    }
}

impl From<Stream> for StreamSet {
    fn from(stream: Stream) -> Self {
        match stream {
            Stream::Stdout => StreamSet::STDOUT,
            Stream::Stderr => StreamSet::STDERR,
        }
    }
}

impl StreamSet {
    pub fn claims(self, stream: Stream) -> bool {
        self.contains(stream.into())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Truncate,
    Append,
}

/// Redirection targets for one mode, in order of first mention.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Targets(Vec<(String, StreamSet)>);

impl Targets {
    /// Adds `streams` to `path`, merging with any earlier mention.
    pub fn insert(&mut self, path: &str, streams: StreamSet) {
        match self.0.iter_mut().find(|(p, _)| p == path) {
            Some((_, set)) => *set |= streams,
            None => self.0.push((path.to_string(), streams)),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, StreamSet)> {
        self.0.iter().map(|(p, set)| (p.as_str(), *set))
    }
}

/// All redirections of a single command.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Redirections {
    pub truncate: Targets,
    pub append: Targets,
    /// Every stream claimed by any target, whatever its mode.
    pub aggregated: StreamSet,
}

impl Redirections {
    fn add(&mut self, path: &str, stream: Stream, mode: Mode) {
        let streams = StreamSet::from(stream);
        match mode {
            Mode::Truncate => self.truncate.insert(path, streams),
            Mode::Append => self.append.insert(path, streams),
        }
        self.aggregated |= streams;
    }
}

/// A parsed command with arguments and redirections.
#[derive(Debug, Default)]
pub struct ParsedCommand {
    /// Command name followed by its arguments.
    pub args: Vec<String>,
    pub redirections: Redirections,
}

impl ParsedCommand {
    pub fn name(&self) -> Option<&str> {
        self.args.first().map(String::as_str)
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("syntax error: expected file name after '{operator}'")]
    MissingTarget { operator: String },
}

/// Splits an operator such as `2>>` into the stream it claims and its mode.
///
/// The stream is `None` for descriptors other than 1 and 2, which are
/// accepted but have no effect.
fn parse_operator(op: &str) -> Option<(Option<Stream>, Mode)> {
    let (fd, rest) = match op.chars().next() {
        Some(d) if d.is_ascii_digit() => (Some(d), &op[1..]),
        _ => (None, op),
    };
    let mode = match rest {
        ">" => Mode::Truncate,
        ">>" => Mode::Append,
        _ => return None,
    };
    let stream = match fd {
        None | Some('1') => Some(Stream::Stdout),
        Some('2') => Some(Stream::Stderr),
        Some(_) => None,
    };
    Some((stream, mode))
}

/// Parses tokens into a ParsedCommand, extracting redirection operators.
///
/// Every operator must be followed by a file name; otherwise the whole
/// command is rejected.
pub fn parse_command(tokens: Vec<Token>) -> Result<ParsedCommand, ParseError> {
    let mut parsed = ParsedCommand::default();
    let mut tokens = tokens.into_iter();

    while let Some(token) = tokens.next() {
        let op = match token {
            Token::Word(word) => {
                parsed.args.push(word);
                continue;
            }
            Token::Redirect(op) => op,
        };
        let Some((stream, mode)) = parse_operator(&op) else {
            parsed.args.push(op);
            continue;
        };
        let target = match tokens.next() {
            Some(Token::Word(file)) => file,
            _ => return Err(ParseError::MissingTarget { operator: op }),
        };
        match stream {
            Some(stream) => parsed.redirections.add(&target, stream, mode),
            None => log::debug!("ignoring unsupported redirection {} {}", op, target),
        }
    }

    log::debug!(
        "parsed {:?} with redirections {:?}",
        parsed.args,
        parsed.redirections
    );
    Ok(parsed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tokenize::tokenize;

    fn parse(line: &str) -> Result<ParsedCommand, ParseError> {
        parse_command(tokenize(line))
    }

    fn get(targets: &Targets, path: &str) -> Option<StreamSet> {
        targets.iter().find(|(p, _)| *p == path).map(|(_, set)| set)
    }

    #[test]
    fn test_parse_stdout_redirect() {
        let parsed = parse("echo hi > out.txt").unwrap();
        assert_eq!(parsed.args, vec!["echo", "hi"]);
        assert_eq!(get(&parsed.redirections.truncate, "out.txt"), Some(StreamSet::STDOUT));
        assert_eq!(parsed.redirections.append, Targets::default());
        assert_eq!(parsed.redirections.aggregated, StreamSet::STDOUT);
    }

    #[test]
    fn test_parse_stderr_redirect() {
        let parsed = parse("ls 2> err.txt").unwrap();
        assert_eq!(parsed.args, vec!["ls"]);
        assert_eq!(get(&parsed.redirections.truncate, "err.txt"), Some(StreamSet::STDERR));
        assert_eq!(parsed.redirections.aggregated, StreamSet::STDERR);
    }

    #[test]
    fn test_operator_table() {
        let cases = [
            (">", Mode::Truncate, StreamSet::STDOUT),
            ("1>", Mode::Truncate, StreamSet::STDOUT),
            ("2>", Mode::Truncate, StreamSet::STDERR),
            (">>", Mode::Append, StreamSet::STDOUT),
            ("1>>", Mode::Append, StreamSet::STDOUT),
            ("2>>", Mode::Append, StreamSet::STDERR),
        ];
        for (op, mode, streams) in cases {
            let parsed = parse(&format!("cmd {} f", op)).unwrap();
            let targets = match mode {
                Mode::Truncate => &parsed.redirections.truncate,
                Mode::Append => &parsed.redirections.append,
            };
            assert_eq!(get(targets, "f"), Some(streams), "operator {}", op);
            assert_eq!(parsed.args, vec!["cmd"]);
        }
    }

    #[test]
    fn test_unsupported_descriptors_are_discarded() {
        let parsed = parse("echo a 3> f 9>> g b").unwrap();
        assert_eq!(parsed.args, vec!["echo", "a", "b"]);
        assert_eq!(parsed.redirections, Redirections::default());
    }

    #[test]
    fn test_missing_target_is_an_error() {
        assert_eq!(
            parse("echo hi >").unwrap_err(),
            ParseError::MissingTarget {
                operator: ">".to_string()
            }
        );
        assert!(parse("echo hi 7>>").is_err());
    }

    #[test]
    fn test_operator_followed_by_operator_is_an_error() {
        assert!(parse("echo hi > 2> err").is_err());
    }

    #[test]
    fn test_same_path_unions_streams() {
        let parsed = parse("cmd > both 2> both >> log 2>> log > both").unwrap();
        let redirections = &parsed.redirections;
        assert_eq!(redirections.truncate.iter().count(), 1);
        assert_eq!(redirections.append.iter().count(), 1);
        assert_eq!(get(&redirections.truncate, "both"), Some(StreamSet::all()));
        assert_eq!(get(&redirections.append, "log"), Some(StreamSet::all()));
        assert_eq!(redirections.aggregated, StreamSet::all());
    }

    #[test]
    fn test_truncate_and_append_tracked_separately() {
        let parsed = parse("cmd > f 2>> f").unwrap();
        assert_eq!(get(&parsed.redirections.truncate, "f"), Some(StreamSet::STDOUT));
        assert_eq!(get(&parsed.redirections.append, "f"), Some(StreamSet::STDERR));
    }

    #[test]
    fn test_targets_keep_first_mention_order() {
        let parsed = parse("cmd > b 2> a > b").unwrap();
        let paths: Vec<_> = parsed.redirections.truncate.iter().map(|(p, _)| p).collect();
        assert_eq!(paths, vec!["b", "a"]);
    }

    #[test]
    fn test_only_redirection() {
        let parsed = parse("> out").unwrap();
        assert_eq!(parsed.name(), None);
        assert_eq!(get(&parsed.redirections.truncate, "out"), Some(StreamSet::STDOUT));
    }
}
