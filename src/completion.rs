use crate::commands::BUILTINS;
use crate::search_path::SearchPath;
use rustyline::Helper;
use rustyline::completion::{Completer, FilenameCompleter, Pair};
use rustyline::error::ReadlineError;
use rustyline::highlight::Highlighter;
use rustyline::hint::Hinter;
use rustyline::validate::Validator;

/// Shell completer for tab completion.
pub struct ShellCompleter {
    filename_completer: FilenameCompleter,
}

impl ShellCompleter {
    pub fn new() -> Self {
        Self {
            filename_completer: FilenameCompleter::new(),
        }
    }
}

impl Default for ShellCompleter {
    fn default() -> Self {
        Self::new()
    }
}

/// Builtins and search-path entries starting with `prefix`, sorted and deduplicated.
fn command_candidates(prefix: &str, path: &SearchPath) -> Vec<Pair> {
    let mut names: Vec<String> = BUILTINS
        .iter()
        .map(|b| b.to_string())
        .chain(path.entries())
        .filter(|name| name.starts_with(prefix))
        .collect();
    names.sort();
    names.dedup();
    names
        .into_iter()
        .map(|name| Pair {
            replacement: format!("{} ", name),
            display: name,
        })
        .collect()
}

impl Completer for ShellCompleter {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        ctx: &rustyline::Context<'_>,
    ) -> Result<(usize, Vec<Self::Candidate>), ReadlineError> {
        let (start, word) = extract_word(line, pos);
        if is_first_word(line, pos) {
            Ok((start, command_candidates(word, &SearchPath::from_env())))
        } else {
            self.filename_completer.complete(line, pos, ctx)
        }
    }
}

fn is_first_word(line: &str, pos: usize) -> bool {
    !line[..pos].trim_start().contains(char::is_whitespace)
}

fn extract_word(line: &str, pos: usize) -> (usize, &str) {
    let before = &line[..pos];
    let start = before.rfind(char::is_whitespace).map_or(0, |i| i + 1);
    (start, &line[start..pos])
}

impl Helper for ShellCompleter {}
impl Hinter for ShellCompleter {
    type Hint = String;
}
impl Highlighter for ShellCompleter {}
impl Validator for ShellCompleter {}
