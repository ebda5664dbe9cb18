/// A unit of parsed input: a plain word or a redirection operator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    Word(String),
    Redirect(String),
}

/// Where an escape returns to once it has consumed its character.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Resume {
    Bare,
    DoubleQuote,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Bare,
    SingleQuote,
    DoubleQuote,
    Escape(Resume),
    RedirectOperator,
}

struct Tokenizer {
    tokens: Vec<Token>,
    current: String,
}

impl Tokenizer {
    fn new() -> Self {
        Self {
            tokens: Vec::new(),
            current: String::new(),
        }
    }

    fn emit_word(&mut self) {
        if !self.current.is_empty() {
            self.tokens.push(Token::Word(std::mem::take(&mut self.current)));
        }
    }

    fn emit_operator(&mut self) {
        self.tokens
            .push(Token::Redirect(std::mem::take(&mut self.current)));
    }

    fn transition(&mut self, state: State, c: char) -> State {
        match state {
            State::Bare => match c {
                c if c.is_whitespace() => {
                    self.emit_word();
                    State::Bare
                }
                '\'' => State::SingleQuote,
                '"' => State::DoubleQuote,
                '\\' => State::Escape(Resume::Bare),
                '>' => {
                    // A lone digit is the file descriptor of the operator.
                    let is_fd = self.current.len() == 1
                        && self.current.starts_with(|d: char| d.is_ascii_digit());
                    if !is_fd {
                        self.emit_word();
                    }
                    self.current.push(c);
                    State::RedirectOperator
                }
                c => {
                    self.current.push(c);
                    State::Bare
                }
            },
            State::SingleQuote => {
                if c == '\'' {
                    State::Bare
                } else {
                    self.current.push(c);
                    State::SingleQuote
                }
            }
            State::DoubleQuote => match c {
                '"' => State::Bare,
                '\\' => State::Escape(Resume::DoubleQuote),
                c => {
                    self.current.push(c);
                    State::DoubleQuote
                }
            },
            State::Escape(Resume::Bare) => {
                self.current.push(c);
                State::Bare
            }
            State::Escape(Resume::DoubleQuote) => {
                if !matches!(c, '\\' | '"' | '$' | '\n') {
                    self.current.push('\\');
                }
                self.current.push(c);
                State::DoubleQuote
            }
            State::RedirectOperator => match c {
                '>' => {
                    self.current.push(c);
                    self.emit_operator();
                    State::Bare
                }
                c if c.is_whitespace() => {
                    self.emit_operator();
                    State::Bare
                }
                c => {
                    self.emit_operator();
                    self.transition(State::Bare, c)
                }
            },
        }
    }

    fn finish(mut self, state: State) -> Vec<Token> {
        match state {
            State::RedirectOperator => self.emit_operator(),
            // Unterminated quotes and dangling escapes keep what was read so far.
            _ => self.emit_word(),
        }
        self.tokens
    }
}

/// Tokenizes shell input into words and redirection operators.
///
/// Single quotes preserve everything literally. Inside double quotes a
/// backslash only escapes `\`, `"`, `$` and newline; other escapes are kept
/// verbatim. Outside quotes a backslash makes the next character literal.
/// `>`, `>>` and their single-digit prefixed forms (`2>`, `1>>`) are
/// returned as [`Token::Redirect`].
pub fn tokenize(input: &str) -> Vec<Token> {
    let mut tokenizer = Tokenizer::new();
    let mut state = State::Bare;
    for c in input.chars() {
        state = tokenizer.transition(state, c);
    }
    let tokens = tokenizer.finish(state);
    log::trace!("tokenized {:?} into {:?}", input, tokens);
    tokens
}
