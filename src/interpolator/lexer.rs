/// Tokens of the `${...}` template language.
#[derive(Debug, Clone, PartialEq)]
pub enum TemplateToken {
    Text(String),
    TemplateStart,
    Reference(String),
    TemplateEnd,
    Error(String),
    Eof,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Mode {
    Text,
    Reference,
    TemplateEnd,
}

/// Pull-based lexer alternating between plain text and `${...}` references.
/// A reference runs up to the first `}`.
pub struct TemplateLexer<'a> {
    input: &'a str,
    pos: usize,
    mode: Mode,
    finished: bool,
}

impl<'a> TemplateLexer<'a> {
    pub fn new(input: &'a str) -> Self {
        Self {
            input,
            pos: 0,
            mode: Mode::Text,
            finished: false,
        }
    }

    fn scan(&mut self) -> TemplateToken {
        let rest = &self.input[self.pos..];

        match self.mode {
            Mode::Text => {
                if rest.is_empty() {
                    return TemplateToken::Eof;
                }
                match rest.find("${") {
                    Some(0) => {
                        self.pos += 2;
                        self.mode = Mode::Reference;
                        TemplateToken::TemplateStart
                    }
                    Some(offset) => {
                        self.pos += offset;
                        TemplateToken::Text(rest[..offset].to_string())
                    }
                    None => {
                        self.pos = self.input.len();
                        TemplateToken::Text(rest.to_string())
                    }
                }
            }
            Mode::Reference => match rest.find('}') {
                Some(offset) => {
                    self.pos += offset;
                    self.mode = Mode::TemplateEnd;
                    TemplateToken::Reference(rest[..offset].to_string())
                }
                None => TemplateToken::Error("unterminated template, expected '}'".to_string()),
            },
            Mode::TemplateEnd => {
                self.pos += 1;
                self.mode = Mode::Text;
                TemplateToken::TemplateEnd
            }
        }
    }
}

impl<'a> Iterator for TemplateLexer<'a> {
    type Item = TemplateToken;

    fn next(&mut self) -> Option<TemplateToken> {
        if self.finished {
            return None;
        }

        let token = self.scan();
        if matches!(token, TemplateToken::Eof | TemplateToken::Error(_)) {
            self.finished = true;
        }
        Some(token)
    }
}
