/// Parser for the line-oriented program text syntax
///
/// ```text
/// # walk the corridor, turning at walls
/// repeat 7
///     if tile-ahead-walkable
///         move
///     else
///         turn right
/// collect
/// ```
///
/// One instruction per line; `repeat`, `if` and `else` own the lines indented one
/// level below them. Indentation is tabs or a consistent unit of 2 or 4 spaces.
use crate::program::{Condition, Instruction, Program, TurnDirection};
use crate::span::Span;

/// Deepest indentation level a program may use
pub const MAX_NESTING: usize = 64;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("invalid indentation")]
    InvalidIndentation { span: Span },
    #[error("`{instruction}` is missing its argument")]
    MissingArgument { instruction: String, span: Span },
    #[error("unexpected `{token}`")]
    UnexpectedToken { token: String, span: Span },
    #[error("`{value}` is not a valid repeat count")]
    InvalidRepeatCount { value: String, span: Span },
    #[error("`{value}` is not a turn direction")]
    InvalidDirection { value: String, span: Span },
    #[error("unknown condition `{name}`")]
    UnknownCondition { name: String, span: Span },
    #[error("`else` without a matching `if`")]
    UnexpectedElse { span: Span },
    #[error("blocks are nested {depth} levels deep, at most {MAX_NESTING} are allowed")]
    NestingTooDeep { depth: usize, span: Span },
}

impl ParseError {
    pub fn span(&self) -> Span {
        match self {
            ParseError::InvalidIndentation { span }
            | ParseError::MissingArgument { span, .. }
            | ParseError::UnexpectedToken { span, .. }
            | ParseError::InvalidRepeatCount { span, .. }
            | ParseError::InvalidDirection { span, .. }
            | ParseError::UnknownCondition { span, .. }
            | ParseError::UnexpectedElse { span }
            | ParseError::NestingTooDeep { span, .. } => *span,
        }
    }
}

/// A non-blank, non-comment source line
#[derive(Debug, Clone)]
struct Line<'a> {
    indent: usize,
    /// Byte offset of `text` in the source
    start: usize,
    text: &'a str,
}

impl<'a> Line<'a> {
    /// Whitespace-separated words with their spans
    fn words(&self) -> Vec<(&'a str, Span)> {
        let mut words = Vec::new();
        let mut word_start = None;
        for (i, ch) in self.text.char_indices() {
            match (ch.is_whitespace(), word_start) {
                (true, Some(begin)) => {
                    words.push((&self.text[begin..i], self.span_of(begin, i)));
                    word_start = None;
                }
                (false, None) => word_start = Some(i),
                _ => {}
            }
        }
        if let Some(begin) = word_start {
            words.push((&self.text[begin..], self.span_of(begin, self.text.len())));
        }
        words
    }

    fn span_of(&self, begin: usize, end: usize) -> Span {
        Span::new(self.start + begin, self.start + end)
    }

    fn span(&self) -> Span {
        self.span_of(0, self.text.len())
    }
}

pub struct Parser<'a> {
    lines: Vec<Line<'a>>,
    pos: usize,
}

impl<'a> Parser<'a> {
    pub fn new(input: &'a str) -> Result<Self, ParseError> {
        Ok(Parser {
            lines: split_lines(input)?,
            pos: 0,
        })
    }

    pub fn parse(&mut self) -> Result<Program, ParseError> {
        let program = self.parse_block(0)?;
        match self.lines.get(self.pos) {
            // A block only stops early on a dedent, which can't happen at level 0
            Some(line) => Err(ParseError::InvalidIndentation { span: line.span() }),
            None => Ok(program),
        }
    }

    fn parse_block(&mut self, indent: usize) -> Result<Vec<Instruction>, ParseError> {
        let mut block = Vec::new();
        while let Some(line) = self.lines.get(self.pos).cloned() {
            if line.indent < indent {
                break;
            }
            if line.indent > indent {
                return Err(ParseError::InvalidIndentation { span: line.span() });
            }
            self.pos += 1;
            block.push(self.parse_instruction(&line, indent)?);
        }
        Ok(block)
    }

    fn parse_instruction(&mut self, line: &Line<'a>, indent: usize) -> Result<Instruction, ParseError> {
        let words = line.words();
        let Some(&(keyword, keyword_span)) = words.first() else {
            return Err(ParseError::InvalidIndentation { span: line.span() });
        };
        let args = &words[1..];

        let instruction = match keyword {
            "move" => {
                no_more(args)?;
                Instruction::Move
            }
            "collect" => {
                no_more(args)?;
                Instruction::Collect
            }
            "turn" => {
                let (value, span) = required(keyword, keyword_span, args)?;
                no_more(&args[1..])?;
                let direction = match value {
                    "left" => TurnDirection::Left,
                    "right" => TurnDirection::Right,
                    _ => {
                        return Err(ParseError::InvalidDirection {
                            value: value.to_string(),
                            span,
                        })
                    }
                };
                Instruction::turn(direction)
            }
            "repeat" => {
                let (value, span) = required(keyword, keyword_span, args)?;
                no_more(&args[1..])?;
                let times = value.parse::<u32>().map_err(|_| ParseError::InvalidRepeatCount {
                    value: value.to_string(),
                    span,
                })?;
                let body = self.parse_block(indent + 1)?;
                Instruction::repeat(times, body)
            }
            "if" => {
                let condition = match args.first() {
                    Some(&(name, span)) => Some(Condition::from_name(name).ok_or_else(|| {
                        ParseError::UnknownCondition {
                            name: name.to_string(),
                            span,
                        }
                    })?),
                    None => None,
                };
                if args.len() > 1 {
                    no_more(&args[1..])?;
                }
                let truthy = self.parse_block(indent + 1)?;
                let falsy = if self.next_is_else(indent) {
                    let else_line = self.lines[self.pos].clone();
                    self.pos += 1;
                    no_more(&else_line.words()[1..])?;
                    self.parse_block(indent + 1)?
                } else {
                    Vec::new()
                };
                Instruction::Conditional {
                    condition,
                    truthy,
                    falsy,
                }
            }
            "else" => return Err(ParseError::UnexpectedElse { span: keyword_span }),
            other => {
                // Unknown words survive as unsupported blocks for the validator/simulator
                no_more(args)?;
                Instruction::Unsupported {
                    kind: other.to_string(),
                }
            }
        };
        Ok(instruction)
    }

    fn next_is_else(&self, indent: usize) -> bool {
        self.lines.get(self.pos).is_some_and(|line| {
            line.indent == indent && line.words().first().is_some_and(|(word, _)| *word == "else")
        })
    }
}

fn required<'a>(
    keyword: &str,
    keyword_span: Span,
    args: &[(&'a str, Span)],
) -> Result<(&'a str, Span), ParseError> {
    args.first().copied().ok_or_else(|| ParseError::MissingArgument {
        instruction: keyword.to_string(),
        span: keyword_span,
    })
}

fn no_more(args: &[(&str, Span)]) -> Result<(), ParseError> {
    match args.first() {
        Some(&(token, span)) => Err(ParseError::UnexpectedToken {
            token: token.to_string(),
            span,
        }),
        None => Ok(()),
    }
}

/// Split source into indented lines, dropping blanks and `#` comments
fn split_lines(input: &str) -> Result<Vec<Line<'_>>, ParseError> {
    let mut lines = Vec::new();
    let mut space_unit: Option<usize> = None;
    let mut offset = 0;

    for raw in input.split_inclusive('\n') {
        let line_start = offset;
        offset += raw.len();

        let content = raw.split('#').next().unwrap_or("").trim_end();
        let body = content.trim_start_matches([' ', '\t']);
        if body.is_empty() {
            continue;
        }
        let leading = &content[..content.len() - body.len()];
        let leading_span = Span::new(line_start, line_start + leading.len().max(1));

        let tabs = leading.chars().take_while(|&c| c == '\t').count();
        let spaces = leading.len() - tabs;
        if leading[tabs..].contains('\t') {
            return Err(ParseError::InvalidIndentation { span: leading_span });
        }
        let indent = if spaces == 0 {
            tabs
        } else {
            // The first space-indented line fixes the unit for the whole program
            let unit = *space_unit.get_or_insert(if spaces >= 4 { 4 } else { 2 });
            if spaces % unit != 0 {
                return Err(ParseError::InvalidIndentation { span: leading_span });
            }
            tabs + spaces / unit
        };
        if indent > MAX_NESTING {
            return Err(ParseError::NestingTooDeep {
                depth: indent,
                span: leading_span,
            });
        }

        lines.push(Line {
            indent,
            start: line_start + leading.len(),
            text: body,
        });
    }
    Ok(lines)
}

pub fn parse(input: &str) -> Result<Program, ParseError> {
    Parser::new(input)?.parse()
}

/// Print a program in the text syntax, indenting bodies by four spaces
pub fn format_program(program: &[Instruction]) -> String {
    let mut out = String::new();
    write_block(&mut out, program, 0);
    out
}

fn write_block(out: &mut String, block: &[Instruction], depth: usize) {
    for instruction in block {
        let pad = "    ".repeat(depth);
        match instruction {
            Instruction::Move => out.push_str(&format!("{pad}move\n")),
            Instruction::Collect => out.push_str(&format!("{pad}collect\n")),
            Instruction::Turn { direction } => {
                out.push_str(&format!("{pad}turn {}\n", direction.as_str()))
            }
            Instruction::Repeat { times, body } => {
                out.push_str(&format!("{pad}repeat {times}\n"));
                write_block(out, body, depth + 1);
            }
            Instruction::Conditional {
                condition,
                truthy,
                falsy,
            } => {
                match condition {
                    Some(condition) => out.push_str(&format!("{pad}if {}\n", condition.as_str())),
                    None => out.push_str(&format!("{pad}if\n")),
                }
                write_block(out, truthy, depth + 1);
                if !falsy.is_empty() {
                    out.push_str(&format!("{pad}else\n"));
                    write_block(out, falsy, depth + 1);
                }
            }
            Instruction::Unsupported { kind } => out.push_str(&format!("{pad}{kind}\n")),
        }
    }
}
