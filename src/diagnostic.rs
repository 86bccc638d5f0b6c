/// Diagnostic reporting using ariadne for program and data file errors
use crate::parser::ParseError;
use crate::span::Span;
use ariadne::{Color, Label, Report, ReportKind, Source};

fn render<'a>(
    source_name: &'a str,
    source: &str,
    report: Report<'_, (&'a str, std::ops::Range<usize>)>,
) -> String {
    let mut output = Vec::new();
    if report
        .write((source_name, Source::from(source)), &mut output)
        .is_err()
    {
        return String::new();
    }
    String::from_utf8_lossy(&output).into_owned()
}

/// Render a text-syntax parse error against its source
pub fn report_parse_error(source_name: &str, source: &str, error: &ParseError) -> String {
    let span = error.span();
    let label = |message: String| {
        Label::new((source_name, span.range()))
            .with_message(message)
            .with_color(Color::Red)
    };

    let report = Report::build(ReportKind::Error, source_name, span.start)
        .with_message(error.to_string());
    let report = match error {
        ParseError::InvalidIndentation { .. } => report
            .with_label(label("this indentation is not valid".to_string()))
            .with_note("Indent each body one level (a tab, or a consistent 2 or 4 spaces)"),
        ParseError::MissingArgument { instruction, .. } => report
            .with_label(label(format!("`{instruction}` needs an argument")))
            .with_help(match instruction.as_str() {
                "turn" => "Write `turn left` or `turn right`",
                "repeat" => "Write the number of repetitions, e.g. `repeat 3`",
                _ => "Add the missing argument",
            }),
        ParseError::UnexpectedToken { .. } => report
            .with_label(label("nothing else is allowed on this line".to_string()))
            .with_help("Put each instruction on its own line"),
        ParseError::InvalidRepeatCount { value, .. } => report
            .with_label(label(format!("`{value}` is not a whole number")))
            .with_help("Repeat counts are non-negative integers"),
        ParseError::InvalidDirection { value, .. } => report
            .with_label(label(format!("cannot turn `{value}`")))
            .with_help("Write `turn left` or `turn right`"),
        ParseError::UnknownCondition { name, .. } => report
            .with_label(label(format!("`{name}` is not a condition")))
            .with_note("Known conditions: tile-ahead-walkable, collectibles-remaining"),
        ParseError::UnexpectedElse { .. } => report
            .with_label(label("this `else` has no `if` above it".to_string()))
            .with_help("Align `else` with its `if`"),
        ParseError::NestingTooDeep { .. } => report
            .with_label(label("this line is nested too deeply".to_string()))
            .with_help("Flatten the program, e.g. by combining repeats"),
    };

    render(source_name, source, report.finish())
}

/// Render a JSON syntax or shape error from a program or catalog file
pub fn report_json_error(source_name: &str, source: &str, error: &serde_json::Error) -> String {
    let span = if source.is_empty() {
        Span::new(0, 0)
    } else {
        Span::from_line_col(source, error.line(), error.column())
    };

    let report = Report::build(ReportKind::Error, source_name, span.start)
        .with_message("Invalid JSON")
        .with_label(
            Label::new((source_name, span.range()))
                .with_message(error.to_string())
                .with_color(Color::Red),
        )
        .finish();

    render(source_name, source, report)
}

/// Combined error reporting for any program loading error
pub fn report_program_error(source_name: &str, source: &str, error: &crate::ProgramError) -> String {
    match error {
        crate::ProgramError::Parse(e) => report_parse_error(source_name, source, e),
        crate::ProgramError::Json(e) => report_json_error(source_name, source, e),
    }
}
