use super::{Template, TemplateError};
use crate::case::CaseRecord;

/// A piece of a tokenized template.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Segment<'a> {
    Literal(&'a str),
    Placeholder(&'a str),
}

fn is_ident_start(b: u8) -> bool {
    b.is_ascii_alphabetic() || b == b'_'
}

fn is_ident_continue(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_'
}

fn is_identifier(name: &str) -> bool {
    let mut bytes = name.bytes();
    bytes.next().is_some_and(is_ident_start) && bytes.all(is_ident_continue)
}

/// Build a malformed-placeholder error pointing at the `$` at byte offset `pos`.
fn malformed(text: &str, pos: usize, reason: &'static str) -> TemplateError {
    let before = &text[..pos];
    let line = before.matches('\n').count() + 1;
    let column = before
        .rsplit('\n')
        .next()
        .map_or(0, |l| l.chars().count())
        + 1;
    TemplateError::MalformedPlaceholder {
        line,
        column,
        reason,
    }
}

/// Split template text into literals and placeholders, left to right.
///
/// `$$` becomes a literal `$`, `$NAME` and `${NAME}` become placeholders.
/// Any other use of `$`, including one at the very end, is rejected.
pub(crate) fn tokenize(text: &str) -> Result<Vec<Segment<'_>>, TemplateError> {
    let bytes = text.as_bytes();
    let mut segments = Vec::new();
    let mut literal_start = 0;
    let mut i = 0;

    while i < bytes.len() {
        if bytes[i] != b'$' {
            i += 1;
            continue;
        }
        if literal_start < i {
            segments.push(Segment::Literal(&text[literal_start..i]));
        }

        match bytes.get(i + 1) {
            Some(b'$') => {
                segments.push(Segment::Literal(&text[i + 1..i + 2]));
                i += 2;
            }
            Some(b'{') => {
                let start = i + 2;
                let Some(len) = text[start..].find('}') else {
                    return Err(malformed(text, i, "unterminated `${`"));
                };
                let name = &text[start..start + len];
                if !is_identifier(name) {
                    return Err(malformed(text, i, "invalid placeholder name"));
                }
                segments.push(Segment::Placeholder(name));
                i = start + len + 1;
            }
            Some(&b) if is_ident_start(b) => {
                let start = i + 1;
                let len = bytes[start..]
                    .iter()
                    .take_while(|&&b| is_ident_continue(b))
                    .count();
                segments.push(Segment::Placeholder(&text[start..start + len]));
                i = start + len;
            }
            Some(_) => {
                return Err(malformed(
                    text,
                    i,
                    "`$` must be followed by `$`, `{` or a name",
                ));
            }
            None => return Err(malformed(text, i, "trailing `$`")),
        }
        literal_start = i;
    }

    if literal_start < bytes.len() {
        segments.push(Segment::Literal(&text[literal_start..]));
    }
    Ok(segments)
}

/// Render a suite: the preamble verbatim, then `per_case` once per record.
///
/// Substituted values are copied as-is and never scanned again. The first
/// missing key or malformed placeholder aborts the whole render.
pub fn render(
    preamble: &Template,
    per_case: &Template,
    cases: &[CaseRecord],
) -> Result<String, TemplateError> {
    let segments = tokenize(per_case.text())?;

    let capacity = preamble.text().len() + per_case.text().len() * cases.len();
    let mut out = String::with_capacity(capacity);
    out.push_str(preamble.text());

    for (case_index, record) in cases.iter().enumerate() {
        for segment in &segments {
            match *segment {
                Segment::Literal(s) => out.push_str(s),
                Segment::Placeholder(name) => {
                    let value =
                        record
                            .get(name)
                            .ok_or_else(|| TemplateError::UnboundPlaceholder {
                                case_index,
                                name: name.to_string(),
                            })?;
                    out.push_str(value);
                }
            }
        }
    }

    Ok(out)
}
