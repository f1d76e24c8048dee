use crate::obis::ObisRef;

/// One classified line of telegram text.
#[derive(Debug, Clone, PartialEq)]
pub enum RawLine<'a> {
    /// The `/XXXZ...` identification header.
    Ident(&'a str),
    /// An OBIS data line with the contents of its `(...)` value groups.
    Object {
        reference: ObisRef,
        values: Vec<&'a str>,
    },
    /// The `!` terminator. Carries the text after the `!`, if any.
    Checksum(&'a str),
    /// A line that fits none of the telegram forms.
    Malformed(&'a str),
}

/// Splits raw telegram text into classified lines.
///
/// Blank lines are skipped, a line starting with `(` continues the value
/// groups of the preceding data line (used by the older profile generic gas
/// records), and everything after the `!` line lies outside the telegram
/// and is dropped.
pub fn tokenize(raw: &str) -> Vec<RawLine<'_>> {
    let mut lines = Vec::new();
    for line in raw.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if let Some(trailer) = line.strip_prefix('!') {
            lines.push(RawLine::Checksum(trailer));
            break;
        }
        if line.starts_with('/') {
            lines.push(RawLine::Ident(line));
            continue;
        }
        if line.starts_with('(') {
            // continuation of the previous data line
            match lines.last_mut() {
                Some(RawLine::Object { values, .. }) => match value_groups(line) {
                    Some(more) => values.extend(more),
                    None => lines.push(RawLine::Malformed(line)),
                },
                _ => lines.push(RawLine::Malformed(line)),
            }
            continue;
        }
        lines.push(object_line(line));
    }
    lines
}

fn object_line(line: &str) -> RawLine<'_> {
    let paren = match line.find('(') {
        Some(position) => position,
        None => return RawLine::Malformed(line),
    };
    let reference = match line[..paren].parse::<ObisRef>() {
        Ok(reference) => reference,
        Err(_) => return RawLine::Malformed(line),
    };
    match value_groups(&line[paren..]) {
        Some(values) => RawLine::Object { reference, values },
        None => RawLine::Malformed(line),
    }
}

/// Splits `(a)(b)(c)` into its group contents. None when the parentheses
/// are unbalanced, nested, or anything sits between the groups.
fn value_groups(text: &str) -> Option<Vec<&str>> {
    let mut values = Vec::new();
    let mut rest = text;
    while !rest.is_empty() {
        rest = rest.strip_prefix('(')?;
        let close = rest.find(')')?;
        let value = &rest[..close];
        if value.contains('(') {
            return None;
        }
        values.push(value);
        rest = &rest[close + 1..];
    }
    Some(values)
}
