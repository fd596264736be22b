//! Parser for `key=value` language resource files

use crate::application::errors::TranslateError;

/// Parse a resource file into ordered `(key, value)` records.
///
/// Blank lines and lines starting with `#` or `!` are skipped. The key ends
/// at the first unescaped `=`, `:` or whitespace; whitespace around the
/// separator is dropped and a key on its own has an empty value. A line
/// ending in an unescaped backslash continues on the next one.
pub fn parse_properties(file: &str, content: &str) -> Result<Vec<(String, String)>, TranslateError> {
    let mut records = Vec::new();
    let mut lines = content.lines().enumerate();

    while let Some((index, line)) = lines.next() {
        let line_no = index + 1;
        let trimmed = line.trim_start();
        if trimmed.is_empty() || trimmed.starts_with('#') || trimmed.starts_with('!') {
            continue;
        }

        let mut logical = trimmed.to_string();
        while ends_with_continuation(&logical) {
            logical.pop();
            match lines.next() {
                Some((_, next)) => logical.push_str(next.trim_start()),
                None => break,
            }
        }

        let (raw_key, raw_value) = split_record(&logical);
        let key = unescape(raw_key, file, line_no)?;
        let value = unescape(raw_value, file, line_no)?;
        records.push((key, value));
    }

    Ok(records)
}

fn parse_error(file: &str, line: usize, reason: impl Into<String>) -> TranslateError {
    TranslateError::Parse {
        file: file.to_string(),
        line,
        reason: reason.into(),
    }
}

fn ends_with_continuation(line: &str) -> bool {
    line.chars().rev().take_while(|c| *c == '\\').count() % 2 == 1
}

/// Split a logical line into raw key and raw value
fn split_record(line: &str) -> (&str, &str) {
    let mut escaped = false;
    let mut key_end = line.len();
    for (i, c) in line.char_indices() {
        match c {
            _ if escaped => escaped = false,
            '\\' => escaped = true,
            '=' | ':' => {
                key_end = i;
                break;
            }
            c if c.is_whitespace() => {
                key_end = i;
                break;
            }
            _ => {}
        }
    }

    let rest = line[key_end..].trim_start();
    let rest = match rest.chars().next() {
        Some('=') | Some(':') => rest[1..].trim_start(),
        _ => rest,
    };
    (&line[..key_end], rest)
}

fn unescape(raw: &str, file: &str, line: usize) -> Result<String, TranslateError> {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();

    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('r') => out.push('\r'),
            Some('u') => {
                let hex: String = chars.by_ref().take(4).collect();
                let decoded = (hex.len() == 4)
                    .then(|| u32::from_str_radix(&hex, 16).ok())
                    .flatten()
                    .and_then(char::from_u32)
                    .ok_or_else(|| parse_error(file, line, format!("malformed \\u escape '\\u{}'", hex)))?;
                out.push(decoded);
            }
            Some(other) => out.push(other),
            None => {}
        }
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_records_in_order() {
        let content = "# greeting\nhi = Hello %s\n\n! other comment\nbye:Goodbye\nhi=Hey %s\n";
        let records = parse_properties("en.properties", content).unwrap();

        assert_eq!(
            records,
            vec![
                ("hi".to_string(), "Hello %s".to_string()),
                ("bye".to_string(), "Goodbye".to_string()),
                ("hi".to_string(), "Hey %s".to_string()),
            ]
        );
    }

    #[test]
    fn handles_escapes_and_continuations() {
        let content = "a\\=b = x\\ty\nlong = first \\\n    second\nacc = caf\\u00e9\nurl = https://example.com\n";
        let records = parse_properties("en.properties", content).unwrap();

        assert_eq!(records[0], ("a=b".to_string(), "x\ty".to_string()));
        assert_eq!(records[1], ("long".to_string(), "first second".to_string()));
        assert_eq!(records[2], ("acc".to_string(), "café".to_string()));
        assert_eq!(records[3], ("url".to_string(), "https://example.com".to_string()));
    }

    #[test]
    fn empty_value_is_allowed() {
        let records = parse_properties("en.properties", "empty=\n").unwrap();
        assert_eq!(records, vec![("empty".to_string(), String::new())]);
    }

    #[test]
    fn whitespace_separates_key_and_value() {
        let content = "greeting Hello %s\nspaced   =   value\ncolon : x = y\nbye=Goodbye\n";
        let records = parse_properties("en.properties", content).unwrap();

        assert_eq!(
            records,
            vec![
                ("greeting".to_string(), "Hello %s".to_string()),
                ("spaced".to_string(), "value".to_string()),
                ("colon".to_string(), "x = y".to_string()),
                ("bye".to_string(), "Goodbye".to_string()),
            ]
        );
    }

    #[test]
    fn key_without_value_is_empty() {
        let records = parse_properties("en.properties", "lonely\nescaped\\ key\n").unwrap();
        assert_eq!(
            records,
            vec![
                ("lonely".to_string(), String::new()),
                ("escaped key".to_string(), String::new()),
            ]
        );
    }

    #[test]
    fn error_reports_the_line() {
        let err = parse_properties("fr.properties", "ok=1\nbad=\\u00zz\n").unwrap_err();
        assert!(matches!(err, TranslateError::Parse { line: 2, .. }));
    }

    #[test]
    fn malformed_unicode_escape_is_an_error() {
        assert!(parse_properties("fr.properties", "bad=\\u12\n").is_err());
        assert!(parse_properties("fr.properties", "bad=\\uZZZZ\n").is_err());
    }
}
