//! Minimal CSV reader for sheet exports.
//!
//! Single left-to-right scan with one character of lookahead:
//! - outside quotes, `,` ends a field and `\r`, `\n` or `\r\n` ends a row
//! - `"` enters quoted mode, where `""` is a literal quote and a lone `"` leaves it
//! - blank lines produce no row; rows may have any number of fields
//!
//! Column positions matter downstream, so empty fields are kept as `""`.

/// Parse raw delimited text into rows of fields
pub fn parse(text: &str) -> Vec<Vec<String>> {
    let mut rows = Vec::new();
    let mut row: Vec<String> = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        if in_quotes {
            match c {
                '"' if chars.peek() == Some(&'"') => {
                    field.push('"');
                    chars.next();
                }
                '"' => in_quotes = false,
                _ => field.push(c),
            }
            continue;
        }

        match c {
            '"' => in_quotes = true,
            ',' => row.push(std::mem::take(&mut field)),
            '\r' | '\n' => {
                if !field.is_empty() || !row.is_empty() {
                    row.push(std::mem::take(&mut field));
                    rows.push(std::mem::take(&mut row));
                }
                if c == '\r' && chars.peek() == Some(&'\n') {
                    chars.next();
                }
            }
            _ => field.push(c),
        }
    }

    // No trailing newline required
    if !field.is_empty() || !row.is_empty() {
        row.push(field);
        rows.push(row);
    }

    rows
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rows(input: &[&[&str]]) -> Vec<Vec<String>> {
        input
            .iter()
            .map(|r| r.iter().map(|f| f.to_string()).collect())
            .collect()
    }

    #[test]
    fn test_simple_rows() {
        assert_eq!(parse("a,b,c\n1,2,3\n"), rows(&[&["a", "b", "c"], &["1", "2", "3"]]));
    }

    #[test]
    fn test_missing_trailing_newline_flushes_last_row() {
        assert_eq!(parse("a,b\nc,d"), rows(&[&["a", "b"], &["c", "d"]]));
    }

    #[test]
    fn test_crlf_and_lone_cr() {
        assert_eq!(parse("a,b\r\nc\rd\n"), rows(&[&["a", "b"], &["c"], &["d"]]));
    }

    #[test]
    fn test_blank_lines_are_skipped() {
        assert_eq!(parse("a\n\n\r\n\nb\n"), rows(&[&["a"], &["b"]]));
        assert!(parse("").is_empty());
        assert!(parse("\n\r\n").is_empty());
    }

    #[test]
    fn test_quoted_fields() {
        let parsed = parse("\"Doe, John\",\"say \"\"hi\"\"\",\"line\nbreak\"\n");
        assert_eq!(parsed, rows(&[&["Doe, John", "say \"hi\"", "line\nbreak"]]));
    }

    #[test]
    fn test_empty_fields_keep_positions() {
        assert_eq!(parse("a,,c,\n"), rows(&[&["a", "", "c", ""]]));
        assert_eq!(parse(",\n"), rows(&[&["", ""]]));
    }

    #[test]
    fn test_ragged_rows() {
        let parsed = parse("h1,h2,h3\nonly\nx,y\n");
        assert_eq!(parsed.len(), 3);
        assert_eq!(parsed[1].len(), 1);
        assert_eq!(parsed[2].len(), 2);
    }

    #[test]
    fn test_quote_mid_field_toggles_mode() {
        assert_eq!(parse("ab\"c,d\"e\n"), rows(&[&["abc,de"]]));
    }

    #[test]
    fn test_unterminated_quote_runs_to_end() {
        assert_eq!(parse("\"open,field\nmore"), rows(&[&["open,field\nmore"]]));
    }
}
