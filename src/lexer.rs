//! Logical-line preprocessing.
//!
//! Turns a stream of physical lines into logical BEL lines: comments and
//! blanks dropped, backslash continuations merged, double-quoted strings
//! allowed to span physical lines. Each logical line carries the 1-based
//! number of its first physical line.

use tracing::{debug, warn};

/// Logical lines above this length are processed normally but logged, as a
/// hint that the document is probably malformed.
const LONG_LINE_BYTES: usize = 64 * 1024;

/// One product of the lexer. The lexer is pure: it never records warnings
/// itself; an unterminated quote at end of input is reported as an event for
/// the driver to turn into a syntax warning.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LexEvent {
    Line { number: u64, text: String },
    UnterminatedQuote { number: u64, text: String },
}

/// Iterator adapter over physical lines.
pub struct LogicalLines<I> {
    lines: I,
    number: u64,
    start: u64,
    buffer: String,
    done: bool,
}

impl<I> LogicalLines<I>
where
    I: Iterator<Item = String>,
{
    pub fn new(lines: I) -> Self {
        Self {
            lines,
            number: 0,
            start: 0,
            buffer: String::new(),
            done: false,
        }
    }

    fn feed(&mut self, raw: &str) -> Option<LexEvent> {
        let raw = if self.number == 1 {
            raw.strip_prefix('\u{feff}').unwrap_or(raw)
        } else {
            raw
        };
        let trimmed = raw.trim();

        if self.buffer.is_empty() {
            if trimmed.is_empty() {
                return None;
            }
            if let Some(rest) = trimmed.strip_prefix("#:") {
                debug!(line = self.number, comment = rest.trim(), "debug comment");
                return None;
            }
            if trimmed.starts_with('#') {
                return None;
            }
            self.start = self.number;
            self.buffer.push_str(trimmed);
        } else if !trimmed.is_empty() {
            self.buffer.push(' ');
            self.buffer.push_str(trimmed);
        }

        let (in_quote, trailing_backslash) = scan(&self.buffer);
        if in_quote {
            return None;
        }
        if trailing_backslash {
            self.buffer.pop();
            let trimmed_len = self.buffer.trim_end().len();
            self.buffer.truncate(trimmed_len);
            return None;
        }
        Some(self.emit())
    }

    fn emit(&mut self) -> LexEvent {
        let text = std::mem::take(&mut self.buffer);
        if text.len() > LONG_LINE_BYTES {
            warn!(line = self.start, bytes = text.len(), "unusually long logical line");
        }
        LexEvent::Line {
            number: self.start,
            text,
        }
    }

    fn flush(&mut self) -> Option<LexEvent> {
        if self.done {
            return None;
        }
        self.done = true;
        if self.buffer.is_empty() {
            return None;
        }
        let text = std::mem::take(&mut self.buffer);
        let (in_quote, _) = scan(&text);
        if in_quote {
            Some(LexEvent::UnterminatedQuote {
                number: self.start,
                text,
            })
        } else {
            // A dangling continuation at end of input still yields its text.
            Some(LexEvent::Line {
                number: self.start,
                text,
            })
        }
    }
}

impl<I> Iterator for LogicalLines<I>
where
    I: Iterator<Item = String>,
{
    type Item = LexEvent;

    fn next(&mut self) -> Option<LexEvent> {
        if self.done {
            return None;
        }
        loop {
            match self.lines.next() {
                Some(raw) => {
                    self.number += 1;
                    if let Some(event) = self.feed(&raw) {
                        return Some(event);
                    }
                }
                None => return self.flush(),
            }
        }
    }
}

/// Track quote and escape state across the accumulated buffer. Returns
/// whether a double quote is open and whether the buffer ends in an
/// unescaped backslash.
fn scan(text: &str) -> (bool, bool) {
    let mut in_quote = false;
    let mut escaped = false;
    let mut trailing_backslash = false;
    for c in text.chars() {
        trailing_backslash = false;
        if escaped {
            escaped = false;
            continue;
        }
        match c {
            '\\' => {
                escaped = true;
                trailing_backslash = true;
            }
            '"' => in_quote = !in_quote,
            _ => {}
        }
    }
    (in_quote, trailing_backslash)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lex(text: &str) -> Vec<LexEvent> {
        LogicalLines::new(text.lines().map(str::to_string)).collect()
    }

    fn lines(text: &str) -> Vec<(u64, String)> {
        lex(text)
            .into_iter()
            .map(|event| match event {
                LexEvent::Line { number, text } => (number, text),
                LexEvent::UnterminatedQuote { .. } => panic!("unexpected unterminated quote"),
            })
            .collect()
    }

    #[test]
    fn blanks_and_comments_are_dropped() {
        let out = lines("# header\n\np(HGNC:A)\n#: trace me\np(HGNC:B)\n");
        assert_eq!(
            out,
            vec![(3, "p(HGNC:A)".to_string()), (5, "p(HGNC:B)".to_string())]
        );
    }

    #[test]
    fn numbering_tracks_the_first_physical_line() {
        let out = lines("SET DOCUMENT Name = \"x\"\np(HGNC:A) -> \\\n  p(HGNC:B)\np(HGNC:C)\n");
        assert_eq!(
            out,
            vec![
                (1, "SET DOCUMENT Name = \"x\"".to_string()),
                (2, "p(HGNC:A) -> p(HGNC:B)".to_string()),
                (4, "p(HGNC:C)".to_string()),
            ]
        );
    }

    #[test]
    fn continuation_collapses_whitespace_to_one_space() {
        let out = lines("p(HGNC:A) ->   \\\n     p(HGNC:B)");
        assert_eq!(out, vec![(1, "p(HGNC:A) -> p(HGNC:B)".to_string())]);
    }

    #[test]
    fn quoted_strings_span_physical_lines() {
        let out = lines("SET Evidence = \"first part\nsecond part\"\np(HGNC:A)");
        assert_eq!(
            out,
            vec![
                (1, "SET Evidence = \"first part second part\"".to_string()),
                (3, "p(HGNC:A)".to_string()),
            ]
        );
    }

    #[test]
    fn escaped_quotes_do_not_open_a_span() {
        let out = lines("SET Evidence = \"a \\\"quoted\\\" word\"");
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].0, 1);
    }

    #[test]
    fn unterminated_quote_at_eof_is_reported() {
        let events = lex("p(HGNC:A)\nSET Evidence = \"never closed");
        assert_eq!(events.len(), 2);
        assert!(matches!(
            &events[1],
            LexEvent::UnterminatedQuote { number: 2, .. }
        ));
    }

    #[test]
    fn a_bom_on_the_first_line_is_stripped() {
        let out = lines("\u{feff}SET DOCUMENT Name = \"x\"");
        assert_eq!(out[0].1, "SET DOCUMENT Name = \"x\"");
    }
}
