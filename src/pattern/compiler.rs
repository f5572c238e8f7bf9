//! Template compilation.
//!
//! Templates are tokenized left to right: `$` introduces a variable, `(...)`
//! is an alternation when it contains only literal text and an optional group
//! when it contains a variable, and `[...]` is always an optional group. All
//! other text is literal.

use smol_str::SmolStr;

use super::{Pattern, Segment};
use crate::error::{DsnError, DsnResult};

pub(super) fn compile(template: &str) -> DsnResult<Pattern> {
    let mut pos = 0;
    let segments = compile_seq(template, &mut pos, None)?;
    check_adjacent_variables(template, &segments)?;

    // A leading literal such as `ftp://` fixes the scheme at compile time;
    // alternation schemes are resolved per match instead.
    let scheme_hint = match segments.first() {
        Some(Segment::Literal(text)) => text
            .split_once("://")
            .map(|(scheme, _)| SmolStr::new(scheme))
            .filter(|scheme| !scheme.is_empty()),
        _ => None,
    };

    Ok(Pattern {
        template: template.to_string(),
        segments,
        scheme_hint,
    })
}

/// Compile one segment sequence, stopping after `closing` when inside a group.
fn compile_seq(template: &str, pos: &mut usize, closing: Option<u8>) -> DsnResult<Vec<Segment>> {
    let bytes = template.as_bytes();
    let mut segments = Vec::new();
    let mut lit_start = *pos;

    while *pos < bytes.len() {
        let b = bytes[*pos];

        if Some(b) == closing {
            flush_literal(template, lit_start, *pos, &mut segments);
            *pos += 1;
            return Ok(segments);
        }

        match b {
            b'$' => {
                flush_literal(template, lit_start, *pos, &mut segments);
                let sigil = *pos;
                *pos += 1;
                let ident_start = *pos;
                while *pos < bytes.len()
                    && (bytes[*pos].is_ascii_alphanumeric() || bytes[*pos] == b'_')
                {
                    *pos += 1;
                }
                if *pos == ident_start {
                    return Err(DsnError::syntax(
                        template,
                        sigil,
                        1,
                        "expected identifier after `$`",
                    ));
                }
                segments.push(Segment::Variable(SmolStr::new(
                    &template[ident_start..*pos],
                )));
                lit_start = *pos;
            }
            b'(' => {
                let open = *pos;
                let end = find_group_end(bytes, open, b'(', b')').ok_or_else(|| {
                    DsnError::syntax(template, open, 1, "unterminated `(` group")
                })?;
                let inner = &template[open + 1..end];
                if inner.is_empty() {
                    return Err(DsnError::syntax(template, open, 2, "empty group"));
                }

                if inner.contains('$') {
                    // A parenthesized region around variables is an optional
                    // group, same as `[...]`.
                    flush_literal(template, lit_start, open, &mut segments);
                    *pos = open + 1;
                    let inner_segments = compile_seq(template, pos, Some(b')'))?;
                    segments.push(Segment::Optional(inner_segments));
                } else if inner.contains('|') {
                    flush_literal(template, lit_start, open, &mut segments);
                    let mut options = Vec::new();
                    for option in inner.split('|') {
                        if option.is_empty() {
                            return Err(DsnError::syntax(
                                template,
                                open,
                                end - open + 1,
                                "empty alternation option",
                            ));
                        }
                        options.push(SmolStr::new(option));
                    }
                    segments.push(Segment::Alternation(options));
                    *pos = end + 1;
                } else {
                    // Suffix alternation: `http(s)` means `https` or `http`.
                    // The pending literal run is folded into the options,
                    // longest first.
                    let run = &template[lit_start..open];
                    segments.push(Segment::Alternation(vec![
                        SmolStr::new(format!("{run}{inner}")),
                        SmolStr::new(run),
                    ]));
                    *pos = end + 1;
                }
                lit_start = *pos;
            }
            b'[' => {
                let open = *pos;
                if find_group_end(bytes, open, b'[', b']').is_none() {
                    return Err(DsnError::syntax(
                        template,
                        open,
                        1,
                        "unterminated `[` group",
                    ));
                }
                flush_literal(template, lit_start, open, &mut segments);
                *pos = open + 1;
                let inner_segments = compile_seq(template, pos, Some(b']'))?;
                if inner_segments.is_empty() {
                    return Err(DsnError::syntax(template, open, 2, "empty optional group"));
                }
                segments.push(Segment::Optional(inner_segments));
                lit_start = *pos;
            }
            b')' | b']' => {
                return Err(DsnError::syntax(
                    template,
                    *pos,
                    1,
                    "unmatched closing delimiter",
                ));
            }
            _ => *pos += 1,
        }
    }

    if closing.is_some() {
        return Err(DsnError::syntax(
            template,
            template.len().saturating_sub(1),
            1,
            "unterminated group",
        ));
    }

    flush_literal(template, lit_start, *pos, &mut segments);
    Ok(segments)
}

fn flush_literal(template: &str, start: usize, end: usize, segments: &mut Vec<Segment>) {
    if start < end {
        segments.push(Segment::Literal(SmolStr::new(&template[start..end])));
    }
}

/// Find the matching close delimiter, honoring same-kind nesting.
fn find_group_end(bytes: &[u8], open: usize, oc: u8, cc: u8) -> Option<usize> {
    let mut depth = 0usize;
    for (i, &b) in bytes.iter().enumerate().skip(open) {
        if b == oc {
            depth += 1;
        } else if b == cc {
            depth -= 1;
            if depth == 0 {
                return Some(i);
            }
        }
    }
    None
}

/// Two variables with no literal between them have no detectable boundary, so
/// the template is rejected. Adjacency through an optional-group edge is just
/// as ambiguous and is rejected too.
fn check_adjacent_variables(template: &str, segments: &[Segment]) -> DsnResult<()> {
    for pair in segments.windows(2) {
        if let (Some(first), Some(second)) = (trailing_variable(&pair[0]), leading_variable(&pair[1]))
        {
            return Err(DsnError::syntax(
                template,
                0,
                template.len(),
                format!("variables `${first}` and `${second}` have no delimiter between them"),
            ));
        }
    }
    for segment in segments {
        if let Segment::Optional(inner) = segment {
            check_adjacent_variables(template, inner)?;
        }
    }
    Ok(())
}

fn leading_variable(segment: &Segment) -> Option<&str> {
    match segment {
        Segment::Variable(name) => Some(name),
        Segment::Optional(inner) => inner.first().and_then(leading_variable),
        _ => None,
    }
}

fn trailing_variable(segment: &Segment) -> Option<&str> {
    match segment {
        Segment::Variable(name) => Some(name),
        Segment::Optional(inner) => inner.last().and_then(trailing_variable),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn lit(text: &str) -> Segment {
        Segment::Literal(SmolStr::new(text))
    }

    fn var(name: &str) -> Segment {
        Segment::Variable(SmolStr::new(name))
    }

    fn alt(options: &[&str]) -> Segment {
        Segment::Alternation(options.iter().map(|o| SmolStr::new(o)).collect())
    }

    // ==================== Literal and Variable Tests ====================

    #[test]
    fn test_compile_literals_and_variables() {
        let pattern = Pattern::compile("ftp://$Username:$Password@$Host:$Port/$BasePath").unwrap();
        assert_eq!(
            pattern.segments(),
            &[
                lit("ftp://"),
                var("Username"),
                lit(":"),
                var("Password"),
                lit("@"),
                var("Host"),
                lit(":"),
                var("Port"),
                lit("/"),
                var("BasePath"),
            ]
        );
    }

    #[test]
    fn test_compile_bare_variable() {
        let pattern = Pattern::compile("$Port").unwrap();
        assert_eq!(pattern.segments(), &[var("Port")]);
    }

    #[test]
    fn test_compile_trailing_literal() {
        let pattern = Pattern::compile("$Host/end").unwrap();
        assert_eq!(pattern.segments(), &[var("Host"), lit("/end")]);
    }

    #[test]
    fn test_identifier_stops_at_non_word_character() {
        let pattern = Pattern::compile("$Host:$Port").unwrap();
        assert_eq!(pattern.segments(), &[var("Host"), lit(":"), var("Port")]);
    }

    // ==================== Alternation Tests ====================

    #[test]
    fn test_compile_suffix_alternation() {
        let pattern = Pattern::compile("http(s)://$Path").unwrap();
        assert_eq!(
            pattern.segments(),
            &[alt(&["https", "http"]), lit("://"), var("Path")]
        );
    }

    #[test]
    fn test_compile_explicit_alternation() {
        let pattern = Pattern::compile("(http|https)://$Path").unwrap();
        assert_eq!(
            pattern.segments(),
            &[alt(&["http", "https"]), lit("://"), var("Path")]
        );
    }

    #[test]
    fn test_suffix_alternation_consumes_pending_literal_only() {
        // The run since the previous segment is folded in, nothing earlier.
        let pattern = Pattern::compile("$X/ws(s)://$Y").unwrap();
        assert_eq!(
            pattern.segments(),
            &[var("X"), alt(&["/wss", "/ws"]), lit("://"), var("Y")]
        );
    }

    // ==================== Optional Group Tests ====================

    #[test]
    fn test_compile_bracket_optional_group() {
        let pattern = Pattern::compile("$Host[:$Port]/$Db").unwrap();
        assert_eq!(
            pattern.segments(),
            &[
                var("Host"),
                Segment::Optional(vec![lit(":"), var("Port")]),
                lit("/"),
                var("Db"),
            ]
        );
    }

    #[test]
    fn test_compile_paren_optional_group() {
        let pattern = Pattern::compile("$Host(:$Port)/$Db").unwrap();
        assert_eq!(
            pattern.segments(),
            &[
                var("Host"),
                Segment::Optional(vec![lit(":"), var("Port")]),
                lit("/"),
                var("Db"),
            ]
        );
    }

    #[test]
    fn test_compile_nested_optional_group() {
        let pattern = Pattern::compile("$Host[:$Port[/$Db]]").unwrap();
        assert_eq!(
            pattern.segments(),
            &[
                var("Host"),
                Segment::Optional(vec![
                    lit(":"),
                    var("Port"),
                    Segment::Optional(vec![lit("/"), var("Db")]),
                ]),
            ]
        );
    }

    // ==================== Scheme Hint Tests ====================

    #[test]
    fn test_scheme_hint_from_leading_literal() {
        let pattern = Pattern::compile("ftp://$Host").unwrap();
        assert_eq!(pattern.scheme_hint(), Some("ftp"));
    }

    #[test]
    fn test_no_scheme_hint_for_alternation() {
        let pattern = Pattern::compile("http(s)://$Path").unwrap();
        assert_eq!(pattern.scheme_hint(), None);
    }

    #[test]
    fn test_no_scheme_hint_without_separator() {
        let pattern = Pattern::compile("$Host:$Port").unwrap();
        assert_eq!(pattern.scheme_hint(), None);
    }

    // ==================== Syntax Error Tests ====================

    #[test]
    fn test_adjacent_variables_rejected() {
        let err = Pattern::compile("$A$B").unwrap_err();
        assert!(err.is_syntax());
        assert!(err.to_string().contains("$A"));
        assert!(err.to_string().contains("$B"));
    }

    #[test]
    fn test_adjacent_variables_across_optional_rejected() {
        assert!(Pattern::compile("$Host[$Port]").unwrap_err().is_syntax());
        assert!(Pattern::compile("[$User]$Host").unwrap_err().is_syntax());
    }

    #[test]
    fn test_adjacent_variables_inside_optional_rejected() {
        assert!(Pattern::compile("x[$A$B]y").unwrap_err().is_syntax());
    }

    #[test]
    fn test_dangling_sigil_rejected() {
        assert!(Pattern::compile("ftp://$").unwrap_err().is_syntax());
        assert!(Pattern::compile("$:x").unwrap_err().is_syntax());
    }

    #[test]
    fn test_unterminated_groups_rejected() {
        assert!(Pattern::compile("http(s://$Path").unwrap_err().is_syntax());
        assert!(Pattern::compile("$Host[:$Port").unwrap_err().is_syntax());
    }

    #[test]
    fn test_unmatched_closing_rejected() {
        assert!(Pattern::compile("$Host]:x").unwrap_err().is_syntax());
        assert!(Pattern::compile("$Host):x").unwrap_err().is_syntax());
    }

    #[test]
    fn test_empty_groups_rejected() {
        assert!(Pattern::compile("a()b").unwrap_err().is_syntax());
        assert!(Pattern::compile("a[]b").unwrap_err().is_syntax());
        assert!(Pattern::compile("(a|)://x").unwrap_err().is_syntax());
    }
}
