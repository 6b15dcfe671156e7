use std::ops::Range;

use regex::Regex;

use super::MaskingError;

/// One pattern match: the whole matched text and the captured value inside it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Span {
    pub whole: Range<usize>,
    pub value: Range<usize>,
}

/// Collect the spans of every non-overlapping match of `pattern`, left to right.
///
/// Capture group 1 is the value handed to the replacement callback.
pub(crate) fn capture_spans(
    pattern: &Regex,
    text: &str,
    label: &'static str,
) -> Result<Vec<Span>, MaskingError> {
    pattern
        .captures_iter(text)
        .map(|caps| {
            let whole = caps.get(0).ok_or(MaskingError::MissingCapture(label))?;
            let value = caps.get(1).ok_or(MaskingError::MissingCapture(label))?;
            Ok(Span {
                whole: whole.range(),
                value: value.range(),
            })
        })
        .collect()
}

/// Copy `text`, replacing each span's whole match with `replace(value)`.
///
/// Spans must be ordered, non-overlapping, on char boundaries, and each value
/// range must sit inside its whole range. Text outside the spans is copied
/// verbatim.
pub(crate) fn rewrite_spans<I, F>(text: &str, spans: I, mut replace: F) -> Result<String, MaskingError>
where
    I: IntoIterator<Item = Span>,
    F: FnMut(&str) -> Result<String, MaskingError>,
{
    let mut out = String::with_capacity(text.len());
    let mut cursor = 0;

    for span in spans {
        let invalid = || MaskingError::InvalidSpan {
            start: span.whole.start,
            end: span.whole.end,
            len: text.len(),
        };
        if span.whole.start < cursor
            || span.value.start < span.whole.start
            || span.value.end > span.whole.end
        {
            return Err(invalid());
        }
        let gap = text.get(cursor..span.whole.start).ok_or_else(invalid)?;
        let value = text.get(span.value.clone()).ok_or_else(invalid)?;
        if text.get(span.whole.clone()).is_none() {
            return Err(invalid());
        }

        out.push_str(gap);
        out.push_str(&replace(value)?);
        cursor = span.whole.end;
    }

    out.push_str(&text[cursor..]);
    Ok(out)
}
