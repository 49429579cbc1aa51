//! Applying batches of text replacements.

use crate::error::FixError;
use crate::span::Span;

/// Replace `length` bytes at `start` with `text`.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Replacement {
    pub start: usize,
    pub length: usize,
    pub text: String,
}

impl Replacement {
    pub fn new(start: usize, length: usize, text: impl Into<String>) -> Self {
        Replacement {
            start,
            length,
            text: text.into(),
        }
    }

    pub fn replace(span: Span, text: impl Into<String>) -> Self {
        Self::new(span.start, span.len(), text)
    }

    pub fn delete(span: Span) -> Self {
        Self::new(span.start, span.len(), String::new())
    }

    pub fn insert(offset: usize, text: impl Into<String>) -> Self {
        Self::new(offset, 0, text)
    }

    /// Offset just past the replaced bytes, `None` on overflow.
    pub fn end(&self) -> Option<usize> {
        self.start.checked_add(self.length)
    }
}

/// Apply `replacements` to `text`.
///
/// Replacements are applied right to left, ordered by descending end and
/// then descending start, so the offsets of those further left stay valid
/// while the ones to their right are spliced in. Ranges may touch but not
/// overlap; an insertion may sit at either edge of another range.
pub fn apply_replacements(text: &str, replacements: &[Replacement]) -> Result<String, FixError> {
    let mut ordered = Vec::with_capacity(replacements.len());
    for replacement in replacements {
        let end = replacement.end().ok_or(FixError::Overflow {
            start: replacement.start,
            length: replacement.length,
        })?;
        ordered.push((replacement.start, end, replacement));
    }
    ordered.sort_by(|a, b| b.1.cmp(&a.1).then(b.0.cmp(&a.0)));

    let mut out = text.to_string();
    let mut previous: Option<(usize, usize)> = None;
    for (start, end, replacement) in ordered {
        if let Some((other_start, other_end)) = previous {
            if end > other_start && start < other_end {
                return Err(FixError::Overlap {
                    start,
                    end,
                    other_start,
                    other_end,
                });
            }
        }
        previous = Some((start, end));

        if end > text.len() {
            return Err(FixError::OutOfBounds {
                start,
                end,
                len: text.len(),
            });
        }
        if !out.is_char_boundary(start) || !out.is_char_boundary(end) {
            return Err(FixError::NotCharBoundary { start, end });
        }
        out.replace_range(start..end, &replacement.text);
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order_independent() {
        let text = "message foo_bar {}";
        let a = Replacement::new(8, 7, "FooBar");
        let b = Replacement::insert(0, "// x\n");
        let forward = apply_replacements(text, &[a.clone(), b.clone()]).unwrap();
        let backward = apply_replacements(text, &[b, a]).unwrap();
        assert_eq!(forward, "// x\nmessage FooBar {}");
        assert_eq!(forward, backward);
    }

    #[test]
    fn test_out_of_bounds() {
        let err = apply_replacements("abc", &[Replacement::new(2, 5, "")]).unwrap_err();
        assert_eq!(err, FixError::OutOfBounds { start: 2, end: 7, len: 3 });
    }
}
