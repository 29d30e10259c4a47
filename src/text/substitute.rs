use crate::foundation::error::{MemeError, MemeResult, ValueKind};

/// Replace `$N` markers with the N-th entry of `texts` (0-based). `$$` emits a literal `$`.
///
/// `position` only labels the error raised for markers past the end of `texts`.
pub fn substitute(content: &str, texts: &[&str], position: usize) -> MemeResult<String> {
    let mut out = String::with_capacity(content.len());
    let mut chars = content.char_indices().peekable();

    while let Some((_, c)) = chars.next() {
        if c != '$' {
            out.push(c);
            continue;
        }
        match chars.peek() {
            Some((_, '$')) => {
                chars.next();
                out.push('$');
            }
            Some((start, d)) if d.is_ascii_digit() => {
                let start = *start;
                let mut end = start;
                while let Some((i, d)) = chars.peek() {
                    if !d.is_ascii_digit() {
                        break;
                    }
                    end = i + d.len_utf8();
                    chars.next();
                }
                let idx = content[start..end].parse::<usize>().ok();
                let value = idx.and_then(|i| texts.get(i)).ok_or(
                    MemeError::UnmatchedPositionType {
                        position,
                        kind: ValueKind::Text,
                    },
                )?;
                out.push_str(value);
            }
            _ => out.push('$'),
        }
    }
    Ok(out)
}

#[cfg(test)]
#[path = "../../tests/unit/text/substitute.rs"]
mod tests;
