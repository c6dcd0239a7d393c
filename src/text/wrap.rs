/// Anything that can report the rendered width of a string at a fixed font and size.
pub trait Measure {
    fn width(&mut self, text: &str) -> f32;
}

impl<F> Measure for F
where
    F: FnMut(&str) -> f32,
{
    fn width(&mut self, text: &str) -> f32 {
        self(text)
    }
}

/// Break `text` into lines no wider than `max_width`.
///
/// Explicit newlines always break. Each paragraph is then filled one character at a time, so
/// word boundaries are not honored. A character that is wider than `max_width` on its own stays
/// on its own line and overflows. Blank paragraphs are kept as empty lines, and the result is
/// never empty.
pub fn wrap<M>(text: &str, max_width: f32, measure: &mut M) -> Vec<String>
where
    M: Measure + ?Sized,
{
    let mut lines = Vec::new();

    for paragraph in text.lines() {
        if paragraph.trim().is_empty() {
            lines.push(String::new());
            continue;
        }

        let mut current = String::new();
        for ch in paragraph.chars() {
            let mut candidate = current.clone();
            candidate.push(ch);

            if measure.width(&candidate) > max_width && !current.is_empty() {
                lines.push(std::mem::take(&mut current));
                current.push(ch);
            } else {
                current = candidate;
            }
        }

        if !current.is_empty() {
            lines.push(current);
        }
    }

    if lines.is_empty() {
        lines.push(String::new());
    }
    lines
}

#[cfg(test)]
#[path = "../../tests/unit/text/wrap.rs"]
mod tests;
