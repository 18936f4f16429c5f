//! Message rendering: the renderer seam, fence balancing, typewriter reveal.

pub mod html;
pub mod typewriter;

use std::borrow::Cow;

/// Marker for one fenced code block delimiter.
const FENCE: &str = "```";

/// Converts message text into the host's display representation.
///
/// `as_markdown` selects Markdown parsing; plain content still goes through
/// whatever safety pass the implementation applies. Implementations must be
/// cheap enough to call on every typewriter tick.
pub trait Renderer: Send + Sync {
    type Output: Send;

    fn render(&self, text: &str, as_markdown: bool) -> Self::Output;
}

/// Balance fenced-code-block delimiters in a partial Markdown string.
///
/// Counts triple-backtick markers; an odd count means an in-progress code
/// block would swallow the rest of the document into one literal block, so a
/// synthetic closing fence is appended. Only fence markers are balanced;
/// emphasis and lists are knowingly left as-is.
pub fn close_open_fences(text: &str) -> Cow<'_, str> {
    if text.matches(FENCE).count() % 2 == 1 {
        Cow::Owned(format!("{text}\n{FENCE}"))
    } else {
        Cow::Borrowed(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fence_count(text: &str) -> usize {
        text.matches(FENCE).count()
    }

    #[test]
    fn test_open_fence_is_closed() {
        let balanced = close_open_fences("```python\ncode");
        assert_eq!(fence_count(&balanced) % 2, 0);
        assert!(balanced.starts_with("```python\ncode"));
        assert!(balanced.ends_with("```"));
    }

    #[test]
    fn test_balanced_input_unchanged() {
        let input = "```a```b";
        assert!(matches!(close_open_fences(input), Cow::Borrowed(s) if s == input));
    }

    #[test]
    fn test_no_fences_unchanged() {
        let input = "plain *markdown* text";
        assert!(matches!(close_open_fences(input), Cow::Borrowed(s) if s == input));
    }

    #[test]
    fn test_three_fences_closed_to_four() {
        let balanced = close_open_fences("```a\n```\n```rust\nfn main() {}");
        assert_eq!(fence_count(&balanced), 4);
    }
}
