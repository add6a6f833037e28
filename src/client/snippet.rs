//! HTML snippet generation for a generated result.

use super::response::AltTextResult;

/// Escapes text for use inside HTML element content or a quoted attribute.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Copyable markup: an `<img>` using the alt text as `alt` and `title`, and
/// a visually hidden block holding the long description.
pub fn render_snippet(result: &AltTextResult) -> String {
    let alt = escape_html(&result.alt_text);
    let desc = escape_html(&result.long_desc);
    format!(
        r#"<img
  src="your-image.jpg"
  alt="{alt}"
  title="{alt}"
  aria-describedby="img-description"
/>

<!-- Long description (optional, for complex images) -->
<div id="img-description" class="sr-only">
  {desc}
</div>"#
    )
}
