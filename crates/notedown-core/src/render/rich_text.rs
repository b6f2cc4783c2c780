//! Rich text to inline Markdown

use crate::api::RichText;

/// Render a run of rich text spans to inline Markdown
///
/// Annotations wrap each span independently, innermost to outermost:
/// bold, italic, code, strikethrough, underline, then the link. Adjacent
/// spans are concatenated with no separator.
pub fn render_rich_text(spans: &[RichText]) -> String {
    let mut out = String::new();

    for span in spans {
        let mut text = span.plain_text.clone();
        let ann = &span.annotations;

        if ann.bold {
            text = format!("**{}**", text);
        }
        if ann.italic {
            text = format!("*{}*", text);
        }
        if ann.code {
            text = format!("`{}`", text);
        }
        if ann.strikethrough {
            text = format!("~~{}~~", text);
        }
        if ann.underline {
            text = format!("<u>{}</u>", text);
        }
        if let Some(href) = &span.href {
            text = format!("[{}]({})", text, href);
        }

        out.push_str(&text);
    }

    out
}

/// Concatenate the raw text of spans, ignoring all annotations
///
/// Used for code block bodies and image alt text, where Markdown markers
/// would corrupt the output.
pub fn plain_text(spans: &[RichText]) -> String {
    spans.iter().map(|s| s.plain_text.as_str()).collect()
}
