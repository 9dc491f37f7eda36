use std::collections::HashMap;

use comrak::ComrakOptions;
use tera::{try_get_value, Filter, Value};

/// Converts a markdown string to html.
/// `{{ text | markdown(inline=true) }}` strips the wrapping paragraph.
pub struct Markdown;

impl Filter for Markdown {
    fn filter(&self, value: &Value, args: &HashMap<String, Value>) -> tera::Result<Value> {
        let string_content = try_get_value!("markdown", "value", String, value);
        let inline = match args.get("inline") {
            Some(arg) => try_get_value!("markdown", "inline", bool, arg),
            None => false,
        };

        let mut options = ComrakOptions::default();
        options.extension.table = true;
        options.extension.strikethrough = true;
        options.extension.autolink = true;

        let html = comrak::markdown_to_html(&string_content, &options);
        let html = if inline { strip_paragraph(&html) } else { html };

        Ok(Value::String(html))
    }

    fn is_safe(&self) -> bool {
        true
    }
}

fn strip_paragraph(html: &str) -> String {
    let trimmed = html.trim_end();

    trimmed
        .strip_prefix("<p>")
        .and_then(|s| s.strip_suffix("</p>"))
        .unwrap_or(trimmed)
        .to_owned()
}
