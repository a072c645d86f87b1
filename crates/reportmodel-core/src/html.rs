//! HTML escaping and documentation formatting.
//!
//! Names, arguments and messages are only escaped. Documentation and
//! metadata values additionally get a small wiki-style markup:
//!
//! - `*bold*` and `_italic_`
//! - URLs become links, image URLs become inline images
//! - lines starting with `- ` form bullet lists
//! - `| cell | cell |` lines form tables
//! - lines starting with `| ` are preformatted

use regex::Regex;
use std::sync::OnceLock;

const IMAGE_EXTENSIONS: &[&str] = &[".jpg", ".jpeg", ".png", ".gif", ".bmp", ".svg"];

fn url_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"(?:https?|ftp|file)://[^\s<>"]*[^\s<>".,;:!?')\]]"#).expect("valid url regex")
    })
}

fn bold_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\*(\S(?:[^*]*\S)?)\*").expect("valid bold regex"))
}

fn italic_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\b_(\S(?:[^_]*\S)?)_\b").expect("valid italic regex"))
}

/// Escape `&`, `<` and `>`.
pub fn html_escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

enum Block {
    Text(Vec<String>),
    List(Vec<String>),
    Table(Vec<Vec<String>>),
    Preformatted(Vec<String>),
}

/// Escape `text` and render its documentation markup.
pub fn html_format(text: &str) -> String {
    let mut blocks: Vec<Block> = Vec::new();

    for line in text.lines() {
        let trimmed = line.trim();
        if let Some(item) = trimmed.strip_prefix("- ") {
            match blocks.last_mut() {
                Some(Block::List(items)) => items.push(item.to_string()),
                _ => blocks.push(Block::List(vec![item.to_string()])),
            }
        } else if is_table_row(trimmed) {
            let cells = table_cells(trimmed);
            match blocks.last_mut() {
                Some(Block::Table(rows)) => rows.push(cells),
                _ => blocks.push(Block::Table(vec![cells])),
            }
        } else if trimmed == "|" || trimmed.starts_with("| ") {
            let content = trimmed.get(2..).unwrap_or("").to_string();
            match blocks.last_mut() {
                Some(Block::Preformatted(lines)) => lines.push(content),
                _ => blocks.push(Block::Preformatted(vec![content])),
            }
        } else {
            match blocks.last_mut() {
                Some(Block::Text(lines)) => lines.push(line.to_string()),
                _ => blocks.push(Block::Text(vec![line.to_string()])),
            }
        }
    }

    blocks
        .iter()
        .map(render_block)
        .collect::<Vec<_>>()
        .join("\n")
}

fn is_table_row(line: &str) -> bool {
    line.len() > 2 && line.starts_with("| ") && line.ends_with(" |")
}

fn table_cells(line: &str) -> Vec<String> {
    line[1..line.len() - 1]
        .split('|')
        .map(|cell| cell.trim().to_string())
        .collect()
}

fn render_block(block: &Block) -> String {
    match block {
        Block::Text(lines) => lines
            .iter()
            .map(|line| format_inline(line))
            .collect::<Vec<_>>()
            .join("\n"),
        Block::List(items) => {
            let mut html = String::from("<ul>\n");
            for item in items {
                html.push_str(&format!("<li>{}</li>\n", format_inline(item)));
            }
            html.push_str("</ul>");
            html
        }
        Block::Table(rows) => {
            let mut html = String::from("<table border=\"1\" class=\"doc\">\n");
            for row in rows {
                html.push_str("<tr>");
                for cell in row {
                    html.push_str(&format!("<td>{}</td>", format_inline(cell)));
                }
                html.push_str("</tr>\n");
            }
            html.push_str("</table>");
            html
        }
        Block::Preformatted(lines) => {
            let body: Vec<String> = lines.iter().map(|l| html_escape(l)).collect();
            format!("<pre>\n{}\n</pre>", body.join("\n"))
        }
    }
}

/// Inline markup for one escaped line. URLs are left untouched by the
/// bold/italic rules.
fn format_inline(line: &str) -> String {
    let escaped = html_escape(line);
    let mut out = String::with_capacity(escaped.len());
    let mut last = 0;
    for url in url_regex().find_iter(&escaped) {
        out.push_str(&format_emphasis(&escaped[last..url.start()]));
        out.push_str(&link(url.as_str()));
        last = url.end();
    }
    out.push_str(&format_emphasis(&escaped[last..]));
    out
}

fn format_emphasis(text: &str) -> String {
    let bolded = bold_regex().replace_all(text, "<b>$1</b>");
    italic_regex().replace_all(&bolded, "<i>$1</i>").into_owned()
}

fn link(url: &str) -> String {
    let lower = url.to_ascii_lowercase();
    if IMAGE_EXTENSIONS.iter().any(|ext| lower.ends_with(ext)) {
        format!("<img src=\"{url}\" title=\"{url}\">")
    } else {
        format!("<a href=\"{url}\">{url}</a>")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape() {
        assert_eq!(html_escape("<img> & *x*"), "&lt;img&gt; &amp; *x*");
        assert_eq!(html_escape(""), "");
    }

    #[test]
    fn test_bold_and_escape() {
        assert_eq!(html_format("*bold* <&>"), "<b>bold</b> &lt;&amp;&gt;");
        assert_eq!(html_format("*b*"), "<b>b</b>");
        assert_eq!(html_format("a * b * c"), "a * b * c");
    }

    #[test]
    fn test_italic() {
        assert_eq!(html_format("an _italic_ word"), "an <i>italic</i> word");
        assert_eq!(html_format("snake_case_name"), "snake_case_name");
    }

    #[test]
    fn test_links_and_images() {
        assert_eq!(
            html_format("http://doc"),
            "<a href=\"http://doc\">http://doc</a>"
        );
        assert_eq!(
            html_format("see https://x.org/a_b_c."),
            "see <a href=\"https://x.org/a_b_c\">https://x.org/a_b_c</a>."
        );
        assert_eq!(
            html_format("http://host/logo.PNG"),
            "<img src=\"http://host/logo.PNG\" title=\"http://host/logo.PNG\">"
        );
    }

    #[test]
    fn test_list() {
        assert_eq!(
            html_format("Items:\n- one\n- *two*"),
            "Items:\n<ul>\n<li>one</li>\n<li><b>two</b></li>\n</ul>"
        );
    }

    #[test]
    fn test_table() {
        assert_eq!(
            html_format("| a | b |\n| 1 | <2> |"),
            "<table border=\"1\" class=\"doc\">\n<tr><td>a</td><td>b</td></tr>\n<tr><td>1</td><td>&lt;2&gt;</td></tr>\n</table>"
        );
    }

    #[test]
    fn test_preformatted() {
        assert_eq!(
            html_format("| *raw* <x>\n| second"),
            "<pre>\n*raw* &lt;x&gt;\nsecond\n</pre>"
        );
    }
}
