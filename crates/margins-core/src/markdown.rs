//! Text decoration and the built-in Markdown dialect.
//!
//! `decorate_text` turns wiki links and hashtags in outline text into
//! navigation anchors. `render_markdown` is a small regex pipeline covering
//! headings, emphasis, links, flat lists, paragraphs and code. It has no
//! nested lists, blockquotes or tables.

use std::sync::LazyLock;

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use regex::{Captures, Regex};

/// Delimits code placeholders; stripped from input so user text can't forge one
const PLACEHOLDER_MARK: char = '\u{E000}';

static WIKI_LINK_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[\[(.+?)\]\]").expect("valid wiki link regex"));
static HASHTAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(^|\s)#([\p{L}0-9_\-]+)").expect("valid hashtag regex"));

static FENCE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)```(.*?)```").expect("valid fence regex"));
static INLINE_CODE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"`([^`\n]+)`").expect("valid inline code regex"));
static HEADING_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^(#{1,6})[ \t]+(.+?)[ \t]*$").expect("valid heading regex"));
static BOLD_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\*\*([^\n]+?)\*\*").expect("valid bold regex"));
static ITALIC_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\*([^\s*](?:[^*\n]*[^\s*])?)\*").expect("valid italic regex")
});
static UNDERSCORE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"_([^\s_](?:[^_\n]*[^\s_])?)_").expect("valid underscore regex")
});
static LINK_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[([^\]\n]+)\]\(([^)\s]+)\)").expect("valid link regex"));
static BULLET_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*[-*+]\s+(.*)$").expect("valid bullet regex"));
static ORDERED_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*\d+\.\s+(.*)$").expect("valid ordered regex"));
static BLANK_LINES_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n[ \t]*\n").expect("valid paragraph regex"));
static PLACEHOLDER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new("\u{E000}(FENCE|CODE|LINK)(\\d+)\u{E000}").expect("valid placeholder regex")
});
static FENCE_LINE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new("^\u{E000}FENCE\\d+\u{E000}$").expect("valid fence line regex")
});

/// Characters escaped in tag URLs (mirrors `encodeURIComponent`)
const COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// Escape text for HTML element and attribute content
pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#039;"),
            _ => out.push(c),
        }
    }
    out
}

/// Escape only `&`, `<` and `>` (Markdown baseline)
fn escape_text(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

/// Percent-encode a single route segment
pub fn encode_component(s: &str) -> String {
    utf8_percent_encode(s, COMPONENT).to_string()
}

/// Page slug for a title: lowercase, non-alphanumeric runs become one `-`
pub fn slugify(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    let mut pending_dash = false;
    for c in title.trim().to_lowercase().chars() {
        if c.is_ascii_lowercase() || c.is_ascii_digit() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(c);
        } else {
            pending_dash = true;
        }
    }
    slug
}

/// Anchor for a tag
pub fn tag_link(tag: &str) -> String {
    format!(
        r##"<a class="tag" href="#/tag/{}">#{}</a>"##,
        encode_component(tag),
        escape_html(tag)
    )
}

/// Decorate outline text with page links and tag links
///
/// `[[Title]]` links are parked behind placeholders while the hashtag pass
/// runs, so a `#` inside a link title never becomes a nested tag anchor.
pub fn decorate_text(text: &str) -> String {
    let text = text.replace(PLACEHOLDER_MARK, "");

    let mut links: Vec<String> = Vec::new();
    let masked = WIKI_LINK_RE.replace_all(&text, |caps: &Captures| {
        links.push(format!(
            r##"<a class="link" href="#/{}">{}</a>"##,
            slugify(&caps[1]),
            escape_html(&caps[1])
        ));
        placeholder("LINK", links.len() - 1)
    });

    let tagged = HASHTAG_RE.replace_all(&masked, |caps: &Captures| {
        format!(
            r##"{}<a class="tag" href="#/tag/{}">#{}</a>"##,
            &caps[1],
            &caps[2],
            escape_html(&caps[2])
        )
    });

    PLACEHOLDER_RE
        .replace_all(&tagged, |caps: &Captures| {
            caps[2]
                .parse::<usize>()
                .ok()
                .and_then(|i| links.get(i))
                .cloned()
                .unwrap_or_default()
        })
        .into_owned()
}

/// Code captured before the Markdown passes run
enum CodeSpan {
    Fence { lang: Option<String>, body: String },
    Inline(String),
}

impl CodeSpan {
    fn to_html(&self) -> String {
        match self {
            CodeSpan::Fence { lang, body } => match lang {
                Some(lang) => format!(
                    r#"<pre><code class="language-{}">{}</code></pre>"#,
                    escape_html(lang),
                    escape_text(body)
                ),
                None => format!("<pre><code>{}</code></pre>", escape_text(body)),
            },
            CodeSpan::Inline(body) => format!("<code>{}</code>", escape_text(body)),
        }
    }
}

fn fence_span(inner: &str) -> CodeSpan {
    if let Some((first, rest)) = inner.split_once('\n') {
        let lang = first.trim();
        let is_lang = !lang.is_empty()
            && lang
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '+' | '#'));
        if lang.is_empty() || is_lang {
            return CodeSpan::Fence {
                lang: is_lang.then(|| lang.to_string()),
                body: rest.trim_end_matches('\n').to_string(),
            };
        }
    }
    CodeSpan::Fence {
        lang: None,
        body: inner.trim_matches('\n').to_string(),
    }
}

fn placeholder(kind: &str, index: usize) -> String {
    format!("{m}{kind}{index}{m}", m = PLACEHOLDER_MARK)
}

/// Render the built-in Markdown dialect to an HTML fragment
///
/// Code is lifted out before escaping and restored last, so its content is
/// escaped exactly once and never sees the inline passes.
pub fn render_markdown(src: &str) -> String {
    let normalized = src
        .replace("\r\n", "\n")
        .replace(PLACEHOLDER_MARK, "");

    let mut spans: Vec<CodeSpan> = Vec::new();

    let text = FENCE_RE.replace_all(&normalized, |caps: &Captures| {
        spans.push(fence_span(&caps[1]));
        // Fences always stand alone as a block
        format!("\n\n{}\n\n", placeholder("FENCE", spans.len() - 1))
    });
    let text = INLINE_CODE_RE.replace_all(&text, |caps: &Captures| {
        spans.push(CodeSpan::Inline(caps[1].to_string()));
        placeholder("CODE", spans.len() - 1)
    });

    let text = escape_text(&text);

    let text = HEADING_RE.replace_all(&text, |caps: &Captures| {
        let level = caps[1].len();
        format!("<h{level}>{}</h{level}>", &caps[2])
    });

    let text = BOLD_RE.replace_all(&text, "<strong>$1</strong>");
    let text = ITALIC_RE.replace_all(&text, "<em>$1</em>");
    let text = underscore_emphasis(&text);
    let text = LINK_RE.replace_all(&text, |caps: &Captures| {
        let label = &caps[1];
        let url = &caps[2];
        if url.trim_start().to_ascii_lowercase().starts_with("javascript:") {
            label.to_string()
        } else {
            format!(r#"<a href="{}">{}</a>"#, url.replace('"', "&quot;"), label)
        }
    });

    let html = BLANK_LINES_RE
        .split(text.trim())
        .filter(|chunk| !chunk.trim().is_empty())
        .map(render_chunk)
        .collect::<Vec<_>>()
        .join("\n");

    PLACEHOLDER_RE
        .replace_all(&html, |caps: &Captures| {
            caps[2]
                .parse::<usize>()
                .ok()
                .and_then(|i| spans.get(i))
                .map(CodeSpan::to_html)
                .unwrap_or_default()
        })
        .into_owned()
}

/// `_x_` emphasis, only where neither delimiter touches a word character
fn underscore_emphasis(text: &str) -> String {
    let is_word = |c: char| c.is_alphanumeric() || c == '_';

    let mut out = String::with_capacity(text.len());
    let mut copied = 0;
    let mut from = 0;
    while let Some(caps) = UNDERSCORE_RE.captures_at(text, from) {
        let (Some(whole), Some(inner)) = (caps.get(0), caps.get(1)) else {
            break;
        };
        let before = text[..whole.start()].chars().next_back();
        let after = text[whole.end()..].chars().next();
        if before.is_some_and(is_word) || after.is_some_and(is_word) {
            // Retry from the next underscore; `_` is one byte
            from = whole.start() + 1;
            continue;
        }
        out.push_str(&text[copied..whole.start()]);
        out.push_str("<em>");
        out.push_str(inner.as_str());
        out.push_str("</em>");
        copied = whole.end();
        from = whole.end();
    }
    out.push_str(&text[copied..]);
    out
}

/// Headings and fences stand alone; raw `<` never survives escaping
fn is_block_line(line: &str) -> bool {
    let line = line.trim();
    let heading = line.starts_with("<h")
        && line.ends_with('>')
        && matches!(line.as_bytes().get(2), Some(b'1'..=b'6'));
    heading || FENCE_LINE_RE.is_match(line)
}

/// Turn one blank-line-delimited chunk into block HTML
fn render_chunk(chunk: &str) -> String {
    let mut out = Vec::new();
    let mut run: Vec<&str> = Vec::new();

    for line in chunk.lines() {
        if is_block_line(line) {
            if !run.is_empty() {
                out.push(render_run(&run));
                run.clear();
            }
            out.push(line.trim().to_string());
        } else if !line.trim().is_empty() {
            run.push(line);
        }
    }
    if !run.is_empty() {
        out.push(render_run(&run));
    }

    out.join("\n")
}

/// Lines of a paragraph: a list if every line carries a marker
fn render_run(lines: &[&str]) -> String {
    if lines.iter().all(|l| BULLET_RE.is_match(l)) {
        return list_html("ul", lines, &BULLET_RE);
    }
    if lines.iter().all(|l| ORDERED_RE.is_match(l)) {
        return list_html("ol", lines, &ORDERED_RE);
    }
    let body = lines.iter().map(|l| l.trim()).collect::<Vec<_>>().join("\n");
    format!("<p>{}</p>", body)
}

fn list_html(tag: &str, lines: &[&str], marker: &Regex) -> String {
    let items: String = lines
        .iter()
        .filter_map(|l| marker.captures(l))
        .map(|caps| format!("<li>{}</li>", &caps[1]))
        .collect();
    format!("<{tag}>{items}</{tag}>")
}
