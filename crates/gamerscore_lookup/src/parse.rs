//! Gamerscore extraction from profile page HTML.
//!
//! The profile page labels the score with a `<span>` whose text contains
//! "Gamerscore". The number sits somewhere else inside that span's parent
//! element, usually a sibling. Extraction walks the page as a flat stream of
//! tags and text, keeping a stack of open elements and the text each has
//! accumulated, so the parent's full text is known when it closes.

use gamerscore_core::Score;
use gamerscore_error::{FetchError, FetchErrorKind};
use regex::Regex;
use std::sync::LazyLock;

static TOKEN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)<!--.*?-->|<[^<>]*>|[^<]+|<").expect("Valid HTML token regex")
});

static MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)gamerscore").expect("Valid marker regex"));

static NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d[\d,]*").expect("Valid number regex"));

const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source", "track",
    "wbr",
];

const RAW_TEXT_ELEMENTS: &[&str] = &["script", "style"];

struct OpenElement {
    name: String,
    text: String,
    holds_marker: bool,
}

impl OpenElement {
    fn new(name: String) -> Self {
        Self {
            name,
            text: String::new(),
            holds_marker: false,
        }
    }
}

/// Extract the gamerscore from a profile page.
///
/// Finds the first text node matching "gamerscore" (case-insensitive) whose
/// enclosing element is a `span`, then parses the first digit run in the
/// text of that span's parent, ignoring thousands separators.
///
/// # Errors
///
/// Returns [`FetchErrorKind::Parse`] if no marker span exists or its parent
/// holds no number that fits a [`Score`].
///
/// # Example
///
/// ```
/// use gamerscore_lookup::parse_gamerscore;
///
/// let html = r#"<div class="stat"><span>Gamerscore</span><h3>12,345</h3></div>"#;
/// assert_eq!(parse_gamerscore(html).unwrap(), 12345);
/// ```
pub fn parse_gamerscore(body: &str) -> Result<Score, FetchError> {
    let mut stack = vec![OpenElement::new(String::from("#document"))];
    let mut found_marker = false;
    let mut raw_text_until: Option<String> = None;

    for token in TOKEN.find_iter(body) {
        let token = token.as_str();

        if let Some(name) = &raw_text_until {
            if token.starts_with("</") && tag_name(&token[2..]) == *name {
                raw_text_until = None;
            }
            continue;
        }

        if token.starts_with("<!") || token.starts_with("<?") {
            continue;
        }

        if let Some(rest) = token.strip_prefix("</") {
            let name = tag_name(rest);
            let Some(depth) = stack.iter().rposition(|element| element.name == name) else {
                continue;
            };
            if depth == 0 {
                continue;
            }
            while stack.len() > depth {
                if let Some(text) = close_top(&mut stack) {
                    return score_from(&text);
                }
            }
            continue;
        }

        if token.len() > 1
            && let Some(rest) = token.strip_prefix('<')
        {
            let name = tag_name(rest);
            if name.is_empty() {
                push_text(&mut stack, token, &mut found_marker);
                continue;
            }
            if RAW_TEXT_ELEMENTS.contains(&name.as_str()) {
                if !token.ends_with("/>") {
                    raw_text_until = Some(name);
                }
                continue;
            }
            if VOID_ELEMENTS.contains(&name.as_str()) || token.ends_with("/>") {
                continue;
            }
            stack.push(OpenElement::new(name));
            continue;
        }

        push_text(&mut stack, token, &mut found_marker);
    }

    // Elements left open at end of input close implicitly.
    while !stack.is_empty() {
        if let Some(text) = close_top(&mut stack) {
            return score_from(&text);
        }
    }

    Err(FetchError::new(FetchErrorKind::Parse(
        "gamerscore marker not found".to_string(),
    )))
}

fn tag_name(rest: &str) -> String {
    rest.trim_start()
        .chars()
        .take_while(|c| c.is_ascii_alphanumeric() || *c == '-' || *c == ':')
        .collect::<String>()
        .to_ascii_lowercase()
}

fn push_text(stack: &mut [OpenElement], text: &str, found_marker: &mut bool) {
    let depth = stack.len();
    let Some(top) = stack.last_mut() else {
        return;
    };
    top.text.push_str(&decode_spaces(text));
    let in_span = top.name == "span";

    if !*found_marker && in_span && depth >= 2 && MARKER.is_match(text) {
        stack[depth - 2].holds_marker = true;
        *found_marker = true;
    }
}

/// Pop the innermost element, folding its text into its parent.
///
/// Returns the element's text if it is the marker span's parent.
fn close_top(stack: &mut Vec<OpenElement>) -> Option<String> {
    let element = stack.pop()?;
    if element.holds_marker {
        return Some(element.text);
    }
    if let Some(parent) = stack.last_mut() {
        parent.text.push_str(&element.text);
    }
    None
}

fn decode_spaces(text: &str) -> String {
    text.replace("&nbsp;", " ").replace("&#160;", " ")
}

fn score_from(text: &str) -> Result<Score, FetchError> {
    let digits = NUMBER
        .find(text)
        .map(|m| m.as_str().replace(',', ""))
        .ok_or_else(|| {
            FetchError::new(FetchErrorKind::Parse(
                "no number next to gamerscore marker".to_string(),
            ))
        })?;

    digits.parse::<Score>().map_err(|e| {
        FetchError::new(FetchErrorKind::Parse(format!(
            "malformed gamerscore '{}': {}",
            digits, e
        )))
    })
}
