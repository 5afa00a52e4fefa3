use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, Html, Node};
use std::path::Path;
use url::Url;

/// Element names whose entire subtree carries no prose content
const STRIP_TAGS: &[&str] = &[
    "script", "style", "iframe", "img", "noscript", "embed", "object", "video", "audio",
];

static WHITESPACE_RUNS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

/// Literal backslash-u escape artifacts left over from upstream JSON, not
/// genuine Unicode in the decoded text
static UNICODE_ARTIFACTS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\\u[0-9A-Fa-f]{4}").unwrap());

static DOC_SUFFIX: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)\.(html?|txt|json|csv|xml)$").unwrap());

/// Named character references that occasionally survive the first decode
/// pass (double-escaped upstream), mapped to their literal characters
const SURVIVING_ENTITIES: &[(&str, &str)] = &[
    ("&nbsp;", " "),
    ("&amp;", "&"),
    ("&quot;", "\""),
    ("&lt;", "<"),
    ("&gt;", ">"),
    ("&#39;", "'"),
    ("&apos;", "'"),
    ("&cent;", "¢"),
    ("&pound;", "£"),
    ("&yen;", "¥"),
    ("&euro;", "€"),
    ("&copy;", "©"),
    ("&reg;", "®"),
    ("&trade;", "™"),
    ("&sect;", "§"),
    ("&deg;", "°"),
    ("&plusmn;", "±"),
    ("&para;", "¶"),
    ("&middot;", "·"),
    ("&ndash;", "–"),
    ("&mdash;", "—"),
    ("&lsquo;", "\u{2018}"),
    ("&rsquo;", "\u{2019}"),
    ("&ldquo;", "\u{201C}"),
    ("&rdquo;", "\u{201D}"),
    ("&bull;", "•"),
    ("&hellip;", "…"),
    ("&iquest;", "¿"),
    ("&iexcl;", "¡"),
    ("&laquo;", "«"),
    ("&raquo;", "»"),
];

/// Converts an HTML fragment (or already-plain text) into clean text
///
/// Anchor elements are unwrapped to their visible text. See
/// [`normalize_with_links`] for the variant that retains link targets.
///
/// Inputs that are URLs or file paths are returned unchanged, so
/// non-prose values accidentally routed through the normalizer (image
/// sources, SKU codes that happen to be paths) survive byte-identical.
///
/// The function is deterministic and idempotent: normalizing
/// already-normalized text returns the same text. The one exception is
/// doubly-escaped markup (`&amp;lt;b&amp;gt;`): each pass removes one
/// escaping layer, so such input converges only after a second pass
/// reveals and strips the markup.
///
/// # Example
///
/// ```
/// use shopsweep::text::normalize;
///
/// let text = normalize("<p>A &amp; B  <script>x()</script>shirt</p>");
/// assert_eq!(text, "A & B shirt");
/// ```
pub fn normalize(input: &str) -> String {
    normalize_with_links(input, false)
}

/// Converts an HTML fragment into clean text, optionally keeping link targets
///
/// With `keep_links` set, each anchor's href is appended in parentheses
/// after the anchor text; otherwise anchors are unwrapped to plain text.
pub fn normalize_with_links(input: &str, keep_links: bool) -> String {
    if looks_like_url(input) || looks_like_path(input) {
        return input.to_string();
    }

    let decoded = html_escape::decode_html_entities(input);
    let fragment = Html::parse_fragment(&decoded);

    let mut parts: Vec<String> = Vec::new();
    collect_text(fragment.root_element(), keep_links, &mut parts);

    let joined = parts.join(" ");
    let mut text = WHITESPACE_RUNS.replace_all(&joined, " ").trim().to_string();

    for (entity, literal) in SURVIVING_ENTITIES {
        if text.contains(entity) {
            text = text.replace(entity, literal);
        }
    }

    let text = UNICODE_ARTIFACTS.replace_all(&text, "");

    // Entity substitution can reintroduce spacing, collapse once more
    WHITESPACE_RUNS.replace_all(&text, " ").trim().to_string()
}

/// Checks whether the input is a URL with both a scheme and a host
fn looks_like_url(content: &str) -> bool {
    match Url::parse(content) {
        Ok(url) => url.has_host() && !url.scheme().is_empty(),
        Err(_) => false,
    }
}

/// Checks whether the input resembles a file path
///
/// True when the path exists on disk or the suffix matches a known
/// document/text extension. The existence check is the normalizer's only
/// disk access.
fn looks_like_path(content: &str) -> bool {
    Path::new(content).is_file() || DOC_SUFFIX.is_match(content)
}

/// Recursively collects visible text, skipping non-content subtrees
fn collect_text(element: ElementRef, keep_links: bool, out: &mut Vec<String>) {
    for child in element.children() {
        match child.value() {
            Node::Text(text) => {
                let trimmed = text.trim();
                if !trimmed.is_empty() {
                    out.push(trimmed.to_string());
                }
            }
            Node::Element(el) => {
                if STRIP_TAGS.contains(&el.name()) {
                    continue;
                }
                if let Some(child_ref) = ElementRef::wrap(child) {
                    collect_text(child_ref, keep_links, out);
                    if keep_links && el.name() == "a" {
                        if let Some(href) = el.attr("href") {
                            out.push(format!("({})", href));
                        }
                    }
                }
            }
            _ => {}
        }
    }
}
