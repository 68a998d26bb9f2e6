// src/ingest/normalize.rs
//! Raw listing → `Resource`, plus the HTML-to-text sanitizer used for descriptions.

use chrono::{DateTime, Utc};
use once_cell::sync::OnceCell;
use regex::Regex;
use scraper::{ElementRef, Html, Node};

use crate::resource::{LocationType, Resource, ResourceKind, ResourceStatus};

/// Descriptions are cut to this many characters before the ellipsis is appended.
pub const MAX_DESCRIPTION_CHARS: usize = 1000;
pub const ELLIPSIS: &str = "...";

/// Stands in for a `<` that would otherwise open a tag when the text is read again.
pub const TAG_OPEN_STAND_IN: char = '\u{2039}';
/// Stands in for a `&` that would otherwise start a character reference.
pub const AMPERSAND_STAND_IN: char = '\u{FF06}';

/// Convert an HTML (or plain text) fragment into bounded plain text.
///
/// Pure and total: malformed markup is handled by the HTML5 parser, empty input
/// gives an empty string. The output is a fixed point: decoded text that
/// still looks like a tag or an entity (`&lt;b&gt;` → `<b>`) has its opening
/// `<` or `&` swapped for a look-alike, so a second pass neither parses nor
/// decodes it.
pub fn html_to_text(input: &str) -> String {
    if input.trim().is_empty() {
        return String::new();
    }

    let raw = if looks_like_markup(input) {
        render_fragment(input)
    } else {
        html_escape::decode_html_entities(input).into_owned()
    };

    let text = neutralize_markup(&tidy_whitespace(&raw));
    truncate_chars(text, MAX_DESCRIPTION_CHARS)
}

fn tag_open_re() -> &'static Regex {
    static RE: OnceCell<Regex> = OnceCell::new();
    // What the HTML tokenizer treats as a tag, end tag, comment or declaration.
    RE.get_or_init(|| Regex::new(r"<([A-Za-z/!?])").unwrap())
}

fn char_ref_re() -> &'static Regex {
    static RE: OnceCell<Regex> = OnceCell::new();
    // Superset of what `decode_html_entities` decodes: `;`-terminated refs only.
    RE.get_or_init(|| Regex::new(r"&(#?[A-Za-z0-9]+;)").unwrap())
}

fn looks_like_markup(s: &str) -> bool {
    tag_open_re().is_match(s)
}

fn neutralize_markup(s: &str) -> String {
    let tag_open = format!("{TAG_OPEN_STAND_IN}${{1}}");
    let amp = format!("{AMPERSAND_STAND_IN}${{1}}");
    let s = tag_open_re().replace_all(s, tag_open.as_str());
    char_ref_re().replace_all(&s, amp.as_str()).into_owned()
}

fn render_fragment(input: &str) -> String {
    let fragment = Html::parse_fragment(input);
    let mut out = String::with_capacity(input.len());
    render_element(fragment.root_element(), &mut out);
    out
}

fn is_heading(name: &str) -> bool {
    matches!(name, "h1" | "h2" | "h3" | "h4" | "h5" | "h6")
}

fn render_element(el: ElementRef<'_>, out: &mut String) {
    let name = el.value().name();
    match name {
        "script" | "style" | "template" => return,
        "br" => {
            out.push('\n');
            return;
        }
        "li" => out.push_str("• "),
        h if is_heading(h) => out.push('\n'),
        _ => {}
    }

    for child in el.children() {
        match child.value() {
            Node::Text(text) => out.push_str(text),
            Node::Element(_) => {
                if let Some(child_el) = ElementRef::wrap(child) {
                    render_element(child_el, out);
                }
            }
            _ => {}
        }
    }

    if name == "p" || name == "li" || is_heading(name) {
        out.push('\n');
    }
}

fn tidy_whitespace(s: &str) -> String {
    static RE_BLANK: OnceCell<Regex> = OnceCell::new();
    static RE_SPACES: OnceCell<Regex> = OnceCell::new();
    let re_blank = RE_BLANK.get_or_init(|| Regex::new(r"\n\s*\n").unwrap());
    let re_spaces = RE_SPACES.get_or_init(|| Regex::new(r"[ \t\u{00A0}]+").unwrap());

    let s = s.replace("\r\n", "\n").replace('\r', "\n");
    let s = re_blank.replace_all(&s, "\n\n");
    let s = re_spaces.replace_all(&s, " ");
    s.trim().to_string()
}

fn truncate_chars(s: String, max: usize) -> String {
    if s.chars().count() <= max {
        return s;
    }
    let mut out: String = s.chars().take(max).collect();
    out.push_str(ELLIPSIS);
    out
}

/// Single-line cleanup for titles and short fields scraped out of markup.
pub fn clean_inline(s: &str) -> String {
    static RE_WS: OnceCell<Regex> = OnceCell::new();
    let re_ws = RE_WS.get_or_init(|| Regex::new(r"\s+").unwrap());
    let decoded = html_escape::decode_html_entities(s);
    re_ws.replace_all(&decoded, " ").trim().to_string()
}

/// Fields as lifted from a source, before defaults are applied.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawListing {
    pub title: String,
    pub description: Option<String>,
    pub location: Option<String>,
    pub company: Option<String>,
    pub source_url: Option<String>,
    pub requirements: Option<String>,
    pub benefits: Option<String>,
    pub duration: Option<String>,
}

impl RawListing {
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Default::default()
        }
    }
}

/// Substitutions used when a source leaves a field out.
#[derive(Debug, Clone, Copy, Default)]
pub struct FieldDefaults {
    pub description: &'static str,
    pub location: Option<&'static str>,
    pub company: Option<&'static str>,
    pub source_url: &'static str,
    pub requirements: &'static str,
    pub benefits: &'static str,
    pub duration: &'static str,
}

/// Provenance and defaults for one sub-source.
#[derive(Debug, Clone, Copy)]
pub struct SourceProfile {
    pub created_by: &'static str,
    pub scraped_from: &'static str,
    pub kind: ResourceKind,
    pub location_type: LocationType,
    pub defaults: FieldDefaults,
}

impl SourceProfile {
    pub const fn new(
        created_by: &'static str,
        scraped_from: &'static str,
        kind: ResourceKind,
        location_type: LocationType,
    ) -> Self {
        Self {
            created_by,
            scraped_from,
            kind,
            location_type,
            defaults: FieldDefaults {
                description: "",
                location: None,
                company: None,
                source_url: "",
                requirements: "",
                benefits: "",
                duration: "",
            },
        }
    }

    pub const fn with_defaults(self, defaults: FieldDefaults) -> Self {
        Self { defaults, ..self }
    }

    /// Build a `Resource`. Returns `None` when the title is blank after cleanup.
    pub fn normalize(&self, raw: RawListing, now: DateTime<Utc>) -> Option<Resource> {
        let title = clean_inline(&raw.title);
        if title.is_empty() {
            return None;
        }
        let d = &self.defaults;

        let description = html_to_text(&pick(raw.description, d.description));
        let location = pick_opt(raw.location, d.location);
        let company = pick_opt(raw.company, d.company);

        Some(Resource {
            title,
            kind: self.kind,
            description,
            location,
            company,
            source_url: pick(raw.source_url, d.source_url),
            requirements: pick(raw.requirements, d.requirements),
            benefits: pick(raw.benefits, d.benefits),
            status: ResourceStatus::Active,
            created_at: now,
            updated_at: now,
            created_by: self.created_by.to_string(),
            duration: pick(raw.duration, d.duration),
            scraped_from: self.scraped_from.to_string(),
            location_type: self.location_type,
        })
    }
}

fn non_blank(v: Option<String>) -> Option<String> {
    v.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}

fn pick(v: Option<String>, default: &str) -> String {
    non_blank(v).unwrap_or_else(|| default.to_string())
}

fn pick_opt(v: Option<String>, default: Option<&str>) -> Option<String> {
    non_blank(v).or_else(|| default.map(str::to_string))
}
