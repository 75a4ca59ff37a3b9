//! Minimal element tree for the display region managed by a player
//!
//! Players build detached `Element` trees (the embed markup) and insert them
//! into a `Display`. Host pages that already rendered markup can seed the
//! display from HTML, which is parsed with `scraper`.

use scraper::{ElementRef, Html};
use serde::Serialize;
use sha2::{Digest, Sha256};

/// Elements that never carry children or a closing tag in serialized markup
const VOID_ELEMENTS: &[&str] = &["param", "embed", "br", "img", "input", "source", "track"];

/// A detached DOM element with ordered attributes
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Element {
    tag: String,
    attributes: Vec<(String, String)>,
    children: Vec<Element>,
}

impl Element {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    /// Set an attribute, replacing an existing one in place.
    ///
    /// Attribute names compare ASCII case-insensitively, as they do in HTML
    /// documents; the first spelling used is kept.
    pub fn set_attribute(&mut self, name: &str, value: impl Into<String>) {
        let value = value.into();
        match self
            .attributes
            .iter_mut()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
        {
            Some(slot) => slot.1 = value,
            None => self.attributes.push((name.to_string(), value)),
        }
    }

    pub fn with_attribute(mut self, name: &str, value: impl Into<String>) -> Self {
        self.set_attribute(name, value);
        self
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn attributes(&self) -> &[(String, String)] {
        &self.attributes
    }

    pub fn append_child(&mut self, child: Element) {
        self.children.push(child);
    }

    pub fn children(&self) -> &[Element] {
        &self.children
    }

    /// Children with the given tag, in document order
    pub fn children_by_tag<'a>(&'a self, tag: &'a str) -> impl Iterator<Item = &'a Element> + 'a {
        self.children
            .iter()
            .filter(move |c| c.tag.eq_ignore_ascii_case(tag))
    }

    /// First element (self included) matching the query, pre-order
    pub fn find(&self, query: &Query) -> Option<&Element> {
        if query.matches(self) {
            return Some(self);
        }
        self.children.iter().find_map(|c| c.find(query))
    }

    /// Every element (self included) matching the query, pre-order
    pub fn find_all<'a>(&'a self, query: &Query, out: &mut Vec<&'a Element>) {
        if query.matches(self) {
            out.push(self);
        }
        for c in &self.children {
            c.find_all(query, out);
        }
    }

    /// Serialize to HTML markup
    pub fn to_html(&self) -> String {
        let mut out = String::new();
        self.write_html(&mut out);
        out
    }

    fn write_html(&self, out: &mut String) {
        out.push('<');
        out.push_str(&self.tag);
        for (name, value) in &self.attributes {
            out.push(' ');
            out.push_str(name);
            out.push_str("=\"");
            escape_attribute(value, out);
            out.push('"');
        }
        out.push('>');
        if VOID_ELEMENTS.contains(&self.tag.to_ascii_lowercase().as_str()) {
            return;
        }
        for c in &self.children {
            c.write_html(out);
        }
        out.push_str("</");
        out.push_str(&self.tag);
        out.push('>');
    }

    /// SHA-256 hex digest of the serialized markup.
    ///
    /// Two trees with the same fingerprint are structurally identical.
    pub fn fingerprint(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.to_html().as_bytes());
        hex::encode(hasher.finalize())
    }

    fn from_scraper(el: ElementRef<'_>) -> Self {
        let mut attributes: Vec<(String, String)> = el
            .value()
            .attrs()
            .map(|(n, v)| (n.to_string(), v.to_string()))
            .collect();
        // html5ever does not preserve source order for attributes
        attributes.sort();
        let children = el
            .children()
            .filter_map(ElementRef::wrap)
            .map(Element::from_scraper)
            .collect();
        Self {
            tag: el.value().name().to_string(),
            attributes,
            children,
        }
    }
}

fn escape_attribute(value: &str, out: &mut String) {
    for ch in value.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            c => out.push(c),
        }
    }
}

/// A tag + attribute-equality query, the subset of selectors players need
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Query {
    tag: Option<String>,
    attribute: Option<(String, String)>,
}

impl Query {
    pub fn tag(tag: impl Into<String>) -> Self {
        Self {
            tag: Some(tag.into()),
            attribute: None,
        }
    }

    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attribute = Some((name.into(), value.into()));
        self
    }

    pub fn matches(&self, el: &Element) -> bool {
        if let Some(tag) = &self.tag {
            if !el.tag.eq_ignore_ascii_case(tag) {
                return false;
            }
        }
        match &self.attribute {
            Some((name, value)) => el.attribute(name) == Some(value.as_str()),
            None => true,
        }
    }
}

/// The display region a player owns inside the host page
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Display {
    id: String,
    content: Vec<Element>,
}

impl Display {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            content: Vec::new(),
        }
    }

    /// Seed a display region from markup already present in the host page.
    /// Text nodes are dropped.
    pub fn from_html(id: impl Into<String>, html: &str) -> Self {
        let fragment = Html::parse_fragment(html);
        if !fragment.errors.is_empty() {
            log::debug!("display markup parsed with {} error(s)", fragment.errors.len());
        }
        let content = fragment
            .root_element()
            .children()
            .filter_map(ElementRef::wrap)
            .map(Element::from_scraper)
            .collect();
        Self {
            id: id.into(),
            content,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn content(&self) -> &[Element] {
        &self.content
    }

    /// Replace the whole region with a single element
    pub fn set_content(&mut self, el: Element) {
        self.content.clear();
        self.content.push(el);
    }

    pub fn append(&mut self, el: Element) {
        self.content.push(el);
    }

    pub fn clear(&mut self) {
        self.content.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }

    pub fn find(&self, query: &Query) -> Option<&Element> {
        self.content.iter().find_map(|el| el.find(query))
    }

    pub fn contains(&self, query: &Query) -> bool {
        self.find(query).is_some()
    }

    pub fn to_html(&self) -> String {
        self.content.iter().map(Element::to_html).collect()
    }
}
