//! Keyed element trees and their HTML form.
//!
//! Renderers build [`Node`] trees; the [`reconcile`] module diffs a region's
//! previous tree against its next one, and [`document`] keeps the last
//! rendered tree per region together with the patch journal browsers replay.

pub mod document;
pub mod reconcile;

use std::collections::BTreeMap;
use std::fmt::Write as _;

use serde::{Deserialize, Serialize};

/// Elements rendered without a closing tag.
const VOID_TAGS: &[&str] = &["input", "br", "hr", "img"];

// ---------------------------------------------------------------------------
// Regions
// ---------------------------------------------------------------------------

/// One independently reconciled area of the page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Region {
    Header,
    Circuit,
    Menu,
    Options,
    Output,
}

impl Region {
    pub const ALL: [Region; 5] = [
        Region::Header,
        Region::Circuit,
        Region::Menu,
        Region::Options,
        Region::Output,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Region::Header => "header",
            Region::Circuit => "circuit",
            Region::Menu => "menu",
            Region::Options => "options",
            Region::Output => "output",
        }
    }
}

// ---------------------------------------------------------------------------
// Nodes
// ---------------------------------------------------------------------------

/// An element with an optional reconciliation key.
///
/// A node carries either text or children, never both.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    pub tag: &'static str,
    pub key: Option<String>,
    /// Class names in insertion order, without duplicates.
    pub classes: Vec<String>,
    pub attrs: BTreeMap<String, String>,
    pub styles: BTreeMap<String, String>,
    pub text: Option<String>,
    pub children: Vec<Node>,
}

impl Node {
    pub fn new(tag: &'static str) -> Self {
        Self {
            tag,
            key: None,
            classes: Vec::new(),
            attrs: BTreeMap::new(),
            styles: BTreeMap::new(),
            text: None,
            children: Vec::new(),
        }
    }

    pub fn key(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self
    }

    pub fn class(mut self, name: &str) -> Self {
        if !self.classes.iter().any(|c| c == name) {
            self.classes.push(name.to_string());
        }
        self
    }

    pub fn class_if(self, name: &str, on: bool) -> Self {
        if on { self.class(name) } else { self }
    }

    pub fn attr(mut self, name: &str, value: impl ToString) -> Self {
        self.attrs.insert(name.to_string(), value.to_string());
        self
    }

    pub fn style(mut self, name: &str, value: impl Into<String>) -> Self {
        self.styles.insert(name.to_string(), value.into());
        self
    }

    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn child(mut self, child: Node) -> Self {
        self.children.push(child);
        self
    }

    pub fn has_class(&self, name: &str) -> bool {
        self.classes.iter().any(|c| c == name)
    }

    /// Inline `style` attribute value, properties sorted by name.
    pub fn style_text(&self) -> String {
        self.styles
            .iter()
            .map(|(name, value)| format!("{name}: {value};"))
            .collect::<Vec<_>>()
            .join(" ")
    }

    pub fn to_html(&self) -> String {
        let mut out = String::new();
        self.write_html(&mut out);
        out
    }

    /// Markup of the node's content: its text, or its children.
    pub fn inner_html(&self) -> String {
        let mut out = String::new();
        self.write_inner(&mut out);
        out
    }

    fn write_html(&self, out: &mut String) {
        out.push('<');
        out.push_str(self.tag);
        if let Some(key) = &self.key {
            let _ = write!(out, " data-key=\"{}\"", escape(key));
        }
        if !self.classes.is_empty() {
            let _ = write!(out, " class=\"{}\"", escape(&self.classes.join(" ")));
        }
        for (name, value) in &self.attrs {
            let _ = write!(out, " {name}=\"{}\"", escape(value));
        }
        if !self.styles.is_empty() {
            let _ = write!(out, " style=\"{}\"", escape(&self.style_text()));
        }
        out.push('>');

        if VOID_TAGS.contains(&self.tag) {
            return;
        }

        self.write_inner(out);
        let _ = write!(out, "</{}>", self.tag);
    }

    fn write_inner(&self, out: &mut String) {
        if let Some(text) = &self.text {
            out.push_str(&escape(text));
        }
        for child in &self.children {
            child.write_html(out);
        }
    }
}

/// Render a list of nodes back to back.
pub fn to_html(nodes: &[Node]) -> String {
    nodes.iter().map(Node::to_html).collect()
}

/// Escape text for use in element content and double-quoted attributes.
pub fn escape(text: &str) -> String {
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

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
