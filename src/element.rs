// 🌳 Tree Adapter - owned view over a parsed markup document
//
// Path queries understand a small XPath subset:
//   `A/B`      child steps          `*`       any element
//   `A//B`     descendant step      `.`       the node itself
//   `.../@x`   attribute value      `.../text()` element text
//
// `xpath` never fails (empty Vec on no match); `get_text` and `get` funnel
// every missing or malformed value into `ElementGetValueError`.

use std::fmt::{Display, Write};

use crate::error::ElementGetValueError;

#[derive(Debug, Clone, PartialEq)]
pub struct XmlNode {
    tag: String,
    attributes: Vec<(String, String)>,
    text: String,
    children: Vec<XmlNode>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Step<'p> {
    Current,
    Child(&'p str),
    Descendant(&'p str),
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Terminal<'p> {
    Attribute(&'p str),
    Text,
}

fn parse_path(path: &str) -> (Vec<Step<'_>>, Option<Terminal<'_>>) {
    let segments: Vec<&str> = path.split('/').collect();
    let mut steps = Vec::new();
    let mut terminal = None;
    let mut descend = false;

    for (index, segment) in segments.iter().enumerate() {
        if segment.is_empty() {
            descend = true;
            continue;
        }

        if index == segments.len() - 1 {
            if let Some(name) = segment.strip_prefix('@') {
                terminal = Some(Terminal::Attribute(name));
                break;
            }
            if *segment == "text()" {
                terminal = Some(Terminal::Text);
                break;
            }
        }

        if *segment == "." {
            steps.push(Step::Current);
            continue;
        }

        steps.push(if descend {
            Step::Descendant(segment)
        } else {
            Step::Child(segment)
        });
        descend = false;
    }

    (steps, terminal)
}

fn push_unique<'a>(nodes: &mut Vec<&'a XmlNode>, node: &'a XmlNode) {
    if !nodes.iter().any(|existing| std::ptr::eq(*existing, node)) {
        nodes.push(node);
    }
}

fn escape(value: &str, out: &mut String) {
    for ch in value.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            other => out.push(other),
        }
    }
}

impl XmlNode {
    /// Parse a markup string; the document element becomes the returned node
    pub fn parse(xml: &str) -> Result<XmlNode, roxmltree::Error> {
        let document = roxmltree::Document::parse(xml)?;
        Ok(Self::from_roxml(document.root_element()))
    }

    fn from_roxml(node: roxmltree::Node<'_, '_>) -> XmlNode {
        let mut text = String::new();
        let mut children = Vec::new();

        for child in node.children() {
            if child.is_element() {
                children.push(Self::from_roxml(child));
            } else if child.is_text() {
                if let Some(fragment) = child.text() {
                    text.push_str(fragment);
                }
            }
        }

        if text.trim().is_empty() {
            text.clear();
        }

        XmlNode {
            tag: node.tag_name().name().to_string(),
            attributes: node
                .attributes()
                .map(|attr| (attr.name().to_string(), attr.value().to_string()))
                .collect(),
            text,
            children,
        }
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn children(&self) -> &[XmlNode] {
        &self.children
    }

    fn matches(&self, name: &str) -> bool {
        name == "*" || self.tag == name
    }

    fn collect_descendants<'a>(&'a self, name: &str, out: &mut Vec<&'a XmlNode>) {
        for child in &self.children {
            if child.matches(name) {
                push_unique(out, child);
            }
            child.collect_descendants(name, out);
        }
    }

    fn select<'a>(&'a self, steps: &[Step<'_>]) -> Vec<&'a XmlNode> {
        let mut current: Vec<&XmlNode> = vec![self];

        for step in steps {
            let mut next = Vec::new();
            for node in &current {
                match step {
                    Step::Current => push_unique(&mut next, node),
                    Step::Child(name) => {
                        for child in &node.children {
                            if child.matches(name) {
                                push_unique(&mut next, child);
                            }
                        }
                    }
                    Step::Descendant(name) => node.collect_descendants(name, &mut next),
                }
            }
            current = next;
        }

        current
    }

    // ========================================================================
    // QUERIES
    // ========================================================================

    /// Element nodes matching `path`, in document order
    pub fn xpath(&self, path: &str) -> Vec<&XmlNode> {
        let (steps, _) = parse_path(path);
        self.select(&steps)
    }

    /// String values matching `path` (attribute values or element text)
    pub fn values(&self, path: &str) -> Vec<String> {
        let (steps, terminal) = parse_path(path);
        let nodes = self.select(&steps);

        match terminal {
            Some(Terminal::Attribute(name)) => nodes
                .iter()
                .filter_map(|node| node.attribute(name))
                .map(str::to_string)
                .collect(),
            Some(Terminal::Text) | None => nodes.iter().map(|node| node.text.clone()).collect(),
        }
    }

    /// Exactly one value at `path`, trimmed
    pub fn get_text(&self, path: &str) -> Result<String, ElementGetValueError> {
        let mut values = self.values(path);
        match values.len() {
            0 => Err(ElementGetValueError::new(path, "no match")),
            1 => Ok(values.remove(0).trim().to_string()),
            n => Err(ElementGetValueError::new(
                path,
                format!("expected a single match, found {}", n),
            )),
        }
    }

    /// First value at `path`, if any
    pub fn find_text(&self, path: &str) -> Option<String> {
        self.values(path)
            .into_iter()
            .next()
            .map(|value| value.trim().to_string())
    }

    /// Typed value at `path`; missing and uncoercible values share one error
    pub fn get<T, E, F>(&self, path: &str, caster: F) -> Result<T, ElementGetValueError>
    where
        F: FnOnce(&str) -> Result<T, E>,
        E: Display,
    {
        let text = self.get_text(path)?;
        caster(&text).map_err(|err| {
            ElementGetValueError::new(path, format!("cannot coerce '{}': {}", text, err))
        })
    }

    /// Like `get`, but a path with no match yields `None`
    pub fn get_optional<T, E, F>(&self, path: &str, caster: F) -> Result<Option<T>, ElementGetValueError>
    where
        F: FnOnce(&str) -> Result<T, E>,
        E: Display,
    {
        if self.values(path).is_empty() {
            return Ok(None);
        }
        self.get(path, caster).map(Some)
    }

    pub fn get_f64(&self, path: &str) -> Result<f64, ElementGetValueError> {
        self.get(path, str::parse::<f64>)
    }

    pub fn get_i64(&self, path: &str) -> Result<i64, ElementGetValueError> {
        self.get(path, str::parse::<i64>)
    }

    pub fn get_bool(&self, path: &str) -> Result<bool, ElementGetValueError> {
        self.get(path, parse_bool)
    }

    // ========================================================================
    // SERIALIZATION
    // ========================================================================

    /// Re-serialize this subtree as a standalone document
    pub fn to_xml_string(&self) -> String {
        let mut out = String::new();
        self.write_into(&mut out);
        out
    }

    fn write_into(&self, out: &mut String) {
        out.push('<');
        out.push_str(&self.tag);
        for (name, value) in &self.attributes {
            let _ = write!(out, " {}=\"", name);
            escape(value, out);
            out.push('"');
        }

        if self.text.is_empty() && self.children.is_empty() {
            out.push_str(" />");
            return;
        }

        out.push('>');
        escape(&self.text, out);
        for child in &self.children {
            child.write_into(out);
        }
        let _ = write!(out, "</{}>", self.tag);
    }
}

/// `true`/`false` as written by the source documents
pub fn parse_bool(text: &str) -> Result<bool, String> {
    match text.trim().to_ascii_lowercase().as_str() {
        "true" => Ok(true),
        "false" => Ok(false),
        other => Err(format!("not a boolean: {}", other)),
    }
}
