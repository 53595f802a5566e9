//! Minimal element tree.
//!
//! Text placement follows the ElementTree model: an element owns the text
//! before its first child and a `tail` following its end tag. Indentation is
//! expressed entirely through text and tails, so [`Element::indent`] can run
//! before serialization without the writer knowing about it.

/// An XML element with ordered attributes.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Element {
    name: String,
    attributes: Vec<(String, String)>,
    text: Option<String>,
    cdata: bool,
    tail: Option<String>,
    children: Vec<Element>,
}

impl Element {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Add an attribute. Attributes are written in insertion order.
    pub fn with_attr(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.push((key.into(), value.into()));
        self
    }

    /// Add an attribute when `value` is present.
    pub fn with_attr_opt(self, key: impl Into<String>, value: Option<impl Into<String>>) -> Self {
        match value {
            Some(value) => self.with_attr(key, value),
            None => self,
        }
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self.cdata = false;
        self
    }

    /// Set the text, written as a CDATA section.
    pub fn with_cdata(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self.cdata = true;
        self
    }

    pub fn with_child(mut self, child: Element) -> Self {
        self.children.push(child);
        self
    }

    pub fn with_child_opt(mut self, child: Option<Element>) -> Self {
        self.children.extend(child);
        self
    }

    pub fn with_children<I: IntoIterator<Item = Element>>(mut self, children: I) -> Self {
        self.children.extend(children);
        self
    }

    pub fn push(&mut self, child: Element) {
        self.children.push(child);
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn attributes(&self) -> &[(String, String)] {
        &self.attributes
    }

    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }

    pub fn is_cdata(&self) -> bool {
        self.cdata
    }

    pub fn tail(&self) -> Option<&str> {
        self.tail.as_deref()
    }

    pub fn children(&self) -> &[Element] {
        &self.children
    }

    /// First direct child with the given name.
    pub fn find(&self, name: &str) -> Option<&Element> {
        self.children.iter().find(|child| child.name == name)
    }

    /// Follow a `/`-separated path of child names.
    pub fn find_path(&self, path: &str) -> Option<&Element> {
        path.split('/')
            .try_fold(self, |element, name| element.find(name))
    }

    /// `None` when the element has no children, so empty containers can be
    /// dropped.
    pub fn non_empty(self) -> Option<Self> {
        if self.children.is_empty() {
            None
        } else {
            Some(self)
        }
    }

    /// Pretty-print the tree in place with two-space indentation.
    ///
    /// Blank text and tails are replaced, non-blank ones are left alone. A
    /// container's closing tag ends up at its children's depth, since every
    /// child (including the last) receives a tail at its own level.
    pub fn indent(&mut self) {
        self.indent_at(0);
    }

    fn indent_at(&mut self, level: usize) {
        let indentation = format!("\n{}", "  ".repeat(level));

        if !self.children.is_empty() {
            if is_blank(self.text.as_deref()) {
                self.text = Some(format!("{}  ", indentation));
                self.cdata = false;
            }
            if is_blank(self.tail.as_deref()) {
                self.tail = Some(indentation.clone());
            }
            for child in &mut self.children {
                child.indent_at(level + 1);
            }
            if is_blank(self.tail.as_deref()) {
                self.tail = Some(indentation);
            }
        } else if level > 0 && is_blank(self.tail.as_deref()) {
            self.tail = Some(indentation);
        }
    }
}

fn is_blank(value: Option<&str>) -> bool {
    value.is_none_or(|value| value.trim().is_empty())
}
