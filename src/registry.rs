//! Element handler registry for the structured converter
//!
//! Handlers are keyed by a [`Selector`]: either a bare tag name, or a tag
//! plus an attribute predicate written like a CSS attribute selector
//! (`li[data-type="taskItem"]`, `a[data-note-link]`). Resolution for an
//! element first tries attribute-qualified selectors for its tag, most
//! recently registered first, then the bare-tag selector.
//!
//! Registering a key equal to an existing one replaces that handler, so
//! caller overrides applied after the defaults win. A [`Registry`] is
//! frozen once its converter is built.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use crate::converter::HandlerContext;
use crate::dom::Element;
use crate::error::ConversionError;

/// Element handler: receives the conversion context, returns Markdown
pub type Handler = Arc<dyn Fn(&HandlerContext<'_>) -> String + Send + Sync>;

/// Which elements a handler applies to
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Selector {
    /// Any element with this tag name
    ByTag(String),
    /// Elements with this tag carrying `attr`, optionally with an exact value
    ByTagAndAttribute {
        tag: String,
        attr: String,
        value: Option<String>,
    },
}

impl Selector {
    /// Parse a registry key
    ///
    /// Accepted forms: `tag`, `tag[attr]`, `tag[attr=value]`,
    /// `tag[attr="value"]`, `tag[attr='value']`. Tag and attribute names are
    /// lower-cased.
    ///
    /// # Errors
    ///
    /// `ConversionError::InvalidSelector` for empty names, an unterminated
    /// bracket or trailing text after it.
    pub fn parse(key: &str) -> Result<Self, ConversionError> {
        let key = key.trim();
        let invalid = || ConversionError::InvalidSelector(key.to_string());

        let Some(open) = key.find('[') else {
            let tag = key.to_ascii_lowercase();
            if !is_name(&tag) {
                return Err(invalid());
            }
            return Ok(Selector::ByTag(tag));
        };

        let tag = key[..open].trim().to_ascii_lowercase();
        let inner = key[open + 1..].strip_suffix(']').ok_or_else(invalid)?;
        if !is_name(&tag) || inner.contains(['[', ']']) {
            return Err(invalid());
        }

        let (attr, value) = match inner.split_once('=') {
            Some((attr, raw)) => {
                let raw = raw.trim();
                let value = raw
                    .strip_prefix('"')
                    .and_then(|v| v.strip_suffix('"'))
                    .or_else(|| raw.strip_prefix('\'').and_then(|v| v.strip_suffix('\'')))
                    .unwrap_or(raw);
                (attr.trim().to_ascii_lowercase(), Some(value.to_string()))
            }
            None => (inner.trim().to_ascii_lowercase(), None),
        };
        if !is_name(&attr) {
            return Err(invalid());
        }

        Ok(Selector::ByTagAndAttribute { tag, attr, value })
    }

    /// Tag name the selector applies to
    pub fn tag(&self) -> &str {
        match self {
            Selector::ByTag(tag) => tag,
            Selector::ByTagAndAttribute { tag, .. } => tag,
        }
    }

    /// Evaluate the selector against an element
    pub fn matches(&self, element: &Element) -> bool {
        match self {
            Selector::ByTag(tag) => element.name == *tag,
            Selector::ByTagAndAttribute { tag, attr, value } => {
                element.name == *tag
                    && match value {
                        Some(expected) => element.attr(attr) == Some(expected.as_str()),
                        None => element.has_attr(attr),
                    }
            }
        }
    }
}

impl FromStr for Selector {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Selector::parse(s)
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Selector::ByTag(tag) => write!(f, "{tag}"),
            Selector::ByTagAndAttribute {
                tag,
                attr,
                value: None,
            } => write!(f, "{tag}[{attr}]"),
            Selector::ByTagAndAttribute {
                tag,
                attr,
                value: Some(value),
            } => write!(f, "{tag}[{attr}=\"{value}\"]"),
        }
    }
}

fn is_name(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == ':')
}

/// Handlers grouped by tag name
#[derive(Clone, Default)]
pub struct Registry {
    by_tag: HashMap<String, Vec<(Selector, Handler)>>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a handler, replacing any handler under an equal selector
    pub fn insert(&mut self, selector: Selector, handler: Handler) {
        let entries = self.by_tag.entry(selector.tag().to_string()).or_default();
        entries.retain(|(existing, _)| *existing != selector);
        entries.push((selector, handler));
    }

    /// Parse `key` and register `handler` under it
    pub fn register<F>(&mut self, key: &str, handler: F) -> Result<(), ConversionError>
    where
        F: Fn(&HandlerContext<'_>) -> String + Send + Sync + 'static,
    {
        let selector = Selector::parse(key)?;
        self.insert(selector, Arc::new(handler));
        Ok(())
    }

    /// Register several handlers in iteration order
    ///
    /// Stops at the first invalid key; handlers before it stay registered.
    pub fn register_bulk<'k, I>(&mut self, handlers: I) -> Result<(), ConversionError>
    where
        I: IntoIterator<Item = (&'k str, Handler)>,
    {
        for (key, handler) in handlers {
            let selector = Selector::parse(key)?;
            self.insert(selector, handler);
        }
        Ok(())
    }

    /// Find the handler for an element
    pub fn resolve(&self, element: &Element) -> Option<&Handler> {
        let entries = self.by_tag.get(&element.name)?;

        entries
            .iter()
            .rev()
            .find(|(selector, _)| {
                matches!(selector, Selector::ByTagAndAttribute { .. }) && selector.matches(element)
            })
            .or_else(|| {
                entries
                    .iter()
                    .find(|(selector, _)| matches!(selector, Selector::ByTag(_)))
            })
            .map(|(_, handler)| handler)
    }

    /// Number of registered selectors
    pub fn len(&self) -> usize {
        self.by_tag.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn contains(&self, selector: &Selector) -> bool {
        self.by_tag
            .get(selector.tag())
            .is_some_and(|entries| entries.iter().any(|(s, _)| s == selector))
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut selectors: Vec<String> = self
            .by_tag
            .values()
            .flatten()
            .map(|(selector, _)| selector.to_string())
            .collect();
        selectors.sort();
        f.debug_struct("Registry")
            .field("selectors", &selectors)
            .finish()
    }
}
