use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Serializable description of an element subtree.
///
/// Used to load page snapshots handed over by the rendering side, to dump the page after a
/// replay, and to build the elements the client appends itself (new comments, flashes).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ElementSpec {
    pub tag: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub classes: Vec<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub attrs: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub text: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub value: String,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub disabled: bool,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub style: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<ElementSpec>,
}

impl ElementSpec {
    pub fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_lowercase(),
            ..Default::default()
        }
    }

    /// Add one or more whitespace separated classes
    pub fn class(mut self, classes: &str) -> Self {
        for class in classes.split_whitespace() {
            if !self.classes.iter().any(|c| c == class) {
                self.classes.push(class.to_string());
            }
        }
        self
    }

    pub fn attr(mut self, name: &str, value: impl Into<String>) -> Self {
        self.attrs.insert(name.to_string(), value.into());
        self
    }

    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    pub fn value(mut self, value: impl Into<String>) -> Self {
        self.value = value.into();
        self
    }

    pub fn disabled(mut self, disabled: bool) -> Self {
        self.disabled = disabled;
        self
    }

    pub fn child(mut self, child: ElementSpec) -> Self {
        self.children.push(child);
        self
    }

    /// Add a child only when `child` is `Some`
    pub fn child_opt(self, child: Option<ElementSpec>) -> Self {
        match child {
            Some(child) => self.child(child),
            None => self,
        }
    }
}

/// Snapshot of a whole page: the contents of `head` and `body`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PageSpec {
    #[serde(default)]
    pub head: Vec<ElementSpec>,
    #[serde(default)]
    pub body: Vec<ElementSpec>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_class_splits_and_dedups() {
        let spec = ElementSpec::new("button").class("action-btn like").class("like");
        assert_eq!(spec.classes, vec!["action-btn", "like"]);
    }

    #[test]
    fn test_page_spec_parses_minimal_json() {
        let json = r#"{"body": [{"tag": "div", "classes": ["post-card"], "attrs": {"data-post-id": "3"}}]}"#;
        let spec: PageSpec = serde_json::from_str(json).unwrap();

        assert!(spec.head.is_empty());
        assert_eq!(spec.body[0].attrs["data-post-id"], "3");
        assert!(spec.body[0].children.is_empty());
    }
}
