//! Minimal selector parsing and matching
//!
//! Supports the handful of forms the popup structural contract needs:
//! `#id`, `.class`, `tag`, `[attr]` and `[attr="value"]`. Combinators
//! are deliberately out of scope.

use super::node::Element;
use thiserror::Error;

/// A parsed simple selector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selector {
    /// `#some-id`
    Id(String),
    /// `.some-class`
    Class(String),
    /// `tagname`
    Tag(String),
    /// `[attr]` or `[attr="value"]`
    Attr {
        name: String,
        value: Option<String>,
    },
}

/// Errors produced when a selector string cannot be parsed.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SelectorError {
    #[error("empty selector")]
    Empty,

    #[error("unterminated attribute selector: {0}")]
    UnterminatedAttribute(String),

    #[error("unsupported selector syntax: {0}")]
    Unsupported(String),
}

impl Selector {
    /// Parse a selector string into one of the supported forms.
    pub fn parse(input: &str) -> Result<Self, SelectorError> {
        let input = input.trim();
        if input.is_empty() {
            return Err(SelectorError::Empty);
        }

        // Combinators and selector lists are not supported.
        if input.contains(|c: char| c.is_whitespace()) || input.contains(',') || input.contains('>')
        {
            return Err(SelectorError::Unsupported(input.to_string()));
        }

        if let Some(id) = input.strip_prefix('#') {
            if id.is_empty() {
                return Err(SelectorError::Unsupported(input.to_string()));
            }
            return Ok(Self::Id(id.to_string()));
        }

        if let Some(class) = input.strip_prefix('.') {
            if class.is_empty() {
                return Err(SelectorError::Unsupported(input.to_string()));
            }
            return Ok(Self::Class(class.to_string()));
        }

        if let Some(body) = input.strip_prefix('[') {
            let body = body
                .strip_suffix(']')
                .ok_or_else(|| SelectorError::UnterminatedAttribute(input.to_string()))?;
            if body.is_empty() {
                return Err(SelectorError::Unsupported(input.to_string()));
            }
            return match body.split_once('=') {
                Some((name, raw_value)) => {
                    let value = raw_value.trim_matches('"').trim_matches('\'');
                    Ok(Self::Attr {
                        name: name.trim().to_string(),
                        value: Some(value.to_string()),
                    })
                }
                None => Ok(Self::Attr {
                    name: body.trim().to_string(),
                    value: None,
                }),
            };
        }

        if input
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        {
            return Ok(Self::Tag(input.to_ascii_lowercase()));
        }

        Err(SelectorError::Unsupported(input.to_string()))
    }

    /// Convenience constructor for attribute-presence selectors.
    pub fn attr(name: impl Into<String>) -> Self {
        Self::Attr {
            name: name.into(),
            value: None,
        }
    }

    /// Convenience constructor for class selectors.
    pub fn class(name: impl Into<String>) -> Self {
        Self::Class(name.into())
    }

    /// Check whether an element matches this selector.
    pub fn matches(&self, element: &Element) -> bool {
        match self {
            Self::Id(id) => element.id() == Some(id.as_str()),
            Self::Class(class) => element.has_class(class),
            Self::Tag(tag) => element.tag().eq_ignore_ascii_case(tag),
            Self::Attr { name, value } => match value {
                Some(value) => element.attribute(name) == Some(value.as_str()),
                None => element.has_attribute(name),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_id_selector() {
        assert_eq!(
            Selector::parse("#popup-book"),
            Ok(Selector::Id("popup-book".to_string()))
        );
    }

    #[test]
    fn test_parse_class_and_tag() {
        assert_eq!(
            Selector::parse(".popup-overlay"),
            Ok(Selector::Class("popup-overlay".to_string()))
        );
        assert_eq!(Selector::parse("h2"), Ok(Selector::Tag("h2".to_string())));
    }

    #[test]
    fn test_parse_attribute_forms() {
        assert_eq!(
            Selector::parse("[data-popup-close]"),
            Ok(Selector::Attr {
                name: "data-popup-close".to_string(),
                value: None,
            })
        );
        assert_eq!(
            Selector::parse("[data-popup-target=\"#popup-book\"]"),
            Ok(Selector::Attr {
                name: "data-popup-target".to_string(),
                value: Some("#popup-book".to_string()),
            })
        );
    }

    #[test]
    fn test_parse_rejects_bad_input() {
        assert_eq!(Selector::parse(""), Err(SelectorError::Empty));
        assert_eq!(Selector::parse("   "), Err(SelectorError::Empty));
        assert!(matches!(
            Selector::parse("div > span"),
            Err(SelectorError::Unsupported(_))
        ));
        assert!(matches!(
            Selector::parse("[data-popup-close"),
            Err(SelectorError::UnterminatedAttribute(_))
        ));
    }

    #[test]
    fn test_matches() {
        let el = Element::new("button")
            .with_id("cta")
            .with_class("btn")
            .with_attr("data-popup-target", "#popup-book");

        assert!(Selector::parse("#cta").unwrap().matches(&el));
        assert!(Selector::parse(".btn").unwrap().matches(&el));
        assert!(Selector::parse("button").unwrap().matches(&el));
        assert!(Selector::parse("[data-popup-target]").unwrap().matches(&el));
        assert!(Selector::parse("[data-popup-target=\"#popup-book\"]")
            .unwrap()
            .matches(&el));
        assert!(!Selector::parse("#other").unwrap().matches(&el));
    }
}
