//! Settings-page descriptor for the watch configuration host
//! Mirrors the Clay wire format: an ordered array of tagged element objects

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use thiserror::Error;

/// One element of the settings form, tagged by `type` on the wire
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase", rename_all_fields = "camelCase")]
pub enum PageElement {
    Heading {
        default_value: String,
    },
    Text {
        default_value: String,
    },
    Section {
        items: Vec<PageElement>,
    },
    Toggle {
        message_key: String,
        label: String,
        default_value: bool,
    },
    Submit {
        default_value: String,
    },
}

/// The full descriptor: an ordered sequence of elements, built once and
/// never mutated afterwards
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SettingsPage(Vec<PageElement>);

#[derive(Debug, Error, PartialEq)]
pub enum DescriptorError {
    #[error("duplicate message key: {0}")]
    DuplicateMessageKey(String),
    #[error("toggle {label:?} has an empty message key")]
    EmptyMessageKey { label: String },
    #[error("section contains no items")]
    EmptySection,
}

impl SettingsPage {
    /// The built-in configuration page served to the host renderer
    pub fn builtin() -> Self {
        SettingsPage(vec![
            PageElement::Heading {
                default_value: "App Configuration".to_string(),
            },
            PageElement::Text {
                default_value: "Blah blah blah".to_string(),
            },
            PageElement::Section {
                items: vec![
                    PageElement::Heading {
                        default_value: "Settings".to_string(),
                    },
                    PageElement::Toggle {
                        message_key: "ShowDate".to_string(),
                        label: "Show date".to_string(),
                        default_value: true,
                    },
                ],
            },
            PageElement::Submit {
                default_value: "Save Settings".to_string(),
            },
        ])
    }

    /// Check the descriptor invariants: message keys must be non-empty and
    /// unique across the whole page, sections must not be empty
    pub fn validate(&self) -> Result<(), DescriptorError> {
        let mut seen = HashSet::new();
        Self::validate_slice(&self.0, &mut seen)
    }

    fn validate_slice<'a>(
        elements: &'a [PageElement],
        seen: &mut HashSet<&'a str>,
    ) -> Result<(), DescriptorError> {
        for element in elements {
            match element {
                PageElement::Toggle {
                    message_key, label, ..
                } => {
                    if message_key.is_empty() {
                        return Err(DescriptorError::EmptyMessageKey {
                            label: label.clone(),
                        });
                    }
                    if !seen.insert(message_key) {
                        return Err(DescriptorError::DuplicateMessageKey(message_key.clone()));
                    }
                }
                PageElement::Section { items } => {
                    if items.is_empty() {
                        return Err(DescriptorError::EmptySection);
                    }
                    Self::validate_slice(items, seen)?;
                }
                _ => {}
            }
        }
        Ok(())
    }

    /// All toggles on the page, sections flattened in document order
    pub fn toggles(&self) -> Vec<ToggleRef<'_>> {
        let mut out = Vec::new();
        Self::collect_toggles(&self.0, &mut out);
        out
    }

    fn collect_toggles<'a>(elements: &'a [PageElement], out: &mut Vec<ToggleRef<'a>>) {
        for element in elements {
            match element {
                PageElement::Toggle {
                    message_key,
                    label,
                    default_value,
                } => out.push(ToggleRef {
                    message_key,
                    label,
                    default_value: *default_value,
                }),
                PageElement::Section { items } => Self::collect_toggles(items, out),
                _ => {}
            }
        }
    }

    /// Serialize for the configuration host
    pub fn to_json(&self, pretty: bool) -> serde_json::Result<String> {
        if pretty {
            serde_json::to_string_pretty(self)
        } else {
            serde_json::to_string(self)
        }
    }
}

/// Borrowed view of a toggle element
#[derive(Debug, Clone, Copy)]
pub struct ToggleRef<'a> {
    pub message_key: &'a str,
    pub label: &'a str,
    pub default_value: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_page_is_valid() {
        SettingsPage::builtin().validate().unwrap();
    }

    #[test]
    fn builtin_page_wire_shape() {
        let json = SettingsPage::builtin().to_json(false).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        let elements = value.as_array().unwrap();
        assert_eq!(elements.len(), 4);
        assert_eq!(elements[0]["type"], "heading");
        assert_eq!(elements[0]["defaultValue"], "App Configuration");
        assert_eq!(elements[3]["type"], "submit");
        assert_eq!(elements[3]["defaultValue"], "Save Settings");

        let toggle = &elements[2]["items"][1];
        assert_eq!(toggle["type"], "toggle");
        assert_eq!(toggle["messageKey"], "ShowDate");
        assert_eq!(toggle["label"], "Show date");
        assert_eq!(toggle["defaultValue"], true);
    }

    #[test]
    fn round_trip_preserves_structure() {
        let page = SettingsPage::builtin();
        let json = page.to_json(true).unwrap();
        let restored: SettingsPage = serde_json::from_str(&json).unwrap();
        assert_eq!(page, restored);
    }

    #[test]
    fn toggles_are_flattened_out_of_sections() {
        let page = SettingsPage::builtin();
        let toggles = page.toggles();
        assert_eq!(toggles.len(), 1);
        assert_eq!(toggles[0].message_key, "ShowDate");
        assert!(toggles[0].default_value);
    }

    #[test]
    fn duplicate_message_key_is_rejected() {
        let page = SettingsPage(vec![
            PageElement::Toggle {
                message_key: "ShowDate".to_string(),
                label: "Show date".to_string(),
                default_value: true,
            },
            PageElement::Section {
                items: vec![PageElement::Toggle {
                    message_key: "ShowDate".to_string(),
                    label: "Also show date".to_string(),
                    default_value: false,
                }],
            },
        ]);
        assert_eq!(
            page.validate(),
            Err(DescriptorError::DuplicateMessageKey("ShowDate".to_string()))
        );
    }

    #[test]
    fn empty_message_key_is_rejected() {
        let page = SettingsPage(vec![PageElement::Toggle {
            message_key: String::new(),
            label: "Broken".to_string(),
            default_value: false,
        }]);
        assert_eq!(
            page.validate(),
            Err(DescriptorError::EmptyMessageKey {
                label: "Broken".to_string()
            })
        );
    }

    #[test]
    fn empty_section_is_rejected() {
        let page = SettingsPage(vec![PageElement::Section { items: vec![] }]);
        assert_eq!(page.validate(), Err(DescriptorError::EmptySection));
    }

    #[test]
    fn unknown_element_type_fails_to_parse() {
        let err = serde_json::from_str::<SettingsPage>(r#"[{"type": "slider", "defaultValue": 3}]"#);
        assert!(err.is_err());
    }
}
