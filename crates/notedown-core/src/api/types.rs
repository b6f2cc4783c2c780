//! Notion wire data model
//!
//! Blocks arrive from the API as objects with a discriminated `type` field
//! and the typed payload under a key of the same name. [`BlockKind`] is the
//! closed tagged union over the kinds this exporter understands, with an
//! explicit [`BlockKind::Unsupported`] arm so unknown kinds degrade to
//! plain text instead of being silently dropped.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;

/// One inline span of annotated text
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct RichText {
    #[serde(default)]
    pub plain_text: String,
    #[serde(default)]
    pub annotations: Annotations,
    #[serde(default)]
    pub href: Option<String>,
}

impl RichText {
    /// An unannotated span, mostly useful in tests and fixtures
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            plain_text: text.into(),
            ..Self::default()
        }
    }
}

/// Inline formatting flags; independent and freely composable
#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
pub struct Annotations {
    #[serde(default)]
    pub bold: bool,
    #[serde(default)]
    pub italic: bool,
    #[serde(default)]
    pub strikethrough: bool,
    #[serde(default)]
    pub underline: bool,
    #[serde(default)]
    pub code: bool,
}

/// Block or callout icon
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Icon {
    Emoji { emoji: String },
    #[serde(other)]
    Other,
}

/// A content block from the document tree
///
/// Children, if any, are fetched lazily via the document store; the
/// `has_children` flag signals whether a fetch is needed.
#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    pub id: String,
    pub has_children: bool,
    pub kind: BlockKind,
}

/// The typed payload of a block, discriminated by the API `type` field
#[derive(Debug, Clone, PartialEq)]
pub enum BlockKind {
    Paragraph { rich_text: Vec<RichText> },
    Heading1 { rich_text: Vec<RichText> },
    Heading2 { rich_text: Vec<RichText> },
    Heading3 { rich_text: Vec<RichText> },
    BulletedListItem { rich_text: Vec<RichText> },
    NumberedListItem { rich_text: Vec<RichText> },
    ToDo { rich_text: Vec<RichText>, checked: bool },
    Toggle { rich_text: Vec<RichText> },
    Code { rich_text: Vec<RichText>, language: String },
    Quote { rich_text: Vec<RichText> },
    Callout { rich_text: Vec<RichText>, icon: Option<Icon> },
    Divider,
    Image { url: Option<String>, caption: Vec<RichText> },
    Bookmark { url: String, caption: Vec<RichText> },
    ChildPage { title: String },
    ChildDatabase { title: String },
    /// Any kind this exporter has no rendering for; keeps whatever
    /// rich_text the payload carried so it can degrade to plain text
    Unsupported { kind: String, rich_text: Vec<RichText> },
}

#[derive(Deserialize, Default)]
struct TextPayload {
    #[serde(default)]
    rich_text: Vec<RichText>,
}

#[derive(Deserialize, Default)]
struct ToDoPayload {
    #[serde(default)]
    rich_text: Vec<RichText>,
    #[serde(default)]
    checked: bool,
}

#[derive(Deserialize, Default)]
struct CodePayload {
    #[serde(default)]
    rich_text: Vec<RichText>,
    #[serde(default)]
    language: String,
}

#[derive(Deserialize, Default)]
struct CalloutPayload {
    #[serde(default)]
    rich_text: Vec<RichText>,
    #[serde(default)]
    icon: Option<Icon>,
}

#[derive(Deserialize)]
struct FileUrl {
    url: String,
}

#[derive(Deserialize, Default)]
struct ImagePayload {
    #[serde(default)]
    caption: Vec<RichText>,
    file: Option<FileUrl>,
    external: Option<FileUrl>,
}

#[derive(Deserialize, Default)]
struct BookmarkPayload {
    #[serde(default)]
    url: String,
    #[serde(default)]
    caption: Vec<RichText>,
}

#[derive(Deserialize, Default)]
struct TitlePayload {
    #[serde(default)]
    title: String,
}

impl BlockKind {
    /// Build the tagged union from the API `type` string and its payload.
    ///
    /// A malformed payload degrades to the variant's default rather than
    /// failing the surrounding block listing.
    fn from_payload(kind: &str, payload: Value) -> Self {
        fn decode<T: serde::de::DeserializeOwned + Default>(payload: Value) -> T {
            serde_json::from_value(payload).unwrap_or_default()
        }

        match kind {
            "paragraph" => {
                let p: TextPayload = decode(payload);
                BlockKind::Paragraph {
                    rich_text: p.rich_text,
                }
            }
            "heading_1" => {
                let p: TextPayload = decode(payload);
                BlockKind::Heading1 {
                    rich_text: p.rich_text,
                }
            }
            "heading_2" => {
                let p: TextPayload = decode(payload);
                BlockKind::Heading2 {
                    rich_text: p.rich_text,
                }
            }
            "heading_3" => {
                let p: TextPayload = decode(payload);
                BlockKind::Heading3 {
                    rich_text: p.rich_text,
                }
            }
            "bulleted_list_item" => {
                let p: TextPayload = decode(payload);
                BlockKind::BulletedListItem {
                    rich_text: p.rich_text,
                }
            }
            "numbered_list_item" => {
                let p: TextPayload = decode(payload);
                BlockKind::NumberedListItem {
                    rich_text: p.rich_text,
                }
            }
            "to_do" => {
                let p: ToDoPayload = decode(payload);
                BlockKind::ToDo {
                    rich_text: p.rich_text,
                    checked: p.checked,
                }
            }
            "toggle" => {
                let p: TextPayload = decode(payload);
                BlockKind::Toggle {
                    rich_text: p.rich_text,
                }
            }
            "code" => {
                let p: CodePayload = decode(payload);
                BlockKind::Code {
                    rich_text: p.rich_text,
                    language: p.language,
                }
            }
            "quote" => {
                let p: TextPayload = decode(payload);
                BlockKind::Quote {
                    rich_text: p.rich_text,
                }
            }
            "callout" => {
                let p: CalloutPayload = decode(payload);
                BlockKind::Callout {
                    rich_text: p.rich_text,
                    icon: p.icon,
                }
            }
            "divider" => BlockKind::Divider,
            "image" => {
                let p: ImagePayload = decode(payload);
                let url = p
                    .file
                    .map(|f| f.url)
                    .or_else(|| p.external.map(|e| e.url))
                    .filter(|u| !u.is_empty());
                BlockKind::Image {
                    url,
                    caption: p.caption,
                }
            }
            "bookmark" => {
                let p: BookmarkPayload = decode(payload);
                BlockKind::Bookmark {
                    url: p.url,
                    caption: p.caption,
                }
            }
            "child_page" => {
                let p: TitlePayload = decode(payload);
                BlockKind::ChildPage { title: p.title }
            }
            "child_database" => {
                let p: TitlePayload = decode(payload);
                BlockKind::ChildDatabase { title: p.title }
            }
            other => {
                let p: TextPayload = decode(payload);
                BlockKind::Unsupported {
                    kind: other.to_string(),
                    rich_text: p.rich_text,
                }
            }
        }
    }
}

#[derive(Deserialize)]
struct RawBlock {
    id: String,
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    has_children: bool,
    #[serde(flatten)]
    payload: serde_json::Map<String, Value>,
}

impl<'de> Deserialize<'de> for Block {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = RawBlock::deserialize(deserializer)?;
        let payload = raw.payload.get(&raw.kind).cloned().unwrap_or(Value::Null);
        Ok(Block {
            id: raw.id,
            has_children: raw.has_children,
            kind: BlockKind::from_payload(&raw.kind, payload),
        })
    }
}

/// Option of a select / multi-select property
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct SelectOption {
    pub name: String,
}

/// Value of a date property; `start` is the date the exporter cares about
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct DateValue {
    #[serde(default)]
    pub start: Option<String>,
}

/// A page property, discriminated by the API `type` field
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Property {
    Title {
        #[serde(default)]
        title: Vec<RichText>,
    },
    #[serde(rename = "rich_text", alias = "text")]
    Text {
        #[serde(default)]
        rich_text: Vec<RichText>,
    },
    Select {
        select: Option<SelectOption>,
    },
    MultiSelect {
        #[serde(default)]
        multi_select: Vec<SelectOption>,
    },
    Date {
        date: Option<DateValue>,
    },
    Checkbox {
        checkbox: bool,
    },
    Number {
        number: Option<f64>,
    },
    Url {
        url: Option<String>,
    },
    Email {
        email: Option<String>,
    },
    PhoneNumber {
        phone_number: Option<String>,
    },
    CreatedTime {
        created_time: String,
    },
    LastEditedTime {
        last_edited_time: String,
    },
    #[serde(other)]
    Unsupported,
}

/// Parent reference of a page
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Parent {
    PageId { page_id: String },
    DatabaseId { database_id: String },
    BlockId { block_id: String },
    Workspace,
    #[serde(other)]
    Other,
}

/// A page record, either standalone or a database entry
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct Page {
    pub id: String,
    pub created_time: DateTime<Utc>,
    pub last_edited_time: DateTime<Utc>,
    #[serde(default)]
    pub parent: Option<Parent>,
    #[serde(default)]
    pub properties: HashMap<String, Property>,
}

/// One page of a paginated API response
#[derive(Debug, Clone, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
pub struct Paginated<T> {
    #[serde(default)]
    pub results: Vec<T>,
    #[serde(default)]
    pub has_more: bool,
    #[serde(default)]
    pub next_cursor: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paragraph_block_decodes() {
        let json = serde_json::json!({
            "object": "block",
            "id": "b1",
            "type": "paragraph",
            "has_children": false,
            "paragraph": {
                "rich_text": [
                    {"plain_text": "hello", "annotations": {"bold": true}}
                ]
            }
        });

        let block: Block = serde_json::from_value(json).unwrap();
        assert_eq!(block.id, "b1");
        assert!(!block.has_children);
        match block.kind {
            BlockKind::Paragraph { rich_text } => {
                assert_eq!(rich_text.len(), 1);
                assert_eq!(rich_text[0].plain_text, "hello");
                assert!(rich_text[0].annotations.bold);
                assert!(!rich_text[0].annotations.italic);
            }
            other => panic!("expected paragraph, got {:?}", other),
        }
    }

    #[test]
    fn test_todo_block_decodes_checked() {
        let json = serde_json::json!({
            "id": "b2",
            "type": "to_do",
            "has_children": false,
            "to_do": {"rich_text": [{"plain_text": "task"}], "checked": true}
        });

        let block: Block = serde_json::from_value(json).unwrap();
        assert_eq!(
            block.kind,
            BlockKind::ToDo {
                rich_text: vec![RichText::plain("task")],
                checked: true
            }
        );
    }

    #[test]
    fn test_image_block_prefers_file_url() {
        let json = serde_json::json!({
            "id": "b3",
            "type": "image",
            "image": {
                "file": {"url": "https://files.notion.so/pic.png"},
                "external": {"url": "https://example.com/other.png"},
                "caption": []
            }
        });

        let block: Block = serde_json::from_value(json).unwrap();
        match block.kind {
            BlockKind::Image { url, .. } => {
                assert_eq!(url.as_deref(), Some("https://files.notion.so/pic.png"));
            }
            other => panic!("expected image, got {:?}", other),
        }
    }

    #[test]
    fn test_unknown_kind_degrades_to_unsupported() {
        let json = serde_json::json!({
            "id": "b4",
            "type": "synced_block",
            "has_children": true,
            "synced_block": {"rich_text": [{"plain_text": "inner"}]}
        });

        let block: Block = serde_json::from_value(json).unwrap();
        assert!(block.has_children);
        match block.kind {
            BlockKind::Unsupported { kind, rich_text } => {
                assert_eq!(kind, "synced_block");
                assert_eq!(rich_text[0].plain_text, "inner");
            }
            other => panic!("expected unsupported, got {:?}", other),
        }
    }

    #[test]
    fn test_divider_ignores_empty_payload() {
        let json = serde_json::json!({"id": "b5", "type": "divider", "divider": {}});
        let block: Block = serde_json::from_value(json).unwrap();
        assert_eq!(block.kind, BlockKind::Divider);
    }

    #[test]
    fn test_malformed_payload_degrades_to_default() {
        // rich_text is a string instead of an array; the block still decodes
        let json = serde_json::json!({
            "id": "b6",
            "type": "quote",
            "quote": {"rich_text": "not-an-array"}
        });

        let block: Block = serde_json::from_value(json).unwrap();
        assert_eq!(block.kind, BlockKind::Quote { rich_text: vec![] });
    }

    #[test]
    fn test_callout_emoji_icon() {
        let json = serde_json::json!({
            "id": "b7",
            "type": "callout",
            "callout": {
                "rich_text": [{"plain_text": "note"}],
                "icon": {"type": "emoji", "emoji": "⚠️"}
            }
        });

        let block: Block = serde_json::from_value(json).unwrap();
        match block.kind {
            BlockKind::Callout { icon, .. } => {
                assert_eq!(
                    icon,
                    Some(Icon::Emoji {
                        emoji: "⚠️".to_string()
                    })
                );
            }
            other => panic!("expected callout, got {:?}", other),
        }
    }

    #[test]
    fn test_page_decodes_with_properties() {
        let json = serde_json::json!({
            "id": "p1",
            "created_time": "2024-01-15T10:00:00.000Z",
            "last_edited_time": "2024-02-01T12:30:00.000Z",
            "parent": {"type": "database_id", "database_id": "db9"},
            "properties": {
                "Name": {"type": "title", "title": [{"plain_text": "My Post"}]},
                "Ready": {"type": "checkbox", "checkbox": true},
                "Weird": {"type": "rollup", "rollup": {}}
            }
        });

        let page: Page = serde_json::from_value(json).unwrap();
        assert_eq!(page.id, "p1");
        assert_eq!(
            page.parent,
            Some(Parent::DatabaseId {
                database_id: "db9".to_string()
            })
        );
        assert!(matches!(
            page.properties.get("Name"),
            Some(Property::Title { .. })
        ));
        assert!(matches!(
            page.properties.get("Ready"),
            Some(Property::Checkbox { checkbox: true })
        ));
        assert!(matches!(
            page.properties.get("Weird"),
            Some(Property::Unsupported)
        ));
    }

    #[test]
    fn test_text_property_accepts_both_type_names() {
        let rich: Property = serde_json::from_value(serde_json::json!(
            {"type": "rich_text", "rich_text": [{"plain_text": "a"}]}
        ))
        .unwrap();
        let text: Property = serde_json::from_value(serde_json::json!(
            {"type": "text", "rich_text": [{"plain_text": "a"}]}
        ))
        .unwrap();

        assert_eq!(rich, text);
    }

    #[test]
    fn test_paginated_defaults() {
        let page: Paginated<Block> = serde_json::from_str(r#"{"results": []}"#).unwrap();
        assert!(page.results.is_empty());
        assert!(!page.has_more);
        assert!(page.next_cursor.is_none());
    }
}
