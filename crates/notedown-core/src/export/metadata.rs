//! Page metadata extraction
//!
//! Property names are matched by case-insensitive substring, so "Category",
//! "Post Category" and "category" all feed the same field. Only the
//! title-typed property is matched by type alone.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::api::{Page, Property};
use crate::render::render_rich_text;

/// Fallback title for pages with no usable title property
pub const UNTITLED: &str = "Untitled";

/// A category property value, either a single select or a multi-select
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(untagged)]
pub enum Category {
    One(String),
    Many(Vec<String>),
}

/// Index entry for one exported page
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct PageMetadata {
    pub id: String,
    pub created_time: DateTime<Utc>,
    pub last_edited_time: DateTime<Utc>,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<Category>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub published_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub published: Option<bool>,
    pub ready: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub excerpt: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
}

/// Title of a page from its title-typed property, or [`UNTITLED`]
pub fn page_title(page: &Page) -> String {
    page.properties
        .values()
        .find_map(|prop| match prop {
            Property::Title { title } => {
                let rendered = render_rich_text(title).trim().to_string();
                (!rendered.is_empty()).then_some(rendered)
            }
            _ => None,
        })
        .unwrap_or_else(|| UNTITLED.to_string())
}

/// Extract the index metadata for a page
///
/// `ready` defaults to false when no checkbox property matches; the
/// `published` flag is informational only and never gates inclusion.
pub fn extract_metadata(page: &Page) -> PageMetadata {
    let mut metadata = PageMetadata {
        id: page.id.clone(),
        created_time: page.created_time,
        last_edited_time: page.last_edited_time,
        title: page_title(page),
        category: None,
        published_date: None,
        published: None,
        ready: false,
        excerpt: None,
        filename: None,
    };

    // Sorted for deterministic resolution when several names match
    let mut names: Vec<&String> = page.properties.keys().collect();
    names.sort();

    for name in names {
        let prop = &page.properties[name];
        let name_lower = name.to_lowercase();

        if name_lower.contains("category") {
            match prop {
                Property::Select {
                    select: Some(option),
                } => {
                    metadata.category = Some(Category::One(option.name.clone()));
                }
                Property::MultiSelect { multi_select } if !multi_select.is_empty() => {
                    metadata.category = Some(Category::Many(
                        multi_select.iter().map(|o| o.name.clone()).collect(),
                    ));
                }
                _ => {}
            }
        } else if name_lower.contains("published") {
            if let Property::Date { date } = prop {
                match date.as_ref().and_then(|d| d.start.clone()) {
                    Some(start) => {
                        metadata.published_date = Some(start);
                        metadata.published = Some(true);
                    }
                    None => {
                        metadata.published = Some(false);
                    }
                }
            }
        } else if name_lower.contains("ready") {
            if let Property::Checkbox { checkbox } = prop {
                metadata.ready = *checkbox;
            }
        } else if name_lower.contains("excerpt") {
            if let Property::Text { rich_text } = prop {
                let rendered = render_rich_text(rich_text).trim().to_string();
                if !rendered.is_empty() {
                    metadata.excerpt = Some(rendered);
                }
            }
        }
    }

    metadata
}
