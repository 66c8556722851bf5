//! Highlight groups for one document.
//!
//! Ranges are grouped per tag name; each group carries the resolved colors a
//! host needs to paint it.

use serde::Serialize;
use std::collections::HashMap;

use tagscan_buffer::TextRange;

use crate::config::HighlightConfig;
use crate::scanner::FoundTag;
use crate::tag::TagConfig;

/// Color lookup by upper-cased tag name.
#[derive(Debug, Clone)]
pub struct HighlightPalette {
    colors: HashMap<String, String>,
    default_color: String,
    background_alpha: String,
}

impl HighlightPalette {
    pub fn new<'a>(
        tags: impl IntoIterator<Item = &'a TagConfig>,
        config: &HighlightConfig,
    ) -> Self {
        let mut colors = HashMap::new();
        for tag in tags {
            if let Some(color) = &tag.color {
                // First configured entry wins, as in matching
                colors.entry(tag.name.to_uppercase()).or_insert_with(|| color.clone());
            }
        }

        Self {
            colors,
            default_color: config.default_color.clone(),
            background_alpha: config.background_alpha.clone(),
        }
    }

    /// Foreground color of a tag.
    pub fn color(&self, tag: &str) -> &str {
        self.colors
            .get(&tag.to_uppercase())
            .map_or(self.default_color.as_str(), String::as_str)
    }

    /// Background color: the tag color with the alpha suffix.
    pub fn background(&self, tag: &str) -> String {
        format!("{}{}", self.color(tag), self.background_alpha)
    }

    /// Groups a document's tags for painting, in first-seen order.
    pub fn highlights(&self, tags: &[FoundTag]) -> Vec<TagHighlight> {
        let mut groups: Vec<TagHighlight> = Vec::new();
        for found in tags {
            match groups.iter_mut().find(|g| g.tag == found.tag) {
                Some(group) => group.ranges.push(found.range),
                None => groups.push(TagHighlight {
                    tag: found.tag.clone(),
                    color: self.color(&found.tag).to_string(),
                    background: self.background(&found.tag),
                    border: format!("1px solid {}", self.color(&found.tag)),
                    ranges: vec![found.range],
                }),
            }
        }
        groups
    }
}

/// Ranges of one tag and how to paint them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TagHighlight {
    pub tag: String,
    pub color: String,
    pub background: String,
    pub border: String,
    pub ranges: Vec<TextRange>,
}
