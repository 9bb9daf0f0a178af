//! MemoryRecord - Strategic notes an agent carries between its own turns

use serde::{Deserialize, Serialize};

/// Section headings of the memory template
pub const MEMORY_SECTIONS: [&str; 4] = [
    "Phase Assessment",
    "Opponent Model",
    "Plan",
    "Critical Moments",
];

/// Starting content for an agent with no prior memory
///
/// The sections are a convention, not a schema: agents may rewrite the blob
/// freely and nothing validates it.
pub const MEMORY_TEMPLATE: &str = "\
## Phase Assessment
(none yet)

## Opponent Model
(none yet)

## Plan
(none yet)

## Critical Moments
(none yet)
";

/// Working memory for one (game, player) pair
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemoryRecord {
    /// Free-form text, usually following `MEMORY_TEMPLATE`
    pub content: String,
    /// Ply number of the turn that produced this content (0 = template)
    pub last_updated_turn: u32,
}

impl MemoryRecord {
    pub fn new(content: impl Into<String>, last_updated_turn: u32) -> Self {
        Self {
            content: content.into(),
            last_updated_turn,
        }
    }

    /// Fresh record built from the template
    pub fn template() -> Self {
        Self::new(MEMORY_TEMPLATE, 0)
    }

    pub fn is_blank(&self) -> bool {
        self.content.trim().is_empty()
    }

    /// Body of a `## <name>` section, trimmed
    pub fn section(&self, name: &str) -> Option<&str> {
        let heading = format!("## {name}");
        let start = self
            .content
            .lines()
            .position(|line| line.trim() == heading)?;

        let mut offset = 0;
        let mut body_start = None;
        let mut body_end = self.content.len();
        for (i, line) in self.content.split_inclusive('\n').enumerate() {
            if i == start + 1 {
                body_start = Some(offset);
            }
            if i > start && line.trim_start().starts_with("## ") {
                body_end = offset;
                break;
            }
            offset += line.len();
        }

        let body_start = body_start?;
        Some(self.content[body_start..body_end].trim())
    }

    /// Copy of the content with one section replaced (appended if missing)
    pub fn with_section(&self, name: &str, body: &str) -> String {
        let heading = format!("## {name}");
        let mut out = String::new();
        let mut replaced = false;
        let mut skipping = false;

        for line in self.content.lines() {
            if line.trim() == heading {
                out.push_str(&heading);
                out.push('\n');
                out.push_str(body.trim());
                out.push_str("\n\n");
                replaced = true;
                skipping = true;
                continue;
            }
            if skipping {
                if line.trim_start().starts_with("## ") {
                    skipping = false;
                } else {
                    continue;
                }
            }
            out.push_str(line);
            out.push('\n');
        }

        if !replaced {
            if !out.is_empty() && !out.ends_with("\n\n") {
                out.push('\n');
            }
            out.push_str(&heading);
            out.push('\n');
            out.push_str(body.trim());
            out.push('\n');
        }

        out.trim_end().to_string() + "\n"
    }
}

impl Default for MemoryRecord {
    fn default() -> Self {
        Self::template()
    }
}
