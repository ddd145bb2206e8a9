use serde::{Deserialize, Serialize};
use ts_rs::TS;
use utoipa::ToSchema;

/// TemplateId
///
/// The closed set of post layouts the frontend can render. Stored on each post
/// as its string form; parsed back through the registry on every write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS, ToSchema)]
#[serde(rename_all = "lowercase")]
#[ts(export)]
pub enum TemplateId {
    /// Text-led travel diary with inline media.
    Journal,
    /// Photo-grid layout, captions below.
    Gallery,
    /// Route map header with stops as sections.
    Map,
}

impl TemplateId {
    pub fn as_str(&self) -> &'static str {
        match self {
            TemplateId::Journal => "journal",
            TemplateId::Gallery => "gallery",
            TemplateId::Map => "map",
        }
    }
}

/// TemplateDescriptor
///
/// Frontend-facing metadata for one template.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct TemplateDescriptor {
    pub id: TemplateId,
    pub label: &'static str,
    /// Rendering hint: which content kind the layout leads with.
    pub leads_with: &'static str,
}

/// TemplateRegistry
///
/// Enum-keyed dispatch table constructed once at startup and shared immutably
/// through the application state. There is no runtime registration path.
#[derive(Debug, Clone)]
pub struct TemplateRegistry {
    entries: Vec<TemplateDescriptor>,
}

/// TemplateState
///
/// The concrete type used to share the registry across the application state.
pub type TemplateState = std::sync::Arc<TemplateRegistry>;

impl TemplateRegistry {
    pub fn new() -> Self {
        Self {
            entries: vec![
                TemplateDescriptor {
                    id: TemplateId::Journal,
                    label: "Reisetagebuch",
                    leads_with: "text",
                },
                TemplateDescriptor {
                    id: TemplateId::Gallery,
                    label: "Fotogalerie",
                    leads_with: "photo",
                },
                TemplateDescriptor {
                    id: TemplateId::Map,
                    label: "Routenkarte",
                    leads_with: "map",
                },
            ],
        }
    }

    /// The template assigned to new posts that don't specify one.
    pub fn default_id(&self) -> TemplateId {
        TemplateId::Journal
    }

    pub fn entries(&self) -> &[TemplateDescriptor] {
        &self.entries
    }

    /// Resolves a stored/supplied template id string. Unknown ids are a
    /// validation failure at the handler boundary.
    pub fn resolve(&self, id: &str) -> Option<TemplateId> {
        self.entries
            .iter()
            .map(|e| e.id)
            .find(|t| t.as_str() == id)
    }
}

impl Default for TemplateRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_known_and_unknown_ids() {
        let reg = TemplateRegistry::new();
        assert_eq!(reg.resolve("journal"), Some(TemplateId::Journal));
        assert_eq!(reg.resolve("gallery"), Some(TemplateId::Gallery));
        assert_eq!(reg.resolve("polaroid"), None);
    }

    #[test]
    fn every_entry_resolves_to_itself() {
        let reg = TemplateRegistry::new();
        for entry in reg.entries() {
            assert_eq!(reg.resolve(entry.id.as_str()), Some(entry.id));
        }
    }
}
