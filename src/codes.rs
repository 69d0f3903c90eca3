// 📚 Code Registry - wall and window construction codes
// Codes are looked up by identifier from Wall/Window components. The maps are
// passed explicitly into those parsers; entries are shared, never owned.

use std::collections::HashMap;
use std::sync::Arc;

use crate::element::XmlNode;
use crate::error::{ComponentContext, ComponentKind, ElementGetValueError, InvalidEmbeddedDataTypeError};
use crate::units::Bilingual;

#[derive(Debug, Clone, PartialEq)]
pub struct WallCode {
    pub identifier: String,
    pub label: Option<String>,
    pub structure_type: Bilingual,
    pub component_type_size: Bilingual,
}

impl WallCode {
    pub fn from_data(node: &XmlNode) -> Result<Self, InvalidEmbeddedDataTypeError> {
        let kind = ComponentKind::WallCode;
        Ok(WallCode {
            identifier: node.get_text("@id").component(kind)?,
            label: node.find_text("Label"),
            structure_type: Bilingual::from_node(node, "Layers/StructureType").component(kind)?,
            component_type_size: Bilingual::from_node(node, "Layers/ComponentTypeSize")
                .component(kind)?,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct WindowCode {
    pub identifier: String,
    pub label: Option<String>,
    pub glazing_type: Option<Bilingual>,
    pub coating_tint: Option<Bilingual>,
    pub fill_type: Option<Bilingual>,
    pub spacer_type: Option<Bilingual>,
    pub window_code_type: Option<Bilingual>,
    pub frame_material: Option<Bilingual>,
}

/// Bilingual sub-field that may be absent; present-but-incomplete still fails
fn optional_bilingual(node: &XmlNode, path: &str) -> Result<Option<Bilingual>, ElementGetValueError> {
    if node.xpath(path).is_empty() {
        return Ok(None);
    }
    Bilingual::from_node(node, path).map(Some)
}

impl WindowCode {
    pub fn from_data(node: &XmlNode) -> Result<Self, InvalidEmbeddedDataTypeError> {
        let kind = ComponentKind::WindowCode;
        Ok(WindowCode {
            identifier: node.get_text("@id").component(kind)?,
            label: node.find_text("Label"),
            glazing_type: optional_bilingual(node, "Layers/GlazingTypes").component(kind)?,
            coating_tint: optional_bilingual(node, "Layers/CoatingsTints").component(kind)?,
            fill_type: optional_bilingual(node, "Layers/FillType").component(kind)?,
            spacer_type: optional_bilingual(node, "Layers/SpacerType").component(kind)?,
            window_code_type: optional_bilingual(node, "Layers/Type").component(kind)?,
            frame_material: optional_bilingual(node, "Layers/FrameMaterial").component(kind)?,
        })
    }
}

// ============================================================================
// REGISTRY
// ============================================================================

#[derive(Debug, Clone, Default)]
pub struct Codes {
    pub wall: HashMap<String, Arc<WallCode>>,
    pub window: HashMap<String, Arc<WindowCode>>,
}

impl Codes {
    /// Unknown identifiers resolve to `None`; code tables are known to be incomplete
    pub fn wall_code(&self, identifier: Option<&str>) -> Option<Arc<WallCode>> {
        identifier.and_then(|id| self.wall.get(id)).cloned()
    }

    pub fn window_code(&self, identifier: Option<&str>) -> Option<Arc<WindowCode>> {
        identifier.and_then(|id| self.window.get(id)).cloned()
    }
}

pub fn build_codes(
    wall_nodes: &[XmlNode],
    window_nodes: &[XmlNode],
) -> Result<Codes, InvalidEmbeddedDataTypeError> {
    let mut codes = Codes::default();

    for node in wall_nodes {
        let code = WallCode::from_data(node)?;
        codes.wall.insert(code.identifier.clone(), Arc::new(code));
    }

    for node in window_nodes {
        let code = WindowCode::from_data(node)?;
        codes.window.insert(code.identifier.clone(), Arc::new(code));
    }

    Ok(codes)
}
