// ⬆️ Upgrade settings: one entry per upgrade type with cost and priority

use serde_json::{json, Value};

use crate::element::XmlNode;
use crate::error::{ComponentContext, ComponentKind, InvalidEmbeddedDataTypeError};

/// One upgrade-order setting; the element tag names the upgrade
#[derive(Debug, Clone, PartialEq)]
pub struct Upgrade {
    pub upgrade_type: String,
    pub cost: f64,
    pub priority: i64,
}

impl Upgrade {
    pub fn from_data(node: &XmlNode) -> Result<Self, InvalidEmbeddedDataTypeError> {
        let kind = ComponentKind::Upgrade;
        Ok(Upgrade {
            upgrade_type: node.tag().to_string(),
            cost: node.get_f64("@cost").component(kind)?,
            priority: node.get_i64("@priority").component(kind)?,
        })
    }

    pub fn to_json(&self) -> Value {
        json!({
            "upgradeType": self.upgrade_type,
            "cost": self.cost,
            "priority": self.priority,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upgrade_from_data() {
        let node = XmlNode::parse(r#"<MainWalls cost="1500.5" priority="7" />"#).unwrap();
        let upgrade = Upgrade::from_data(&node).unwrap();
        assert_eq!(upgrade.upgrade_type, "MainWalls");
        assert_eq!(upgrade.priority, 7);

        let output = upgrade.to_json();
        assert_eq!(output["upgradeType"], "MainWalls");
        assert_eq!(output["cost"], 1500.5);
    }

    #[test]
    fn test_upgrade_bad_priority() {
        let node = XmlNode::parse(r#"<Ceilings cost="0" priority="high" />"#).unwrap();
        let err = Upgrade::from_data(&node).unwrap_err();
        assert_eq!(err.kind, ComponentKind::Upgrade);
    }
}
