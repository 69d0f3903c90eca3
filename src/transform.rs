// 🔄 Stage 2 - Transform
// extracted rows → adjacent groups by HOUSE_ID → Dwelling.
// The group size is checked before anything is parsed. A failing group is
// logged with every file name in it and dropped.

use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::attributes::{RowSchema, HOUSE_ID};
use crate::dwelling::{assemble, Dwelling, GroupSizePolicy};
use crate::error::Result;
use crate::extractor::describe_row;
use crate::grouper::group_adjacent;
use crate::schema::{RawRow, SchemaValidator};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TransformStats {
    pub groups: usize,
    pub dwellings: usize,
    pub groups_dropped: usize,
}

pub struct Transformer {
    validator: SchemaValidator,
    policy: GroupSizePolicy,
    stats: TransformStats,
}

impl Transformer {
    pub fn new(policy: GroupSizePolicy) -> std::result::Result<Self, regex::Error> {
        Ok(Transformer {
            validator: SchemaValidator::new(RowSchema::extracted_rows())?,
            policy,
            stats: TransformStats::default(),
        })
    }

    pub fn policy(&self) -> GroupSizePolicy {
        self.policy
    }

    pub fn stats(&self) -> TransformStats {
        self.stats
    }

    /// One group of extracted rows to a Dwelling
    pub fn assemble_group(&self, group: &[RawRow]) -> Result<Dwelling> {
        self.policy.check(group.len())?;
        let validated = group
            .iter()
            .map(|row| self.validator.validate(row))
            .collect::<Result<Vec<_>>>()?;
        assemble(&validated, self.policy)
    }

    fn process(&mut self, group: Vec<RawRow>) -> Option<Dwelling> {
        self.stats.groups += 1;
        match self.assemble_group(&group) {
            Ok(dwelling) => {
                self.stats.dwellings += 1;
                debug!(house_id = dwelling.house_id, "assembled dwelling");
                Some(dwelling)
            }
            Err(err) => {
                self.stats.groups_dropped += 1;
                let files: Vec<String> = group.iter().map(describe_row).collect();
                warn!(files = ?files, error = %err, "dropping dwelling group");
                None
            }
        }
    }

    /// Lazily group and assemble; input order decides the groups
    pub fn transform<'a, I>(&'a mut self, rows: I) -> impl Iterator<Item = Dwelling> + 'a
    where
        I: IntoIterator<Item = RawRow>,
        I::IntoIter: 'a,
    {
        group_adjacent(rows, |row: &RawRow| row.get(HOUSE_ID).cloned().unwrap_or(Value::Null))
            .filter_map(move |group| self.process(group))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::extractor::extract_row;
    use crate::test_support::{input_row, HOUSE_XML};

    fn extracted(eval_id: u32, house_id: u32, eval_type: &str) -> RawRow {
        let validator = SchemaValidator::new(RowSchema::input_rows()).unwrap();
        extract_row(&validator, &input_row(eval_id, house_id, eval_type)).unwrap()
    }

    #[test]
    fn test_transform_pairs() {
        let rows = vec![
            extracted(1, 10, "D"),
            extracted(2, 10, "E"),
            extracted(3, 11, "D"),
            extracted(4, 11, "E"),
        ];
        let mut transformer = Transformer::new(GroupSizePolicy::default()).unwrap();
        let dwellings: Vec<Dwelling> = transformer.transform(rows).collect();

        assert_eq!(dwellings.iter().map(|d| d.house_id).collect::<Vec<_>>(), vec![10, 11]);
        assert_eq!(transformer.stats().groups_dropped, 0);
    }

    #[test]
    fn test_transform_drops_bad_groups_and_continues() {
        let mut invalid = extracted(6, 13, "E");
        invalid.insert("EVAL_TYPE".to_string(), Value::String("Z".into()));

        let rows = vec![
            extracted(1, 10, "D"),
            extracted(2, 11, "D"),
            extracted(3, 11, "E"),
            extracted(4, 12, "D"),
            extracted(5, 13, "D"),
            invalid,
            extracted(7, 10, "E"),
        ];
        let mut transformer = Transformer::new(GroupSizePolicy::default()).unwrap();
        let dwellings: Vec<Dwelling> = transformer.transform(rows).collect();

        assert_eq!(dwellings.len(), 1);
        assert_eq!(dwellings[0].house_id, 11);
        assert_eq!(
            transformer.stats(),
            TransformStats {
                groups: 5,
                dwellings: 1,
                groups_dropped: 4,
            }
        );
    }

    #[test]
    fn test_assemble_group_size_checked_first() {
        let mut invalid = extracted(1, 10, "D");
        invalid.insert("EVAL_TYPE".to_string(), Value::String("Z".into()));

        let transformer = Transformer::new(GroupSizePolicy::default()).unwrap();
        let err = transformer.assemble_group(&[invalid]).unwrap_err();
        assert!(matches!(err, Error::InvalidGroupSize { actual: 1, .. }));
    }

    #[test]
    fn test_transform_at_least_one() {
        let rows = vec![extracted(1, 10, "D"), extracted(2, 11, "D"), extracted(3, 11, "E")];
        let mut transformer = Transformer::new(GroupSizePolicy::AtLeast(1)).unwrap();
        assert_eq!(transformer.transform(rows).count(), 2);
    }

    #[test]
    fn test_transform_drops_group_with_broken_component() {
        let mut raw = input_row(3, 11, "D");
        raw.insert(
            "RAW_XML".to_string(),
            Value::String(HOUSE_XML.replace(r#"uiUnits="btu/hr""#, r#"uiUnits="therms""#)),
        );
        let validator = SchemaValidator::new(RowSchema::input_rows()).unwrap();
        let broken = extract_row(&validator, &raw).unwrap();

        let rows = vec![
            extracted(1, 10, "D"),
            extracted(2, 10, "E"),
            broken,
            extracted(4, 11, "E"),
            extracted(5, 12, "D"),
            extracted(6, 12, "E"),
        ];
        let mut transformer = Transformer::new(GroupSizePolicy::default()).unwrap();
        let dwellings: Vec<Dwelling> = transformer.transform(rows).collect();

        assert_eq!(dwellings.iter().map(|d| d.house_id).collect::<Vec<_>>(), vec![10, 12]);
        assert_eq!(transformer.stats().groups_dropped, 1);

        let mut raw = input_row(3, 11, "D");
        raw.insert(
            "RAW_XML".to_string(),
            Value::String(HOUSE_XML.replace(r#"uiUnits="btu/hr""#, r#"uiUnits="therms""#)),
        );
        let group = [extract_row(&validator, &raw).unwrap(), extracted(4, 11, "E")];
        let err = transformer.assemble_group(&group).unwrap_err();
        assert!(matches!(err, Error::InvalidEmbeddedDataType(_)));
    }
}
