use std::collections::HashMap;
use serde::{Deserialize, Serialize};
use crate::core::error::{Error, Result};
use crate::core::types::{Document, FieldValue};
use crate::core::utils::RunningTotal;
use crate::query::ast::Query;
use crate::query::matcher::DocumentMatcher;

/// One step of an aggregation pipeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Stage {
    Match(Query),
    Group(GroupStage),
}

/// Groups documents by `key` (all together when `None`) and averages `average`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupStage {
    pub key: Option<String>,
    pub average: String,
}

/// Output row of a group stage.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupRow {
    pub key: FieldValue,
    pub average: f64,
    pub count: u64,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Pipeline {
    pub stages: Vec<Stage>,
}

impl Pipeline {
    pub fn new() -> Self {
        Pipeline::default()
    }

    pub fn matching(mut self, query: Query) -> Self {
        self.stages.push(Stage::Match(query));
        self
    }

    pub fn group(mut self, stage: GroupStage) -> Self {
        self.stages.push(Stage::Group(stage));
        self
    }

    /// Runs the pipeline over `docs`.
    ///
    /// Match stages filter in order; the pipeline must end with exactly one group
    /// stage. Documents whose averaged field is missing or non-numeric do not
    /// contribute to their group, and a group with no numeric values is dropped.
    pub fn execute<'d, I>(&self, docs: I, matcher: &DocumentMatcher<'_>) -> Result<Vec<GroupRow>>
    where
        I: IntoIterator<Item = &'d Document>,
    {
        let (group, filters) = match self.stages.split_last() {
            Some((Stage::Group(group), rest)) => (group, rest),
            _ => return Err(Error::validation("pipeline must end with a group stage")),
        };

        let mut queries = Vec::with_capacity(filters.len());
        for stage in filters {
            match stage {
                Stage::Match(query) => queries.push(query),
                Stage::Group(_) => {
                    return Err(Error::validation("only the last pipeline stage may group"));
                }
            }
        }

        let mut groups: Vec<(FieldValue, RunningTotal)> = Vec::new();
        let mut slots: HashMap<String, usize> = HashMap::new();

        'docs: for doc in docs {
            for query in &queries {
                if !matcher.matches(doc, query)? {
                    continue 'docs;
                }
            }

            let Some(value) = doc.get_field(&group.average).and_then(FieldValue::as_f64) else {
                continue;
            };

            let key = match &group.key {
                Some(field) => doc.get_field(field).cloned().unwrap_or(FieldValue::Null),
                None => FieldValue::Null,
            };
            // FieldValue holds f64, so group slots are keyed by a canonical rendering
            let slot_key = match key.as_f64() {
                Some(n) => format!("n:{}", n),
                None => format!("{:?}", key),
            };
            let slot = *slots.entry(slot_key).or_insert_with(|| {
                groups.push((key, RunningTotal::default()));
                groups.len() - 1
            });
            groups[slot].1.push(value)?;
        }

        Ok(groups
            .into_iter()
            .filter_map(|(key, total)| {
                total.mean().map(|average| GroupRow {
                    key,
                    average,
                    count: total.count(),
                })
            })
            .collect())
    }
}

impl GroupStage {
    /// Single group over every matching document.
    pub fn average_of(field: &str) -> Self {
        GroupStage {
            key: None,
            average: field.to_string(),
        }
    }

    pub fn average_by(key: &str, field: &str) -> Self {
        GroupStage {
            key: Some(key.to_string()),
            average: field.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::ErrorKind;
    use crate::core::types::{fields, SongId};

    fn docs() -> Vec<Document> {
        [(1, 3, 2.0), (2, 3, 4.25), (3, 6, 5.0), (4, 6, 7.0)]
            .into_iter()
            .map(|(id, level, difficulty)| {
                let mut doc = Document::new(SongId(id));
                doc.add_field(fields::LEVEL, FieldValue::Integer(level));
                doc.add_field(fields::DIFFICULTY, FieldValue::Number(difficulty));
                doc
            })
            .collect()
    }

    #[test]
    fn averages_everything_without_a_key() {
        let docs = docs();
        let rows = Pipeline::new()
            .group(GroupStage::average_of(fields::DIFFICULTY))
            .execute(&docs, &DocumentMatcher::new(None))
            .unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].count, 4);
        assert!((rows[0].average - 4.5625).abs() < 1e-12);
    }

    #[test]
    fn match_stage_filters_before_grouping() {
        let docs = docs();
        let rows = Pipeline::new()
            .matching(Query::equals(fields::LEVEL, FieldValue::Integer(6)))
            .group(GroupStage::average_of(fields::DIFFICULTY))
            .execute(&docs, &DocumentMatcher::new(None))
            .unwrap();
        assert_eq!(rows[0].average, 6.0);

        let none = Pipeline::new()
            .matching(Query::equals(fields::LEVEL, FieldValue::Integer(999)))
            .group(GroupStage::average_of(fields::DIFFICULTY))
            .execute(&docs, &DocumentMatcher::new(None))
            .unwrap();
        assert!(none.is_empty());
    }

    #[test]
    fn groups_by_key_in_first_seen_order() {
        let docs = docs();
        let rows = Pipeline::new()
            .group(GroupStage::average_by(fields::LEVEL, fields::DIFFICULTY))
            .execute(&docs, &DocumentMatcher::new(None))
            .unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].key, FieldValue::Integer(3));
        assert!((rows[0].average - 3.125).abs() < 1e-12);
        assert_eq!(rows[1].key, FieldValue::Integer(6));
    }

    #[test]
    fn pipeline_without_group_is_rejected() {
        let docs = docs();
        let err = Pipeline::new()
            .matching(Query::MatchAll)
            .execute(&docs, &DocumentMatcher::new(None))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
    }
}
