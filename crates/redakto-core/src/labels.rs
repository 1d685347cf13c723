//! Fine-grained to coarse label mapping.
//!
//! Coarse output maps each fine label to its coarse group, drops skipped
//! labels and unresolved entities, and optionally merges adjacent entities
//! of the same coarse label that are only separated by punctuation.

use std::collections::{HashMap, HashSet};

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::entity::EntityItem;
use crate::text::{CharIndex, char_len};

/// Maximum number of separator chars between two mergeable entities.
pub const MAX_MERGE_GAP: usize = 4;

lazy_static! {
    static ref SEPARATOR: Regex = Regex::new(r#"^[\s,.\-:;()\[\]{}"'/\\]*$"#).unwrap();
    static ref DATE_WITH_TRAILING_PERIOD: Regex = Regex::new(r"^\d{1,2}\.\d{1,2}\.\d{2,4}\.$").unwrap();
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LabelMapping {
    #[serde(default)]
    pub fine_to_coarse: HashMap<String, String>,
    #[serde(default)]
    pub skip_labels: HashSet<String>,
}

impl LabelMapping {
    pub fn new(fine_to_coarse: HashMap<String, String>, skip_labels: HashSet<String>) -> Self {
        Self {
            fine_to_coarse,
            skip_labels,
        }
    }

    pub fn from_pairs(pairs: &[(&str, &str)], skip: &[&str]) -> Self {
        Self {
            fine_to_coarse: pairs
                .iter()
                .map(|(f, c)| (f.to_string(), c.to_string()))
                .collect(),
            skip_labels: skip.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// Coarse label for `fine`; unmapped labels map to themselves.
    pub fn coarse<'a>(&'a self, fine: &'a str) -> &'a str {
        self.fine_to_coarse
            .get(fine)
            .map(String::as_str)
            .unwrap_or(fine)
    }

    pub fn is_skipped(&self, label: &str) -> bool {
        self.skip_labels.contains(label)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Constituent {
    pub original_label: String,
    pub original_token: String,
    pub start: i64,
    pub end: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EntityTracking {
    Single {
        original_label: String,
        original_token: String,
        start: i64,
        end: i64,
        coarse_label: String,
    },
    Merged {
        coarse_label: String,
        merged_token: String,
        start: i64,
        end: i64,
        constituents: Vec<Constituent>,
    },
}

/// Tracking record keyed by the (possibly merged) token id.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrackedEntity {
    pub token_id: String,
    pub tracking: EntityTracking,
}

/// Two entities are consecutive when they touch, or when the gap between them
/// is short and made only of separators. Overlaps never count.
pub fn are_consecutive(current: &EntityItem, next: &EntityItem, index: &CharIndex<'_>) -> bool {
    if next.start < current.end {
        return false;
    }
    if next.start == current.end {
        return true;
    }
    let between = index.slice(current.end as usize, next.start as usize);
    SEPARATOR.is_match(between) && char_len(between) <= MAX_MERGE_GAP
}

/// Map entities to coarse labels, optionally merging consecutive runs.
pub fn map_to_coarse_labels(
    entities: &[EntityItem],
    text: &str,
    mapping: &LabelMapping,
    merge_consecutive: bool,
) -> (Vec<EntityItem>, Vec<TrackedEntity>) {
    let index = CharIndex::new(text);

    let mut mapped: Vec<EntityItem> = entities
        .iter()
        .filter(|e| e.is_resolved() && !mapping.is_skipped(&e.label))
        .cloned()
        .collect();
    if mapped.is_empty() {
        return (Vec::new(), Vec::new());
    }
    mapped.sort_by_key(|e| e.start);

    let mut singles: HashMap<String, EntityTracking> = HashMap::new();
    let mut order: Vec<String> = Vec::with_capacity(mapped.len());
    for entity in &mut mapped {
        let coarse = mapping.coarse(&entity.label).to_string();
        singles.insert(
            entity.token_id.clone(),
            EntityTracking::Single {
                original_label: entity.label.clone(),
                original_token: entity.token.clone(),
                start: entity.start,
                end: entity.end,
                coarse_label: coarse.clone(),
            },
        );
        order.push(entity.token_id.clone());
        entity.label = coarse;
    }

    if !merge_consecutive {
        let tracking = order
            .into_iter()
            .filter_map(|id| {
                singles.remove(&id).map(|tracking| TrackedEntity {
                    token_id: id,
                    tracking,
                })
            })
            .collect();
        return (trim_date_periods(mapped), tracking);
    }

    let mut merged = Vec::new();
    let mut tracking = Vec::new();
    let mut i = 0;
    while i < mapped.len() {
        let mut run = vec![&mapped[i]];
        let mut j = i + 1;
        while j < mapped.len() {
            let next = &mapped[j];
            let last = run[run.len() - 1];
            if next.label == mapped[i].label && are_consecutive(last, next, &index) {
                run.push(next);
                j += 1;
            } else {
                break;
            }
        }

        if run.len() > 1 {
            let first = run[0];
            let last = run[run.len() - 1];
            let merged_id: String = run.iter().map(|e| e.token_id.as_str()).collect();
            let token = index
                .slice(first.start as usize, last.end as usize)
                .to_string();

            let constituents = run
                .iter()
                .filter_map(|e| match singles.get(&e.token_id) {
                    Some(EntityTracking::Single {
                        original_label,
                        original_token,
                        start,
                        end,
                        ..
                    }) => Some(Constituent {
                        original_label: original_label.clone(),
                        original_token: original_token.clone(),
                        start: *start,
                        end: *end,
                    }),
                    _ => None,
                })
                .collect();

            tracking.push(TrackedEntity {
                token_id: merged_id.clone(),
                tracking: EntityTracking::Merged {
                    coarse_label: first.label.clone(),
                    merged_token: token.clone(),
                    start: first.start,
                    end: last.end,
                    constituents,
                },
            });
            merged.push(EntityItem {
                token_id: merged_id,
                label: first.label.clone(),
                start: first.start,
                end: last.end,
                token,
            });
        } else {
            let single = run[0];
            if let Some(t) = singles.get(&single.token_id) {
                tracking.push(TrackedEntity {
                    token_id: single.token_id.clone(),
                    tracking: t.clone(),
                });
            }
            merged.push(single.clone());
        }

        i = j;
    }

    (trim_date_periods(merged), tracking)
}

/// `DATE` tokens like `01.02.2020.` lose the sentence period.
fn trim_date_periods(mut entities: Vec<EntityItem>) -> Vec<EntityItem> {
    for entity in entities.iter_mut() {
        if entity.label == "DATE" && DATE_WITH_TRAILING_PERIOD.is_match(&entity.token) {
            entity.token.pop();
            entity.end -= 1;
        }
    }
    entities
}
