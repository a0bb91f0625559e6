// ── Automation reference scanner ──
//
// HEURISTIC, NOT A PARSER. Automation and script sources are scanned as
// plain text for things that look like entity ids. Two passes:
//
// - field pass: values of `entity_id:` keys (scalar, quoted, inline list,
//   comma list, or a block list on the following lines);
// - mention pass: any word-bounded `domain.object_id` token.
//
// Templates such as `states.sensor.x.state` are missed on purpose; false
// negatives are acceptable, failures are not.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::model::EntityId;
use crate::record::AutomationText;

const FIELD_KEY: &str = "entity_id:";

/// Everything the scanner found in a set of automation sources.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferenceScan {
    /// Ids given explicitly as `entity_id:` values.
    pub field_references: BTreeSet<String>,
    /// Every entity-id-shaped token, including the field references.
    pub mentions: BTreeSet<String>,
}

impl ReferenceScan {
    /// Whether `id` is referenced anywhere in the scanned text.
    pub fn mentions(&self, id: &str) -> bool {
        self.mentions.contains(id)
    }

    pub fn is_empty(&self) -> bool {
        self.mentions.is_empty()
    }

    pub fn merge(&mut self, other: Self) {
        self.field_references.extend(other.field_references);
        self.mentions.extend(other.mentions);
    }
}

/// Scan every text and union the results.
pub fn scan_references(texts: &[AutomationText]) -> ReferenceScan {
    let mut scan = ReferenceScan::default();
    for text in texts {
        let found = scan_text(&text.text);
        tracing::debug!(
            origin = %text.origin,
            fields = found.field_references.len(),
            mentions = found.mentions.len(),
            "scanned automation source"
        );
        scan.merge(found);
    }
    scan
}

/// Scan a single blob of automation or script text.
pub fn scan_text(text: &str) -> ReferenceScan {
    let mut scan = ReferenceScan::default();

    for token in text.split(|c: char| !is_token_char(c)) {
        if let Some(id) = as_entity_ref(token.trim_end_matches('.')) {
            scan.mentions.insert(id);
        }
    }

    let lines: Vec<&str> = text.lines().collect();
    for (i, line) in lines.iter().enumerate() {
        let Some(pos) = find_field_key(line) else {
            continue;
        };
        let rest = strip_comment(&line[pos + FIELD_KEY.len()..]).trim();
        if rest.is_empty() {
            for value in block_list(&lines[i + 1..]) {
                collect_values(value, &mut scan);
            }
        } else {
            collect_values(rest, &mut scan);
        }
    }

    scan
}

/// Position of an `entity_id:` key that is not the tail of a longer key
/// such as `source_entity_id:`.
fn find_field_key(line: &str) -> Option<usize> {
    line.match_indices(FIELD_KEY).map(|(pos, _)| pos).find(|&pos| {
        line[..pos]
            .chars()
            .next_back()
            .is_none_or(|c| c.is_whitespace() || matches!(c, '-' | '{' | ','))
    })
}

fn is_token_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '.'
}

/// A candidate is an entity id the platform could have issued: lowercase
/// ascii, digits and underscores, one separator, domain starting with a
/// letter.
fn as_entity_ref(candidate: &str) -> Option<String> {
    let id = EntityId::parse(candidate).ok()?;
    let well_formed = |part: &str| {
        part.chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
    };
    let starts_alpha = id.domain().starts_with(|c: char| c.is_ascii_lowercase());
    (starts_alpha && well_formed(id.domain()) && well_formed(id.object_id()))
        .then(|| id.as_str().to_owned())
}

fn strip_comment(s: &str) -> &str {
    s.find(" #").map_or(s, |i| &s[..i])
}

/// Items of a YAML block list directly below a key.
fn block_list<'a>(following: &[&'a str]) -> Vec<&'a str> {
    following
        .iter()
        .map(|l| l.trim_start())
        .take_while(|l| l.starts_with("- ") || *l == "-")
        .map(|l| strip_comment(l.trim_start_matches('-')).trim())
        .collect()
}

fn collect_values(raw: &str, scan: &mut ReferenceScan) {
    let inner = raw.trim().trim_start_matches('[').trim_end_matches(']');
    for part in inner.split(',') {
        let value = part.trim().trim_matches(|c| c == '"' || c == '\'').trim();
        if let Some(id) = as_entity_ref(value) {
            scan.mentions.insert(id.clone());
            scan.field_references.insert(id);
        }
    }
}
