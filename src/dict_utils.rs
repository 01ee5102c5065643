//! Generic dictionary and regex primitives shared by both normalizers.
//!
//! Matching throughout this module is anchored at the start of the subject:
//! a pattern matches only when its leftmost match begins at offset zero.
//! This keeps re-key tables written as `^Author$`-style patterns and
//! drop-lists written as `.*LaTeX.*`-style patterns behaving the same way.

use std::collections::{HashMap, HashSet};
use std::fmt::Debug;
use std::hash::Hash;

use regex::{Regex, RegexBuilder};

use crate::{MetadataError, Result};

/// Anchored-at-start match: the leftmost match must begin at the first byte
/// of `subject`.
pub(crate) fn match_at_start(re: &Regex, subject: &str) -> bool {
    re.find(subject).is_some_and(|m| m.start() == 0)
}

fn compile(pattern: &str, case_insensitive: bool) -> Result<Regex> {
    Ok(RegexBuilder::new(pattern)
        .case_insensitive(case_insensitive)
        .build()?)
}

fn compile_table<'t>(
    table: &[(&str, &'t str)],
    case_insensitive: bool,
) -> Result<Vec<(Regex, &'t str)>> {
    table
        .iter()
        .map(|(pattern, replacement)| Ok((compile(pattern, case_insensitive)?, *replacement)))
        .collect()
}

// ── Sequence helpers ─────────────────────────────────────────────────────────

/// Remove duplicates from `values` while preserving first-occurrence order.
///
/// `key` must return a hashable identity for every item; later items whose
/// key was already seen are dropped.
pub fn uniq_by<T, K, F>(values: impl IntoIterator<Item = T>, mut key: F) -> Vec<T>
where
    K: Eq + Hash,
    F: FnMut(&T) -> K,
{
    let mut seen = HashSet::new();
    values
        .into_iter()
        .filter(|value| seen.insert(key(value)))
        .collect()
}

// ── Merging ──────────────────────────────────────────────────────────────────

/// Merge two maps, failing on any shared key.
///
/// Data would be silently lost if both maps carried the same key, so that
/// case is an error rather than an overwrite.
pub fn checked_merge<K, V>(first: &HashMap<K, V>, second: &HashMap<K, V>) -> Result<HashMap<K, V>>
where
    K: Eq + Hash + Clone + Debug,
    V: Clone,
{
    let mut merged = first.clone();
    for (key, value) in second {
        if merged.contains_key(key) {
            return Err(MetadataError::KeyConflict(format!(
                "{key:?} is present in both dictionaries"
            )));
        }
        merged.insert(key.clone(), value.clone());
    }
    Ok(merged)
}

/// Replace whitespace-only values with `None`.
///
/// Empty strings are left alone; only values consisting entirely of one or
/// more whitespace characters are nulled.
pub fn eliminate_whitespace(
    map: &HashMap<String, Option<String>>,
) -> HashMap<String, Option<String>> {
    map.iter()
        .map(|(key, value)| {
            let value = match value {
                Some(s) if !s.is_empty() && s.chars().all(char::is_whitespace) => None,
                other => other.clone(),
            };
            (key.clone(), value)
        })
        .collect()
}

/// Merge a primary and a secondary map, reconciling shared keys.
///
/// Whitespace-only values are normalized to `None` first. For a shared key:
/// identical values are kept as-is, a `None` on either side yields the other
/// side, and two differing non-`None` values are a conflict — an error when
/// `key_protect` is set, otherwise the primary side wins.
pub fn smart_merge(
    primary: &HashMap<String, Option<String>>,
    secondary: &HashMap<String, Option<String>>,
    key_protect: bool,
) -> Result<HashMap<String, Option<String>>> {
    let primary = eliminate_whitespace(primary);
    let secondary = eliminate_whitespace(secondary);

    let all_keys: HashSet<&String> = primary.keys().chain(secondary.keys()).collect();
    let mut merged = HashMap::with_capacity(all_keys.len());

    for key in all_keys {
        let value = match (primary.get(key), secondary.get(key)) {
            (Some(p), None) => p.clone(),
            (None, Some(s)) => s.clone(),
            // A key from the union is present on at least one side.
            (None, None) => continue,
            (Some(p), Some(s)) => {
                if p == s {
                    p.clone()
                } else {
                    match (p, s) {
                        (Some(_), None) => p.clone(),
                        (None, Some(_)) => s.clone(),
                        (Some(_), Some(_)) => {
                            if key_protect {
                                return Err(MetadataError::KeyConflict(format!(
                                    "'{key}' carries differing values on both sides"
                                )));
                            }
                            p.clone()
                        }
                        // Covered by the equality branch above.
                        (None, None) => None,
                    }
                }
            }
        };
        merged.insert(key.clone(), value);
    }

    Ok(merged)
}

// ── Regex re-keying ──────────────────────────────────────────────────────────

/// Re-key a map with a `(pattern, new_key)` table, pattern-major.
///
/// Every key matching a pattern is transferred under that pattern's
/// replacement name. With `all_rekey` set, a count mismatch between the
/// input and the transferred entries is an error; without it, unmatched
/// keys carry over unchanged.
pub fn rekey_map<V: Clone>(
    table: &[(&str, &str)],
    map: &HashMap<String, V>,
    all_rekey: bool,
) -> Result<HashMap<String, V>> {
    let compiled = compile_table(table, false)?;

    let mut rekeyed = HashMap::new();
    let mut leftover: HashSet<&String> = map.keys().collect();

    for (re, replacement) in &compiled {
        for (key, value) in map {
            if match_at_start(re, key) {
                rekeyed.insert((*replacement).to_string(), value.clone());
                leftover.remove(key);
            }
        }
    }

    if all_rekey {
        if rekeyed.len() != map.len() {
            return Err(MetadataError::RekeyMismatch(format!(
                "{} of {} entries transferred",
                rekeyed.len(),
                map.len()
            )));
        }
    } else {
        for key in leftover {
            if let Some(value) = map.get(key) {
                rekeyed.insert(key.clone(), value.clone());
            }
        }
    }

    Ok(rekeyed)
}

/// Re-key a map, detecting ambiguous tables.
///
/// Unlike [`rekey_map`] this walks key-major and fails when a single key
/// matches more than one pattern. Unmatched keys are dropped; with
/// `all_rekey` set, dropping any key is an error.
pub fn rekey_map_strict<V: Clone>(
    table: &[(&str, &str)],
    map: &HashMap<String, V>,
    all_rekey: bool,
) -> Result<HashMap<String, V>> {
    let compiled = compile_table(table, false)?;

    let mut rekeyed = HashMap::new();
    for (key, value) in map {
        let mut match_count = 0;
        for (re, replacement) in &compiled {
            if match_at_start(re, key) {
                rekeyed.insert((*replacement).to_string(), value.clone());
                match_count += 1;
            }
        }
        if match_count > 1 {
            return Err(MetadataError::AmbiguousRekey(key.clone()));
        }
    }

    if all_rekey && rekeyed.len() != map.len() {
        return Err(MetadataError::RekeyMismatch(format!(
            "{} of {} entries transferred",
            rekeyed.len(),
            map.len()
        )));
    }

    Ok(rekeyed)
}

/// Re-key every element of a list, one-and-only-one match per element.
///
/// Patterns are matched case-insensitively. An element matching more than
/// one pattern is an error. An unmatched element is an error under
/// `must_rekey`; otherwise it is padded with `None` when `null_pad` is set
/// and silently skipped when it is not.
pub fn rekey_list(
    table: &[(&str, &str)],
    items: &[String],
    must_rekey: bool,
    null_pad: bool,
) -> Result<Vec<Option<String>>> {
    let compiled = compile_table(table, true)?;

    let mut rekeyed = Vec::with_capacity(items.len());
    for item in items {
        let mut matches = compiled
            .iter()
            .filter(|(re, _)| match_at_start(re, item))
            .map(|(_, replacement)| *replacement);

        match (matches.next(), matches.next()) {
            (Some(replacement), None) => rekeyed.push(Some(replacement.to_string())),
            (Some(_), Some(_)) => return Err(MetadataError::AmbiguousRekey(item.clone())),
            (None, _) => {
                if must_rekey {
                    return Err(MetadataError::RekeyMismatch(format!(
                        "'{item}' matches no pattern"
                    )));
                }
                if null_pad {
                    rekeyed.push(None);
                }
            }
        }
    }

    Ok(rekeyed)
}

/// Re-key a single string: the first case-insensitively matching pattern's
/// replacement is returned, identity on no match.
pub fn rekey_str(table: &[(&str, &str)], subject: &str) -> Result<String> {
    for (pattern, replacement) in table {
        let re = compile(pattern, true)?;
        if match_at_start(&re, subject) {
            return Ok((*replacement).to_string());
        }
    }
    Ok(subject.to_string())
}

// ── Membership tests ─────────────────────────────────────────────────────────

/// Does at least one key of `map` match `pattern`? Case-sensitive.
pub fn any_key_matches<V>(map: &HashMap<String, V>, pattern: &str) -> Result<bool> {
    let re = compile(pattern, false)?;
    Ok(map.keys().any(|key| match_at_start(&re, key)))
}

/// Does `target` match at least one of `patterns`?
pub fn matches_any(patterns: &[&str], target: &str, case_insensitive: bool) -> Result<bool> {
    for pattern in patterns {
        let re = compile(pattern, case_insensitive)?;
        if match_at_start(&re, target) {
            return Ok(true);
        }
    }
    Ok(false)
}
