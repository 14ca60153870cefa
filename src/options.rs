//! Selectable option sets derived from catalog items.
//!
//! Pure transformation, no I/O. Labels default to the item name; apartment
//! options override it with the unit-number text column when that is
//! non-blank. Sorted sets use a numeric-aware comparison so "Building 2"
//! sorts before "Building 10"; the raw Projects set keeps catalog
//! insertion order.

use std::cmp::Ordering;

use crate::api::models::{CatalogItem, ItemId};

/// One selectable `(value, label)` pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionItem {
    pub value: ItemId,
    pub label: String,
}

/// A typed, labeled list of selectable items.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct OptionSet {
    entries: Vec<OptionItem>,
}

impl OptionSet {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build preserving catalog insertion order (Projects).
    pub fn in_catalog_order(items: Vec<CatalogItem>) -> Self {
        Self {
            entries: items
                .into_iter()
                .map(|item| OptionItem {
                    value: item.id,
                    label: item.name,
                })
                .collect(),
        }
    }

    /// Build sorted ascending by item name.
    pub fn sorted(items: Vec<CatalogItem>) -> Self {
        let mut set = Self::in_catalog_order(items);
        set.entries
            .sort_by(|a, b| natural_cmp(&a.label, &b.label));
        set
    }

    /// Build sorted, with an optional per-item label override falling back
    /// to the item name when the override is absent.
    pub fn sorted_with_labels(items: Vec<(CatalogItem, Option<String>)>) -> Self {
        let mut entries: Vec<OptionItem> = items
            .into_iter()
            .map(|(item, label)| OptionItem {
                value: item.id,
                label: label.unwrap_or(item.name),
            })
            .collect();
        entries.sort_by(|a, b| natural_cmp(&a.label, &b.label));
        Self { entries }
    }

    pub fn entries(&self) -> &[OptionItem] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, id: ItemId) -> bool {
        self.entries.iter().any(|e| e.value == id)
    }
}

/// Numeric-aware, case-insensitive label comparison: digit runs compare as
/// numbers, everything else per character.
pub fn natural_cmp(a: &str, b: &str) -> Ordering {
    let mut ca = a.chars().peekable();
    let mut cb = b.chars().peekable();

    loop {
        match (ca.peek().copied(), cb.peek().copied()) {
            // Equal ignoring case: fall back to a plain compare so the
            // ordering stays total and deterministic.
            (None, None) => return a.cmp(b),
            (None, Some(_)) => return Ordering::Less,
            (Some(_), None) => return Ordering::Greater,
            (Some(x), Some(y)) if x.is_ascii_digit() && y.is_ascii_digit() => {
                let na = take_digits(&mut ca);
                let nb = take_digits(&mut cb);
                let ord = cmp_digit_runs(&na, &nb);
                if ord != Ordering::Equal {
                    return ord;
                }
            }
            (Some(x), Some(y)) => {
                let ord = x.to_lowercase().cmp(y.to_lowercase());
                if ord != Ordering::Equal {
                    return ord;
                }
                ca.next();
                cb.next();
            }
        }
    }
}

fn take_digits(chars: &mut std::iter::Peekable<std::str::Chars>) -> String {
    let mut run = String::new();
    while let Some(c) = chars.peek().copied() {
        if !c.is_ascii_digit() {
            break;
        }
        run.push(c);
        chars.next();
    }
    run
}

fn cmp_digit_runs(a: &str, b: &str) -> Ordering {
    let sa = a.trim_start_matches('0');
    let sb = b.trim_start_matches('0');
    sa.len()
        .cmp(&sb.len())
        .then_with(|| sa.cmp(sb))
        // same numeric value: fewer leading zeros first, for determinism
        .then_with(|| a.len().cmp(&b.len()))
}
