//! Editors for the repeatable parts of a form.
//!
//! Positional lists (ticket types, guests) and keyed maps (category
//! discounts) are edited by returning a new collection; the input is never
//! mutated, so a rejected edit leaves the form untouched.

use std::collections::BTreeMap;

use thiserror::Error;

use super::state::Record;
use crate::domain::PredefinedCategory;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CollectionError {
    #[error("At least {min} {noun} required")]
    MinimumItems { noun: String, min: usize },
    #[error("No item at position {index} (list has {len})")]
    IndexOutOfRange { index: usize, len: usize },
    #[error("Unknown list `{0}`")]
    UnknownList(String),
    #[error("`{0}` is already present")]
    DuplicateKey(String),
    #[error("`{0}` is not present")]
    MissingKey(String),
    #[error("Category name cannot be blank")]
    BlankCategory,
    #[error("Category `{0}` already exists")]
    DuplicateCategory(String),
    #[error("`{0}` is a built-in category and cannot be removed")]
    PredefinedCategory(String),
    #[error("Unknown category `{0}`")]
    UnknownCategory(String),
}

/// Describes one positional list held by a form.
#[derive(Debug, Clone, Copy)]
pub struct ListPolicy {
    /// Form field holding the list.
    pub field: &'static str,
    /// Prefix of the list's error keys.
    pub prefix: &'static str,
    pub noun: &'static str,
    pub min_items: usize,
    /// Fresh element appended by "add".
    pub template: fn() -> Record,
}

impl ListPolicy {
    pub fn error_prefix(&self) -> String {
        format!("{}-", self.prefix)
    }
}

pub fn add<T: Clone>(items: &[T], item: T) -> Vec<T> {
    let mut next = items.to_vec();
    next.push(item);
    next
}

pub fn remove<T: Clone>(
    items: &[T],
    index: usize,
    min_items: usize,
    noun: &str,
) -> Result<Vec<T>, CollectionError> {
    check_index(items, index)?;
    if items.len() <= min_items {
        return Err(CollectionError::MinimumItems {
            noun: noun.to_string(),
            min: min_items,
        });
    }
    let mut next = items.to_vec();
    next.remove(index);
    Ok(next)
}

pub fn update<T: Clone>(
    items: &[T],
    index: usize,
    edit: impl FnOnce(&mut T),
) -> Result<Vec<T>, CollectionError> {
    check_index(items, index)?;
    let mut next = items.to_vec();
    edit(&mut next[index]);
    Ok(next)
}

fn check_index<T>(items: &[T], index: usize) -> Result<(), CollectionError> {
    if index < items.len() {
        Ok(())
    } else {
        Err(CollectionError::IndexOutOfRange {
            index,
            len: items.len(),
        })
    }
}

pub fn add_key<V: Clone>(
    entries: &BTreeMap<String, V>,
    key: &str,
    value: V,
) -> Result<BTreeMap<String, V>, CollectionError> {
    if entries.contains_key(key) {
        return Err(CollectionError::DuplicateKey(key.to_string()));
    }
    let mut next = entries.clone();
    next.insert(key.to_string(), value);
    Ok(next)
}

pub fn update_key<V: Clone>(
    entries: &BTreeMap<String, V>,
    key: &str,
    value: V,
) -> Result<BTreeMap<String, V>, CollectionError> {
    if !entries.contains_key(key) {
        return Err(CollectionError::MissingKey(key.to_string()));
    }
    let mut next = entries.clone();
    next.insert(key.to_string(), value);
    Ok(next)
}

pub fn remove_key<V: Clone>(
    entries: &BTreeMap<String, V>,
    key: &str,
) -> Result<BTreeMap<String, V>, CollectionError> {
    if !entries.contains_key(key) {
        return Err(CollectionError::MissingKey(key.to_string()));
    }
    let mut next = entries.clone();
    next.remove(key);
    Ok(next)
}

/// Discount categories available to a ticket wizard: the built-in set plus
/// any custom names added during the session.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CategoryVocabulary {
    custom: Vec<String>,
}

impl CategoryVocabulary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Built-in labels first, then custom names in insertion order.
    pub fn options(&self) -> Vec<String> {
        PredefinedCategory::ALL
            .iter()
            .map(|category| category.label().to_string())
            .chain(self.custom.iter().cloned())
            .collect()
    }

    pub fn custom(&self) -> &[String] {
        &self.custom
    }

    /// Resolves `name` case-insensitively to the stored spelling.
    pub fn canonical(&self, name: &str) -> Option<String> {
        let needle = name.trim();
        if let Some(category) = PredefinedCategory::from_label(needle) {
            return Some(category.label().to_string());
        }
        self.custom
            .iter()
            .find(|existing| existing.eq_ignore_ascii_case(needle))
            .cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.canonical(name).is_some()
    }

    pub fn add(&mut self, name: &str) -> Result<String, CollectionError> {
        let trimmed = name.trim();
        if trimmed.is_empty() {
            return Err(CollectionError::BlankCategory);
        }
        if let Some(existing) = self.canonical(trimmed) {
            return Err(CollectionError::DuplicateCategory(existing));
        }
        self.custom.push(trimmed.to_string());
        Ok(trimmed.to_string())
    }

    /// Removes a custom category and returns its stored spelling.
    pub fn remove(&mut self, name: &str) -> Result<String, CollectionError> {
        let trimmed = name.trim();
        if let Some(category) = PredefinedCategory::from_label(trimmed) {
            return Err(CollectionError::PredefinedCategory(
                category.label().to_string(),
            ));
        }
        let position = self
            .custom
            .iter()
            .position(|existing| existing.eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| CollectionError::UnknownCategory(trimmed.to_string()))?;
        Ok(self.custom.remove(position))
    }
}
