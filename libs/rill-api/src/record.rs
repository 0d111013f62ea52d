//! Ordered string-keyed record.
//!
//! Entries live in a slab and are chained into a doubly-linked list, so
//! insertion order is the iteration order and unlinking is O(1). Small
//! records are searched linearly; once a record grows past
//! `INDEX_THRESHOLD` fields a key → slot index is kept alongside.

use std::borrow::Cow;
use std::collections::HashMap;

use crate::error::{RillError, internal_coding_error};
use crate::ops;
use crate::value::{Value, write_json_map};

const INDEX_THRESHOLD: usize = 16;

static ABSENT: Value = Value::Absent;

#[derive(Debug)]
struct Entry {
    key: String,
    value: Value,
    prev: Option<usize>,
    next: Option<usize>,
}

#[derive(Debug, Default)]
pub struct Record {
    slots: Vec<Option<Entry>>,
    free: Vec<usize>,
    head: Option<usize>,
    tail: Option<usize>,
    len: usize,
    index: Option<HashMap<String, usize>>,
}

// ═══════════════════════════════════════════════════════════════
//  Slab and linkage
// ═══════════════════════════════════════════════════════════════

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self { slots: Vec::with_capacity(capacity), ..Self::default() }
    }

    #[track_caller]
    fn entry(&self, slot: usize) -> &Entry {
        match self.slots.get(slot) {
            Some(Some(entry)) => entry,
            _ => internal_coding_error(format!("record link points at empty slot {slot}")),
        }
    }

    #[track_caller]
    fn entry_mut(&mut self, slot: usize) -> &mut Entry {
        match self.slots.get_mut(slot) {
            Some(Some(entry)) => entry,
            _ => internal_coding_error(format!("record link points at empty slot {slot}")),
        }
    }

    fn find(&self, key: &str) -> Option<usize> {
        if let Some(index) = &self.index {
            return index.get(key).copied();
        }
        let mut cursor = self.head;
        while let Some(slot) = cursor {
            let entry = self.entry(slot);
            if entry.key == key {
                return Some(slot);
            }
            cursor = entry.next;
        }
        None
    }

    fn alloc(&mut self, key: String, value: Value) -> usize {
        let entry = Entry { key, value, prev: None, next: None };
        match self.free.pop() {
            Some(slot) => {
                self.slots[slot] = Some(entry);
                slot
            }
            None => {
                self.slots.push(Some(entry));
                self.slots.len() - 1
            }
        }
    }

    fn link_tail(&mut self, slot: usize) {
        let old_tail = self.tail;
        {
            let entry = self.entry_mut(slot);
            entry.prev = old_tail;
            entry.next = None;
        }
        match old_tail {
            Some(t) => self.entry_mut(t).next = Some(slot),
            None => self.head = Some(slot),
        }
        self.tail = Some(slot);
    }

    fn link_head(&mut self, slot: usize) {
        let old_head = self.head;
        {
            let entry = self.entry_mut(slot);
            entry.prev = None;
            entry.next = old_head;
        }
        match old_head {
            Some(h) => self.entry_mut(h).prev = Some(slot),
            None => self.tail = Some(slot),
        }
        self.head = Some(slot);
    }

    fn unlink(&mut self, slot: usize) {
        let (prev, next) = {
            let entry = self.entry(slot);
            (entry.prev, entry.next)
        };
        match prev {
            Some(p) => self.entry_mut(p).next = next,
            None => self.head = next,
        }
        match next {
            Some(n) => self.entry_mut(n).prev = prev,
            None => self.tail = prev,
        }
    }

    fn insert(&mut self, key: String, value: Value, at_head: bool) -> usize {
        let indexed_key = self.index.as_ref().map(|_| key.clone());
        let slot = self.alloc(key, value);
        if at_head { self.link_head(slot) } else { self.link_tail(slot) }
        self.len += 1;
        if let Some(index) = &mut self.index {
            if let Some(key) = indexed_key {
                index.insert(key, slot);
            }
        } else if self.len > INDEX_THRESHOLD {
            self.build_index();
        }
        slot
    }

    fn build_index(&mut self) {
        let mut index = HashMap::with_capacity(self.len * 2);
        let mut cursor = self.head;
        while let Some(slot) = cursor {
            let entry = self.entry(slot);
            index.insert(entry.key.clone(), slot);
            cursor = entry.next;
        }
        self.index = Some(index);
    }

    fn remove_slot(&mut self, slot: usize) -> Entry {
        self.unlink(slot);
        let entry = match self.slots.get_mut(slot).and_then(Option::take) {
            Some(entry) => entry,
            None => internal_coding_error(format!("record removal of empty slot {slot}")),
        };
        self.free.push(slot);
        self.len -= 1;
        if let Some(index) = &mut self.index {
            index.remove(&entry.key);
        }
        entry
    }

    fn rekey(&mut self, slot: usize, new_key: String) {
        let old_key = std::mem::replace(&mut self.entry_mut(slot).key, new_key.clone());
        if let Some(index) = &mut self.index {
            index.remove(&old_key);
            index.insert(new_key, slot);
        }
    }
}

// ═══════════════════════════════════════════════════════════════
//  Key access
// ═══════════════════════════════════════════════════════════════

impl Record {
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn clear(&mut self) {
        *self = Self::new();
    }

    pub fn has(&self, key: &str) -> bool {
        self.find(key).is_some()
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.find(key).map(|slot| &self.entry(slot).value)
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut Value> {
        let slot = self.find(key)?;
        Some(&mut self.entry_mut(slot).value)
    }

    /// Field value, or Absent when the key is missing.
    pub fn get_or_absent(&self, key: &str) -> &Value {
        self.get(key).unwrap_or(&ABSENT)
    }

    /// Insert without copying: the caller hands over a freshly built value.
    /// Existing keys keep their position.
    pub fn put_reference(&mut self, key: impl Into<String>, value: Value) {
        let key = key.into();
        match self.find(&key) {
            Some(slot) => self.entry_mut(slot).value = value,
            None => {
                self.insert(key, value, false);
            }
        }
    }

    /// Insert a deep copy of `value`. Existing keys keep their position.
    pub fn put_copy(&mut self, key: &str, value: &Value) {
        match self.find(key) {
            Some(slot) => self.entry_mut(slot).value = value.copy(),
            None => {
                self.insert(key.to_string(), value.copy(), false);
            }
        }
    }

    /// Insert at the head. An existing key is updated in place, not moved.
    pub fn prepend_reference(&mut self, key: impl Into<String>, value: Value) {
        let key = key.into();
        match self.find(&key) {
            Some(slot) => self.entry_mut(slot).value = value,
            None => {
                self.insert(key, value, true);
            }
        }
    }

    pub fn prepend_copy(&mut self, key: &str, value: &Value) {
        self.prepend_reference(key, value.copy());
    }

    pub fn remove(&mut self, key: &str) -> bool {
        self.take(key).is_some()
    }

    /// Remove a field and hand back its value.
    pub fn take(&mut self, key: &str) -> Option<Value> {
        let slot = self.find(key)?;
        Some(self.remove_slot(slot).value)
    }

    /// Rename a field in place. If `new_key` already exists, it receives the
    /// value and `old_key`'s position is dropped.
    pub fn rename(&mut self, old_key: &str, new_key: &str) -> bool {
        let Some(old_slot) = self.find(old_key) else {
            return false;
        };
        if old_key == new_key {
            return true;
        }
        match self.find(new_key) {
            Some(new_slot) => {
                let moved = self.remove_slot(old_slot).value;
                self.entry_mut(new_slot).value = moved;
            }
            None => self.rekey(old_slot, new_key.to_string()),
        }
        true
    }

    pub fn move_to_head(&mut self, key: &str) -> bool {
        let Some(slot) = self.find(key) else { return false };
        self.unlink(slot);
        self.link_head(slot);
        true
    }

    pub fn move_to_tail(&mut self, key: &str) -> bool {
        let Some(slot) = self.find(key) else { return false };
        self.unlink(slot);
        self.link_tail(slot);
        true
    }

    pub fn iter(&self) -> Iter<'_> {
        Iter { record: self, cursor: self.head, remaining: self.len }
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.iter().map(|(k, _)| k)
    }

    pub fn values(&self) -> impl Iterator<Item = &Value> {
        self.iter().map(|(_, v)| v)
    }

    /// Visit every field in order with mutable access to its value.
    pub fn for_each_value_mut(&mut self, mut f: impl FnMut(&str, &mut Value)) {
        let mut cursor = self.head;
        while let Some(slot) = cursor {
            let entry = self.entry_mut(slot);
            f(&entry.key, &mut entry.value);
            cursor = entry.next;
        }
    }

    /// Deep copy. Nested maps and arrays are copied recursively.
    pub fn copy(&self) -> Self {
        self.clone()
    }

    /// Copy every field of `other` into `self`: existing keys are
    /// overwritten in place, new keys are appended in `other`'s order.
    pub fn merge(&mut self, other: &Record) {
        for (key, value) in other.iter() {
            self.put_copy(key, value);
        }
    }

    /// Order-insensitive equality: same key set, structurally equal values.
    pub fn equals(&self, other: &Record) -> bool {
        self.len == other.len
            && self.iter().all(|(key, value)| other.get(key).is_some_and(|o| ops::values_equal(value, o)))
    }

    /// Comma-joined print representations of `fields`, or None if any is missing.
    pub fn selected_values_joined(&self, fields: &[String]) -> Option<String> {
        let mut joined = String::new();
        for (i, field) in fields.iter().enumerate() {
            let value = self.get(field)?;
            if i > 0 {
                joined.push(',');
            }
            joined.push_str(&value.render());
        }
        Some(joined)
    }

    /// JSON text of this record.
    pub fn to_json_string(&self, multiline: bool) -> Result<String, RillError> {
        let mut out = String::new();
        write_json_map(self, &mut out, multiline, 0)?;
        Ok(out)
    }
}

// ═══════════════════════════════════════════════════════════════
//  Positional access (1..N, -1..-N)
// ═══════════════════════════════════════════════════════════════

impl Record {
    fn find_positional(&self, position: i64) -> Option<usize> {
        let len = self.len as i64;
        if position == 0 || position > len || position < -len {
            return None;
        }
        if position > 0 {
            let mut cursor = self.head;
            for _ in 1..position {
                cursor = self.entry(cursor?).next;
            }
            cursor
        } else {
            let mut cursor = self.tail;
            for _ in 1..-position {
                cursor = self.entry(cursor?).prev;
            }
            cursor
        }
    }

    pub fn get_positional(&self, position: i64) -> Option<&Value> {
        self.find_positional(position).map(|slot| &self.entry(slot).value)
    }

    pub fn get_positional_name(&self, position: i64) -> Option<&str> {
        self.find_positional(position).map(|slot| self.entry(slot).key.as_str())
    }

    pub fn put_positional(&mut self, position: i64, value: &Value) -> Result<(), RillError> {
        let slot = self.position_or_error(position)?;
        self.entry_mut(slot).value = value.copy();
        Ok(())
    }

    /// Rename the field at `position`. Another field already named
    /// `new_key` is removed so keys stay unique.
    pub fn rename_positional(&mut self, position: i64, new_key: &str) -> Result<(), RillError> {
        let slot = self.position_or_error(position)?;
        if self.entry(slot).key == new_key {
            return Ok(());
        }
        if let Some(existing) = self.find(new_key) {
            self.remove_slot(existing);
        }
        self.rekey(slot, new_key.to_string());
        Ok(())
    }

    pub fn remove_positional(&mut self, position: i64) -> bool {
        match self.find_positional(position) {
            Some(slot) => {
                self.remove_slot(slot);
                true
            }
            None => false,
        }
    }

    fn position_or_error(&self, position: i64) -> Result<usize, RillError> {
        self.find_positional(position).ok_or_else(|| {
            RillError::index(format!("position {position} out of range for record with {} fields", self.len))
        })
    }
}

// ═══════════════════════════════════════════════════════════════
//  Indexed paths: rec[a][b][c]
// ═══════════════════════════════════════════════════════════════

fn path_key(index: &Value) -> Result<Cow<'_, str>, RillError> {
    match index {
        Value::String(_) | Value::Void | Value::Int(_) => Ok(index.render()),
        other => Err(RillError::index(format!(
            "record keys must be string or int; got {}",
            other.type_name()
        ))),
    }
}

impl Record {
    /// Assign through a multi-level path, creating empty maps for missing
    /// intermediate levels. An existing intermediate that is not a map is
    /// an error. An empty path replaces the whole record with a map value.
    pub fn put_indexed(&mut self, path: &[Value], rvalue: &Value) -> Result<(), RillError> {
        let Some((first, rest)) = path.split_first() else {
            return match rvalue {
                Value::Map(map) => {
                    *self = map.copy();
                    Ok(())
                }
                other => Err(RillError::index(format!(
                    "cannot assign {} to a whole record",
                    other.type_name()
                ))),
            };
        };
        let key = path_key(first)?;
        if rest.is_empty() {
            self.put_copy(&key, rvalue);
            return Ok(());
        }
        if !self.has(&key) {
            self.put_reference(key.as_ref(), Value::Map(Record::new()));
        }
        match self.get_mut(&key) {
            Some(Value::Map(inner)) => inner.put_indexed(rest, rvalue).map_err(|e| e.with_context(&key)),
            Some(other) => Err(RillError::index(format!(
                "cannot index field {key:?} of type {}",
                other.type_name()
            ))),
            None => internal_coding_error("field vanished during indexed assignment"),
        }
    }

    /// Read through a multi-level path. Map levels take string/int keys;
    /// array levels take 1-based (or negative) int positions.
    pub fn get_indexed(&self, path: &[Value]) -> Option<&Value> {
        let (first, rest) = path.split_first()?;
        let mut current = self.get(&path_key(first).ok()?)?;
        for index in rest {
            current = match current {
                Value::Map(map) => map.get(&path_key(index).ok()?)?,
                Value::Array(items) => items.get(array_slot(items.len(), index.as_int()?)?)?,
                _ => return None,
            };
        }
        Some(current)
    }

    /// Remove the value at a multi-level path. Missing levels are not an
    /// error; a non-map intermediate is.
    pub fn remove_indexed(&mut self, path: &[Value]) -> Result<bool, RillError> {
        let Some((first, rest)) = path.split_first() else {
            return Ok(false);
        };
        let key = path_key(first)?;
        if rest.is_empty() {
            return Ok(self.remove(&key));
        }
        match self.get_mut(&key) {
            None => Ok(false),
            Some(Value::Map(inner)) => inner.remove_indexed(rest),
            Some(other) => Err(RillError::index(format!(
                "cannot index field {key:?} of type {}",
                other.type_name()
            ))),
        }
    }
}

/// 1-based array position (negative counts from the end) to a Vec index.
fn array_slot(len: usize, position: i64) -> Option<usize> {
    let len = len as i64;
    match position {
        p if p >= 1 && p <= len => Some((p - 1) as usize),
        p if p <= -1 && p >= -len => Some((len + p) as usize),
        _ => None,
    }
}

// ═══════════════════════════════════════════════════════════════
//  Whole-record reshaping
// ═══════════════════════════════════════════════════════════════

impl Record {
    /// Rename the first fields to `names`, in order. Original fields past
    /// the renamed ones are dropped when their key collides with a new name.
    pub fn label(&mut self, names: &[String]) {
        let old = std::mem::take(self);
        for (i, (key, value)) in old.into_iter().enumerate() {
            match names.get(i) {
                Some(name) => self.put_reference(name.clone(), value),
                None if self.has(&key) => {}
                None => self.put_reference(key, value),
            }
        }
    }

    /// Lexical sort by key, stable.
    pub fn sort_by_key(&mut self) {
        let mut entries: Vec<(String, Value)> = std::mem::take(self).into_iter().collect();
        entries.sort_by(|a, b| a.0.cmp(&b.0));
        *self = entries.into_iter().collect();
    }

    pub fn sort_by_key_recursively(&mut self) {
        self.sort_by_key();
        self.for_each_value_mut(|_, value| {
            if let Value::Map(inner) = value {
                inner.sort_by_key_recursively();
            }
        });
    }

    /// Replace nested maps and arrays by `prefix<sep>key` fields.
    /// Empty collections become the strings `{}` and `[]`.
    pub fn flatten(&mut self, separator: &str) {
        if !self.values().any(Value::is_collection) {
            return;
        }
        let old = std::mem::take(self);
        for (key, value) in old {
            flatten_into(self, key, value, separator);
        }
    }

    /// Inverse of [`flatten`](Self::flatten): keys containing `separator`
    /// become nested maps, maps keyed `1..n` become arrays, and the strings
    /// `{}` and `[]` become empty collections.
    pub fn unflatten(&mut self, separator: &str) {
        if separator.is_empty() {
            return;
        }
        let old = std::mem::take(self);
        let mut affected: Vec<String> = Vec::new();
        for (key, value) in old {
            let value = unflatten_terminal(value);
            if !key.contains(separator) {
                self.put_reference(key, value);
                continue;
            }
            let path: Vec<Value> = key.split(separator).map(Value::from_string).collect();
            match self.put_indexed(&path, &value) {
                Ok(()) => {
                    if let Some(base) = key.split(separator).next() {
                        if !affected.iter().any(|a| a == base) {
                            affected.push(base.to_string());
                        }
                    }
                }
                // A scalar already sits where a map would go: keep the flat key.
                Err(_) => self.put_reference(key, value),
            }
        }
        for base in affected {
            if let Some(value) = self.get_mut(&base) {
                arrayify(value);
            }
        }
    }
}

fn flatten_into(out: &mut Record, prefix: String, value: Value, separator: &str) {
    match value {
        Value::Map(map) if map.is_empty() => out.put_reference(prefix, Value::from_string("{}")),
        Value::Map(map) => {
            for (key, inner) in map {
                flatten_into(out, format!("{prefix}{separator}{key}"), inner, separator);
            }
        }
        Value::Array(items) if items.is_empty() => out.put_reference(prefix, Value::from_string("[]")),
        Value::Array(items) => {
            for (i, inner) in items.into_iter().enumerate() {
                flatten_into(out, format!("{prefix}{separator}{}", i + 1), inner, separator);
            }
        }
        scalar => out.put_reference(prefix, scalar),
    }
}

fn unflatten_terminal(value: Value) -> Value {
    match value.as_str() {
        Some("{}") => Value::Map(Record::new()),
        Some("[]") => Value::Array(Vec::new()),
        _ => value,
    }
}

/// Maps keyed exactly "1".."n" become arrays, recursively.
fn arrayify(value: &mut Value) {
    let items = match value {
        Value::Map(map) => {
            map.for_each_value_mut(|_, inner| arrayify(inner));
            let sequential = !map.is_empty() && map.keys().enumerate().all(|(i, k)| k == (i + 1).to_string());
            if !sequential {
                return;
            }
            std::mem::take(map).into_iter().map(|(_, v)| v).collect()
        }
        Value::Array(items) => {
            items.iter_mut().for_each(arrayify);
            return;
        }
        _ => return,
    };
    *value = Value::Array(items);
}

// ═══════════════════════════════════════════════════════════════
//  Trait impls and iterators
// ═══════════════════════════════════════════════════════════════

/// Deep and compacting: the copy has no free slots.
impl Clone for Record {
    fn clone(&self) -> Self {
        let mut out = Record::with_capacity(self.len);
        for (key, value) in self.iter() {
            out.insert(key.to_string(), value.copy(), false);
        }
        out
    }
}

/// Order-sensitive equality. See [`Record::equals`] for the
/// order-insensitive comparison used by the `==` operator.
impl PartialEq for Record {
    fn eq(&self, other: &Self) -> bool {
        self.len == other.len && self.iter().zip(other.iter()).all(|(a, b)| a == b)
    }
}

impl<K: Into<String>> FromIterator<(K, Value)> for Record {
    fn from_iter<I: IntoIterator<Item = (K, Value)>>(iter: I) -> Self {
        let mut record = Record::new();
        for (key, value) in iter {
            record.put_reference(key, value);
        }
        record
    }
}

pub struct Iter<'a> {
    record: &'a Record,
    cursor: Option<usize>,
    remaining: usize,
}

impl<'a> Iterator for Iter<'a> {
    type Item = (&'a str, &'a Value);

    fn next(&mut self) -> Option<Self::Item> {
        let slot = self.cursor?;
        let entry = self.record.entry(slot);
        self.cursor = entry.next;
        self.remaining -= 1;
        Some((entry.key.as_str(), &entry.value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl ExactSizeIterator for Iter<'_> {}

impl<'a> IntoIterator for &'a Record {
    type Item = (&'a str, &'a Value);
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

pub struct IntoIter {
    record: Record,
}

impl Iterator for IntoIter {
    type Item = (String, Value);

    fn next(&mut self) -> Option<Self::Item> {
        let slot = self.record.head?;
        let entry = self.record.remove_slot(slot);
        Some((entry.key, entry.value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.record.len, Some(self.record.len))
    }
}

impl IntoIterator for Record {
    type Item = (String, Value);
    type IntoIter = IntoIter;

    fn into_iter(self) -> Self::IntoIter {
        IntoIter { record: self }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rec(pairs: &[(&str, i64)]) -> Record {
        pairs.iter().map(|(k, v)| (*k, Value::from_int(*v))).collect()
    }

    fn keys(r: &Record) -> Vec<&str> {
        r.keys().collect()
    }

    #[test]
    fn insertion_order_survives_remove_and_reinsert() {
        let mut r = rec(&[("a", 1), ("b", 2), ("c", 3)]);
        assert!(r.remove("b"));
        r.put_copy("d", &Value::from_int(4));
        assert_eq!(keys(&r), ["a", "c", "d"]);
        r.put_copy("a", &Value::from_int(10));
        assert_eq!(keys(&r), ["a", "c", "d"]);
        assert_eq!(r.get("a"), Some(&Value::from_int(10)));
        assert!(!r.remove("zzz"));
    }

    #[test]
    fn order_matches_reference_model_past_index_threshold() {
        let mut r = Record::new();
        let mut model: Vec<String> = Vec::new();
        for i in 0..40 {
            let key = format!("k{}", (i * 7) % 23);
            r.put_copy(&key, &Value::from_int(i));
            if !model.contains(&key) {
                model.push(key);
            }
            if i % 5 == 0 {
                let victim = format!("k{}", (i * 3) % 23);
                let removed = r.remove(&victim);
                assert_eq!(removed, model.contains(&victim));
                model.retain(|k| *k != victim);
            }
        }
        assert!(r.index.is_some() || r.len() <= INDEX_THRESHOLD);
        assert_eq!(keys(&r), model.iter().map(String::as_str).collect::<Vec<_>>());
        for key in &model {
            assert!(r.has(key));
        }
    }

    #[test]
    fn prepend_goes_to_head_unless_present() {
        let mut r = rec(&[("a", 1), ("b", 2)]);
        r.prepend_copy("z", &Value::from_int(0));
        assert_eq!(keys(&r), ["z", "a", "b"]);
        r.prepend_copy("b", &Value::from_int(5));
        assert_eq!(keys(&r), ["z", "a", "b"]);
        assert_eq!(r.get("b"), Some(&Value::from_int(5)));
    }

    #[test]
    fn put_copy_does_not_alias() {
        let mut inner = Record::new();
        inner.put_reference("x", Value::from_int(1));
        let shared = Value::Map(inner);
        let mut r = Record::new();
        r.put_copy("m", &shared);
        if let Some(Value::Map(m)) = r.get_mut("m") {
            m.put_reference("x", Value::from_int(2));
        }
        assert_eq!(shared.as_map().and_then(|m| m.get("x")), Some(&Value::from_int(1)));
    }

    #[test]
    fn rename_is_last_wins() {
        let mut r = rec(&[("a", 1), ("b", 2), ("c", 3)]);
        assert!(r.rename("a", "c"));
        assert_eq!(keys(&r), ["b", "c"]);
        assert_eq!(r.get("c"), Some(&Value::from_int(1)));

        let mut r = rec(&[("a", 1), ("b", 2)]);
        assert!(r.rename("a", "x"));
        assert_eq!(keys(&r), ["x", "b"]);
        assert!(!r.rename("nope", "y"));
    }

    #[test]
    fn positional_aliasing() {
        let r = rec(&[("a", 1), ("b", 2), ("c", 3)]);
        assert_eq!(r.get_positional(1), r.get_positional(-3));
        assert_eq!(r.get_positional(3), r.get_positional(-1));
        assert_eq!(r.get_positional(1), Some(&Value::from_int(1)));
        assert_eq!(r.get_positional(4), None);
        assert_eq!(r.get_positional(0), None);
        assert_eq!(r.get_positional(-4), None);
        assert_eq!(r.get_positional_name(-1), Some("c"));
    }

    #[test]
    fn positional_writes_error_out_of_range() {
        let mut r = rec(&[("a", 1), ("b", 2), ("c", 3)]);
        r.put_positional(2, &Value::from_int(20)).expect("in range");
        assert_eq!(r.get("b"), Some(&Value::from_int(20)));
        assert!(r.put_positional(9, &Value::from_int(0)).is_err());
        assert!(r.rename_positional(-9, "q").is_err());

        r.rename_positional(1, "c").expect("in range");
        assert_eq!(keys(&r), ["c", "b"]);
        assert_eq!(r.get("c"), Some(&Value::from_int(1)));
        assert!(r.remove_positional(-1));
        assert_eq!(keys(&r), ["c"]);
    }

    #[test]
    fn merge_overwrites_in_place_and_appends() {
        let mut r = rec(&[("a", 1), ("b", 2)]);
        r.merge(&rec(&[("c", 3), ("a", 9)]));
        assert_eq!(keys(&r), ["a", "b", "c"]);
        assert_eq!(r.get("a"), Some(&Value::from_int(9)));
    }

    #[test]
    fn indexed_assignment_autovivifies_and_is_idempotent() {
        let mut r = Record::new();
        let path = [Value::from_string("x"), Value::from_string("y"), Value::from_string("z")];
        r.put_indexed(&path, &Value::from_int(5)).expect("assign");
        let once = r.copy();
        r.put_indexed(&path, &Value::from_int(5)).expect("assign again");
        assert_eq!(r, once);
        assert_eq!(r.to_json_string(false).expect("json"), r#"{"x": {"y": {"z": 5}}}"#);
        assert_eq!(r.get_indexed(&path), Some(&Value::from_int(5)));
    }

    #[test]
    fn indexed_assignment_through_scalar_fails() {
        let mut r = rec(&[("x", 1)]);
        let err = r
            .put_indexed(&[Value::from_string("x"), Value::from_string("y")], &Value::from_int(2))
            .expect_err("scalar intermediate");
        assert_eq!(err.kind, crate::error::ErrorKind::Index);
        assert_eq!(r.get("x"), Some(&Value::from_int(1)));

        let bad_key = r.put_indexed(&[Value::from_float(1.5)], &Value::from_int(2));
        assert!(bad_key.is_err());
    }

    #[test]
    fn remove_indexed_walks_maps() {
        let mut r = Record::new();
        let path = [Value::from_string("a"), Value::from_string("b")];
        r.put_indexed(&path, &Value::from_int(1)).expect("assign");
        assert_eq!(r.remove_indexed(&path).ok(), Some(true));
        assert_eq!(r.remove_indexed(&path).ok(), Some(false));
        assert_eq!(r.to_json_string(false).expect("json"), r#"{"a": {}}"#);
    }

    #[test]
    fn equals_ignores_order_and_int_float_spelling() {
        let a = rec(&[("a", 1), ("b", 2)]);
        let mut b = Record::new();
        b.put_reference("b", Value::from_float(2.0));
        b.put_reference("a", Value::from_int(1));
        assert!(a.equals(&b));
        assert_ne!(a, b);
    }

    #[test]
    fn label_renames_leading_fields() {
        let mut r = rec(&[("a", 1), ("b", 2), ("c", 3)]);
        r.label(&["x".to_string(), "c".to_string()]);
        assert_eq!(keys(&r), ["x", "c"]);
        assert_eq!(r.get("c"), Some(&Value::from_int(2)));
    }

    #[test]
    fn sort_and_move() {
        let mut r = rec(&[("c", 3), ("a", 1), ("b", 2)]);
        r.sort_by_key();
        assert_eq!(keys(&r), ["a", "b", "c"]);
        r.move_to_head("c");
        assert_eq!(keys(&r), ["c", "a", "b"]);
        r.move_to_tail("c");
        assert_eq!(keys(&r), ["a", "b", "c"]);
    }

    #[test]
    fn flatten_and_unflatten() {
        let mut r = Record::new();
        r.put_reference("id", Value::from_int(1));
        r.put_indexed(&[Value::from_string("req"), Value::from_string("method")], &Value::from_string("GET"))
            .expect("assign");
        r.put_reference("tags", Value::from_array(vec![Value::from_string("a"), Value::from_string("b")]));
        r.put_reference("empty", Value::Map(Record::new()));
        let nested = r.copy();

        r.flatten(".");
        assert_eq!(keys(&r), ["id", "req.method", "tags.1", "tags.2", "empty"]);
        assert_eq!(r.get("empty"), Some(&Value::from_string("{}")));

        r.unflatten(".");
        assert_eq!(r, nested);
    }

    #[test]
    fn selected_values_joined_requires_every_field() {
        let r = rec(&[("a", 1), ("b", 2)]);
        assert_eq!(r.selected_values_joined(&["b".into(), "a".into()]), Some("2,1".to_string()));
        assert_eq!(r.selected_values_joined(&["a".into(), "z".into()]), None);
    }

    #[test]
    fn into_iter_yields_in_order() {
        let r = rec(&[("x", 1), ("y", 2)]);
        let collected: Vec<(String, Value)> = r.into_iter().collect();
        assert_eq!(collected[0].0, "x");
        assert_eq!(collected[1].0, "y");
    }
}
