use std::fmt;

/// The info key under which the connectivity text block is stored.
pub const CONNECTIVITY_KEY: &str = "connectivity";

/// A scalar value stored in a structure's info map.
#[derive(Debug, Clone, PartialEq)]
pub enum InfoValue {
    Str(String),
    Int(i64),
    Float(f64),
    Bool(bool),
}

impl InfoValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for InfoValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Str(s) => f.write_str(s),
            Self::Int(i) => write!(f, "{}", i),
            Self::Float(x) => write!(f, "{}", x),
            Self::Bool(b) => f.write_str(if *b { "T" } else { "F" }),
        }
    }
}

impl From<String> for InfoValue {
    fn from(value: String) -> Self {
        Self::Str(value)
    }
}

impl From<&str> for InfoValue {
    fn from(value: &str) -> Self {
        Self::Str(value.to_string())
    }
}

impl From<i64> for InfoValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<f64> for InfoValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<bool> for InfoValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

/// Free-form per-structure metadata, kept in insertion order.
///
/// The map is opaque to the conversion logic: readers may attach any keys,
/// and writers serialize every entry. Only [`CONNECTIVITY_KEY`] is written
/// by the converters themselves.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InfoMap {
    entries: Vec<(String, InfoValue)>,
}

impl InfoMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets `key` to `value`, replacing an existing value in place.
    ///
    /// # Return
    ///
    /// The previous value, if the key was already present.
    pub fn insert(
        &mut self,
        key: impl Into<String>,
        value: impl Into<InfoValue>,
    ) -> Option<InfoValue> {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some((_, existing)) => Some(std::mem::replace(existing, value)),
            None => {
                self.entries.push((key, value));
                None
            }
        }
    }

    pub fn get(&self, key: &str) -> Option<&InfoValue> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn remove(&mut self, key: &str) -> Option<InfoValue> {
        let pos = self.entries.iter().position(|(k, _)| k == key)?;
        Some(self.entries.remove(pos).1)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &InfoValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K: Into<String>, V: Into<InfoValue>> FromIterator<(K, V)> for InfoMap {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut map = Self::new();
        for (k, v) in iter {
            map.insert(k, v);
        }
        map
    }
}
