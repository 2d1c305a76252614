//! Typed access to property-list manifests.
//!
//! Every lookup is independently optional: a missing key or a value of the
//! wrong type yields `None` for that key only, so callers can assemble a
//! record from whatever fields a manifest happens to carry.

use crate::{Error, Result};
use plist::{Dictionary, Value};

/// Field lookups on one property-list document.
pub trait PlistAccessor {
    /// String value for `key`, or `None` if absent or not a string.
    fn get_string(&self, key: &str) -> Option<String>;

    /// Array of unsigned integers for `key`.
    ///
    /// `None` if the key is absent, is not an array, or any element is not
    /// an unsigned integer.
    fn get_u64_array(&self, key: &str) -> Option<Vec<u64>>;

    fn get_bool(&self, key: &str) -> Option<bool>;
}

/// A parsed property list whose root is a dictionary.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlistData {
    dict: Dictionary,
}

impl PlistData {
    /// Parse XML or binary plist bytes.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Plist`] if the bytes are not a property list and
    /// [`Error::Manifest`] if the root is not a dictionary.
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        let value: Value = plist::from_bytes(data)?;
        match value {
            Value::Dictionary(dict) => Ok(Self { dict }),
            _ => Err(Error::Manifest("root is not a dictionary".into())),
        }
    }

    /// Nested dictionary for `key`.
    pub fn get_dict(&self, key: &str) -> Option<PlistData> {
        self.dict
            .get(key)
            .and_then(Value::as_dictionary)
            .map(|dict| PlistData { dict: dict.clone() })
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.dict.get(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.dict.keys().map(String::as_str)
    }
}

impl From<Dictionary> for PlistData {
    fn from(dict: Dictionary) -> Self {
        Self { dict }
    }
}

impl PlistAccessor for PlistData {
    fn get_string(&self, key: &str) -> Option<String> {
        self.dict
            .get(key)
            .and_then(Value::as_string)
            .map(str::to_string)
    }

    fn get_u64_array(&self, key: &str) -> Option<Vec<u64>> {
        self.dict
            .get(key)?
            .as_array()?
            .iter()
            .map(Value::as_unsigned_integer)
            .collect()
    }

    fn get_bool(&self, key: &str) -> Option<bool> {
        self.dict.get(key).and_then(Value::as_boolean)
    }
}
