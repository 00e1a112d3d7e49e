//! Addresses of rewritable target slots inside an export document.

use serde_json::Value;

/// Which slot of an item a [`Location`] points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Slot {
    /// `items[i].login.password`
    LoginPassword,
    /// `items[i].fields[j].value`
    HiddenField(usize),
}

/// A target slot in the document: an item index plus the slot within it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Location {
    /// Index into the root `items` array.
    pub item: usize,
    /// Slot inside that item.
    pub slot: Slot,
}

impl Location {
    /// Borrow the string currently stored at this location, if any.
    pub fn value<'a>(&self, document: &'a Value) -> Option<&'a str> {
        self.lookup(document)?.as_str()
    }

    /// Mutably borrow the string stored at this location, if any.
    pub fn slot_mut<'a>(&self, document: &'a mut Value) -> Option<&'a mut String> {
        let item = document.get_mut("items")?.get_mut(self.item)?;
        let slot = match self.slot {
            Slot::LoginPassword => item.get_mut("login")?.get_mut("password")?,
            Slot::HiddenField(field) => item.get_mut("fields")?.get_mut(field)?.get_mut("value")?,
        };
        match slot {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    fn lookup<'a>(&self, document: &'a Value) -> Option<&'a Value> {
        let item = document.get("items")?.get(self.item)?;
        match self.slot {
            Slot::LoginPassword => item.get("login")?.get("password"),
            Slot::HiddenField(field) => item.get("fields")?.get(field)?.get("value"),
        }
    }
}

impl std::fmt::Display for Location {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.slot {
            Slot::LoginPassword => write!(f, "items[{}].login.password", self.item),
            Slot::HiddenField(field) => write!(f, "items[{}].fields[{field}].value", self.item),
        }
    }
}
