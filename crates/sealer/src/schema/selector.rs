//! Target location selection over an export document.
//!
//! Walks the root `items` array and collects every login password and hidden
//! custom-field value that is in scope. The walk is read-only and tolerant:
//! unexpected shapes become [`SchemaWarning`]s instead of errors.

use common::SchemaWarning;
use serde_json::Value;

use super::location::{Location, Slot};

/// `items[].type` of a login item.
pub const LOGIN_ITEM_TYPE: u64 = 1;

/// `items[].fields[].type` of a hidden custom field.
pub const HIDDEN_FIELD_TYPE: u64 = 1;

/// Result of a selection pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    /// Target locations, in document order.
    pub locations: Vec<Location>,
    /// Shape problems encountered along the way.
    pub warnings: Vec<SchemaWarning>,
}

/// Select every in-scope target location of `document`.
///
/// Order: items in array order; within an item the login password first,
/// then hidden fields in array order. Only non-empty strings qualify.
pub fn select(document: &Value) -> Selection {
    let mut selection = Selection::default();

    let items = match document.get("items").and_then(Value::as_array) {
        Some(items) => items,
        None => {
            selection.warnings.push(SchemaWarning::MissingItems);
            return selection;
        }
    };

    for (i, item) in items.iter().enumerate() {
        if !item.is_object() {
            selection.warnings.push(SchemaWarning::ItemNotObject { item: i });
            continue;
        }
        if !has_type(item, LOGIN_ITEM_TYPE) {
            continue;
        }

        match item.get("login") {
            Some(login) if login.is_object() => {
                if is_nonempty_string(login.get("password")) {
                    selection.locations.push(Location {
                        item: i,
                        slot: Slot::LoginPassword,
                    });
                }
            }
            None | Some(Value::Null) => {}
            Some(_) => selection.warnings.push(SchemaWarning::LoginNotObject { item: i }),
        }

        match item.get("fields") {
            Some(Value::Array(fields)) => {
                for (j, field) in fields.iter().enumerate() {
                    if !field.is_object() {
                        selection
                            .warnings
                            .push(SchemaWarning::FieldNotObject { item: i, field: j });
                        continue;
                    }
                    if has_type(field, HIDDEN_FIELD_TYPE) && is_nonempty_string(field.get("value")) {
                        selection.locations.push(Location {
                            item: i,
                            slot: Slot::HiddenField(j),
                        });
                    }
                }
            }
            None | Some(Value::Null) => {}
            Some(_) => selection.warnings.push(SchemaWarning::FieldsNotArray { item: i }),
        }
    }

    selection
}

fn has_type(value: &Value, expected: u64) -> bool {
    value.get("type").and_then(Value::as_u64) == Some(expected)
}

fn is_nonempty_string(value: Option<&Value>) -> bool {
    matches!(value, Some(Value::String(s)) if !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn paths(sel: &Selection) -> Vec<String> {
        sel.locations.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn selects_password_and_hidden_fields_in_order() {
        let doc = json!({
            "items": [
                {
                    "type": 1,
                    "fields": [
                        {"type": 1, "value": "a"},
                        {"type": 0, "value": "text"},
                        {"type": 1, "value": "b"}
                    ],
                    "login": {"password": "pw", "username": "me"}
                },
                {"type": 1, "login": {"password": "pw2"}}
            ]
        });
        let sel = select(&doc);
        assert_eq!(
            paths(&sel),
            [
                "items[0].login.password",
                "items[0].fields[0].value",
                "items[0].fields[2].value",
                "items[1].login.password",
            ]
        );
        assert!(sel.warnings.is_empty());
    }

    #[test]
    fn non_login_items_are_ignored() {
        let doc = json!({
            "items": [
                {"type": 2, "secureNote": {"type": 0}, "fields": [{"type": 1, "value": "x"}]},
                {"type": 3, "card": {"number": "4111"}, "login": {"password": "nope"}}
            ]
        });
        assert!(select(&doc).locations.is_empty());
    }

    #[test]
    fn empty_and_non_string_values_are_skipped() {
        let doc = json!({
            "items": [{
                "type": 1,
                "login": {"password": ""},
                "fields": [
                    {"type": 1, "value": ""},
                    {"type": 1, "value": null},
                    {"type": 1, "value": 1234},
                    {"type": 1}
                ]
            }]
        });
        let sel = select(&doc);
        assert!(sel.locations.is_empty());
        assert!(sel.warnings.is_empty());
    }

    #[test]
    fn null_login_and_fields_are_tolerated() {
        let doc = json!({"items": [{"type": 1, "login": null, "fields": null}]});
        let sel = select(&doc);
        assert!(sel.locations.is_empty());
        assert!(sel.warnings.is_empty());
    }

    #[test]
    fn missing_items_warns() {
        for doc in [json!({"folders": []}), json!([1, 2]), json!({"items": {}})] {
            let sel = select(&doc);
            assert!(sel.locations.is_empty());
            assert_eq!(sel.warnings, [SchemaWarning::MissingItems]);
        }
    }

    #[test]
    fn malformed_shapes_warn() {
        let doc = json!({
            "items": [
                "not an item",
                {"type": 1, "login": "oops", "fields": {"a": 1}},
                {"type": 1, "fields": [7, {"type": 1, "value": "ok"}]}
            ]
        });
        let sel = select(&doc);
        assert_eq!(paths(&sel), ["items[2].fields[1].value"]);
        assert_eq!(
            sel.warnings,
            [
                SchemaWarning::ItemNotObject { item: 0 },
                SchemaWarning::LoginNotObject { item: 1 },
                SchemaWarning::FieldsNotArray { item: 1 },
                SchemaWarning::FieldNotObject { item: 2, field: 0 },
            ]
        );
    }

    #[test]
    fn string_type_is_not_login() {
        let doc = json!({"items": [{"type": "1", "login": {"password": "pw"}}]});
        assert!(select(&doc).locations.is_empty());
    }
}
