//! Request validation for community submissions
//!
//! Checks run over the raw JSON value so every problem is reported at once,
//! in the `{formErrors, fieldErrors}` shape the frontend already renders.
//! Strings are trimmed before their length is checked, and lengths count
//! characters rather than bytes.

use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::BTreeMap;

pub const TITLE_MIN: usize = 3;
pub const TITLE_MAX: usize = 100;
pub const DESCRIPTION_MAX: usize = 2000;
pub const DIFFICULTY_MIN: i64 = 1;
pub const DIFFICULTY_MAX: i64 = 10;
pub const COST_MAX: usize = 200;
pub const DURATION_MAX: usize = 100;
pub const LIST_MAX_ITEMS: usize = 25;
pub const LIST_ITEM_MAX: usize = 200;

pub const SUGGESTION_TITLE_MIN: usize = 5;
pub const SUGGESTION_TITLE_MAX: usize = 50;
pub const SUGGESTION_DESCRIPTION_MIN: usize = 10;
pub const SUGGESTION_DESCRIPTION_MAX: usize = 500;

/// The six list fields an edit may carry
pub const LIST_FIELDS: [&str; 6] = [
    "exams_to_give",
    "certifications",
    "qualifications_needed",
    "top_colleges_or_companies",
    "tools_and_resources",
    "real_life_applications",
];

/// Every problem found in one request body
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationErrors {
    /// Problems with the body as a whole
    pub form_errors: Vec<String>,
    /// Problems by field path (`title`, `newData.node_title`)
    pub field_errors: BTreeMap<String, Vec<String>>,
}

impl ValidationErrors {
    pub fn is_empty(&self) -> bool {
        self.form_errors.is_empty() && self.field_errors.is_empty()
    }

    pub fn form(&mut self, message: impl Into<String>) {
        self.form_errors.push(message.into());
    }

    pub fn field(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.field_errors
            .entry(path.into())
            .or_default()
            .push(message.into());
    }

    /// Messages recorded for one field path
    pub fn for_field(&self, path: &str) -> &[String] {
        self.field_errors.get(path).map(Vec::as_slice).unwrap_or(&[])
    }

    fn finish<T>(self, value: Option<T>) -> Result<T, ValidationErrors> {
        match value {
            Some(value) if self.is_empty() => Ok(value),
            _ => Err(self),
        }
    }
}

impl std::fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut parts: Vec<String> = self.form_errors.clone();
        for (field, messages) in &self.field_errors {
            parts.push(format!("{}: {}", field, messages.join(", ")));
        }
        write!(f, "{}", parts.join("; "))
    }
}

/// Proposed replacement content for a node, normalized
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProposedNodeData {
    pub node_title: String,
    pub description: String,
    pub difficulty_rating: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avg_cost_inr: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_years: Option<String>,
    /// Present list fields by name, entries trimmed with blanks dropped
    #[serde(flatten)]
    pub lists: BTreeMap<String, Vec<String>>,
}

/// A validated edit proposal
#[derive(Debug, Clone, PartialEq)]
pub struct EditRequest {
    pub node_key: String,
    pub original_data: Map<String, Value>,
    pub proposed: ProposedNodeData,
}

/// A validated new-path suggestion
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SuggestionRequest {
    pub title: String,
    pub description: String,
    pub parent_path: String,
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn path(prefix: &str, field: &str) -> String {
    if prefix.is_empty() {
        field.to_string()
    } else {
        format!("{}.{}", prefix, field)
    }
}

fn check_length(
    errors: &mut ValidationErrors,
    at: &str,
    value: &str,
    min: usize,
    max: usize,
) -> bool {
    let len = value.chars().count();
    if len < min {
        errors.field(at, format!("String must contain at least {} character(s)", min));
        false
    } else if len > max {
        errors.field(at, format!("String must contain at most {} character(s)", max));
        false
    } else {
        true
    }
}

/// Required string, trimmed, `min..=max` characters
fn required_string(
    errors: &mut ValidationErrors,
    obj: &Map<String, Value>,
    prefix: &str,
    field: &str,
    min: usize,
    max: usize,
) -> Option<String> {
    let at = path(prefix, field);
    match obj.get(field) {
        None | Some(Value::Null) => {
            errors.field(at, "Required");
            None
        }
        Some(Value::String(s)) => {
            let trimmed = s.trim();
            check_length(errors, &at, trimmed, min, max).then(|| trimmed.to_string())
        }
        Some(other) => {
            errors.field(at, format!("Expected string, received {}", type_name(other)));
            None
        }
    }
}

/// Optional string, trimmed, at most `max` characters; blank becomes absent
fn optional_string(
    errors: &mut ValidationErrors,
    obj: &Map<String, Value>,
    prefix: &str,
    field: &str,
    max: usize,
) -> Option<String> {
    let at = path(prefix, field);
    match obj.get(field) {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) => {
            let trimmed = s.trim();
            if !check_length(errors, &at, trimmed, 0, max) || trimmed.is_empty() {
                return None;
            }
            Some(trimmed.to_string())
        }
        Some(other) => {
            errors.field(at, format!("Expected string, received {}", type_name(other)));
            None
        }
    }
}

/// Optional list of strings; entries trimmed and blanks dropped
fn optional_list(
    errors: &mut ValidationErrors,
    obj: &Map<String, Value>,
    prefix: &str,
    field: &str,
) -> Option<Vec<String>> {
    let at = path(prefix, field);
    let items = match obj.get(field) {
        None | Some(Value::Null) => return None,
        Some(Value::Array(items)) => items,
        Some(other) => {
            errors.field(at, format!("Expected array, received {}", type_name(other)));
            return None;
        }
    };

    if items.len() > LIST_MAX_ITEMS {
        errors.field(
            &at,
            format!("Array must contain at most {} element(s)", LIST_MAX_ITEMS),
        );
        return None;
    }

    let mut clean = Vec::with_capacity(items.len());
    let mut ok = true;
    for (i, item) in items.iter().enumerate() {
        let item_at = format!("{}.{}", at, i);
        match item {
            Value::String(s) => {
                let trimmed = s.trim();
                if !check_length(errors, &item_at, trimmed, 0, LIST_ITEM_MAX) {
                    ok = false;
                } else if !trimmed.is_empty() {
                    clean.push(trimmed.to_string());
                }
            }
            other => {
                errors.field(
                    item_at,
                    format!("Expected string, received {}", type_name(other)),
                );
                ok = false;
            }
        }
    }
    ok.then_some(clean)
}

/// Required whole number in `min..=max`
fn required_integer(
    errors: &mut ValidationErrors,
    obj: &Map<String, Value>,
    prefix: &str,
    field: &str,
    min: i64,
    max: i64,
) -> Option<i64> {
    let at = path(prefix, field);
    let number = match obj.get(field) {
        None | Some(Value::Null) => {
            errors.field(at, "Required");
            return None;
        }
        Some(Value::Number(n)) => n,
        Some(other) => {
            errors.field(at, format!("Expected number, received {}", type_name(other)));
            return None;
        }
    };

    let value = match number.as_i64() {
        Some(v) => v,
        None => match number.as_f64() {
            Some(f) if f.fract() == 0.0 && f.abs() < 1e15 => f as i64,
            _ => {
                errors.field(at, "Expected integer, received float");
                return None;
            }
        },
    };

    if value < min {
        errors.field(at, format!("Number must be greater than or equal to {}", min));
        None
    } else if value > max {
        errors.field(at, format!("Number must be less than or equal to {}", max));
        None
    } else {
        Some(value)
    }
}

fn body_object(body: &Value) -> Result<&Map<String, Value>, ValidationErrors> {
    match body {
        Value::Object(obj) => Ok(obj),
        other => {
            let mut errors = ValidationErrors::default();
            errors.form(format!("Expected object, received {}", type_name(other)));
            Err(errors)
        }
    }
}

/// Validate `{ nodeKey, originalData, newData }`
pub fn validate_edit(body: &Value) -> Result<EditRequest, ValidationErrors> {
    let obj = body_object(body)?;
    let mut errors = ValidationErrors::default();

    let node_key = required_string(&mut errors, obj, "", "nodeKey", 1, usize::MAX);

    let original_data = match obj.get("originalData") {
        Some(Value::Object(map)) => Some(map.clone()),
        None | Some(Value::Null) => {
            errors.field("originalData", "Required");
            None
        }
        Some(other) => {
            errors.field(
                "originalData",
                format!("Expected object, received {}", type_name(other)),
            );
            None
        }
    };

    let proposed = match obj.get("newData") {
        Some(Value::Object(data)) => validate_node_data(&mut errors, data, "newData"),
        None | Some(Value::Null) => {
            errors.field("newData", "Required");
            None
        }
        Some(other) => {
            errors.field(
                "newData",
                format!("Expected object, received {}", type_name(other)),
            );
            None
        }
    };

    let request = match (node_key, original_data, proposed) {
        (Some(node_key), Some(original_data), Some(proposed)) => Some(EditRequest {
            node_key,
            original_data,
            proposed,
        }),
        _ => None,
    };
    errors.finish(request)
}

fn validate_node_data(
    errors: &mut ValidationErrors,
    data: &Map<String, Value>,
    prefix: &str,
) -> Option<ProposedNodeData> {
    let node_title = required_string(errors, data, prefix, "node_title", TITLE_MIN, TITLE_MAX);
    let description = required_string(errors, data, prefix, "description", 1, DESCRIPTION_MAX);
    let difficulty_rating = required_integer(
        errors,
        data,
        prefix,
        "difficulty_rating",
        DIFFICULTY_MIN,
        DIFFICULTY_MAX,
    );
    let avg_cost_inr = optional_string(errors, data, prefix, "avg_cost_inr", COST_MAX);
    let duration_years = optional_string(errors, data, prefix, "duration_years", DURATION_MAX);

    let mut lists = BTreeMap::new();
    for field in LIST_FIELDS {
        if let Some(items) = optional_list(errors, data, prefix, field) {
            lists.insert(field.to_string(), items);
        }
    }

    Some(ProposedNodeData {
        node_title: node_title?,
        description: description?,
        difficulty_rating: difficulty_rating?,
        avg_cost_inr,
        duration_years,
        lists,
    })
}

/// Validate `{ title, description, parentPath }`
pub fn validate_suggestion(body: &Value) -> Result<SuggestionRequest, ValidationErrors> {
    let obj = body_object(body)?;
    let mut errors = ValidationErrors::default();

    let title = required_string(
        &mut errors,
        obj,
        "",
        "title",
        SUGGESTION_TITLE_MIN,
        SUGGESTION_TITLE_MAX,
    );
    let description = required_string(
        &mut errors,
        obj,
        "",
        "description",
        SUGGESTION_DESCRIPTION_MIN,
        SUGGESTION_DESCRIPTION_MAX,
    );
    let parent_path = required_string(&mut errors, obj, "", "parentPath", 1, usize::MAX);

    let request = match (title, description, parent_path) {
        (Some(title), Some(description), Some(parent_path)) => Some(SuggestionRequest {
            title,
            description,
            parent_path,
        }),
        _ => None,
    };
    errors.finish(request)
}
