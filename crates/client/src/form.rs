//! Typed form payloads and their wire encodings.
//!
//! Resources declare their fields explicitly (see [`FormData`]); the client
//! turns them into either a multipart body (file-bearing resources) or a JSON
//! object.

use reqwest::multipart::{Form, Part};
use serde_json::{Map, Value};

use crate::{ApiError, ApiResult};

/// How a resource's payload travels over the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Encoding {
    /// `multipart/form-data`; updates go out as `POST` + `_method=PUT`.
    Multipart,
    /// `application/json`; updates use a native `PUT`.
    Json,
}

/// A file selected in a form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadFile {
    pub file_name: String,
    pub mime: String,
    pub bytes: Vec<u8>,
}

impl UploadFile {
    pub fn new(file_name: impl Into<String>, mime: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            mime: mime.into(),
            bytes,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormValue {
    Text(String),
    Int(i64),
    /// Serialized as `"1"`/`"0"` in multipart, `true`/`false` in JSON.
    Bool(bool),
    /// An explicitly cleared optional field.
    Null,
    List(Vec<String>),
    File(UploadFile),
}

impl FormValue {
    fn to_json(&self) -> ApiResult<Value> {
        Ok(match self {
            FormValue::Text(s) => Value::String(s.clone()),
            FormValue::Int(n) => Value::from(*n),
            FormValue::Bool(b) => Value::Bool(*b),
            FormValue::Null => Value::Null,
            FormValue::List(items) => Value::Array(items.iter().cloned().map(Value::String).collect()),
            FormValue::File(f) => {
                return Err(ApiError::Encode(format!(
                    "file '{}' cannot be sent in a JSON body",
                    f.file_name
                )));
            }
        })
    }
}

/// Ordered field list of one form submission.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormPayload {
    fields: Vec<(String, FormValue)>,
}

impl FormPayload {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(mut self, name: &str, value: impl Into<String>) -> Self {
        self.fields.push((name.to_string(), FormValue::Text(value.into())));
        self
    }

    /// Optional text; `None` is sent as an explicit null so the server clears it.
    pub fn opt_text(mut self, name: &str, value: Option<&str>) -> Self {
        let value = match value {
            Some(v) => FormValue::Text(v.to_string()),
            None => FormValue::Null,
        };
        self.fields.push((name.to_string(), value));
        self
    }

    pub fn int(mut self, name: &str, value: i64) -> Self {
        self.fields.push((name.to_string(), FormValue::Int(value)));
        self
    }

    pub fn flag(mut self, name: &str, value: bool) -> Self {
        self.fields.push((name.to_string(), FormValue::Bool(value)));
        self
    }

    pub fn list<I, S>(mut self, name: &str, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let items = values.into_iter().map(Into::into).collect();
        self.fields.push((name.to_string(), FormValue::List(items)));
        self
    }

    /// Attach a file if one was selected; an untouched file input sends nothing.
    pub fn file(mut self, name: &str, file: Option<&UploadFile>) -> Self {
        if let Some(file) = file {
            self.fields.push((name.to_string(), FormValue::File(file.clone())));
        }
        self
    }

    pub fn get(&self, name: &str) -> Option<&FormValue> {
        self.fields.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    pub fn fields(&self) -> &[(String, FormValue)] {
        &self.fields
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Flatten to `(name, text)` pairs as they appear in a multipart body.
    ///
    /// Lists become repeated `name[]` entries; files are skipped.
    pub fn text_parts(&self) -> Vec<(String, String)> {
        let mut parts = Vec::new();
        for (name, value) in &self.fields {
            match value {
                FormValue::Text(s) => parts.push((name.clone(), s.clone())),
                FormValue::Int(n) => parts.push((name.clone(), n.to_string())),
                FormValue::Bool(b) => parts.push((name.clone(), if *b { "1" } else { "0" }.to_string())),
                FormValue::Null => parts.push((name.clone(), String::new())),
                FormValue::List(items) => {
                    let key = format!("{name}[]");
                    parts.extend(items.iter().map(|item| (key.clone(), item.clone())));
                }
                FormValue::File(_) => {}
            }
        }
        parts
    }

    /// Build a multipart body, optionally spoofing the HTTP method.
    pub fn to_multipart(&self, method_override: Option<&str>) -> ApiResult<Form> {
        let mut form = Form::new();
        for (name, text) in self.text_parts() {
            form = form.text(name, text);
        }
        for (name, value) in &self.fields {
            if let FormValue::File(file) = value {
                let part = Part::bytes(file.bytes.clone())
                    .file_name(file.file_name.clone())
                    .mime_str(&file.mime)
                    .map_err(|e| ApiError::Encode(format!("{name}: {e}")))?;
                form = form.part(name.clone(), part);
            }
        }
        if let Some(method) = method_override {
            form = form.text("_method", method.to_string());
        }
        Ok(form)
    }

    pub fn to_json(&self) -> ApiResult<Value> {
        let mut map = Map::new();
        for (name, value) in &self.fields {
            map.insert(name.clone(), value.to_json()?);
        }
        Ok(Value::Object(map))
    }
}

/// Typed payload records convert themselves into a [`FormPayload`].
pub trait FormData {
    fn to_form(&self) -> FormPayload;
}

impl FormData for FormPayload {
    fn to_form(&self) -> FormPayload {
        self.clone()
    }
}
