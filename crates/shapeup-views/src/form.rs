//! Forms as seen by the processing views.
//!
//! The [`Form`] trait is the contract a form view needs: bind submitted data,
//! validate it, report cleaned values or errors, and describe itself to the
//! template. [`FormClass`] is the constructor the view holds in place of a
//! form type.
//!
//! [`FormDefinition`] and [`BaseForm`] are a ready-made implementation for
//! simple field lists. Validation follows the usual two steps: each field is
//! coerced and checked on its own, then an optional form-wide `clean` hook
//! sees the cleaned values. Errors accumulate instead of short-circuiting.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{json, Value};

use shapeup_http::{Files, QueryDict};

use crate::fields::FieldValues;

/// Validation errors keyed by field name. Form-wide errors use
/// [`NON_FIELD_ERRORS`].
pub type FormErrors = BTreeMap<String, Vec<String>>;

/// Error key for errors that belong to the form rather than one field.
pub const NON_FIELD_ERRORS: &str = "__all__";

/// A form a view can bind, validate, and render.
#[async_trait]
pub trait Form: Send + Sync {
    /// Whether the form was constructed with submitted data.
    fn is_bound(&self) -> bool;

    /// Runs validation. Unbound forms are never valid.
    async fn is_valid(&mut self) -> bool;

    /// Errors from the last validation.
    fn errors(&self) -> &FormErrors;

    /// Cleaned values from the last successful validation.
    fn cleaned_data(&self) -> &FieldValues;

    /// The initial values the form was built with.
    fn initial(&self) -> &FieldValues;

    /// The form's template representation.
    fn as_context(&self) -> Value;
}

/// Constructs forms of one kind.
pub trait FormClass: Send + Sync {
    type Form: Form;

    /// Builds a form. `data` is `Some` for a submission, which makes the form
    /// bound; `initial` pre-populates an unbound form.
    fn build(
        &self,
        data: Option<&QueryDict>,
        files: Option<&Files>,
        initial: FieldValues,
    ) -> Self::Form;
}

/// The type of a [`FormField`], controlling coercion and checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldKind {
    Char { max_length: Option<usize> },
    Integer { min_value: Option<i64>, max_value: Option<i64> },
    Boolean,
    Email,
    File,
}

/// One field of a [`FormDefinition`].
#[derive(Debug, Clone, PartialEq)]
pub struct FormField {
    pub name: String,
    pub kind: FieldKind,
    pub required: bool,
    pub label: String,
    pub initial: Option<Value>,
}

impl FormField {
    /// Creates a required field labelled from its name.
    pub fn new(name: &str, kind: FieldKind) -> Self {
        Self {
            name: name.to_string(),
            kind,
            required: true,
            label: default_label(name),
            initial: None,
        }
    }

    pub fn char(name: &str) -> Self {
        Self::new(name, FieldKind::Char { max_length: None })
    }

    pub fn integer(name: &str) -> Self {
        Self::new(
            name,
            FieldKind::Integer {
                min_value: None,
                max_value: None,
            },
        )
    }

    pub fn boolean(name: &str) -> Self {
        Self::new(name, FieldKind::Boolean)
    }

    pub fn email(name: &str) -> Self {
        Self::new(name, FieldKind::Email)
    }

    pub fn file(name: &str) -> Self {
        Self::new(name, FieldKind::File)
    }

    #[must_use]
    pub const fn optional(mut self) -> Self {
        self.required = false;
        self
    }

    #[must_use]
    pub fn label(mut self, label: &str) -> Self {
        self.label = label.to_string();
        self
    }

    #[must_use]
    pub fn initial(mut self, value: impl Into<Value>) -> Self {
        self.initial = Some(value.into());
        self
    }

    /// Sets the maximum length of a `Char` field. Ignored for other kinds.
    #[must_use]
    pub fn max_length(mut self, max: usize) -> Self {
        if let FieldKind::Char { max_length } = &mut self.kind {
            *max_length = Some(max);
        }
        self
    }

    /// Sets the bounds of an `Integer` field. Ignored for other kinds.
    #[must_use]
    pub fn range(mut self, min: Option<i64>, max: Option<i64>) -> Self {
        if let FieldKind::Integer {
            min_value,
            max_value,
        } = &mut self.kind
        {
            *min_value = min;
            *max_value = max;
        }
        self
    }

    /// Coerces and checks a raw submitted value.
    fn clean(&self, raw: Option<&str>) -> Result<Value, Vec<String>> {
        if self.kind == FieldKind::Boolean {
            let checked = raw.is_some_and(|v| !matches!(v, "" | "false" | "False" | "0" | "off"));
            if self.required && !checked {
                return Err(vec!["This field is required.".to_string()]);
            }
            return Ok(Value::Bool(checked));
        }

        let raw = raw.unwrap_or("");
        if raw.is_empty() {
            if self.required {
                return Err(vec!["This field is required.".to_string()]);
            }
            return Ok(self.initial.clone().unwrap_or(Value::Null));
        }

        match &self.kind {
            FieldKind::Char { max_length } => {
                let length = raw.chars().count();
                match max_length {
                    Some(max) if length > *max => Err(vec![format!(
                        "Ensure this value has at most {max} characters (it has {length})."
                    )]),
                    _ => Ok(Value::String(raw.to_string())),
                }
            }
            FieldKind::Integer {
                min_value,
                max_value,
            } => {
                let Ok(n) = raw.trim().parse::<i64>() else {
                    return Err(vec!["Enter a whole number.".to_string()]);
                };
                let mut errors = Vec::new();
                if let Some(min) = min_value.filter(|min| n < *min) {
                    errors.push(format!("Ensure this value is greater than or equal to {min}."));
                }
                if let Some(max) = max_value.filter(|max| n > *max) {
                    errors.push(format!("Ensure this value is less than or equal to {max}."));
                }
                if errors.is_empty() {
                    Ok(json!(n))
                } else {
                    Err(errors)
                }
            }
            FieldKind::Email => {
                if is_valid_email(raw) {
                    Ok(Value::String(raw.to_string()))
                } else {
                    Err(vec!["Enter a valid email address.".to_string()])
                }
            }
            FieldKind::Boolean | FieldKind::File => Ok(Value::String(raw.to_string())),
        }
    }
}

fn default_label(name: &str) -> String {
    let spaced = name.replace('_', " ");
    let mut chars = spaced.chars();
    chars.next().map_or_else(String::new, |first| {
        first.to_uppercase().chain(chars).collect()
    })
}

static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^[a-zA-Z0-9._%+\-]+@(?:[a-zA-Z0-9](?:[a-zA-Z0-9\-]*[a-zA-Z0-9])?\.)+[a-zA-Z]{2,}$",
    )
    .expect("valid regex")
});

fn is_valid_email(value: &str) -> bool {
    EMAIL_RE.is_match(value)
}

/// A form-wide validation hook run after every field cleaned successfully.
pub type CleanFn = Arc<dyn Fn(&FieldValues) -> Result<(), FormErrors> + Send + Sync>;

/// A list of fields plus an optional form-wide check; builds [`BaseForm`]s.
///
/// # Examples
///
/// ```
/// use shapeup_views::form::{FormClass, FormDefinition, FormField};
/// use shapeup_views::FieldValues;
///
/// let definition = FormDefinition::new()
///     .field(FormField::char("title").max_length(80))
///     .field(FormField::boolean("published").optional());
///
/// let form = definition.build(None, None, FieldValues::new());
/// assert!(!shapeup_views::form::Form::is_bound(&form));
/// ```
#[derive(Clone, Default)]
pub struct FormDefinition {
    fields: Vec<FormField>,
    clean: Option<CleanFn>,
}

impl fmt::Debug for FormDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FormDefinition")
            .field("fields", &self.fields)
            .field("clean", &self.clean.is_some())
            .finish()
    }
}

impl FormDefinition {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn field(mut self, field: FormField) -> Self {
        self.fields.push(field);
        self
    }

    /// Sets the form-wide validation hook.
    #[must_use]
    pub fn clean<F>(mut self, clean: F) -> Self
    where
        F: Fn(&FieldValues) -> Result<(), FormErrors> + Send + Sync + 'static,
    {
        self.clean = Some(Arc::new(clean));
        self
    }

    pub fn fields(&self) -> &[FormField] {
        &self.fields
    }
}

impl FormClass for FormDefinition {
    type Form = BaseForm;

    fn build(
        &self,
        data: Option<&QueryDict>,
        files: Option<&Files>,
        initial: FieldValues,
    ) -> BaseForm {
        let defaults: FieldValues = self
            .fields
            .iter()
            .filter_map(|f| f.initial.clone().map(|v| (f.name.clone(), v)))
            .collect();

        let raw = data.map(|data| {
            self.fields
                .iter()
                .map(|f| (f.name.clone(), data.get(&f.name).map(String::from)))
                .collect()
        });

        BaseForm {
            definition: self.clone(),
            initial: defaults.merged(initial),
            raw,
            files: files.cloned().unwrap_or_default(),
            errors: FormErrors::new(),
            cleaned_data: FieldValues::new(),
        }
    }
}

/// A form built from a [`FormDefinition`].
#[derive(Debug, Clone)]
pub struct BaseForm {
    definition: FormDefinition,
    initial: FieldValues,
    raw: Option<HashMap<String, Option<String>>>,
    files: Files,
    errors: FormErrors,
    cleaned_data: FieldValues,
}

impl BaseForm {
    /// Errors that belong to the form as a whole.
    pub fn non_field_errors(&self) -> &[String] {
        self.errors.get(NON_FIELD_ERRORS).map_or(&[], Vec::as_slice)
    }

    /// The value a field displays: the submitted value once bound, the
    /// initial value before.
    fn display_value(&self, field: &FormField) -> Value {
        match &self.raw {
            Some(raw) => raw
                .get(&field.name)
                .cloned()
                .flatten()
                .map_or(Value::Null, Value::String),
            None => self.initial.get(&field.name).cloned().unwrap_or(Value::Null),
        }
    }

    fn clean_file(&self, field: &FormField) -> Result<Value, Vec<String>> {
        match self.files.get(field.name.as_str()) {
            Some(file) => Ok(json!({
                "name": file.name,
                "content_type": file.content_type,
                "size": file.size(),
            })),
            None if field.required => Err(vec!["This field is required.".to_string()]),
            None => Ok(Value::Null),
        }
    }
}

#[async_trait]
impl Form for BaseForm {
    fn is_bound(&self) -> bool {
        self.raw.is_some()
    }

    async fn is_valid(&mut self) -> bool {
        let Some(raw) = &self.raw else {
            return false;
        };

        let mut errors = FormErrors::new();
        let mut cleaned = FieldValues::new();
        for field in &self.definition.fields {
            let result = if field.kind == FieldKind::File {
                self.clean_file(field)
            } else {
                field.clean(raw.get(&field.name).and_then(Option::as_deref))
            };
            match result {
                Ok(value) => {
                    cleaned.insert(field.name.clone(), value);
                }
                Err(messages) => {
                    errors.insert(field.name.clone(), messages);
                }
            }
        }

        if errors.is_empty() {
            if let Some(clean) = &self.definition.clean {
                if let Err(form_errors) = clean(&cleaned) {
                    for (key, messages) in form_errors {
                        errors.entry(key).or_default().extend(messages);
                    }
                }
            }
        }

        self.cleaned_data = if errors.is_empty() {
            cleaned
        } else {
            FieldValues::new()
        };
        self.errors = errors;
        self.errors.is_empty()
    }

    fn errors(&self) -> &FormErrors {
        &self.errors
    }

    fn cleaned_data(&self) -> &FieldValues {
        &self.cleaned_data
    }

    fn initial(&self) -> &FieldValues {
        &self.initial
    }

    fn as_context(&self) -> Value {
        let fields: Vec<Value> = self
            .definition
            .fields
            .iter()
            .map(|field| {
                json!({
                    "name": field.name,
                    "label": field.label,
                    "required": field.required,
                    "value": self.display_value(field),
                    "errors": self.errors.get(&field.name).cloned().unwrap_or_default(),
                })
            })
            .collect();

        json!({
            "is_bound": self.is_bound(),
            "fields": fields,
            "errors": self.errors,
            "non_field_errors": self.non_field_errors(),
            "initial": self.initial,
            "cleaned_data": self.cleaned_data,
        })
    }
}
