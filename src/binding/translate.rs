//! Validation error translation.

use validator::{ValidationError, ValidationErrors, ValidationErrorsKind};

/// Renders one field validation failure as a sentence.
pub trait Translator: Send + Sync + std::fmt::Debug {
    fn translate(&self, field: &str, error: &ValidationError) -> String;
}

/// English messages for the validator crate's built-in rules.
///
/// A message attached to the rule itself always wins.
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultTranslator;

impl Translator for DefaultTranslator {
    fn translate(&self, field: &str, error: &ValidationError) -> String {
        if let Some(message) = &error.message {
            return message.to_string();
        }
        let param = |name: &str| error.params.get(name).map(|v| v.to_string());
        match error.code.as_ref() {
            "required" => format!("{field} is a required field"),
            "email" => format!("{field} must be a valid email address"),
            "url" => format!("{field} must be a valid URL"),
            "length" => match (param("equal"), param("min"), param("max")) {
                (Some(n), _, _) => format!("{field} must be exactly {n} characters long"),
                (None, Some(min), Some(max)) => {
                    format!("{field} must be between {min} and {max} characters long")
                }
                (None, Some(min), None) => format!("{field} must be at least {min} characters long"),
                (None, None, Some(max)) => format!("{field} must be at most {max} characters long"),
                (None, None, None) => format!("{field} has an invalid length"),
            },
            "range" => match (param("min"), param("max")) {
                (Some(min), Some(max)) => format!("{field} must be between {min} and {max}"),
                (Some(min), None) => format!("{field} must be {min} or greater"),
                (None, Some(max)) => format!("{field} must be {max} or less"),
                (None, None) => format!("{field} is out of range"),
            },
            code => format!("{field} failed on the '{code}' rule"),
        }
    }
}

/// Translate every field error, nested ones included, ordered by field path.
pub fn translate_all(errors: &ValidationErrors, translator: &dyn Translator) -> Vec<String> {
    let mut collected = Vec::new();
    collect("", errors, &mut collected);
    collected.sort_by(|a, b| a.0.cmp(&b.0));
    collected
        .into_iter()
        .flat_map(|(path, errs)| {
            errs.iter()
                .map(|e| translator.translate(&path, e))
                .collect::<Vec<_>>()
        })
        .collect()
}

fn collect<'a>(
    prefix: &str,
    errors: &'a ValidationErrors,
    out: &mut Vec<(String, &'a [ValidationError])>,
) {
    for (field, kind) in errors.errors() {
        let path = if prefix.is_empty() {
            field.to_string()
        } else {
            format!("{prefix}.{field}")
        };
        match kind {
            ValidationErrorsKind::Field(errs) => out.push((path, errs.as_slice())),
            ValidationErrorsKind::Struct(inner) => collect(&path, inner, out),
            ValidationErrorsKind::List(items) => {
                for (index, inner) in items {
                    collect(&format!("{path}[{index}]"), inner, out);
                }
            }
        }
    }
}
