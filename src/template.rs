//! The `{key}` substitution grammar used to assemble `llms.txt`.
//!
//! This is intentionally tiny: placeholders are `{key}` (case-insensitive),
//! substituted by sequential reduction over the variable list. A placeholder
//! that resolves to nothing is removed together with the blank line that
//! precedes it, so optional sections (`{details}`, a missing description)
//! never leave stray double blank lines in the assembled document.
//! Placeholders with no corresponding variable are left untouched.

use regex::Regex;

/// Ordered set of template variables.
///
/// Insertion order is the substitution order; `None` means "remove the
/// placeholder" while a missing key leaves `{key}` literally in the output.
#[derive(Debug, Clone, Default)]
pub struct TemplateVariables {
    entries: Vec<(String, Option<String>)>,
}

impl TemplateVariables {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a variable, replacing any earlier value for the same key.
    pub fn set(&mut self, key: &str, value: Option<String>) {
        match self.entries.iter_mut().find(|(k, _)| k == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key.to_string(), value)),
        }
    }

    /// Fill a variable only when it is currently unset.
    ///
    /// Explicit caller-supplied values (including empty ones) always win;
    /// defaulting only fills gaps.
    pub fn set_default(&mut self, key: &str, value: Option<String>) {
        if self.get(key).is_none() {
            self.set(key, value);
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .and_then(|(_, v)| v.as_deref())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, Option<&str>)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_deref()))
    }
}

/// Regex matching `{key}` with an optional preceding blank line captured.
fn template_variable(key: &str) -> Regex {
    Regex::new(&format!(r"(?i)(\n\s*\n)?\{{{}\}}", regex::escape(key)))
        .expect("escaped key always forms a valid pattern")
}

/// Replace every `{variable}` occurrence in `content`.
///
/// An empty or absent value falls back to `fallback`; when both are empty
/// the placeholder is removed along with any captured leading blank line.
/// A non-empty substitution restores the blank line as exactly `\n\n`.
pub fn replace_template_variable(
    content: &str,
    variable: &str,
    value: Option<&str>,
    fallback: Option<&str>,
) -> String {
    let re = template_variable(variable);
    let resolved = value
        .filter(|v| !v.is_empty())
        .or_else(|| fallback.filter(|f| !f.is_empty()));

    re.replace_all(content, |caps: &regex::Captures| match resolved {
        Some(val) if caps.get(1).is_some() => format!("\n\n{val}"),
        Some(val) => val.to_string(),
        None => String::new(),
    })
    .into_owned()
}

/// Expand a template by sequentially substituting every variable.
pub fn expand_template(template: &str, variables: &TemplateVariables) -> String {
    variables.iter().fold(template.to_string(), |acc, (key, value)| {
        replace_template_variable(&acc, key, value, None)
    })
}
