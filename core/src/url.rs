//! Path-parameter substitution.
//!
//! Every literal `:<name>` in the URL template is replaced by the string form
//! of `params[name]`. Substitution is non-strict: placeholders without a
//! param and params without a placeholder are both ignored.
//!
//! Params are applied in map order. A name that is a prefix of another
//! placeholder (`:id` inside `:identifier`) is replaced inside the longer one
//! too; callers must avoid such overlapping names.

use serde_json::Value;

use crate::config::Params;

/// Resolve `:name` placeholders in `url`. `None` leaves the URL unchanged.
pub fn resolve(url: &str, params: Option<&Params>) -> String {
    let Some(params) = params else {
        return url.to_string();
    };
    params
        .iter()
        .fold(url.to_string(), |resolved, (name, value)| {
            resolved.replace(&format!(":{name}"), &param_string(value))
        })
}

/// Strings are used verbatim, everything else as its JSON text.
fn param_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn params(value: Value) -> Params {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn no_params_leaves_url_unchanged() {
        assert_eq!(resolve("/x/:id", None), "/x/:id");
    }

    #[test]
    fn substitutes_number_param() {
        let p = params(json!({"id": 42}));
        assert_eq!(resolve("/x/:id", Some(&p)), "/x/42");
    }

    #[test]
    fn substitutes_every_occurrence() {
        let p = params(json!({"id": "abc"}));
        assert_eq!(resolve("/x/:id/y/:id?ref=:id", Some(&p)), "/x/abc/y/abc?ref=abc");
    }

    #[test]
    fn multiple_params() {
        let p = params(json!({"user": "u1", "post": 7}));
        assert_eq!(resolve("/users/:user/posts/:post", Some(&p)), "/users/u1/posts/7");
    }

    #[test]
    fn missing_param_keeps_placeholder() {
        let p = params(json!({"other": 1}));
        assert_eq!(resolve("/x/:id", Some(&p)), "/x/:id");
    }

    #[test]
    fn non_string_values_use_json_text() {
        let p = params(json!({"flag": true, "none": null}));
        assert_eq!(resolve("/:flag/:none", Some(&p)), "/true/null");
    }

    #[test]
    fn empty_params_leave_url_unchanged() {
        let p = Params::new();
        assert_eq!(resolve("/x/:id", Some(&p)), "/x/:id");
    }
}
