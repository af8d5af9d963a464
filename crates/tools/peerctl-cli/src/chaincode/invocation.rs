//! Normalization of the `-c/--ctor` chaincode invocation JSON.
//!
//! Two shapes are accepted and end up as the same [`InvocationSpec`]:
//! `{"Args": ["fn", "a"]}` and the older `{"Function": "fn", "Args": ["a"]}`.

use serde::{Deserialize, Serialize};
use thiserror::Error;

const EXPECTED_KEYS: &str =
    "chaincode parameters must contain the following keys: 'Args' or 'Function' and 'Args'";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InvocationError {
    #[error("must supply value for chaincode name parameter")]
    MissingName,

    #[error("chaincode argument error: {0}")]
    MalformedJson(String),

    #[error("incomplete chaincode invocation: {0}")]
    IncompleteInvocation(String),
}

#[derive(Deserialize, Debug)]
#[serde(deny_unknown_fields)]
struct RawInvocation {
    #[serde(rename = "Function", alias = "function")]
    function: Option<String>,
    #[serde(rename = "Args", alias = "args")]
    args: Option<Vec<String>>,
}

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct InvocationSpec {
    pub function: Option<String>,
    pub args: Vec<String>,
}

impl InvocationSpec {
    /// Validates `ctor_json` for the chaincode called `chaincode_name`.
    ///
    /// Checks run in order: chaincode name, JSON shape, then completeness.
    pub fn check_and_normalize(
        ctor_json: &str,
        chaincode_name: &str,
    ) -> Result<InvocationSpec, InvocationError> {
        if chaincode_name.is_empty() {
            return Err(InvocationError::MissingName);
        }

        let value: serde_json::Value = serde_json::from_str(ctor_json)
            .map_err(|e| InvocationError::MalformedJson(e.to_string()))?;
        if !value.is_object() {
            return Err(InvocationError::MalformedJson(format!(
                "expected a JSON object, got '{}'",
                ctor_json.trim()
            )));
        }
        let raw: RawInvocation = serde_json::from_value(value)
            .map_err(|e| InvocationError::MalformedJson(e.to_string()))?;

        let function = raw.function.filter(|f| !f.is_empty());
        match (function, raw.args) {
            (function, Some(args)) if !args.is_empty() => Ok(InvocationSpec { function, args }),
            (_, Some(_)) => Err(InvocationError::IncompleteInvocation(format!(
                "'Args' must not be empty; {}",
                EXPECTED_KEYS
            ))),
            (Some(function), None) => Err(InvocationError::IncompleteInvocation(format!(
                "'Function' ({}) given without 'Args'; {}",
                function, EXPECTED_KEYS
            ))),
            (None, None) => Err(InvocationError::IncompleteInvocation(format!(
                "empty JSON {}",
                EXPECTED_KEYS
            ))),
        }
    }

    /// The argument list sent to the chaincode; an explicit function name
    /// becomes the first argument.
    pub fn to_input_args(&self) -> Vec<String> {
        match &self.function {
            Some(function) => std::iter::once(function.clone())
                .chain(self.args.iter().cloned())
                .collect(),
            None => self.args.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_calling_schema_is_accepted() {
        let spec = InvocationSpec::check_and_normalize(r#"{ "Args":["func", "param"] }"#, "somename")
            .unwrap();
        assert_eq!(spec.function, None);
        assert_eq!(spec.to_input_args(), vec!["func", "param"]);
    }

    #[test]
    fn old_calling_schema_is_accepted() {
        let spec =
            InvocationSpec::check_and_normalize(r#"{ "Function":"func", "Args":["param"] }"#, "somename")
                .unwrap();
        assert_eq!(spec.function.as_deref(), Some("func"));
        assert_eq!(spec.to_input_args(), vec!["func", "param"]);
    }

    #[test]
    fn missing_name_wins_over_valid_json() {
        let err = InvocationSpec::check_and_normalize(r#"{ "Function":"func", "Args":["param"] }"#, "")
            .unwrap_err();
        assert_eq!(err, InvocationError::MissingName);
    }

    #[test]
    fn missing_name_wins_over_malformed_json() {
        assert_eq!(
            InvocationSpec::check_and_normalize("{", "").unwrap_err(),
            InvocationError::MissingName
        );
    }

    #[test]
    fn function_only_is_incomplete() {
        let err =
            InvocationSpec::check_and_normalize(r#"{ "Function":"func" }"#, "somename").unwrap_err();
        assert!(matches!(err, InvocationError::IncompleteInvocation(ref m) if m.contains("func")));
    }

    #[test]
    fn function_with_empty_args_is_incomplete() {
        let err = InvocationSpec::check_and_normalize(r#"{ "Function":"f", "Args":[] }"#, "somename")
            .unwrap_err();
        assert!(matches!(err, InvocationError::IncompleteInvocation(_)));
    }

    #[test]
    fn empty_object_is_always_rejected() {
        for name in ["somename", "other", ""] {
            assert!(InvocationSpec::check_and_normalize("{}", name).is_err());
        }
        assert!(matches!(
            InvocationSpec::check_and_normalize("{}", "somename").unwrap_err(),
            InvocationError::IncompleteInvocation(_)
        ));
    }

    #[test]
    fn invalid_json_is_malformed() {
        for input in [r#"{["a","b","c"]}"#, r#"{"Function":}"#, r#"["a","b"]"#, r#"{"Args":[1,2]}"#] {
            assert!(
                matches!(
                    InvocationSpec::check_and_normalize(input, "somename"),
                    Err(InvocationError::MalformedJson(_))
                ),
                "expected malformed JSON for {input}"
            );
        }
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let err = InvocationSpec::check_and_normalize(r#"{"Args":["a"],"Extra":1}"#, "somename")
            .unwrap_err();
        assert!(matches!(err, InvocationError::MalformedJson(_)));
    }

    #[test]
    fn lowercase_keys_are_accepted() {
        let spec =
            InvocationSpec::check_and_normalize(r#"{"function":"f","args":["a","b","c"]}"#, "somename")
                .unwrap();
        assert_eq!(spec.function.as_deref(), Some("f"));
        assert_eq!(spec.args, vec!["a", "b", "c"]);
    }

    #[test]
    fn empty_function_name_counts_as_absent() {
        let spec = InvocationSpec::check_and_normalize(r#"{"Function":"","Args":["a"]}"#, "somename")
            .unwrap();
        assert_eq!(spec.function, None);
    }
}
