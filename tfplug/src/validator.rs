//! Built-in attribute validators

use crate::schema::{Validator, ValidatorRequest, ValidatorResponse};
use crate::types::{Diagnostic, Dynamic};

/// Accepts only the listed integers
pub struct OneOfInt {
    values: Vec<i64>,
}

impl OneOfInt {
    pub fn new(values: &[i64]) -> Self {
        Self {
            values: values.to_vec(),
        }
    }
}

impl Validator for OneOfInt {
    fn description(&self) -> String {
        format!("value must be one of: {:?}", self.values)
    }

    fn validate(&self, request: ValidatorRequest) -> ValidatorResponse {
        let mut response = ValidatorResponse::default();
        if let Dynamic::Number(n) = request.config_value {
            if n.fract() != 0.0 || !self.values.contains(&(n as i64)) {
                response.diagnostics.push(
                    Diagnostic::error(
                        "Invalid Attribute Value Match",
                        format!(
                            "Attribute {} {}, got: {}",
                            request.path,
                            self.description(),
                            n
                        ),
                    )
                    .with_attribute(request.path),
                );
            }
        }
        response
    }
}

/// Accepts only the listed strings
pub struct OneOfString {
    values: Vec<String>,
}

impl OneOfString {
    pub fn new(values: &[&str]) -> Self {
        Self {
            values: values.iter().map(|v| v.to_string()).collect(),
        }
    }
}

impl Validator for OneOfString {
    fn description(&self) -> String {
        let quoted: Vec<String> = self.values.iter().map(|v| format!("{:?}", v)).collect();
        format!("value must be one of: [{}]", quoted.join(" "))
    }

    fn validate(&self, request: ValidatorRequest) -> ValidatorResponse {
        let mut response = ValidatorResponse::default();
        if let Dynamic::String(s) = &request.config_value {
            if !self.values.contains(s) {
                response.diagnostics.push(
                    Diagnostic::error(
                        "Invalid Attribute Value Match",
                        format!(
                            "Attribute {} {}, got: {:?}",
                            request.path,
                            self.description(),
                            s
                        ),
                    )
                    .with_attribute(request.path),
                );
            }
        }
        response
    }
}

/// Requires strings to match a regular expression
pub struct StringMatches {
    pattern: regex::Regex,
    message: String,
}

impl StringMatches {
    pub fn new(pattern: regex::Regex, message: &str) -> Self {
        Self {
            pattern,
            message: message.to_string(),
        }
    }
}

impl Validator for StringMatches {
    fn description(&self) -> String {
        self.message.clone()
    }

    fn validate(&self, request: ValidatorRequest) -> ValidatorResponse {
        let mut response = ValidatorResponse::default();
        if let Dynamic::String(s) = &request.config_value {
            if !self.pattern.is_match(s) {
                response.diagnostics.push(
                    Diagnostic::error(
                        "Invalid Attribute Value Match",
                        format!("Attribute {} {}, got: {:?}", request.path, self.message, s),
                    )
                    .with_attribute(request.path),
                );
            }
        }
        response
    }
}
