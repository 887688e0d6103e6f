//! Errors raised while compiling safety pattern catalogues.

use thiserror::Error;

/// A catalogue pattern failed to compile.
#[derive(Debug, Error)]
pub enum PatternError {
    #[error("Invalid pattern for rule '{rule}': {source}")]
    Invalid {
        rule: String,
        #[source]
        source: regex::Error,
    },
}

impl PatternError {
    pub fn invalid(rule: impl Into<String>, source: regex::Error) -> Self {
        PatternError::Invalid {
            rule: rule.into(),
            source,
        }
    }
}

/// Compiles a pattern, naming the rule on failure.
pub(crate) fn compile(rule: &str, pattern: &str) -> Result<regex::Regex, PatternError> {
    regex::Regex::new(pattern).map_err(|e| PatternError::invalid(rule, e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_failing_rule() {
        let err = compile("broken", "(unclosed").unwrap_err();
        assert!(err.to_string().starts_with("Invalid pattern for rule 'broken'"));
    }
}
