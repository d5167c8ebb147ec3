//! Gate parameters: concrete angles or named symbols.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A gate parameter.
///
/// Circuits built from tool calls carry constants. The variational ansatz
/// carries symbols (`θ[0]`, `θ[1]`, …) that stay unbound; simulating such a
/// circuit reports [`crate::IrError::UnboundParameter`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ParameterExpression {
    /// A constant numeric value.
    Constant(f64),
    /// A symbolic parameter.
    Symbol(String),
}

impl ParameterExpression {
    /// Create a constant parameter.
    pub fn constant(value: f64) -> Self {
        ParameterExpression::Constant(value)
    }

    /// Create a symbolic parameter.
    pub fn symbol(name: impl Into<String>) -> Self {
        ParameterExpression::Symbol(name.into())
    }

    /// Check if this parameter is a symbol.
    pub fn is_symbolic(&self) -> bool {
        matches!(self, ParameterExpression::Symbol(_))
    }

    /// The concrete value, if bound.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            ParameterExpression::Constant(v) => Some(*v),
            ParameterExpression::Symbol(_) => None,
        }
    }

    /// The concrete value, or an unbound-parameter error naming the symbol.
    pub fn value(&self) -> crate::IrResult<f64> {
        match self {
            ParameterExpression::Constant(v) => Ok(*v),
            ParameterExpression::Symbol(name) => {
                Err(crate::IrError::UnboundParameter(name.clone()))
            }
        }
    }

    /// Negate a constant; symbols are returned as `-name`.
    #[must_use]
    pub fn negated(&self) -> Self {
        match self {
            ParameterExpression::Constant(v) => ParameterExpression::Constant(-v),
            ParameterExpression::Symbol(name) => match name.strip_prefix('-') {
                Some(inner) => ParameterExpression::Symbol(inner.to_string()),
                None => ParameterExpression::Symbol(format!("-{name}")),
            },
        }
    }

    /// Format with a fixed number of decimals; symbols print verbatim.
    pub fn format_rounded(&self, decimals: usize) -> String {
        match self {
            ParameterExpression::Constant(v) => format!("{v:.decimals$}"),
            ParameterExpression::Symbol(name) => name.clone(),
        }
    }
}

impl fmt::Display for ParameterExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParameterExpression::Constant(v) => write!(f, "{v}"),
            ParameterExpression::Symbol(name) => write!(f, "{name}"),
        }
    }
}

impl From<f64> for ParameterExpression {
    fn from(value: f64) -> Self {
        ParameterExpression::Constant(value)
    }
}

impl From<i32> for ParameterExpression {
    fn from(value: i32) -> Self {
        ParameterExpression::Constant(f64::from(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constant() {
        let p = ParameterExpression::constant(1.5);
        assert!(!p.is_symbolic());
        assert_eq!(p.as_f64(), Some(1.5));
        assert_eq!(p.value().unwrap(), 1.5);
    }

    #[test]
    fn test_symbol_is_unbound() {
        let p = ParameterExpression::symbol("θ[3]");
        assert!(p.is_symbolic());
        assert_eq!(p.as_f64(), None);
        assert!(matches!(
            p.value(),
            Err(crate::IrError::UnboundParameter(name)) if name == "θ[3]"
        ));
    }

    #[test]
    fn test_negation() {
        assert_eq!(
            ParameterExpression::constant(0.25).negated(),
            ParameterExpression::constant(-0.25)
        );
        let s = ParameterExpression::symbol("a").negated();
        assert_eq!(s, ParameterExpression::symbol("-a"));
        assert_eq!(s.negated(), ParameterExpression::symbol("a"));
    }

    #[test]
    fn test_rounded_format() {
        assert_eq!(ParameterExpression::constant(0.5).format_rounded(3), "0.500");
        assert_eq!(
            ParameterExpression::constant(std::f64::consts::PI).format_rounded(2),
            "3.14"
        );
        assert_eq!(ParameterExpression::symbol("θ[0]").format_rounded(3), "θ[0]");
    }

    #[test]
    fn test_display_uses_shortest_float() {
        assert_eq!(ParameterExpression::from(0.5).to_string(), "0.5");
        assert_eq!(ParameterExpression::from(2).to_string(), "2");
    }
}
