use quarry_core::err::Result;

use crate::ctx::Ctx;

pub(crate) mod dir;
pub(crate) mod env;
pub(crate) mod util;

/// A config processor resolves interpolated expressions in config strings
pub(crate) trait ConfigExprProcessor {
    /// Gets the human readable display name for the processor
    fn display_name(&self) -> &str;

    /// Resolves the supplied expression, returning it unchanged if it is
    /// not handled by this processor
    fn process(&self, ctx: &Ctx, exp: ConfigStringExpr) -> Result<ConfigStringExpr>;
}

/// AST used to represent configuration expressions
#[derive(Debug, PartialEq, Clone)]
pub(crate) enum ConfigStringExpr {
    Constant(String),
    Concat(Vec<ConfigStringExpr>),
    /// Represents an interpolated value used in the configuration
    /// Format ${[part 1]:[part 2]..:[part n]}
    /// For instance, ${ENV:some_env_var}
    Interpolation(Vec<ConfigStringExpr>),
}

impl ConfigStringExpr {
    /// Returns the parts of an interpolation if they are all constants
    pub(crate) fn as_constant_interpolation(&self) -> Option<Vec<&str>> {
        match self {
            ConfigStringExpr::Interpolation(parts) => parts
                .iter()
                .map(|p| match p {
                    ConfigStringExpr::Constant(s) => Some(s.as_str()),
                    _ => None,
                })
                .collect(),
            _ => None,
        }
    }
}
