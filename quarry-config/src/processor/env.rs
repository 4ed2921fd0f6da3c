use std::env;

use quarry_core::err::{Context, Result};

use crate::ctx::Ctx;

use super::{ConfigExprProcessor, ConfigStringExpr as X};

/// Interpolates configuration using environment variables, eg `${ENV:DB_PASSWORD}`
#[derive(Default)]
pub(crate) struct EnvConfigProcessor {}

impl ConfigExprProcessor for EnvConfigProcessor {
    fn display_name(&self) -> &str {
        "environment"
    }

    fn process(&self, _ctx: &Ctx, exp: X) -> Result<X> {
        let name = match exp.as_constant_interpolation().as_deref() {
            Some([prefix, name]) if prefix.eq_ignore_ascii_case("env") => Some(name.to_string()),
            _ => None,
        };
        let name = match name {
            Some(name) => name,
            None => return Ok(exp),
        };

        let val = env::var(&name)
            .with_context(|| format!("Failed to read environment variable \"{}\"", name))?;

        Ok(X::Constant(val))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn process(exp: X) -> Result<X> {
        EnvConfigProcessor::default().process(&Ctx::new(None), exp)
    }

    #[test]
    fn test_env_processor_resolves_var() {
        env::set_var("QUARRY_ENV_PROCESSOR_TEST1", "value");

        let res = process(X::Interpolation(vec![
            X::Constant("ENV".into()),
            X::Constant("QUARRY_ENV_PROCESSOR_TEST1".into()),
        ]));

        assert_eq!(res.unwrap(), X::Constant("value".into()));
    }

    #[test]
    fn test_env_processor_missing_var() {
        let res = process(X::Interpolation(vec![
            X::Constant("env".into()),
            X::Constant("QUARRY_ENV_PROCESSOR_TEST_MISSING".into()),
        ]));

        assert!(res.is_err());
    }

    #[test]
    fn test_env_processor_ignores_other_expressions() {
        let exp = X::Interpolation(vec![X::Constant("other".into()), X::Constant("a".into())]);

        assert_eq!(process(exp.clone()).unwrap(), exp);
        assert_eq!(
            process(X::Constant("abc".into())).unwrap(),
            X::Constant("abc".into())
        );
    }
}
