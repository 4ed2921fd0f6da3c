use quarry_core::err::{Context, Result};

use crate::ctx::Ctx;

use super::{ConfigExprProcessor, ConfigStringExpr as X};

/// Interpolates the directory of the current config file, eg `${dir}/data`
#[derive(Default)]
pub(crate) struct DirConfigProcessor {}

impl ConfigExprProcessor for DirConfigProcessor {
    fn display_name(&self) -> &str {
        "directory"
    }

    fn process(&self, ctx: &Ctx, exp: X) -> Result<X> {
        if !matches!(exp.as_constant_interpolation().as_deref(), Some(["dir"])) {
            return Ok(exp);
        }

        let dir = ctx
            .dir()
            .context("Cannot resolve ${dir} for config not loaded from a file")?;

        Ok(X::Constant(dir.display().to_string()))
    }
}
