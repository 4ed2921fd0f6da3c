use std::collections::BTreeMap;

use itertools::Itertools;
use quarry_connectors_base::common::{Command, CommandParams};
use quarry_core::data::{DataType, DataValue};
use quarry_logging::{debug, MaxLogLength};

use crate::{
    descriptor::{FinderDescriptor, ParamBinding, QuerySource},
    err::Result,
    result::FinderResult,
    FinderError,
};

impl FinderDescriptor {
    /// Executes the method with the supplied arguments
    ///
    /// Runs on the connection of the executor bound to this method, joining
    /// whatever unit of work is active on the calling thread.
    pub fn execute(&self, args: &[DataValue]) -> Result<FinderResult> {
        let command = self.command(args)?;

        debug!(
            "Executing finder {} on {} connection: {} with arguments {:?}",
            self.id,
            self.executor.category(),
            command.text(),
            MaxLogLength::new(Some(1024), &args)
        );

        let rows = self
            .executor
            .execute(command)
            .map_err(|e| FinderError::execution(&self.id, e))?;

        debug!(
            "Finder {} returned {} rows",
            self.id,
            rows.len()
        );

        Ok(FinderResult::shape(
            rows,
            self.return_shape,
            &self.entity,
            self.result_collection(),
        ))
    }

    /// Builds the command executed for the supplied arguments
    pub fn command(&self, args: &[DataValue]) -> Result<Command> {
        if args.len() != self.param_count {
            return Err(FinderError::argument(
                &self.id,
                format!(
                    "Expected {} arguments, found {}",
                    self.param_count,
                    args.len()
                ),
            ));
        }

        let skip = self.pagination(args, self.first_result, "first result")?;
        let limit = self.pagination(args, self.max_results, "max results")?;

        let mut values = BTreeMap::new();
        for (name, param) in self.placeholder_params.iter() {
            values.insert(
                name.clone(),
                self.placeholder_value(name, &param.r#type, &args[param.position])?,
            );
        }

        let rendered = self.source.template().render(&values).map_err(|e| {
            FinderError::Internal(format!("Failed to render {}: {}", self.id, e))
        })?;

        let command = match self.source {
            QuerySource::Query(_) => Command::query(rendered),
            QuerySource::Function(_) => Command::function(rendered),
        };

        let params = match &self.params {
            ParamBinding::Ordinal(positions) => {
                CommandParams::Ordinal(positions.iter().map(|p| args[*p].clone()).collect())
            }
            ParamBinding::Named(positions) => CommandParams::Named(
                positions
                    .iter()
                    .map(|(name, p)| (name.clone(), args[*p].clone()))
                    .collect(),
            ),
        };

        Ok(command
            .with_params(params)
            .with_skip(skip)
            .with_limit(limit))
    }

    // Null or negative values leave pagination unset
    fn pagination(&self, args: &[DataValue], pos: Option<usize>, role: &str) -> Result<Option<u64>> {
        let value = match pos {
            Some(pos) => &args[pos],
            None => return Ok(None),
        };

        if value.is_null() {
            return Ok(None);
        }

        match value.as_integer() {
            Some(int) if int < 0 => Ok(None),
            Some(int) => Ok(Some(u64::try_from(int).unwrap_or(u64::MAX))),
            None => Err(FinderError::argument(
                &self.id,
                format!("Integer expected for {} parameter, found {:?}", role, value),
            )),
        }
    }

    fn placeholder_value(&self, name: &str, r#type: &DataType, value: &DataValue) -> Result<String> {
        let value = match value {
            DataValue::Null => {
                return Err(FinderError::argument(
                    &self.id,
                    format!("Placeholder '{}' value can't be null", name),
                ))
            }
            DataValue::Utf8String(value) => value,
            other => {
                return Err(FinderError::argument(
                    &self.id,
                    format!(
                        "Placeholder '{}' value must be a string, found {:?}",
                        name, other
                    ),
                ))
            }
        };

        if let DataType::Enum(options) = r#type {
            if !options.contains(value) {
                return Err(FinderError::argument(
                    &self.id,
                    format!(
                        "Illegal value '{}' for enum placeholder '{}' of type {}, allowed values: [{}]",
                        value,
                        name,
                        options.name,
                        options.variants.iter().join(", ")
                    ),
                ));
            }
        }

        let defaults = self.placeholder_defaults(name);
        if !defaults.is_empty() && !defaults.contains(value) {
            return Err(FinderError::argument(
                &self.id,
                format!(
                    "Illegal value '{}' for placeholder '{}', allowed values: [{}]",
                    value,
                    name,
                    defaults.iter().join(", ")
                ),
            ));
        }

        Ok(value.clone())
    }
}
