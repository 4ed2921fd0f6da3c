use std::sync::Arc;

use quarry_connectors_base::{
    common::{Command, CommandSource},
    interface::{LoggedQuery, QueryHandle},
};
use quarry_core::err::{Context, Result};
use quarry_logging::trace;

use super::{executor::MemoryQueryExecutor, MemoryDatabase, MemoryResultSet};

pub struct MemoryQueryHandle {
    command: Command,
    data: Arc<MemoryDatabase>,
}

impl MemoryQueryHandle {
    pub fn new(command: Command, data: Arc<MemoryDatabase>) -> Self {
        Self { command, data }
    }

    pub fn command(&self) -> &Command {
        &self.command
    }
}

impl QueryHandle for MemoryQueryHandle {
    type TResultSet = MemoryResultSet;

    fn execute(&mut self) -> Result<MemoryResultSet> {
        trace!("Executing memory command: {}", self.command);

        match &self.command.source {
            CommandSource::Query(query) => {
                MemoryQueryExecutor::parse(query)?.run(&self.data, &self.command)
            }
            CommandSource::Function(name) => {
                let function = self
                    .data
                    .function(name)
                    .with_context(|| format!("Unknown function \"{}\"", name))?;

                let rows = function(&self.command.params)
                    .with_context(|| format!("Failed to execute function \"{}\"", name))?;

                MemoryResultSet::from_records(rows)
            }
        }
    }

    fn logged(&self) -> Result<LoggedQuery> {
        let mut logged = LoggedQuery::new(
            self.command.to_string(),
            self.command.params.logged(),
            None,
        );

        if let Some(skip) = self.command.skip {
            logged.other_mut().insert("skip".into(), skip.to_string());
        }

        if let Some(limit) = self.command.limit {
            logged.other_mut().insert("limit".into(), limit.to_string());
        }

        Ok(logged)
    }
}
