//! Shared fixtures for unit tests

use std::sync::{Arc, Mutex};

use quarry_connectors_base::common::Command;
use quarry_core::{config::ConnectionCategory, data::Record, err::Result};

use crate::{
    executor::{AcceptRule, ExecutorRegistry, FinderExecutor},
    types::EntityType,
};

/// Executor returning canned rows, used across the crate's tests
pub(crate) struct MockExecutor {
    pub category: ConnectionCategory,
    pub rule: AcceptRule,
    pub rows: Vec<Record>,
    pub commands: Mutex<Vec<Command>>,
}

impl MockExecutor {
    pub(crate) fn new(category: ConnectionCategory, rule: AcceptRule) -> Self {
        Self {
            category,
            rule,
            rows: vec![],
            commands: Mutex::new(vec![]),
        }
    }

    pub(crate) fn with_rows(mut self, rows: Vec<Record>) -> Self {
        self.rows = rows;
        self
    }

    pub(crate) fn commands(&self) -> Vec<Command> {
        self.commands.lock().unwrap().clone()
    }
}

impl FinderExecutor for MockExecutor {
    fn category(&self) -> ConnectionCategory {
        self.category
    }

    fn accept(&self, entity: &EntityType) -> bool {
        self.rule.accept(entity)
    }

    fn execute(&self, command: Command) -> Result<Vec<Record>> {
        self.commands.lock().unwrap().push(command);
        Ok(self.rows.clone())
    }
}

pub(crate) fn registry() -> ExecutorRegistry {
    ExecutorRegistry::new(
        vec![
            Arc::new(MockExecutor::new(
                ConnectionCategory::Document,
                AcceptRule::Documents,
            )),
            Arc::new(MockExecutor::new(
                ConnectionCategory::Object,
                AcceptRule::Entities(vec!["Person".into()]),
            )),
            Arc::new(MockExecutor::new(
                ConnectionCategory::Graph,
                AcceptRule::GraphElements,
            )),
        ],
        ConnectionCategory::Document,
    )
    .unwrap()
}

