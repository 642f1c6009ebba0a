use std::collections::HashMap;

use crate::{
    domain::ExecutionError,
    runtime::{GenDef, Value},
};

/// This represents a symbol table for a given scope.
#[derive(Debug, Default)]
pub struct Scope {
    symbol_table: HashMap<String, Value>,
}

impl Scope {
    /// Build the local scope for a new generator instance by binding its arguments to the
    /// parameters of its definition.
    pub fn bind(def: &GenDef, args: Vec<Value>) -> Result<Self, ExecutionError> {
        let params = def.params();
        if params.len() != args.len() {
            return Err(ExecutionError::TypeError(Some(format!(
                "{}() takes {} argument(s) but {} were given",
                def.name(),
                params.len(),
                args.len()
            ))));
        }

        let mut scope = Self::default();
        for (param, value) in params.iter().zip(args) {
            scope.insert(param, value);
        }

        Ok(scope)
    }

    pub fn get(&self, name: &str) -> Option<Value> {
        self.symbol_table.get(name).cloned()
    }

    /// Insert a `Value` to this `Scope`. The `Scope` is returned to allow calls to be chained.
    pub fn insert(&mut self, name: &str, value: Value) -> &mut Self {
        self.symbol_table.insert(name.to_string(), value);
        self
    }
}
