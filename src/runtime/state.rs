use crate::{
    core::Container,
    runtime::{Scope, Value},
};

/// The shared interpreter state: a global scope plus a stack of local scopes. A local scope is
/// pushed whenever a paused generator body resumes and popped when it suspends again.
pub struct RuntimeState {
    globals: Container<Scope>,
    locals: Vec<Container<Scope>>,
}

impl RuntimeState {
    pub fn new() -> Container<Self> {
        Container::new(Self {
            globals: Container::new(Scope::default()),
            locals: vec![],
        })
    }

    /// Resolve a name against the innermost local scope, falling back to the globals. There is
    /// no lexical nesting between generator scopes, so only the top of the stack is searched.
    pub fn read(&self, name: &str) -> Option<Value> {
        if let Some(local) = self.locals.last() {
            if let Some(value) = local.borrow().get(name) {
                return Some(value);
            }
        }

        self.globals.borrow().get(name)
    }

    /// Write to the innermost local scope, or to the globals when no generator is executing.
    pub fn write(&mut self, name: &str, value: Value) {
        match self.locals.last() {
            Some(local) => {
                local.borrow_mut().insert(name, value);
            }
            None => {
                self.globals.borrow_mut().insert(name, value);
            }
        }
    }

    pub fn read_global(&self, name: &str) -> Option<Value> {
        self.globals.borrow().get(name)
    }

    pub fn write_global(&mut self, name: &str, value: Value) {
        self.globals.borrow_mut().insert(name, value);
    }

    pub fn push_local(&mut self, scope: Container<Scope>) {
        self.locals.push(scope);
    }

    pub fn pop_local(&mut self) -> Option<Container<Scope>> {
        self.locals.pop()
    }
}
