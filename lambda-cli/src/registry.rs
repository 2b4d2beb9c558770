//! Name-to-handler lookup table, built once at startup

use gorest::users::UsersApi;
use std::collections::HashMap;
use std::sync::Arc;

use crate::handlers::{Handler, ListUsersHandler, ReadUserHandler};

pub const LIST_USERS: &str = "list_users_handler";
pub const READ_USER: &str = "read_user_handler";

#[derive(Default)]
pub struct HandlerRegistry {
    handlers: HashMap<String, Arc<dyn Handler>>,
}

impl HandlerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with every users handler wired to `api`
    pub fn users(api: Arc<dyn UsersApi>) -> Self {
        let mut registry = Self::new();
        registry.register(LIST_USERS, Arc::new(ListUsersHandler::new(api.clone())));
        registry.register(READ_USER, Arc::new(ReadUserHandler::new(api)));
        registry
    }

    /// Add or replace a handler under `name`
    pub fn register(&mut self, name: impl Into<String>, handler: Arc<dyn Handler>) -> &mut Self {
        self.handlers.insert(name.into(), handler);
        self
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn Handler>> {
        self.handlers.get(name).cloned()
    }

    /// Registered names, sorted
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.handlers.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}
