//! Datastore sessions as seen from the callbacks
//!
//! Sessions belong to the datastore. Callbacks only read from them: the
//! session id for logging and the datastore's schema context for building
//! trees.

use std::sync::Arc;

use crate::schema::SchemaContext;

/// A request-scoped datastore session
pub trait Session {
    /// Session identifier
    fn id(&self) -> u32;

    /// Schema context of the session's connection, if one is available
    fn context(&self) -> Option<&SchemaContext>;
}

/// In-process session over a fixed schema context
#[derive(Debug, Clone)]
pub struct LocalSession {
    id: u32,
    context: Option<Arc<SchemaContext>>,
}

impl LocalSession {
    /// Session over `context`
    pub fn new(id: u32, context: Arc<SchemaContext>) -> Self {
        Self {
            id,
            context: Some(context),
        }
    }

    /// Session whose connection has no schema context
    pub fn without_context(id: u32) -> Self {
        Self { id, context: None }
    }
}

impl Session for LocalSession {
    fn id(&self) -> u32 {
        self.id
    }

    fn context(&self) -> Option<&SchemaContext> {
        self.context.as_deref()
    }
}
