//! Execution-context handle threaded through every `handle` call.
//!
//! A [`Context`] is an immutable, cheaply clonable bag of values keyed by
//! their Rust type. Deriving a context with [`Context::with_value`] never
//! changes the parent, so a context can be handed to concurrent callees
//! freely. Modules that store something here wrap it in a private type,
//! which makes the key impossible to collide with.
//!
//! For code that cannot pass the handle explicitly, [`Context::scope`] and
//! [`Context::sync_scope`] make a context the task's current one, readable
//! through [`Context::current`].

use std::any::{Any, TypeId};
use std::future::Future;
use std::sync::Arc;

tokio::task_local! {
    static CURRENT: Context;
}

#[derive(Clone, Default)]
pub struct Context {
    head: Option<Arc<Entry>>,
}

struct Entry {
    type_id: TypeId,
    value: Arc<dyn Any + Send + Sync>,
    parent: Option<Arc<Entry>>,
}

impl Context {
    /// The empty context.
    pub fn background() -> Self {
        Context { head: None }
    }

    /// Return a child context carrying `value`; it shadows any earlier
    /// value of the same type.
    pub fn with_value<T: Any + Send + Sync>(&self, value: T) -> Self {
        Context {
            head: Some(Arc::new(Entry {
                type_id: TypeId::of::<T>(),
                value: Arc::new(value),
                parent: self.head.clone(),
            })),
        }
    }

    pub fn value<T: Any + Send + Sync>(&self) -> Option<&T> {
        let wanted = TypeId::of::<T>();
        let mut entry = self.head.as_deref();
        while let Some(e) = entry {
            if e.type_id == wanted {
                return e.value.downcast_ref::<T>();
            }
            entry = e.parent.as_deref();
        }
        None
    }

    /// The context installed by the innermost enclosing scope, or the
    /// background context outside of any scope.
    pub fn current() -> Self {
        CURRENT.try_with(Context::clone).unwrap_or_default()
    }

    /// Run `fut` with this context as the current one.
    pub async fn scope<F: Future>(self, fut: F) -> F::Output {
        CURRENT.scope(self, fut).await
    }

    /// Run `f` with this context as the current one.
    pub fn sync_scope<R>(self, f: impl FnOnce() -> R) -> R {
        CURRENT.sync_scope(self, f)
    }
}

impl std::fmt::Debug for Context {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut len = 0;
        let mut entry = self.head.as_deref();
        while let Some(e) = entry {
            len += 1;
            entry = e.parent.as_deref();
        }
        f.debug_struct("Context").field("values", &len).finish()
    }
}
