//! Scoped namespace context for registration.
//!
//! While a namespace is active on the current thread, every
//! [`Registry::register`](super::Registry::register) call on that thread files
//! its environment under it, overriding whatever namespace the id carried.
//! Plugin loading uses this to scope each plugin to its entry point name.

use std::cell::RefCell;

thread_local! {
    static CURRENT_NAMESPACE: RefCell<Option<String>> = const { RefCell::new(None) };
}

/// The namespace active on this thread.
pub fn current_namespace() -> Option<String> {
    CURRENT_NAMESPACE.with(|current| current.borrow().clone())
}

/// Restores the previous namespace when dropped.
#[must_use = "the namespace is reset as soon as the guard is dropped"]
#[derive(Debug)]
pub struct NamespaceGuard {
    previous: Option<String>,
}

impl Drop for NamespaceGuard {
    fn drop(&mut self) {
        let previous = self.previous.take();
        CURRENT_NAMESPACE.with(|current| *current.borrow_mut() = previous);
    }
}

/// Activate `ns` until the returned guard is dropped.
pub fn namespace(ns: impl Into<String>) -> NamespaceGuard {
    set_namespace(Some(ns.into()))
}

/// Clear the namespace until the returned guard is dropped.
pub fn no_namespace() -> NamespaceGuard {
    set_namespace(None)
}

fn set_namespace(ns: Option<String>) -> NamespaceGuard {
    let previous = CURRENT_NAMESPACE.with(|current| current.replace(ns));
    NamespaceGuard { previous }
}

/// Run `f` with `ns` active. The previous namespace is restored however `f`
/// exits, including by panic.
pub fn with_namespace<R>(ns: impl Into<String>, f: impl FnOnce() -> R) -> R {
    let _guard = namespace(ns);
    f()
}
