//! Immutable request context.
//!
//! A [`Context`] is a linked chain of typed bindings. Adding a binding
//! returns a new context sharing the parent's chain; the parent is never
//! modified, so clones can be handed to concurrent tasks freely.
//!
//! Keys are Rust types. A key type private to a module cannot collide with
//! bindings made anywhere else.

use std::any::{Any, TypeId};
use std::fmt;
use std::sync::Arc;

struct Binding {
    key: TypeId,
    value: Box<dyn Any + Send + Sync>,
    parent: Option<Arc<Binding>>,
}

/// Request-scoped, immutable key/value chain.
#[derive(Clone, Default)]
pub struct Context {
    head: Option<Arc<Binding>>,
}

impl Context {
    /// An empty context with no bindings.
    pub fn background() -> Self {
        Self::default()
    }

    /// Return a child context binding `value` under key type `K`.
    ///
    /// A later binding for the same key shadows earlier ones.
    pub fn with_value<K, V>(&self, value: V) -> Self
    where
        K: 'static,
        V: Any + Send + Sync,
    {
        Self {
            head: Some(Arc::new(Binding {
                key: TypeId::of::<K>(),
                value: Box::new(value),
                parent: self.head.clone(),
            })),
        }
    }

    /// Look up the nearest binding for key type `K`.
    ///
    /// Returns `None` when the key is unbound or when its nearest binding
    /// holds a value of a type other than `V`.
    pub fn value<K, V>(&self) -> Option<&V>
    where
        K: 'static,
        V: Any,
    {
        let key = TypeId::of::<K>();
        self.bindings()
            .find(|binding| binding.key == key)
            .and_then(|binding| binding.value.downcast_ref::<V>())
    }

    /// Number of bindings in the chain, shadowed ones included.
    pub fn depth(&self) -> usize {
        self.bindings().count()
    }

    fn bindings(&self) -> impl Iterator<Item = &Binding> {
        std::iter::successors(self.head.as_deref(), |binding| binding.parent.as_deref())
    }
}

impl fmt::Debug for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Context")
            .field("depth", &self.depth())
            .field("request_id", &get_from_context(Some(self)))
            .finish()
    }
}

/// Reserved key for the request identifier.
struct RequestIdKey;

/// Return a child of `parent` carrying `id` as the request identifier.
pub fn with_request_id(parent: &Context, id: impl Into<String>) -> Context {
    parent.with_value::<RequestIdKey, String>(id.into())
}

/// The request identifier stored in `ctx`, if any.
///
/// `Some("")` means an empty identifier was stored; `None` means none was.
pub fn get_from_context(ctx: Option<&Context>) -> Option<&str> {
    ctx?.value::<RequestIdKey, String>().map(String::as_str)
}

#[cfg(test)]
mod tests {
    use super::*;

    struct TenantKey;

    #[test]
    fn test_get_from_missing_context() {
        assert_eq!(get_from_context(None), None);
    }

    #[test]
    fn test_get_from_unenriched_context() {
        let ctx = Context::background();
        assert_eq!(get_from_context(Some(&ctx)), None);
    }

    #[test]
    fn test_get_from_enriched_context() {
        let ctx = with_request_id(&Context::background(), "value");
        assert_eq!(get_from_context(Some(&ctx)), Some("value"));
    }

    #[test]
    fn test_empty_id_is_still_found() {
        let ctx = with_request_id(&Context::background(), "");
        assert_eq!(get_from_context(Some(&ctx)), Some(""));
    }

    #[test]
    fn test_parent_is_not_modified() {
        let parent = Context::background().with_value::<TenantKey, _>("acme".to_string());
        let child = with_request_id(&parent, "abc");

        assert_eq!(get_from_context(Some(&parent)), None);
        assert_eq!(parent.depth(), 1);
        assert_eq!(get_from_context(Some(&child)), Some("abc"));
        assert_eq!(child.depth(), 2);
    }

    #[test]
    fn test_composes_with_unrelated_bindings() {
        let ctx = with_request_id(&Context::background(), "abc")
            .with_value::<TenantKey, _>("acme".to_string());

        assert_eq!(get_from_context(Some(&ctx)), Some("abc"));
        assert_eq!(
            ctx.value::<TenantKey, String>().map(String::as_str),
            Some("acme")
        );
    }

    #[test]
    fn test_latest_binding_shadows_earlier() {
        let first = with_request_id(&Context::background(), "first");
        let second = with_request_id(&first, "second");

        assert_eq!(get_from_context(Some(&first)), Some("first"));
        assert_eq!(get_from_context(Some(&second)), Some("second"));
    }

    #[test]
    fn test_wrong_value_type_is_not_found() {
        let ctx = Context::background().with_value::<TenantKey, _>(42_u32);
        assert!(ctx.value::<TenantKey, String>().is_none());
        assert_eq!(ctx.value::<TenantKey, u32>(), Some(&42));
    }

    #[test]
    fn test_clones_share_bindings() {
        let ctx = with_request_id(&Context::background(), "shared");
        let handle = {
            let ctx = ctx.clone();
            std::thread::spawn(move || get_from_context(Some(&ctx)).map(str::to_string))
        };
        assert_eq!(handle.join().unwrap().as_deref(), Some("shared"));
        assert_eq!(get_from_context(Some(&ctx)), Some("shared"));
    }

    #[test]
    fn test_debug_shows_request_id() {
        let ctx = with_request_id(&Context::background(), "dbg-1");
        let rendered = format!("{ctx:?}");
        assert!(rendered.contains("dbg-1"));
    }
}
