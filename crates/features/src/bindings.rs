use crate::detail::{DetailPayload, build_detail};
use crate::feature::FeatureId;
use crate::store::FeatureStore;

/// An owned click subscription attached to one store epoch.
///
/// A handle is closed before its successor opens, so at most one binding is
/// ever live and stale bindings can never dispatch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BindingHandle {
    epoch: u64,
    open: bool,
}

impl BindingHandle {
    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn close(&mut self) {
        self.open = false;
    }
}

/// Routes a shared feature-click channel to the clicked feature's kind.
///
/// Re-registration lifecycle: `rebind` detaches the previous handle, then
/// attaches a fresh one at the store's current epoch. Idempotent under
/// repeated rebinding.
#[derive(Debug, Default)]
pub struct ClickRouter {
    binding: Option<BindingHandle>,
}

impl ClickRouter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Detach-previous, attach-current. Returns the epoch now bound.
    pub fn rebind(&mut self, store: &FeatureStore) -> u64 {
        if let Some(prev) = self.binding.as_mut() {
            prev.close();
        }
        let epoch = store.epoch();
        self.binding = Some(BindingHandle { epoch, open: true });
        epoch
    }

    pub fn is_bound_to(&self, store: &FeatureStore) -> bool {
        self.binding
            .as_ref()
            .is_some_and(|b| b.is_open() && b.epoch() == store.epoch())
    }

    /// Dispatches a feature click to its kind-specific detail builder.
    ///
    /// Returns `None` when the binding is stale (the store changed since the
    /// last rebind) or the feature no longer exists, mirroring a detached
    /// listener that must not fire.
    pub fn dispatch(&self, store: &FeatureStore, id: FeatureId) -> Option<DetailPayload> {
        if !self.is_bound_to(store) {
            return None;
        }
        store.get(id).map(build_detail)
    }
}
