use serde::{Deserialize, Serialize};

/// How the local collection absorbs a successful POST.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CreatePolicy {
    /// The reply body is the persisted entity; append it.
    #[default]
    AppendReturned,
    /// Ignore the reply body and reload the whole collection.
    Reload,
}

/// When a remove touches local state relative to the DELETE.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Reconciliation {
    /// Remove locally first, then send the DELETE. No rollback on failure.
    Optimistic,
    /// Send the DELETE and only touch local state once it succeeded.
    #[default]
    Confirmed,
}

/// How a confirmed remove updates local state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RemovalRefresh {
    #[default]
    LocalFilter,
    Reload,
}

/// Consistency policy of one store. Fixed for the lifetime of the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StorePolicy {
    pub create: CreatePolicy,
    pub reconciliation: Reconciliation,
    /// Only consulted under [`Reconciliation::Confirmed`].
    pub confirmed_removal: RemovalRefresh,
}

impl StorePolicy {
    /// Append the returned entity on create, remove locally before the DELETE.
    pub fn optimistic() -> Self {
        Self {
            create: CreatePolicy::AppendReturned,
            reconciliation: Reconciliation::Optimistic,
            confirmed_removal: RemovalRefresh::LocalFilter,
        }
    }

    /// Resynchronize from the server after every successful write.
    pub fn reload_after_write() -> Self {
        Self {
            create: CreatePolicy::Reload,
            reconciliation: Reconciliation::Confirmed,
            confirmed_removal: RemovalRefresh::Reload,
        }
    }
}
