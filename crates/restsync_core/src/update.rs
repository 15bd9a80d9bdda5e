use crate::{Effect, Msg, Reconciliation, RemoteCall, RemovalRefresh, StoreState};

/// Pure update function: applies a message to store state and returns the
/// effects the engine has to run, in order.
///
/// A closed state swallows every message so late replies cannot reanimate it.
pub fn update(mut state: StoreState, msg: Msg) -> (StoreState, Vec<Effect>) {
    if state.is_closed() {
        return (state, Vec::new());
    }

    let policy = state.policy();
    let effects = match msg {
        Msg::LoadRequested | Msg::CreateAcknowledged => vec![Effect::Remote(RemoteCall::List)],
        Msg::Loaded(collection) => {
            state.replace(collection);
            vec![Effect::Notify(state.snapshot())]
        }
        Msg::CreateRequested(candidate) => vec![Effect::Remote(RemoteCall::Create(candidate))],
        Msg::Created(entity) => {
            state.upsert(entity);
            vec![Effect::Notify(state.snapshot())]
        }
        Msg::RemoveRequested(id) => match policy.reconciliation {
            Reconciliation::Optimistic => {
                state.remove(&id);
                vec![
                    Effect::Notify(state.snapshot()),
                    Effect::Remote(RemoteCall::Delete(id)),
                ]
            }
            Reconciliation::Confirmed => vec![Effect::Remote(RemoteCall::Delete(id))],
        },
        Msg::Removed(id) => match (policy.reconciliation, policy.confirmed_removal) {
            // Local state already moved before the DELETE went out.
            (Reconciliation::Optimistic, _) => Vec::new(),
            (Reconciliation::Confirmed, RemovalRefresh::LocalFilter) => {
                state.remove(&id);
                vec![Effect::Notify(state.snapshot())]
            }
            (Reconciliation::Confirmed, RemovalRefresh::Reload) => {
                vec![Effect::Remote(RemoteCall::List)]
            }
        },
    };

    (state, effects)
}
