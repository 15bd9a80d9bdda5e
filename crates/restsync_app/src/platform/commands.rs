use std::sync::Arc;

use anyhow::{bail, Context};
use restsync_engine::{
    extract_at, Candidate, CollectionSnapshot, CollectionStore, EntityId, PaginatedAggregator,
    ReqwestTransport, StorePolicy, SyncError, Transport,
};
use serde_json::Value;
use sync_logging::{sync_debug, sync_info, sync_warn};

use super::config::AppConfig;
use crate::cli::Command;

const PAGE_PLACEHOLDER: &str = "{page}";

pub(crate) async fn run(
    command: Command,
    config: &AppConfig,
    policy: StorePolicy,
) -> anyhow::Result<()> {
    let transport: Arc<dyn Transport> = Arc::new(
        ReqwestTransport::new(config.transport_settings()).context("building http client")?,
    );

    match command {
        Command::List => {
            let store = open_store(transport, config, policy)?;
            let snapshot = report(store.load().await, "load")?;
            print_snapshot(&snapshot);
        }
        Command::Create { json } => {
            let value: Value = serde_json::from_str(&json).context("candidate is not JSON")?;
            let candidate = Candidate::from_value(value).map_err(SyncError::from)?;
            let store = open_store(transport, config, policy)?;
            report(store.load().await, "load")?;
            let snapshot = report(store.create(candidate).await, "create")?;
            print_snapshot(&snapshot);
        }
        Command::Remove { id } => {
            let id: EntityId = id.parse()?;
            let store = open_store(transport, config, policy)?;
            report(store.load().await, "load")?;
            let snapshot = report(store.remove(id).await, "remove")?;
            print_snapshot(&snapshot);
        }
        Command::Aggregate {
            pages,
            url_template,
            pointer,
            field,
            max_concurrency,
        } => {
            if !url_template.contains(PAGE_PLACEHOLDER) {
                bail!("url template {url_template:?} has no {PAGE_PLACEHOLDER} placeholder");
            }
            let mut settings = config.aggregator_settings();
            if let Some(limit) = max_concurrency {
                settings.max_concurrency = std::num::NonZeroUsize::new(limit);
            }
            let aggregator = PaginatedAggregator::new(transport, settings);
            let items = report(
                aggregator
                    .fetch_all(
                        pages,
                        |page| page_url(&url_template, page),
                        extract_at::<Value>(pointer),
                    )
                    .await,
                "aggregate",
            )?;
            sync_info!("Aggregated {} items from {} pages", items.len(), pages);
            for line in project(&items, field.as_deref()) {
                println!("{line}");
            }
        }
    }
    Ok(())
}

fn open_store(
    transport: Arc<dyn Transport>,
    config: &AppConfig,
    policy: StorePolicy,
) -> anyhow::Result<CollectionStore> {
    let Some(base_url) = config.base_url.as_deref() else {
        bail!("no base url: pass --base-url or set base_url in the config file");
    };
    let store = CollectionStore::new(transport, base_url, policy)?;
    store.subscribe(|snapshot: &CollectionSnapshot| {
        sync_debug!(
            "collection now holds {} entities (version {})",
            snapshot.len(),
            snapshot.version()
        );
    });
    Ok(store)
}

fn report<T>(result: Result<T, SyncError>, operation: &str) -> anyhow::Result<T> {
    result.map_err(|err| {
        sync_warn!("{} failed: {}", operation, err);
        anyhow::Error::new(err).context(format!("{operation} failed"))
    })
}

fn print_snapshot(snapshot: &CollectionSnapshot) {
    for entity in snapshot.entities() {
        println!("{}", entity.to_value());
    }
}

fn page_url(template: &str, page: usize) -> String {
    template.replace(PAGE_PLACEHOLDER, &page.to_string())
}

/// Caller-side mapping applied once every page is in.
fn project(items: &[Value], field: Option<&str>) -> Vec<String> {
    match field {
        None => items.iter().map(Value::to_string).collect(),
        Some(field) => items
            .iter()
            .filter_map(|item| item.get(field))
            .map(|value| match value {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            })
            .collect(),
    }
}
