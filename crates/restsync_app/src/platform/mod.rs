mod commands;
mod config;
mod logging;

use anyhow::Context;
use restsync_engine::StorePolicy;
use sync_logging::sync_debug;

use crate::cli::Cli;
use logging::LogDestination;

pub fn run_app(cli: Cli) -> anyhow::Result<()> {
    let destination = if cli.log_file {
        LogDestination::Both
    } else {
        LogDestination::Terminal
    };
    logging::initialize(destination, sync_logging::level_for_verbosity(cli.verbose));

    let mut config = config::load_config(&cli.config)?;
    if let Some(base_url) = cli.base_url.clone() {
        config.base_url = Some(base_url);
    }
    let policy = resolve_policy(config.policy, &cli);
    sync_debug!("store policy {:?}", policy);

    let runtime = tokio::runtime::Runtime::new().context("starting tokio runtime")?;
    runtime.block_on(commands::run(cli.command, &config, policy))
}

fn resolve_policy(mut policy: StorePolicy, cli: &Cli) -> StorePolicy {
    if let Some(create) = cli.create_policy {
        policy.create = create.into();
    }
    if let Some(reconciliation) = cli.reconciliation {
        policy.reconciliation = reconciliation.into();
    }
    policy
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use restsync_engine::{CreatePolicy, Reconciliation, RemovalRefresh};

    #[test]
    fn cli_flags_override_configured_policy() {
        let cli = Cli::try_parse_from([
            "restsync",
            "--reconciliation",
            "optimistic",
            "list",
        ])
        .unwrap();

        let policy = resolve_policy(StorePolicy::reload_after_write(), &cli);

        assert_eq!(policy.create, CreatePolicy::Reload);
        assert_eq!(policy.reconciliation, Reconciliation::Optimistic);
        assert_eq!(policy.confirmed_removal, RemovalRefresh::Reload);
    }
}
