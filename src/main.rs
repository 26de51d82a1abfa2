use std::{process, sync::Arc};

use clap::Parser;
use scopa::{
    config::{self, CliArgs, Command, RunArgs, Settings, WatchArgs},
    domain::ChangeNotification,
    engine::{FullClearDecider, InvalidationService, StrategyRegistry},
    infra::{
        DispatcherFlushClient, HttpCatalogClient, HttpRepositoryClient, InfraError, SpoolWatcher,
        telemetry,
    },
    register_builtin_strategies,
};
use tracing::{Dispatch, Level, dispatcher, error, info};
use tracing_subscriber::fmt as tracing_fmt;

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        report_fatal_error(&error);
        process::exit(1);
    }
}

fn report_fatal_error(error: &InfraError) {
    if dispatcher::has_been_set() {
        error!(error = %error, "fatal error");
        return;
    }

    let subscriber = tracing_fmt().with_max_level(Level::ERROR).finish();
    let dispatch = Dispatch::new(subscriber);
    dispatcher::with_default(&dispatch, || {
        error!(error = %error, "fatal error");
    });
}

async fn run() -> Result<(), InfraError> {
    let cli = CliArgs::parse();
    let settings = config::load(&cli)
        .map_err(|err| InfraError::configuration(format!("failed to load configuration: {err}")))?;

    telemetry::init(&settings.logging)?;

    let command = cli.command.unwrap_or(Command::Watch(WatchArgs::default()));
    let service = build_service(&settings)?;

    match command {
        Command::Run(args) => run_once(service, args).await,
        Command::Watch(_) => run_watch(service, &settings).await,
    }
}

fn build_service(settings: &Settings) -> Result<Arc<InvalidationService>, InfraError> {
    let catalog =
        HttpCatalogClient::new(settings.catalog.endpoint.clone(), settings.catalog.timeout)
            .map_err(|err| InfraError::configuration(format!("catalog client: {err}")))?;
    let repository = HttpRepositoryClient::new(
        settings.repository.endpoint.clone(),
        settings.repository.timeout,
    )
    .map_err(|err| InfraError::configuration(format!("repository client: {err}")))?;
    let flush = DispatcherFlushClient::new(settings.dispatcher.endpoint.clone())
        .map_err(|err| InfraError::configuration(format!("dispatcher client: {err}")))?;

    let stores = Arc::new(settings.store_registry());
    if stores.is_empty() {
        return Err(InfraError::configuration(
            "at least one storefront must be configured",
        ));
    }

    let registry = Arc::new(StrategyRegistry::new());
    register_builtin_strategies(&registry, Arc::new(repository), Arc::new(catalog));

    Ok(Arc::new(InvalidationService::new(
        registry,
        stores,
        FullClearDecider::default(),
        Arc::new(flush),
    )))
}

async fn run_once(service: Arc<InvalidationService>, args: RunArgs) -> Result<(), InfraError> {
    let raw = tokio::fs::read_to_string(&args.notification).await?;
    let notification: ChangeNotification = serde_json::from_str(&raw).map_err(|err| {
        InfraError::configuration(format!(
            "malformed notification file `{}`: {err}",
            args.notification.display()
        ))
    })?;

    let report = service.process(&notification).await;
    info!(
        pass_id = %report.pass_id,
        targets = report.targets.len(),
        flushed = report.flushed,
        failed = report.failed,
        "notification processed"
    );
    Ok(())
}

async fn run_watch(service: Arc<InvalidationService>, settings: &Settings) -> Result<(), InfraError> {
    tokio::fs::create_dir_all(&settings.engine.spool_dir).await?;

    let watcher = SpoolWatcher::new(
        service,
        settings.engine.spool_dir.clone(),
        settings.engine.poll_interval,
    );

    watcher
        .run(async {
            if let Err(err) = tokio::signal::ctrl_c().await {
                error!(error = %err, "failed to listen for shutdown signal");
            }
        })
        .await;

    Ok(())
}
