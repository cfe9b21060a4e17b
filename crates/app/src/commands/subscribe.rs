//! `graphit subscribe`

use std::process::ExitCode;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use anyhow::Result;
use graphit_application::document::detect_operation_kind;
use graphit_application::{OperationKind, SubscriptionListener};
use graphit_domain::{ClientSettings, SubscriptionMessage};
use graphit_infrastructure::{ReqwestHttpClient, default_manager};
use tokio::sync::mpsc;
use tracing::{info, warn};

use super::load_context;
use crate::cli::SubscribeArgs;
use crate::definition::RequestFile;

/// Prints each message as one JSON line and signals the end of the stream.
struct PrintListener {
    done: mpsc::UnboundedSender<()>,
    failed: AtomicBool,
}

impl SubscriptionListener for PrintListener {
    fn on_message(&self, message: &SubscriptionMessage) {
        match serde_json::to_string(message) {
            Ok(line) => println!("{line}"),
            Err(e) => warn!(error = %e, "Failed to serialize message"),
        }
    }

    fn on_error(&self, error: &str) {
        warn!(%error, "Subscription failed");
        self.failed.store(true, Ordering::Relaxed);
        let _ = self.done.send(());
    }

    fn on_complete(&self) {
        let _ = self.done.send(());
    }
}

pub async fn execute(args: &SubscribeArgs, settings: &ClientSettings) -> Result<ExitCode> {
    let file = RequestFile::load(&args.request).await?;
    let context = load_context(args.env.env.as_deref()).await?;

    let mut options = file.subscription_options(context).await?;
    if let Some(name) = &args.operation {
        options.operation_name = Some(name.clone());
    }
    if let Some(protocol) = args.protocol {
        options.protocol = protocol;
    }

    match detect_operation_kind(&options.query, options.operation_name.as_deref()) {
        Ok(OperationKind::Subscription) => {}
        Ok(kind) => warn!(%kind, "Operation is not a subscription"),
        Err(e) => warn!(error = %e, "Could not inspect document"),
    }

    let client = ReqwestHttpClient::with_settings(settings)?;
    let manager = default_manager(client.client().clone(), settings);

    let (done, mut finished) = mpsc::unbounded_channel();
    let listener = Arc::new(PrintListener {
        done,
        failed: AtomicBool::new(false),
    });
    let handle = manager
        .subscribe(&options, Arc::clone(&listener) as Arc<dyn SubscriptionListener>)
        .await;

    tokio::select! {
        _ = tokio::signal::ctrl_c() => info!("Interrupted, closing subscription"),
        _ = finished.recv() => {}
    }

    handle.unsubscribe().await;
    manager.disconnect_all().await;

    Ok(if listener.failed.load(Ordering::Relaxed) {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    })
}
