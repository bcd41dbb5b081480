use crate::crds::AIRequest;
use futures::StreamExt;
use kube::api::ListParams;
use kube::runtime::controller::{Action, Controller};
use kube::runtime::watcher::Config;
use kube::{Api, Client, ResourceExt};
use std::sync::Arc;
use tracing::{debug, error, info, instrument, warn, Instrument};

pub mod ai;
pub mod conditions;
pub mod config;
pub mod controller;
pub mod store;
pub mod types;

// Re-export commonly used items
pub use ai::{AIProvider, TemplateAIProvider};
pub use config::ControllerConfig;
pub use controller::reconcile_request;
pub use store::{KubeRequestStore, RequestStore};
pub use types::{Context, Error, RequestId, Result};

/// Main entry point for the AIRequest controller
#[instrument(skip(client), fields(namespace = %namespace))]
pub async fn run_request_controller(client: Client, namespace: String) -> Result<()> {
    info!("Starting AIRequest controller in namespace: {}", namespace);

    debug!("Loading controller configuration from mounted file...");

    // Load controller configuration from mounted file
    let config = match ControllerConfig::from_mounted_file("/config/config.yaml") {
        Ok(cfg) => {
            debug!("Successfully loaded controller configuration");
            if let Err(validation_error) = cfg.validate() {
                error!("Configuration validation failed: {}", validation_error);
                return Err(Error::ConfigError(validation_error.to_string()));
            }
            debug!("Configuration validation passed");
            cfg
        }
        Err(e) => {
            warn!("Failed to load configuration, using defaults: {}", e);
            let default_config = ControllerConfig::default();
            if let Err(validation_error) = default_config.validate() {
                error!("Default configuration is invalid: {}", validation_error);
                return Err(Error::ConfigError(validation_error.to_string()));
            }
            default_config
        }
    };

    debug!("Creating controller context...");

    // Collaborators are injected explicitly; no package-level state.
    let config = Arc::new(config);
    let context = Arc::new(Context {
        store: Arc::new(KubeRequestStore::new(client.clone())),
        ai: Arc::new(TemplateAIProvider::new(&config.ai.model)),
        config: config.clone(),
    });

    // Startup visibility: list existing AIRequests the controller should observe
    {
        let api: Api<AIRequest> = Api::namespaced(client.clone(), &namespace);
        match api.list(&ListParams::default()).await {
            Ok(list) => {
                info!(
                    "Controller startup: found {} AIRequest(s) in namespace {}",
                    list.items.len(),
                    namespace
                );
                for request in list.items {
                    let name = request.name_any();
                    let observed = request
                        .status
                        .as_ref()
                        .map(|s| s.observed_prompt.clone())
                        .unwrap_or_default();
                    info!(
                        "Existing AIRequest: name={}, prompt='{}', observedPrompt='{}'",
                        name, request.spec.prompt, observed
                    );
                }
            }
            Err(e) => {
                error!("Failed to list AIRequests at startup: {}", e);
            }
        }
    }

    let api: Api<AIRequest> = Api::namespaced(client.clone(), &namespace);
    let watcher_config = Config::default().any_semantic();

    Controller::new(api, watcher_config)
        .run(reconcile, error_policy, context)
        .for_each(|reconciliation_result| {
            let span = tracing::info_span!("airequest_reconciliation_result");
            async move {
                match reconciliation_result {
                    Ok(request_resource) => {
                        info!(
                            resource = ?request_resource,
                            "AIRequest reconciliation successful"
                        );
                    }
                    Err(reconciliation_err) => {
                        error!(
                            error = ?reconciliation_err,
                            "AIRequest reconciliation error"
                        );
                    }
                }
            }
            .instrument(span)
        })
        .await;

    info!("AIRequest controller shutting down");
    Ok(())
}

/// Reconcile entry invoked by the controller runtime.
///
/// Level-triggered: only the identity is taken from the watched object; the
/// core re-fetches the latest state through the store. The whole attempt runs
/// under the configured deadline so a stalled pass abandons without a partial
/// write and is retried on the next invocation.
#[instrument(skip(ctx), fields(airequest = %request.name_any()))]
async fn reconcile(request: Arc<AIRequest>, ctx: Arc<Context>) -> Result<Action> {
    let namespace = request.namespace().ok_or(Error::MissingObjectKey)?;
    let id = RequestId::new(namespace, request.name_any());

    match tokio::time::timeout(ctx.config.reconcile_deadline(), reconcile_request(&id, &ctx)).await
    {
        Ok(result) => result,
        Err(_) => Err(Error::DeadlineExceeded(id)),
    }
}

/// Error policy: propagated store failures back off and re-invoke later.
fn error_policy(request: Arc<AIRequest>, err: &Error, ctx: Arc<Context>) -> Action {
    error!(
        error = ?err,
        airequest = %request.name_any(),
        "AIRequest reconciliation failed, requeueing with backoff"
    );
    Action::requeue(ctx.config.error_requeue())
}
