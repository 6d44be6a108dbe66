use std::{future::Future, sync::Arc, time::Duration};

use tokio::{sync::oneshot, task::JoinSet};
use tracing::{debug, info, warn};

use keel_common::{
    ready_pair, CancellationToken, Component, KeelError, ReadySignal, ReadyTrigger, Result,
};
use keel_executor::{
    ApiServerHandlers, ApiServerOptions, ComponentOptions, EtcdOptions, ExecutorContext,
    FromExtras,
};

use crate::{
    config::{NodeSettings, ProbeSettings},
    runtime::probe::{Immediate, ReadinessProbe, TcpProbe},
    setup::STARTUP_TARGET,
};

/// Readiness sources for the three startup signals.
#[derive(Clone)]
pub struct Probes {
    pub etcd: Arc<dyn ReadinessProbe>,
    pub api_server: Arc<dyn ReadinessProbe>,
    /// Checked after the api server is ready.
    pub rbac: Arc<dyn ReadinessProbe>,
}

impl Probes {
    /// Every stage counts as ready once its driver call returns.
    pub fn immediate() -> Self {
        Self {
            etcd: Arc::new(Immediate),
            api_server: Arc::new(Immediate),
            rbac: Arc::new(Immediate),
        }
    }

    pub fn from_settings(settings: &ProbeSettings) -> Self {
        let interval = Duration::from_millis(settings.interval_ms.max(1));
        let tcp = |addr: &Option<String>| -> Arc<dyn ReadinessProbe> {
            match addr {
                Some(addr) => Arc::new(TcpProbe::new(addr.clone(), interval)),
                None => Arc::new(Immediate),
            }
        };
        Self {
            etcd: tcp(&settings.etcd),
            api_server: tcp(&settings.api_server),
            rbac: Arc::new(Immediate),
        }
    }
}

impl Default for Probes {
    fn default() -> Self {
        Self::immediate()
    }
}

struct StageOptions {
    etcd: EtcdOptions,
    api_server: ApiServerOptions,
    scheduler: ComponentOptions,
    controller_manager: ComponentOptions,
    cloud_controller_manager: ComponentOptions,
    kubelet: ComponentOptions,
    kube_proxy: ComponentOptions,
}

impl StageOptions {
    fn decode(settings: &NodeSettings) -> Result<Self> {
        let c = &settings.components;
        Ok(Self {
            etcd: EtcdOptions::from_extras(c.etcd_options.clone())?,
            api_server: ApiServerOptions::from_extras(c.api_server.options.clone())?,
            scheduler: ComponentOptions::from_extras(c.scheduler.options.clone())?,
            controller_manager: ComponentOptions::from_extras(c.controller_manager.options.clone())?,
            cloud_controller_manager: ComponentOptions::from_extras(
                c.cloud_controller_manager.options.clone(),
            )?,
            kubelet: ComponentOptions::from_extras(c.kubelet.options.clone())?,
            kube_proxy: ComponentOptions::from_extras(c.kube_proxy.options.clone())?,
        })
    }
}

/// Running startup: the readiness signals and one task per stage.
pub struct StartupHandle {
    pub etcd_ready: ReadySignal,
    pub api_ready: ReadySignal,
    pub rbac_ready: ReadySignal,
    tasks: JoinSet<(Component, Result<()>)>,
    api_handlers: Option<oneshot::Receiver<ApiServerHandlers>>,
}

impl StartupHandle {
    /// Authenticator and HTTP handler returned by the api server stage.
    pub async fn api_handlers(&mut self) -> Result<ApiServerHandlers> {
        let rx = self
            .api_handlers
            .take()
            .ok_or_else(|| KeelError::Config("api server stage is not running".to_string()))?;
        rx.await
            .map_err(|_| KeelError::Other("api server stage ended without handlers".to_string()))
    }

    /// Waits for every stage. Stops at the first failure, aborting the rest.
    pub async fn join(mut self) -> Result<()> {
        while let Some(joined) = self.tasks.join_next().await {
            let (component, res) = match joined {
                Ok(out) => out,
                Err(e) if e.is_cancelled() => continue,
                Err(e) => {
                    self.tasks.abort_all();
                    return Err(KeelError::Other(format!("stage task panicked: {}", e)));
                }
            };
            match res {
                Ok(()) => debug!(%component, "stage finished"),
                Err(e) => {
                    warn!(target: STARTUP_TARGET, "EVENT:STAGE_FAIL component={} error={}", component, e);
                    self.tasks.abort_all();
                    return Err(e);
                }
            }
        }
        Ok(())
    }
}

/// Bootstraps the driver and spawns every enabled stage. Dependent stages
/// are handed signals, so they can be started in any order.
pub async fn start(
    ctx: ExecutorContext,
    settings: &NodeSettings,
    probes: Probes,
    cancel: CancellationToken,
) -> Result<StartupHandle> {
    let options = StageOptions::decode(settings)?;

    ctx.bootstrap(&cancel, &settings.node, &settings.agent).await?;
    info!(target: STARTUP_TARGET, "EVENT:BOOTSTRAP node={}", settings.node.name);

    let (etcd_trigger, etcd_ready) = ready_pair("etcd-ready");
    let (api_trigger, api_ready) = ready_pair("api-ready");
    let (rbac_trigger, rbac_ready) = ready_pair("rbac-ready");

    let mut tasks = JoinSet::new();
    let components = &settings.components;

    {
        let ctx = ctx.clone();
        let cancel = cancel.clone();
        let probe = Arc::clone(&probes.etcd);
        let config = settings.etcd.clone();
        let etcd_options = options.etcd;
        spawn_stage(&mut tasks, Component::Etcd, async move {
            match config {
                Some(config) => ctx.etcd(config, etcd_options).await?,
                // external datastore: readiness comes from the probe alone
                None => log_skipped(Component::Etcd),
            }
            await_ready(probe.as_ref(), &etcd_trigger, &cancel).await
        });
    }

    let api_handlers = {
        let ctx = ctx.clone();
        let cancel = cancel.clone();
        let etcd_ready = etcd_ready.clone();
        let api_probe = Arc::clone(&probes.api_server);
        let rbac_probe = Arc::clone(&probes.rbac);
        let enabled = components.api_server.enabled;
        let args = components.api_server.args.clone();
        let api_options = options.api_server;
        let (tx, rx) = oneshot::channel();
        spawn_stage(&mut tasks, Component::ApiServer, async move {
            if enabled {
                let handlers = ctx.api_server(&cancel, etcd_ready, args, api_options).await?;
                // nobody asking for the handlers is fine
                let _ = tx.send(handlers);
            } else {
                log_skipped(Component::ApiServer);
            }
            await_ready(api_probe.as_ref(), &api_trigger, &cancel).await?;
            await_ready(rbac_probe.as_ref(), &rbac_trigger, &cancel).await
        });
        enabled.then_some(rx)
    };

    if components.scheduler.enabled {
        let ctx = ctx.clone();
        let ready = api_ready.clone();
        let args = components.scheduler.args.clone();
        let opts = options.scheduler;
        spawn_stage(&mut tasks, Component::Scheduler, async move {
            ctx.scheduler(ready, args, opts).await
        });
    } else {
        log_skipped(Component::Scheduler);
    }

    if components.controller_manager.enabled {
        let ctx = ctx.clone();
        let ready = api_ready.clone();
        let args = components.controller_manager.args.clone();
        let opts = options.controller_manager;
        spawn_stage(&mut tasks, Component::ControllerManager, async move {
            ctx.controller_manager(ready, args, opts).await
        });
    } else {
        log_skipped(Component::ControllerManager);
    }

    if components.cloud_controller_manager.enabled {
        let ctx = ctx.clone();
        let ready = rbac_ready.clone();
        let args = components.cloud_controller_manager.args.clone();
        let opts = options.cloud_controller_manager;
        spawn_stage(&mut tasks, Component::CloudControllerManager, async move {
            ctx.cloud_controller_manager(ready, args, opts).await
        });
    } else {
        log_skipped(Component::CloudControllerManager);
    }

    if components.kubelet.enabled {
        let ctx = ctx.clone();
        let args = components.kubelet.args.clone();
        let opts = options.kubelet;
        spawn_stage(&mut tasks, Component::Kubelet, async move { ctx.kubelet(args, opts).await });
    } else {
        log_skipped(Component::Kubelet);
    }

    if components.kube_proxy.enabled {
        let args = components.kube_proxy.args.clone();
        let opts = options.kube_proxy;
        spawn_stage(&mut tasks, Component::KubeProxy, async move {
            ctx.kube_proxy(args, opts).await
        });
    } else {
        log_skipped(Component::KubeProxy);
    }

    Ok(StartupHandle { etcd_ready, api_ready, rbac_ready, tasks, api_handlers })
}

fn spawn_stage<F>(tasks: &mut JoinSet<(Component, Result<()>)>, component: Component, stage: F)
where
    F: Future<Output = Result<()>> + Send + 'static,
{
    info!(target: STARTUP_TARGET, "EVENT:STAGE_START component={}", component);
    tasks.spawn(async move {
        let res = stage.await;
        if res.is_ok() {
            info!(target: STARTUP_TARGET, "EVENT:STAGE_DONE component={}", component);
        }
        (component, res)
    });
}

fn log_skipped(component: Component) {
    info!(target: STARTUP_TARGET, "EVENT:STAGE_SKIPPED component={}", component);
}

async fn await_ready(
    probe: &dyn ReadinessProbe,
    trigger: &ReadyTrigger,
    cancel: &CancellationToken,
) -> Result<()> {
    probe.wait_ready(cancel).await?;
    if trigger.fire() {
        info!(target: STARTUP_TARGET, "EVENT:READY signal={}", trigger.name());
    }
    Ok(())
}
