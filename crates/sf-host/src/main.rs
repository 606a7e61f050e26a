//! SceneForge Reference Host
//!
//! Drives the full transition stack against the in-memory scene
//! provider, as a smoke harness and a worked example of the
//! composition root.
//!
//! Usage:
//!   sf-host run                          - Frontend-to-gameplay transition
//!   sf-host run --style instant          - Same route without the fade
//!   sf-host run --degraded               - Swallow overlay failures
//!   sf-host start --content game_slot_a  - Boot flow: swap + game loop gate
//!   sf-host routes                       - List the route catalog
//!   sf-host styles                       - List the style catalog

use std::sync::Arc;

use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use tokio::sync::broadcast;

use sf_catalog::{RouteCatalog, StyleCatalog};
use sf_core::{
    DegradeReporter, FailurePolicy, LogReporter, MemorySceneProvider, RuntimeTicker, SceneProvider,
    Signature, TickSource,
};
use sf_overlay::{
    CountingIndicator, FadeSubsystem, LoadingOverlaySubsystem, MemoryOverlayHost,
    SharedFadeSurface, DEFAULT_FADE_UNIT, DEFAULT_LOADING_UNIT,
};
use sf_transition::{
    ContentSwapContext, ContentSwapPlan, EventTeardown, FlowEvents, GameLoopCoordinator,
    GameLoopHandle, GameLoopResolver, StartAuthority, TransitionContext, TransitionOrchestrator,
    TransitionReport, TransitionRequest,
};

#[derive(Parser)]
#[command(name = "sf-host", about = "SceneForge reference host")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run one catalog transition and print its step timeline
    Run {
        /// Route id from the route catalog
        #[arg(short, long, default_value = "gameplay")]
        route: String,
        /// Style id from the style catalog
        #[arg(short, long, default_value = "gameplay")]
        style: String,
        /// Swallow overlay failures instead of aborting
        #[arg(long)]
        degraded: bool,
        /// Skip the fade even when the style asks for one
        #[arg(long)]
        no_fade: bool,
    },
    /// Boot flow: stage content, run the startup transition, release
    /// the game loop on readiness
    Start {
        /// Content id staged through the swap context
        #[arg(short, long, default_value = "game_slot_a")]
        content: String,
    },
    /// List the route catalog
    Routes,
    /// List the style catalog
    Styles,
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            route,
            style,
            degraded,
            no_fade,
        } => {
            let policy = if degraded {
                FailurePolicy::Degraded
            } else {
                FailurePolicy::Strict
            };
            run_transition(&route, &style, policy, no_fade).await
        }
        Commands::Start { content } => run_start(&content).await,
        Commands::Routes => {
            list_routes();
            Ok(())
        }
        Commands::Styles => {
            list_styles();
            Ok(())
        }
    }
}

/// The composed reference stack. Starts in the running-frontend state:
/// frontend and global UI units loaded, frontend active, overlay units
/// registered but not loaded.
struct DemoWorld {
    provider: Arc<MemorySceneProvider>,
    orchestrator: Arc<TransitionOrchestrator>,
    teardown: EventTeardown,
}

fn demo_world(policy: FailurePolicy) -> DemoWorld {
    let provider = Arc::new(MemorySceneProvider::new());
    provider.register_units([
        DEFAULT_FADE_UNIT,
        DEFAULT_LOADING_UNIT,
        "FrontendScene",
        "GameplayScene",
        "UIGlobalScene",
        "PauseOverlayScene",
    ]);
    provider.preload_unit("FrontendScene");
    provider.preload_unit("UIGlobalScene");
    provider.set_active_unit("FrontendScene");

    let host = Arc::new(MemoryOverlayHost::new());
    host.put_fade_surface(DEFAULT_FADE_UNIT, Arc::new(SharedFadeSurface::default()) as _);
    host.put_loading_indicator(DEFAULT_LOADING_UNIT, Arc::new(CountingIndicator::new()) as _);

    let ticker: Arc<dyn TickSource> = Arc::new(RuntimeTicker::frame_60hz());
    let reporter: Arc<dyn DegradeReporter> = Arc::new(LogReporter);

    let fade = Arc::new(FadeSubsystem::new(
        DEFAULT_FADE_UNIT,
        Arc::clone(&provider) as _,
        Arc::clone(&host) as _,
        Arc::clone(&ticker),
        Arc::clone(&reporter),
        policy,
    ));
    let loading = Arc::new(LoadingOverlaySubsystem::new(
        DEFAULT_LOADING_UNIT,
        Arc::clone(&provider) as _,
        Arc::clone(&host) as _,
        Arc::clone(&ticker),
        reporter,
        policy,
    ));

    let teardown = EventTeardown::new();
    let events = FlowEvents::new(&teardown);
    let orchestrator = Arc::new(
        TransitionOrchestrator::builder(Arc::clone(&provider) as _, fade, loading, ticker, events)
            .policy(policy)
            .build(),
    );

    DemoWorld {
        provider,
        orchestrator,
        teardown,
    }
}

async fn run_transition(
    route_id: &str,
    style_id: &str,
    policy: FailurePolicy,
    no_fade: bool,
) -> Result<()> {
    let world = demo_world(policy);

    let mut request = world
        .orchestrator
        .build_route_request(route_id, style_id, "sf-host")?;
    if no_fade && request.use_fade() {
        request = TransitionRequest::builder()
            .load(request.scenes_to_load().iter().cloned())
            .unload(request.scenes_to_unload().iter().cloned())
            .activate(request.target_active_scene())
            .style(request.style_id())
            .use_fade(false)
            .signature(request.signature().clone())
            .requested_by(request.requested_by())
            .build();
    }

    let events = world.orchestrator.events();
    let mut started_rx = events.started.subscribe();
    let mut ready_rx = events.scenes_ready.subscribe();
    let mut completed_rx = events.completed.subscribe();

    println!("running route '{route_id}' with style '{style_id}' ({} policy)", policy.name());
    let report = world.orchestrator.execute(request).await?;
    print_event_trace(&mut started_rx, &mut ready_rx, &mut completed_rx);
    print_report(&report);

    println!("active unit: '{}'", world.provider.active_unit_name());
    println!("loaded units: {}", world.provider.loaded_units().join(", "));

    world.teardown.clear_all();
    Ok(())
}

/// Game loop handle that announces its release.
struct AnnouncingHandle;

impl GameLoopHandle for AnnouncingHandle {
    fn release(&self, ctx: &TransitionContext) {
        println!(
            "game loop released: active='{}' (signature={})",
            ctx.target_active_scene, ctx.signature
        );
    }
}

/// Resolver handing out one fixed handle.
struct StaticResolver {
    handle: Arc<dyn GameLoopHandle>,
}

impl GameLoopResolver for StaticResolver {
    fn resolve(&self) -> Option<Arc<dyn GameLoopHandle>> {
        Some(Arc::clone(&self.handle))
    }
}

async fn run_start(content: &str) -> Result<()> {
    let world = demo_world(FailurePolicy::Strict);
    let swap = Arc::new(ContentSwapContext::new(&world.teardown));

    // Commit the staged plan the moment the scenes are ready.
    let mut ready_rx = world.orchestrator.events().scenes_ready.subscribe();
    let committer = {
        let swap = Arc::clone(&swap);
        tokio::spawn(async move {
            if ready_rx.recv().await.is_ok() {
                swap.try_commit_pending("scenes-ready");
            }
        })
    };

    let authority = Arc::new(StartAuthority::new());
    let resolver = Arc::new(StaticResolver {
        handle: Arc::new(AnnouncingHandle),
    });
    let coordinator = GameLoopCoordinator::new(
        Arc::clone(&world.orchestrator),
        resolver as _,
        Arc::clone(&authority),
        "gameplay",
        "gameplay",
    );

    println!("booting content '{content}'");
    let plan = ContentSwapPlan::new(content, Signature::generate());
    let mut report_slot = None;
    let accepted = swap
        .request_swap(plan, "boot", async {
            match coordinator.request_start().await {
                Ok(report) => {
                    let done = report.succeeded();
                    report_slot = Some(report);
                    done
                }
                Err(err) => {
                    log::error!("[host] startup transition failed: {err}");
                    false
                }
            }
        })
        .await;

    if !accepted {
        committer.abort();
        world.teardown.clear_all();
        bail!("boot failed, content '{content}' was not committed");
    }

    let _ = committer.await;
    if let Some(report) = &report_slot {
        print_report(report);
    }
    match swap.current() {
        Some(current) => println!(
            "content committed: '{}' (signature={})",
            current.content_id, current.signature
        ),
        None => println!("content was staged but never committed"),
    }
    println!("active unit: '{}'", world.provider.active_unit_name());

    world.teardown.clear_all();
    Ok(())
}

fn print_event_trace(
    started: &mut broadcast::Receiver<TransitionContext>,
    ready: &mut broadcast::Receiver<TransitionContext>,
    completed: &mut broadcast::Receiver<TransitionContext>,
) {
    println!("events:");
    while let Ok(ctx) = started.try_recv() {
        println!(
            "  started       load=[{}] unload=[{}]",
            ctx.scenes_to_load.join(", "),
            ctx.scenes_to_unload.join(", ")
        );
    }
    while let Ok(ctx) = ready.try_recv() {
        println!("  scenes_ready  active='{}'", ctx.target_active_scene);
    }
    while let Ok(ctx) = completed.try_recv() {
        println!("  completed     signature={}", ctx.signature);
    }
}

fn print_report(report: &TransitionReport) {
    println!(
        "transition report (signature={}, style='{}')",
        report.signature, report.style
    );
    for record in &report.steps {
        if record.note.is_empty() {
            println!("  {:>6} ms  {}", record.at_ms, record.step.name());
        } else {
            println!(
                "  {:>6} ms  {:<16} {}",
                record.at_ms,
                record.step.name(),
                record.note
            );
        }
    }
    println!(
        "outcome: {}",
        if report.succeeded() {
            "completed"
        } else {
            "terminated early"
        }
    );
}

fn list_routes() {
    let catalog = RouteCatalog::with_builtins();
    let mut ids: Vec<&str> = catalog.route_ids().collect();
    ids.sort_unstable();

    println!("routes ({}):", ids.len());
    for id in ids {
        if let Some(route) = catalog.try_get(id) {
            println!(
                "  {:<14} kind={:<11} load=[{}] unload=[{}] active='{}'",
                id,
                route.kind.name(),
                route.load.join(", "),
                route.unload.join(", "),
                route.active
            );
        }
    }
}

fn list_styles() {
    let catalog = StyleCatalog::with_builtins();
    let mut ids: Vec<&str> = catalog.style_ids().collect();
    ids.sort_unstable();

    println!("styles ({}):", ids.len());
    for id in ids {
        if let Some(style) = catalog.try_get(id) {
            if style.use_fade {
                println!(
                    "  {:<10} fade out {}ms ({}) / fade in {}ms ({})",
                    id,
                    style.fade.fade_out_ms,
                    style.fade.fade_out_curve.name(),
                    style.fade.fade_in_ms,
                    style.fade.fade_in_curve.name()
                );
            } else {
                println!("  {:<10} no fade", id);
            }
        }
    }
}
