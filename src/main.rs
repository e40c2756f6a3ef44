use std::cell::Cell;
use std::rc::Rc;

use anyhow::Result;
use futures::executor::LocalPool;
use futures::task::LocalSpawnExt;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use motion_chain::{Animator, Arg, Completion};
use motion_config::MotionConfig;
use motion_core::types::AnimatableProperty;
use motion_stage::Stage;

/// Frames simulated before the demo gives up waiting.
const MAX_FRAMES: usize = 2_000;

fn init_logging(config: &MotionConfig) -> Result<()> {
    let filter = match config.logging.filter.as_deref() {
        Some(directives) => EnvFilter::try_new(directives)?,
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
    Ok(())
}

fn spawn(pool: &LocalPool, label: &'static str, completion: Completion) -> Result<Rc<Cell<bool>>> {
    info!(chain = label, targets = completion.started_targets(), "chain started");
    let done = Rc::new(Cell::new(false));
    let flag = Rc::clone(&done);
    pool.spawner().spawn_local(async move {
        completion.await;
        info!(chain = label, "chain settled");
        flag.set(true);
    })?;
    Ok(done)
}

fn main() -> Result<()> {
    let config = MotionConfig::load();
    init_logging(&config)?;

    let stage = Stage::new();
    stage.add_node("logo", "div", &[]);
    for id in ["card-1", "card-2", "card-3"] {
        stage.add_node(id, "div", &["card"]);
    }
    stage.add_node("spinner", "span", &[]);

    let animator = Animator::from_config(
        Rc::new(stage.clone()),
        Rc::new(stage.clone()),
        &config.defaults,
    )?;

    let mut pool = LocalPool::new();
    let logo = spawn(
        &pool,
        "logo",
        animator
            .select("#logo")?
            .from([("opacity", Arg::from(0.0)), ("transform", Arg::from("scale(0.5)"))])?
            .to([("opacity", Arg::from(1.0)), ("transform", Arg::from("scale(1)"))])?
            .duration(0.6)?
            .easing("ease-out")?
            .execute(),
    )?;
    let cards = spawn(
        &pool,
        "cards",
        animator
            .select(".card")?
            .translate_y(-24)?
            .background_color("#3b82f6")?
            .delay(Arg::each(|index, _| Arg::from(index as f64 * 0.1)))?
            .loop_count(1)?
            .execute(),
    )?;
    let spinner = spawn(
        &pool,
        "spinner",
        animator
            .select("#spinner")?
            .rotate(360)?
            .duration(0.4)?
            .loop_forever()?
            .execute(),
    )?;

    let frame_ms = config.stage.frame_ms.max(1.0);
    let mut spinner_detached = false;
    for _ in 0..MAX_FRAMES {
        pool.run_until_stalled();
        if logo.get() && cards.get() && !spinner_detached {
            info!("detaching spinner");
            stage.detach("spinner");
            spinner_detached = true;
            continue;
        }
        if logo.get() && cards.get() && spinner.get() {
            break;
        }
        stage.advance(frame_ms);
    }

    if !(logo.get() && cards.get() && spinner.get()) {
        warn!(elapsed_ms = stage.elapsed_ms(), "demo stopped before every chain settled");
    }

    for id in ["logo", "card-1", "card-2", "card-3"] {
        let opacity = stage.computed(id, AnimatableProperty::Opacity);
        let transform = stage.computed(id, AnimatableProperty::Transform);
        info!(
            node = id,
            opacity = ?opacity.map(|v| v.to_string()),
            transform = ?transform.map(|v| v.to_string()),
            "final state"
        );
    }
    info!(
        elapsed_ms = stage.elapsed_ms(),
        keyframe_rules = animator.cache().created(),
        "demo finished"
    );
    Ok(())
}
