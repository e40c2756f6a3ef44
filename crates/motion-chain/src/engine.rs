//! Execution engine.
//!
//! `execute` applies a parameter snapshot to every target and returns a
//! `Completion` that resolves once each target finished or was
//! force-resolved. The first step of every target runs inside `execute`;
//! later loop steps run while the completion is polled.
//!
//! Two modes, chosen by the snapshot's actions:
//! - keyframes: a cached `from`/`to` rule is played on the target, and the
//!   target completes on its animation-end notification
//! - transitions: the target's transition timing is set and the property
//!   values assigned; the target completes when every started transition
//!   ended (counted by a `CompletionLatch`)

use std::cell::RefCell;
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::rc::Rc;
use std::task::{Context, Poll};

use futures::channel::oneshot;
use futures::future::{self, FutureExt, LocalBoxFuture};
use tracing::{debug, warn};

use motion_core::keyframes::KeyframePlayback;
use motion_core::types::PropertyMap;

use crate::cache::KeyframeCache;
use crate::latch::{settled, CompletionLatch, Settled};
use crate::looping::{LoopController, LoopCount, LoopPhase};
use crate::params::{ActionState, ParameterSnapshot, ResolvedOptions};
use crate::target::{ListenerId, RenderTarget, TargetEvent, TargetSet};

/// Future returned by `Chain::execute`.
#[must_use = "loop steps after the first only run while the completion is polled"]
pub struct Completion {
    inner: LocalBoxFuture<'static, ()>,
    started: usize,
}

impl Completion {
    fn new(inner: LocalBoxFuture<'static, ()>, started: usize) -> Self {
        Self { inner, started }
    }

    /// Number of targets this execution started on. Targets that were
    /// already animating or detached are not counted.
    pub fn started_targets(&self) -> usize {
        self.started
    }
}

impl Future for Completion {
    type Output = ();

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<()> {
        self.inner.as_mut().poll(cx)
    }
}

impl fmt::Debug for Completion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Completion")
            .field("started", &self.started)
            .finish_non_exhaustive()
    }
}

/// Run `snapshot` on every target.
pub fn execute(
    targets: &TargetSet,
    snapshot: &ParameterSnapshot,
    cache: &KeyframeCache,
) -> Completion {
    let mut runs: Vec<LocalBoxFuture<'static, ()>> = Vec::with_capacity(targets.len());

    for (index, target) in targets.iter().enumerate() {
        if !target.is_connected() {
            debug!(target = target.id(), "target detached, skipped");
            continue;
        }
        if target.is_animating() {
            debug!(target = target.id(), "target already animating, skipped");
            continue;
        }

        let options = snapshot.options.resolve(index);
        let run = match &snapshot.actions {
            ActionState::Keyframes { from, to } => match (from.get(index), to.get(index)) {
                (Some(from), Some(to)) => {
                    play_keyframes(Rc::clone(target), from, to, options, cache)
                }
                _ => {
                    warn!(target = target.id(), index, "no keyframes for target, skipped");
                    continue;
                }
            },
            ActionState::Properties { .. } => {
                let values = snapshot.actions.values_for(index).unwrap_or_default();
                run_transitions(Rc::clone(target), values, options)
            }
        };
        runs.push(run);
    }

    let started = runs.len();
    debug!(targets = targets.len(), started, "execution started");
    Completion::new(future::join_all(runs).map(|_| ()).boxed_local(), started)
}

/// Assign `values` with transitions disabled.
fn lock_values(target: &dyn RenderTarget, values: &PropertyMap) {
    target.set_transition(None);
    for (property, value) in values {
        target.set_style(*property, value.clone());
    }
}

fn play_keyframes(
    target: Rc<dyn RenderTarget>,
    from: &PropertyMap,
    to: &PropertyMap,
    options: ResolvedOptions,
    cache: &KeyframeCache,
) -> LocalBoxFuture<'static, ()> {
    if options.is_instant() {
        // Nothing would ever notify the end of a zero-length animation.
        match options.looping {
            LoopCount::Infinite => {
                warn!(target = target.id(), "infinite loop with zero duration, not played")
            }
            count if count.is_single_shot() => lock_values(target.as_ref(), to),
            _ => {}
        }
        return future::ready(()).boxed_local();
    }

    let name = cache.obtain(from, to);
    let (latch, receiver) = CompletionLatch::new();
    let listener = {
        let name = name.clone();
        target.subscribe(Rc::new(move |event: &TargetEvent| match event {
            TargetEvent::AnimationEnd { name: ended } if *ended == name => latch.resolve(),
            TargetEvent::AnimationCancel { name: cancelled } if *cancelled == name => {
                latch.interrupt()
            }
            TargetEvent::Detached => latch.interrupt(),
            _ => {}
        }))
    };

    let (iterations, direction) = options.looping.keyframe_iterations();
    debug!(target = target.id(), rule = %name, ?iterations, "playing keyframes");
    target.play_animation(
        KeyframePlayback::new(name, options.duration_ms())
            .delay_ms(options.delay_ms())
            .easing(options.easing)
            .iterations(iterations)
            .direction(direction),
    );

    let to = to.clone();
    async move {
        let outcome = settled(receiver).await;
        target.unsubscribe(listener);
        if !target.is_connected() {
            return;
        }
        if outcome == Settled::Finished && options.looping.is_single_shot() {
            lock_values(target.as_ref(), &to);
        }
        target.pause_animation();
    }
    .boxed_local()
}

/// Routes a target's transition notifications to the latch of the step in
/// progress.
struct StepTracker {
    target: Rc<dyn RenderTarget>,
    current: Rc<RefCell<Option<CompletionLatch>>>,
    listener: ListenerId,
}

impl StepTracker {
    fn attach(target: Rc<dyn RenderTarget>, animated: &PropertyMap) -> Self {
        let current: Rc<RefCell<Option<CompletionLatch>>> = Rc::new(RefCell::new(None));
        let properties: Vec<_> = animated.keys().copied().collect();
        let slot = Rc::clone(&current);
        let listener = target.subscribe(Rc::new(move |event: &TargetEvent| {
            let Some(latch) = slot.borrow().clone() else {
                return;
            };
            match event {
                TargetEvent::TransitionStart { property } if properties.contains(property) => {
                    latch.started()
                }
                TargetEvent::TransitionEnd { property } if properties.contains(property) => {
                    latch.finished()
                }
                TargetEvent::TransitionCancel { property } if properties.contains(property) => {
                    latch.interrupt()
                }
                TargetEvent::Detached => latch.interrupt(),
                _ => {}
            }
        }));
        Self {
            target,
            current,
            listener,
        }
    }

    /// Apply one step. Returns the step's receiver and whether any
    /// transition can notify its end.
    fn step(
        &self,
        values: &PropertyMap,
        options: &ResolvedOptions,
    ) -> (oneshot::Receiver<Settled>, bool) {
        let (latch, receiver) = CompletionLatch::new();
        *self.current.borrow_mut() = Some(latch.clone());

        let spec = options.transition_spec();
        self.target.set_transition(Some(spec));
        let mut changed = false;
        for (property, value) in values {
            changed |= self.target.set_style(*property, value.clone());
        }

        let runs = changed && !spec.is_instant();
        if !runs {
            latch.resolve();
        }
        (receiver, runs)
    }

    fn detach(self) {
        self.current.borrow_mut().take();
        self.target.unsubscribe(self.listener);
    }
}

fn run_transitions(
    target: Rc<dyn RenderTarget>,
    values: PropertyMap,
    options: ResolvedOptions,
) -> LocalBoxFuture<'static, ()> {
    if values.is_empty() {
        debug!(target = target.id(), "nothing to animate");
        return future::ready(()).boxed_local();
    }

    let originals: PropertyMap = values
        .keys()
        .map(|property| (*property, target.style(*property)))
        .collect();

    let tracker = StepTracker::attach(Rc::clone(&target), &values);
    let mut controller = LoopController::new(options.looping);
    controller.advance();
    let (mut receiver, mut runs) = tracker.step(&values, &options);

    async move {
        loop {
            let outcome = settled(receiver).await;
            if outcome == Settled::Interrupted || !target.is_connected() {
                debug!(target = target.id(), ?outcome, "transition run interrupted");
                controller.stop();
                break;
            }
            if !runs {
                match controller.count() {
                    LoopCount::Infinite => {
                        warn!(target = target.id(), "infinite loop without transitions, stopped");
                        controller.stop();
                        break;
                    }
                    // Whole cycles end where they began; skip straight there.
                    LoopCount::Times(cycles) if cycles > 0 => {
                        debug!(target = target.id(), cycles, "loop without transitions collapsed");
                        lock_values(target.as_ref(), &originals);
                        controller.stop();
                        break;
                    }
                    LoopCount::Times(_) => {}
                }
            }

            let next = match controller.advance() {
                LoopPhase::RunningForward => tracker.step(&values, &options),
                LoopPhase::RunningBackward => tracker.step(&originals, &options),
                LoopPhase::Locking => {
                    lock_values(target.as_ref(), &values);
                    controller.advance();
                    break;
                }
                LoopPhase::Idle | LoopPhase::Done => break,
            };
            (receiver, runs) = next;
        }
        tracker.detach();
    }
    .boxed_local()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::PerTarget;
    use crate::test_support::{MockSurface, MockTarget};
    use futures::executor::LocalPool;
    use futures::task::LocalSpawnExt;
    use motion_core::types::{AnimatableProperty, AnimatableValue, Length};
    use std::cell::Cell;

    fn width(px: f64) -> AnimatableValue {
        Length::px(px).into()
    }

    fn width_snapshot(px: f64, options: ResolvedOptions) -> ParameterSnapshot {
        let mut snapshot = ParameterSnapshot::with_options(options.into());
        snapshot.actions = ActionState::Properties {
            values: [(AnimatableProperty::Width, PerTarget::Uniform(width(px)))].into(),
            transform: None,
        };
        snapshot
    }

    fn spawn(pool: &LocalPool, completion: Completion) -> Rc<Cell<bool>> {
        let done = Rc::new(Cell::new(false));
        let flag = Rc::clone(&done);
        pool.spawner()
            .spawn_local(async move {
                completion.await;
                flag.set(true);
            })
            .unwrap();
        done
    }

    fn cache() -> KeyframeCache {
        KeyframeCache::new(Rc::new(MockSurface::default()))
    }

    #[test]
    fn test_transition_completes_after_end_notifications() {
        let target = Rc::new(MockTarget::new("a"));
        let targets: TargetSet = Rc::from(vec![target.clone() as Rc<dyn RenderTarget>]);
        let mut pool = LocalPool::new();

        let completion = execute(&targets, &width_snapshot(100.0, ResolvedOptions::default()), &cache());
        assert_eq!(completion.started_targets(), 1);
        assert_eq!(target.style(AnimatableProperty::Width), width(100.0));
        let done = spawn(&pool, completion);

        pool.run_until_stalled();
        assert!(!done.get());

        target.emit(TargetEvent::TransitionStart {
            property: AnimatableProperty::Width,
        });
        target.emit(TargetEvent::TransitionEnd {
            property: AnimatableProperty::Width,
        });
        pool.run_until_stalled();
        assert!(done.get());
        assert_eq!(target.listener_count(), 0);
    }

    #[test]
    fn test_zero_duration_resolves_immediately() {
        let target = Rc::new(MockTarget::new("a"));
        let targets: TargetSet = Rc::from(vec![target.clone() as Rc<dyn RenderTarget>]);
        let options = ResolvedOptions {
            duration: 0.0,
            ..ResolvedOptions::default()
        };
        let mut pool = LocalPool::new();
        let done = spawn(&pool, execute(&targets, &width_snapshot(50.0, options), &cache()));
        pool.run_until_stalled();
        assert!(done.get());
        assert_eq!(target.style(AnimatableProperty::Width), width(50.0));
    }

    #[test]
    fn test_instant_loop_collapses_to_originals() {
        let target = Rc::new(MockTarget::new("a"));
        target.set_style(AnimatableProperty::Width, width(5.0));
        let targets: TargetSet = Rc::from(vec![target.clone() as Rc<dyn RenderTarget>]);
        let options = ResolvedOptions {
            duration: 0.0,
            looping: LoopCount::Times(u32::MAX),
            ..ResolvedOptions::default()
        };
        let mut pool = LocalPool::new();
        let done = spawn(&pool, execute(&targets, &width_snapshot(50.0, options), &cache()));
        pool.run_until_stalled();
        assert!(done.get());
        assert_eq!(target.style(AnimatableProperty::Width), width(5.0));
        assert_eq!(target.transition(), None);
        assert_eq!(target.listener_count(), 0);
    }

    #[test]
    fn test_unchanged_values_resolve_immediately() {
        let target = Rc::new(MockTarget::new("a"));
        target.set_style(AnimatableProperty::Width, width(50.0));
        let targets: TargetSet = Rc::from(vec![target.clone() as Rc<dyn RenderTarget>]);
        let mut pool = LocalPool::new();
        let done = spawn(
            &pool,
            execute(&targets, &width_snapshot(50.0, ResolvedOptions::default()), &cache()),
        );
        pool.run_until_stalled();
        assert!(done.get());
    }

    #[test]
    fn test_animating_and_detached_targets_are_skipped() {
        let busy = Rc::new(MockTarget::new("busy"));
        busy.set_animating(true);
        let gone = Rc::new(MockTarget::new("gone"));
        gone.set_connected(false);
        let targets: TargetSet = Rc::from(vec![
            busy.clone() as Rc<dyn RenderTarget>,
            gone.clone() as Rc<dyn RenderTarget>,
        ]);

        let completion = execute(&targets, &width_snapshot(10.0, ResolvedOptions::default()), &cache());
        assert_eq!(completion.started_targets(), 0);
        assert_eq!(busy.style(AnimatableProperty::Width), width(0.0));
        assert_eq!(gone.style(AnimatableProperty::Width), width(0.0));

        let mut pool = LocalPool::new();
        let done = spawn(&pool, completion);
        pool.run_until_stalled();
        assert!(done.get());
    }

    #[test]
    fn test_cancel_notification_force_resolves() {
        let target = Rc::new(MockTarget::new("a"));
        let targets: TargetSet = Rc::from(vec![target.clone() as Rc<dyn RenderTarget>]);
        let mut pool = LocalPool::new();
        let done = spawn(
            &pool,
            execute(&targets, &width_snapshot(10.0, ResolvedOptions::default()), &cache()),
        );

        target.emit(TargetEvent::TransitionStart {
            property: AnimatableProperty::Width,
        });
        target.emit(TargetEvent::TransitionCancel {
            property: AnimatableProperty::Width,
        });
        pool.run_until_stalled();
        assert!(done.get());
    }

    #[test]
    fn test_loop_restores_originals_between_cycles() {
        let target = Rc::new(MockTarget::new("a"));
        let targets: TargetSet = Rc::from(vec![target.clone() as Rc<dyn RenderTarget>]);
        let options = ResolvedOptions {
            looping: LoopCount::Times(1),
            ..ResolvedOptions::default()
        };
        let mut pool = LocalPool::new();
        let done = spawn(&pool, execute(&targets, &width_snapshot(80.0, options), &cache()));

        let finish_step = |pool: &mut LocalPool| {
            target.emit(TargetEvent::TransitionStart {
                property: AnimatableProperty::Width,
            });
            target.emit(TargetEvent::TransitionEnd {
                property: AnimatableProperty::Width,
            });
            pool.run_until_stalled();
        };

        pool.run_until_stalled();
        assert_eq!(target.style(AnimatableProperty::Width), width(80.0));
        finish_step(&mut pool);
        assert_eq!(target.style(AnimatableProperty::Width), width(0.0));
        assert!(!done.get());
        finish_step(&mut pool);
        assert!(done.get());
        assert_eq!(target.style(AnimatableProperty::Width), width(0.0));
    }

    #[test]
    fn test_keyframes_lock_end_values_and_pause() {
        let target = Rc::new(MockTarget::new("a"));
        let targets: TargetSet = Rc::from(vec![target.clone() as Rc<dyn RenderTarget>]);
        let cache = cache();
        let mut snapshot = ParameterSnapshot::default();
        snapshot.actions = ActionState::Keyframes {
            from: PerTarget::Uniform([(AnimatableProperty::Width, width(0.0))].into()),
            to: PerTarget::Uniform([(AnimatableProperty::Width, width(40.0))].into()),
        };

        let mut pool = LocalPool::new();
        let done = spawn(&pool, execute(&targets, &snapshot, &cache));
        let playback = target.last_playback().unwrap();
        assert_eq!(playback.iterations, motion_core::keyframes::IterationCount::Times(1));
        assert_eq!(cache.created(), 1);

        pool.run_until_stalled();
        assert!(!done.get());
        target.emit(TargetEvent::AnimationEnd {
            name: playback.name.clone(),
        });
        pool.run_until_stalled();
        assert!(done.get());
        assert_eq!(target.style(AnimatableProperty::Width), width(40.0));
        assert!(target.is_paused());
        assert_eq!(target.transition(), None);
    }

    #[test]
    fn test_detach_interrupts_keyframes() {
        let target = Rc::new(MockTarget::new("a"));
        let targets: TargetSet = Rc::from(vec![target.clone() as Rc<dyn RenderTarget>]);
        let mut snapshot = ParameterSnapshot::with_options(
            ResolvedOptions {
                looping: LoopCount::Infinite,
                ..ResolvedOptions::default()
            }
            .into(),
        );
        snapshot.actions = ActionState::Keyframes {
            from: PerTarget::Uniform(PropertyMap::new()),
            to: PerTarget::Uniform([(AnimatableProperty::Opacity, AnimatableValue::from(0.0))].into()),
        };

        let mut pool = LocalPool::new();
        let done = spawn(&pool, execute(&targets, &snapshot, &cache()));
        pool.run_until_stalled();
        assert!(!done.get());

        target.set_connected(false);
        target.emit(TargetEvent::Detached);
        pool.run_until_stalled();
        assert!(done.get());
        assert_eq!(target.style(AnimatableProperty::Opacity), AnimatableValue::from(1.0));
    }
}
