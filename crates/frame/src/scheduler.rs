use crate::resize::{apply_viewport_resize, resize_to_display_size};
use crate::stop::StopToken;
use crate::target::{BackingBuffer, CameraControls, FrameRequester, ProjectionCamera, RenderTarget};
use cubeview_common::Extent;
use serde::Serialize;

/// Default minimum time between two rendered frames (about 60 Hz).
pub const TARGET_FRAME_INTERVAL_MS: f64 = 16.0;

/// Collaborators borrowed for one tick.
pub struct Frame<'a, S, C, T, K> {
    pub scene: &'a S,
    pub camera: &'a mut C,
    pub target: &'a mut T,
    pub controls: &'a mut K,
}

/// What a tick did.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FrameOutcome {
    /// A frame was drawn.
    Rendered {
        /// Zero-based count of rendered frames.
        frame_index: u64,
        /// The backing buffer was reallocated to the drawable size.
        resized: bool,
    },
    /// Too early since the last rendered frame.
    Skipped { elapsed_ms: f64 },
    /// The loop was stopped before this tick.
    Stopped,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TickReport {
    pub outcome: FrameOutcome,
    /// The next animation opportunity was requested.
    pub rescheduled: bool,
}

/// Counters for introspection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct FrameStats {
    pub frames_rendered: u64,
    pub frames_skipped: u64,
    /// Rendered ticks whose draw did not reach the screen. These are also
    /// counted in `frames_rendered`.
    pub frames_dropped: u64,
    /// Backing-buffer reallocations found by the per-frame check.
    pub tick_resizes: u64,
    /// Explicit resize notifications handled.
    pub viewport_resizes: u64,
}

/// Rate-capped frame loop state for one viewport.
///
/// The platform calls [`tick`](Self::tick) on every animation opportunity;
/// the scheduler renders at most once per interval and asks for the next
/// opportunity until stopped.
#[derive(Debug)]
pub struct FrameScheduler {
    last_tick_ms: f64,
    interval_ms: f64,
    stop: StopToken,
    stats: FrameStats,
}

impl Default for FrameScheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameScheduler {
    pub fn new() -> Self {
        Self::with_interval(TARGET_FRAME_INTERVAL_MS)
    }

    /// # Panics
    /// If `interval_ms` is not finite and positive.
    pub fn with_interval(interval_ms: f64) -> Self {
        assert!(
            interval_ms.is_finite() && interval_ms > 0.0,
            "frame interval must be finite and positive, got {interval_ms}"
        );
        Self {
            last_tick_ms: 0.0,
            interval_ms,
            stop: StopToken::new(),
            stats: FrameStats::default(),
        }
    }

    /// Timestamp of the last rendered frame.
    pub fn last_tick_ms(&self) -> f64 {
        self.last_tick_ms
    }

    pub fn interval_ms(&self) -> f64 {
        self.interval_ms
    }

    pub fn stats(&self) -> &FrameStats {
        &self.stats
    }

    /// A handle that stops this loop from anywhere.
    pub fn stop_token(&self) -> StopToken {
        self.stop.clone()
    }

    pub fn stop(&self) {
        self.stop.stop();
    }

    pub fn is_stopped(&self) -> bool {
        self.stop.is_stopped()
    }

    /// Whether a tick at `now_ms` would render. The boundary is inclusive.
    pub fn should_render(&self, now_ms: f64) -> bool {
        now_ms >= self.last_tick_ms + self.interval_ms
    }

    /// Handle one animation opportunity.
    pub fn tick<S, C, T, K, R>(
        &mut self,
        now_ms: f64,
        frame: Frame<'_, S, C, T, K>,
        requester: &mut R,
    ) -> TickReport
    where
        C: ProjectionCamera,
        T: RenderTarget<S, C>,
        K: CameraControls<C>,
        R: FrameRequester + ?Sized,
    {
        if self.stop.is_stopped() {
            return TickReport {
                outcome: FrameOutcome::Stopped,
                rescheduled: false,
            };
        }

        let outcome = if self.should_render(now_ms) {
            self.last_tick_ms = now_ms;
            let (resized, presented) = render_frame(frame);
            let frame_index = self.stats.frames_rendered;
            self.stats.frames_rendered += 1;
            if resized {
                self.stats.tick_resizes += 1;
            }
            if !presented {
                self.stats.frames_dropped += 1;
                tracing::debug!(frame_index, "frame dropped by render target");
            }
            FrameOutcome::Rendered {
                frame_index,
                resized,
            }
        } else {
            let elapsed_ms = now_ms - self.last_tick_ms;
            self.stats.frames_skipped += 1;
            tracing::trace!(elapsed_ms, "frame skipped");
            FrameOutcome::Skipped { elapsed_ms }
        };

        let rescheduled = !self.stop.is_stopped();
        if rescheduled {
            requester.request_frame();
        } else {
            tracing::info!(stats = ?self.stats, "frame loop stopped");
        }

        TickReport {
            outcome,
            rescheduled,
        }
    }

    /// Handle an explicit viewport resize notification without waiting for
    /// the next tick.
    pub fn on_viewport_resize<C, T>(&mut self, size: Extent, camera: &mut C, target: &mut T)
    where
        C: ProjectionCamera + ?Sized,
        T: BackingBuffer + ?Sized,
    {
        tracing::debug!(%size, "viewport resized");
        apply_viewport_resize(size, camera, target);
        self.stats.viewport_resizes += 1;
    }
}

/// Returns (resized, presented).
fn render_frame<S, C, T, K>(frame: Frame<'_, S, C, T, K>) -> (bool, bool)
where
    C: ProjectionCamera,
    T: RenderTarget<S, C>,
    K: CameraControls<C>,
{
    let Frame {
        scene,
        camera,
        target,
        controls,
    } = frame;

    let resized = resize_to_display_size(target);
    if resized {
        camera.set_aspect(target.drawable_size().aspect_ratio());
    }
    controls.update(camera);
    camera.update_projection_matrix();
    let presented = target.render(scene, camera);
    (resized, presented)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[derive(Debug, Clone, Copy, PartialEq)]
    enum Call {
        Resize(Extent),
        Aspect(f32),
        Controls,
        Projection,
        Draw { aspect: f32 },
    }

    type Log = Rc<RefCell<Vec<Call>>>;

    struct Scene;

    struct Camera {
        aspect: f32,
        log: Log,
    }

    impl ProjectionCamera for Camera {
        fn aspect(&self) -> f32 {
            self.aspect
        }
        fn set_aspect(&mut self, aspect: f32) {
            self.aspect = aspect;
            self.log.borrow_mut().push(Call::Aspect(aspect));
        }
        fn update_projection_matrix(&mut self) {
            self.log.borrow_mut().push(Call::Projection);
        }
    }

    struct Controls {
        log: Log,
    }

    impl CameraControls<Camera> for Controls {
        fn update(&mut self, _camera: &mut Camera) -> bool {
            self.log.borrow_mut().push(Call::Controls);
            false
        }
    }

    struct Target {
        drawable: Extent,
        backing: Extent,
        log: Log,
        on_draw: Option<StopToken>,
        presents: bool,
    }

    impl BackingBuffer for Target {
        fn drawable_size(&self) -> Extent {
            self.drawable
        }
        fn backing_size(&self) -> Extent {
            self.backing
        }
        fn set_backing_size(&mut self, size: Extent) {
            self.backing = size;
            self.log.borrow_mut().push(Call::Resize(size));
        }
    }

    impl RenderTarget<Scene, Camera> for Target {
        fn render(&mut self, _scene: &Scene, camera: &Camera) -> bool {
            self.log.borrow_mut().push(Call::Draw {
                aspect: camera.aspect,
            });
            if let Some(token) = &self.on_draw {
                token.stop();
            }
            self.presents
        }
    }

    struct Rig {
        scene: Scene,
        camera: Camera,
        target: Target,
        controls: Controls,
        log: Log,
        requests: u32,
    }

    impl Rig {
        fn new(size: Extent) -> Self {
            let log: Log = Rc::default();
            Self {
                scene: Scene,
                camera: Camera {
                    aspect: size.aspect_ratio(),
                    log: log.clone(),
                },
                target: Target {
                    drawable: size,
                    backing: size,
                    log: log.clone(),
                    on_draw: None,
                    presents: true,
                },
                controls: Controls { log: log.clone() },
                log,
                requests: 0,
            }
        }

        fn tick(&mut self, scheduler: &mut FrameScheduler, now_ms: f64) -> TickReport {
            let requests = &mut self.requests;
            let mut request = || *requests += 1;
            scheduler.tick(
                now_ms,
                Frame {
                    scene: &self.scene,
                    camera: &mut self.camera,
                    target: &mut self.target,
                    controls: &mut self.controls,
                },
                &mut request,
            )
        }

        fn draws(&self) -> usize {
            self.log
                .borrow()
                .iter()
                .filter(|c| matches!(c, Call::Draw { .. }))
                .count()
        }
    }

    fn rendered(report: TickReport) -> bool {
        matches!(report.outcome, FrameOutcome::Rendered { .. })
    }

    #[test]
    fn boundary_is_inclusive() {
        let mut rig = Rig::new(Extent::new(800, 600));

        let mut scheduler = FrameScheduler::new();
        assert!(!rendered(rig.tick(&mut scheduler, 15.0)));
        assert_eq!(scheduler.last_tick_ms(), 0.0);

        let mut scheduler = FrameScheduler::new();
        assert!(rendered(rig.tick(&mut scheduler, 16.0)));
        assert_eq!(scheduler.last_tick_ms(), 16.0);
    }

    #[test]
    fn renders_only_when_interval_elapsed() {
        let mut rig = Rig::new(Extent::new(800, 600));
        let mut scheduler = FrameScheduler::new();

        let rendered_at: Vec<f64> = [0.0, 5.0, 10.0, 16.0, 30.0, 32.0]
            .into_iter()
            .filter(|&t| rendered(rig.tick(&mut scheduler, t)))
            .collect();

        assert_eq!(rendered_at, vec![16.0, 32.0]);
        assert_eq!(scheduler.stats().frames_rendered, 2);
        assert_eq!(scheduler.stats().frames_skipped, 4);
        assert_eq!(rig.requests, 6);
    }

    #[test]
    fn skipped_tick_reports_elapsed_and_reschedules() {
        let mut rig = Rig::new(Extent::new(800, 600));
        let mut scheduler = FrameScheduler::new();
        rig.tick(&mut scheduler, 16.0);

        let report = rig.tick(&mut scheduler, 30.0);
        assert_eq!(report.outcome, FrameOutcome::Skipped { elapsed_ms: 14.0 });
        assert!(report.rescheduled);
        assert_eq!(rig.draws(), 1);
    }

    #[test]
    fn rate_is_capped_for_arbitrary_timestamps() {
        fn splitmix64(mut z: u64) -> u64 {
            z = z.wrapping_add(0x9e3779b97f4a7c15);
            z = (z ^ (z >> 30)).wrapping_mul(0xbf58476d1ce4e5b9);
            z = (z ^ (z >> 27)).wrapping_mul(0x94d049bb133111eb);
            z ^ (z >> 31)
        }

        for seed in 0..64u64 {
            let mut rig = Rig::new(Extent::new(640, 480));
            let mut scheduler = FrameScheduler::new();
            let mut state = seed;
            let mut now = 0.0;
            let mut first_render = None;
            let mut last_render = 0.0;

            for _ in 0..500 {
                state = splitmix64(state);
                // 0..=40 ms steps, mixing high-refresh bursts and stalls.
                now += (state % 41) as f64;
                if rendered(rig.tick(&mut scheduler, now)) {
                    if first_render.is_none() {
                        first_render = Some(now);
                    }
                    last_render = now;
                }
            }

            let renders = scheduler.stats().frames_rendered as f64;
            if let Some(first) = first_render {
                let span: f64 = last_render - first;
                assert!(
                    renders <= (span / 16.0).ceil() + 1.0,
                    "seed {seed}: {renders} renders in {span} ms"
                );
            }
        }
    }

    #[test]
    fn tick_resize_follows_drawable_size() {
        let mut rig = Rig::new(Extent::new(800, 600));
        let mut scheduler = FrameScheduler::new();
        rig.tick(&mut scheduler, 16.0);

        rig.target.drawable = Extent::new(400, 300);
        let report = rig.tick(&mut scheduler, 32.0);

        assert_eq!(
            report.outcome,
            FrameOutcome::Rendered {
                frame_index: 1,
                resized: true
            }
        );
        assert_eq!(rig.target.backing, Extent::new(400, 300));
        assert_eq!(rig.camera.aspect, 400.0 / 300.0);
        assert_eq!(scheduler.stats().tick_resizes, 1);
    }

    #[test]
    fn steady_size_does_not_reallocate() {
        let mut rig = Rig::new(Extent::new(800, 600));
        let mut scheduler = FrameScheduler::new();
        for i in 1..=5 {
            rig.tick(&mut scheduler, 16.0 * i as f64);
        }
        assert!(
            !rig.log
                .borrow()
                .iter()
                .any(|c| matches!(c, Call::Resize(_)))
        );
        assert_eq!(scheduler.stats().tick_resizes, 0);
    }

    #[test]
    fn frame_steps_run_in_order() {
        let mut rig = Rig::new(Extent::new(800, 600));
        let mut scheduler = FrameScheduler::new();
        rig.target.drawable = Extent::new(400, 300);
        rig.tick(&mut scheduler, 16.0);

        let aspect = 400.0 / 300.0;
        assert_eq!(
            *rig.log.borrow(),
            vec![
                Call::Resize(Extent::new(400, 300)),
                Call::Aspect(aspect),
                Call::Controls,
                Call::Projection,
                Call::Draw { aspect },
            ]
        );
    }

    #[test]
    fn projection_recomputed_every_rendered_frame() {
        let mut rig = Rig::new(Extent::new(800, 600));
        let mut scheduler = FrameScheduler::new();
        rig.tick(&mut scheduler, 16.0);
        rig.tick(&mut scheduler, 20.0);
        rig.tick(&mut scheduler, 40.0);

        let projections = rig
            .log
            .borrow()
            .iter()
            .filter(|c| matches!(c, Call::Projection))
            .count();
        assert_eq!(projections, 2);
    }

    #[test]
    fn viewport_resize_sets_aspect_immediately() {
        let mut rig = Rig::new(Extent::new(800, 600));
        let mut scheduler = FrameScheduler::new();
        rig.tick(&mut scheduler, 16.0);

        let size = Extent::new(1024, 768);
        scheduler.on_viewport_resize(size, &mut rig.camera, &mut rig.target);
        assert_eq!(rig.camera.aspect, 1024.0 / 768.0);
        assert_eq!(rig.target.backing, size);
        assert_eq!(scheduler.stats().viewport_resizes, 1);

        // The drawable area follows the window; the next tick finds nothing to do.
        rig.target.drawable = size;
        let report = rig.tick(&mut scheduler, 32.0);
        assert_eq!(
            report.outcome,
            FrameOutcome::Rendered {
                frame_index: 1,
                resized: false
            }
        );
        assert_eq!(rig.camera.aspect, 1024.0 / 768.0);
    }

    #[test]
    fn backwards_timestamp_is_skipped() {
        let mut rig = Rig::new(Extent::new(800, 600));
        let mut scheduler = FrameScheduler::new();
        rig.tick(&mut scheduler, 100.0);

        let report = rig.tick(&mut scheduler, 50.0);
        assert!(matches!(report.outcome, FrameOutcome::Skipped { .. }));
        assert_eq!(scheduler.last_tick_ms(), 100.0);

        let report = rig.tick(&mut scheduler, f64::NAN);
        assert!(matches!(report.outcome, FrameOutcome::Skipped { .. }));
        assert_eq!(scheduler.last_tick_ms(), 100.0);
    }

    #[test]
    fn stopped_scheduler_does_nothing() {
        let mut rig = Rig::new(Extent::new(800, 600));
        let mut scheduler = FrameScheduler::new();
        scheduler.stop_token().stop();

        let report = rig.tick(&mut scheduler, 16.0);
        assert_eq!(report.outcome, FrameOutcome::Stopped);
        assert!(!report.rescheduled);
        assert_eq!(rig.requests, 0);
        assert_eq!(rig.draws(), 0);
    }

    #[test]
    fn stop_during_draw_prevents_reschedule() {
        let mut rig = Rig::new(Extent::new(800, 600));
        let mut scheduler = FrameScheduler::new();
        rig.target.on_draw = Some(scheduler.stop_token());

        let report = rig.tick(&mut scheduler, 16.0);
        assert!(rendered(report));
        assert!(!report.rescheduled);
        assert_eq!(rig.requests, 0);
        assert!(scheduler.is_stopped());
    }

    #[test]
    fn dropped_draw_is_counted() {
        let mut rig = Rig::new(Extent::new(800, 600));
        let mut scheduler = FrameScheduler::new();
        rig.tick(&mut scheduler, 16.0);
        assert_eq!(scheduler.stats().frames_dropped, 0);

        rig.target.presents = false;
        let report = rig.tick(&mut scheduler, 32.0);
        assert!(rendered(report));
        assert!(report.rescheduled);
        assert_eq!(scheduler.last_tick_ms(), 32.0);
        assert_eq!(scheduler.stats().frames_rendered, 2);
        assert_eq!(scheduler.stats().frames_dropped, 1);
    }

    #[test]
    fn custom_interval() {
        let mut rig = Rig::new(Extent::new(800, 600));
        let mut scheduler = FrameScheduler::with_interval(33.0);
        assert!(!rendered(rig.tick(&mut scheduler, 32.0)));
        assert!(rendered(rig.tick(&mut scheduler, 33.0)));
        assert_eq!(scheduler.interval_ms(), 33.0);
    }

    #[test]
    #[should_panic(expected = "frame interval")]
    fn zero_interval_panics() {
        let _ = FrameScheduler::with_interval(0.0);
    }

    #[test]
    fn independent_schedulers_do_not_share_state() {
        let mut a = FrameScheduler::new();
        let b = FrameScheduler::new();
        let mut rig = Rig::new(Extent::new(800, 600));
        rig.tick(&mut a, 16.0);
        a.stop();
        assert_eq!(b.last_tick_ms(), 0.0);
        assert!(!b.is_stopped());
    }
}
