//! Neon Slash entry point
//!
//! Handles platform-specific initialization and runs the game loop.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;

    use glam::Vec2;
    use wasm_bindgen::prelude::*;
    use web_sys::{CanvasRenderingContext2d, Element, HtmlCanvasElement, MouseEvent, TouchEvent};

    use neon_slash::platform::{
        ContainerRect, FrameClock, FrameLoop, FrameScheduler, PointerTracker, RawPointer,
    };
    use neon_slash::render::{Overlay, RenderFrame};
    use neon_slash::sim::{GamePhase, Simulation};
    use neon_slash::GameConfig;

    type FrameCallback = Rc<RefCell<Option<Closure<dyn FnMut(f64)>>>>;

    /// `requestAnimationFrame` / `cancelAnimationFrame`
    struct RafScheduler {
        callback: FrameCallback,
    }

    impl FrameScheduler for RafScheduler {
        type Handle = i32;

        fn request_frame(&mut self) -> Option<i32> {
            let window = web_sys::window()?;
            let callback = self.callback.borrow();
            let callback = callback.as_ref()?;
            window
                .request_animation_frame(callback.as_ref().unchecked_ref())
                .ok()
        }

        fn cancel_frame(&mut self, handle: i32) {
            if let Some(window) = web_sys::window() {
                let _ = window.cancel_animation_frame(handle);
            }
        }
    }

    /// Game instance holding all state
    struct Game {
        sim: Simulation,
        tracker: PointerTracker,
        clock: FrameClock,
        frames: FrameLoop<RafScheduler>,
        container: Option<Element>,
        canvas: Option<HtmlCanvasElement>,
        ctx: Option<CanvasRenderingContext2d>,
    }

    impl Game {
        /// Current container geometry (None if the element is gone)
        fn container_rect(&self) -> Option<ContainerRect> {
            let rect = self.container.as_ref()?.get_bounding_client_rect();
            Some(ContainerRect::new(
                rect.left() as f32,
                rect.top() as f32,
                rect.width() as f32,
                rect.height() as f32,
            ))
        }

        /// The start/retry/play-again verb
        fn start(&mut self) {
            if !self.sim.start() {
                return;
            }
            self.tracker.reset();
            self.clock.reset();
            self.present();
            self.frames.sync(self.sim.phase());
        }

        /// One host frame: step, draw, reschedule or stop
        fn on_frame(&mut self, time: f64) {
            self.frames.on_frame();

            let steps = self.clock.steps_for(time);
            for _ in 0..steps {
                let input = self.tracker.sample();
                let report = self.sim.step(&input);
                if report.phase != GamePhase::Playing {
                    break;
                }
            }

            self.present();
            let phase = self.sim.phase();
            self.frames.sync(phase);
        }

        fn present(&self) {
            let frame = RenderFrame::project(&self.sim);
            update_hud(&frame);
            if let (Some(canvas), Some(ctx)) = (&self.canvas, &self.ctx) {
                draw(canvas, ctx, &frame);
            }
        }
    }

    /// Read an inline JSON config, falling back to defaults
    fn load_config(document: &web_sys::Document) -> GameConfig {
        let Some(json) = document
            .get_element_by_id("neon-slash-config")
            .and_then(|el| el.text_content())
        else {
            return GameConfig::default();
        };
        match GameConfig::from_json(&json) {
            Ok(config) => {
                log::info!("Loaded inline config");
                config
            }
            Err(e) => {
                log::warn!("{e}; using default config");
                GameConfig::default()
            }
        }
    }

    pub fn run() {
        console_error_panic_hook::set_once();
        console_log::init_with_level(log::Level::Info).expect("Failed to init logger");

        log::info!("Neon Slash starting...");

        let window = web_sys::window().expect("no window");
        let document = window.document().expect("no document");

        let config = load_config(&document);
        let seed = js_sys::Date::now() as u64;

        let container = document.get_element_by_id("game-container");
        if container.is_none() {
            log::warn!("No #game-container; pointer input disabled");
        }
        let canvas: Option<HtmlCanvasElement> = document
            .get_element_by_id("game-canvas")
            .and_then(|el| el.dyn_into().ok());
        let ctx = canvas
            .as_ref()
            .and_then(|c| c.get_context("2d").ok().flatten())
            .and_then(|c| c.dyn_into::<CanvasRenderingContext2d>().ok());

        let clock = FrameClock::new(config.fixed_step_hz);
        let sim = match Simulation::new(config, seed) {
            Ok(sim) => sim,
            Err(e) => {
                log::error!("Cannot start game: {e}");
                return;
            }
        };

        let callback: FrameCallback = Rc::new(RefCell::new(None));
        let game = Rc::new(RefCell::new(Game {
            clock,
            sim,
            tracker: PointerTracker::new(),
            frames: FrameLoop::new(RafScheduler {
                callback: callback.clone(),
            }),
            container: container.clone(),
            canvas,
            ctx,
        }));

        log::info!("Game initialized with seed: {}", game.borrow().sim.seed());

        {
            let game = game.clone();
            *callback.borrow_mut() = Some(Closure::new(move |time: f64| {
                game.borrow_mut().on_frame(time);
            }));
        }

        if let Some(container) = &container {
            setup_input_handlers(container, game.clone());
        }
        setup_start_buttons(&document, game.clone());

        game.borrow().present();

        log::info!("Neon Slash running!");
    }

    /// Whether the event started on a button (overlay buttons live inside the container)
    fn targets_button(event: &web_sys::Event) -> bool {
        event
            .target()
            .and_then(|t| t.dyn_into::<Element>().ok())
            .and_then(|el| el.closest("button").ok().flatten())
            .is_some()
    }

    /// Absolute point(s) of a touch event
    fn touch_points(event: &TouchEvent) -> RawPointer {
        let touches = event.touches();
        let points = (0..touches.length())
            .filter_map(|i| touches.get(i))
            .map(|t| Vec2::new(t.client_x() as f32, t.client_y() as f32))
            .collect();
        RawPointer::Touch { points }
    }

    fn mouse_point(event: &MouseEvent) -> RawPointer {
        RawPointer::Mouse {
            x: event.client_x() as f32,
            y: event.client_y() as f32,
        }
    }

    fn setup_input_handlers(container: &Element, game: Rc<RefCell<Game>>) {
        // Mouse down - start slashing
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: MouseEvent| {
                let mut g = game.borrow_mut();
                let rect = g.container_rect();
                g.tracker.press(&mouse_point(&event), rect);
            });
            let _ = container
                .add_event_listener_with_callback("mousedown", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Mouse move - only tracked while pressed
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: MouseEvent| {
                let mut g = game.borrow_mut();
                let rect = g.container_rect();
                g.tracker.move_to(&mouse_point(&event), rect);
            });
            let _ = container
                .add_event_listener_with_callback("mousemove", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Touch start
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: TouchEvent| {
                // Keep the synthetic click so overlay buttons respond to taps
                if targets_button(&event) {
                    return;
                }
                event.prevent_default();
                let mut g = game.borrow_mut();
                let rect = g.container_rect();
                g.tracker.press(&touch_points(&event), rect);
            });
            let _ = container
                .add_event_listener_with_callback("touchstart", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Touch move
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: TouchEvent| {
                event.prevent_default();
                let mut g = game.borrow_mut();
                let rect = g.container_rect();
                g.tracker.move_to(&touch_points(&event), rect);
            });
            let _ = container
                .add_event_listener_with_callback("touchmove", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Release on up/leave/end/cancel
        for name in ["mouseup", "mouseleave", "touchend", "touchcancel"] {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                game.borrow_mut().tracker.release();
            });
            let _ = container.add_event_listener_with_callback(name, closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn setup_start_buttons(document: &web_sys::Document, game: Rc<RefCell<Game>>) {
        for id in ["start-btn", "retry-btn", "play-again-btn"] {
            if let Some(btn) = document.get_element_by_id(id) {
                let game = game.clone();
                let closure = Closure::<dyn FnMut(_)>::new(move |_event: MouseEvent| {
                    game.borrow_mut().start();
                });
                let _ = btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
                closure.forget();
            }
        }
    }

    /// Update HUD elements in DOM
    fn update_hud(frame: &RenderFrame) {
        let Some(document) = web_sys::window().and_then(|w| w.document()) else {
            return;
        };

        if let Some(el) = document.get_element_by_id("hud-score") {
            el.set_text_content(Some(&frame.score.to_string()));
        }

        if let Some(el) = document.get_element_by_id("hud-hearts") {
            let hearts: String = frame
                .hearts
                .iter()
                .map(|&full| if full { '❤' } else { '♡' })
                .collect();
            el.set_text_content(Some(&hearts));
        }

        if let Some(el) = document.get_element_by_id("slash-trail") {
            let _ = el.set_attribute("points", &frame.trail_points_attr());
        }

        // Exactly one overlay (or none) is visible
        let visible = match frame.overlay {
            Some(Overlay::Menu) => Some("menu-overlay"),
            Some(Overlay::GameOver { .. }) => Some("gameover-overlay"),
            Some(Overlay::Victory { .. }) => Some("victory-overlay"),
            None => None,
        };
        for id in ["menu-overlay", "gameover-overlay", "victory-overlay"] {
            if let Some(el) = document.get_element_by_id(id) {
                let class = if visible == Some(id) { "overlay" } else { "overlay hidden" };
                let _ = el.set_attribute("class", class);
            }
        }

        if let Some(Overlay::GameOver { final_score } | Overlay::Victory { final_score }) =
            frame.overlay
        {
            if let Some(el) = document.get_element_by_id("final-score") {
                el.set_text_content(Some(&final_score.to_string()));
            }
        }
    }

    /// Draw the projected frame onto the 2D canvas
    fn draw(canvas: &HtmlCanvasElement, ctx: &CanvasRenderingContext2d, frame: &RenderFrame) {
        let w = canvas.width() as f64;
        let h = canvas.height() as f64;
        let sx = |x: f32| x as f64 / 100.0 * w;
        let sy = |y: f32| y as f64 / 100.0 * h;

        ctx.set_global_alpha(1.0);
        ctx.clear_rect(0.0, 0.0, w, h);
        ctx.save();

        if frame.shake > 0.0 {
            let s = frame.shake as f64;
            let dx = js_sys::Math::random() * s - s / 2.0;
            let dy = js_sys::Math::random() * s - s / 2.0;
            let _ = ctx.translate(dx, dy);
        }

        // Trail
        if frame.trail.len() > 1 {
            ctx.begin_path();
            for (i, &(x, y)) in frame.trail.iter().enumerate() {
                if i == 0 {
                    ctx.move_to(sx(x), sy(y));
                } else {
                    ctx.line_to(sx(x), sy(y));
                }
            }
            ctx.set_global_alpha(0.8);
            ctx.set_stroke_style_str("#22d3ee");
            ctx.set_line_width(4.0);
            ctx.set_line_cap("round");
            ctx.set_line_join("round");
            ctx.stroke();
        }

        // Particles
        for p in &frame.particles {
            ctx.set_global_alpha(p.opacity as f64);
            ctx.set_fill_style_str(p.color);
            ctx.begin_path();
            let _ = ctx.arc(sx(p.x), sy(p.y), 3.0 * p.scale as f64, 0.0, std::f64::consts::TAU);
            ctx.fill();
        }

        // Enemies
        let radius = w.min(h) * 0.06;
        for e in &frame.enemies {
            ctx.begin_path();
            let _ = ctx.arc(sx(e.x), sy(e.y), radius * e.scale as f64, 0.0, std::f64::consts::TAU);
            if e.exploding {
                ctx.set_global_alpha(0.4);
                ctx.set_stroke_style_str("#facc15");
                ctx.set_line_width(2.0);
                ctx.stroke();
            } else {
                ctx.set_global_alpha(1.0);
                ctx.set_fill_style_str(e.kind.color().hex());
                ctx.fill();
            }
        }

        // Floating score labels
        ctx.set_text_align("center");
        ctx.set_fill_style_str("#facc15");
        for t in &frame.texts {
            ctx.set_global_alpha(t.opacity as f64);
            ctx.set_font(&format!("bold {}px sans-serif", (14.0 * t.scale).round()));
            let _ = ctx.fill_text(&t.text, sx(t.x), sy(t.y));
        }

        ctx.restore();
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() {
    wasm_game::run();
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Neon Slash (native) starting...");
    log::info!("Native mode is headless - serve the wasm build for the playable version");

    run_demo_session();
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

/// Play one session with a scripted pointer sweeping across the lower half
#[cfg(not(target_arch = "wasm32"))]
fn run_demo_session() {
    use neon_slash::render::RenderFrame;
    use neon_slash::sim::{GamePhase, PointerSample, Simulation};
    use neon_slash::GameConfig;

    const MAX_FRAMES: u32 = 60 * 60 * 5;

    let mut sim = match Simulation::new(GameConfig::default(), 42) {
        Ok(sim) => sim,
        Err(e) => {
            log::error!("Invalid demo config: {e}");
            return;
        }
    };
    sim.start();

    let mut frame = 0;
    while sim.phase() == GamePhase::Playing && frame < MAX_FRAMES {
        // Sweep back and forth, one full pass per second
        let t = (frame % 120) as f32 / 60.0;
        let x = if t < 1.0 { t * 100.0 } else { (2.0 - t) * 100.0 };
        let report = sim.step(&PointerSample::held_at(x, 75.0));
        if report.kills() > 0 {
            log::debug!("frame {}: {} kill(s), score {}", frame, report.kills(), sim.score());
        }
        frame += 1;
    }

    let render = RenderFrame::project(&sim);
    match render.to_json() {
        Ok(json) => log::debug!("Final frame: {json}"),
        Err(e) => log::warn!("Could not serialize final frame: {e}"),
    }
    println!(
        "Demo finished: {} after {} frames, score {}, health {}",
        sim.phase().as_str(),
        frame,
        render.score,
        render.health
    );
}
