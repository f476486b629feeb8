//! Flappy entry point
//!
//! Handles platform-specific initialization and runs the game loop.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;
    use wasm_bindgen::prelude::*;
    use web_sys::{HtmlCanvasElement, KeyboardEvent, MouseEvent, TouchEvent};

    use flappy::renderer::RenderState;
    use flappy::sim::{GameEvent, GamePhase};
    use flappy::{DriverKind, Session, Settings, is_flap_key};

    /// Outstanding platform callback driving the session
    enum DriverHandle {
        Frame(i32),
        Interval(i32),
    }

    /// Game instance holding all state
    struct Game {
        session: Session,
        settings: Settings,
        render_state: Option<RenderState>,
        last_time: f64,
        handle: Option<DriverHandle>,
        // FPS tracking
        frame_times: [f64; 60],
        frame_index: usize,
        fps: u32,
    }

    impl Game {
        fn new(seed: u64, settings: Settings) -> Self {
            let mut session = Session::new(seed, settings.preset.tuning());
            session.set_autopilot(settings.autopilot);
            Self {
                session,
                settings,
                render_state: None,
                last_time: 0.0,
                handle: None,
                frame_times: [0.0; 60],
                frame_index: 0,
                fps: 0,
            }
        }

        /// Track frame times for FPS
        fn record_frame(&mut self, time: f64) {
            self.frame_times[self.frame_index] = time;
            self.frame_index = (self.frame_index + 1) % 60;

            let oldest_time = self.frame_times[self.frame_index];
            if oldest_time > 0.0 {
                let elapsed = time - oldest_time;
                if elapsed > 0.0 {
                    self.fps = (60000.0 / elapsed).round() as u32;
                }
            }
        }

        /// Render the current snapshot
        fn render(&mut self) {
            let snapshot = self.session.snapshot();
            let upright = self.settings.reduced_motion;
            if let Some(ref mut render_state) = self.render_state {
                match render_state.render_snapshot(&snapshot, upright) {
                    Ok(_) => {}
                    Err(wgpu::SurfaceError::Lost) => {
                        render_state.reconfigure();
                    }
                    Err(wgpu::SurfaceError::OutOfMemory) => {
                        log::error!("Out of memory!");
                    }
                    Err(e) => log::warn!("Render error: {:?}", e),
                }
            }
        }

        /// Update HUD elements in DOM
        fn update_hud(&self, events: &[GameEvent]) {
            let Some(document) = web_sys::window().and_then(|w| w.document()) else {
                return;
            };
            let state = self.session.state();

            if let Some(el) = document.get_element_by_id("hud-score") {
                el.set_text_content(Some(&state.score.to_string()));
            }

            if let Some(el) = document.get_element_by_id("hud-fps") {
                if self.settings.show_fps {
                    let _ = el.set_attribute("class", "");
                    el.set_text_content(Some(&format!("{} fps", self.fps)));
                } else {
                    let _ = el.set_attribute("class", "hidden");
                }
            }

            // Message only changes on phase transitions
            let phase_changed = events.iter().any(|e| {
                matches!(e, GameEvent::RoundStarted | GameEvent::Crashed { .. })
            });
            if phase_changed || self.last_time == 0.0 {
                if let Some(el) = document.get_element_by_id("message") {
                    let (class, text) = match state.phase {
                        GamePhase::Idle => ("", "Click or press Space to start"),
                        GamePhase::Playing => ("hidden", ""),
                        GamePhase::GameOver => ("", "Game over - click or press Space to restart"),
                    };
                    let _ = el.set_attribute("class", class);
                    el.set_text_content(Some(text));
                }
            }
        }

        /// Stop the session and cancel the pending driver callback
        fn shutdown(&mut self) {
            self.session.stop();
            let Some(window) = web_sys::window() else {
                return;
            };
            match self.handle.take() {
                Some(DriverHandle::Frame(id)) => {
                    let _ = window.cancel_animation_frame(id);
                }
                Some(DriverHandle::Interval(id)) => window.clear_interval_with_handle(id),
                None => {}
            }
            log::info!("Game loop stopped");
        }
    }

    pub async fn run() {
        console_error_panic_hook::set_once();
        if let Err(e) = console_log::init_with_level(log::Level::Info) {
            web_sys::console::error_1(&format!("Failed to init logger: {e}").into());
        }

        log::info!("Flappy starting...");

        let Some(window) = web_sys::window() else {
            log::error!("No window");
            return;
        };
        let Some(document) = window.document() else {
            log::error!("No document");
            return;
        };

        let canvas: HtmlCanvasElement = match document
            .get_element_by_id("canvas")
            .and_then(|el| el.dyn_into().ok())
        {
            Some(canvas) => canvas,
            None => {
                log::error!("No <canvas id=\"canvas\"> element");
                return;
            }
        };

        let settings = Settings::load();
        let tuning = settings.preset.tuning();

        // Backing store at device resolution, field aspect ratio
        let dpr = window.device_pixel_ratio();
        let width = (tuning.field_width as f64 * dpr) as u32;
        let height = (tuning.field_height as f64 * dpr) as u32;
        canvas.set_width(width);
        canvas.set_height(height);

        let seed = js_sys::Date::now() as u64;
        let driver = settings.driver;
        let game = Rc::new(RefCell::new(Game::new(seed, settings)));
        log::info!("Game initialized with seed: {}", seed);

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::BROWSER_WEBGPU | wgpu::Backends::GL,
            ..Default::default()
        });

        let surface = match instance.create_surface(wgpu::SurfaceTarget::Canvas(canvas.clone())) {
            Ok(surface) => surface,
            Err(e) => {
                log::error!("Failed to create surface: {}", e);
                return;
            }
        };

        let adapter = match instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::LowPower,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
        {
            Ok(adapter) => adapter,
            Err(e) => {
                log::error!("Failed to get adapter: {}", e);
                return;
            }
        };
        log::info!("Using adapter: {:?}", adapter.get_info().name);

        let field = glam::Vec2::new(tuning.field_width, tuning.field_height);
        match RenderState::new(surface, &adapter, width, height, field).await {
            Ok(render_state) => game.borrow_mut().render_state = Some(render_state),
            Err(e) => {
                log::error!("Failed to create device: {}", e);
                return;
            }
        }

        setup_input_handlers(&canvas, game.clone());
        setup_teardown(game.clone());

        game.borrow().update_hud(&[]);
        match driver {
            DriverKind::Frame => request_animation_frame(game),
            DriverKind::Interval => start_interval(game, tuning.tick_secs()),
        }

        log::info!("Flappy running!");
    }

    fn setup_input_handlers(canvas: &HtmlCanvasElement, game: Rc<RefCell<Game>>) {
        // Mouse click
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: MouseEvent| {
                game.borrow_mut().session.press();
            });
            let _ = canvas
                .add_event_listener_with_callback("mousedown", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Touch
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: TouchEvent| {
                event.prevent_default();
                game.borrow_mut().session.press();
            });
            let _ = canvas
                .add_event_listener_with_callback("touchstart", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Keyboard
        {
            let Some(window) = web_sys::window() else {
                return;
            };
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                let mut g = game.borrow_mut();
                let key = event.key();
                if key == "i" || key == "I" {
                    let on = !g.session.autopilot();
                    g.session.set_autopilot(on);
                    return;
                }
                if is_flap_key(&key, g.settings.any_key_flaps) {
                    event.prevent_default();
                    g.session.press();
                }
            });
            let _ = window
                .add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    /// Cancel the driver when the page goes away
    fn setup_teardown(game: Rc<RefCell<Game>>) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
            game.borrow_mut().shutdown();
        });
        let _ = window.add_event_listener_with_callback("pagehide", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn request_animation_frame(game: Rc<RefCell<Game>>) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let next = game.clone();
        let closure = Closure::once(move |time: f64| {
            game_loop(next, time);
        });
        match window.request_animation_frame(closure.as_ref().unchecked_ref()) {
            Ok(id) => game.borrow_mut().handle = Some(DriverHandle::Frame(id)),
            Err(e) => log::error!("requestAnimationFrame failed: {:?}", e),
        }
        closure.forget();
    }

    fn game_loop(game: Rc<RefCell<Game>>, time: f64) {
        {
            let mut g = game.borrow_mut();
            if !g.session.is_running() {
                return;
            }

            // Calculate delta time
            let dt = if g.last_time > 0.0 {
                ((time - g.last_time) / 1000.0) as f32
            } else {
                0.0
            };

            let events = g.session.frame(dt);
            g.record_frame(time);
            g.render();
            g.update_hud(&events);
            g.last_time = time;
        }

        request_animation_frame(game);
    }

    fn start_interval(game: Rc<RefCell<Game>>, tick_secs: f32) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let period_ms = (tick_secs * 1000.0).round() as i32;
        let inner = game.clone();
        let closure = Closure::<dyn FnMut()>::new(move || {
            let mut g = inner.borrow_mut();
            if !g.session.is_running() {
                return;
            }
            let events = g.session.interval();
            g.record_frame(js_sys::Date::now());
            g.render();
            g.update_hud(&events);
            g.last_time = js_sys::Date::now();
        });
        match window.set_interval_with_callback_and_timeout_and_arguments_0(
            closure.as_ref().unchecked_ref(),
            period_ms,
        ) {
            Ok(id) => game.borrow_mut().handle = Some(DriverHandle::Interval(id)),
            Err(e) => log::error!("setInterval failed: {:?}", e),
        }
        closure.forget();
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub async fn wasm_main() {
    wasm_game::run().await;
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

/// Headless autopilot demo: one round, then report the score
#[cfg(not(target_arch = "wasm32"))]
fn main() -> anyhow::Result<()> {
    use anyhow::Context;
    use flappy::sim::GameEvent;
    use flappy::{Preset, Session, Tuning};

    /// Give up after ten minutes of game time at 60 Hz
    const MAX_DEMO_TICKS: u32 = 60 * 60 * 10;

    env_logger::init();
    log::info!("Flappy (native) starting...");
    log::info!("Native mode runs a headless demo - run with `trunk serve` for the web version");

    let mut args = std::env::args().skip(1);
    let tuning = match args.next() {
        None => Tuning::canvas(),
        Some(arg) => match Preset::from_str(&arg) {
            Some(preset) => preset.tuning(),
            None => {
                let json = std::fs::read_to_string(&arg)
                    .with_context(|| format!("reading tuning file {arg}"))?;
                Tuning::from_json(&json).with_context(|| format!("loading tuning file {arg}"))?
            }
        },
    };
    let seed = match args.next() {
        Some(s) => s.parse().with_context(|| format!("invalid seed {s}"))?,
        None => 1,
    };

    let mut session = Session::new(seed, tuning);
    session.set_autopilot(true);

    let mut ticks = 0;
    while ticks < MAX_DEMO_TICKS {
        ticks += 1;
        let events = session.interval();
        if events.iter().any(|e| matches!(e, GameEvent::Crashed { .. })) {
            break;
        }
    }
    session.stop();

    println!(
        "Demo finished: score {} after {} ticks (seed {})",
        session.state().score,
        ticks,
        seed
    );
    Ok(())
}
