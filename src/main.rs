//! Collider Idle entry point
//!
//! In the browser this hosts the accelerator: animation-frame loop, canvas
//! clicks, purchase/reset events from the page and the renderer hand-off.
//! Natively it runs a headless idle session and logs the outcome.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;

    use glam::Vec2;
    use wasm_bindgen::prelude::*;
    use web_sys::{CustomEvent, HtmlCanvasElement, MouseEvent};

    use collider_idle::economy::PurchaseIntent;
    use collider_idle::persistence::{LocalStorage, MemoryStorage, Storage};
    use collider_idle::{Accelerator, Settings};

    // Renderer and UI live in the page; they receive one JSON frame per tick
    #[wasm_bindgen(inline_js = "
        export function render_frame(json) {
            if (typeof window.renderAccelerator === 'function') {
                window.renderAccelerator(JSON.parse(json));
            }
        }
    ")]
    extern "C" {
        fn render_frame(json: &str);
    }

    struct Game {
        accelerator: Accelerator,
        canvas: HtmlCanvasElement,
    }

    impl Game {
        /// Convert a mouse event to logical play-field coordinates
        fn logical_pos(&self, event: &MouseEvent) -> Vec2 {
            let rect = self.canvas.get_bounding_client_rect();
            let viewport = self.accelerator.settings().viewport_size;
            let scale_x = viewport / rect.width().max(1.0) as f32;
            let scale_y = viewport / rect.height().max(1.0) as f32;
            Vec2::new(
                (event.client_x() as f32 - rect.left() as f32) * scale_x,
                (event.client_y() as f32 - rect.top() as f32) * scale_y,
            )
        }

        fn present(&mut self) {
            let frame = self.accelerator.render_frame();
            match serde_json::to_string(&frame) {
                Ok(json) => render_frame(&json),
                Err(e) => log::warn!("Could not encode render frame: {}", e),
            }
        }
    }

    fn open_storage() -> Box<dyn Storage> {
        match LocalStorage::open() {
            Ok(storage) => Box::new(storage),
            Err(e) => {
                log::warn!("{}; progress will not be saved", e);
                Box::new(MemoryStorage::new())
            }
        }
    }

    pub fn run() {
        console_error_panic_hook::set_once();
        if console_log::init_with_level(log::Level::Info).is_err() {
            web_sys::console::warn_1(&"Logger already initialized".into());
        }

        log::info!("Collider Idle starting...");

        let Some(window) = web_sys::window() else {
            web_sys::console::error_1(&"No window".into());
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

        let storage = open_storage();
        let mut settings = Settings::load(storage.as_ref());
        if settings.seed.is_none() {
            settings.seed = Some(js_sys::Date::now() as u64);
        }
        canvas.set_width(settings.viewport_size as u32);
        canvas.set_height(settings.viewport_size as u32);

        let mut accelerator = Accelerator::new(settings, storage);
        if accelerator.start() {
            log::info!("Continuing saved game");
        }

        if let Some(loading) = document.get_element_by_id("loading") {
            let _ = loading.set_attribute("class", "hidden");
        }

        let game = Rc::new(RefCell::new(Game {
            accelerator,
            canvas: canvas.clone(),
        }));

        setup_input_handlers(&window, &canvas, game.clone());
        request_animation_frame(game);

        log::info!("Collider Idle running!");
    }

    fn setup_input_handlers(
        window: &web_sys::Window,
        canvas: &HtmlCanvasElement,
        game: Rc<RefCell<Game>>,
    ) {
        // Canvas click
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: MouseEvent| {
                let mut g = game.borrow_mut();
                let pos = g.logical_pos(&event);
                g.accelerator.click(pos);
            });
            let _ =
                canvas.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Purchase intent from the upgrade panel: detail is the upgrade id
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: CustomEvent| {
                let Some(id) = event.detail().as_string() else {
                    log::debug!("Purchase event without an upgrade id");
                    return;
                };
                // Rejections are logged by the accelerator
                let _ = game.borrow_mut().accelerator.purchase(&PurchaseIntent::new(id));
            });
            let _ = window.add_event_listener_with_callback(
                "accelerator-purchase",
                closure.as_ref().unchecked_ref(),
            );
            closure.forget();
        }

        // Reset button
        {
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                game.borrow_mut().accelerator.reset();
            });
            let _ = window.add_event_listener_with_callback(
                "accelerator-reset",
                closure.as_ref().unchecked_ref(),
            );
            closure.forget();
        }
    }

    fn request_animation_frame(game: Rc<RefCell<Game>>) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let closure = Closure::once(move |time: f64| {
            game_loop(game, time);
        });
        let _ = window.request_animation_frame(closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn game_loop(game: Rc<RefCell<Game>>, time: f64) {
        {
            let mut g = game.borrow_mut();
            g.accelerator.frame(time);
            g.present();
        }

        request_animation_frame(game);
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() {
    wasm_game::run();
}

/// Headless idle session: clicks now and then, buys the cheapest affordable
/// upgrade once a second and reports the result.
#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use collider_idle::economy::PurchaseIntent;
    use collider_idle::persistence::MemoryStorage;
    use collider_idle::{Accelerator, Settings};
    use glam::Vec2;

    env_logger::init();

    let mut args = std::env::args().skip(1);
    let minutes: f64 = args.next().and_then(|a| a.parse().ok()).unwrap_or(10.0);
    let seed: u64 = args.next().and_then(|a| a.parse().ok()).unwrap_or(42);

    log::info!("Collider Idle (headless) for {} minutes, seed {}", minutes, seed);

    let settings = Settings {
        seed: Some(seed),
        ..Settings::default()
    };
    let mut accelerator = Accelerator::new(settings, Box::new(MemoryStorage::new()));
    accelerator.start();

    let frame_ms = 1000.0 / 60.0;
    let frames = (minutes * 60.0 * 60.0) as u64;
    let mut purchases = 0u32;
    for frame in 0..frames {
        let time = frame as f64 * frame_ms;
        accelerator.frame(time);

        if frame % 15 == 0 {
            let layout = *accelerator.engine().layout();
            let radius = layout.ring_radius(accelerator.state().accelerator_size);
            accelerator.click(layout.center + Vec2::new(radius, 0.0));
        }

        if frame % 60 == 0 {
            let best = accelerator
                .offers()
                .into_iter()
                .filter(|o| o.affordable)
                .filter_map(|o| o.next_cost.map(|c| (o.id, c)))
                .min_by(|a, b| a.1.total_cmp(&b.1));
            if let Some((id, cost)) = best
                && accelerator
                    .purchase(&PurchaseIntent::new(id).with_expected_cost(cost))
                    .is_ok()
            {
                purchases += 1;
            }
        }

        // Drain events the way a renderer would
        if frame % 60 == 59 {
            accelerator.render_frame();
        }
    }

    let stats = accelerator.stats();
    log::info!(
        "Finished: {:.0} energy, {} collisions ({:.2}/s), {} live particles, {} purchases",
        stats.energy,
        stats.collisions,
        stats.collision_rate,
        stats.live_particles,
        purchases
    );
    for achievement in accelerator.state().achievements.iter() {
        log::info!("Achievement: {}", achievement.title());
    }
    match serde_json::to_string_pretty(&stats) {
        Ok(json) => println!("{}", json),
        Err(e) => log::error!("Could not encode stats: {}", e),
    }
}
