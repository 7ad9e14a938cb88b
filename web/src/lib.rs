use clap::Parser;
use gloo::timers::callback::Interval;
use ppt_core::{GameEngine, PersistenceAdapter, SeededRandom};
use std::cell::{OnceCell, RefCell};
use std::rc::Rc;
use wasm_bindgen::prelude::*;

use crate::controller::Controller;
use crate::settings::Settings;
use crate::store::LocalStore;
use crate::utils::*;

mod controller;
mod countdown;
mod settings;
mod store;
mod utils;

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// What log level to use
    #[command(flatten)]
    verbose: clap_verbosity_flag::Verbosity,

    /// Force a seed instead of random
    #[arg(short, long)]
    seed: Option<u64>,
}

impl Args {
    /// Arguments come from the page hash, e.g. `#-vv&--seed=7`.
    fn from_location() -> Self {
        let location_hash = gloo::utils::window()
            .location()
            .hash()
            .unwrap_or_else(|_| "".to_string());

        Self::try_parse_from(location_hash.split(['#', '&'])).unwrap_or_else(|err| {
            log::warn!("ignoring page arguments: {}", err);
            Self::parse_from([""])
        })
    }
}

thread_local! {
    /// Seed forced from the page hash, read once at start-up.
    static FORCED_SEED: OnceCell<Option<u64>> = const { OnceCell::new() };
}

#[wasm_bindgen(start)]
pub fn run_app() {
    #[cfg(feature = "console_error_panic_hook")]
    {
        console_error_panic_hook::set_once();
    }

    let args = Args::from_location();
    if let Some(log_level) = args.verbose.log_level() {
        console_log::init_with_level(log_level).expect("Error initializing logger");
    }
    log::debug!("seed: {:?}", args.seed);
    FORCED_SEED.with(|seed| {
        seed.get_or_init(|| args.seed);
    });
}

type AppController = Controller<LocalStore, SeededRandom>;

/// Game session bound to the page. Every change is pushed to `on_change` as view JSON.
#[wasm_bindgen]
pub struct PptApp {
    controller: Rc<RefCell<AppController>>,
    on_change: js_sys::Function,
    _timer: Interval,
}

#[wasm_bindgen]
impl PptApp {
    #[wasm_bindgen(constructor)]
    pub fn new(on_change: js_sys::Function) -> PptApp {
        let settings = Settings::local_or_default().normalized();
        settings.local_save();

        let seed = FORCED_SEED
            .with(|seed| seed.get().copied().flatten())
            .unwrap_or_else(js_random_seed);
        log::debug!("dealing with seed {}", seed);

        let controller = Rc::new(RefCell::new(Controller::new(
            GameEngine::new(SeededRandom::new(seed)),
            PersistenceAdapter::new(LocalStore),
            settings,
            now_millis,
        )));

        let timer = {
            let controller = controller.clone();
            let on_change = on_change.clone();
            let tick_ms = controller.borrow().countdown().tick_ms();
            Interval::new(tick_ms, move || {
                let tick = controller.borrow_mut().tick();
                if tick.has_update() {
                    let json = view_json(&controller.borrow());
                    notify(&on_change, json);
                }
            })
        };

        let app = PptApp {
            controller,
            on_change,
            _timer: timer,
        };
        app.changed();
        app
    }

    /// Deals a new session, or resumes the one found in storage.
    pub fn start(&self) -> bool {
        let changed = self.controller.borrow_mut().start();
        if changed {
            self.changed();
        }
        changed
    }

    pub fn play(&self, choice: &str) -> bool {
        let played = self.controller.borrow_mut().play(choice).is_some();
        self.changed();
        played
    }

    #[wasm_bindgen(js_name = commitName)]
    pub fn commit_name(&self, name: &str) -> Result<String, JsError> {
        let applied = self.controller.borrow_mut().commit_name(name)?;
        self.changed();
        Ok(applied)
    }

    #[wasm_bindgen(js_name = clearHistory)]
    pub fn clear_history(&self) -> bool {
        let cleared = self.controller.borrow_mut().clear_history();
        self.changed();
        cleared
    }

    #[wasm_bindgen(js_name = viewJson)]
    pub fn view_json(&self) -> String {
        view_json(&self.controller.borrow())
    }
}

impl PptApp {
    fn changed(&self) {
        notify(&self.on_change, self.view_json());
    }
}

fn view_json(controller: &AppController) -> String {
    serde_json::to_string(&controller.view()).unwrap_or_else(|err| {
        log::error!("could not serialize the view: {}", err);
        "null".to_string()
    })
}

/// The controller must not be borrowed here, the callback may call back into the app.
fn notify(on_change: &js_sys::Function, json: String) {
    if let Err(err) = on_change.call1(&JsValue::NULL, &JsValue::from(json)) {
        log::error!("on_change callback failed: {:?}", err);
    }
}
