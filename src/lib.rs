mod app;
mod components;
pub mod error;
pub mod models;
pub mod services;
mod utils;

use wasm_bindgen::prelude::*;
use app::App;

pub use error::ChatError;
pub use services::conversation::{ConversationManager, TurnOutcome};

#[wasm_bindgen(start)]
pub fn run_app() {
    utils::set_panic_hook();
    utils::init_logging();
    yew::Renderer::<App>::new().render();
}
