mod app;
mod components;
mod config;
mod utils;

use tracing_subscriber::filter::LevelFilter;

fn main() {
    console_error_panic_hook::set_once();
    utils::log::init(LevelFilter::INFO);

    app::start_when_ready();
}
