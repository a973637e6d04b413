use dioxus::desktop::{Config, LogicalSize, WindowBuilder};
use medassist::app::App;
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    // llama.cpp prints to stderr by default; route it through tracing instead
    llama_cpp_2::send_logs_to_tracing(llama_cpp_2::LogOptions::default());

    tracing::info!("Starting MedAssist {}", env!("CARGO_PKG_VERSION"));

    let window = WindowBuilder::new()
        .with_title("Offline Medical Assistant")
        .with_inner_size(LogicalSize::new(1000.0, 820.0));

    dioxus::LaunchBuilder::desktop()
        .with_cfg(Config::new().with_window(window))
        .launch(App);
}
