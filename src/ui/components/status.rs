//! Model status line

use crate::app::AppState;
use crate::storage::huggingface::format_size;
use crate::types::model::ModelState;
use dioxus::prelude::*;

fn status_text(state: &ModelState) -> String {
    match state {
        ModelState::NotLoaded => "Model not loaded yet. It loads on the first question.".to_string(),
        ModelState::Downloading { downloaded, total } if *total > 0 => format!(
            "Downloading model: {}% ({} of {})",
            state.download_percent().unwrap_or(0),
            format_size(*downloaded),
            format_size(*total)
        ),
        ModelState::Downloading { .. } => "Downloading model...".to_string(),
        ModelState::Loading => "Loading model...".to_string(),
        ModelState::Loaded(description) => format!("Model ready: {}", description),
        ModelState::Error(e) => format!("Model failed to load: {}", e),
    }
}

#[component]
pub fn ModelStatus() -> Element {
    let app_state = use_context::<AppState>();
    let state = app_state.model_state.read().clone();

    let class = match &state {
        ModelState::Loaded(_) => "status status-ready",
        ModelState::Error(_) => "status status-error",
        _ if state.is_busy() => "status status-busy",
        _ => "status",
    };
    let text = status_text(&state);

    rsx! {
        div { class: "{class}", "{text}" }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_text() {
        assert_eq!(
            status_text(&ModelState::Downloading {
                downloaded: 512 * 1024 * 1024,
                total: 2048 * 1024 * 1024
            }),
            "Downloading model: 25% (512.00 MB of 2.00 GB)"
        );
        assert_eq!(status_text(&ModelState::Loading), "Loading model...");
        assert_eq!(
            status_text(&ModelState::Error("boom".to_string())),
            "Model failed to load: boom"
        );
    }
}
