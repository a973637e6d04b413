//! Root Dioxus application component
//!
//! This module contains the main App component that serves as the root of the UI tree.

use crate::assistant::Assistant;
use crate::inference::ModelLoader;
use crate::storage::settings::load_settings;
use crate::types::model::ModelState;
use crate::types::request::AnswerRequest;
use crate::ui::Layout;
use dioxus::prelude::*;
use std::sync::Arc;

/// Global application state shared across components
#[derive(Clone)]
pub struct AppState {
    pub assistant: Arc<Assistant>,
    pub loader: Arc<ModelLoader>,
    pub model_state: Signal<ModelState>,
    /// One request at a time; the submit control is disabled while set
    pub is_generating: Signal<bool>,
    /// Text shown in the output box
    pub answer: Signal<String>,
}

impl AppState {
    pub fn new() -> Self {
        let settings = load_settings();
        let seed = settings.seed;
        let loader = Arc::new(ModelLoader::new(settings));
        tracing::info!("AppState initialized");

        Self {
            assistant: Arc::new(Assistant::new(loader.clone(), seed)),
            loader,
            model_state: Signal::new(ModelState::NotLoaded),
            is_generating: Signal::new(false),
            answer: Signal::new(String::new()),
        }
    }

    /// Run one request in the background and write the result to the output box.
    ///
    /// Ignored while another request is running.
    pub fn submit(&self, request: AnswerRequest) {
        let mut is_generating = self.is_generating;
        if *is_generating.peek() {
            return;
        }
        is_generating.set(true);

        let assistant = self.assistant.clone();
        let mut answer = self.answer;
        spawn(async move {
            match assistant.answer(&request).await {
                Ok(text) => answer.set(text),
                Err(e) => {
                    tracing::error!("Failed to answer question: {}", e);
                    answer.set(format!("Error: {e}"));
                }
            }
            is_generating.set(false);
        });
    }
}

#[component]
pub fn App() -> Element {
    let app_state = use_context_provider(AppState::new);

    // Mirror loader progress into the UI
    use_future(move || {
        let mut rx = app_state.loader.subscribe();
        let mut model_state = app_state.model_state;
        async move {
            while rx.changed().await.is_ok() {
                let state = rx.borrow_and_update().clone();
                model_state.set(state);
            }
        }
    });

    rsx! {
        Layout {}
    }
}
