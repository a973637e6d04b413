//! Question form
//!
//! Collects the question and both slider values and hands them to the
//! assistant. No validation happens here; a blank question goes through
//! and gets the assistant's retry message.

pub mod examples;
pub mod input;

use crate::app::AppState;
use crate::types::request::{
    AnswerRequest, DEFAULT_MAX_TOKENS, DEFAULT_SENTENCE_COUNT, MAX_TOKENS_RANGE, MAX_TOKENS_STEP,
    SENTENCE_COUNT_RANGE,
};
use crate::ui::components::slider::LabeledSlider;
use dioxus::prelude::*;
use examples::ExampleQuestions;
use input::QuestionInput;

#[component]
pub fn AskForm() -> Element {
    let app_state = use_context::<AppState>();
    let mut question = use_signal(String::new);
    let mut sentence_count = use_signal(|| DEFAULT_SENTENCE_COUNT);
    let mut max_tokens = use_signal(|| DEFAULT_MAX_TOKENS);

    let is_generating = (app_state.is_generating)();

    let submit_state = app_state.clone();
    let submit = move |_: ()| {
        submit_state.submit(AnswerRequest::new(
            question(),
            sentence_count(),
            max_tokens(),
        ));
    };

    let submit_on_enter = submit.clone();

    let button_label = if is_generating { "Generating..." } else { "Get Medical Advice" };

    rsx! {
        section {
            class: "ask-form",

            div {
                class: "ask-row",

                div {
                    class: "ask-question",
                    QuestionInput {
                        text: question,
                        on_submit: submit_on_enter,
                        is_generating: is_generating,
                    }
                }

                div {
                    class: "ask-sliders",
                    LabeledSlider {
                        label: "Response Length (sentences)",
                        value: sentence_count(),
                        min: *SENTENCE_COUNT_RANGE.start(),
                        max: *SENTENCE_COUNT_RANGE.end(),
                        step: 1,
                        disabled: is_generating,
                        on_change: move |value: u32| sentence_count.set(value),
                    }
                    LabeledSlider {
                        label: "Max Tokens",
                        value: max_tokens(),
                        min: *MAX_TOKENS_RANGE.start(),
                        max: *MAX_TOKENS_RANGE.end(),
                        step: MAX_TOKENS_STEP,
                        disabled: is_generating,
                        on_change: move |value: u32| max_tokens.set(value),
                    }
                }
            }

            button {
                class: "submit",
                disabled: is_generating,
                onclick: move |_| submit(()),
                "{button_label}"
            }

            ExampleQuestions {
                on_pick: move |example: String| question.set(example),
            }
        }
    }
}
