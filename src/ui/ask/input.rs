//! Question textbox - Enter submits, Shift+Enter adds a line

use dioxus::prelude::*;

#[component]
pub fn QuestionInput(
    text: Signal<String>,
    on_submit: EventHandler<()>,
    is_generating: bool,
) -> Element {
    let mut text = text;

    let handle_keydown = move |evt: KeyboardEvent| {
        if evt.key() == Key::Enter && !evt.modifiers().contains(Modifiers::SHIFT) {
            evt.prevent_default();
            if !is_generating {
                on_submit.call(());
            }
        }
    };

    rsx! {
        div {
            class: "field",

            label { class: "field-label", "Your Medical Question" }
            textarea {
                class: "question-input",
                placeholder: "Describe your symptoms or medical concern...",
                rows: "3",
                value: "{text}",
                oninput: move |evt| text.set(evt.value()),
                onkeydown: handle_keydown,
            }
        }
    }
}
