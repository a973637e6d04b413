//! Output box with the bulleted answer

use crate::app::AppState;
use dioxus::prelude::*;

/// Script that puts `text` on the clipboard inside the webview
fn clipboard_script(text: &str) -> Option<String> {
    let literal = serde_json::to_string(text).ok()?;
    Some(format!("navigator.clipboard.writeText({literal});"))
}

#[component]
pub fn AnswerPanel() -> Element {
    let app_state = use_context::<AppState>();
    let answer = app_state.answer.read().clone();
    let is_generating = (app_state.is_generating)();

    let shown = if is_generating && answer.is_empty() {
        "Generating guidance...".to_string()
    } else {
        answer.clone()
    };
    let can_copy = !is_generating && !answer.is_empty();

    rsx! {
        section {
            class: "answer",

            div { class: "answer-header",
                label { class: "field-label", "Medical Guidance" }
                button {
                    class: "copy",
                    disabled: !can_copy,
                    title: "Copy",
                    onclick: move |_| {
                        if let Some(script) = clipboard_script(&answer) {
                            let _ = document::eval(&script);
                        }
                    },
                    "Copy"
                }
            }
            textarea {
                class: if is_generating { "answer-output busy" } else { "answer-output" },
                readonly: true,
                rows: "8",
                value: "{shown}",
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clipboard_script_escapes_text() {
        let script = clipboard_script("- Call \"911\".\n- Stay calm.").unwrap();
        assert_eq!(
            script,
            r#"navigator.clipboard.writeText("- Call \"911\".\n- Stay calm.");"#
        );
    }
}
