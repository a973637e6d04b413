use dioxus::prelude::*;

/// Sample questions offered under the form
pub const EXAMPLE_QUESTIONS: [&str; 5] = [
    "I cut my finger while cooking and it's bleeding a lot",
    "I have a severe headache that won't go away",
    "Someone is choking on food, what should I do?",
    "I burned my hand on a hot pan",
    "I think I sprained my ankle while running",
];

/// Clicking an example copies it into the question box
#[component]
pub fn ExampleQuestions(on_pick: EventHandler<String>) -> Element {
    rsx! {
        div {
            class: "examples",

            span { class: "field-label", "Examples" }
            div {
                class: "example-list",
                for example in EXAMPLE_QUESTIONS {
                    button {
                        key: "{example}",
                        class: "example",
                        onclick: move |_| on_pick.call(example.to_string()),
                        "{example}"
                    }
                }
            }
        }
    }
}
