use dioxus::prelude::*;

/// Integer range slider with its current value shown beside the label
#[component]
pub fn LabeledSlider(
    label: String,
    value: u32,
    min: u32,
    max: u32,
    step: u32,
    disabled: bool,
    on_change: EventHandler<u32>,
) -> Element {
    rsx! {
        div {
            class: "slider",

            div { class: "slider-header",
                label { class: "field-label", "{label}" }
                span { class: "slider-value", "{value}" }
            }
            input {
                r#type: "range",
                min: "{min}",
                max: "{max}",
                step: "{step}",
                value: "{value}",
                disabled: disabled,
                oninput: move |e| {
                    if let Ok(value) = e.value().parse::<u32>() {
                        on_change.call(value.clamp(min, max));
                    }
                },
            }
        }
    }
}
