use dioxus::prelude::*;

#[component]
pub fn Disclaimer() -> Element {
    rsx! {
        header {
            class: "disclaimer",

            h1 { "Offline Medical Assistant" }
            p {
                strong { "Disclaimer: " }
                "This AI assistant provides general first-aid guidance only. "
                "It is NOT a substitute for professional medical advice, diagnosis, or treatment. "
                "Always seek the advice of a qualified healthcare provider for any medical condition."
            }
            p {
                class: "emergency",
                "In case of emergency, call your local emergency services immediately."
            }
        }
    }
}
