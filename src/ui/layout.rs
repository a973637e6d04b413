use crate::ui::answer::AnswerPanel;
use crate::ui::ask::AskForm;
use crate::ui::components::disclaimer::Disclaimer;
use crate::ui::components::status::ModelStatus;
use dioxus::prelude::*;

const MAIN_CSS: &str = include_str!("../../assets/main.css");

#[component]
pub fn Layout() -> Element {
    rsx! {
        style { {MAIN_CSS} }
        main {
            class: "layout",
            Disclaimer {}
            AskForm {}
            AnswerPanel {}
            ModelStatus {}
        }
    }
}
