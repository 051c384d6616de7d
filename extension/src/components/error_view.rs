// Shown on the popup surface when the dashboard cannot be started

use dioxus::prelude::*;
use std::cell::RefCell;

thread_local! {
    static STARTUP_ERROR: RefCell<String> = RefCell::new(String::new());
}

/// Replace the popup contents with the startup error
pub fn show_startup_error(message: String) {
    STARTUP_ERROR.with(|error| *error.borrow_mut() = message);
    dioxus::launch(StartupError);
}

#[component]
fn StartupError() -> Element {
    let message = use_hook(|| STARTUP_ERROR.with(|error| error.borrow().clone()));

    rsx! {
        div { class: "min-h-screen bg-gray-50 p-4",
            div { class: "max-w-md mx-auto mt-10 p-6 bg-white rounded-lg shadow-lg",
                div { class: "flex items-center mb-4",
                    svg {
                        class: "w-6 h-6 text-red-600 mr-2",
                        xmlns: "http://www.w3.org/2000/svg",
                        width: "24",
                        height: "24",
                        view_box: "0 0 24 24",
                        fill: "none",
                        stroke: "currentColor",
                        stroke_width: "2",
                        stroke_linecap: "round",
                        stroke_linejoin: "round",
                        circle { cx: "12", cy: "12", r: "10" }
                        line { x1: "12", x2: "12", y1: "8", y2: "12" }
                        line { x1: "12", x2: "12.01", y1: "16", y2: "16" }
                    }
                    h1 { class: "text-xl font-bold text-gray-900", "Tondi Dashboard failed to start" }
                }
                div { class: "bg-red-50 border border-red-200 rounded-lg p-4",
                    p { class: "text-sm text-red-800 font-mono break-words", "{message}" }
                }
                p { class: "mt-4 text-xs text-gray-500",
                    "Reload the extension to try again. Details are in the extension console."
                }
            }
        }
    }
}
