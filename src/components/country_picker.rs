use crate::models::COUNTRIES;
use leptos::prelude::*;
use wasm_bindgen::JsCast;

/// Names still available given what the trip already holds, in catalogue order.
pub fn available_countries(selected: &[String]) -> Vec<&'static str> {
    COUNTRIES
        .iter()
        .copied()
        .filter(|c| !selected.iter().any(|s| s == c))
        .collect()
}

#[component]
pub fn CountryPicker(
    /// Names already on the trip.
    #[prop(into)]
    selected: Signal<Vec<String>>,
    on_select: Callback<String>,
) -> impl IntoView {
    let on_change = move |ev: web_sys::Event| {
        let Some(select) = ev
            .target()
            .and_then(|t| t.dyn_into::<web_sys::HtmlSelectElement>().ok())
        else {
            return;
        };
        let name = select.value();
        select.set_value("");
        if !name.is_empty() {
            on_select.run(name);
        }
    };

    view! {
        <select
            class="border-input h-9 w-full rounded-md border bg-transparent px-3 text-sm shadow-xs outline-none focus-visible:ring-2 focus-visible:ring-ring/50"
            on:change=on_change
        >
            <option value="" selected=true>"Add a country..."</option>
            {move || {
                available_countries(&selected.get())
                    .into_iter()
                    .map(|name| view! { <option value=name>{name}</option> })
                    .collect_view()
            }}
        </select>
    }
}
