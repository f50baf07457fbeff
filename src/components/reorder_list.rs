use crate::components::ui::{Button, ButtonSize, ButtonVariant};
use crate::models::fresh_id;
use crate::reorder::{drag_payload, item_key, parse_drag_payload, DragState, ListItem};
use leptos::prelude::*;

fn row_class(state: &DragState, index: usize) -> &'static str {
    if state.dragged() == Some(index) {
        "flex items-center gap-2 rounded-md border bg-card px-3 py-2 opacity-50"
    } else if state.is_dragging() && state.over() == Some(index) {
        "flex items-center gap-2 rounded-md border border-primary bg-primary/5 px-3 py-2"
    } else {
        "flex items-center gap-2 rounded-md border bg-card px-3 py-2"
    }
}

/// Vertical list whose rows can be dragged into a new order.
///
/// A drop hands the reordered sequence to `on_reorder`; the list itself never
/// mutates `items`. Without `on_reorder` rows are not draggable.
///
/// Lists nest (cities inside countries), so every drag carries this list's
/// token and the handlers stop propagation once they own the event.
#[component]
pub fn ReorderList<T, F, V>(
    items: Signal<Vec<T>>,
    render: F,
    #[prop(optional)] on_reorder: Option<Callback<Vec<T>>>,
    #[prop(optional)] on_delete: Option<Callback<usize>>,
    #[prop(optional)] on_add: Option<Callback<()>>,
    #[prop(into, optional)] add_label: String,
    #[prop(into, optional)] empty_label: String,
) -> impl IntoView
where
    T: ListItem + Clone + Send + Sync + 'static,
    F: Fn(T, usize) -> V + Send + Sync + 'static,
    V: IntoView + 'static,
{
    let drag = RwSignal::new(DragState::default());
    let list_id = StoredValue::new(fresh_id());
    let draggable = on_reorder.is_some();

    let rows = move || {
        let list = items.get();
        if list.is_empty() && !empty_label.is_empty() {
            return view! { <p class="text-sm text-muted-foreground">{empty_label.clone()}</p> }
                .into_any();
        }

        list.into_iter()
            .enumerate()
            .map(|(index, item)| {
                let key = item_key(&item, index);
                view! {
                    <li
                        data-key=key
                        class=move || drag.with(|s| row_class(s, index))
                        draggable=if draggable { "true" } else { "false" }
                        on:dragstart=move |ev: web_sys::DragEvent| {
                            if !draggable {
                                return;
                            }
                            ev.stop_propagation();
                            if let Some(dt) = ev.data_transfer() {
                                let payload = list_id.with_value(|id| drag_payload(id, index));
                                let _ = dt.set_data("text/plain", &payload);
                                dt.set_effect_allowed("move");
                            }
                            drag.update(|s| s.begin_drag(index));
                        }
                        on:dragover=move |ev: web_sys::DragEvent| {
                            // Not ours: let an enclosing list decide.
                            if !drag.with_untracked(DragState::is_dragging) {
                                return;
                            }
                            ev.prevent_default();
                            ev.stop_propagation();
                            if let Some(dt) = ev.data_transfer() {
                                dt.set_drop_effect("move");
                            }
                            if drag.with_untracked(|s| s.over()) != Some(index) {
                                drag.update(|s| s.drag_over(index));
                            }
                        }
                        on:drop=move |ev: web_sys::DragEvent| {
                            let from = ev
                                .data_transfer()
                                .and_then(|dt| dt.get_data("text/plain").ok())
                                .and_then(|p| list_id.with_value(|id| parse_drag_payload(&p, id)));
                            let Some(from) = from else {
                                return;
                            };
                            ev.prevent_default();
                            ev.stop_propagation();
                            if drag.with_untracked(|s| s.dragged()) != Some(from) {
                                drag.update(DragState::end_drag);
                                return;
                            }

                            let current = items.get_untracked();
                            let mut moved = None;
                            drag.update(|s| moved = s.drop_on(&current, index));
                            if let (Some(next), Some(cb)) = (moved, on_reorder) {
                                cb.run(next);
                            }
                        }
                        on:dragend=move |ev: web_sys::DragEvent| {
                            if drag.with_untracked(DragState::is_dragging) {
                                ev.stop_propagation();
                                drag.update(DragState::end_drag);
                            }
                        }
                    >
                        {draggable.then(|| view! {
                            <span class="cursor-grab select-none text-muted-foreground" aria-hidden="true">
                                "⋮⋮"
                            </span>
                        })}
                        <div class="min-w-0 flex-1">{render(item, index)}</div>
                        {on_delete.map(|cb| view! {
                            <Button
                                variant=ButtonVariant::Ghost
                                size=ButtonSize::Icon
                                attr:title="Delete"
                                on:click=move |_| cb.run(index)
                            >
                                "×"
                            </Button>
                        })}
                    </li>
                }
            })
            .collect_view()
            .into_any()
    };

    view! {
        <div class="flex flex-col gap-2">
            <ul class="flex flex-col gap-2">{rows}</ul>
            {on_add.map(|cb| view! {
                <Button
                    variant=ButtonVariant::Dashed
                    size=ButtonSize::Sm
                    on:click=move |_| cb.run(())
                >
                    {format!("+ {add_label}")}
                </Button>
            })}
        </div>
    }
}
