use crate::components::ui::Spinner;
use crate::session::UploadFile;
use leptos::prelude::*;
use leptos::task::spawn_local;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;

pub const ACCEPTED_FILES: &str = ".pdf,.jpg,.jpeg,.png,.gif,.doc,.docx";

async fn read_file(file: web_sys::File) -> Option<UploadFile> {
    let buf = match JsFuture::from(file.array_buffer()).await {
        Ok(buf) => buf,
        Err(e) => {
            tracing::warn!(name = %file.name(), error = ?e, "could not read file");
            return None;
        }
    };
    let media_type = match file.type_() {
        t if t.is_empty() => "application/octet-stream".to_string(),
        t => t,
    };

    Some(UploadFile {
        name: file.name(),
        media_type,
        bytes: js_sys::Uint8Array::new(&buf).to_vec(),
    })
}

fn first_file(files: Option<web_sys::FileList>) -> Option<web_sys::File> {
    files.and_then(|list| list.get(0))
}

/// Drop zone with a file-picker fallback. One file per drop.
#[component]
pub fn FileDrop(
    on_file: Callback<UploadFile>,
    #[prop(into)] uploading: Signal<bool>,
    #[prop(default = ACCEPTED_FILES)] accept: &'static str,
) -> impl IntoView {
    let hovering = RwSignal::new(false);

    let pick = move |file: Option<web_sys::File>| {
        let Some(file) = file else {
            return;
        };
        if uploading.get_untracked() {
            return;
        }
        spawn_local(async move {
            if let Some(upload) = read_file(file).await {
                on_file.run(upload);
            }
        });
    };

    let on_drop = move |ev: web_sys::DragEvent| {
        ev.prevent_default();
        hovering.set(false);
        pick(first_file(ev.data_transfer().and_then(|dt| dt.files())));
    };

    let on_change = move |ev: web_sys::Event| {
        let Some(input) = ev
            .target()
            .and_then(|t| t.dyn_into::<web_sys::HtmlInputElement>().ok())
        else {
            return;
        };
        pick(first_file(input.files()));
        // Allow picking the same file again.
        input.set_value("");
    };

    view! {
        <label
            class=move || {
                if hovering.get() {
                    "flex cursor-pointer flex-col items-center gap-1 rounded-md border-2 border-dashed border-primary bg-primary/5 px-3 py-4 text-sm"
                } else {
                    "flex cursor-pointer flex-col items-center gap-1 rounded-md border-2 border-dashed border-border px-3 py-4 text-sm text-muted-foreground"
                }
            }
            on:dragover=move |ev: web_sys::DragEvent| {
                ev.prevent_default();
                hovering.set(true);
            }
            on:dragleave=move |_| hovering.set(false)
            on:drop=on_drop
        >
            <Show
                when=move || uploading.get()
                fallback=|| view! { <span>"Drop a file here or click to upload"</span> }
            >
                <span class="flex items-center gap-2">
                    <Spinner />
                    "Uploading..."
                </span>
            </Show>
            <input
                type="file"
                class="hidden"
                accept=accept
                disabled=move || uploading.get()
                on:change=on_change
            />
        </label>
    }
}
