use crate::backend::Prompt;
use crate::components::ui::{
    Button, ButtonSize, ButtonVariant, Card, CardContent, CardFooter, CardHeader, CardTitle, Input,
};
use futures::channel::oneshot;
use leptos::prelude::*;

/// In-page replacement for `window.prompt`. One question at a time; opening a
/// new one cancels the previous.
#[derive(Clone, Copy)]
pub struct PromptHandle {
    message: RwSignal<Option<String>>,
    value: RwSignal<String>,
    reply: StoredValue<Option<oneshot::Sender<Option<String>>>>,
}

impl PromptHandle {
    pub fn new() -> Self {
        Self {
            message: RwSignal::new(None),
            value: RwSignal::new(String::new()),
            reply: StoredValue::new(None),
        }
    }

    pub fn is_open(&self) -> bool {
        self.message.with(Option::is_some)
    }

    /// Resolve the open question. `None` cancels, and so does blank input.
    pub fn answer(&self, value: Option<String>) {
        let mut sender = None;
        self.reply.update_value(|r| sender = r.take());
        if let Some(tx) = sender {
            let _ = tx.send(value);
        }
        self.message.set(None);
        self.value.set(String::new());
    }
}

impl Default for PromptHandle {
    fn default() -> Self {
        Self::new()
    }
}

impl Prompt for PromptHandle {
    async fn ask(&self, message: &str) -> Option<String> {
        let (tx, rx) = oneshot::channel();
        // Dropping a previous sender resolves that question as cancelled.
        self.reply.set_value(Some(tx));
        self.value.set(String::new());
        self.message.set(Some(message.to_string()));

        rx.await.ok().flatten().filter(|v| !v.trim().is_empty())
    }
}

#[component]
pub fn PromptDialog(handle: PromptHandle) -> impl IntoView {
    let on_submit = move |ev: web_sys::SubmitEvent| {
        ev.prevent_default();
        handle.answer(Some(handle.value.get_untracked()));
    };

    view! {
        <Show when=move || handle.is_open()>
            <div
                class="fixed inset-0 z-50 flex items-center justify-center bg-black/30"
                on:click=move |_| handle.answer(None)
            >
                <div class="w-full max-w-sm px-4" on:click=|ev| ev.stop_propagation()>
                    <form on:submit=on_submit>
                        <Card>
                            <CardHeader>
                                <CardTitle>{move || handle.message.get().unwrap_or_default()}</CardTitle>
                            </CardHeader>
                            <CardContent>
                                <Input bind_value=handle.value autofocus=true />
                            </CardContent>
                            <CardFooter>
                                <Button
                                    variant=ButtonVariant::Outline
                                    size=ButtonSize::Sm
                                    on:click=move |ev: web_sys::MouseEvent| {
                                        ev.prevent_default();
                                        handle.answer(None);
                                    }
                                >
                                    "Cancel"
                                </Button>
                                <Button size=ButtonSize::Sm>
                                    "OK"
                                </Button>
                            </CardFooter>
                        </Card>
                    </form>
                </div>
            </div>
        </Show>
    }
}
