use crate::api::ApiClient;
use crate::backend::TripRepository;
use crate::components::ui::{
    Alert, AlertDescription, Button, ButtonSize, ButtonVariant, Card, CardContent, CardDescription,
    CardFooter, CardGrid, CardHeader, CardTitle, Input, Label, Spinner, TextArea,
};
use crate::components::{CountryPicker, FileDrop, PromptDialog, PromptHandle, ReorderList};
use crate::error::TripError;
use crate::itinerary::Itinerary;
use crate::models::{City, Country, Document, Place, TripDraft, TripSummary};
use crate::session::{InFlight, SaveOutcome, TripSession, UploadFile};
use crate::state::{AppContext, NoticeTone};
use crate::storage::save_user_to_storage;
use leptos::ev;
use leptos::prelude::*;
use leptos::task::spawn_local;
use leptos_dom::helpers::window_event_listener;
use leptos_router::components::Redirect;
use leptos_router::hooks::{use_navigate, use_params};
use leptos_router::params::Params;

type BrowserSession = TripSession<RwSignal<Itinerary>, ApiClient, ApiClient>;

fn country_count_label(n: usize) -> String {
    match n {
        1 => "1 country".to_string(),
        n => format!("{n} countries"),
    }
}

fn size_label(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = 1024 * 1024;
    if bytes >= MB {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{} KB", bytes / KB)
    } else {
        format!("{bytes} B")
    }
}

#[component]
pub fn LoginPage() -> impl IntoView {
    let email: RwSignal<String> = RwSignal::new(String::new());
    let password: RwSignal<String> = RwSignal::new(String::new());
    let error: RwSignal<Option<String>> = RwSignal::new(None);
    let loading: RwSignal<bool> = RwSignal::new(false);

    let app_state = expect_context::<AppContext>();

    let on_submit = move |ev: web_sys::SubmitEvent| {
        ev.prevent_default();

        let email_val = email.get();
        let password_val = password.get();
        let mut api_client = app_state.0.api_client.get_untracked();

        loading.set(true);
        error.set(None);

        spawn_local(async move {
            match api_client.login(email_val.trim(), &password_val).await {
                Ok(response) => {
                    tracing::info!(user_id = %response.user.id, "signed in");
                    api_client.set_token(response.token);
                    api_client.save_to_storage();
                    save_user_to_storage(&response.user);
                    app_state.0.api_client.set(api_client);
                    app_state.0.current_user.set(Some(response.user));
                    let _ = window().location().set_href("/trips");
                }
                Err(e) => {
                    tracing::warn!(error = %e, "sign in failed");
                    error.set(Some(e.to_string()));
                }
            }
            loading.set(false);
        });
    };

    view! {
        <div class="min-h-screen bg-background">
            <div class="mx-auto flex min-h-screen w-full max-w-sm flex-col justify-center px-4 py-10">
                <div class="mb-6 flex items-center justify-center">
                    <a href="/" class="text-sm font-medium text-foreground">"Trip Planner"</a>
                </div>

                <Card>
                    <CardHeader>
                        <CardTitle class="text-lg">"Sign in"</CardTitle>
                        <CardDescription class="text-xs">"Plan and organize your trips."</CardDescription>
                    </CardHeader>

                    <CardContent>
                        <form class="flex flex-col gap-3" on:submit=on_submit>
                            <div class="flex flex-col gap-1.5">
                                <Label html_for="email" class="text-xs">"Email"</Label>
                                <Input
                                    id="email"
                                    r#type="email"
                                    placeholder="you@example.com"
                                    bind_value=email
                                    required=true
                                    class="h-8 text-sm"
                                />
                            </div>

                            <div class="flex flex-col gap-1.5">
                                <Label html_for="password" class="text-xs">"Password"</Label>
                                <Input
                                    id="password"
                                    r#type="password"
                                    bind_value=password
                                    required=true
                                    class="h-8 text-sm"
                                />
                            </div>

                            {move || {
                                error.get().map(|e| {
                                    view! {
                                        <Alert class="border-destructive/30">
                                            <AlertDescription class="text-destructive text-xs">
                                                {e}
                                            </AlertDescription>
                                        </Alert>
                                    }
                                })
                            }}

                            <Button
                                class="w-full"
                                size=ButtonSize::Sm
                                attr:disabled=move || loading.get()
                            >
                                <span class="inline-flex items-center gap-2">
                                    <Show when=move || loading.get() fallback=|| ().into_view()>
                                        <Spinner />
                                    </Show>
                                    {move || if loading.get() { "Signing in..." } else { "Continue" }}
                                </span>
                            </Button>
                        </form>
                    </CardContent>
                </Card>
            </div>
        </div>
    }
}

#[component]
pub fn AppLayout(children: ChildrenFn) -> impl IntoView {
    let app_state = expect_context::<AppContext>();
    let current_user = app_state.0.current_user;
    let notice = app_state.0.notice;

    view! {
        <div class="min-h-screen bg-background">
            <header class="border-b">
                <div class="mx-auto flex h-12 max-w-5xl items-center justify-between px-4">
                    <a href="/trips" class="text-sm font-semibold">"My Trips"</a>
                    <div class="flex items-center gap-3 text-xs text-muted-foreground">
                        <span>{move || current_user.get().map(|u| u.email).unwrap_or_default()}</span>
                        <Button
                            variant=ButtonVariant::Outline
                            size=ButtonSize::Sm
                            on:click=move |_| app_state.sign_out()
                        >
                            "Sign out"
                        </Button>
                    </div>
                </div>
            </header>

            {move || {
                notice.get().map(|n| {
                    let tone_class = match n.tone {
                        NoticeTone::Info => "border-primary/30",
                        NoticeTone::Error => "border-destructive/30 text-destructive",
                    };
                    view! {
                        <div class="mx-auto max-w-5xl px-4 pt-4">
                            <Alert class=tone_class attr:data-tone=n.tone.as_ref().to_string()>
                                <div class="flex items-center justify-between gap-2">
                                    <AlertDescription>{n.message}</AlertDescription>
                                    <Button
                                        variant=ButtonVariant::Ghost
                                        size=ButtonSize::Icon
                                        attr:title="Dismiss"
                                        on:click=move |_| app_state.clear_notice()
                                    >
                                        "×"
                                    </Button>
                                </div>
                            </Alert>
                        </div>
                    }
                })
            }}

            <main class="mx-auto max-w-5xl px-4 py-6">{children()}</main>
        </div>
    }
}

#[component]
pub fn RootAuthed(children: ChildrenFn) -> impl IntoView {
    let app_state = expect_context::<AppContext>();
    let is_authenticated = move || {
        app_state.0.api_client.get().is_authenticated() && app_state.0.current_user.get().is_some()
    };

    // Store children so the view macro sees an `Fn` (not an `FnOnce`).
    let children = StoredValue::new(children);

    view! {
        <Show when=is_authenticated fallback=move || view! { <LoginPage /> }>
            <AppLayout>
                {move || children.with_value(|c| c())}
            </AppLayout>
        </Show>
    }
}

#[component]
pub fn RootPage() -> impl IntoView {
    view! {
        <RootAuthed>
            <Redirect path="/trips" />
        </RootAuthed>
    }
}

#[component]
pub fn TripsPage() -> impl IntoView {
    let app_state = expect_context::<AppContext>();
    let trips = app_state.0.trips;
    let loading: RwSignal<bool> = RwSignal::new(true);

    if let Some(owner_id) = app_state.owner_id() {
        let api_client = app_state.0.api_client.get_untracked();
        spawn_local(async move {
            match api_client.list_by_owner(&owner_id).await {
                Ok(list) => {
                    tracing::debug!(count = list.len(), "trips loaded");
                    trips.set(list);
                }
                Err(e) => app_state.report(&e),
            }
            loading.set(false);
        });
    }

    let on_delete = move |trip: TripSummary| {
        let question = format!("Delete \"{}\"? This cannot be undone.", trip.name);
        if !window().confirm_with_message(&question).unwrap_or(false) {
            return;
        }
        let api_client = app_state.0.api_client.get_untracked();
        spawn_local(async move {
            match api_client.delete(&trip.id).await {
                Ok(()) => {
                    trips.update(|xs| xs.retain(|t| t.id != trip.id));
                    app_state.notify(format!("Deleted {}", trip.name));
                }
                Err(e) => app_state.report(&e),
            }
        });
    };

    let trip_cards = move || {
        trips
            .get()
            .into_iter()
            .map(|trip| {
                let href = format!("/trip/{}", trip.id);
                let updated = trip.updated_at.format("%b %-d, %Y").to_string();
                let for_delete = trip.clone();
                view! {
                    <Card>
                        <CardHeader>
                            <CardTitle>{trip.name}</CardTitle>
                            <CardDescription>{trip.description}</CardDescription>
                        </CardHeader>
                        <CardContent>
                            <div class="flex items-center justify-between text-xs text-muted-foreground">
                                <span>{country_count_label(trip.country_count)}</span>
                                <span>{format!("Updated {updated}")}</span>
                            </div>
                        </CardContent>
                        <CardFooter>
                            <a href=href class="text-sm text-primary underline-offset-4 hover:underline">"View"</a>
                            <Button
                                variant=ButtonVariant::Destructive
                                size=ButtonSize::Sm
                                on:click=move |_| on_delete(for_delete.clone())
                            >
                                "Delete"
                            </Button>
                        </CardFooter>
                    </Card>
                }
            })
            .collect_view()
    };

    view! {
        <div class="flex flex-col gap-6">
            <div class="flex items-center justify-between">
                <h1 class="text-xl font-semibold">"My Trips"</h1>
                <a
                    href="/trip/new"
                    class="inline-flex h-8 items-center rounded-md bg-primary px-3 text-sm font-medium text-primary-foreground hover:bg-primary/90"
                >
                    "New Trip"
                </a>
            </div>

            <Show
                when=move || !loading.get()
                fallback=|| view! { <div class="flex justify-center py-10"><Spinner /></div> }
            >
                <Show
                    when=move || !trips.with(Vec::is_empty)
                    fallback=|| view! {
                        <p class="py-10 text-center text-sm text-muted-foreground">
                            "No trips yet. Create your first one."
                        </p>
                    }
                >
                    <CardGrid>{trip_cards}</CardGrid>
                </Show>
            </Show>
        </div>
    }
}

#[component]
pub fn NewTripPage() -> impl IntoView {
    let app_state = expect_context::<AppContext>();
    let navigate = StoredValue::new(use_navigate());

    let name: RwSignal<String> = RwSignal::new(String::new());
    let description: RwSignal<String> = RwSignal::new(String::new());
    let error: RwSignal<Option<String>> = RwSignal::new(None);
    let loading: RwSignal<bool> = RwSignal::new(false);

    let on_submit = move |ev: web_sys::SubmitEvent| {
        ev.prevent_default();

        let draft = TripDraft::new(&name.get_untracked(), &description.get_untracked());
        if draft.name.is_empty() {
            error.set(Some("Trip name is required".to_string()));
            return;
        }
        let Some(owner_id) = app_state.owner_id() else {
            app_state.report(&TripError::Unauthorized);
            return;
        };
        let api_client = app_state.0.api_client.get_untracked();

        loading.set(true);
        error.set(None);

        spawn_local(async move {
            match api_client.create(&owner_id, &draft).await {
                Ok(id) => {
                    let path = format!("/trip/{id}");
                    navigate.with_value(|nav| nav(&path, Default::default()));
                }
                Err(e) => {
                    error.set(Some(e.to_string()));
                    if e.is_unauthorized() {
                        app_state.report(&e);
                    }
                }
            }
            loading.set(false);
        });
    };

    view! {
        <div class="mx-auto w-full max-w-lg">
            <Card>
                <CardHeader>
                    <CardTitle class="text-lg">"New Trip"</CardTitle>
                    <CardDescription class="text-xs">"Name it now, add countries next."</CardDescription>
                </CardHeader>
                <CardContent>
                    <form class="flex flex-col gap-3" on:submit=on_submit>
                        <div class="flex flex-col gap-1.5">
                            <Label html_for="trip-name" class="text-xs">"Name"</Label>
                            <Input id="trip-name" placeholder="Summer in Europe" bind_value=name autofocus=true />
                        </div>
                        <div class="flex flex-col gap-1.5">
                            <Label html_for="trip-description" class="text-xs">"Description"</Label>
                            <TextArea id="trip-description" bind_value=description />
                        </div>

                        {move || {
                            error.get().map(|e| {
                                view! {
                                    <Alert class="border-destructive/30">
                                        <AlertDescription class="text-destructive text-xs">{e}</AlertDescription>
                                    </Alert>
                                }
                            })
                        }}

                        <div class="flex items-center justify-between">
                            <a href="/trips" class="text-sm text-muted-foreground hover:underline">"Cancel"</a>
                            <Button size=ButtonSize::Sm attr:disabled=move || loading.get()>
                                {move || if loading.get() { "Creating..." } else { "Create Trip" }}
                            </Button>
                        </div>
                    </form>
                </CardContent>
            </Card>
        </div>
    }
}

#[derive(Params, PartialEq, Clone, Debug)]
pub struct TripRouteParams {
    pub id: Option<String>,
}

/// Reactive handles shared by the nested editor views of one trip.
#[derive(Clone, Copy)]
struct TripEditor {
    app: AppContext,
    session: StoredValue<Option<BrowserSession>>,
    itinerary: RwSignal<Itinerary>,
    last_saved: RwSignal<Itinerary>,
    saving: RwSignal<bool>,
    /// Cities with an upload running.
    uploading: RwSignal<InFlight>,
    prompt: PromptHandle,
}

impl TripEditor {
    fn session(&self) -> Option<BrowserSession> {
        self.session.get_value()
    }

    fn act(&self, op: impl FnOnce(&BrowserSession) -> bool) {
        if let Some(s) = self.session() {
            op(&s);
        }
    }

    fn is_dirty(&self) -> bool {
        !self
            .itinerary
            .with(|now| self.last_saved.with(|saved| saved.same_snapshot(now)))
    }

    fn save(&self) {
        let Some(s) = self.session() else {
            return;
        };
        let this = *self;
        this.saving.set(true);
        spawn_local(async move {
            match s.save().await {
                Ok(SaveOutcome::Saved(snapshot)) => {
                    this.last_saved.set(snapshot);
                    this.app.notify("Trip saved");
                }
                Ok(SaveOutcome::Coalesced) => {}
                Err(e) => this.app.report(&e),
            }
            this.saving.set(s.is_saving());
        });
    }

    fn ask_city(&self, country: usize) {
        let Some(s) = self.session() else {
            return;
        };
        let prompt = self.prompt;
        spawn_local(async move {
            s.prompt_city(&prompt, country).await;
        });
    }

    fn ask_place(&self, country: usize, city: usize) {
        let Some(s) = self.session() else {
            return;
        };
        let prompt = self.prompt;
        spawn_local(async move {
            s.prompt_place(&prompt, country, city).await;
        });
    }

    /// Addressed by city id: the file is read asynchronously and the tree may
    /// have been reordered by the time it arrives.
    fn upload(&self, city_id: String, file: UploadFile) {
        let Some(s) = self.session() else {
            return;
        };
        let max_bytes = self.app.0.config.with_value(|c| c.max_upload_bytes());
        if let Err(e) = file.check_size(max_bytes) {
            self.app.report(&e);
            return;
        }

        let mut started = false;
        self.uploading.update(|u| started = u.begin(&city_id));
        if !started {
            return;
        }

        let this = *self;
        spawn_local(async move {
            match s.upload_document_to(&city_id, file).await {
                Ok(Some(doc)) => this.app.notify(format!("Uploaded {}", doc.name)),
                Ok(None) => {}
                Err(e) => this.app.report(&e),
            }
            this.uploading.update(|u| u.finish(&city_id));
        });
    }

    fn detach(&self, country: usize, city: usize, document: usize) {
        let Some(s) = self.session() else {
            return;
        };
        let app = self.app;
        spawn_local(async move {
            match s.detach_document(country, city, document).await {
                Ok(true) => app.notify("Document deleted"),
                Ok(false) => {}
                Err(e) => app.report(&e),
            }
        });
    }
}

#[component]
pub fn TripPage() -> impl IntoView {
    let app_state = expect_context::<AppContext>();
    let params = use_params::<TripRouteParams>();
    let navigate = StoredValue::new(use_navigate());

    let initial = Itinerary::default();
    let editor = TripEditor {
        app: app_state,
        session: StoredValue::new(None),
        itinerary: RwSignal::new(initial.clone()),
        last_saved: RwSignal::new(initial),
        saving: RwSignal::new(false),
        uploading: RwSignal::new(InFlight::default()),
        prompt: PromptHandle::new(),
    };
    let itinerary = editor.itinerary;
    let saving = editor.saving;

    let trip_name: RwSignal<String> = RwSignal::new(String::new());
    let trip_description: RwSignal<String> = RwSignal::new(String::new());
    let loading: RwSignal<bool> = RwSignal::new(true);

    let trip_id = move || {
        params
            .get()
            .ok()
            .and_then(|p| p.id)
            .unwrap_or_default()
    };

    Effect::new(move |_| {
        let id = trip_id();
        if id.is_empty() {
            return;
        }
        let Some(owner_id) = app_state.owner_id() else {
            return;
        };
        let api_client = app_state.0.api_client.get_untracked();

        loading.set(true);
        spawn_local(async move {
            match api_client.get(&id).await {
                Ok(trip) => {
                    tracing::info!(trip_id = %trip.id, countries = trip.countries.len(), "trip loaded");
                    let snapshot = Itinerary::new(trip.countries);
                    editor.itinerary.set(snapshot.clone());
                    editor.last_saved.set(snapshot);
                    trip_name.set(trip.name.clone());
                    trip_description.set(trip.description.clone());
                    editor.session.set_value(Some(TripSession::new(
                        &owner_id,
                        &trip.id,
                        &trip.name,
                        &trip.description,
                        editor.itinerary,
                        api_client.clone(),
                        api_client,
                    )));
                }
                Err(e) => {
                    app_state.report(&e);
                    if matches!(e, TripError::NotFound(_)) {
                        navigate.with_value(|nav| nav("/trips", Default::default()));
                    }
                }
            }
            loading.set(false);
        });
    });

    let unload = window_event_listener(ev::beforeunload, move |ev: web_sys::BeforeUnloadEvent| {
        if editor.itinerary.with_untracked(|now| {
            editor.last_saved.with_untracked(|saved| !saved.same_snapshot(now))
        }) {
            ev.prevent_default();
            ev.set_return_value("You have unsaved changes.");
        }
    });
    on_cleanup(move || unload.remove());

    let selected_names = Signal::derive(move || {
        itinerary.with(|t| t.countries().iter().map(|c| c.name.clone()).collect::<Vec<_>>())
    });
    let countries = Signal::derive(move || itinerary.with(|t| t.countries().to_vec()));

    view! {
        <Show
            when=move || !loading.get()
            fallback=|| view! { <div class="flex justify-center py-10"><Spinner /></div> }
        >
            <div class="flex flex-col gap-6">
                <div class="flex flex-wrap items-start justify-between gap-4">
                    <div class="flex flex-col gap-1">
                        <a href="/trips" class="text-xs text-muted-foreground hover:underline">"← Back to trips"</a>
                        <h1 class="text-xl font-semibold">{move || trip_name.get()}</h1>
                        <p class="text-sm text-muted-foreground">{move || trip_description.get()}</p>
                    </div>
                    <div class="flex items-center gap-3">
                        <Show when=move || editor.is_dirty() fallback=|| ().into_view()>
                            <span class="text-xs text-muted-foreground">"Unsaved changes"</span>
                        </Show>
                        <Button
                            size=ButtonSize::Sm
                            attr:disabled=move || saving.get()
                            on:click=move |_| editor.save()
                        >
                            <Show when=move || saving.get() fallback=|| ().into_view()>
                                <Spinner />
                            </Show>
                            {move || if saving.get() { "Saving..." } else { "Save changes" }}
                        </Button>
                    </div>
                </div>

                <div class="max-w-xs">
                    <CountryPicker
                        selected=selected_names
                        on_select=Callback::new(move |name: String| {
                            editor.act(|s| s.select_country(&name));
                        })
                    />
                </div>

                <ReorderList
                    items=countries
                    render=move |country: Country, index: usize| {
                        view! { <CountryCard editor=editor country=country index=index /> }
                    }
                    on_reorder=Callback::new(move |next: Vec<Country>| {
                        editor.act(|s| s.reorder_countries(next));
                    })
                    on_delete=Callback::new(move |index: usize| {
                        editor.act(|s| s.delete_country(index));
                    })
                    empty_label="No countries yet. Pick one above to start planning."
                />
            </div>
        </Show>
        <PromptDialog handle=editor.prompt />
    }
}

#[component]
fn CountryCard(editor: TripEditor, country: Country, index: usize) -> impl IntoView {
    let country_index = index;
    let cities = Signal::derive(move || {
        editor.itinerary.with(|t| {
            t.countries()
                .get(country_index)
                .map(|c| c.cities.clone())
                .unwrap_or_default()
        })
    });

    view! {
        <div class="flex flex-col gap-3 py-1">
            <h2 class="font-medium">{country.name}</h2>
            <div class="pl-4">
                <ReorderList
                    items=cities
                    render=move |city: City, index: usize| {
                        view! { <CityCard editor=editor country=country_index city=city index=index /> }
                    }
                    on_reorder=Callback::new(move |next: Vec<City>| {
                        editor.act(|s| s.reorder_cities(country_index, next));
                    })
                    on_delete=Callback::new(move |city: usize| {
                        editor.act(|s| s.delete_city(country_index, city));
                    })
                    on_add=Callback::new(move |_| editor.ask_city(country_index))
                    add_label="Add City"
                />
            </div>
        </div>
    }
}

#[component]
fn CityCard(editor: TripEditor, country: usize, city: City, index: usize) -> impl IntoView {
    let city_index = index;
    let places = Signal::derive(move || {
        editor.itinerary.with(|t| {
            t.city(country, city_index)
                .map(|c| c.places.clone())
                .unwrap_or_default()
        })
    });

    let city_id = city.id.clone();
    let uploading_here = {
        let city_id = city_id.clone();
        Signal::derive(move || editor.uploading.with(|u| u.contains(&city_id)))
    };
    let on_file = Callback::new(move |file: UploadFile| {
        editor.upload(city_id.clone(), file);
    });

    let documents = city
        .documents
        .into_iter()
        .enumerate()
        .map(|(doc_index, doc)| view! { <DocumentRow editor=editor country=country city=city_index index=doc_index doc=doc /> })
        .collect_view();

    view! {
        <div class="flex flex-col gap-3 py-1">
            <h3 class="text-sm font-medium">{city.name}</h3>
            <div class="pl-4">
                <ReorderList
                    items=places
                    render=|place: Place, _index: usize| {
                        view! { <span class="text-sm">{place.name}</span> }
                    }
                    on_reorder=Callback::new(move |next: Vec<Place>| {
                        editor.act(|s| s.reorder_places(country, city_index, next));
                    })
                    on_delete=Callback::new(move |place: usize| {
                        editor.act(|s| s.delete_place(country, city_index, place));
                    })
                    on_add=Callback::new(move |_| editor.ask_place(country, city_index))
                    add_label="Add Place"
                />
            </div>
            <div class="flex flex-col gap-2 pl-4">
                <div class="text-xs font-medium uppercase tracking-wide text-muted-foreground">"Documents"</div>
                <ul class="flex flex-col gap-1">{documents}</ul>
                <FileDrop on_file=on_file uploading=uploading_here />
            </div>
        </div>
    }
}

#[component]
fn DocumentRow(
    editor: TripEditor,
    country: usize,
    city: usize,
    index: usize,
    doc: Document,
) -> impl IntoView {
    view! {
        <li class="flex items-center justify-between gap-2 text-sm">
            <a
                href=doc.url
                target="_blank"
                rel="noopener noreferrer"
                class="truncate text-primary underline-offset-4 hover:underline"
            >
                {doc.name}
            </a>
            <span class="text-xs text-muted-foreground">{size_label(doc.size)}</span>
            <Button
                variant=ButtonVariant::Ghost
                size=ButtonSize::Icon
                class="text-destructive"
                attr:title="Delete document"
                on:click=move |_| editor.detach(country, city, index)
            >
                "×"
            </Button>
        </li>
    }
}
