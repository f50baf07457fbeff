use crate::config::EnvConfig;
use crate::pages::{LoginPage, NewTripPage, RootAuthed, RootPage, TripPage, TripsPage};
use crate::state::{AppContext, AppState};
use leptos::prelude::*;
use leptos_router::components::{Route, Router, Routes};
use leptos_router::path;

#[component]
pub fn App(config: EnvConfig) -> impl IntoView {
    provide_context(AppContext(AppState::new(config)));

    view! {
        <Router>
            <Routes fallback=|| view! { <div class="px-4 py-8 text-xs text-muted-foreground">"Not found"</div> }>
                <Route path=path!("login") view=LoginPage />
                <Route path=path!("trips") view=move || view! {
                    <RootAuthed>
                        <TripsPage />
                    </RootAuthed>
                } />
                // Static segment first so "new" is never read as a trip id.
                <Route path=path!("trip/new") view=move || view! {
                    <RootAuthed>
                        <NewTripPage />
                    </RootAuthed>
                } />
                <Route path=path!("trip/:id") view=move || view! {
                    <RootAuthed>
                        <TripPage />
                    </RootAuthed>
                } />
                <Route path=path!("") view=RootPage />
            </Routes>
        </Router>
    }
}
