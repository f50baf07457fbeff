use leptos::prelude::*;
use leptos_ui::clx;

mod components {
    use super::*;
    clx! {Card, div, "bg-card text-card-foreground flex flex-col gap-4 rounded-xl border py-5 shadow-sm"}
    clx! {CardHeader, div, "flex flex-col items-start gap-1.5 px-5"}
    clx! {CardTitle, h2, "leading-none font-semibold"}
    clx! {CardDescription, p, "text-muted-foreground text-sm"}
    clx! {CardContent, div, "px-5"}
    clx! {CardFooter, footer, "flex items-center justify-between gap-2 px-5"}
    // Trip cards on the list page.
    clx! {CardGrid, div, "grid gap-4 md:grid-cols-2 lg:grid-cols-3"}

    clx! {Alert, div, "relative w-full rounded-lg border px-4 py-3 text-sm"}
    clx! {AlertDescription, p, "text-sm [&_p]:leading-relaxed"}
}

pub use components::*;
