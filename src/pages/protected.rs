//! Placeholder shell for auth-required routes.
//!
//! Nothing of the page renders until the guard has settled with a user.

use leptos::prelude::*;
use leptos_router::NavigateOptions;
use leptos_router::hooks::use_navigate;

use crate::app::Services;
use crate::net::types::UserProfile;
use crate::state::auth::{AuthState, should_redirect_unauth};

#[component]
pub fn ProtectedPage(title: &'static str) -> impl IntoView {
    let services = expect_context::<Services>();
    let auth = expect_context::<RwSignal<AuthState>>();
    let navigate = use_navigate();
    let logout_requested = RwSignal::new(false);

    Effect::new(move || {
        if !logout_requested.get() {
            return;
        }
        let entry_route = services.with_value(|s| {
            s.api.session().logout();
            s.api.config().entry_route.clone()
        });
        auth.set(AuthState::default());
        navigate(&entry_route, NavigateOptions::default());
    });

    view! {
        <Show
            when=move || auth.with(AuthState::is_signed_in)
            fallback=move || {
                let text = if auth.with(should_redirect_unauth) { "Redirecting..." } else { "Checking session..." };
                view! { <p class="protected-page__pending">{text}</p> }
            }
        >
            <section class="protected-page">
                <header class="protected-page__header">
                    <h1>{title}</h1>
                    <button class="btn" on:click=move |_| logout_requested.set(true)>
                        "Log out"
                    </button>
                </header>
                <p class="protected-page__user">
                    {move || auth.with(|s| s.user.as_ref().map(UserProfile::display_name).unwrap_or_default())}
                </p>
            </section>
        </Show>
    }
}
