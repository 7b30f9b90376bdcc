//! Entry page with the username + password sign-in form.

use leptos::prelude::*;
use leptos_router::NavigateOptions;
use leptos_router::hooks::use_navigate;

use crate::app::Services;
use crate::state::auth::AuthState;

const AFTER_LOGIN_ROUTE: &str = "/objectives";

#[component]
pub fn EntryPage() -> impl IntoView {
    let services = expect_context::<Services>();
    let auth = expect_context::<RwSignal<AuthState>>();
    let navigate = use_navigate();

    let username = RwSignal::new(String::new());
    let password = RwSignal::new(String::new());
    let info = RwSignal::new(String::new());
    let busy = RwSignal::new(false);

    let on_submit = move |ev: leptos::ev::SubmitEvent| {
        ev.prevent_default();
        if busy.get() {
            return;
        }
        let username_value = username.get().trim().to_owned();
        let password_value = password.get();
        if username_value.is_empty() || password_value.is_empty() {
            info.set("Enter both username and password.".to_owned());
            return;
        }
        busy.set(true);
        info.set("Signing in...".to_owned());

        let services = services.get_value();
        let navigate = navigate.clone();
        leptos::task::spawn_local(async move {
            match services.api.login(&username_value, &password_value).await {
                Ok(_) => {
                    services.api.session().fetch_user(&services.api).await;
                    auth.set(AuthState::from_session(services.api.session()));
                    info.set(String::new());
                    password.set(String::new());
                    navigate(AFTER_LOGIN_ROUTE, NavigateOptions::default());
                }
                Err(e) if e.is_unauthorized() => info.set("Invalid username or password.".to_owned()),
                Err(e) => info.set(format!("Sign-in failed: {e}")),
            }
            busy.set(false);
        });
    };

    view! {
        <div class="login-page">
            <div class="login-card">
                <h1>"OKR"</h1>
                <form class="login-form" on:submit=on_submit>
                    <input
                        class="login-input"
                        type="text"
                        placeholder="username"
                        prop:value=move || username.get()
                        on:input=move |ev| username.set(event_target_value(&ev))
                    />
                    <input
                        class="login-input"
                        type="password"
                        placeholder="password"
                        prop:value=move || password.get()
                        on:input=move |ev| password.set(event_target_value(&ev))
                    />
                    <button class="login-button" type="submit" disabled=move || busy.get()>
                        "Sign In"
                    </button>
                </form>
                <Show when=move || !info.get().is_empty()>
                    <p class="login-message">{move || info.get()}</p>
                </Show>
            </div>
        </div>
    }
}
