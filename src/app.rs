//! Root application component with routing, session services and the
//! navigation guard.

use std::rc::Rc;

use leptos::prelude::*;
use leptos_meta::{Title, provide_meta_context};
use leptos_router::components::{Route, Router, Routes};
use leptos_router::hooks::{use_location, use_navigate};
use leptos_router::{NavigateOptions, ParamSegment, StaticSegment};
use wasm_bindgen::{JsCast, closure::Closure};

use crate::config::ClientConfig;
use crate::net::api::ApiClient;
use crate::net::transport::BrowserTransport;
use crate::pages::{entry::EntryPage, protected::ProtectedPage};
use crate::router::guard::{NavDecision, NavigationGuard};
use crate::router::reload::{DynamicReload, LoadErrorAction};
use crate::router::routes::RouteTable;
use crate::state::auth::AuthState;
use crate::state::session::SessionStore;
use crate::util::storage::{BrowserStorage, KeyValueStore};

pub type BrowserApi = ApiClient<BrowserTransport>;

/// Session services shared with pages through context.
#[derive(Clone)]
pub struct AuthServices {
    pub api: BrowserApi,
    pub guard: Rc<NavigationGuard<BrowserApi>>,
    pub routes: Rc<RouteTable>,
    pub reload: Rc<DynamicReload>,
}

impl AuthServices {
    pub fn new(config: ClientConfig) -> Self {
        let storage: Rc<dyn KeyValueStore> = Rc::new(BrowserStorage);
        let session = SessionStore::restore(Rc::clone(&storage), config.storage_keys.clone());
        let reload = DynamicReload::new(storage, config.storage_keys.dynamic_reload.clone());
        let entry_route = config.entry_route.clone();
        let api = ApiClient::live(BrowserTransport, config, session.clone());
        let guard = NavigationGuard::new(session, api.clone(), entry_route);
        Self { api, guard: Rc::new(guard), routes: Rc::new(RouteTable::default()), reload: Rc::new(reload) }
    }
}

/// Context handle; the services are `!Send` so they live in local storage.
pub type Services = StoredValue<AuthServices, LocalStorage>;

/// Root application component.
///
/// Provides the session services and auth view-model, and sets up
/// client-side routing.
#[component]
pub fn App() -> impl IntoView {
    provide_meta_context();

    let services: Services = StoredValue::new_local(AuthServices::new(ClientConfig::from_build_env()));
    let auth = RwSignal::new(services.with_value(|s| AuthState::from_session(s.api.session())));
    install_load_error_recovery(services.with_value(|s| Rc::clone(&s.reload)));
    provide_context(services);
    provide_context(auth);

    view! {
        <Title text="OKR"/>

        <Router>
            <RouteGate/>
            <Routes fallback=|| "Page not found.".into_view()>
                <Route path=StaticSegment("") view=EntryPage/>
                <Route path=StaticSegment("aiph") view=|| view! { <ProtectedPage title="AIPH"/> }/>
                <Route path=StaticSegment("team") view=|| view! { <ProtectedPage title="Team"/> }/>
                <Route path=StaticSegment("meetings") view=|| view! { <ProtectedPage title="Meetings"/> }/>
                <Route path=StaticSegment("objectives") view=|| view! { <ProtectedPage title="Objectives"/> }/>
                <Route path=StaticSegment("key-results") view=|| view! { <ProtectedPage title="Key Results"/> }/>
                <Route path=StaticSegment("evaluations") view=|| view! { <ProtectedPage title="Evaluations"/> }/>
                <Route
                    path=(StaticSegment("objective-dashboard"), ParamSegment("id"))
                    view=|| view! { <ProtectedPage title="Objective Dashboard"/> }
                />
            </Routes>
        </Router>
    }
}

/// Runs the navigation guard on every location change and redirects when
/// it denies the transition.
#[component]
fn RouteGate() -> impl IntoView {
    let services = expect_context::<Services>();
    let auth = expect_context::<RwSignal<AuthState>>();
    let navigate = use_navigate();
    let location = use_location();

    // Routing is up; a later chunk failure may reload once more.
    services.with_value(|s| s.reload.mark_ready());

    Effect::new(move || {
        let path = location.pathname.get();
        let services = services.get_value();
        let navigate = navigate.clone();
        auth.update(|state| state.loading = true);
        leptos::task::spawn_local(async move {
            let target = services.routes.resolve(&path);
            let decision = services.guard.check(&target).await;
            auth.set(AuthState::from_session(services.api.session()));
            if let NavDecision::Redirect(to) = decision {
                navigate(&to, NavigateOptions { replace: true, ..NavigateOptions::default() });
            }
        });
    });
}

/// Listens for uncaught errors and rejected promises on the window and
/// hands module-load failures to [`DynamicReload`].
fn install_load_error_recovery(reload: Rc<DynamicReload>) {
    let Some(window) = web_sys::window() else {
        return;
    };
    let handler = Closure::<dyn Fn(web_sys::Event)>::new(move |event: web_sys::Event| {
        let Some(message) = load_error_message(&event) else {
            return;
        };
        let Some(window) = web_sys::window() else {
            return;
        };
        let target = window.location().href().unwrap_or_else(|_| "/".to_owned());
        if let LoadErrorAction::Reload(to) = reload.on_load_error(&message, &target) {
            if let Err(e) = window.location().assign(&to) {
                log::error!("reload failed: {e:?}");
            }
        }
    });
    for kind in ["error", "unhandledrejection"] {
        if window.add_event_listener_with_callback(kind, handler.as_ref().unchecked_ref()).is_err() {
            log::warn!("could not listen for {kind} events");
        }
    }
    // Lives for the whole page.
    handler.forget();
}

fn load_error_message(event: &web_sys::Event) -> Option<String> {
    if let Some(error) = event.dyn_ref::<web_sys::ErrorEvent>() {
        return Some(error.message());
    }
    let rejection = event.dyn_ref::<web_sys::PromiseRejectionEvent>()?;
    let reason = rejection.reason();
    match reason.dyn_ref::<js_sys::Error>() {
        Some(error) => Some(String::from(error.message())),
        None => reason.as_string(),
    }
}
