use crate::auth::{AuthFormState, run_guarded, sign_up};
use crate::components::common::use_api;
use crate::components::sign_in::AuthCard;
use crate::forms::SignUpForm;
use crate::web::route::AppRoute;
use crate::web::router::{Link, use_router};
use leptos::prelude::*;
use leptos::task::spawn_local;

#[component]
pub fn SignUpPage() -> impl IntoView {
    let api = use_api();
    let router = use_router();
    let form = RwSignal::new(SignUpForm::default());
    let state = RwSignal::new(AuthFormState::default());

    let on_submit = move |ev: leptos::web_sys::SubmitEvent| {
        ev.prevent_default();
        let api = api.clone();
        let form = form.get_untracked();
        spawn_local(async move {
            if run_guarded(&state, sign_up(&api, &form)).await.is_some() {
                router.navigate(AppRoute::auth_success_redirect().to_path());
            }
        });
    };

    let field = move |id: &'static str,
                      label: &'static str,
                      kind: &'static str,
                      get: fn(&SignUpForm) -> String,
                      set: fn(&mut SignUpForm, String)| {
        view! {
            <div class="form-control">
                <label class="label" for=id>
                    <span class="label-text">{label}</span>
                </label>
                <input
                    id=id
                    type=kind
                    class="input input-bordered"
                    prop:value=move || form.with(get)
                    on:input=move |ev| form.update(|f| set(f, event_target_value(&ev)))
                />
            </div>
        }
    };

    view! {
        <AuthCard title="Sign Up" subtitle="Create an administrator account" state=state>
            <form on:submit=on_submit class="space-y-2">
                {field("name", "Name", "text", |f| f.name.clone(), |f, v| f.name = v)}
                {field("email", "Email", "email", |f| f.email.clone(), |f, v| f.email = v)}
                {field("password", "Password", "password", |f| f.password.clone(), |f, v| f.password = v)}
                {field(
                    "password_confirmation",
                    "Confirm password",
                    "password",
                    |f| f.password_confirmation.clone(),
                    |f, v| f.password_confirmation = v,
                )}
                <div class="form-control mt-6">
                    <button class="btn btn-primary" disabled=move || state.with(|s| s.submitting)>
                        {move || if state.with(|s| s.submitting) {
                            view! { <span class="loading loading-spinner"></span> "Creating account..." }.into_any()
                        } else {
                            "Sign Up".into_any()
                        }}
                    </button>
                </div>
                <p class="text-sm text-center">
                    "Already have an account? "
                    <Link to=AppRoute::SignIn.to_path() class="link link-primary">
                        "Sign In"
                    </Link>
                </p>
            </form>
        </AuthCard>
    }
}
