use crate::auth::{AuthFormState, post_login_target, run_guarded, sign_in};
use crate::components::common::use_api;
use crate::forms::SignInForm;
use crate::web::route::AppRoute;
use crate::web::router::{Link, use_router};
use leptos::prelude::*;
use leptos::task::spawn_local;

/// 认证页共用的卡片外壳
#[component]
pub fn AuthCard(
    #[prop(into)] title: String,
    #[prop(into)] subtitle: String,
    state: RwSignal<AuthFormState>,
    children: Children,
) -> impl IntoView {
    view! {
        <div class="hero min-h-screen bg-base-200">
            <div class="hero-content flex-col w-full max-w-md">
                <div class="text-center mb-4">
                    <h1 class="text-3xl font-bold">{title}</h1>
                    <p class="text-base-content/70">{subtitle}</p>
                </div>
                <div class="card shrink-0 w-full shadow-2xl bg-base-100">
                    <div class="card-body">
                        {move || {
                            state
                                .with(|s| s.error.clone())
                                .map(|msg| {
                                    view! {
                                        <div role="alert" class="alert alert-error text-sm py-2">
                                            <span>{msg}</span>
                                        </div>
                                    }
                                })
                        }}
                        {children()}
                    </div>
                </div>
            </div>
        </div>
    }
}

#[component]
pub fn SignInPage() -> impl IntoView {
    let api = use_api();
    let router = use_router();
    let form = RwSignal::new(SignInForm::default());
    let state = RwSignal::new(AuthFormState::default());

    let on_submit = move |ev: leptos::web_sys::SubmitEvent| {
        ev.prevent_default();
        let api = api.clone();
        let form = form.get_untracked();
        spawn_local(async move {
            if run_guarded(&state, sign_in(&api, &form)).await.is_some() {
                let target = post_login_target(&router.search().get_untracked());
                router.navigate(&target);
            }
        });
    };

    view! {
        <AuthCard title="Sign In" subtitle="Sign in to manage rooms and bookings" state=state>
            <form on:submit=on_submit class="space-y-2">
                <div class="form-control">
                    <label class="label" for="email">
                        <span class="label-text">"Email"</span>
                    </label>
                    <input
                        id="email"
                        type="email"
                        placeholder="you@example.com"
                        class="input input-bordered"
                        prop:value=move || form.with(|f| f.email.clone())
                        on:input=move |ev| form.update(|f| f.email = event_target_value(&ev))
                    />
                </div>
                <div class="form-control">
                    <label class="label" for="password">
                        <span class="label-text">"Password"</span>
                    </label>
                    <input
                        id="password"
                        type="password"
                        placeholder="••••••••"
                        class="input input-bordered"
                        prop:value=move || form.with(|f| f.password.clone())
                        on:input=move |ev| form.update(|f| f.password = event_target_value(&ev))
                    />
                </div>
                <div class="form-control mt-6">
                    <button class="btn btn-primary" disabled=move || state.with(|s| s.submitting)>
                        {move || if state.with(|s| s.submitting) {
                            view! { <span class="loading loading-spinner"></span> "Signing in..." }.into_any()
                        } else {
                            "Sign In".into_any()
                        }}
                    </button>
                </div>
                <p class="text-sm text-center">
                    "Don't have an account? "
                    <Link to=AppRoute::SignUp.to_path() class="link link-primary">
                        "Sign Up"
                    </Link>
                </p>
            </form>
        </AuthCard>
    }
}
