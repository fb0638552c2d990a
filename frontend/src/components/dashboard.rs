use crate::components::layout::AdminLayout;
use crate::session::observer::use_session;
use crate::web::route::AppRoute;
use crate::web::router::Link;
use leptos::prelude::*;

/// 各管理页面的简介
fn describe(route: AppRoute) -> &'static str {
    match route {
        AppRoute::Rooms => "Add rooms, set prices and capacity, assign categories.",
        AppRoute::Bookings => "Review and schedule room bookings.",
        AppRoute::Users => "Manage administrator and member accounts.",
        _ => "",
    }
}

#[component]
pub fn DashboardPage() -> impl IntoView {
    let session = use_session();
    let greeting = move || {
        session
            .user
            .with(|u| u.as_ref().map(|u| format!("Welcome back, {}", u.display_name())))
            .unwrap_or_else(|| "Welcome".to_string())
    };

    view! {
        <AdminLayout>
            <div class="space-y-8">
                <h2 class="text-2xl font-bold">{greeting}</h2>
                <div class="grid gap-6 md:grid-cols-3">
                    {[AppRoute::Rooms, AppRoute::Bookings, AppRoute::Users]
                        .into_iter()
                        .map(|route| {
                            view! {
                                <div class="card bg-base-100 shadow-xl">
                                    <div class="card-body">
                                        <h3 class="card-title">{route.title()}</h3>
                                        <p class="text-base-content/70 text-sm">{describe(route)}</p>
                                        <div class="card-actions justify-end">
                                            <Link to=route.to_path() class="btn btn-primary btn-sm">
                                                "Open"
                                            </Link>
                                        </div>
                                    </div>
                                </div>
                            }
                        })
                        .collect_view()}
                </div>
            </div>
        </AdminLayout>
    }
}
