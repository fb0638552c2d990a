//! Simaru 后台管理前端
//!
//! 采用 Context-Driven 的高内聚低耦合架构：
//! - `session`: 会话存储、认证守卫、会话观察者
//! - `api`: 资源客户端（rooms / bookings / users）
//! - `state`: 列表视图状态机与异步编排
//! - `web::route` / `web::router`: 路由定义与路由服务
//! - `components`: UI 组件层

mod api;
mod auth;
mod config;
mod error;
mod forms;

mod components {
    pub mod bookings;
    pub mod common;
    pub mod dashboard;
    pub mod layout;
    pub mod rooms;
    pub mod sign_in;
    pub mod sign_up;
    pub mod users;
}

mod session {
    pub mod guard;
    pub mod observer;
    pub mod store;
}

mod state {
    pub mod cell;
    pub mod controller;
    pub mod list_view;
    pub mod sort;
    pub mod source;
}

// 浏览器 API 适配层
// 只有这里直接接触 window / localStorage / fetch / history，
// 其余模块通过 trait 使用它们，测试时可替换为内存实现。
pub(crate) mod web {
    pub mod http;
    pub mod route;
    pub mod router;
    pub mod storage;
}

use crate::api::ApiClient;
use crate::components::bookings::BookingsPage;
use crate::components::common::WebApi;
use crate::components::dashboard::DashboardPage;
use crate::components::rooms::RoomsPage;
use crate::components::sign_in::SignInPage;
use crate::components::sign_up::SignUpPage;
use crate::components::users::UsersPage;
use crate::config::AppConfig;
use crate::session::observer::provide_session;
use crate::session::store::SessionStore;
use crate::web::http::FetchHttpClient;
use crate::web::storage::BrowserStorage;

use leptos::prelude::*;

use web::route::AppRoute;
use web::router::{Link, Router, RouterOutlet};

/// 路由匹配函数
fn route_matcher(route: AppRoute) -> AnyView {
    match route {
        AppRoute::SignIn => view! { <SignInPage /> }.into_any(),
        AppRoute::SignUp => view! { <SignUpPage /> }.into_any(),
        AppRoute::Dashboard => view! { <DashboardPage /> }.into_any(),
        AppRoute::Rooms => view! { <RoomsPage /> }.into_any(),
        AppRoute::Bookings => view! { <BookingsPage /> }.into_any(),
        AppRoute::Users => view! { <UsersPage /> }.into_any(),
        AppRoute::NotFound => view! {
            <div class="flex items-center justify-center min-h-screen bg-base-200">
                <div class="text-center">
                    <h1 class="text-6xl font-bold text-error">"404"</h1>
                    <p class="text-xl mt-4">"Page not found"</p>
                    <Link to=AppRoute::Dashboard.to_path() class="btn btn-primary mt-6">
                        "Back to dashboard"
                    </Link>
                </div>
            </div>
        }
        .into_any(),
    }
}

#[component]
pub fn App() -> impl IntoView {
    // 1. 配置与 API 客户端
    let config = AppConfig::from_env();
    log::info!("[App] api base url: {}", config.api_base_url);
    let api: WebApi = ApiClient::new(
        FetchHttpClient,
        SessionStore::new(BrowserStorage),
        &config.api_base_url,
    );
    provide_context(config);
    provide_context(api);

    // 2. 会话观察者：监听本标签页与其他标签页的会话变化
    let session = provide_session();

    // 3. 认证信号注入路由服务
    let is_authenticated = session.is_authenticated_signal();

    view! {
        <Router is_authenticated=is_authenticated>
            <RouterOutlet matcher=route_matcher />
        </Router>
    }
}
