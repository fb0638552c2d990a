//! 路由服务模块 - 核心引擎
//!
//! 封装了 web_sys 的 History API，所有对 window.history 的操作都集中在此。
//! 导航流程为"请求 -> 守卫 -> 写入 History -> 更新路由信号"，守卫决策
//! 由 `session::guard::check` 给出。

use leptos::prelude::*;
use wasm_bindgen::prelude::*;

use super::route::AppRoute;
use super::storage::BrowserStorage;
use crate::auth::post_login_target;
use crate::session::guard::{self, GuardDecision};
use crate::session::store::SessionStore;

/// 当前浏览器路径（含查询串）
fn current_location() -> String {
    let Some(location) = web_sys::window().map(|w| w.location()) else {
        return "/".to_string();
    };
    let path = location.pathname().unwrap_or_else(|_| "/".to_string());
    let search = location.search().unwrap_or_default();
    format!("{path}{search}")
}

/// 拆分为路径与查询串（查询串带前导 `?`）
fn split_location(location: &str) -> (&str, &str) {
    match location.find('?') {
        Some(i) => (&location[..i], &location[i..]),
        None => (location, ""),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum HistoryMode {
    Push,
    Replace,
    /// 地址栏已经是目标地址（popstate）
    Keep,
}

fn write_history(path: &str, mode: HistoryMode) {
    let Some(history) = web_sys::window().and_then(|w| w.history().ok()) else {
        return;
    };
    let result = match mode {
        HistoryMode::Push => history.push_state_with_url(&JsValue::NULL, "", Some(path)),
        HistoryMode::Replace => history.replace_state_with_url(&JsValue::NULL, "", Some(path)),
        HistoryMode::Keep => Ok(()),
    };
    if result.is_err() {
        log::warn!("[Router] failed to update history for {path}");
    }
}

/// 守卫决策对应的最终地址；`None` 表示停留在请求的地址
fn redirect_target(decision: GuardDecision, search: &str) -> Option<String> {
    match decision {
        GuardDecision::Allow => None,
        GuardDecision::RedirectToSignIn { path } => Some(path),
        GuardDecision::RedirectToLanding => Some(post_login_target(search)),
    }
}

/// 路由器服务
///
/// 封装所有路由操作，通过 Signal 驱动界面更新。
/// 认证状态以信号形式注入，只用于感知登录/登出并重新执行守卫。
#[derive(Clone, Copy)]
pub struct RouterService {
    current_route: ReadSignal<AppRoute>,
    set_route: WriteSignal<AppRoute>,
    /// 当前查询串，登录页据此读取 `redirect` 参数
    search: ReadSignal<String>,
    set_search: WriteSignal<String>,
    is_authenticated: Signal<bool>,
}

impl RouterService {
    fn new(is_authenticated: Signal<bool>) -> Self {
        let location = current_location();
        let (path, search) = split_location(&location);
        let (current_route, set_route) = signal(AppRoute::from_path(path));
        let (search, set_search) = signal(search.to_string());

        let router = Self {
            current_route,
            set_route,
            search,
            set_search,
            is_authenticated,
        };
        // 首次加载同样经过守卫
        router.resolve(&location, HistoryMode::Keep);
        router
    }

    pub fn current_route(&self) -> ReadSignal<AppRoute> {
        self.current_route
    }

    pub fn search(&self) -> ReadSignal<String> {
        self.search
    }

    /// **核心方法：导航与守卫**
    pub fn navigate(&self, path: &str) {
        self.resolve(path, HistoryMode::Push);
    }

    fn resolve(&self, location: &str, mode: HistoryMode) {
        let (path, search) = split_location(location);
        let route = AppRoute::from_path(path);
        let store = SessionStore::new(BrowserStorage);

        let target = match redirect_target(guard::check(&store, route, location), search) {
            Some(redirect) => {
                log::info!("[Router] {location} -> {redirect}");
                // 重定向不留下被拒绝的地址
                let mode = match mode {
                    HistoryMode::Push => HistoryMode::Push,
                    _ => HistoryMode::Replace,
                };
                write_history(&redirect, mode);
                redirect
            }
            None => {
                write_history(location, mode);
                location.to_string()
            }
        };

        let (path, search) = split_location(&target);
        self.set_search.set(search.to_string());
        self.set_route.set(AppRoute::from_path(path));
    }

    /// 浏览器后退/前进按钮
    fn init_popstate_listener(&self) {
        let router = *self;
        let closure = Closure::<dyn Fn()>::new(move || {
            router.resolve(&current_location(), HistoryMode::Keep);
        });

        if let Some(window) = web_sys::window() {
            let _ = window
                .add_event_listener_with_callback("popstate", closure.as_ref().unchecked_ref());
        }

        // 泄漏闭包以保持监听器存活
        closure.forget();
    }

    /// 登录状态变化（本标签页或其他标签页）时重新执行守卫
    fn setup_auth_redirect(&self) {
        let router = *self;
        Effect::new(move |previous: Option<bool>| {
            let is_auth = router.is_authenticated.get();
            if previous.is_some_and(|p| p != is_auth) {
                log::info!(
                    "[Router] auth state changed: {}",
                    if is_auth { "signed in" } else { "signed out" }
                );
                router.resolve(&current_location(), HistoryMode::Keep);
            }
            is_auth
        });
    }
}

fn provide_router(is_authenticated: Signal<bool>) -> RouterService {
    let router = RouterService::new(is_authenticated);
    router.init_popstate_listener();
    router.setup_auth_redirect();
    provide_context(router);
    router
}

/// 从 Context 获取路由服务
pub fn use_router() -> RouterService {
    use_context::<RouterService>()
        .expect("RouterService not found in context. Ensure Router is provided.")
}

// ============================================================================
// UI 组件
// ============================================================================

/// 路由器根组件
#[component]
pub fn Router(
    /// 认证状态信号
    is_authenticated: Signal<bool>,
    children: Children,
) -> impl IntoView {
    provide_router(is_authenticated);

    children()
}

/// 路由出口组件
#[component]
pub fn RouterOutlet(
    /// 路由匹配函数：接收当前路由，返回对应视图
    matcher: fn(AppRoute) -> AnyView,
) -> impl IntoView {
    let router = use_router();

    move || {
        let current = router.current_route().get();
        matcher(current)
    }
}

/// 站内链接，点击时走路由服务而非整页刷新
#[component]
pub fn Link(
    #[prop(into)] to: String,
    #[prop(optional, into)] class: String,
    children: Children,
) -> impl IntoView {
    let router = use_router();
    let target = to.clone();
    let on_click = move |ev: web_sys::MouseEvent| {
        ev.prevent_default();
        router.navigate(&target);
    };

    view! {
        <a href=to class=class on:click=on_click>
            {children()}
        </a>
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_query_from_path() {
        assert_eq!(split_location("/auth/sign-in?redirect=%2Frooms"), ("/auth/sign-in", "?redirect=%2Frooms"));
        assert_eq!(split_location("/rooms"), ("/rooms", ""));
    }

    #[test]
    fn landing_redirect_honours_query() {
        assert_eq!(
            redirect_target(GuardDecision::RedirectToLanding, "?redirect=%2Fusers"),
            Some("/users".to_string())
        );
        assert_eq!(redirect_target(GuardDecision::RedirectToLanding, ""), Some("/".to_string()));
        assert_eq!(redirect_target(GuardDecision::Allow, "?redirect=%2Fusers"), None);
    }
}
