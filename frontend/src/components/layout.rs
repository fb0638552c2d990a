//! 后台布局：侧边栏 + 顶栏 + 内容区

use crate::auth::logout;
use crate::components::common::use_api;
use crate::config::AVATAR_PLACEHOLDER;
use crate::session::observer::use_session;
use crate::web::route::AppRoute;
use crate::web::router::{Link, use_router};
use leptos::prelude::*;
use simaru_shared::SessionUser;

/// 侧边栏分组
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavSection {
    pub title: &'static str,
    pub items: Vec<AppRoute>,
}

/// 侧边栏内容随登录状态变化：登录后显示管理入口，未登录只显示认证入口
pub fn nav_sections(logged_in: bool) -> Vec<NavSection> {
    if logged_in {
        vec![NavSection {
            title: "Menu",
            items: vec![
                AppRoute::Dashboard,
                AppRoute::Rooms,
                AppRoute::Bookings,
                AppRoute::Users,
            ],
        }]
    } else {
        vec![NavSection {
            title: "Authentication",
            items: vec![AppRoute::SignIn, AppRoute::SignUp],
        }]
    }
}

/// 头像地址，缺失时使用占位图
pub fn avatar_src(user: &SessionUser) -> String {
    user.avatar
        .as_deref()
        .map(str::trim)
        .filter(|a| !a.is_empty())
        .unwrap_or(AVATAR_PLACEHOLDER)
        .to_string()
}

#[component]
fn Sidebar() -> impl IntoView {
    let session = use_session();
    let router = use_router();
    let logged_in = session.is_authenticated_signal();

    view! {
        <aside class="w-64 min-h-screen bg-base-100 shadow-xl hidden md:block">
            <div class="p-6 text-xl font-bold text-primary">"Simaru Admin"</div>
            {move || {
                nav_sections(logged_in.get())
                    .into_iter()
                    .map(|section| {
                        view! {
                            <ul class="menu w-full">
                                <li class="menu-title">{section.title}</li>
                                {section
                                    .items
                                    .into_iter()
                                    .map(|route| {
                                        let class = move || {
                                            if router.current_route().get() == route {
                                                "active"
                                            } else {
                                                ""
                                            }
                                        };
                                        view! {
                                            <li>
                                                <Link to=route.to_path() class=class()>
                                                    {route.title()}
                                                </Link>
                                            </li>
                                        }
                                    })
                                    .collect_view()}
                            </ul>
                        }
                    })
                    .collect_view()
            }}
        </aside>
    }
}

/// 顶栏用户信息与注销
#[component]
fn UserInfo() -> impl IntoView {
    let session = use_session();
    let router = use_router();
    let api = use_api();

    let on_logout = move |_| {
        logout(api.store());
        router.navigate(AppRoute::auth_failure_redirect().to_path());
    };

    move || {
        session.user.get().map(|user| {
            let avatar = avatar_src(&user);
            view! {
                <div class="flex items-center gap-3">
                    <div class="text-right hidden sm:block">
                        <div class="font-medium">{user.display_name().to_string()}</div>
                        <div class="text-xs text-base-content/60">{user.email.clone()}</div>
                    </div>
                    <div class="avatar">
                        <div class="w-10 rounded-full">
                            <img src=avatar alt="User" />
                        </div>
                    </div>
                    <button class="btn btn-outline btn-error btn-sm" on:click=on_logout.clone()>
                        "Sign out"
                    </button>
                </div>
            }
        })
    }
}

/// 受保护页面的外壳
#[component]
pub fn AdminLayout(children: Children) -> impl IntoView {
    let router = use_router();
    let title = move || router.current_route().get().title();

    view! {
        <div class="flex min-h-screen bg-base-200 font-sans">
            <Sidebar />
            <div class="flex-1 flex flex-col">
                <header class="navbar bg-base-100 shadow px-6">
                    <div class="flex-1 text-lg font-semibold">{title}</div>
                    <div class="flex-none">
                        <UserInfo />
                    </div>
                </header>
                <main class="p-4 md:p-8">{children()}</main>
            </div>
        </div>
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn logged_out_sidebar_only_offers_auth_pages() {
        let sections = nav_sections(false);
        assert_eq!(sections.len(), 1);
        assert_eq!(sections[0].items, vec![AppRoute::SignIn, AppRoute::SignUp]);
    }

    #[test]
    fn logged_in_sidebar_lists_management_pages() {
        let items: Vec<AppRoute> = nav_sections(true).into_iter().flat_map(|s| s.items).collect();
        assert!(items.contains(&AppRoute::Rooms));
        assert!(items.contains(&AppRoute::Users));
        assert!(!items.iter().any(AppRoute::is_auth_page));
    }

    #[test]
    fn missing_avatar_uses_placeholder() {
        let mut user = SessionUser {
            id: 1,
            name: "A".into(),
            email: "a@b.com".into(),
            avatar: None,
        };
        assert_eq!(avatar_src(&user), AVATAR_PLACEHOLDER);
        user.avatar = Some("  ".into());
        assert_eq!(avatar_src(&user), AVATAR_PLACEHOLDER);
        user.avatar = Some("/img/a.png".into());
        assert_eq!(avatar_src(&user), "/img/a.png");
    }
}
