//! 认证守卫
//!
//! 纯函数：输入当前路由与完整路径，输出导航决策。真正的 History 操作
//! 由 `RouterService` 执行。

use super::store::SessionStore;
use crate::web::route::{AppRoute, sign_in_path_with_redirect};
use crate::web::storage::KeyValueStore;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardDecision {
    /// 允许停留在当前路由
    Allow,
    /// 未登录访问受保护页面
    RedirectToSignIn { path: String },
    /// 已登录访问登录/注册页
    RedirectToLanding,
}

/// 检查 `route` 是否可以访问
///
/// `current_path` 是浏览器中的完整路径（含查询串），用于生成回跳参数。
/// 只有在因无效会话而重定向时才清除残留的会话数据；认证页永远不会被
/// 重定向到登录页，避免循环。
pub fn check<S: KeyValueStore>(
    store: &SessionStore<S>,
    route: AppRoute,
    current_path: &str,
) -> GuardDecision {
    let session = store.read();

    if route.should_redirect_when_authenticated() {
        return match session {
            Some(_) => {
                log::info!("[Guard] already signed in, leaving {route}");
                GuardDecision::RedirectToLanding
            }
            None => GuardDecision::Allow,
        };
    }

    if !route.requires_auth() || session.is_some() {
        return GuardDecision::Allow;
    }

    if store.has_residue() {
        log::warn!("[Guard] discarding incomplete session data");
        store.clear();
    }
    log::info!("[Guard] no session, redirecting {current_path} to sign-in");
    GuardDecision::RedirectToSignIn {
        path: sign_in_path_with_redirect(current_path),
    }
}
