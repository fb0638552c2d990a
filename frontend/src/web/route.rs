//! 路由定义模块 - 领域模型
//!
//! 这是纯粹的业务逻辑层，不依赖于 DOM 或 web_sys。
//! 定义了应用的所有路由及其属性。

use std::fmt::Display;

/// 登录后 `?redirect=` 参数名
const REDIRECT_PARAM: &str = "redirect";

/// 应用路由枚举
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AppRoute {
    /// 登录页面
    SignIn,
    /// 注册页面
    SignUp,
    /// 控制面板首页 (需要认证)
    #[default]
    Dashboard,
    Rooms,
    Bookings,
    Users,
    /// 页面未找到
    NotFound,
}

impl AppRoute {
    /// 将 URL path 解析为路由枚举，忽略查询串、锚点与末尾斜杠
    pub fn from_path(path: &str) -> Self {
        let path = strip_query(path);
        let path = match path.trim_end_matches('/') {
            "" => "/",
            p => p,
        };
        match path {
            "/auth/sign-in" => Self::SignIn,
            "/auth/sign-up" => Self::SignUp,
            "/" => Self::Dashboard,
            "/rooms" => Self::Rooms,
            "/bookings" => Self::Bookings,
            "/users" => Self::Users,
            _ => Self::NotFound,
        }
    }

    /// 获取路由对应的 URL path
    pub fn to_path(&self) -> &'static str {
        match self {
            Self::SignIn => "/auth/sign-in",
            Self::SignUp => "/auth/sign-up",
            Self::Dashboard => "/",
            Self::Rooms => "/rooms",
            Self::Bookings => "/bookings",
            Self::Users => "/users",
            Self::NotFound => "/404",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Self::SignIn => "Sign In",
            Self::SignUp => "Sign Up",
            Self::Dashboard => "Dashboard",
            Self::Rooms => "Rooms",
            Self::Bookings => "Bookings",
            Self::Users => "Users",
            Self::NotFound => "Not Found",
        }
    }

    /// 登录/注册页：未登录访客可以停留，守卫不会把它们重定向到自身
    pub fn is_auth_page(&self) -> bool {
        matches!(self, Self::SignIn | Self::SignUp)
    }

    /// **核心守卫逻辑：定义该路由是否需要认证**
    pub fn requires_auth(&self) -> bool {
        !self.is_auth_page()
    }

    /// 定义已认证用户是否应该离开此路由（如登录页）
    pub fn should_redirect_when_authenticated(&self) -> bool {
        self.is_auth_page()
    }

    /// 获取认证失败时的重定向目标
    pub fn auth_failure_redirect() -> Self {
        Self::SignIn
    }

    /// 获取认证成功时的重定向目标（从登录页）
    pub fn auth_success_redirect() -> Self {
        Self::Dashboard
    }
}

impl Display for AppRoute {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_path())
    }
}

// =========================================================
// 重定向参数 (Redirect Parameter)
// =========================================================

fn strip_query(path: &str) -> &str {
    let end = path.find(['?', '#']).unwrap_or(path.len());
    &path[..end]
}

/// 带回跳参数的登录页地址：`/auth/sign-in?redirect=%2Frooms`
///
/// 首页或认证页本身不附带参数。
pub fn sign_in_path_with_redirect(from: &str) -> String {
    let sign_in = AppRoute::auth_failure_redirect().to_path();
    let route = AppRoute::from_path(from);
    if route.is_auth_page() || route == AppRoute::auth_success_redirect() || from.is_empty() {
        return sign_in.to_string();
    }
    format!("{sign_in}?{REDIRECT_PARAM}={}", encode_component(from))
}

/// 从查询串（可带前导 `?`）中取出 `redirect` 参数并解码
pub fn redirect_param(search: &str) -> Option<String> {
    search
        .trim_start_matches('?')
        .split('&')
        .filter_map(|pair| pair.split_once('='))
        .find(|(key, _)| *key == REDIRECT_PARAM)
        .and_then(|(_, value)| decode_component(value))
}

/// 登录成功后的去向
///
/// 只接受同源相对路径 (`/...`)：拒绝协议相对地址 (`//host`)、带协议的
/// 绝对地址、反斜杠变体以及指回认证页的地址。其余情况回到首页。
pub fn safe_redirect_target(raw: Option<&str>) -> String {
    let landing = AppRoute::auth_success_redirect().to_path().to_string();
    let Some(raw) = raw.map(str::trim).filter(|r| !r.is_empty()) else {
        return landing;
    };
    let same_origin = raw.starts_with('/')
        && !raw.starts_with("//")
        && !raw.contains('\\')
        && !raw.contains("://")
        && !raw.chars().any(char::is_control);
    if !same_origin || AppRoute::from_path(raw).is_auth_page() {
        log::warn!("[Router] ignoring unsafe redirect target: {raw}");
        return landing;
    }
    raw.to_string()
}

fn encode_component(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for byte in raw.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                out.push(byte as char)
            }
            _ => out.push_str(&format!("%{byte:02X}")),
        }
    }
    out
}

fn decode_component(raw: &str) -> Option<String> {
    let bytes = raw.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'%' => {
                let hex = raw.get(i + 1..i + 3)?;
                out.push(u8::from_str_radix(hex, 16).ok()?);
                i += 3;
            }
            b'+' => {
                out.push(b' ');
                i += 1;
            }
            b => {
                out.push(b);
                i += 1;
            }
        }
    }
    String::from_utf8(out).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_known_paths() {
        assert_eq!(AppRoute::from_path("/"), AppRoute::Dashboard);
        assert_eq!(AppRoute::from_path(""), AppRoute::Dashboard);
        assert_eq!(AppRoute::from_path("/rooms/"), AppRoute::Rooms);
        assert_eq!(AppRoute::from_path("/users?page=2"), AppRoute::Users);
        assert_eq!(
            AppRoute::from_path("/auth/sign-in?redirect=%2Frooms"),
            AppRoute::SignIn
        );
        assert_eq!(AppRoute::from_path("/nope"), AppRoute::NotFound);
    }

    #[test]
    fn only_auth_pages_are_public() {
        for route in [
            AppRoute::Dashboard,
            AppRoute::Rooms,
            AppRoute::Bookings,
            AppRoute::Users,
            AppRoute::NotFound,
        ] {
            assert!(route.requires_auth(), "{route} should be protected");
        }
        assert!(!AppRoute::SignIn.requires_auth());
        assert!(!AppRoute::SignUp.requires_auth());
    }

    #[test]
    fn path_round_trips_for_pages() {
        for route in [
            AppRoute::SignIn,
            AppRoute::SignUp,
            AppRoute::Dashboard,
            AppRoute::Rooms,
            AppRoute::Bookings,
            AppRoute::Users,
        ] {
            assert_eq!(AppRoute::from_path(route.to_path()), route);
        }
    }

    #[test]
    fn sign_in_path_carries_origin() {
        assert_eq!(
            sign_in_path_with_redirect("/rooms"),
            "/auth/sign-in?redirect=%2Frooms"
        );
        assert_eq!(
            sign_in_path_with_redirect("/users?page=2"),
            "/auth/sign-in?redirect=%2Fusers%3Fpage%3D2"
        );
        assert_eq!(sign_in_path_with_redirect("/"), "/auth/sign-in");
        assert_eq!(sign_in_path_with_redirect("/auth/sign-up"), "/auth/sign-in");
    }

    #[test]
    fn redirect_param_decodes() {
        assert_eq!(
            redirect_param("?redirect=%2Fusers%3Fpage%3D2").as_deref(),
            Some("/users?page=2")
        );
        assert_eq!(redirect_param("a=1&redirect=/rooms").as_deref(), Some("/rooms"));
        assert_eq!(redirect_param("?a=1"), None);
        assert_eq!(redirect_param("?redirect=%zz"), None);
    }

    #[test]
    fn safe_redirect_rejects_foreign_targets() {
        assert_eq!(safe_redirect_target(Some("/rooms")), "/rooms");
        assert_eq!(safe_redirect_target(Some("/users?page=2")), "/users?page=2");
        assert_eq!(safe_redirect_target(None), "/");
        assert_eq!(safe_redirect_target(Some("")), "/");
        assert_eq!(safe_redirect_target(Some("//evil.com")), "/");
        assert_eq!(safe_redirect_target(Some("https://evil.com")), "/");
        assert_eq!(safe_redirect_target(Some("/\\evil.com")), "/");
        assert_eq!(safe_redirect_target(Some("rooms")), "/");
        assert_eq!(safe_redirect_target(Some("/auth/sign-in")), "/");
    }
}
