//! 应用配置
//!
//! 前端没有运行时环境变量，所有配置在编译期通过 `option_env!` 注入，
//! 未设置时使用默认值。

/// 后端 API 根地址
const DEFAULT_API_BASE_URL: &str = "https://simaru.amisbudi.cloud/api";
const DEFAULT_PER_PAGE: u32 = 10;
const DEFAULT_NOTIFICATION_MS: u32 = 3000;

/// 列表可选的每页条数
pub const PAGE_SIZE_OPTIONS: [u32; 4] = [5, 10, 20, 50];

/// 新建用户时默认分配的角色
pub const DEFAULT_ROLE_ID: u64 = 2;

/// 头像缺失时使用的占位图
pub const AVATAR_PLACEHOLDER: &str = "/images/user/user-03.png";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub api_base_url: String,
    pub default_per_page: u32,
    /// 通知自动消失的延迟（毫秒）
    pub notification_ms: u32,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            default_per_page: DEFAULT_PER_PAGE,
            notification_ms: DEFAULT_NOTIFICATION_MS,
        }
    }
}

impl AppConfig {
    /// 读取编译期配置
    pub fn from_env() -> Self {
        Self::from_values(
            option_env!("SIMARU_API_BASE_URL"),
            option_env!("SIMARU_DEFAULT_PER_PAGE"),
            option_env!("SIMARU_NOTIFICATION_MS"),
        )
    }

    fn from_values(base_url: Option<&str>, per_page: Option<&str>, notification_ms: Option<&str>) -> Self {
        let defaults = Self::default();

        let api_base_url = base_url
            .map(|u| u.trim().trim_end_matches('/'))
            .filter(|u| !u.is_empty())
            .map(str::to_string)
            .unwrap_or(defaults.api_base_url);

        let default_per_page = match per_page.map(|v| v.trim().parse::<u32>()) {
            Some(Ok(n)) if PAGE_SIZE_OPTIONS.contains(&n) => n,
            Some(_) => {
                log::warn!("[Config] SIMARU_DEFAULT_PER_PAGE must be one of {PAGE_SIZE_OPTIONS:?}");
                defaults.default_per_page
            }
            None => defaults.default_per_page,
        };

        let notification_ms = notification_ms
            .and_then(|v| v.trim().parse::<u32>().ok())
            .unwrap_or(defaults.notification_ms);

        Self {
            api_base_url,
            default_per_page,
            notification_ms,
        }
    }
}
