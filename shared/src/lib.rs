use serde::{Deserialize, Serialize};

pub mod date;
pub mod protocol;
pub mod wire;

pub use date::BookingDate;

// =========================================================
// 常量定义 (Constants)
// =========================================================

/// 浏览器持久化存储中保存用户记录 (JSON) 的键
pub const STORAGE_USER_KEY: &str = "user";
/// 浏览器持久化存储中保存 Bearer Token 的键
pub const STORAGE_TOKEN_KEY: &str = "accessToken";

pub const HEADER_AUTHORIZATION: &str = "Authorization";

/// 字符串字段缺失时使用的占位值，保证列表永远不会渲染出空洞
pub const PLACEHOLDER_ROOM_NAME: &str = "Unnamed Room";
pub const PLACEHOLDER_DESCRIPTION: &str = "No description";
pub const PLACEHOLDER_CATEGORY_NAME: &str = "Unnamed Category";
pub const PLACEHOLDER_USER_NAME: &str = "Unnamed";
pub const PLACEHOLDER_EMAIL: &str = "No email";
pub const PLACEHOLDER_STATUS: &str = "unknown";
pub const PLACEHOLDER_DATE: &str = "-";

// =========================================================
// 会话模型 (Session)
// =========================================================

/// 当前登录用户的身份投影
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionUser {
    pub id: u64,
    pub name: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
}

impl SessionUser {
    /// 一个可用的用户记录必须有服务端分配的 id，且姓名或邮箱至少一项非空
    pub fn is_valid(&self) -> bool {
        self.id != 0 && !(self.name.trim().is_empty() && self.email.trim().is_empty())
    }

    pub fn display_name(&self) -> &str {
        if self.name.trim().is_empty() {
            &self.email
        } else {
            &self.name
        }
    }
}

/// 本地持久化的认证凭据
///
/// 用户记录与 Token 必须同时存在才构成会话；任何一半缺失都视为未登录。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub user: SessionUser,
    pub access_token: String,
}

// =========================================================
// 领域模型 (Domain Models)
// =========================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Room {
    pub id: u64,
    pub name: String,
    pub category_id: u64,
    pub price: f64,
    pub capacity: u32,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: u64,
    pub name: String,
}

/// 预订中内嵌的房间摘要
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookingRoom {
    pub name: String,
    pub price: f64,
    pub capacity: u32,
}

/// 预订中内嵌的预订人摘要
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookingUser {
    pub id: u64,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Booking {
    pub id: u64,
    /// 规范化后的 `YYYY-MM-DD`，无法解析时保留原文
    pub booking_date: String,
    pub room_id: u64,
    pub user_id: u64,
    pub status: String,
    pub room: Option<BookingRoom>,
    pub user: Option<BookingUser>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserStatus {
    #[default]
    Active,
    Inactive,
}

impl UserStatus {
    /// 宽松解析：只有明确的 "inactive" 才是停用，其余一律按激活处理
    pub fn parse_lenient(raw: &str) -> Self {
        if raw.trim().eq_ignore_ascii_case("inactive") {
            UserStatus::Inactive
        } else {
            UserStatus::Active
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            UserStatus::Active => "active",
            UserStatus::Inactive => "inactive",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: u64,
    pub name: String,
    pub email: String,
    pub status: UserStatus,
    pub created_at: String,
    pub updated_at: String,
}

// =========================================================
// 写操作载荷 (Mutation Payloads)
// =========================================================

/// 房间写入载荷，后端使用 camelCase
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomPayload {
    pub name: String,
    pub category_id: u64,
    pub price: f64,
    pub capacity: u32,
    pub description: String,
}

/// 预订写入载荷，后端使用 snake_case
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookingPayload {
    pub booking_date: String,
    pub room_id: u64,
    pub user_id: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserPayload {
    pub name: String,
    pub email: String,
    /// 更新时留空表示不修改密码
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    pub role_id: u64,
    pub status: UserStatus,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    pub password_confirmation: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_user_requires_id_and_identity() {
        let mut user = SessionUser {
            id: 1,
            name: "A".into(),
            email: "a@b.com".into(),
            avatar: None,
        };
        assert!(user.is_valid());

        user.id = 0;
        assert!(!user.is_valid());

        user.id = 1;
        user.name = " ".into();
        user.email = String::new();
        assert!(!user.is_valid());
    }

    #[test]
    fn display_name_falls_back_to_email() {
        let user = SessionUser {
            id: 1,
            name: String::new(),
            email: "a@b.com".into(),
            avatar: None,
        };
        assert_eq!(user.display_name(), "a@b.com");
    }

    #[test]
    fn user_status_parse_is_lenient() {
        assert_eq!(UserStatus::parse_lenient("INACTIVE"), UserStatus::Inactive);
        assert_eq!(UserStatus::parse_lenient("banned"), UserStatus::Active);
        assert_eq!(UserStatus::parse_lenient(""), UserStatus::Active);
    }

    #[test]
    fn payloads_use_backend_field_names() {
        let room = RoomPayload {
            name: "Room A".into(),
            category_id: 2,
            price: 100000.0,
            capacity: 10,
            description: "x".into(),
        };
        let json = serde_json::to_value(&room).unwrap();
        assert_eq!(json["categoryId"], 2);

        let booking = BookingPayload {
            booking_date: "2024-05-01".into(),
            room_id: 3,
            user_id: 7,
        };
        let json = serde_json::to_value(&booking).unwrap();
        assert_eq!(json["booking_date"], "2024-05-01");
        assert_eq!(json["room_id"], 3);
        assert_eq!(json["user_id"], 7);

        let user = UserPayload {
            name: "B".into(),
            email: "b@c.com".into(),
            password: None,
            role_id: 2,
            status: UserStatus::Inactive,
        };
        let json = serde_json::to_value(&user).unwrap();
        assert_eq!(json["roleId"], 2);
        assert_eq!(json["status"], "inactive");
        assert!(json.get("password").is_none());
    }
}
