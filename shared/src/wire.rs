//! 后端响应形态 (Wire Shapes)
//!
//! 后端字段名与类型并不稳定：id 有时是数字有时是字符串，日期字段是
//! snake_case，可选字段可能缺失或为 `null`。这里的结构体只负责"宽松接收"，
//! 再通过 `From` 转换为领域模型，确保：
//! - 数值字段缺失或非法时回退为 0
//! - 字符串字段缺失时使用显式占位值

use crate::date::normalize_date_text;
use crate::{
    Booking, BookingRoom, BookingUser, Category, PLACEHOLDER_CATEGORY_NAME,
    PLACEHOLDER_DATE, PLACEHOLDER_DESCRIPTION, PLACEHOLDER_EMAIL, PLACEHOLDER_ROOM_NAME,
    PLACEHOLDER_STATUS, PLACEHOLDER_USER_NAME, Room, SessionUser, User, UserStatus,
};
use serde::Deserialize;

// =========================================================
// 宽松反序列化 (Lenient Deserializers)
// =========================================================

pub(crate) mod lenient {
    use serde::{Deserialize, Deserializer};
    use serde_json::Value;

    fn number(value: &Value) -> Option<f64> {
        match value {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse::<f64>().ok(),
            _ => None,
        }
        .filter(|n| n.is_finite())
    }

    pub fn de_f64<'de, D: Deserializer<'de>>(d: D) -> Result<f64, D::Error> {
        let value = Value::deserialize(d)?;
        Ok(number(&value).unwrap_or(0.0))
    }

    pub fn de_u64<'de, D: Deserializer<'de>>(d: D) -> Result<u64, D::Error> {
        let value = Value::deserialize(d)?;
        if let Value::Number(n) = &value {
            if let Some(v) = n.as_u64() {
                return Ok(v);
            }
        }
        Ok(number(&value)
            .filter(|n| *n >= 0.0 && *n <= u64::MAX as f64)
            .map(|n| n as u64)
            .unwrap_or(0))
    }

    pub fn de_u32<'de, D: Deserializer<'de>>(d: D) -> Result<u32, D::Error> {
        let value = de_u64(d)?;
        Ok(u32::try_from(value).unwrap_or(0))
    }

    pub fn de_opt_u32<'de, D: Deserializer<'de>>(d: D) -> Result<Option<u32>, D::Error> {
        let value = Value::deserialize(d)?;
        Ok(number(&value)
            .filter(|n| *n >= 0.0 && *n <= u32::MAX as f64)
            .map(|n| n as u32))
    }

    /// 字符串字段：接受字符串或数字，其余按缺失处理
    pub fn de_opt_string<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
        let value = Value::deserialize(d)?;
        Ok(match value {
            Value::String(s) => Some(s),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        })
    }
}

fn text_or(value: Option<String>, placeholder: &str) -> String {
    match value {
        Some(s) if !s.trim().is_empty() => s,
        _ => placeholder.to_string(),
    }
}

// =========================================================
// 房间 / 分类
// =========================================================

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RoomWire {
    #[serde(default, deserialize_with = "lenient::de_u64")]
    pub id: u64,
    #[serde(default, deserialize_with = "lenient::de_opt_string")]
    pub name: Option<String>,
    #[serde(
        default,
        rename = "categoryId",
        alias = "category_id",
        deserialize_with = "lenient::de_u64"
    )]
    pub category_id: u64,
    #[serde(default, deserialize_with = "lenient::de_f64")]
    pub price: f64,
    #[serde(default, deserialize_with = "lenient::de_u32")]
    pub capacity: u32,
    #[serde(default, deserialize_with = "lenient::de_opt_string")]
    pub description: Option<String>,
}

impl From<RoomWire> for Room {
    fn from(w: RoomWire) -> Self {
        Room {
            id: w.id,
            name: text_or(w.name, PLACEHOLDER_ROOM_NAME),
            category_id: w.category_id,
            price: w.price,
            capacity: w.capacity,
            description: text_or(w.description, PLACEHOLDER_DESCRIPTION),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CategoryWire {
    #[serde(default, deserialize_with = "lenient::de_u64")]
    pub id: u64,
    #[serde(default, deserialize_with = "lenient::de_opt_string")]
    pub name: Option<String>,
}

impl From<CategoryWire> for Category {
    fn from(w: CategoryWire) -> Self {
        Category {
            id: w.id,
            name: text_or(w.name, PLACEHOLDER_CATEGORY_NAME),
        }
    }
}

// =========================================================
// 预订
// =========================================================

#[derive(Debug, Clone, Default, Deserialize)]
pub struct BookingRoomWire {
    #[serde(default, deserialize_with = "lenient::de_opt_string")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient::de_f64")]
    pub price: f64,
    #[serde(default, deserialize_with = "lenient::de_u32")]
    pub capacity: u32,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct BookingUserWire {
    #[serde(default, deserialize_with = "lenient::de_u64")]
    pub id: u64,
    #[serde(default, deserialize_with = "lenient::de_opt_string")]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct BookingWire {
    #[serde(default, deserialize_with = "lenient::de_u64")]
    pub id: u64,
    #[serde(default, alias = "bookingDate", deserialize_with = "lenient::de_opt_string")]
    pub booking_date: Option<String>,
    #[serde(default, alias = "roomId", deserialize_with = "lenient::de_u64")]
    pub room_id: u64,
    #[serde(default, alias = "userId", deserialize_with = "lenient::de_u64")]
    pub user_id: u64,
    #[serde(default, deserialize_with = "lenient::de_opt_string")]
    pub status: Option<String>,
    #[serde(default)]
    pub room: Option<BookingRoomWire>,
    #[serde(default)]
    pub user: Option<BookingUserWire>,
}

impl From<BookingWire> for Booking {
    fn from(w: BookingWire) -> Self {
        let booking_date = match w.booking_date {
            Some(raw) if !raw.trim().is_empty() => normalize_date_text(&raw),
            _ => PLACEHOLDER_DATE.to_string(),
        };
        Booking {
            id: w.id,
            booking_date,
            room_id: w.room_id,
            user_id: w.user_id,
            status: text_or(w.status, PLACEHOLDER_STATUS),
            room: w.room.map(|r| BookingRoom {
                name: text_or(r.name, PLACEHOLDER_ROOM_NAME),
                price: r.price,
                capacity: r.capacity,
            }),
            user: w.user.map(|u| BookingUser {
                id: u.id,
                name: text_or(u.name, PLACEHOLDER_USER_NAME),
            }),
        }
    }
}

// =========================================================
// 用户
// =========================================================

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserWire {
    #[serde(default, deserialize_with = "lenient::de_u64")]
    pub id: u64,
    #[serde(default, deserialize_with = "lenient::de_opt_string")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient::de_opt_string")]
    pub email: Option<String>,
    #[serde(default, deserialize_with = "lenient::de_opt_string")]
    pub status: Option<String>,
    #[serde(default, alias = "createdAt", deserialize_with = "lenient::de_opt_string")]
    pub created_at: Option<String>,
    #[serde(default, alias = "updatedAt", deserialize_with = "lenient::de_opt_string")]
    pub updated_at: Option<String>,
}

impl From<UserWire> for User {
    fn from(w: UserWire) -> Self {
        User {
            id: w.id,
            name: text_or(w.name, PLACEHOLDER_USER_NAME),
            email: text_or(w.email, PLACEHOLDER_EMAIL),
            status: w
                .status
                .as_deref()
                .map(UserStatus::parse_lenient)
                .unwrap_or_default(),
            created_at: text_or(w.created_at, PLACEHOLDER_DATE),
            updated_at: text_or(w.updated_at, PLACEHOLDER_DATE),
        }
    }
}

/// `/auth/me` 返回的个人资料
///
/// 与列表实体不同，这里不填充占位值：缺失的姓名/邮箱保留为空，
/// 交给 `SessionUser::is_valid` 判定。
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProfileWire {
    #[serde(default, deserialize_with = "lenient::de_u64")]
    pub id: u64,
    #[serde(default, deserialize_with = "lenient::de_opt_string")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient::de_opt_string")]
    pub email: Option<String>,
    #[serde(
        default,
        alias = "img",
        alias = "avatar_url",
        deserialize_with = "lenient::de_opt_string"
    )]
    pub avatar: Option<String>,
}

impl From<ProfileWire> for SessionUser {
    fn from(w: ProfileWire) -> Self {
        SessionUser {
            id: w.id,
            name: w.name.unwrap_or_default(),
            email: w.email.unwrap_or_default(),
            avatar: w.avatar.filter(|a| !a.trim().is_empty()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn room(value: serde_json::Value) -> Room {
        serde_json::from_value::<RoomWire>(value).unwrap().into()
    }

    #[test]
    fn room_coerces_numeric_strings() {
        let r = room(json!({
            "id": 4,
            "name": "Room A",
            "categoryId": "2",
            "price": "150000.50",
            "capacity": "12",
            "description": "x"
        }));
        assert_eq!(r.category_id, 2);
        assert_eq!(r.price, 150000.5);
        assert_eq!(r.capacity, 12);
    }

    #[test]
    fn room_fills_placeholders_and_zeroes() {
        let r = room(json!({ "id": 9, "name": null, "price": "abc", "capacity": null }));
        assert_eq!(r.name, PLACEHOLDER_ROOM_NAME);
        assert_eq!(r.description, PLACEHOLDER_DESCRIPTION);
        assert_eq!(r.category_id, 0);
        assert_eq!(r.price, 0.0);
        assert_eq!(r.capacity, 0);
    }

    #[test]
    fn room_accepts_snake_case_category() {
        let r = room(json!({ "id": 1, "category_id": 3 }));
        assert_eq!(r.category_id, 3);
    }

    #[test]
    fn booking_translates_snake_case_and_normalizes_date() {
        let wire: BookingWire = serde_json::from_value(json!({
            "id": 5,
            "booking_date": "2024-05-01T00:00:00.000000Z",
            "room_id": "3",
            "user_id": 7,
            "status": "pending",
            "room": { "name": "Aula", "price": 1000, "capacity": 50 },
            "user": { "id": 7, "name": "Budi" }
        }))
        .unwrap();
        let b: Booking = wire.into();
        assert_eq!(b.booking_date, "2024-05-01");
        assert_eq!(b.room_id, 3);
        assert_eq!(b.user_id, 7);
        assert_eq!(b.room.unwrap().name, "Aula");
        assert_eq!(b.user.unwrap().name, "Budi");
    }

    #[test]
    fn booking_without_optional_parts() {
        let wire: BookingWire = serde_json::from_value(json!({ "id": 1 })).unwrap();
        let b: Booking = wire.into();
        assert_eq!(b.booking_date, PLACEHOLDER_DATE);
        assert_eq!(b.status, PLACEHOLDER_STATUS);
        assert!(b.room.is_none());
        assert!(b.user.is_none());
    }

    #[test]
    fn user_status_defaults_to_active() {
        let wire: UserWire = serde_json::from_value(json!({
            "id": 2,
            "name": "B",
            "email": "b@c.com",
            "created_at": "2024-01-01",
            "updated_at": "2024-01-02"
        }))
        .unwrap();
        let u: User = wire.into();
        assert_eq!(u.status, UserStatus::Active);
        assert_eq!(u.created_at, "2024-01-01");
    }

    #[test]
    fn profile_keeps_missing_identity_empty() {
        let wire: ProfileWire = serde_json::from_value(json!({ "id": "1", "img": "" })).unwrap();
        let user: SessionUser = wire.into();
        assert_eq!(user.id, 1);
        assert!(user.name.is_empty());
        assert!(user.avatar.is_none());
        assert!(!user.is_valid());
    }
}
