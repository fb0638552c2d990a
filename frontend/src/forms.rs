//! 表单状态与校验
//!
//! 表单结构体只保存用户输入的原始文本，`to_payload` 在发出任何请求之前
//! 完成必填项与格式校验，失败时返回 `ApiError::Validation`。

use crate::config::DEFAULT_ROLE_ID;
use crate::error::ApiError;
use simaru_shared::{
    Booking, BookingDate, BookingPayload, LoginRequest, RegisterRequest, Room, RoomPayload,
    SessionUser, User, UserPayload, UserStatus,
};

fn required(value: &str) -> Option<String> {
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_string())
}

fn looks_like_email(value: &str) -> bool {
    match value.split_once('@') {
        Some((local, domain)) => !local.is_empty() && domain.contains('.') && !domain.starts_with('.'),
        None => false,
    }
}

// =========================================================
// 认证表单
// =========================================================

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SignInForm {
    pub email: String,
    pub password: String,
}

impl SignInForm {
    pub fn to_request(&self) -> Result<LoginRequest, ApiError> {
        match (required(&self.email), required(&self.password)) {
            (Some(email), Some(_)) => Ok(LoginRequest {
                email,
                // 密码原样提交，不做裁剪
                password: self.password.clone(),
            }),
            _ => Err(ApiError::validation("Email and password are required")),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SignUpForm {
    pub name: String,
    pub email: String,
    pub password: String,
    pub password_confirmation: String,
}

impl SignUpForm {
    pub fn to_request(&self) -> Result<RegisterRequest, ApiError> {
        let (Some(name), Some(email), Some(_), Some(_)) = (
            required(&self.name),
            required(&self.email),
            required(&self.password),
            required(&self.password_confirmation),
        ) else {
            return Err(ApiError::validation("All fields are required"));
        };
        if !looks_like_email(&email) {
            return Err(ApiError::validation("Please enter a valid email address"));
        }
        if self.password != self.password_confirmation {
            return Err(ApiError::validation("Passwords do not match"));
        }
        Ok(RegisterRequest {
            name,
            email,
            password: self.password.clone(),
            password_confirmation: self.password_confirmation.clone(),
        })
    }
}

// =========================================================
// 房间
// =========================================================

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RoomForm {
    pub name: String,
    pub category_id: String,
    pub price: String,
    pub capacity: String,
    pub description: String,
}

impl From<&Room> for RoomForm {
    fn from(room: &Room) -> Self {
        Self {
            name: room.name.clone(),
            category_id: room.category_id.to_string(),
            price: room.price.to_string(),
            capacity: room.capacity.to_string(),
            description: room.description.clone(),
        }
    }
}

impl RoomForm {
    pub fn to_payload(&self) -> Result<RoomPayload, ApiError> {
        let (Some(name), Some(category), Some(price), Some(capacity), Some(description)) = (
            required(&self.name),
            required(&self.category_id),
            required(&self.price),
            required(&self.capacity),
            required(&self.description),
        ) else {
            return Err(ApiError::validation("All fields are required"));
        };

        let category_id = category
            .parse::<u64>()
            .ok()
            .filter(|id| *id > 0)
            .ok_or_else(|| ApiError::validation("Please choose a category"))?;
        let price = price
            .parse::<f64>()
            .ok()
            .filter(|p| p.is_finite() && *p >= 0.0)
            .ok_or_else(|| ApiError::validation("Price must be a non-negative number"))?;
        let capacity = capacity
            .parse::<u32>()
            .ok()
            .filter(|c| *c > 0)
            .ok_or_else(|| ApiError::validation("Capacity must be a positive whole number"))?;

        Ok(RoomPayload {
            name,
            category_id,
            price,
            capacity,
            description,
        })
    }
}

// =========================================================
// 预订
// =========================================================

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BookingForm {
    /// `YYYY-MM-DD`
    pub booking_date: String,
    pub room_id: String,
}

impl From<&Booking> for BookingForm {
    fn from(booking: &Booking) -> Self {
        Self {
            booking_date: BookingDate::parse(&booking.booking_date)
                .map(|d| d.to_string())
                .unwrap_or_default(),
            room_id: booking.room_id.to_string(),
        }
    }
}

impl BookingForm {
    /// 预订人 id 取自正在编辑的预订，否则取当前登录用户；两者都没有时
    /// 拒绝提交，绝不在客户端生成 id。
    pub fn to_payload(
        &self,
        session_user: Option<&SessionUser>,
        editing: Option<&Booking>,
    ) -> Result<BookingPayload, ApiError> {
        let (Some(date), Some(room)) = (required(&self.booking_date), required(&self.room_id))
        else {
            return Err(ApiError::validation("All fields are required"));
        };

        let booking_date = BookingDate::parse(&date)
            .ok_or_else(|| ApiError::validation("Booking date must be in YYYY-MM-DD format"))?;
        let room_id = room
            .parse::<u64>()
            .ok()
            .filter(|id| *id > 0)
            .ok_or_else(|| ApiError::validation("Please choose a room"))?;

        let user_id = editing
            .map(|b| b.user_id)
            .filter(|id| *id != 0)
            .or_else(|| session_user.map(|u| u.id).filter(|id| *id != 0))
            .ok_or(ApiError::Unauthenticated)?;

        Ok(BookingPayload {
            booking_date: booking_date.to_string(),
            room_id,
            user_id,
        })
    }
}

// =========================================================
// 用户
// =========================================================

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserForm {
    pub name: String,
    pub email: String,
    /// 编辑时留空表示不修改密码
    pub password: String,
    pub status: UserStatus,
}

impl From<&User> for UserForm {
    fn from(user: &User) -> Self {
        Self {
            name: user.name.clone(),
            email: user.email.clone(),
            password: String::new(),
            status: user.status,
        }
    }
}

impl UserForm {
    pub fn to_payload(&self, is_edit: bool) -> Result<UserPayload, ApiError> {
        let (Some(name), Some(email)) = (required(&self.name), required(&self.email)) else {
            return Err(ApiError::validation("Name and email are required"));
        };
        if !looks_like_email(&email) {
            return Err(ApiError::validation("Please enter a valid email address"));
        }

        let password = match required(&self.password) {
            Some(_) => Some(self.password.clone()),
            None if is_edit => None,
            None => return Err(ApiError::validation("Password is required for new users")),
        };

        Ok(UserPayload {
            name,
            email,
            password,
            role_id: DEFAULT_ROLE_ID,
            status: self.status,
        })
    }
}
