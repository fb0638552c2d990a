//! 日期类型模块
//!
//! 预订日期在线上以 `YYYY-MM-DD` 传输，但后端偶尔返回完整的 ISO 时间戳
//! (`2024-05-01T00:00:00.000000Z`)。`BookingDate` 统一两种形态。

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// 预订日期（仅日期部分）
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BookingDate(NaiveDate);

impl BookingDate {
    pub fn new(date: NaiveDate) -> Self {
        Self(date)
    }

    /// 解析日期文本
    ///
    /// 接受 `YYYY-MM-DD`，以及以此开头的 ISO 时间戳；其余一律返回 `None`。
    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        let head = raw.get(..10)?;
        if raw.len() > 10 && !raw[10..].starts_with(|c| c == 'T' || c == ' ') {
            return None;
        }
        NaiveDate::parse_from_str(head, DATE_FORMAT).ok().map(Self)
    }

    #[inline]
    pub fn as_naive(&self) -> NaiveDate {
        self.0
    }
}

impl fmt::Display for BookingDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format(DATE_FORMAT))
    }
}

impl From<NaiveDate> for BookingDate {
    fn from(date: NaiveDate) -> Self {
        Self(date)
    }
}

impl Serialize for BookingDate {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for BookingDate {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        BookingDate::parse(&raw)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid booking date: {raw}")))
    }
}

/// 把后端返回的日期文本规范化为 `YYYY-MM-DD`；无法识别时原样保留
pub fn normalize_date_text(raw: &str) -> String {
    match BookingDate::parse(raw) {
        Some(date) => date.to_string(),
        None => raw.trim().to_string(),
    }
}
