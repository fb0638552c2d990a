//! 错误类型
//!
//! 所有面向用户的失败都收敛到 `ApiError`，视图层只需要调用 `to_string()`
//! 即可得到可以直接展示的文本。

use simaru_shared::protocol::ErrorBody;

/// 网络不可达或响应无法解析时的通用提示
pub const GENERIC_FAILURE: &str = "Something went wrong. Please try again.";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ApiError {
    /// 本地没有有效会话，请求不会发出
    #[error("Your session has expired. Please sign in again.")]
    Unauthenticated,
    /// 表单校验失败，请求不会发出
    #[error("{0}")]
    Validation(String),
    /// 服务端返回了非 2xx 状态
    #[error("{message}")]
    Remote { status: u16, message: String },
    /// 网络失败或响应体无法解析
    #[error("{0}")]
    Unreachable(String),
}

impl ApiError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn unreachable() -> Self {
        Self::Unreachable(GENERIC_FAILURE.to_string())
    }

    /// 由非 2xx 响应构造错误
    ///
    /// JSON 错误体中的 `message`/`error` 原样透出；否则使用调用方提供的
    /// 按操作区分的兜底文本。
    pub fn from_response(status: u16, body: &str, fallback: &str) -> Self {
        let message = serde_json::from_str::<ErrorBody>(body)
            .ok()
            .and_then(ErrorBody::into_message)
            .unwrap_or_else(|| fallback.to_string());
        Self::Remote { status, message }
    }

    #[cfg(test)]
    pub fn is_unauthenticated(&self) -> bool {
        matches!(self, Self::Unauthenticated)
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Remote { status, .. } => Some(*status),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_message_is_surfaced() {
        let err = ApiError::from_response(422, r#"{"message":"Email taken"}"#, "Failed");
        assert_eq!(
            err,
            ApiError::Remote {
                status: 422,
                message: "Email taken".into()
            }
        );
        assert_eq!(err.to_string(), "Email taken");
    }

    #[test]
    fn error_field_is_used_when_message_missing() {
        let err = ApiError::from_response(400, r#"{"error":"Bad date"}"#, "Failed");
        assert_eq!(err.to_string(), "Bad date");
    }

    #[test]
    fn non_json_body_falls_back() {
        let err = ApiError::from_response(500, "<html>Internal Server Error</html>", "Failed to load rooms");
        assert_eq!(err.to_string(), "Failed to load rooms");
        assert_eq!(err.status(), Some(500));

        let err = ApiError::from_response(502, "", "Failed to load rooms");
        assert_eq!(err.to_string(), "Failed to load rooms");
    }

    #[test]
    fn unauthenticated_has_a_readable_message() {
        assert!(ApiError::Unauthenticated.is_unauthenticated());
        assert!(!ApiError::Unauthenticated.to_string().is_empty());
    }
}
