//! HTTP 请求封装模块
//!
//! 资源客户端只依赖 `HttpClient` trait：
//! - `FetchHttpClient`: 生产实现，基于 `gloo-net` 的 fetch
//! - `MockHttpClient`: 测试实现，按 "方法 + URL" 排队返回预设响应并记录请求

use simaru_shared::protocol::HttpMethod;
use std::collections::HashMap;

// =========================================================
// 核心抽象层 (HTTP Interface Abstraction)
// =========================================================

/// HTTP 错误类型
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum HttpError {
    /// 请求构建失败
    #[error("请求构建失败: {0}")]
    RequestBuildFailed(String),
    /// 网络请求失败
    #[error("网络错误: {0}")]
    NetworkError(String),
    /// 响应体读取失败
    #[error("响应解析失败: {0}")]
    ResponseParseFailed(String),
}

/// 通用 HTTP 请求结构
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub url: String,
    pub method: HttpMethod,
    pub headers: HashMap<String, String>,
    pub body: Option<String>,
}

impl HttpRequest {
    pub fn new(url: &str, method: HttpMethod) -> Self {
        Self {
            url: url.to_string(),
            method,
            headers: HashMap::new(),
            body: None,
        }
    }

    pub fn with_header(mut self, key: &str, value: &str) -> Self {
        self.headers.insert(key.to_string(), value.to_string());
        self
    }

    pub fn with_json_body(mut self, body: String) -> Self {
        self.headers
            .insert("Content-Type".to_string(), "application/json".to_string());
        self.body = Some(body);
        self
    }
}

/// 通用 HTTP 响应结构
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    /// 检查响应是否成功 (2xx)
    pub fn ok(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// HTTP 客户端特性 (Trait)
///
/// (?Send) 是因为浏览器中的 fetch future 不是 Send 的
#[async_trait::async_trait(?Send)]
pub trait HttpClient {
    async fn send(&self, req: HttpRequest) -> Result<HttpResponse, HttpError>;
}

// =========================================================
// 实现层: 浏览器 fetch (Production)
// =========================================================

#[derive(Debug, Clone, Copy, Default)]
pub struct FetchHttpClient;

#[async_trait::async_trait(?Send)]
impl HttpClient for FetchHttpClient {
    async fn send(&self, req: HttpRequest) -> Result<HttpResponse, HttpError> {
        use gloo_net::http::{Method, RequestBuilder};

        let method = match req.method {
            HttpMethod::Get => Method::GET,
            HttpMethod::Post => Method::POST,
            HttpMethod::Put => Method::PUT,
            HttpMethod::Delete => Method::DELETE,
        };

        let mut builder = RequestBuilder::new(&req.url).method(method);
        for (k, v) in &req.headers {
            builder = builder.header(k, v);
        }

        let request = match req.body {
            Some(body) => builder.body(body),
            None => builder.build(),
        }
        .map_err(|e| HttpError::RequestBuildFailed(e.to_string()))?;

        let response = request
            .send()
            .await
            .map_err(|e| HttpError::NetworkError(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| HttpError::ResponseParseFailed(e.to_string()))?;

        Ok(HttpResponse { status, body })
    }
}

// =========================================================
// 实现层: Mock 客户端 (Test)
// =========================================================

#[cfg(test)]
pub use mock::MockHttpClient;

#[cfg(test)]
mod mock {
    use super::*;
    use std::cell::RefCell;
    use std::collections::VecDeque;
    use std::rc::Rc;

    /// 预设响应：HTTP 响应或传输层错误
    type Canned = Result<HttpResponse, HttpError>;

    /// Mock HTTP 客户端
    ///
    /// 同一 "方法 + URL" 可以排队多个响应，按顺序消费；最后一个响应会被
    /// 重复使用。未预设的请求返回 404。
    #[derive(Clone, Default)]
    pub struct MockHttpClient {
        responses: Rc<RefCell<HashMap<String, VecDeque<Canned>>>>,
        pub requests: Rc<RefCell<Vec<HttpRequest>>>,
    }

    fn route_key(method: HttpMethod, url: &str) -> String {
        format!("{} {}", method.as_str(), url)
    }

    impl MockHttpClient {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn mock_response(&self, method: HttpMethod, url: &str, status: u16, body: serde_json::Value) {
            self.mock_raw(method, url, status, &body.to_string());
        }

        pub fn mock_raw(&self, method: HttpMethod, url: &str, status: u16, body: &str) {
            self.push(
                method,
                url,
                Ok(HttpResponse {
                    status,
                    body: body.to_string(),
                }),
            );
        }

        pub fn mock_network_error(&self, method: HttpMethod, url: &str) {
            self.push(
                method,
                url,
                Err(HttpError::NetworkError("connection refused".into())),
            );
        }

        fn push(&self, method: HttpMethod, url: &str, canned: Canned) {
            self.responses
                .borrow_mut()
                .entry(route_key(method, url))
                .or_default()
                .push_back(canned);
        }

        /// 已发送的请求数量（按方法 + URL 过滤）
        pub fn count(&self, method: HttpMethod, url: &str) -> usize {
            self.requests
                .borrow()
                .iter()
                .filter(|r| r.method == method && r.url == url)
                .count()
        }

        pub fn last_request(&self) -> Option<HttpRequest> {
            self.requests.borrow().last().cloned()
        }
    }

    #[async_trait::async_trait(?Send)]
    impl HttpClient for MockHttpClient {
        async fn send(&self, req: HttpRequest) -> Result<HttpResponse, HttpError> {
            let key = route_key(req.method, &req.url);
            self.requests.borrow_mut().push(req);

            let mut responses = self.responses.borrow_mut();
            match responses.get_mut(&key) {
                Some(queue) if queue.len() > 1 => queue.pop_front().unwrap_or_else(not_found),
                Some(queue) => queue.front().cloned().unwrap_or_else(not_found),
                None => not_found(),
            }
        }
    }

    fn not_found() -> Canned {
        Ok(HttpResponse {
            status: 404,
            body: r#"{"message":"Not found"}"#.to_string(),
        })
    }
}
