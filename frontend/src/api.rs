//! 资源客户端
//!
//! `ApiClient` 为 rooms / bookings / users 提供统一的 CRUD 接口，并负责
//! 登录、注册与个人资料请求。
//!
//! 所有需要认证的请求在发出之前都会先从会话存储读取 Token；
//! 没有 Token 时直接返回 `ApiError::Unauthenticated`，不会产生网络请求。

use crate::error::ApiError;
use crate::session::store::SessionStore;
use crate::web::http::{HttpClient, HttpRequest};
use crate::web::storage::KeyValueStore;
use serde::{Serialize, de::DeserializeOwned};
use simaru_shared::protocol::{
    HttpMethod, ItemEnvelope, ListEnvelope, PATH_CATEGORIES, PATH_LOGIN, PATH_PROFILE,
    PATH_REGISTER, Page, ProfileEnvelope, Resource, TokenResponse, item_path, list_path,
    parse_categories,
};
use simaru_shared::{Category, HEADER_AUTHORIZATION, LoginRequest, RegisterRequest, SessionUser};


#[derive(Debug, Clone, PartialEq)]
pub struct ApiClient<H, S> {
    http: H,
    store: SessionStore<S>,
    base_url: String,
}

impl<H: HttpClient, S: KeyValueStore> ApiClient<H, S> {
    pub fn new(http: H, store: SessionStore<S>, base_url: &str) -> Self {
        let base_url = base_url.trim_end_matches('/').to_string();
        Self {
            http,
            store,
            base_url,
        }
    }

    pub fn store(&self) -> &SessionStore<S> {
        &self.store
    }

    fn url(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{}", self.base_url, path)
        } else {
            format!("{}/{}", self.base_url, path)
        }
    }

    /// 读取 Bearer Token，无会话时在发请求前失败
    fn bearer(&self) -> Result<String, ApiError> {
        self.store.token().ok_or_else(|| {
            log::warn!("[Api] no session, request not sent");
            ApiError::Unauthenticated
        })
    }

    /// 发送请求并返回成功响应的原始响应体
    async fn send(
        &self,
        method: HttpMethod,
        path: &str,
        token: Option<&str>,
        body: Option<String>,
        fallback: &str,
    ) -> Result<String, ApiError> {
        let mut req =
            HttpRequest::new(&self.url(path), method).with_header("Accept", "application/json");
        if let Some(token) = token {
            req = req.with_header(HEADER_AUTHORIZATION, &format!("Bearer {token}"));
        }
        if let Some(body) = body {
            req = req.with_json_body(body);
        }

        log::debug!("[Api] {} {}", method.as_str(), path);
        let res = self.http.send(req).await.map_err(|e| {
            log::error!("[Api] {} {} failed: {}", method.as_str(), path, e);
            ApiError::unreachable()
        })?;

        if !res.ok() {
            log::warn!("[Api] {} {} -> {}", method.as_str(), path, res.status);
            return Err(ApiError::from_response(res.status, &res.body, fallback));
        }
        Ok(res.body)
    }

    fn encode<T: Serialize>(payload: &T) -> Result<String, ApiError> {
        serde_json::to_string(payload).map_err(|e| {
            log::error!("[Api] failed to encode payload: {e}");
            ApiError::unreachable()
        })
    }

    fn decode<T: DeserializeOwned>(body: &str, what: &str) -> Result<T, ApiError> {
        // 204 等空响应体按空对象处理
        let body = if body.trim().is_empty() { "{}" } else { body };
        serde_json::from_str(body).map_err(|e| {
            log::error!("[Api] unexpected {what} response: {e}");
            ApiError::unreachable()
        })
    }

    // =========================================================
    // 通用 CRUD
    // =========================================================

    /// 获取列表；未提供分页参数时不附带查询串
    pub async fn list<R: Resource>(
        &self,
        page: Option<u32>,
        per_page: Option<u32>,
    ) -> Result<Page<R>, ApiError> {
        let token = self.bearer()?;
        let fallback = format!("Failed to load {}s", R::LABEL);
        let body = self
            .send(
                HttpMethod::Get,
                &list_path::<R>(page, per_page),
                Some(&token),
                None,
                &fallback,
            )
            .await?;
        let envelope: ListEnvelope<R::Wire> = Self::decode(&body, R::LABEL)?;
        Ok(envelope.into_page())
    }

    pub async fn get<R: Resource>(&self, id: u64) -> Result<R, ApiError> {
        let token = self.bearer()?;
        let fallback = format!("Failed to load {}", R::LABEL);
        let body = self
            .send(HttpMethod::Get, &item_path::<R>(id), Some(&token), None, &fallback)
            .await?;
        let envelope: ItemEnvelope<R::Wire> = Self::decode(&body, R::LABEL)?;
        Ok(envelope.into_inner().into())
    }

    pub async fn create<R: Resource>(&self, payload: &R::Payload) -> Result<R, ApiError> {
        let token = self.bearer()?;
        let fallback = format!("Failed to create {}", R::LABEL);
        let body = self
            .send(
                HttpMethod::Post,
                R::PATH,
                Some(&token),
                Some(Self::encode(payload)?),
                &fallback,
            )
            .await?;
        let envelope: ItemEnvelope<R::Wire> = Self::decode(&body, R::LABEL)?;
        log::info!("[Api] {} created", R::LABEL);
        Ok(envelope.into_inner().into())
    }

    pub async fn update<R: Resource>(&self, id: u64, payload: &R::Payload) -> Result<R, ApiError> {
        let token = self.bearer()?;
        let fallback = format!("Failed to update {}", R::LABEL);
        let body = self
            .send(
                HttpMethod::Put,
                &item_path::<R>(id),
                Some(&token),
                Some(Self::encode(payload)?),
                &fallback,
            )
            .await?;
        let envelope: ItemEnvelope<R::Wire> = Self::decode(&body, R::LABEL)?;
        log::info!("[Api] {} #{id} updated", R::LABEL);
        Ok(envelope.into_inner().into())
    }

    /// 删除；已删除的 id 由服务端返回 404，作为错误透出
    pub async fn delete<R: Resource>(&self, id: u64) -> Result<(), ApiError> {
        let token = self.bearer()?;
        let fallback = format!("Failed to delete {}", R::LABEL);
        self.send(HttpMethod::Delete, &item_path::<R>(id), Some(&token), None, &fallback)
            .await?;
        log::info!("[Api] {} #{id} deleted", R::LABEL);
        Ok(())
    }

    /// 房间分类（不分页）
    pub async fn categories(&self) -> Result<Vec<Category>, ApiError> {
        let token = self.bearer()?;
        let body = self
            .send(
                HttpMethod::Get,
                PATH_CATEGORIES,
                Some(&token),
                None,
                "Failed to load categories",
            )
            .await?;
        parse_categories(&body).map_err(|e| {
            log::error!("[Api] unexpected categories response: {e}");
            ApiError::unreachable()
        })
    }

    // =========================================================
    // 认证
    // =========================================================

    /// 登录，返回 Access Token
    pub async fn login(&self, req: &LoginRequest) -> Result<String, ApiError> {
        let body = self
            .send(
                HttpMethod::Post,
                PATH_LOGIN,
                None,
                Some(Self::encode(req)?),
                "Login failed. Please check your email and password.",
            )
            .await?;
        Self::token_from(&body)
    }

    /// 注册，返回 Access Token
    pub async fn register(&self, req: &RegisterRequest) -> Result<String, ApiError> {
        let body = self
            .send(
                HttpMethod::Post,
                PATH_REGISTER,
                None,
                Some(Self::encode(req)?),
                "Registration failed. Please try again.",
            )
            .await?;
        Self::token_from(&body)
    }

    fn token_from(body: &str) -> Result<String, ApiError> {
        let res: TokenResponse = Self::decode(body, "token")?;
        res.into_token().ok_or_else(|| {
            log::error!("[Api] auth response carried no access token");
            ApiError::unreachable()
        })
    }

    /// 用刚拿到的 Token 获取当前用户资料
    pub async fn fetch_profile(&self, token: &str) -> Result<SessionUser, ApiError> {
        let body = self
            .send(
                HttpMethod::Get,
                PATH_PROFILE,
                Some(token),
                None,
                "Failed to load your profile",
            )
            .await?;
        let envelope: ProfileEnvelope = Self::decode(&body, "profile")?;
        let user = SessionUser::from(envelope.into_inner());
        if !user.is_valid() {
            log::error!("[Api] profile response has no usable identity");
            return Err(ApiError::unreachable());
        }
        Ok(user)
    }
}
