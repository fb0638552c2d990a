//! 认证流程
//!
//! 登录与注册都遵循同一约定：接口只返回 Access Token，随后用该 Token
//! 请求 `/auth/me` 获取用户资料，两者都成功后才写入会话存储。
//!
//! 导航不在这里处理：会话写入/清除会触发会话观察者，路由服务监听认证
//! 状态变化并自动跳转。

use crate::api::ApiClient;
use crate::error::ApiError;
use crate::forms::{SignInForm, SignUpForm};
use crate::session::store::SessionStore;
use crate::state::cell::StateCell;
use crate::web::http::HttpClient;
use crate::web::route::{redirect_param, safe_redirect_target};
use crate::web::storage::KeyValueStore;
use simaru_shared::Session;
use std::future::Future;

/// 登录/注册表单的提交状态
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthFormState {
    /// 请求进行中，提交按钮禁用
    pub submitting: bool,
    pub error: Option<String>,
}

impl AuthFormState {
    /// 开始提交；已有请求在进行中时返回 `false`
    pub fn begin(&mut self) -> bool {
        if self.submitting {
            return false;
        }
        self.submitting = true;
        self.error = None;
        true
    }

    pub fn finish<T>(&mut self, result: &Result<T, ApiError>) {
        self.submitting = false;
        self.error = result.as_ref().err().map(ToString::to_string);
    }
}

/// 在提交状态保护下执行请求
///
/// 请求期间 `submitting` 为 `true`，无论成功失败结束后都会恢复。
/// 重复提交直接忽略并返回 `None`。
pub async fn run_guarded<C, T, F>(cell: &C, request: F) -> Option<T>
where
    C: StateCell<AuthFormState>,
    F: Future<Output = Result<T, ApiError>>,
{
    if !cell.mutate(AuthFormState::begin).unwrap_or(false) {
        log::debug!("[Auth] submit ignored, request already in flight");
        return None;
    }
    let result = request.await;
    cell.mutate(|s| s.finish(&result));
    result.ok()
}

/// 用新 Token 拉取资料并写入会话
async fn establish<H: HttpClient, S: KeyValueStore>(
    api: &ApiClient<H, S>,
    access_token: String,
) -> Result<Session, ApiError> {
    let user = api.fetch_profile(&access_token).await?;
    let session = Session { user, access_token };
    if !api.store().write(&session) {
        return Err(ApiError::Unreachable(
            "Could not save your session. Please try again.".to_string(),
        ));
    }
    Ok(session)
}

/// 登录
pub async fn sign_in<H: HttpClient, S: KeyValueStore>(
    api: &ApiClient<H, S>,
    form: &SignInForm,
) -> Result<Session, ApiError> {
    let req = form.to_request()?;
    let token = api.login(&req).await?;
    let session = establish(api, token).await?;
    log::info!("[Auth] signed in as user #{}", session.user.id);
    Ok(session)
}

/// 注册，成功后直接进入登录状态
pub async fn sign_up<H: HttpClient, S: KeyValueStore>(
    api: &ApiClient<H, S>,
    form: &SignUpForm,
) -> Result<Session, ApiError> {
    let req = form.to_request()?;
    let token = api.register(&req).await?;
    let session = establish(api, token).await?;
    log::info!("[Auth] registered user #{}", session.user.id);
    Ok(session)
}

/// 注销
pub fn logout<S: KeyValueStore>(store: &SessionStore<S>) {
    store.clear();
}

/// 登录成功后的目标路径，`search` 为当前地址的查询串
pub fn post_login_target(search: &str) -> String {
    safe_redirect_target(redirect_param(search).as_deref())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::web::http::MockHttpClient;
    use crate::web::storage::MemoryStorage;
    use serde_json::json;
    use simaru_shared::SessionUser;
    use simaru_shared::protocol::HttpMethod;
    use std::cell::RefCell;
    use std::rc::Rc;

    const BASE: &str = "https://api.test";

    fn setup() -> (ApiClient<MockHttpClient, MemoryStorage>, MockHttpClient) {
        let http = MockHttpClient::new();
        let api = ApiClient::new(http.clone(), SessionStore::new(MemoryStorage::new()), BASE);
        (api, http)
    }

    fn credentials() -> SignInForm {
        SignInForm {
            email: "a@b.com".into(),
            password: "secret".into(),
        }
    }

    #[tokio::test]
    async fn sign_in_stores_token_and_profile() {
        let (api, http) = setup();
        http.mock_response(
            HttpMethod::Post,
            &format!("{BASE}/auth/login"),
            200,
            json!({ "accessToken": "tok1" }),
        );
        http.mock_response(
            HttpMethod::Get,
            &format!("{BASE}/auth/me"),
            200,
            json!({ "id": 1, "name": "A", "email": "a@b.com" }),
        );

        let session = sign_in(&api, &credentials()).await.unwrap();

        let expected = Session {
            user: SessionUser {
                id: 1,
                name: "A".into(),
                email: "a@b.com".into(),
                avatar: None,
            },
            access_token: "tok1".into(),
        };
        assert_eq!(session, expected);
        assert_eq!(api.store().read(), Some(expected));

        let profile = http.last_request().unwrap();
        assert_eq!(
            profile.headers.get("Authorization").map(String::as_str),
            Some("Bearer tok1")
        );
    }

    #[tokio::test]
    async fn blank_credentials_never_reach_network() {
        let (api, http) = setup();
        let form = SignInForm {
            email: "a@b.com".into(),
            password: "   ".into(),
        };
        let err = sign_in(&api, &form).await.unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));
        assert!(http.requests.borrow().is_empty());
    }

    #[tokio::test]
    async fn rejected_login_surfaces_server_message() {
        let (api, http) = setup();
        http.mock_response(
            HttpMethod::Post,
            &format!("{BASE}/auth/login"),
            401,
            json!({ "message": "Invalid credentials" }),
        );

        let err = sign_in(&api, &credentials()).await.unwrap_err();
        assert_eq!(err.to_string(), "Invalid credentials");
        assert_eq!(api.store().read(), None);
        assert_eq!(http.count(HttpMethod::Get, &format!("{BASE}/auth/me")), 0);
    }

    #[tokio::test]
    async fn failed_profile_leaves_no_session() {
        let (api, http) = setup();
        http.mock_response(
            HttpMethod::Post,
            &format!("{BASE}/auth/login"),
            200,
            json!({ "accessToken": "tok1" }),
        );
        http.mock_raw(HttpMethod::Get, &format!("{BASE}/auth/me"), 500, "<html>");

        assert!(sign_in(&api, &credentials()).await.is_err());
        assert!(!api.store().has_residue());
    }

    #[tokio::test]
    async fn storage_failure_is_reported() {
        let (api, http) = setup();
        http.mock_response(
            HttpMethod::Post,
            &format!("{BASE}/auth/login"),
            200,
            json!({ "accessToken": "tok1" }),
        );
        http.mock_response(
            HttpMethod::Get,
            &format!("{BASE}/auth/me"),
            200,
            json!({ "id": 1, "name": "A", "email": "a@b.com" }),
        );
        api.store().storage().fail_writes(true);

        let err = sign_in(&api, &credentials()).await.unwrap_err();
        assert!(matches!(err, ApiError::Unreachable(_)));
        assert_eq!(api.store().read(), None);
    }

    #[tokio::test]
    async fn sign_up_follows_the_same_contract() {
        let (api, http) = setup();
        http.mock_response(
            HttpMethod::Post,
            &format!("{BASE}/auth/register"),
            201,
            json!({ "data": { "access_token": "tok2" } }),
        );
        http.mock_response(
            HttpMethod::Get,
            &format!("{BASE}/auth/me"),
            200,
            json!({ "data": { "id": 7, "name": "B", "email": "b@c.com" } }),
        );
        let form = SignUpForm {
            name: "B".into(),
            email: "b@c.com".into(),
            password: "secret".into(),
            password_confirmation: "secret".into(),
        };

        let session = sign_up(&api, &form).await.unwrap();
        assert_eq!(session.access_token, "tok2");
        assert_eq!(api.store().user().map(|u| u.id), Some(7));
    }

    #[tokio::test]
    async fn submit_is_disabled_while_in_flight() {
        let cell = Rc::new(RefCell::new(AuthFormState::default()));

        let observed = cell.clone();
        let value = run_guarded(&cell, async move {
            assert!(observed.borrow().submitting);
            // 请求进行中再次提交会被拒绝
            assert!(!observed.borrow_mut().begin());
            Ok::<_, ApiError>(42)
        })
        .await;

        assert_eq!(value, Some(42));
        assert_eq!(*cell.borrow(), AuthFormState::default());
    }

    #[tokio::test]
    async fn failure_restores_submit_and_keeps_message() {
        let cell = Rc::new(RefCell::new(AuthFormState::default()));
        let value = run_guarded(&cell, async {
            Err::<(), _>(ApiError::validation("Email and password are required"))
        })
        .await;

        assert_eq!(value, None);
        let state = cell.borrow();
        assert!(!state.submitting);
        assert_eq!(state.error.as_deref(), Some("Email and password are required"));
    }

    #[test]
    fn logout_clears_session() {
        let store = SessionStore::new(MemoryStorage::new());
        store.storage().put_raw("accessToken", "tok1");
        logout(&store);
        assert!(!store.has_residue());
    }

    #[test]
    fn post_login_target_honours_safe_redirects() {
        assert_eq!(post_login_target("?redirect=%2Frooms"), "/rooms");
        assert_eq!(post_login_target("?redirect=https://evil.test"), "/");
        assert_eq!(post_login_target("?redirect=%2Fauth%2Fsign-in"), "/");
        assert_eq!(post_login_target(""), "/");
    }
}
