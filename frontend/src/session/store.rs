//! 会话存储
//!
//! 会话是否存在的唯一依据是持久化存储本身。其他标签页随时可能修改它，
//! 因此这里不缓存任何内存状态，每次读取都回到存储。

use crate::web::storage::KeyValueStore;
use simaru_shared::wire::ProfileWire;
use simaru_shared::{STORAGE_TOKEN_KEY, STORAGE_USER_KEY, Session, SessionUser};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionStore<S> {
    storage: S,
}

impl<S: KeyValueStore> SessionStore<S> {
    pub fn new(storage: S) -> Self {
        Self { storage }
    }

    #[cfg(test)]
    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// 读取当前会话
    ///
    /// 用户记录和 Token 必须同时有效才返回会话。用户记录无法解析时视为
    /// 损坏数据，两个键一并清除。
    pub fn read(&self) -> Option<Session> {
        let raw_user = self.storage.get(STORAGE_USER_KEY);
        let token = self
            .storage
            .get(STORAGE_TOKEN_KEY)
            .filter(|t| !t.trim().is_empty());

        let raw_user = raw_user?;
        let user = match serde_json::from_str::<ProfileWire>(&raw_user) {
            Ok(wire) => SessionUser::from(wire),
            Err(e) => {
                log::warn!("[Session] stored user record is corrupt, clearing: {e}");
                self.clear();
                return None;
            }
        };

        if !user.is_valid() {
            return None;
        }

        Some(Session {
            user,
            access_token: token?,
        })
    }

    pub fn token(&self) -> Option<String> {
        self.read().map(|s| s.access_token)
    }

    pub fn user(&self) -> Option<SessionUser> {
        self.read().map(|s| s.user)
    }

    /// 存储中是否残留了任意一半会话数据
    pub fn has_residue(&self) -> bool {
        self.storage.get(STORAGE_USER_KEY).is_some() || self.storage.get(STORAGE_TOKEN_KEY).is_some()
    }

    /// 写入会话
    ///
    /// 先移除旧的用户记录，再写 Token，最后写用户记录。读者只有在用户记录
    /// 出现后才会认为已登录，此时新 Token 一定已经就位，不会读到旧用户配新
    /// Token 的组合。任何一步失败都会回滚，保证不会留下半个会话。
    pub fn write(&self, session: &Session) -> bool {
        let user_json = match serde_json::to_string(&session.user) {
            Ok(json) => json,
            Err(e) => {
                log::error!("[Session] failed to serialize user: {e}");
                return false;
            }
        };

        self.storage.remove(STORAGE_USER_KEY);
        if !self.storage.set(STORAGE_TOKEN_KEY, &session.access_token) {
            log::error!("[Session] failed to persist access token");
            self.clear();
            return false;
        }
        if !self.storage.set(STORAGE_USER_KEY, &user_json) {
            log::error!("[Session] failed to persist user record");
            self.clear();
            return false;
        }

        log::info!("[Session] session stored for user #{}", session.user.id);
        self.storage.announce_change();
        true
    }

    /// 清除会话并通知本标签页
    pub fn clear(&self) {
        self.storage.remove(STORAGE_USER_KEY);
        self.storage.remove(STORAGE_TOKEN_KEY);
        log::info!("[Session] session cleared");
        self.storage.announce_change();
    }
}
