//! 会话观察者
//!
//! 让界面与会话保持同步：
//! - 其他标签页的修改通过浏览器原生 `storage` 事件到达
//! - 本标签页的修改通过 `local-user-change` 自定义事件到达
//!
//! `SessionObserver` 本身与浏览器无关，`use_session_user` 负责把它接到
//! window 事件与 Leptos 信号上。

use super::store::SessionStore;
use crate::web::storage::{BrowserStorage, KeyValueStore, LOCAL_CHANGE_EVENT};
use leptos::prelude::*;
use simaru_shared::{STORAGE_TOKEN_KEY, STORAGE_USER_KEY, SessionUser};
use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

type Callback = Rc<dyn Fn(Option<&SessionUser>)>;

struct Inner<S> {
    store: SessionStore<S>,
    current: RefCell<Option<SessionUser>>,
    subscribers: RefCell<Vec<(usize, Callback)>>,
    next_id: Cell<usize>,
}

/// 会话观察者
///
/// 克隆共享同一份订阅列表。
pub struct SessionObserver<S> {
    inner: Rc<Inner<S>>,
}

impl<S> Clone for SessionObserver<S> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<S: KeyValueStore + 'static> SessionObserver<S> {
    pub fn new(store: SessionStore<S>) -> Self {
        let current = store.user();
        Self {
            inner: Rc::new(Inner {
                store,
                current: RefCell::new(current),
                subscribers: RefCell::new(Vec::new()),
                next_id: Cell::new(0),
            }),
        }
    }

    pub fn current(&self) -> Option<SessionUser> {
        self.inner.current.borrow().clone()
    }

    #[cfg(test)]
    pub fn is_logged_in(&self) -> bool {
        self.inner.current.borrow().is_some()
    }

    /// 订阅会话变化
    ///
    /// 订阅时立即重新读取存储并回调一次。返回的 `Subscription` 被 drop 时
    /// 自动退订。
    pub fn subscribe(&self, callback: impl Fn(Option<&SessionUser>) + 'static) -> Subscription {
        let id = self.inner.next_id.get();
        self.inner.next_id.set(id + 1);

        self.refresh();

        let callback: Callback = Rc::new(callback);
        callback(self.current().as_ref());
        self.inner
            .subscribers
            .borrow_mut()
            .push((id, callback));

        let inner: Rc<dyn Unsubscribe> = self.inner.clone();
        Subscription {
            id,
            owner: Rc::downgrade(&inner),
        }
    }

    #[cfg(test)]
    pub fn subscriber_count(&self) -> usize {
        self.inner.subscribers.borrow().len()
    }

    /// 处理原生 `storage` 事件
    ///
    /// `key` 为 `None` 表示对方调用了 `localStorage.clear()`。
    pub fn handle_storage_event(&self, key: Option<&str>) -> bool {
        match key {
            None | Some(STORAGE_USER_KEY) | Some(STORAGE_TOKEN_KEY) => self.refresh(),
            Some(_) => false,
        }
    }

    /// 处理本标签页的自定义事件
    pub fn handle_local_change(&self) -> bool {
        self.refresh()
    }

    /// 重新读取存储；会话确实变化时通知订阅者并返回 `true`
    pub fn refresh(&self) -> bool {
        // 读取期间不持有任何借用：损坏数据被清除时会同步派发事件并重入
        let next = self.inner.store.user();
        if *self.inner.current.borrow() == next {
            return false;
        }

        log::debug!(
            "[Session] observer: {}",
            if next.is_some() { "signed in" } else { "signed out" }
        );
        *self.inner.current.borrow_mut() = next.clone();

        let subscribers: Vec<Callback> = self
            .inner
            .subscribers
            .borrow()
            .iter()
            .map(|(_, cb)| Rc::clone(cb))
            .collect();
        for callback in subscribers {
            callback(next.as_ref());
        }
        true
    }
}

trait Unsubscribe {
    fn unsubscribe(&self, id: usize);
}

impl<S> Unsubscribe for Inner<S> {
    fn unsubscribe(&self, id: usize) {
        self.subscribers.borrow_mut().retain(|(sid, _)| *sid != id);
    }
}

/// 订阅句柄，drop 时退订
pub struct Subscription {
    id: usize,
    owner: Weak<dyn Unsubscribe>,
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(owner) = self.owner.upgrade() {
            owner.unsubscribe(self.id);
        }
    }
}

// ============================================================================
// Leptos 集成
// ============================================================================

/// 在当前组件中观察会话
///
/// 注册 window 事件监听，组件卸载时移除监听并退订。
pub fn use_session_user() -> ReadSignal<Option<SessionUser>> {
    let observer = SessionObserver::new(SessionStore::new(BrowserStorage));
    let (user, set_user) = signal(observer.current());

    let subscription = observer.subscribe(move |u| set_user.set(u.cloned()));
    let observer = StoredValue::new_local(observer);
    let subscription = StoredValue::new_local(Some(subscription));

    let storage_handle = window_event_listener(leptos::ev::storage, move |ev| {
        let key = ev.key();
        observer.with_value(|o| o.handle_storage_event(key.as_deref()));
    });
    let local_handle = window_event_listener_untyped(LOCAL_CHANGE_EVENT, move |_| {
        observer.with_value(|o| o.handle_local_change());
    });

    on_cleanup(move || {
        storage_handle.remove();
        local_handle.remove();
        subscription.try_update_value(|s| *s = None);
    });

    user
}

/// 应用级会话上下文
#[derive(Clone, Copy)]
pub struct SessionContext {
    pub user: ReadSignal<Option<SessionUser>>,
}

impl SessionContext {
    /// 获取认证状态信号（用于路由服务注入）
    pub fn is_authenticated_signal(&self) -> Signal<bool> {
        let user = self.user;
        Signal::derive(move || user.with(Option::is_some))
    }
}

pub fn provide_session() -> SessionContext {
    let ctx = SessionContext {
        user: use_session_user(),
    };
    provide_context(ctx);
    ctx
}

/// 从 Context 获取会话上下文
pub fn use_session() -> SessionContext {
    use_context::<SessionContext>().expect("SessionContext should be provided")
}
