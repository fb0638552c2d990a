//! 本地存储封装模块
//!
//! 会话数据保存在浏览器 LocalStorage 中。为了让核心逻辑脱离浏览器运行，
//! 存储被抽象为 `KeyValueStore` trait：
//! - `BrowserStorage`: 生产实现，基于 `web_sys::Storage`
//! - `MemoryStorage`: 测试实现，多个克隆共享同一份数据，用于模拟多个标签页

/// 同一标签页内会话变化时派发的自定义事件名
///
/// 浏览器原生的 `storage` 事件只会在*其他*标签页触发，本标签页需要自行广播。
pub const LOCAL_CHANGE_EVENT: &str = "local-user-change";

/// 键值存储抽象
pub trait KeyValueStore {
    /// 获取存储的字符串值，键不存在或发生错误时返回 `None`
    fn get(&self, key: &str) -> Option<String>;

    /// 设置存储值，返回操作是否成功
    fn set(&self, key: &str, value: &str) -> bool;

    /// 删除键值对，返回操作是否成功
    fn remove(&self, key: &str) -> bool;

    /// 通知本标签页内的订阅者：会话数据已变化
    fn announce_change(&self);
}

// =========================================================
// 实现层: 浏览器 LocalStorage (Production)
// =========================================================

/// 浏览器 LocalStorage
///
/// 无状态单元结构体，可以自由复制并放入 Leptos Context。
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BrowserStorage;

impl BrowserStorage {
    /// 获取 LocalStorage 实例
    fn storage() -> Option<web_sys::Storage> {
        web_sys::window()?.local_storage().ok()?
    }
}

impl KeyValueStore for BrowserStorage {
    fn get(&self, key: &str) -> Option<String> {
        Self::storage()?.get_item(key).ok()?
    }

    fn set(&self, key: &str, value: &str) -> bool {
        Self::storage()
            .and_then(|s| s.set_item(key, value).ok())
            .is_some()
    }

    fn remove(&self, key: &str) -> bool {
        Self::storage()
            .and_then(|s| s.remove_item(key).ok())
            .is_some()
    }

    fn announce_change(&self) {
        let Some(window) = web_sys::window() else {
            return;
        };
        match web_sys::CustomEvent::new(LOCAL_CHANGE_EVENT) {
            Ok(event) => {
                if window.dispatch_event(&event).is_err() {
                    log::warn!("[Storage] failed to dispatch {LOCAL_CHANGE_EVENT}");
                }
            }
            Err(e) => log::warn!("[Storage] failed to create {LOCAL_CHANGE_EVENT}: {e:?}"),
        }
    }
}

// =========================================================
// 实现层: 内存存储 (Test)
// =========================================================

#[cfg(test)]
pub use memory::MemoryStorage;

#[cfg(test)]
mod memory {
    use super::KeyValueStore;
    use std::cell::{Cell, RefCell};
    use std::collections::HashMap;
    use std::rc::Rc;

    type Listener = Rc<dyn Fn()>;
    type SetHook = Rc<dyn Fn(&str)>;

    /// 内存键值存储
    ///
    /// `clone()` 得到同一标签页的句柄；`share()` 只共享底层数据、
    /// 不共享本地事件监听器，行为上等价于同源的另一个标签页。
    #[derive(Clone, Default)]
    pub struct MemoryStorage {
        data: Rc<RefCell<HashMap<String, String>>>,
        listeners: Rc<RefCell<Vec<Listener>>>,
        set_hooks: Rc<RefCell<Vec<SetHook>>>,
        announcements: Rc<Cell<usize>>,
        fail_writes: Rc<Cell<bool>>,
    }

    impl MemoryStorage {
        pub fn new() -> Self {
            Self::default()
        }

        /// 共享数据、拥有独立事件通道的新句柄（模拟另一个标签页）
        pub fn share(&self) -> Self {
            Self {
                data: Rc::clone(&self.data),
                listeners: Rc::new(RefCell::new(Vec::new())),
                set_hooks: Rc::new(RefCell::new(Vec::new())),
                announcements: Rc::new(Cell::new(0)),
                fail_writes: Rc::clone(&self.fail_writes),
            }
        }

        /// 注册本标签页的自定义事件监听
        pub fn on_announce(&self, listener: impl Fn() + 'static) {
            self.listeners.borrow_mut().push(Rc::new(listener));
        }

        /// 每次成功写入某个键后回调，用于观察写入过程中的中间状态
        pub fn on_set(&self, hook: impl Fn(&str) + 'static) {
            self.set_hooks.borrow_mut().push(Rc::new(hook));
        }

        pub fn announcements(&self) -> usize {
            self.announcements.get()
        }

        pub fn fail_writes(&self, fail: bool) {
            self.fail_writes.set(fail);
        }

        pub fn raw(&self, key: &str) -> Option<String> {
            self.data.borrow().get(key).cloned()
        }

        pub fn put_raw(&self, key: &str, value: &str) {
            self.data
                .borrow_mut()
                .insert(key.to_string(), value.to_string());
        }
    }

    impl KeyValueStore for MemoryStorage {
        fn get(&self, key: &str) -> Option<String> {
            self.raw(key)
        }

        fn set(&self, key: &str, value: &str) -> bool {
            if self.fail_writes.get() {
                return false;
            }
            self.put_raw(key, value);
            let hooks: Vec<SetHook> = self.set_hooks.borrow().clone();
            for hook in hooks {
                hook(key);
            }
            true
        }

        fn remove(&self, key: &str) -> bool {
            self.data.borrow_mut().remove(key);
            true
        }

        fn announce_change(&self) {
            self.announcements.set(self.announcements.get() + 1);
            // 先复制监听器列表，允许回调中再次注册
            let listeners: Vec<Listener> = self.listeners.borrow().clone();
            for listener in listeners {
                listener();
            }
        }
    }
}
