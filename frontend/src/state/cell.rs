//! 状态容器抽象
//!
//! 异步编排逻辑只需要"改"这一个操作。浏览器中状态放在 `RwSignal`
//! 里驱动界面；测试中放在 `Rc<RefCell<_>>` 里，不需要响应式运行时。

use leptos::prelude::*;
use std::cell::RefCell;
use std::rc::Rc;

pub trait StateCell<T> {
    /// 修改状态；容器已被销毁（组件已卸载）时返回 `None`
    fn mutate<R>(&self, f: impl FnOnce(&mut T) -> R) -> Option<R>;
}

impl<T: Send + Sync + 'static> StateCell<T> for RwSignal<T> {
    fn mutate<R>(&self, f: impl FnOnce(&mut T) -> R) -> Option<R> {
        self.try_update(f)
    }
}

impl<T> StateCell<T> for Rc<RefCell<T>> {
    fn mutate<R>(&self, f: impl FnOnce(&mut T) -> R) -> Option<R> {
        Some(f(&mut self.borrow_mut()))
    }
}
