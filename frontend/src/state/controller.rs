//! 列表视图异步编排
//!
//! `ListController` 把数据源的请求与 `ListViewState` 的状态迁移串起来。
//! 状态容器通过 `StateCell` 注入：浏览器里是 `RwSignal`，测试里是
//! `Rc<RefCell<_>>`。容器已销毁（组件已卸载）时，迟到的结果会被直接丢弃。

use super::cell::StateCell;
use super::list_view::{FetchOutcome, ListViewState, SubmitTarget};
use super::source::ListSource;
use crate::error::ApiError;
use simaru_shared::protocol::Resource;

pub type ViewState<Src> = ListViewState<<Src as ListSource>::Item, <Src as ListSource>::Lookup>;

#[derive(Clone)]
pub struct ListController<Src, C> {
    source: Src,
    state: C,
}

impl<Src, C> ListController<Src, C>
where
    Src: ListSource,
    C: StateCell<ViewState<Src>>,
{
    pub fn new(source: Src, state: C) -> Self {
        Self { source, state }
    }

    pub fn state(&self) -> &C {
        &self.state
    }

    fn label() -> &'static str {
        <Src::Item as Resource>::LABEL
    }

    /// 重新加载当前页
    ///
    /// 当前页已不存在时（例如删除了最后一页的唯一一行），回退到最后一页再加载。
    pub async fn refresh(&self) {
        loop {
            let Some((ticket, page, per_page)) =
                self.state.mutate(|s| (s.begin_fetch(), s.page, s.per_page))
            else {
                return;
            };
            let result = self.source.load(page, per_page).await;
            match self.state.mutate(|s| s.finish_fetch(ticket, result)) {
                Some(FetchOutcome::OutOfRange) => continue,
                Some(_) => return,
                None => {
                    log::debug!("[ListView] {} view is gone, result dropped", Self::label());
                    return;
                }
            }
        }
    }

    pub async fn set_page(&self, page: u32) {
        if self.state.mutate(|s| s.set_page(page)).unwrap_or(false) {
            self.refresh().await;
        }
    }

    pub async fn set_per_page(&self, per_page: u32) {
        if self.state.mutate(|s| s.set_per_page(per_page)).unwrap_or(false) {
            self.refresh().await;
        }
    }

    /// 提交模态表单
    ///
    /// `payload` 是表单校验的结果；校验失败时不会发出请求。成功后关闭
    /// 模态框并刷新当前页，刷新完成前不接受新的变更操作。
    pub async fn submit(&self, payload: Result<<Src::Item as Resource>::Payload, ApiError>) {
        let payload = match payload {
            Ok(payload) => payload,
            Err(err) => {
                self.state.mutate(|s| s.reject_submit(err));
                return;
            }
        };

        let id_of = <Src::Item as Resource>::id;
        let Some(Some(target)) = self.state.mutate(|s| s.begin_submit(id_of)) else {
            return;
        };

        let (result, verb) = match target {
            SubmitTarget::Create => (self.source.create(&payload).await, "created"),
            SubmitTarget::Update(id) => (self.source.update(id, &payload).await, "updated"),
        };

        match result {
            Ok(_) => {
                let message = format!("{} {verb} successfully", capitalize(Self::label()));
                self.state.mutate(|s| s.complete_submit(message));
                self.refresh().await;
                self.state.mutate(|s| s.release());
            }
            Err(err) => {
                log::warn!("[ListView] {} submit failed: {err}", Self::label());
                self.state.mutate(|s| s.fail_submit(err));
            }
        }
    }

    /// 用户确认后执行删除
    pub async fn confirm_delete(&self) {
        let Some(Some(id)) = self.state.mutate(|s| s.begin_delete()) else {
            return;
        };

        match self.source.delete(id).await {
            Ok(()) => {
                let message = format!("{} deleted successfully", capitalize(Self::label()));
                self.state.mutate(|s| s.complete_delete(message));
                self.refresh().await;
                self.state.mutate(|s| s.release());
            }
            Err(err) => {
                log::warn!("[ListView] {} #{id} delete failed: {err}", Self::label());
                self.state.mutate(|s| s.fail_delete(err));
            }
        }
    }
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
