//! 列表视图状态机
//!
//! ```text
//! Loading -> Ready | Empty | Error
//! Ready   -> Modal(Create | Edit) -> Submitting -> Ready (成功)
//!                                               -> Modal + 行内错误 (失败)
//! ```
//!
//! 纯数据结构，不做任何 I/O。异步编排见 `controller`。

use crate::error::ApiError;
use simaru_shared::protocol::Page;

/// 列表加载阶段
#[derive(Debug, Clone, PartialEq)]
pub enum Phase {
    Loading,
    Ready,
    Empty,
    Error(ApiError),
}

/// 模态表单模式
#[derive(Debug, Clone, PartialEq)]
pub enum Modal<T> {
    Closed,
    Create,
    Edit(T),
}

/// 提交目标
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitTarget {
    Create,
    Update(u64),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Success,
    Error,
}

/// 操作结果通知（toast）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub id: u64,
    pub kind: NoticeKind,
    pub message: String,
}

/// 列表请求票据，用于丢弃过期的响应
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchTicket(u64);

/// 请求结果的处理方式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
    Applied,
    /// 票据已过期，结果被丢弃
    Stale,
    /// 当前页已超出总页数，页码已回退，需要重新加载
    OutOfRange,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ListViewState<T, L = ()> {
    pub phase: Phase,
    pub rows: Vec<T>,
    /// 伴随列表一起加载的查找数据（分类、房间等）
    pub lookup: L,
    pub page: u32,
    pub per_page: u32,
    pub total_pages: u32,
    pub modal: Modal<T>,
    /// 模态框内的行内错误
    pub modal_error: Option<String>,
    pub submitting: bool,
    /// 等待用户确认删除的 id
    pub pending_delete: Option<u64>,
    pub deleting: bool,
    pub notice: Option<Notice>,
    /// 每次成功提交后递增，表单据此重置
    pub form_epoch: u64,
    /// 变更操作（含其后的刷新）进行中
    busy: bool,
    fetch_seq: u64,
    notice_seq: u64,
}

impl<T: Clone, L: Default> ListViewState<T, L> {
    pub fn new(per_page: u32) -> Self {
        Self {
            phase: Phase::Loading,
            rows: Vec::new(),
            lookup: L::default(),
            page: 1,
            per_page: per_page.max(1),
            total_pages: 1,
            modal: Modal::Closed,
            modal_error: None,
            submitting: false,
            pending_delete: None,
            deleting: false,
            notice: None,
            form_epoch: 0,
            busy: false,
            fetch_seq: 0,
            notice_seq: 0,
        }
    }

    // =========================================================
    // 加载
    // =========================================================

    /// 开始一次列表请求，之前发出的请求随之作废
    pub fn begin_fetch(&mut self) -> FetchTicket {
        self.fetch_seq += 1;
        self.phase = Phase::Loading;
        FetchTicket(self.fetch_seq)
    }

    /// 应用请求结果
    ///
    /// 删除最后一页仅剩的一行后，总页数会变少；此时页码回退到最后一页，
    /// 阶段保持 `Loading`，由调用方重新加载。
    pub fn finish_fetch(
        &mut self,
        ticket: FetchTicket,
        result: Result<(Page<T>, L), ApiError>,
    ) -> FetchOutcome {
        if ticket.0 != self.fetch_seq {
            log::debug!(
                "[ListView] dropping stale response #{} (current #{})",
                ticket.0,
                self.fetch_seq
            );
            return FetchOutcome::Stale;
        }
        match result {
            Ok((page, lookup)) => {
                self.total_pages = page.total_pages.max(1);
                self.lookup = lookup;
                if self.page > self.total_pages {
                    log::info!(
                        "[ListView] page {} is gone, moving to page {}",
                        self.page,
                        self.total_pages
                    );
                    self.page = self.total_pages;
                    return FetchOutcome::OutOfRange;
                }
                self.rows = page.data;
                self.phase = if self.rows.is_empty() {
                    Phase::Empty
                } else {
                    Phase::Ready
                };
            }
            Err(err) => {
                log::warn!("[ListView] load failed: {err}");
                self.phase = Phase::Error(err);
            }
        }
        FetchOutcome::Applied
    }

    pub fn is_loading(&self) -> bool {
        self.phase == Phase::Loading
    }

    // =========================================================
    // 分页
    // =========================================================

    /// 跳转到指定页；页码被限制在 `1..=total_pages`，返回是否需要重新加载
    pub fn set_page(&mut self, page: u32) -> bool {
        let page = page.clamp(1, self.total_pages.max(1));
        if page == self.page {
            return false;
        }
        self.page = page;
        true
    }

    /// 修改每页条数，总是回到第一页
    pub fn set_per_page(&mut self, per_page: u32) -> bool {
        let per_page = per_page.max(1);
        let changed = per_page != self.per_page || self.page != 1;
        self.per_page = per_page;
        self.page = 1;
        changed
    }

    pub fn has_previous(&self) -> bool {
        self.page > 1
    }

    pub fn has_next(&self) -> bool {
        self.page < self.total_pages
    }

    // =========================================================
    // 模态表单
    // =========================================================

    pub fn open_create(&mut self) {
        if self.submitting {
            return;
        }
        self.modal = Modal::Create;
        self.modal_error = None;
    }

    pub fn open_edit(&mut self, item: T) {
        if self.submitting {
            return;
        }
        self.modal = Modal::Edit(item);
        self.modal_error = None;
    }

    pub fn close_modal(&mut self) {
        if self.submitting {
            return;
        }
        self.modal = Modal::Closed;
        self.modal_error = None;
    }

    pub fn is_modal_open(&self) -> bool {
        !matches!(self.modal, Modal::Closed)
    }

    /// 表单校验失败：保持模态框打开并显示错误
    pub fn reject_submit(&mut self, err: ApiError) {
        self.modal_error = Some(err.to_string());
    }

    /// 开始提交；模态框未打开或已有变更在进行中时拒绝
    pub fn begin_submit(&mut self, id_of: impl Fn(&T) -> u64) -> Option<SubmitTarget> {
        if self.busy {
            log::debug!("[ListView] submit ignored, another change is in flight");
            return None;
        }
        let target = match &self.modal {
            Modal::Closed => return None,
            Modal::Create => SubmitTarget::Create,
            Modal::Edit(item) => SubmitTarget::Update(id_of(item)),
        };
        self.busy = true;
        self.submitting = true;
        self.modal_error = None;
        Some(target)
    }

    /// 提交成功：关闭模态框并重置表单，`busy` 保持到刷新结束
    pub fn complete_submit(&mut self, message: impl Into<String>) {
        self.submitting = false;
        self.modal = Modal::Closed;
        self.modal_error = None;
        self.form_epoch += 1;
        self.notify(NoticeKind::Success, message);
    }

    /// 提交失败：模态框保持打开，用户输入保留
    pub fn fail_submit(&mut self, err: ApiError) {
        self.submitting = false;
        self.busy = false;
        self.modal_error = Some(err.to_string());
    }

    // =========================================================
    // 删除
    // =========================================================

    /// 请求删除，等待用户确认
    pub fn request_delete(&mut self, id: u64) {
        if !self.busy {
            self.pending_delete = Some(id);
        }
    }

    pub fn cancel_delete(&mut self) {
        if !self.deleting {
            self.pending_delete = None;
        }
    }

    /// 用户已确认删除；返回待删除的 id
    pub fn begin_delete(&mut self) -> Option<u64> {
        if self.busy {
            return None;
        }
        let id = self.pending_delete?;
        self.busy = true;
        self.deleting = true;
        Some(id)
    }

    pub fn complete_delete(&mut self, message: impl Into<String>) {
        self.deleting = false;
        self.pending_delete = None;
        self.notify(NoticeKind::Success, message);
    }

    /// 删除失败：列表保持不变，仅显示错误
    pub fn fail_delete(&mut self, err: ApiError) {
        self.deleting = false;
        self.busy = false;
        self.pending_delete = None;
        self.notify(NoticeKind::Error, err.to_string());
    }

    /// 变更及其后的刷新全部完成
    pub fn release(&mut self) {
        self.busy = false;
    }

    pub fn is_busy(&self) -> bool {
        self.busy
    }

    // =========================================================
    // 通知
    // =========================================================

    pub fn notify(&mut self, kind: NoticeKind, message: impl Into<String>) -> u64 {
        self.notice_seq += 1;
        self.notice = Some(Notice {
            id: self.notice_seq,
            kind,
            message: message.into(),
        });
        self.notice_seq
    }

    /// 关闭通知；只有仍是同一条通知时才关闭，避免误关后来的通知
    pub fn dismiss_notice(&mut self, id: u64) {
        if self.notice.as_ref().is_some_and(|n| n.id == id) {
            self.notice = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    type State = ListViewState<(u64, &'static str)>;

    fn page(rows: &[(u64, &'static str)], total_pages: u32) -> Result<(Page<(u64, &'static str)>, ()), ApiError> {
        Ok((
            Page {
                data: rows.to_vec(),
                total_pages,
            },
            (),
        ))
    }

    #[test]
    fn starts_loading_on_first_page() {
        let state = State::new(10);
        assert_eq!(state.phase, Phase::Loading);
        assert_eq!(state.page, 1);
        assert!(!state.has_previous());
        assert!(!state.has_next());
    }

    #[test]
    fn fetch_resolves_to_ready_empty_or_error() {
        let mut state = State::new(10);
        let t = state.begin_fetch();
        assert_eq!(state.finish_fetch(t, page(&[(1, "a")], 1)), FetchOutcome::Applied);
        assert_eq!(state.phase, Phase::Ready);

        let t = state.begin_fetch();
        state.finish_fetch(t, page(&[], 1));
        assert_eq!(state.phase, Phase::Empty);

        let t = state.begin_fetch();
        state.finish_fetch(t, Err(ApiError::unreachable()));
        assert_eq!(state.phase, Phase::Error(ApiError::unreachable()));
    }

    #[test]
    fn stale_fetch_is_ignored() {
        let mut state = State::new(10);
        let first = state.begin_fetch();
        let second = state.begin_fetch();

        assert_eq!(
            state.finish_fetch(second, page(&[(2, "new")], 1)),
            FetchOutcome::Applied
        );
        assert_eq!(
            state.finish_fetch(first, page(&[(1, "old")], 1)),
            FetchOutcome::Stale
        );
        assert_eq!(state.rows, vec![(2, "new")]);
    }

    #[test]
    fn page_size_change_resets_to_first_page() {
        let mut state = State::new(10);
        let t = state.begin_fetch();
        state.finish_fetch(t, page(&[(1, "a")], 5));
        assert!(state.set_page(3));
        assert_eq!(state.page, 3);

        assert!(state.set_per_page(20));
        assert_eq!(state.page, 1);
        assert_eq!(state.per_page, 20);
    }

    #[test]
    fn page_is_clamped_to_known_range() {
        let mut state = State::new(10);
        let t = state.begin_fetch();
        state.finish_fetch(t, page(&[(1, "a")], 3));

        assert!(state.set_page(9));
        assert_eq!(state.page, 3);
        assert!(!state.has_next());
        assert!(!state.set_page(3));
        assert!(state.set_page(0));
        assert_eq!(state.page, 1);
    }

    #[test]
    fn shrunken_total_moves_back_to_last_page() {
        let mut state = State::new(10);
        let t = state.begin_fetch();
        state.finish_fetch(t, page(&[(1, "a")], 3));
        state.set_page(3);

        let t = state.begin_fetch();
        assert_eq!(state.finish_fetch(t, page(&[], 2)), FetchOutcome::OutOfRange);
        assert_eq!(state.page, 2);
        assert_eq!(state.total_pages, 2);
        assert!(state.is_loading());
    }

    #[test]
    fn middle_page_enables_both_directions() {
        let mut state = State::new(10);
        let t = state.begin_fetch();
        state.finish_fetch(t, page(&[(1, "a")], 3));
        state.set_page(2);
        assert!(state.has_previous());
        assert!(state.has_next());
    }

    #[test]
    fn submit_requires_open_modal_and_no_overlap() {
        let mut state = State::new(10);
        assert_eq!(state.begin_submit(|r| r.0), None);

        state.open_edit((7, "x"));
        assert_eq!(state.begin_submit(|r| r.0), Some(SubmitTarget::Update(7)));
        assert!(state.submitting);
        // 第二次提交在第一次完成前被拒绝
        assert_eq!(state.begin_submit(|r| r.0), None);

        state.complete_submit("saved");
        assert!(!state.is_modal_open());
        assert_eq!(state.form_epoch, 1);
        // 刷新完成前仍然拒绝
        state.open_create();
        assert_eq!(state.begin_submit(|r| r.0), None);
        state.release();
        assert_eq!(state.begin_submit(|r| r.0), Some(SubmitTarget::Create));
    }

    #[test]
    fn failed_submit_keeps_modal_open() {
        let mut state = State::new(10);
        state.open_create();
        state.begin_submit(|r| r.0);
        state.fail_submit(ApiError::validation("Name is required"));

        assert_eq!(state.modal, Modal::Create);
        assert_eq!(state.modal_error.as_deref(), Some("Name is required"));
        assert!(!state.is_busy());
        assert_eq!(state.form_epoch, 0);
    }

    #[test]
    fn modal_cannot_close_while_submitting() {
        let mut state = State::new(10);
        state.open_create();
        state.begin_submit(|r| r.0);
        state.close_modal();
        assert!(state.is_modal_open());
    }

    #[test]
    fn delete_requires_confirmation() {
        let mut state = State::new(10);
        assert_eq!(state.begin_delete(), None);

        state.request_delete(4);
        state.cancel_delete();
        assert_eq!(state.begin_delete(), None);

        state.request_delete(4);
        assert_eq!(state.begin_delete(), Some(4));
        assert!(state.deleting);
    }

    #[test]
    fn failed_delete_leaves_rows_untouched() {
        let mut state = State::new(10);
        let t = state.begin_fetch();
        state.finish_fetch(t, page(&[(1, "a"), (2, "b")], 1));

        state.request_delete(2);
        state.begin_delete();
        state.fail_delete(ApiError::Remote {
            status: 404,
            message: "Not found".into(),
        });

        assert_eq!(state.rows, vec![(1, "a"), (2, "b")]);
        assert_eq!(state.notice.as_ref().map(|n| n.kind), Some(NoticeKind::Error));
        assert!(!state.is_busy());
    }

    #[test]
    fn modal_works_for_items_without_equality() {
        #[derive(Clone)]
        struct Opaque(u64);

        let mut state: ListViewState<Opaque> = ListViewState::new(10);
        assert!(!state.is_modal_open());
        state.open_edit(Opaque(3));
        assert!(state.is_modal_open());
        assert_eq!(state.begin_submit(|o| o.0), Some(SubmitTarget::Update(3)));
    }

    #[test]
    fn dismiss_only_clears_matching_notice() {
        let mut state = State::new(10);
        let first = state.notify(NoticeKind::Success, "one");
        let second = state.notify(NoticeKind::Success, "two");
        state.dismiss_notice(first);
        assert_eq!(state.notice.as_ref().map(|n| n.id), Some(second));
        state.dismiss_notice(second);
        assert!(state.notice.is_none());
    }
}
