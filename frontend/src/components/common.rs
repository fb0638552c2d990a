//! 列表页面共用的组件与 hook

use crate::api::ApiClient;
use crate::config::{AppConfig, PAGE_SIZE_OPTIONS};
use crate::state::controller::{ListController, ViewState};
use crate::state::list_view::{ListViewState, NoticeKind, Phase};
use crate::state::sort::SortState;
use crate::state::source::ListSource;
use crate::web::http::FetchHttpClient;
use crate::web::storage::BrowserStorage;
use leptos::prelude::*;
use leptos::task::spawn_local;

/// 浏览器中使用的 API 客户端
pub type WebApi = ApiClient<FetchHttpClient, BrowserStorage>;

pub type WebController<Src> = ListController<Src, RwSignal<ViewState<Src>>>;

pub fn use_api() -> WebApi {
    use_context::<WebApi>().expect("WebApi should be provided")
}

pub fn use_config() -> AppConfig {
    use_context::<AppConfig>().expect("AppConfig should be provided")
}

/// 创建列表控制器并发出首次加载
///
/// 通知在配置的延迟后自动消失。服务端返回 401 时本地会话已经失效，
/// 清除后由路由服务跳转到登录页。
pub fn use_list<Src>(source: Src) -> WebController<Src>
where
    Src: ListSource + Clone + 'static,
    Src::Item: Send + Sync + 'static,
    Src::Lookup: Send + Sync + 'static,
{
    let config = use_config();
    let state = RwSignal::new(ListViewState::new(config.default_per_page));
    let controller = ListController::new(source, state);

    let initial = controller.clone();
    spawn_local(async move { initial.refresh().await });

    let delay = config.notification_ms;
    Effect::new(move |_| {
        let Some(id) = state.with(|s| s.notice.as_ref().map(|n| n.id)) else {
            return;
        };
        gloo_timers::callback::Timeout::new(delay, move || {
            state.try_update(|s| s.dismiss_notice(id));
        })
        .forget();
    });

    let api = use_api();
    Effect::new(move |_| {
        let rejected = state.with(|s| matches!(&s.phase, Phase::Error(e) if e.status() == Some(401)));
        if rejected {
            log::warn!("[ListView] server rejected the session token");
            crate::auth::logout(api.store());
        }
    });

    controller
}

/// 在后台执行控制器操作
pub fn spawn_with<Src, F, Fut>(controller: &WebController<Src>, f: F)
where
    Src: ListSource + Clone + 'static,
    Src::Item: Send + Sync + 'static,
    Src::Lookup: Send + Sync + 'static,
    F: FnOnce(WebController<Src>) -> Fut + 'static,
    Fut: std::future::Future<Output = ()> + 'static,
{
    let controller = controller.clone();
    spawn_local(f(controller));
}

// ============================================================================
// 组件
// ============================================================================

/// 操作结果通知
#[component]
pub fn Toast<T, L>(state: RwSignal<ListViewState<T, L>>) -> impl IntoView
where
    T: Clone + Send + Sync + 'static,
    L: Default + Send + Sync + 'static,
{
    let notice = move || state.with(|s| s.notice.clone());
    view! {
        {move || {
            notice()
                .map(|n| {
                    let id = n.id;
                    let class = match n.kind {
                        NoticeKind::Success => "alert alert-success shadow-lg",
                        NoticeKind::Error => "alert alert-error shadow-lg",
                    };
                    view! {
                        <div class="toast toast-top toast-end z-50">
                            <div class=class>
                                <span>{n.message}</span>
                                <button
                                    class="btn btn-ghost btn-xs"
                                    on:click=move |_| state.update(|s| s.dismiss_notice(id))
                                >
                                    "✕"
                                </button>
                            </div>
                        </div>
                    }
                })
        }}
    }
}

/// 表格主体之外的加载/空/错误提示
#[component]
pub fn ListStatus<T, L>(
    state: RwSignal<ListViewState<T, L>>,
    colspan: u32,
    #[prop(into)] empty_text: String,
) -> impl IntoView
where
    T: Clone + Send + Sync + 'static,
    L: Default + Send + Sync + 'static,
{
    move || {
        let text = match state.with(|s| s.phase.clone()) {
            Phase::Loading => view! { <span class="loading loading-spinner"></span> }.into_any(),
            Phase::Empty => empty_text.clone().into_any(),
            Phase::Error(err) => view! { <span class="text-error">{err.to_string()}</span> }.into_any(),
            Phase::Ready => return None,
        };
        Some(view! {
            <tr>
                <td colspan=colspan.to_string() class="text-center py-8 text-base-content/50">
                    {text}
                </td>
            </tr>
        })
    }
}

/// 分页控件
#[component]
pub fn Pagination<T, L>(
    state: RwSignal<ListViewState<T, L>>,
    #[prop(into)] on_page: Callback<u32>,
    #[prop(into)] on_per_page: Callback<u32>,
) -> impl IntoView
where
    T: Clone + Send + Sync + 'static,
    L: Default + Send + Sync + 'static,
{
    let page = move || state.with(|s| s.page);
    let total = move || state.with(|s| s.total_pages);
    let locked = move || state.with(|s| s.is_loading() || s.is_busy());

    view! {
        <div class="flex items-center justify-between p-4">
            <label class="flex items-center gap-2 text-sm">
                "Show"
                <select
                    class="select select-bordered select-sm"
                    on:change=move |ev| {
                        if let Ok(n) = event_target_value(&ev).parse::<u32>() {
                            on_per_page.run(n);
                        }
                    }
                >
                    {PAGE_SIZE_OPTIONS
                        .iter()
                        .map(|&n| {
                            view! {
                                <option value=n.to_string() selected=move || state.with(|s| s.per_page == n)>
                                    {n}
                                </option>
                            }
                        })
                        .collect_view()}
                </select>
                "entries"
            </label>
            <div class="join">
                <button
                    class="join-item btn btn-sm"
                    disabled=move || !state.with(|s| s.has_previous()) || locked()
                    on:click=move |_| on_page.run(page().saturating_sub(1))
                >
                    "Previous"
                </button>
                <span class="join-item btn btn-sm btn-disabled">
                    {move || format!("Page {} of {}", page(), total())}
                </span>
                <button
                    class="join-item btn btn-sm"
                    disabled=move || !state.with(|s| s.has_next()) || locked()
                    on:click=move |_| on_page.run(page() + 1)
                >
                    "Next"
                </button>
            </div>
        </div>
    }
}

/// 删除确认框
#[component]
pub fn ConfirmDelete<T, L>(
    state: RwSignal<ListViewState<T, L>>,
    #[prop(into)] what: String,
    #[prop(into)] on_confirm: Callback<()>,
) -> impl IntoView
where
    T: Clone + Send + Sync + 'static,
    L: Default + Send + Sync + 'static,
{
    let open = move || state.with(|s| s.pending_delete.is_some());
    let deleting = move || state.with(|s| s.deleting);

    view! {
        <Show when=open>
            <div class="modal modal-open">
                <div class="modal-box">
                    <h3 class="font-bold text-lg">"Confirm delete"</h3>
                    <p class="py-4">{format!("Are you sure you want to delete this {what}?")}</p>
                    <div class="modal-action">
                        <button
                            class="btn"
                            disabled=deleting
                            on:click=move |_| state.update(|s| s.cancel_delete())
                        >
                            "Cancel"
                        </button>
                        <button class="btn btn-error" disabled=deleting on:click=move |_| on_confirm.run(())>
                            {move || if deleting() { "Deleting..." } else { "Delete" }}
                        </button>
                    </div>
                </div>
            </div>
        </Show>
    }
}

/// 模态表单外壳：标题、行内错误、提交/取消按钮
#[component]
pub fn FormModal<T, L>(
    state: RwSignal<ListViewState<T, L>>,
    #[prop(into)] title: Signal<String>,
    #[prop(into)] on_submit: Callback<()>,
    children: ChildrenFn,
) -> impl IntoView
where
    T: Clone + Send + Sync + 'static,
    L: Default + Send + Sync + 'static,
{
    let submitting = move || state.with(|s| s.submitting);
    let children = StoredValue::new(children);

    view! {
        <Show when=move || state.with(|s| s.is_modal_open())>
            <div class="modal modal-open">
                <div class="modal-box">
                    <h3 class="font-bold text-lg">{move || title.get()}</h3>
                    <form
                        class="space-y-4 mt-4"
                        on:submit=move |ev: leptos::web_sys::SubmitEvent| {
                            ev.prevent_default();
                            on_submit.run(());
                        }
                    >
                        {move || {
                            state
                                .with(|s| s.modal_error.clone())
                                .map(|msg| {
                                    view! {
                                        <div role="alert" class="alert alert-error text-sm py-2">
                                            <span>{msg}</span>
                                        </div>
                                    }
                                })
                        }}
                        {children.with_value(|c| c())}
                        <div class="modal-action">
                            <button
                                type="button"
                                class="btn"
                                disabled=submitting
                                on:click=move |_| state.update(|s| s.close_modal())
                            >
                                "Cancel"
                            </button>
                            <button type="submit" class="btn btn-primary" disabled=submitting>
                                {move || if submitting() {
                                    view! { <span class="loading loading-spinner"></span> "Saving..." }.into_any()
                                } else {
                                    "Save".into_any()
                                }}
                            </button>
                        </div>
                    </form>
                </div>
            </div>
        </Show>
    }
}

/// 文本输入框
#[component]
pub fn TextField(
    #[prop(into)] label: String,
    #[prop(into)] value: Signal<String>,
    #[prop(into)] on_input: Callback<String>,
    #[prop(optional, into)] kind: Option<String>,
    #[prop(optional, into)] placeholder: String,
) -> impl IntoView {
    view! {
        <div class="form-control">
            <label class="label">
                <span class="label-text">{label}</span>
            </label>
            <input
                type=kind.unwrap_or_else(|| "text".to_string())
                placeholder=placeholder
                class="input input-bordered w-full"
                prop:value=move || value.get()
                on:input=move |ev| on_input.run(event_target_value(&ev))
            />
        </div>
    }
}

/// 可点击排序的表头
#[component]
pub fn SortHeader<K>(sort: RwSignal<SortState<K>>, key: K, label: &'static str) -> impl IntoView
where
    K: Copy + Eq + Send + Sync + 'static,
{
    view! {
        <th class="cursor-pointer select-none" on:click=move |_| sort.update(|s| s.toggle(key))>
            {label}
            {move || sort.with(|s| s.indicator(key))}
        </th>
    }
}
