//! 用户管理页面

use crate::components::common::{
    ConfirmDelete, FormModal, ListStatus, Pagination, SortHeader, TextField, Toast, spawn_with,
    use_api, use_list,
};
use crate::components::layout::AdminLayout;
use crate::forms::UserForm;
use crate::state::list_view::Modal;
use crate::state::sort::{SortState, UserSort};
use crate::state::source::UsersSource;
use leptos::prelude::*;
use simaru_shared::{User, UserStatus};

#[component]
pub fn UsersPage() -> impl IntoView {
    let ctl = use_list(UsersSource::new(use_api()));
    let state = *ctl.state();
    let form = RwSignal::new(UserForm::default());
    let sort = RwSignal::new(SortState::<UserSort>::default());
    let is_edit = move || state.with(|s| matches!(s.modal, Modal::Edit(_)));

    Effect::new(move |prev: Option<u64>| {
        let epoch = state.with(|s| s.form_epoch);
        if prev.is_some_and(|p| p != epoch) {
            form.set(UserForm::default());
        }
        epoch
    });

    let on_page = {
        let ctl = ctl.clone();
        move |page: u32| spawn_with(&ctl, move |c| async move { c.set_page(page).await })
    };
    let on_per_page = {
        let ctl = ctl.clone();
        move |n: u32| spawn_with(&ctl, move |c| async move { c.set_per_page(n).await })
    };
    let on_submit = {
        let ctl = ctl.clone();
        move |_| {
            let editing = state.with_untracked(|s| matches!(s.modal, Modal::Edit(_)));
            let payload = form.with_untracked(|f| f.to_payload(editing));
            spawn_with(&ctl, move |c| async move { c.submit(payload).await });
        }
    };
    let on_confirm = move |_| spawn_with(&ctl, |c| async move { c.confirm_delete().await });

    let open_create = move |_| {
        form.set(UserForm::default());
        state.update(|s| s.open_create());
    };
    let open_edit = move |user: User| {
        form.set(UserForm::from(&user));
        state.update(|s| s.open_edit(user));
    };

    let rows = move || sort.with(|srt| state.with(|s| srt.sorted(&s.rows)));
    let modal_title = Signal::derive(move || {
        if is_edit() {
            "Edit User".to_string()
        } else {
            "Add User".to_string()
        }
    });

    view! {
        <AdminLayout>
            <Toast state=state />
            <div class="card bg-base-100 shadow-xl">
                <div class="card-body p-0">
                    <div class="flex items-center justify-between p-6 pb-2">
                        <h3 class="card-title">"Users"</h3>
                        <button
                            class="btn btn-primary btn-sm"
                            disabled=move || state.with(|s| s.is_busy())
                            on:click=open_create
                        >
                            "Add User"
                        </button>
                    </div>
                    <div class="overflow-x-auto w-full">
                        <table class="table table-zebra w-full">
                            <thead>
                                <tr>
                                    <SortHeader sort=sort key=UserSort::Name label="Name" />
                                    <SortHeader sort=sort key=UserSort::Email label="Email" />
                                    <th>"Status"</th>
                                    <th class="hidden md:table-cell">"Created"</th>
                                    <th></th>
                                </tr>
                            </thead>
                            <tbody>
                                <ListStatus state=state colspan=5 empty_text="No users found." />
                                <For each=rows key=|u| u.id children=move |user| {
                                    let id = user.id;
                                    let edit = user.clone();
                                    let badge = match user.status {
                                        UserStatus::Active => "badge badge-success",
                                        UserStatus::Inactive => "badge badge-ghost",
                                    };
                                    view! {
                                        <tr>
                                            <td class="font-medium">{user.name.clone()}</td>
                                            <td>{user.email.clone()}</td>
                                            <td>
                                                <span class=badge>{user.status.as_str()}</span>
                                            </td>
                                            <td class="hidden md:table-cell">{user.created_at.clone()}</td>
                                            <td class="flex gap-2 justify-end">
                                                <button
                                                    class="btn btn-ghost btn-xs"
                                                    on:click=move |_| open_edit(edit.clone())
                                                >
                                                    "Edit"
                                                </button>
                                                <button
                                                    class="btn btn-ghost btn-xs text-error"
                                                    on:click=move |_| state.update(|s| s.request_delete(id))
                                                >
                                                    "Delete"
                                                </button>
                                            </td>
                                        </tr>
                                    }
                                } />
                            </tbody>
                        </table>
                    </div>
                    <Pagination state=state on_page=on_page on_per_page=on_per_page />
                </div>
            </div>

            <FormModal state=state title=modal_title on_submit=on_submit>
                <TextField
                    label="Name"
                    value=Signal::derive(move || form.with(|f| f.name.clone()))
                    on_input=move |v| form.update(|f| f.name = v)
                />
                <TextField
                    label="Email"
                    kind="email"
                    value=Signal::derive(move || form.with(|f| f.email.clone()))
                    on_input=move |v| form.update(|f| f.email = v)
                />
                <TextField
                    label="Password"
                    kind="password"
                    placeholder=if is_edit() { "Leave blank to keep the current password" } else { "" }
                    value=Signal::derive(move || form.with(|f| f.password.clone()))
                    on_input=move |v| form.update(|f| f.password = v)
                />
                <div class="form-control">
                    <label class="label">
                        <span class="label-text">"Status"</span>
                    </label>
                    <select
                        class="select select-bordered w-full"
                        on:change=move |ev| {
                            let status = UserStatus::parse_lenient(&event_target_value(&ev));
                            form.update(|f| f.status = status);
                        }
                    >
                        {[UserStatus::Active, UserStatus::Inactive]
                            .into_iter()
                            .map(|status| {
                                view! {
                                    <option
                                        value=status.as_str()
                                        selected=move || form.with(|f| f.status == status)
                                    >
                                        {status.as_str()}
                                    </option>
                                }
                            })
                            .collect_view()}
                    </select>
                </div>
            </FormModal>

            <ConfirmDelete state=state what="user" on_confirm=on_confirm />
        </AdminLayout>
    }
}
