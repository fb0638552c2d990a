//! 房间管理页面

use crate::components::common::{
    ConfirmDelete, FormModal, ListStatus, Pagination, SortHeader, TextField, Toast, spawn_with,
    use_api, use_list,
};
use crate::components::layout::AdminLayout;
use crate::forms::RoomForm;
use crate::state::list_view::Modal;
use crate::state::sort::{RoomSort, SortState};
use crate::state::source::{RoomsSource, category_name};
use leptos::prelude::*;
use simaru_shared::Room;

/// 印尼盾金额：千位用 `.` 分隔，小数用 `,`
pub fn format_rupiah(price: f64) -> String {
    let cents = (price.abs() * 100.0).round() as u64;
    let (whole, fraction) = (cents / 100, cents % 100);

    let digits = whole.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(ch);
    }

    let sign = if price < 0.0 && cents > 0 { "-" } else { "" };
    match fraction {
        0 => format!("{sign}Rp{grouped}"),
        f if f % 10 == 0 => format!("{sign}Rp{grouped},{}", f / 10),
        f => format!("{sign}Rp{grouped},{f:02}"),
    }
}

#[component]
pub fn RoomsPage() -> impl IntoView {
    let ctl = use_list(RoomsSource::new(use_api()));
    let state = *ctl.state();
    let form = RwSignal::new(RoomForm::default());
    let sort = RwSignal::new(SortState::<RoomSort>::default());

    // 提交成功后重置表单
    Effect::new(move |prev: Option<u64>| {
        let epoch = state.with(|s| s.form_epoch);
        if prev.is_some_and(|p| p != epoch) {
            form.set(RoomForm::default());
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
            let payload = form.with_untracked(RoomForm::to_payload);
            spawn_with(&ctl, move |c| async move { c.submit(payload).await });
        }
    };
    let on_confirm = move |_| spawn_with(&ctl, |c| async move { c.confirm_delete().await });

    let open_create = move |_| {
        form.set(RoomForm::default());
        state.update(|s| s.open_create());
    };
    let open_edit = move |room: Room| {
        form.set(RoomForm::from(&room));
        state.update(|s| s.open_edit(room));
    };

    let rows = move || sort.with(|srt| state.with(|s| srt.sorted(&s.rows)));
    let modal_title = Signal::derive(move || {
        state.with(|s| match s.modal {
            Modal::Edit(_) => "Edit Room".to_string(),
            _ => "Add Room".to_string(),
        })
    });

    view! {
        <AdminLayout>
            <Toast state=state />
            <div class="card bg-base-100 shadow-xl">
                <div class="card-body p-0">
                    <div class="flex items-center justify-between p-6 pb-2">
                        <h3 class="card-title">"Rooms"</h3>
                        <button
                            class="btn btn-primary btn-sm"
                            disabled=move || state.with(|s| s.is_busy())
                            on:click=open_create
                        >
                            "Add Room"
                        </button>
                    </div>
                    <div class="overflow-x-auto w-full">
                        <table class="table table-zebra w-full">
                            <thead>
                                <tr>
                                    <SortHeader sort=sort key=RoomSort::Name label="Name" />
                                    <th>"Category"</th>
                                    <SortHeader sort=sort key=RoomSort::Price label="Price" />
                                    <SortHeader sort=sort key=RoomSort::Capacity label="Capacity" />
                                    <th class="hidden md:table-cell">"Description"</th>
                                    <th></th>
                                </tr>
                            </thead>
                            <tbody>
                                <ListStatus state=state colspan=6 empty_text="No rooms found." />
                                <For each=rows key=|room| room.id children=move |room| {
                                    let category = state.with(|s| category_name(&s.lookup, room.category_id));
                                    let id = room.id;
                                    let edit = room.clone();
                                    view! {
                                        <tr>
                                            <td class="font-medium">{room.name.clone()}</td>
                                            <td>{category}</td>
                                            <td>{format_rupiah(room.price)}</td>
                                            <td>{room.capacity}</td>
                                            <td class="hidden md:table-cell">{room.description.clone()}</td>
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
                <div class="form-control">
                    <label class="label">
                        <span class="label-text">"Category"</span>
                    </label>
                    <select
                        class="select select-bordered w-full"
                        on:change=move |ev| form.update(|f| f.category_id = event_target_value(&ev))
                    >
                        <option value="" selected=move || form.with(|f| f.category_id.is_empty())>
                            "Select a category"
                        </option>
                        {move || {
                            state
                                .with(|s| s.lookup.clone())
                                .into_iter()
                                .map(|c| {
                                    let value = c.id.to_string();
                                    let selected = value.clone();
                                    view! {
                                        <option
                                            value=value
                                            selected=move || form.with(|f| f.category_id == selected)
                                        >
                                            {c.name}
                                        </option>
                                    }
                                })
                                .collect_view()
                        }}
                    </select>
                </div>
                <div class="grid grid-cols-2 gap-4">
                    <TextField
                        label="Price"
                        kind="number"
                        value=Signal::derive(move || form.with(|f| f.price.clone()))
                        on_input=move |v| form.update(|f| f.price = v)
                    />
                    <TextField
                        label="Capacity"
                        kind="number"
                        value=Signal::derive(move || form.with(|f| f.capacity.clone()))
                        on_input=move |v| form.update(|f| f.capacity = v)
                    />
                </div>
                <TextField
                    label="Description"
                    value=Signal::derive(move || form.with(|f| f.description.clone()))
                    on_input=move |v| form.update(|f| f.description = v)
                />
            </FormModal>

            <ConfirmDelete state=state what="room" on_confirm=on_confirm />
        </AdminLayout>
    }
}
