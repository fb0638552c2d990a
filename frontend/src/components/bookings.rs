//! 预订管理页面

use crate::components::common::{
    ConfirmDelete, FormModal, ListStatus, Pagination, SortHeader, Toast, spawn_with, use_api,
    use_list,
};
use crate::components::layout::AdminLayout;
use crate::forms::BookingForm;
use crate::session::observer::use_session;
use crate::state::list_view::Modal;
use crate::state::sort::{BookingSort, SortState};
use crate::state::source::{BookingsSource, booking_room_name};
use leptos::prelude::*;
use simaru_shared::Booking;

/// 预订人显示名
pub fn booker_name(booking: &Booking) -> String {
    booking
        .user
        .as_ref()
        .map(|u| u.name.trim())
        .filter(|n| !n.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| format!("User #{}", booking.user_id))
}

fn status_badge(status: &str) -> &'static str {
    match status.to_ascii_lowercase().as_str() {
        "approved" | "confirmed" | "completed" => "badge badge-success",
        "rejected" | "cancelled" | "canceled" => "badge badge-error",
        _ => "badge badge-warning",
    }
}

#[component]
pub fn BookingsPage() -> impl IntoView {
    let session = use_session();
    let ctl = use_list(BookingsSource::new(use_api()));
    let state = *ctl.state();
    let form = RwSignal::new(BookingForm::default());
    let sort = RwSignal::new(SortState::<BookingSort>::default());

    Effect::new(move |prev: Option<u64>| {
        let epoch = state.with(|s| s.form_epoch);
        if prev.is_some_and(|p| p != epoch) {
            form.set(BookingForm::default());
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
            let user = session.user.get_untracked();
            let editing = state.with_untracked(|s| match &s.modal {
                Modal::Edit(booking) => Some(booking.clone()),
                _ => None,
            });
            let payload = form.with_untracked(|f| f.to_payload(user.as_ref(), editing.as_ref()));
            spawn_with(&ctl, move |c| async move { c.submit(payload).await });
        }
    };
    let on_confirm = move |_| spawn_with(&ctl, |c| async move { c.confirm_delete().await });

    let open_create = move |_| {
        form.set(BookingForm::default());
        state.update(|s| s.open_create());
    };
    let open_edit = move |booking: Booking| {
        form.set(BookingForm::from(&booking));
        state.update(|s| s.open_edit(booking));
    };

    let rows = move || sort.with(|srt| state.with(|s| srt.sorted(&s.rows)));
    let modal_title = Signal::derive(move || {
        state.with(|s| match s.modal {
            Modal::Edit(_) => "Edit Booking".to_string(),
            _ => "New Booking".to_string(),
        })
    });

    view! {
        <AdminLayout>
            <Toast state=state />
            <div class="card bg-base-100 shadow-xl">
                <div class="card-body p-0">
                    <div class="flex items-center justify-between p-6 pb-2">
                        <h3 class="card-title">"Bookings"</h3>
                        <button
                            class="btn btn-primary btn-sm"
                            disabled=move || state.with(|s| s.is_busy())
                            on:click=open_create
                        >
                            "New Booking"
                        </button>
                    </div>
                    <div class="overflow-x-auto w-full">
                        <table class="table table-zebra w-full">
                            <thead>
                                <tr>
                                    <SortHeader sort=sort key=BookingSort::Date label="Date" />
                                    <th>"Room"</th>
                                    <th>"Booked by"</th>
                                    <SortHeader sort=sort key=BookingSort::Status label="Status" />
                                    <th></th>
                                </tr>
                            </thead>
                            <tbody>
                                <ListStatus state=state colspan=5 empty_text="No bookings found." />
                                <For each=rows key=|b| b.id children=move |booking| {
                                    let room = state.with(|s| booking_room_name(&booking, &s.lookup));
                                    let id = booking.id;
                                    let edit = booking.clone();
                                    view! {
                                        <tr>
                                            <td>{booking.booking_date.clone()}</td>
                                            <td>{room}</td>
                                            <td>{booker_name(&booking)}</td>
                                            <td>
                                                <span class=status_badge(&booking.status)>
                                                    {booking.status.clone()}
                                                </span>
                                            </td>
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
                <div class="form-control">
                    <label class="label">
                        <span class="label-text">"Booking date"</span>
                    </label>
                    <input
                        type="date"
                        class="input input-bordered w-full"
                        prop:value=move || form.with(|f| f.booking_date.clone())
                        on:input=move |ev| form.update(|f| f.booking_date = event_target_value(&ev))
                    />
                </div>
                <div class="form-control">
                    <label class="label">
                        <span class="label-text">"Room"</span>
                    </label>
                    <select
                        class="select select-bordered w-full"
                        on:change=move |ev| form.update(|f| f.room_id = event_target_value(&ev))
                    >
                        <option value="" selected=move || form.with(|f| f.room_id.is_empty())>
                            "Select a room"
                        </option>
                        {move || {
                            state
                                .with(|s| s.lookup.clone())
                                .into_iter()
                                .map(|room| {
                                    let value = room.id.to_string();
                                    let selected = value.clone();
                                    view! {
                                        <option
                                            value=value
                                            selected=move || form.with(|f| f.room_id == selected)
                                        >
                                            {room.name}
                                        </option>
                                    }
                                })
                                .collect_view()
                        }}
                    </select>
                </div>
            </FormModal>

            <ConfirmDelete state=state what="booking" on_confirm=on_confirm />
        </AdminLayout>
    }
}
