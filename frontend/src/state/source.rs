//! 列表数据源
//!
//! 每个列表视图对应一个数据源：一页实体加上视图需要的查找数据。
//! 相互独立的请求通过 `futures::join!` 并发发出。

use crate::api::ApiClient;
use crate::error::ApiError;
use crate::web::http::HttpClient;
use crate::web::storage::KeyValueStore;
use simaru_shared::protocol::{Page, Resource};
use simaru_shared::{Booking, Category, Room, User};

/// 加载房间选项时每次请求的条数
const ROOM_LOOKUP_PER_PAGE: u32 = 100;

#[async_trait::async_trait(?Send)]
pub trait ListSource {
    type Item: Resource;
    type Lookup: Default;

    async fn load(&self, page: u32, per_page: u32) -> Result<(Page<Self::Item>, Self::Lookup), ApiError>;

    async fn create(&self, payload: &<Self::Item as Resource>::Payload) -> Result<Self::Item, ApiError>;

    async fn update(
        &self,
        id: u64,
        payload: &<Self::Item as Resource>::Payload,
    ) -> Result<Self::Item, ApiError>;

    async fn delete(&self, id: u64) -> Result<(), ApiError>;
}

/// 三种资源共用的增删改实现，`load` 由调用处给出
macro_rules! crud_source {
    ($source:ident, $item:ty, $lookup:ty, |$this:ident, $page:ident, $per_page:ident| $load:block) => {
        #[derive(Debug, Clone, PartialEq)]
        pub struct $source<H, S> {
            api: ApiClient<H, S>,
        }

        impl<H, S> $source<H, S> {
            pub fn new(api: ApiClient<H, S>) -> Self {
                Self { api }
            }
        }

        #[async_trait::async_trait(?Send)]
        impl<H: HttpClient, S: KeyValueStore> ListSource for $source<H, S> {
            type Item = $item;
            type Lookup = $lookup;

            async fn load(&self, $page: u32, $per_page: u32) -> Result<(Page<$item>, $lookup), ApiError> {
                let $this = self;
                $load
            }

            async fn create(&self, payload: &<$item as Resource>::Payload) -> Result<$item, ApiError> {
                self.api.create::<$item>(payload).await
            }

            async fn update(&self, id: u64, payload: &<$item as Resource>::Payload) -> Result<$item, ApiError> {
                self.api.update::<$item>(id, payload).await
            }

            async fn delete(&self, id: u64) -> Result<(), ApiError> {
                self.api.delete::<$item>(id).await
            }
        }
    };
}

// 房间列表 + 分类
crud_source!(RoomsSource, Room, Vec<Category>, |this, page, per_page| {
    let (rooms, categories) = futures::join!(
        this.api.list::<Room>(Some(page), Some(per_page)),
        this.api.categories()
    );
    Ok((rooms?, categories?))
});

// 预订列表 + 房间选项
crud_source!(BookingsSource, Booking, Vec<Room>, |this, page, per_page| {
    let (bookings, rooms) = futures::join!(
        this.api.list::<Booking>(Some(page), Some(per_page)),
        all_rooms(&this.api)
    );
    Ok((bookings?, rooms?))
});

/// 全部房间：先取第一页得到总页数，其余页并发获取
async fn all_rooms<H: HttpClient, S: KeyValueStore>(
    api: &ApiClient<H, S>,
) -> Result<Vec<Room>, ApiError> {
    let first = api.list::<Room>(Some(1), Some(ROOM_LOOKUP_PER_PAGE)).await?;
    let rest = futures::future::try_join_all(
        (2..=first.total_pages).map(|page| api.list::<Room>(Some(page), Some(ROOM_LOOKUP_PER_PAGE))),
    )
    .await?;

    let mut rooms = first.data;
    rooms.extend(rest.into_iter().flat_map(|page| page.data));
    Ok(rooms)
}

crud_source!(UsersSource, User, (), |this, page, per_page| {
    Ok((this.api.list::<User>(Some(page), Some(per_page)).await?, ()))
});

/// 分类 id 对应的名称，未知分类显示 `Unknown`
pub fn category_name(categories: &[Category], id: u64) -> String {
    categories
        .iter()
        .find(|c| c.id == id)
        .map(|c| c.name.clone())
        .unwrap_or_else(|| "Unknown".to_string())
}

/// 预订行显示的房间名：优先使用内嵌摘要，其次查房间列表
pub fn booking_room_name(booking: &Booking, rooms: &[Room]) -> String {
    booking
        .room
        .as_ref()
        .map(|r| r.name.clone())
        .or_else(|| {
            rooms
                .iter()
                .find(|r| r.id == booking.room_id)
                .map(|r| r.name.clone())
        })
        .unwrap_or_else(|| format!("Room #{}", booking.room_id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::store::SessionStore;
    use crate::web::http::MockHttpClient;
    use crate::web::storage::MemoryStorage;
    use serde_json::json;
    use simaru_shared::protocol::HttpMethod;
    use simaru_shared::{Session, SessionUser};

    const BASE: &str = "https://api.test";

    fn api() -> (ApiClient<MockHttpClient, MemoryStorage>, MockHttpClient) {
        let http = MockHttpClient::new();
        let store = SessionStore::new(MemoryStorage::new());
        store.write(&Session {
            user: SessionUser {
                id: 1,
                name: "A".into(),
                email: "a@b.com".into(),
                avatar: None,
            },
            access_token: "tok1".into(),
        });
        (ApiClient::new(http.clone(), store, BASE), http)
    }

    #[tokio::test]
    async fn rooms_load_with_categories() {
        let (api, http) = api();
        http.mock_response(
            HttpMethod::Get,
            &format!("{BASE}/rooms?page=1&per_page=10"),
            200,
            json!({ "data": [{ "id": 1, "name": "Room A", "categoryId": 2 }], "totalPages": 2 }),
        );
        http.mock_response(
            HttpMethod::Get,
            &format!("{BASE}/categories"),
            200,
            json!([{ "id": 2, "name": "Meeting" }]),
        );

        let (page, categories) = RoomsSource::new(api).load(1, 10).await.unwrap();
        assert_eq!(page.total_pages, 2);
        assert_eq!(category_name(&categories, page.data[0].category_id), "Meeting");
        assert_eq!(category_name(&categories, 99), "Unknown");
    }

    #[tokio::test]
    async fn lookup_failure_surfaces_as_error() {
        let (api, http) = api();
        http.mock_response(
            HttpMethod::Get,
            &format!("{BASE}/rooms?page=1&per_page=10"),
            200,
            json!({ "data": [] }),
        );
        http.mock_raw(HttpMethod::Get, &format!("{BASE}/categories"), 500, "oops");

        let err = RoomsSource::new(api).load(1, 10).await.unwrap_err();
        assert_eq!(err.status(), Some(500));
        assert_eq!(http.count(HttpMethod::Get, &format!("{BASE}/categories")), 1);
    }

    #[tokio::test]
    async fn bookings_load_room_options() {
        let (api, http) = api();
        http.mock_response(
            HttpMethod::Get,
            &format!("{BASE}/bookings?page=1&per_page=5"),
            200,
            json!([{ "id": 1, "booking_date": "2024-05-01", "room_id": 3, "user_id": 1, "status": "pending" }]),
        );
        http.mock_response(
            HttpMethod::Get,
            &format!("{BASE}/rooms?page=1&per_page=100"),
            200,
            json!({ "data": [{ "id": 3, "name": "Hall" }] }),
        );

        let (page, rooms) = BookingsSource::new(api).load(1, 5).await.unwrap();
        assert_eq!(booking_room_name(&page.data[0], &rooms), "Hall");
    }

    #[tokio::test]
    async fn room_options_span_every_page() {
        let (api, http) = api();
        http.mock_response(
            HttpMethod::Get,
            &format!("{BASE}/bookings?page=1&per_page=5"),
            200,
            json!([{ "id": 1, "booking_date": "2024-05-01", "room_id": 101, "user_id": 1, "status": "pending" }]),
        );
        http.mock_response(
            HttpMethod::Get,
            &format!("{BASE}/rooms?page=1&per_page=100"),
            200,
            json!({ "data": [{ "id": 1, "name": "Hall" }], "totalPages": 2 }),
        );
        http.mock_response(
            HttpMethod::Get,
            &format!("{BASE}/rooms?page=2&per_page=100"),
            200,
            json!({ "data": [{ "id": 101, "name": "Annex" }], "totalPages": 2 }),
        );

        let (page, rooms) = BookingsSource::new(api).load(1, 5).await.unwrap();
        let ids: Vec<u64> = rooms.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![1, 101]);
        assert_eq!(booking_room_name(&page.data[0], &rooms), "Annex");
        assert_eq!(http.count(HttpMethod::Get, &format!("{BASE}/rooms?page=2&per_page=100")), 1);
    }

    #[test]
    fn embedded_room_name_wins() {
        let booking = Booking {
            id: 1,
            booking_date: "2024-05-01".into(),
            room_id: 3,
            user_id: 1,
            status: "pending".into(),
            room: Some(simaru_shared::BookingRoom {
                name: "Embedded".into(),
                price: 0.0,
                capacity: 0,
            }),
            user: None,
        };
        assert_eq!(booking_room_name(&booking, &[]), "Embedded");
        let bare = Booking { room: None, ..booking };
        assert_eq!(booking_room_name(&bare, &[]), "Room #3");
    }
}
