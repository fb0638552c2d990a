use crate::wire::{lenient, BookingWire, CategoryWire, ProfileWire, RoomWire, UserWire};
use crate::{Booking, BookingPayload, Category, Room, RoomPayload, User, UserPayload};
use serde::{Deserialize, Serialize, de::DeserializeOwned};

/// HTTP Methods for API Requests
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
        }
    }
}

// =========================================================
// Endpoint Paths
// =========================================================

pub const PATH_LOGIN: &str = "/auth/login";
pub const PATH_REGISTER: &str = "/auth/register";
pub const PATH_PROFILE: &str = "/auth/me";
pub const PATH_CATEGORIES: &str = "/categories";

/// A backend entity exposed through the uniform CRUD endpoints.
///
/// Binds the local model to its collection path, its lenient wire shape and
/// the payload accepted by create/update.
pub trait Resource: Clone + Sized {
    /// Lenient response shape, normalized through `From`.
    type Wire: DeserializeOwned + Into<Self>;
    /// Body sent on create (`POST`) and update (`PUT`).
    type Payload: Serialize;
    /// Collection path, e.g. `/rooms`.
    const PATH: &'static str;
    /// Human-readable noun used in fallback error messages.
    const LABEL: &'static str;

    fn id(&self) -> u64;
}

/// Path of a single item: `{PATH}/{id}`
pub fn item_path<R: Resource>(id: u64) -> String {
    format!("{}/{}", R::PATH, id)
}

/// Collection path with optional pagination query.
pub fn list_path<R: Resource>(page: Option<u32>, per_page: Option<u32>) -> String {
    let mut query = Vec::new();
    if let Some(page) = page {
        query.push(format!("page={page}"));
    }
    if let Some(per_page) = per_page {
        query.push(format!("per_page={per_page}"));
    }
    if query.is_empty() {
        R::PATH.to_string()
    } else {
        format!("{}?{}", R::PATH, query.join("&"))
    }
}

impl Resource for Room {
    type Wire = RoomWire;
    type Payload = RoomPayload;
    const PATH: &'static str = "/rooms";
    const LABEL: &'static str = "room";

    fn id(&self) -> u64 {
        self.id
    }
}

impl Resource for Booking {
    type Wire = BookingWire;
    type Payload = BookingPayload;
    const PATH: &'static str = "/bookings";
    const LABEL: &'static str = "booking";

    fn id(&self) -> u64 {
        self.id
    }
}

impl Resource for User {
    type Wire = UserWire;
    type Payload = UserPayload;
    const PATH: &'static str = "/users";
    const LABEL: &'static str = "user";

    fn id(&self) -> u64 {
        self.id
    }
}

// =========================================================
// Response Envelopes
// =========================================================

/// One page of normalized entities.
///
/// `total_pages` is always at least 1; endpoints that do not report a total
/// are treated as a single page.
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub data: Vec<T>,
    pub total_pages: u32,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PageMeta {
    #[serde(default, deserialize_with = "lenient::de_opt_u32")]
    pub last_page: Option<u32>,
}

/// List responses are either `{ data: [...], totalPages }` or a bare array.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum ListEnvelope<W> {
    Paged {
        data: Vec<W>,
        #[serde(
            default,
            rename = "totalPages",
            alias = "total_pages",
            alias = "last_page",
            deserialize_with = "lenient::de_opt_u32"
        )]
        total_pages: Option<u32>,
        #[serde(default)]
        meta: Option<PageMeta>,
    },
    Bare(Vec<W>),
}

impl<W> ListEnvelope<W> {
    pub fn into_page<T>(self) -> Page<T>
    where
        W: Into<T>,
    {
        let (data, total_pages) = match self {
            ListEnvelope::Paged {
                data,
                total_pages,
                meta,
            } => (
                data,
                total_pages.or_else(|| meta.and_then(|m| m.last_page)),
            ),
            ListEnvelope::Bare(data) => (data, None),
        };
        Page {
            data: data.into_iter().map(Into::into).collect(),
            total_pages: total_pages.unwrap_or(1).max(1),
        }
    }
}

/// Single-item responses are either `{ data: {...} }` or the bare object.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum ItemEnvelope<W> {
    Wrapped { data: W },
    Flat(W),
}

impl<W> ItemEnvelope<W> {
    pub fn into_inner(self) -> W {
        match self {
            ItemEnvelope::Wrapped { data } => data,
            ItemEnvelope::Flat(w) => w,
        }
    }
}

/// `/auth/me` may answer `{ data }`, `{ user }` or the bare profile.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum ProfileEnvelope {
    Data { data: ProfileWire },
    User { user: ProfileWire },
    Flat(ProfileWire),
}

impl ProfileEnvelope {
    pub fn into_inner(self) -> ProfileWire {
        match self {
            ProfileEnvelope::Data { data } => data,
            ProfileEnvelope::User { user } => user,
            ProfileEnvelope::Flat(p) => p,
        }
    }
}

/// Login/register response. Only the token is consumed; the profile is
/// always fetched separately from `/auth/me`.
#[derive(Debug, Default, Deserialize)]
pub struct TokenResponse {
    #[serde(
        default,
        rename = "accessToken",
        alias = "access_token",
        alias = "token",
        deserialize_with = "lenient::de_opt_string"
    )]
    pub access_token: Option<String>,
    #[serde(default)]
    pub data: Option<Box<TokenResponse>>,
}

impl TokenResponse {
    pub fn into_token(self) -> Option<String> {
        let nested = self.data.and_then(|d| d.into_token());
        self.access_token
            .filter(|t| !t.trim().is_empty())
            .or(nested)
    }
}

/// Categories come back as a bare array (occasionally wrapped in `data`).
pub fn parse_categories(body: &str) -> serde_json::Result<Vec<Category>> {
    let envelope: ListEnvelope<CategoryWire> = serde_json::from_str(body)?;
    Ok(envelope.into_page().data)
}

/// Error body sent by the backend on non-success statuses.
#[derive(Debug, Default, Deserialize)]
pub struct ErrorBody {
    #[serde(default, deserialize_with = "lenient::de_opt_string")]
    pub message: Option<String>,
    #[serde(default, deserialize_with = "lenient::de_opt_string")]
    pub error: Option<String>,
}

impl ErrorBody {
    pub fn into_message(self) -> Option<String> {
        self.message
            .or(self.error)
            .map(|m| m.trim().to_string())
            .filter(|m| !m.is_empty())
    }
}
