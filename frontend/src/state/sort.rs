//! 客户端排序
//!
//! 只对当前已加载的一页数据排序，使用稳定排序；重复点击同一列时
//! 在升序/降序之间切换。

use simaru_shared::{Booking, BookingDate, Room, User};
use std::cmp::Ordering;

/// 排序列
pub trait SortKey<T>: Copy + Eq {
    fn compare(self, a: &T, b: &T) -> Ordering;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Ascending,
    Descending,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortState<K> {
    pub key: Option<K>,
    pub direction: Direction,
}

impl<K> Default for SortState<K> {
    fn default() -> Self {
        Self {
            key: None,
            direction: Direction::Ascending,
        }
    }
}

impl<K: Copy + Eq> SortState<K> {
    /// 点击某一列：同一列切换方向，新列从升序开始
    pub fn toggle(&mut self, key: K) {
        if self.key == Some(key) {
            self.direction = match self.direction {
                Direction::Ascending => Direction::Descending,
                Direction::Descending => Direction::Ascending,
            };
        } else {
            self.key = Some(key);
            self.direction = Direction::Ascending;
        }
    }

    pub fn indicator(&self, key: K) -> &'static str {
        match (self.key == Some(key), self.direction) {
            (false, _) => "",
            (true, Direction::Ascending) => " ▲",
            (true, Direction::Descending) => " ▼",
        }
    }

    pub fn sorted<T: Clone>(&self, rows: &[T]) -> Vec<T>
    where
        K: SortKey<T>,
    {
        let mut rows = rows.to_vec();
        if let Some(key) = self.key {
            // sort_by 是稳定排序；降序时反转比较结果而非反转数组，相等元素保持原顺序
            rows.sort_by(|a, b| match self.direction {
                Direction::Ascending => key.compare(a, b),
                Direction::Descending => key.compare(b, a),
            });
        }
        rows
    }
}

fn text(a: &str, b: &str) -> Ordering {
    a.to_lowercase().cmp(&b.to_lowercase())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoomSort {
    Name,
    Price,
    Capacity,
}

impl SortKey<Room> for RoomSort {
    fn compare(self, a: &Room, b: &Room) -> Ordering {
        match self {
            RoomSort::Name => text(&a.name, &b.name),
            RoomSort::Price => a.price.total_cmp(&b.price),
            RoomSort::Capacity => a.capacity.cmp(&b.capacity),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BookingSort {
    Date,
    Status,
}

impl SortKey<Booking> for BookingSort {
    fn compare(self, a: &Booking, b: &Booking) -> Ordering {
        match self {
            // 无法解析的日期排在最后
            BookingSort::Date => match (
                BookingDate::parse(&a.booking_date),
                BookingDate::parse(&b.booking_date),
            ) {
                (Some(x), Some(y)) => x.cmp(&y),
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (None, None) => Ordering::Equal,
            },
            BookingSort::Status => text(&a.status, &b.status),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserSort {
    Name,
    Email,
}

impl SortKey<User> for UserSort {
    fn compare(self, a: &User, b: &User) -> Ordering {
        match self {
            UserSort::Name => text(&a.name, &b.name),
            UserSort::Email => text(&a.email, &b.email),
        }
    }
}
