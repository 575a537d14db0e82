//! Order status codes.
//!
//! Statuses are persisted as integer bit flags. The table below is add-only: a code,
//! once assigned, is never renumbered, reused or removed, because orders written years
//! ago still carry it. Codes this build does not know decode to
//! [`OrderStatus::Unknown`] instead of failing.

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "i32", into = "i32")]
pub enum OrderStatus {
    New,
    Accepted,
    Assembling,
    Canceled,
    Frozen,
    Transferred,
    Assembled,
    InDelivery,
    Delivered,
    DeliveredToStore,
    DeliveredToCarrier,
    Consultation,
    Problem,
    Completed,
    Fulfilled,
    /// A code stored by a newer revision of the schema.
    Unknown(i32),
}

/// Append new statuses at the end with the next free bit.
const STATUS_TABLE: &[(i32, OrderStatus, &str)] = &[
    (1, OrderStatus::New, "Новый"),
    (2, OrderStatus::Accepted, "Принят"),
    (4, OrderStatus::Assembling, "Собирается"),
    (8, OrderStatus::Canceled, "Отменён"),
    (16, OrderStatus::Frozen, "Заморожен"),
    (32, OrderStatus::Transferred, "Передан"),
    (64, OrderStatus::Assembled, "Собран"),
    (128, OrderStatus::InDelivery, "Доставляется"),
    (256, OrderStatus::Delivered, "Доставлен"),
    (512, OrderStatus::DeliveredToStore, "Доставлен в магазин"),
    (1024, OrderStatus::DeliveredToCarrier, "Передан в транспортную компанию"),
    (2048, OrderStatus::Consultation, "Консультация"),
    (4096, OrderStatus::Problem, "Проблема"),
    (8192, OrderStatus::Completed, "Завершён"),
    (16384, OrderStatus::Fulfilled, "Выполнен"),
];

const UNKNOWN_LABEL: &str = "Неизвестный статус";

impl OrderStatus {
    /// Decodes a stored code. Never fails.
    pub fn from_code(code: i32) -> Self {
        STATUS_TABLE
            .iter()
            .find(|(c, _, _)| *c == code)
            .map(|(_, status, _)| *status)
            .unwrap_or(OrderStatus::Unknown(code))
    }

    pub fn code(self) -> i32 {
        match self {
            OrderStatus::Unknown(code) => code,
            known => STATUS_TABLE
                .iter()
                .find(|(_, status, _)| *status == known)
                .map(|(code, _, _)| *code)
                .unwrap_or_default(),
        }
    }

    pub fn label(self) -> &'static str {
        STATUS_TABLE
            .iter()
            .find(|(_, status, _)| *status == self)
            .map(|(_, _, label)| *label)
            .unwrap_or(UNKNOWN_LABEL)
    }

    pub fn is_known(self) -> bool {
        !matches!(self, OrderStatus::Unknown(_))
    }

    /// Statuses after which the order needs no more work from staff.
    pub fn is_final(self) -> bool {
        matches!(
            self,
            OrderStatus::Canceled | OrderStatus::Completed | OrderStatus::Fulfilled
        )
    }

    /// Every known status, in code order.
    pub fn all() -> impl Iterator<Item = OrderStatus> {
        STATUS_TABLE.iter().map(|(_, status, _)| *status)
    }

    /// `(code, label)` pairs for admin choice lists.
    pub fn choices() -> impl Iterator<Item = (i32, &'static str)> {
        STATUS_TABLE.iter().map(|(code, _, label)| (*code, *label))
    }

    /// Combines statuses into a bit mask for filtering.
    pub fn mask(statuses: &[OrderStatus]) -> i32 {
        statuses.iter().fold(0, |acc, status| acc | status.code())
    }

    /// Whether this status is one of the statuses in `mask`.
    pub fn in_mask(self, mask: i32) -> bool {
        let code = self.code();
        code != 0 && mask & code == code
    }

    /// Expands a mask back into known statuses.
    pub fn from_mask(mask: i32) -> Vec<OrderStatus> {
        OrderStatus::all().filter(|s| s.in_mask(mask)).collect()
    }
}

impl From<i32> for OrderStatus {
    fn from(code: i32) -> Self {
        OrderStatus::from_code(code)
    }
}

impl From<OrderStatus> for i32 {
    fn from(status: OrderStatus) -> Self {
        status.code()
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OrderStatus::Unknown(code) => write!(f, "{} ({})", UNKNOWN_LABEL, code),
            known => f.write_str(known.label()),
        }
    }
}

impl Default for OrderStatus {
    fn default() -> Self {
        OrderStatus::New
    }
}
