use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SeatType {
    Regular,
    Premium,
    Vip,
}

impl SeatType {
    pub fn as_str(&self) -> &'static str {
        match self {
            SeatType::Regular => "regular",
            SeatType::Premium => "premium",
            SeatType::Vip => "vip",
        }
    }

    pub fn parse(s: &str) -> Option<SeatType> {
        match s {
            "regular" => Some(SeatType::Regular),
            "premium" => Some(SeatType::Premium),
            "vip" => Some(SeatType::Vip),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Seat {
    pub id: Uuid,
    pub theater_id: Uuid,
    pub row_label: String,
    pub seat_number: i64,
    pub seat_type: SeatType,
}

impl Seat {
    /// Human-readable label, e.g. "A12".
    pub fn seat_label(&self) -> String {
        format!("{}{}", self.row_label, self.seat_number)
    }
}
