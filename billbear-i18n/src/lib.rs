#[cfg(all(feature = "ja", feature = "en"))]
compile_error!("Cannot enable both 'ja' and 'en' features at the same time");

use std::fmt::Display;

#[cfg(feature = "ja")]
pub mod strings {
    pub const PARTICIPANT: &str = "参加者";
    pub const ITEM: &str = "品目";
    pub const QUANTITY: &str = "数量";
    pub const UNIT_PRICE: &str = "単価";
    pub const LINE_TOTAL: &str = "小計";
    pub const SHARED_BY: &str = "分担者";
    pub const ITEMS: &str = "品目計";
    pub const TAX: &str = "税";
    pub const SERVICE_CHARGE: &str = "サービス料";
    pub const DISCOUNT: &str = "割引";
    pub const SHARE: &str = "割合";
    pub const TOTAL: &str = "支払額";
    pub const SUBTOTAL: &str = "小計";
    pub const GRAND_TOTAL: &str = "合計";
    pub const UNASSIGNED: &str = "未割り当て";
    pub const EMPTY_RECEIPT: &str =
        "品目の小計が0ですが、税・サービス料・割引があるため按分できません";
    pub const ALLOCATION_OVERFLOW: &str = "按分計算が桁あふれしました";
    pub const ROUNDING_NOTE: &str =
        "* 各列は個別に端数処理しているため、列の和と支払額がわずかに異なります。支払額が正しい金額です。";
}

#[cfg(not(feature = "ja"))]
pub mod strings {
    pub const PARTICIPANT: &str = "Participant";
    pub const ITEM: &str = "Item";
    pub const QUANTITY: &str = "Qty";
    pub const UNIT_PRICE: &str = "Price";
    pub const LINE_TOTAL: &str = "Line total";
    pub const SHARED_BY: &str = "Shared by";
    pub const ITEMS: &str = "Items";
    pub const TAX: &str = "Tax";
    pub const SERVICE_CHARGE: &str = "Service";
    pub const DISCOUNT: &str = "Discount";
    pub const SHARE: &str = "Share";
    pub const TOTAL: &str = "Total";
    pub const SUBTOTAL: &str = "Subtotal";
    pub const GRAND_TOTAL: &str = "Grand total";
    pub const UNASSIGNED: &str = "Unassigned";
    pub const EMPTY_RECEIPT: &str =
        "The receipt has no item subtotal but carries tax, service charge or discount";
    pub const ALLOCATION_OVERFLOW: &str = "The split calculation overflowed";
    pub const ROUNDING_NOTE: &str =
        "* Columns are rounded separately and may not add up to the total. The total is what is owed.";
}

pub use strings::*;

#[cfg(feature = "ja")]
pub fn item_without_selectors(item: impl Display) -> String {
    format!("「{item}」を選んだ参加者がいません")
}

#[cfg(feature = "ja")]
pub fn zero_weight(item: impl Display, participant: impl Display) -> String {
    format!("「{item}」の {participant} の割合が0です")
}

#[cfg(feature = "ja")]
pub fn unknown_participant(participant: impl Display) -> String {
    format!("参加者 {participant} は名簿にいません")
}

#[cfg(feature = "ja")]
pub fn duplicate_participant(participant: impl Display) -> String {
    format!("参加者 {participant} が重複しています")
}

#[cfg(feature = "ja")]
pub fn duplicate_selector(item: impl Display, participant: impl Display) -> String {
    format!("「{item}」に {participant} が二重に登録されています")
}

#[cfg(feature = "ja")]
pub fn unknown_item(item: impl Display) -> String {
    format!("レシートに「{item}」という品目はありません")
}

#[cfg(feature = "ja")]
pub fn receipt_unreadable(detail: impl Display) -> String {
    format!("レシートを読み取れませんでした: {detail}")
}

#[cfg(feature = "ja")]
pub fn invalid_amount(field: impl Display, value: impl Display) -> String {
    format!("{field} の金額 '{value}' を解釈できません")
}

#[cfg(feature = "ja")]
pub fn invalid_receipt(detail: impl Display) -> String {
    format!("レシートの内容が不正です: {detail}")
}

#[cfg(feature = "ja")]
pub fn total_mismatch(label: impl Display, stated: impl Display, computed: impl Display) -> String {
    format!("レシート記載の{label} {stated} と計算値 {computed} が一致しません")
}

#[cfg(not(feature = "ja"))]
pub fn item_without_selectors(item: impl Display) -> String {
    format!("Nobody picked '{item}'")
}

#[cfg(not(feature = "ja"))]
pub fn zero_weight(item: impl Display, participant: impl Display) -> String {
    format!("'{item}' gives {participant} a zero share")
}

#[cfg(not(feature = "ja"))]
pub fn unknown_participant(participant: impl Display) -> String {
    format!("{participant} is not on the roster")
}

#[cfg(not(feature = "ja"))]
pub fn duplicate_participant(participant: impl Display) -> String {
    format!("{participant} is listed more than once")
}

#[cfg(not(feature = "ja"))]
pub fn duplicate_selector(item: impl Display, participant: impl Display) -> String {
    format!("{participant} is listed twice on '{item}'")
}

#[cfg(not(feature = "ja"))]
pub fn unknown_item(item: impl Display) -> String {
    format!("The receipt has no item called '{item}'")
}

#[cfg(not(feature = "ja"))]
pub fn receipt_unreadable(detail: impl Display) -> String {
    format!("Could not read the receipt: {detail}")
}

#[cfg(not(feature = "ja"))]
pub fn invalid_amount(field: impl Display, value: impl Display) -> String {
    format!("Could not understand {field} amount '{value}'")
}

#[cfg(not(feature = "ja"))]
pub fn invalid_receipt(detail: impl Display) -> String {
    format!("The receipt is not valid: {detail}")
}

#[cfg(not(feature = "ja"))]
pub fn total_mismatch(label: impl Display, stated: impl Display, computed: impl Display) -> String {
    format!("The receipt says {label} is {stated} but its lines add up to {computed}")
}
