use indexmap::IndexMap;
use rust_decimal::{Decimal, prelude::ToPrimitive};
use std::{
    fmt,
    iter::Sum,
    ops::{Add, AddAssign, Neg, Sub, SubAssign},
};
use thiserror::Error;

/// Amount in integer minor currency units (paise, cents, ...).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Money(i64);

impl Money {
    pub const ZERO: Self = Self(0);

    pub const fn from_minor(units: i64) -> Self {
        Self(units)
    }

    pub const fn minor_units(self) -> i64 {
        self.0
    }

    pub fn is_zero(self) -> bool {
        self.0 == 0
    }

    pub fn is_negative(self) -> bool {
        self.0 < 0
    }

    pub fn signum(self) -> i64 {
        self.0.signum()
    }

    pub fn abs(self) -> Self {
        Self(self.0.abs())
    }

    pub fn checked_add(self, rhs: Self) -> Option<Self> {
        self.0.checked_add(rhs.0).map(Self)
    }

    pub fn checked_sub(self, rhs: Self) -> Option<Self> {
        self.0.checked_sub(rhs.0).map(Self)
    }

    pub fn checked_mul(self, factor: u32) -> Option<Self> {
        self.0.checked_mul(i64::from(factor)).map(Self)
    }

    /// Converts a major-unit decimal (e.g. `11.50`) into minor units at `scale`.
    ///
    /// Returns `None` when the value carries more fractional digits than `scale`
    /// allows, when `10^scale` is outside the `Decimal` range, or when the
    /// result does not fit into `i64`.
    pub fn from_decimal(value: Decimal, scale: u32) -> Option<Self> {
        let factor = Decimal::try_from_i128_with_scale(10_i128.checked_pow(scale)?, 0).ok()?;
        let units = value.checked_mul(factor)?;
        if units.fract() != Decimal::ZERO {
            return None;
        }
        units.to_i64().map(Self)
    }

    /// Major-unit view of this amount at `scale`.
    pub fn to_decimal(self, scale: u32) -> Option<Decimal> {
        Decimal::try_new(self.0, scale).ok()
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Add for Money {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0 + rhs.0)
    }
}

impl AddAssign for Money {
    fn add_assign(&mut self, rhs: Self) {
        self.0 += rhs.0;
    }
}

impl Sub for Money {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Self(self.0 - rhs.0)
    }
}

impl SubAssign for Money {
    fn sub_assign(&mut self, rhs: Self) {
        self.0 -= rhs.0;
    }
}

impl Neg for Money {
    type Output = Self;

    fn neg(self) -> Self::Output {
        Self(-self.0)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Money::ZERO, Add::add)
    }
}

impl<'a> Sum<&'a Money> for Money {
    fn sum<I: Iterator<Item = &'a Money>>(iter: I) -> Self {
        iter.copied().sum()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ParticipantId(pub u64);

impl fmt::Display for ParticipantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Participant {
    pub id: ParticipantId,
    pub name: String,
}

impl Participant {
    pub fn new(id: u64, name: impl Into<String>) -> Self {
        Self {
            id: ParticipantId(id),
            name: name.into(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Item {
    pub name: String,
    pub unit_price: Money,
    pub quantity: u32,
}

impl Item {
    pub fn new(name: impl Into<String>, unit_price: Money, quantity: u32) -> Self {
        Self {
            name: name.into(),
            unit_price,
            quantity,
        }
    }

    pub fn line_total(&self) -> Option<Money> {
        self.unit_price.checked_mul(self.quantity)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AdjustmentKind {
    Tax,
    ServiceCharge,
    Discount,
}

impl fmt::Display for AdjustmentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            AdjustmentKind::Tax => "tax",
            AdjustmentKind::ServiceCharge => "service charge",
            AdjustmentKind::Discount => "discount",
        };
        f.write_str(label)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ReceiptError {
    #[error("item {index} has zero quantity")]
    ZeroQuantity { index: usize },
    #[error("item {index} has a negative price ({price})")]
    NegativePrice { index: usize, price: Money },
    #[error("{kind} must not be negative ({amount})")]
    NegativeAdjustment { kind: AdjustmentKind, amount: Money },
    #[error("receipt amounts overflow")]
    Overflow,
    #[error("discount exceeds the receipt total (grand total would be {0})")]
    NegativeTotal(Money),
}

/// Validated receipt. Subtotal and grand total are derived on construction.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Receipt {
    items: Vec<Item>,
    line_totals: Vec<Money>,
    tax: Money,
    service_charge: Money,
    discount: Money,
    subtotal: Money,
    grand_total: Money,
}

impl Receipt {
    pub fn try_new(
        items: Vec<Item>,
        tax: Money,
        service_charge: Money,
        discount: Money,
    ) -> Result<Self, ReceiptError> {
        let mut line_totals = Vec::with_capacity(items.len());
        let mut subtotal = Money::ZERO;

        for (index, item) in items.iter().enumerate() {
            if item.quantity == 0 {
                return Err(ReceiptError::ZeroQuantity { index });
            }
            if item.unit_price.is_negative() {
                return Err(ReceiptError::NegativePrice {
                    index,
                    price: item.unit_price,
                });
            }
            let line_total = item.line_total().ok_or(ReceiptError::Overflow)?;
            subtotal = subtotal
                .checked_add(line_total)
                .ok_or(ReceiptError::Overflow)?;
            line_totals.push(line_total);
        }

        for (kind, amount) in [
            (AdjustmentKind::Tax, tax),
            (AdjustmentKind::ServiceCharge, service_charge),
            (AdjustmentKind::Discount, discount),
        ] {
            if amount.is_negative() {
                return Err(ReceiptError::NegativeAdjustment { kind, amount });
            }
        }

        let grand_total = subtotal
            .checked_add(tax)
            .and_then(|total| total.checked_add(service_charge))
            .and_then(|total| total.checked_sub(discount))
            .ok_or(ReceiptError::Overflow)?;
        if grand_total.is_negative() {
            return Err(ReceiptError::NegativeTotal(grand_total));
        }

        Ok(Self {
            items,
            line_totals,
            tax,
            service_charge,
            discount,
            subtotal,
            grand_total,
        })
    }

    pub fn items(&self) -> &[Item] {
        &self.items
    }

    pub fn line_total(&self, index: usize) -> Option<Money> {
        self.line_totals.get(index).copied()
    }

    pub fn line_totals(&self) -> &[Money] {
        &self.line_totals
    }

    pub fn tax(&self) -> Money {
        self.tax
    }

    pub fn service_charge(&self) -> Money {
        self.service_charge
    }

    pub fn discount(&self) -> Money {
        self.discount
    }

    pub fn subtotal(&self) -> Money {
        self.subtotal
    }

    pub fn grand_total(&self) -> Money {
        self.grand_total
    }

    pub fn has_adjustments(&self) -> bool {
        !(self.tax.is_zero() && self.service_charge.is_zero() && self.discount.is_zero())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Selector {
    pub participant: ParticipantId,
    pub weight: u32,
}

impl Selector {
    pub fn even(participant: ParticipantId) -> Self {
        Self {
            participant,
            weight: 1,
        }
    }

    pub fn weighted(participant: ParticipantId, weight: u32) -> Self {
        Self {
            participant,
            weight,
        }
    }
}

/// Roster plus, for every receipt item (by index), who shares it and how.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SelectionMap {
    participants: Vec<Participant>,
    items: Vec<Vec<Selector>>,
}

impl SelectionMap {
    pub fn new(participants: Vec<Participant>) -> Self {
        Self {
            participants,
            items: Vec::new(),
        }
    }

    pub fn with_item_count(participants: Vec<Participant>, item_count: usize) -> Self {
        Self {
            participants,
            items: vec![Vec::new(); item_count],
        }
    }

    pub fn participants(&self) -> &[Participant] {
        &self.participants
    }

    pub fn participant(&self, id: ParticipantId) -> Option<&Participant> {
        self.participants.iter().find(|p| p.id == id)
    }

    pub fn item_count(&self) -> usize {
        self.items.len()
    }

    pub fn selectors(&self, item_index: usize) -> &[Selector] {
        self.items.get(item_index).map_or(&[], Vec::as_slice)
    }

    pub fn select(&mut self, item_index: usize, selector: Selector) {
        self.ensure_item(item_index);
        self.items[item_index].push(selector);
    }

    pub fn set_selectors(&mut self, item_index: usize, selectors: Vec<Selector>) {
        self.ensure_item(item_index);
        self.items[item_index] = selectors;
    }

    pub fn selectors_mut(&mut self, item_index: usize) -> &mut Vec<Selector> {
        self.ensure_item(item_index);
        &mut self.items[item_index]
    }

    fn ensure_item(&mut self, item_index: usize) {
        if self.items.len() <= item_index {
            self.items.resize_with(item_index + 1, Vec::new);
        }
    }
}

/// One participant's slice of the receipt.
///
/// `total` is the authoritative owed amount. The other columns are rounded
/// independently so that each sums to its receipt figure across participants.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ParticipantShare {
    pub items: Money,
    pub tax: Money,
    pub service_charge: Money,
    pub discount: Money,
    pub total: Money,
    /// Share of the receipt subtotal in basis points (sums to 10000).
    pub subtotal_ratio_bps: u32,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Allocation {
    shares: IndexMap<ParticipantId, ParticipantShare>,
    grand_total: Money,
}

impl Allocation {
    pub fn new(shares: IndexMap<ParticipantId, ParticipantShare>, grand_total: Money) -> Self {
        Self {
            shares,
            grand_total,
        }
    }

    pub fn amount(&self, participant: ParticipantId) -> Option<Money> {
        self.shares.get(&participant).map(|share| share.total)
    }

    pub fn share(&self, participant: ParticipantId) -> Option<&ParticipantShare> {
        self.shares.get(&participant)
    }

    pub fn iter(&self) -> impl Iterator<Item = (ParticipantId, &ParticipantShare)> + '_ {
        self.shares.iter().map(|(id, share)| (*id, share))
    }

    pub fn amounts(&self) -> IndexMap<ParticipantId, Money> {
        self.iter().map(|(id, share)| (id, share.total)).collect()
    }

    pub fn total(&self) -> Money {
        self.shares.values().map(|share| share.total).sum()
    }

    pub fn grand_total(&self) -> Money {
        self.grand_total
    }

    pub fn len(&self) -> usize {
        self.shares.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shares.is_empty()
    }
}
