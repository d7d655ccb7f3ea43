use crate::{
    model::{Allocation, Money, ParticipantId, ParticipantShare, Receipt, SelectionMap},
    services::largest_remainder::{ApportionError, apportion},
};
use fxhash::{FxHashMap, FxHashSet};
use indexmap::IndexMap;
use num_bigint::BigInt;
use num_integer::Integer;
use num_traits::One;
use thiserror::Error;

const BASIS_POINTS: i64 = 10_000;

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum SelectionIssue {
    #[error("item {index} has no selectors")]
    NoSelectors { index: usize },
    #[error("item {index} gives participant {participant} a zero weight")]
    ZeroWeight {
        index: usize,
        participant: ParticipantId,
    },
    #[error("item {index} references unknown participant {participant}")]
    UnknownParticipant {
        index: usize,
        participant: ParticipantId,
    },
    #[error("participant {participant} is listed twice on item {index}")]
    DuplicateSelector {
        index: usize,
        participant: ParticipantId,
    },
    #[error("participant {0} is listed twice in the roster")]
    DuplicateParticipant(ParticipantId),
    #[error("selection refers to item {index} but the receipt has {item_count} items")]
    UnknownItem { index: usize, item_count: usize },
}

impl SelectionIssue {
    /// Receipt item the issue is about, when there is one.
    pub fn item_index(&self) -> Option<usize> {
        match self {
            SelectionIssue::NoSelectors { index }
            | SelectionIssue::ZeroWeight { index, .. }
            | SelectionIssue::UnknownParticipant { index, .. }
            | SelectionIssue::DuplicateSelector { index, .. }
            | SelectionIssue::UnknownItem { index, .. } => Some(*index),
            SelectionIssue::DuplicateParticipant(_) => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum AllocationError {
    #[error("invalid selection: {0}")]
    InvalidSelection(SelectionIssue),
    #[error("receipt subtotal is zero but it carries tax, service charge or discount")]
    EmptyReceipt,
    #[error("allocation arithmetic overflowed")]
    Overflow,
}

impl From<SelectionIssue> for AllocationError {
    fn from(issue: SelectionIssue) -> Self {
        AllocationError::InvalidSelection(issue)
    }
}

impl From<ApportionError> for AllocationError {
    fn from(err: ApportionError) -> Self {
        match err {
            ApportionError::NoWeight(_) => AllocationError::EmptyReceipt,
            ApportionError::NegativeWeight(_) | ApportionError::Overflow => {
                AllocationError::Overflow
            }
        }
    }
}

/// Splits a receipt across participants according to their item selections.
///
/// Stateless; one value can serve any number of receipts.
#[derive(Clone, Copy, Debug, Default)]
pub struct Allocator;

impl Allocator {
    /// Computes what every roster participant owes.
    ///
    /// Each item's weights are first divided by their gcd, so an item with a
    /// single selector always has weight sum 1. Item shares are then kept exact
    /// as arbitrary-precision numerators over the least common multiple of the
    /// reduced weight sums. Every participant then owes
    /// `items_p * grand_total / subtotal`, rounded with the largest-remainder
    /// method so the amounts add up to the grand total exactly.
    ///
    /// # Errors
    /// * [`AllocationError::InvalidSelection`] for empty selector lists, zero
    ///   weights, unknown or duplicated participants, or selections for items
    ///   the receipt does not have
    /// * [`AllocationError::EmptyReceipt`] when the subtotal is zero but the
    ///   receipt carries tax, service charge or discount
    /// * [`AllocationError::Overflow`] when a rounded share does not fit
    ///   [`Money`]
    pub fn allocate(
        &self,
        receipt: &Receipt,
        selections: &SelectionMap,
    ) -> Result<Allocation, AllocationError> {
        tracing::debug!(
            item_count = receipt.items().len(),
            participant_count = selections.participants().len(),
            subtotal = %receipt.subtotal(),
            tax = %receipt.tax(),
            service_charge = %receipt.service_charge(),
            discount = %receipt.discount(),
            grand_total = %receipt.grand_total(),
            "Allocation started"
        );

        let item_weights = validate_selections(receipt, selections).inspect_err(|issue| {
            tracing::warn!(reject_reason = "invalid_selection", %issue, "Allocation rejected");
        })?;

        let roster: Vec<ParticipantId> = selections.participants().iter().map(|p| p.id).collect();

        if receipt.subtotal().is_zero() {
            if receipt.has_adjustments() {
                tracing::warn!(
                    reject_reason = "empty_receipt",
                    tax = %receipt.tax(),
                    service_charge = %receipt.service_charge(),
                    discount = %receipt.discount(),
                    "Allocation rejected"
                );
                return Err(AllocationError::EmptyReceipt);
            }
            let shares = roster
                .into_iter()
                .map(|id| (id, ParticipantShare::default()))
                .collect();
            return Ok(Allocation::new(shares, Money::ZERO));
        }

        let (common_weight, item_numerators) =
            item_numerators(receipt, selections, &item_weights);

        let parts: Vec<(ParticipantId, BigInt)> = roster
            .iter()
            .map(|id| (*id, item_numerators.get(id).cloned().unwrap_or_default()))
            .collect();

        let totals = apportion(receipt.grand_total(), &parts)?;
        let items = apportion(receipt.subtotal(), &parts)?;
        let tax = apportion(receipt.tax(), &parts)?;
        let service_charge = apportion(receipt.service_charge(), &parts)?;
        let discount = apportion(receipt.discount(), &parts)?;
        let ratios = apportion(Money::from_minor(BASIS_POINTS), &parts)?;

        let shares: IndexMap<ParticipantId, ParticipantShare> = roster
            .iter()
            .enumerate()
            .map(|(idx, id)| {
                let share = ParticipantShare {
                    items: items[idx],
                    tax: tax[idx],
                    service_charge: service_charge[idx],
                    discount: discount[idx],
                    total: totals[idx],
                    subtotal_ratio_bps: u32::try_from(ratios[idx].minor_units()).unwrap_or(0),
                };
                (*id, share)
            })
            .collect();

        let allocation = Allocation::new(shares, receipt.grand_total());
        debug_assert_eq!(allocation.total(), receipt.grand_total());

        tracing::debug!(
            participant_count = allocation.len(),
            common_weight = %common_weight,
            grand_total = %allocation.grand_total(),
            "Allocation finished"
        );

        Ok(allocation)
    }
}

/// Shorthand for [`Allocator::allocate`].
pub fn allocate(
    receipt: &Receipt,
    selections: &SelectionMap,
) -> Result<Allocation, AllocationError> {
    Allocator.allocate(receipt, selections)
}

/// Weights of one item after dividing out their common factor.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct ItemWeights {
    divisor: u32,
    reduced_sum: u64,
}

/// Checks the selection map against the receipt and returns every item's
/// reduced weights.
fn validate_selections(
    receipt: &Receipt,
    selections: &SelectionMap,
) -> Result<Vec<ItemWeights>, SelectionIssue> {
    let item_count = receipt.items().len();
    if selections.item_count() > item_count {
        return Err(SelectionIssue::UnknownItem {
            index: item_count,
            item_count,
        });
    }

    let mut roster: FxHashSet<ParticipantId> = FxHashSet::default();
    for participant in selections.participants() {
        if !roster.insert(participant.id) {
            return Err(SelectionIssue::DuplicateParticipant(participant.id));
        }
    }

    let mut item_weights = Vec::with_capacity(item_count);
    let mut seen: FxHashSet<ParticipantId> = FxHashSet::default();
    for index in 0..item_count {
        let selectors = selections.selectors(index);
        if selectors.is_empty() {
            return Err(SelectionIssue::NoSelectors { index });
        }

        seen.clear();
        let mut divisor = 0_u32;
        for selector in selectors {
            let participant = selector.participant;
            if !roster.contains(&participant) {
                return Err(SelectionIssue::UnknownParticipant { index, participant });
            }
            if selector.weight == 0 {
                return Err(SelectionIssue::ZeroWeight { index, participant });
            }
            if !seen.insert(participant) {
                return Err(SelectionIssue::DuplicateSelector { index, participant });
            }
            divisor = divisor.gcd(&selector.weight);
        }
        let reduced_sum = selectors
            .iter()
            .map(|selector| u64::from(selector.weight / divisor))
            .sum();
        item_weights.push(ItemWeights {
            divisor,
            reduced_sum,
        });
    }

    Ok(item_weights)
}

/// Exact item shares scaled by the least common multiple of the reduced
/// weight sums, returned together with that multiple. The shares sum to
/// `subtotal * common_weight`.
fn item_numerators(
    receipt: &Receipt,
    selections: &SelectionMap,
    item_weights: &[ItemWeights],
) -> (BigInt, FxHashMap<ParticipantId, BigInt>) {
    let common_weight = item_weights
        .iter()
        .fold(BigInt::one(), |acc, weights| {
            acc.lcm(&BigInt::from(weights.reduced_sum))
        });

    let mut numerators: FxHashMap<ParticipantId, BigInt> = FxHashMap::default();
    for (index, (line_total, weights)) in receipt
        .line_totals()
        .iter()
        .zip(item_weights)
        .enumerate()
    {
        let scale = &common_weight / weights.reduced_sum;
        let scaled_line = BigInt::from(line_total.minor_units()) * scale;
        for selector in selections.selectors(index) {
            let share = &scaled_line * (selector.weight / weights.divisor);
            *numerators.entry(selector.participant).or_default() += share;
        }
    }

    (common_weight, numerators)
}
