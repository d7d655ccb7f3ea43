//! Largest-remainder apportionment in integer minor units.
//!
//! Splits a whole amount across participants in proportion to exact integer
//! weights so that:
//! 1. every part is the floor of its exact share, plus at most one unit
//! 2. the parts sum to the whole exactly
//! 3. leftover units go to the largest fractional remainders, with ties broken
//!    by a stable per-participant key so the outcome ignores input order

use crate::model::{Money, ParticipantId};
use num_bigint::BigInt;
use num_integer::Integer;
use num_traits::{Signed, ToPrimitive, Zero};
use sha2::{Digest, Sha256};
use thiserror::Error;

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ApportionError {
    /// The whole is nonzero but every weight is zero, so no fraction exists.
    #[error("cannot apportion {0} across zero total weight")]
    NoWeight(Money),
    #[error("apportionment weight for {0} is negative")]
    NegativeWeight(ParticipantId),
    /// A rounded part does not fit into [`Money`].
    #[error("apportioned amount does not fit into minor units")]
    Overflow,
}

const STABLE_KEY_FORMAT_VERSION: u8 = 1;

/// Apportions `whole` across `parts` in proportion to their weights.
///
/// Weights are exact integers of any size; they are widened to [`BigInt`] so
/// the products never overflow. The returned vector is index-aligned with
/// `parts`. A negative `whole` is split as the negation of the split of its
/// absolute value.
///
/// # Example
/// ```
/// use billbear_domain::{Money, ParticipantId, services::apportion};
///
/// let parts = [(ParticipantId(1), 1), (ParticipantId(2), 1), (ParticipantId(3), 1)];
/// let split = apportion(Money::from_minor(100), &parts).unwrap();
/// let total: Money = split.iter().sum();
/// assert_eq!(total, Money::from_minor(100));
/// ```
pub fn apportion<W>(
    whole: Money,
    parts: &[(ParticipantId, W)],
) -> Result<Vec<Money>, ApportionError>
where
    W: Clone + Into<BigInt>,
{
    let weights: Vec<BigInt> = parts
        .iter()
        .map(|(_, weight)| weight.clone().into())
        .collect();
    if let Some(idx) = weights.iter().position(Signed::is_negative) {
        return Err(ApportionError::NegativeWeight(parts[idx].0));
    }

    let denominator: BigInt = weights.iter().sum();

    if whole.is_zero() {
        return Ok(vec![Money::ZERO; parts.len()]);
    }
    if denominator.is_zero() {
        return Err(ApportionError::NoWeight(whole));
    }

    let sign = whole.signum();
    let magnitude = BigInt::from(whole.minor_units()).abs();

    let (mut floors, remainders): (Vec<BigInt>, Vec<BigInt>) = weights
        .iter()
        .map(|weight| (&magnitude * weight).div_rem(&denominator))
        .unzip();

    let floor_sum: BigInt = floors.iter().sum();
    // Each remainder is strictly below one unit, so the leftover is bounded by
    // the number of parts with a nonzero remainder.
    let leftover = (&magnitude - floor_sum)
        .to_usize()
        .ok_or(ApportionError::Overflow)?;

    if leftover > 0 {
        let mut ranked: Vec<(usize, &BigInt, [u8; 32], ParticipantId)> = parts
            .iter()
            .enumerate()
            .map(|(idx, (id, _))| (idx, &remainders[idx], stable_key(*id), *id))
            .collect();
        ranked.sort_by(|(_, rem_a, key_a, id_a), (_, rem_b, key_b, id_b)| {
            rem_b
                .cmp(rem_a)
                .then_with(|| key_a.cmp(key_b))
                .then_with(|| id_a.cmp(id_b))
        });

        let mut selected = Vec::with_capacity(leftover);
        for (idx, _, _, id) in ranked.iter().take(leftover) {
            floors[*idx] += 1_u32;
            selected.push(*id);
        }

        tracing::trace!(
            whole = %whole,
            leftover,
            part_count = parts.len(),
            selected = ?selected,
            "Largest-remainder units assigned"
        );
    }

    floors
        .into_iter()
        .map(|units| {
            (units * sign)
                .to_i64()
                .map(Money::from_minor)
                .ok_or(ApportionError::Overflow)
        })
        .collect()
}

/// Order-independent tie-break key for a participant.
pub fn stable_key(participant: ParticipantId) -> [u8; 32] {
    let mut framed = [0_u8; 9];
    framed[0] = STABLE_KEY_FORMAT_VERSION;
    framed[1..9].copy_from_slice(&participant.0.to_be_bytes());

    let digest = Sha256::digest(framed);
    let mut out = [0_u8; 32];
    out.copy_from_slice(&digest);
    out
}
