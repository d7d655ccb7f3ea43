use crate::error::SelectionSheetError;
use billbear_domain::{Participant, ParticipantId, Receipt, SelectionMap, Selector};
use fxhash::FxHashMap;
use indexmap::IndexMap;
use serde::Deserialize;

/// One entry in a participant's pick list.
///
/// A bare string picks the item with weight 1; the object form carries an
/// explicit weight.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum Pick {
    Name(String),
    Weighted { item: String, weight: u32 },
}

impl Pick {
    pub fn item(&self) -> &str {
        match self {
            Pick::Name(item) | Pick::Weighted { item, .. } => item,
        }
    }

    pub fn weight(&self) -> u32 {
        match self {
            Pick::Name(_) => 1,
            Pick::Weighted { weight, .. } => *weight,
        }
    }
}

/// Who ate what, keyed by participant display name.
///
/// ```json
/// {
///   "users": ["Asha", "Ravi", "Meera"],
///   "selections": {
///     "Asha": ["Paneer Tikka", "Butter Naan"],
///     "Ravi": [{ "item": "Butter Naan", "weight": 2 }]
///   }
/// }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct SelectionSheet {
    /// Roster in display order; the first entry is the host. When empty, the
    /// keys of `selections` form the roster.
    #[serde(default, alias = "users")]
    pub participants: Vec<String>,
    #[serde(default)]
    pub selections: IndexMap<String, Vec<Pick>>,
}

impl SelectionSheet {
    pub fn from_json(bytes: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(bytes)
    }

    fn roster(&self) -> Vec<&str> {
        if self.participants.is_empty() {
            self.selections.keys().map(|name| name.trim()).collect()
        } else {
            self.participants.iter().map(|name| name.trim()).collect()
        }
    }

    /// Resolves names against `receipt` and produces the selection map the
    /// allocator consumes.
    ///
    /// Ids are assigned in roster order starting at 1. Picking a name selects
    /// every receipt line with that name, and picking the same line again adds
    /// to the weight.
    pub fn build(&self, receipt: &Receipt) -> Result<SelectionMap, SelectionSheetError> {
        let roster = self.roster();

        let mut ids: FxHashMap<&str, ParticipantId> = FxHashMap::default();
        let mut participants = Vec::with_capacity(roster.len());
        for (idx, name) in roster.iter().enumerate() {
            let participant = Participant::new(idx as u64 + 1, *name);
            if ids.insert(*name, participant.id).is_some() {
                return Err(SelectionSheetError::DuplicateParticipant {
                    name: (*name).to_owned(),
                });
            }
            participants.push(participant);
        }

        let mut lines_by_name: FxHashMap<&str, Vec<usize>> = FxHashMap::default();
        for (index, item) in receipt.items().iter().enumerate() {
            lines_by_name
                .entry(item.name.trim())
                .or_default()
                .push(index);
        }

        let mut map = SelectionMap::with_item_count(participants, receipt.items().len());
        for (name, picks) in &self.selections {
            let name = name.trim();
            let Some(&participant) = ids.get(name) else {
                return Err(SelectionSheetError::UnknownParticipant {
                    name: name.to_owned(),
                });
            };

            for pick in picks {
                let Some(lines) = lines_by_name.get(pick.item().trim()) else {
                    return Err(SelectionSheetError::UnknownItem {
                        participant: name.to_owned(),
                        item: pick.item().to_owned(),
                    });
                };
                for &index in lines {
                    add_pick(map.selectors_mut(index), participant, pick.weight());
                }
            }
        }

        tracing::debug!(
            participant_count = map.participants().len(),
            item_count = map.item_count(),
            "Selection sheet resolved"
        );

        Ok(map)
    }
}

fn add_pick(selectors: &mut Vec<Selector>, participant: ParticipantId, weight: u32) {
    match selectors.iter_mut().find(|s| s.participant == participant) {
        Some(existing) => existing.weight = existing.weight.saturating_add(weight),
        None => selectors.push(Selector::weighted(participant, weight)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use billbear_domain::{Item, Money};
    use rstest::{fixture, rstest};

    #[fixture]
    fn receipt() -> Receipt {
        Receipt::try_new(
            vec![
                Item::new("Paneer Tikka", Money::from_minor(24900), 1),
                Item::new("Butter Naan", Money::from_minor(6000), 2),
                Item::new("Lassi", Money::from_minor(9900), 1),
                Item::new("Lassi", Money::from_minor(9900), 1),
            ],
            Money::ZERO,
            Money::ZERO,
            Money::ZERO,
        )
        .expect("valid receipt")
    }

    fn sheet(json: &str) -> SelectionSheet {
        SelectionSheet::from_json(json.as_bytes()).expect("valid sheet json")
    }

    #[rstest]
    fn assigns_ids_in_roster_order(receipt: Receipt) {
        let sheet = sheet(
            r#"{
                "users": ["Asha", "Ravi", "Meera"],
                "selections": { "Ravi": ["Paneer Tikka"], "Asha": ["Butter Naan"] }
            }"#,
        );
        let map = sheet.build(&receipt).expect("sheet builds");

        let names: Vec<(u64, &str)> = map
            .participants()
            .iter()
            .map(|p| (p.id.0, p.name.as_str()))
            .collect();
        assert_eq!(names, vec![(1, "Asha"), (2, "Ravi"), (3, "Meera")]);
        assert_eq!(map.selectors(0), &[Selector::even(ParticipantId(2))]);
        assert_eq!(map.selectors(1), &[Selector::even(ParticipantId(1))]);
    }

    #[rstest]
    fn roster_falls_back_to_selection_keys(receipt: Receipt) {
        let sheet = sheet(r#"{ "selections": { "Ravi": ["Lassi"], "Asha": [] } }"#);
        let map = sheet.build(&receipt).expect("sheet builds");

        assert_eq!(map.participants()[0].name, "Ravi");
        assert_eq!(map.participants()[1].name, "Asha");
    }

    #[rstest]
    fn name_selects_every_matching_line(receipt: Receipt) {
        let sheet = sheet(r#"{ "selections": { "Asha": ["Lassi"] } }"#);
        let map = sheet.build(&receipt).expect("sheet builds");

        assert!(map.selectors(0).is_empty());
        assert_eq!(map.selectors(2), &[Selector::even(ParticipantId(1))]);
        assert_eq!(map.selectors(3), &[Selector::even(ParticipantId(1))]);
    }

    #[rstest]
    fn repeated_and_weighted_picks_accumulate(receipt: Receipt) {
        let sheet = sheet(
            r#"{ "selections": {
                "Asha": ["Butter Naan", "Butter Naan"],
                "Ravi": [{ "item": "Butter Naan", "weight": 3 }]
            } }"#,
        );
        let map = sheet.build(&receipt).expect("sheet builds");

        assert_eq!(
            map.selectors(1),
            &[
                Selector::weighted(ParticipantId(1), 2),
                Selector::weighted(ParticipantId(2), 3),
            ]
        );
    }

    #[rstest]
    fn names_are_trimmed(receipt: Receipt) {
        let sheet = sheet(
            r#"{ "users": [" Asha "], "selections": { "Asha": ["  Paneer Tikka "] } }"#,
        );
        let map = sheet.build(&receipt).expect("sheet builds");

        assert_eq!(map.participants()[0].name, "Asha");
        assert_eq!(map.selectors(0), &[Selector::even(ParticipantId(1))]);
    }

    #[rstest]
    #[case::duplicate_roster(
        r#"{ "users": ["Asha", "Asha"] }"#,
        SelectionSheetError::DuplicateParticipant { name: "Asha".into() }
    )]
    #[case::picker_not_on_roster(
        r#"{ "users": ["Asha"], "selections": { "Ravi": ["Lassi"] } }"#,
        SelectionSheetError::UnknownParticipant { name: "Ravi".into() }
    )]
    #[case::unknown_item(
        r#"{ "selections": { "Asha": ["Gulab Jamun"] } }"#,
        SelectionSheetError::UnknownItem { participant: "Asha".into(), item: "Gulab Jamun".into() }
    )]
    fn rejects_bad_sheets(
        receipt: Receipt,
        #[case] json: &str,
        #[case] expected: SelectionSheetError,
    ) {
        assert_eq!(sheet(json).build(&receipt), Err(expected));
    }
}
