//! Pre-flight validation for defense scheduling problems.
//!
//! Checks structural integrity of an [`Input`] before any search worker
//! is started. Detects:
//! - Person ids outside the compact [`PersonId`] range
//! - Person ids that do not form a dense range starting at 0
//! - Defenses whose reviewer and supervisor are the same person
//! - Fewer slots than required defenses
//! - Duplicate day or room ids
//! - Block lengths that do not partition a room's slots
//! - Preferences that reference unknown people
//! - Blocks without any chairperson to staff them

use crate::models::{Input, PersonId};
use std::collections::HashSet;

/// Validation result.
pub type ValidationResult = Result<(), Vec<ValidationError>>;

/// A validation error.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationError {
    /// Error category.
    pub kind: ValidationErrorKind,
    /// Human-readable description.
    pub message: String,
}

/// Categories of validation errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationErrorKind {
    /// A person id does not fit the compact id width.
    PersonIdOutOfRange,
    /// Person ids do not form `0..count`.
    NonDenseIds,
    /// A defense names the same person as reviewer and supervisor.
    SelfPairedDefense,
    /// Total slot capacity is below the required defense count.
    InsufficientCapacity,
    /// Two days, or two rooms of one day, share an id.
    DuplicateId,
    /// Block lengths and slots disagree, or the layout is too large.
    MalformedLayout,
    /// A slot preference names a person that appears nowhere else.
    InvalidPersonReference,
    /// The layout has blocks but nobody may chair them.
    NoChairPersons,
}

impl ValidationError {
    fn new(kind: ValidationErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}: {}", self.kind, self.message)
    }
}

const MAX_PERSON_ID: u32 = PersonId::MAX as u32;
const MAX_LAYOUT_INDEX: usize = u16::MAX as usize;

/// Validates a scheduling problem.
///
/// Checks:
/// 1. All person ids fit in [`PersonId`]
/// 2. Person ids are dense and start at 0
/// 3. No defense pairs a person with themselves
/// 4. Slot capacity covers all required defenses
/// 5. Day ids are unique, room ids are unique within a day
/// 6. Block lengths are non-zero and sum to the room's slot count
/// 7. Preferences only reference known people
/// 8. At least one chairperson exists when there are blocks to chair
///
/// # Returns
/// `Ok(())` if all checks pass, `Err(errors)` with all detected issues.
pub fn validate_input(input: &Input) -> ValidationResult {
    let mut errors = Vec::new();

    for &id in &input.chair_person_ids {
        if id > MAX_PERSON_ID {
            errors.push(ValidationError::new(
                ValidationErrorKind::PersonIdOutOfRange,
                format!("Chairperson id {id} is greater than {MAX_PERSON_ID}"),
            ));
        }
    }
    for d in &input.defenses {
        if d.reviewer_id > MAX_PERSON_ID || d.supervisor_id > MAX_PERSON_ID {
            errors.push(ValidationError::new(
                ValidationErrorKind::PersonIdOutOfRange,
                format!(
                    "Defense ({}, {}) uses an id greater than {MAX_PERSON_ID}",
                    d.reviewer_id, d.supervisor_id
                ),
            ));
        }
        if d.reviewer_id == d.supervisor_id {
            errors.push(ValidationError::new(
                ValidationErrorKind::SelfPairedDefense,
                format!(
                    "Defense reviewer == supervisor (person id: {})",
                    d.reviewer_id
                ),
            ));
        }
    }

    // Dense id range
    let people = input.people();
    if let (Some(&min), Some(&max)) = (people.first(), people.last()) {
        if min != 0 {
            errors.push(ValidationError::new(
                ValidationErrorKind::NonDenseIds,
                format!("Smallest person id must be 0 (is: {min})"),
            ));
        }
        if max as usize != people.len() - 1 {
            errors.push(ValidationError::new(
                ValidationErrorKind::NonDenseIds,
                format!(
                    "Largest person id must be {} for {} people (is: {max})",
                    people.len() - 1,
                    people.len()
                ),
            ));
        }
    }

    // Capacity
    let capacity = input.slot_capacity();
    let required = input.required_assignments();
    if capacity < required {
        errors.push(ValidationError::new(
            ValidationErrorKind::InsufficientCapacity,
            format!("Not enough slots ({capacity}) for defenses ({required})"),
        ));
    }

    // Layout
    if input.days.len() > MAX_LAYOUT_INDEX {
        errors.push(ValidationError::new(
            ValidationErrorKind::MalformedLayout,
            format!("Too many days ({})", input.days.len()),
        ));
    }

    let known: HashSet<u32> = people.iter().copied().collect();
    let mut day_ids = HashSet::new();
    let mut block_count = 0usize;

    for day in &input.days {
        if !day_ids.insert(day.id) {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateId,
                format!("Duplicate day ID: {}", day.id),
            ));
        }
        if day.classrooms.len() > MAX_LAYOUT_INDEX {
            errors.push(ValidationError::new(
                ValidationErrorKind::MalformedLayout,
                format!("Too many rooms on day {}", day.id),
            ));
        }

        let mut room_ids = HashSet::new();
        for room in &day.classrooms {
            if !room_ids.insert(room.id) {
                errors.push(ValidationError::new(
                    ValidationErrorKind::DuplicateId,
                    format!("Duplicate room ID {} on day {}", room.id, day.id),
                ));
            }

            let total: u64 = room.block_lengths.iter().map(|&l| u64::from(l)).sum();
            if total != room.slots.len() as u64 {
                errors.push(ValidationError::new(
                    ValidationErrorKind::MalformedLayout,
                    format!(
                        "Room {} on day {}: blocks cover {total} slots but room has {}",
                        room.id,
                        day.id,
                        room.slots.len()
                    ),
                ));
            }
            if room.block_lengths.iter().any(|&l| l == 0) {
                errors.push(ValidationError::new(
                    ValidationErrorKind::MalformedLayout,
                    format!("Room {} on day {} has an empty block", room.id, day.id),
                ));
            }
            if room.slots.len() > MAX_LAYOUT_INDEX {
                errors.push(ValidationError::new(
                    ValidationErrorKind::MalformedLayout,
                    format!("Room {} on day {} has too many slots", room.id, day.id),
                ));
            }
            block_count += room.block_lengths.len();

            for (index, slot) in room.slots.iter().enumerate() {
                for pref in &slot.preferences {
                    if !known.contains(&pref.person_id) {
                        errors.push(ValidationError::new(
                            ValidationErrorKind::InvalidPersonReference,
                            format!(
                                "Slot {index} of room {} on day {} references unknown person {}",
                                room.id, day.id, pref.person_id
                            ),
                        ));
                    }
                }
            }
        }
    }

    if block_count > 0 && input.chair_person_ids.is_empty() {
        errors.push(ValidationError::new(
            ValidationErrorKind::NoChairPersons,
            format!("{block_count} blocks but no chairpersons available"),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
