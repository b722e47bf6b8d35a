// Slot allocation: expand one branch of the seat matrix into named slots and
// fill them with students in branch-rank order, overflow going to a
// rank-ordered waiting list.

use std::collections::BTreeMap;

use crate::error::AllotError;
use crate::models::{BranchEntry, Student};

/// Prefix used for the synthetic overflow slots and for the persisted
/// `seat_alloted` value of a waitlisted student.
pub const WAITING: &str = "WAITING";

/// Enumerate every slot a branch entry defines, in a fixed order: standalone
/// castes first (caste list order, then any extra matrix keys), emitting
/// `caste-1..count`; then merged groups as pooled blocks, `SC-ST-1..count`,
/// using the group's aggregate count. Waiting slots are not part of this set.
pub fn enumerate_slots(entry: &BranchEntry, caste_order: &[String]) -> Vec<String> {
    let mut slots = Vec::new();
    let mut emit = |name: &str, count: u32| {
        for i in 1..=count {
            slots.push(format!("{}-{}", name, i));
        }
    };

    for caste in caste_order {
        if entry.is_merged(caste) {
            continue;
        }
        emit(caste, entry.seats.get(caste).copied().unwrap_or(0));
    }
    // cells added by hand after the caste list was loaded still count
    for (caste, &count) in &entry.seats {
        if caste_order.contains(caste) || entry.is_merged(caste) {
            continue;
        }
        emit(caste, count);
    }
    for (group, members) in &entry.common {
        let count: u32 = members.iter().map(|m| entry.seats.get(m).copied().unwrap_or(0)).sum();
        emit(group, count);
    }
    slots
}

// Stable sort: equal ranks keep their input order, unranked students go last.
fn sort_by_rank(students: &mut [Student]) {
    students.sort_by_key(|s| s.branch_rank.unwrap_or(u32::MAX));
}

/// One branch's allocation state: the full slot set derived from the matrix,
/// who occupies what, and the rank-ordered waiting list.
#[derive(Debug, Clone)]
pub struct Allocation {
    slot_names: Vec<String>,
    slots: BTreeMap<String, Option<Student>>,
    waiting: Vec<Student>,
}

impl Allocation {
    /// Run the greedy pass: students sorted by branch rank fill the slots in
    /// enumeration order until slots or students run out; everyone left over
    /// joins the waiting list. An empty roster yields all-empty slots; a
    /// zero-seat branch puts the whole roster on the waiting list.
    pub fn allocate(students: &[Student], entry: &BranchEntry, caste_order: &[String]) -> Allocation {
        let slot_names = enumerate_slots(entry, caste_order);
        let mut queue: Vec<Student> = students.to_vec();
        sort_by_rank(&mut queue);

        let mut slots = BTreeMap::new();
        let mut queue = queue.into_iter();
        for name in &slot_names {
            slots.insert(name.clone(), queue.next());
        }
        let mut waiting: Vec<Student> = queue.collect();
        sort_by_rank(&mut waiting);

        Allocation { slot_names, slots, waiting }
    }

    /// Rebuild the allocation from persisted `seat_alloted` values instead of
    /// re-running the greedy pass. Students pointing at an unknown or already
    /// taken slot, waitlisted students, and students with no assignment all
    /// land on the waiting list.
    pub fn from_assignments(
        students: &[Student],
        entry: &BranchEntry,
        caste_order: &[String],
    ) -> Allocation {
        let slot_names = enumerate_slots(entry, caste_order);
        let mut slots: BTreeMap<String, Option<Student>> =
            slot_names.iter().map(|n| (n.clone(), None)).collect();
        let mut waiting = Vec::new();

        for student in students {
            match student.seat_alloted.as_deref() {
                Some(name) if !name.starts_with(WAITING) => match slots.get_mut(name) {
                    Some(occ @ None) => *occ = Some(student.clone()),
                    _ => waiting.push(student.clone()),
                },
                _ => waiting.push(student.clone()),
            }
        }
        sort_by_rank(&mut waiting);

        Allocation { slot_names, slots, waiting }
    }

    /// Every slot the matrix defines, in enumeration order.
    pub fn slot_names(&self) -> &[String] {
        &self.slot_names
    }

    pub fn occupant(&self, slot: &str) -> Option<&Student> {
        self.slots.get(slot).and_then(|occ| occ.as_ref())
    }

    pub fn occupied_count(&self) -> usize {
        self.slots.values().filter(|occ| occ.is_some()).count()
    }

    /// The waiting list, always in rank order.
    pub fn waiting(&self) -> &[Student] {
        &self.waiting
    }

    /// Waiting list entries paired with their synthetic `WAITING-1..n` names.
    pub fn waiting_slots(&self) -> Vec<(String, &Student)> {
        self.waiting
            .iter()
            .enumerate()
            .map(|(i, s)| (format!("{}-{}", WAITING, i + 1), s))
            .collect()
    }

    /// Vacate a slot. Its occupant rejoins the waiting list, which is then
    /// re-sorted by rank and renumbered — never appended at the end, since
    /// waiting order must always reflect rank, not insertion order.
    pub fn remove(&mut self, slot: &str) -> Result<Student, AllotError> {
        let occ = self
            .slots
            .get_mut(slot)
            .ok_or_else(|| AllotError::state(format!("unknown slot {}", slot)))?;
        let student = occ
            .take()
            .ok_or_else(|| AllotError::state(format!("slot {} is already empty", slot)))?;
        self.waiting.push(student.clone());
        sort_by_rank(&mut self.waiting);
        Ok(student)
    }

    /// Seat a waiting student into an empty slot. Rejected when the slot is
    /// occupied (never silently overwritten) or when the student is not on
    /// the waiting list.
    pub fn add(&mut self, roll_no: &str, slot: &str) -> Result<(), AllotError> {
        let occ = self
            .slots
            .get_mut(slot)
            .ok_or_else(|| AllotError::state(format!("unknown slot {}", slot)))?;
        if occ.is_some() {
            return Err(AllotError::conflict(format!("slot {} is already occupied", slot)));
        }
        let pos = self
            .waiting
            .iter()
            .position(|s| s.roll_no == roll_no)
            .ok_or_else(|| AllotError::state(format!("student {} is not on the waiting list", roll_no)))?;
        *occ = Some(self.waiting.remove(pos));
        Ok(())
    }

    /// All empty slots, computed from the full theoretical slot set derived
    /// from the matrix entry — a slot the greedy pass never saw (the matrix
    /// grew since) is still offered.
    pub fn available_seats(&self, entry: &BranchEntry, caste_order: &[String]) -> Vec<String> {
        enumerate_slots(entry, caste_order)
            .into_iter()
            .filter(|name| match self.slots.get(name) {
                Some(occ) => occ.is_none(),
                None => true,
            })
            .collect()
    }

    /// `(roll_no, seat_alloted)` pairs for persistence: a slot name for every
    /// seated student, the waiting marker for everyone else.
    pub fn assignments(&self) -> Vec<(String, Option<String>)> {
        let mut out = Vec::new();
        for name in &self.slot_names {
            if let Some(Some(student)) = self.slots.get(name) {
                out.push((student.roll_no.clone(), Some(name.clone())));
            }
        }
        for student in &self.waiting {
            out.push((student.roll_no.clone(), Some(WAITING.to_string())));
        }
        out
    }
}
