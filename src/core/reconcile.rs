//! List, remove, copy, and move save slots between collections.
//!
//! Every operation reads what it needs up front, decides in memory, then
//! writes each touched collection once. Nothing is written if any read or
//! id assignment fails. Multi-file moves are not atomic across files.

use anyhow::Result;
use std::collections::BTreeMap;
use std::fmt;
use tracing::{debug, instrument};

use crate::core::collection::{Collection, Payload, Scope};
use crate::core::detect::Location;
use crate::core::error::{SaveError, is_not_found};
use crate::core::prompt::OverwritePrompt;
use crate::core::record::{IndexSummary, SaveRecord};
use crate::core::selector::{IdFilter, IdGenerator, Verdict};
use crate::infra::config::Settings;

/// One slot-level change, in the order it was decided
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Copied { from: String, from_id: usize, to: String, to_id: usize },
    Moved { from: String, from_id: usize, to: String, to_id: usize },
    Removed { at: String, id: usize },
    /// Existing slot kept because overwrite was declined
    Kept { at: String, id: usize },
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Copied { from, from_id, to, to_id } => {
                write!(f, "copying {from}#{from_id} to {to}#{to_id}")
            }
            Action::Moved { from, from_id, to, to_id } => {
                write!(f, "moving {from}#{from_id} to {to}#{to_id}")
            }
            Action::Removed { at, id } => write!(f, "removing {at}#{id}"),
            Action::Kept { at, id } => write!(f, "keeping {at}#{id}"),
        }
    }
}

/// What an operation did
#[derive(Debug, Clone, Default)]
pub struct Report {
    pub actions: Vec<Action>,
}

impl Report {
    fn push(&mut self, action: Action) {
        debug!(%action);
        self.actions.push(action);
    }
}

/// Listing of one collection, in file order
#[derive(Debug, Clone)]
pub struct Listing {
    pub location: String,
    /// Game title taken from the first listed slot
    pub title: Option<String>,
    pub rows: Vec<ListingRow>,
}

#[derive(Debug, Clone)]
pub struct ListingRow {
    pub id: usize,
    pub summary: IndexSummary,
}

/// Metadata of the selected slots; undecodable slots are left out.
#[instrument(skip_all, fields(path = %coll.selector().path))]
pub fn list(coll: &mut Collection, settings: &Settings) -> Result<Listing> {
    let records = coll.read(Scope::Selected, Payload::IndexOnly, settings)?;

    let rows: Vec<ListingRow> = records
        .iter()
        .filter_map(|r| r.summary().map(|summary| ListingRow { id: r.id, summary }))
        .collect();

    let title = rows
        .first()
        .map(|r| r.summary.title.clone())
        .filter(|t| !t.is_empty());

    Ok(Listing { location: coll.name(), title, rows })
}

/// Drop the selected slots and write the rest back.
#[instrument(skip_all, fields(path = %coll.selector().path))]
pub fn remove(coll: &mut Collection, settings: &Settings) -> Result<Report> {
    let records = coll.read(Scope::All, Payload::Full, settings)?;
    let name = coll.name();

    let mut filter = IdFilter::new(coll.ids().clone());

    let mut report = Report::default();
    let mut kept = Vec::with_capacity(records.len());
    for rec in records {
        match filter.check(rec.id) {
            Verdict::Take => report.push(Action::Removed { at: name.clone(), id: rec.id }),
            Verdict::Skip | Verdict::Done => kept.push(rec),
        }
    }

    if report.actions.is_empty() {
        debug!("nothing selected; collection left untouched");
        return Ok(report);
    }

    coll.write(&kept, settings)?;
    Ok(report)
}

/// Copy selected slots of every source into `dest`, continuing one shared
/// destination id sequence across sources.
#[instrument(skip_all, fields(dest = %dest.selector().path, sources = sources.len()))]
pub fn copy(
    sources: &mut [Collection],
    dest: &mut Collection,
    settings: &Settings,
    prompt: &mut dyn OverwritePrompt,
) -> Result<Report> {
    let mut pending = by_id(read_optional(dest, settings)?);
    let dest_name = dest.name();
    dest.ids().reset();

    let mut report = Report::default();
    for src in sources.iter_mut() {
        let records = src.read(Scope::Selected, Payload::Full, settings)?;
        let src_name = src.name();

        let mut prev = None;
        for mut rec in records {
            let steps = gap_steps(settings.keep_gap, prev, rec.id);
            prev = Some(rec.id);
            let to_id = next_dest_id(dest.ids(), steps, &dest_name)?;

            if pending.contains_key(&to_id)
                && !confirm_overwrite(settings, prompt, to_id, &src_name, rec.id)
            {
                report.push(Action::Kept { at: dest_name.clone(), id: to_id });
                continue;
            }

            report.push(Action::Copied {
                from: src_name.clone(),
                from_id: rec.id,
                to: dest_name.clone(),
                to_id,
            });
            rec.id = to_id;
            stamp_comment(&mut rec, settings);
            pending.insert(to_id, rec);
        }
    }

    let merged: Vec<SaveRecord> = pending.into_values().collect();
    dest.write(&merged, settings)?;
    Ok(report)
}

/// In-memory state of one collection touched by a move
struct Opened {
    location: Location,
    records: BTreeMap<usize, SaveRecord>,
    /// Highest id present when first opened; bounds open-ended selectors
    max_id: Option<usize>,
    /// Index into the caller's sources, `None` for the destination
    source: Option<usize>,
    dirty: bool,
}

impl Opened {
    fn new(location: Location, records: Vec<SaveRecord>, source: Option<usize>) -> Self {
        let records = by_id(records);
        let max_id = records.keys().next_back().copied();
        Self { location, records, max_id, source, dirty: false }
    }
}

/// Like `copy`, but selected slots leave their source. The destination is
/// written first, then every other source that lost slots.
///
/// Each source is planned before anything moves: its selected slots are
/// paired with destination ids and lifted out, so a shift inside one
/// collection (`a#1,2` to `a#2,3`) never treats a slot that is itself
/// moving as an overwrite victim.
#[instrument(skip_all, fields(dest = %dest.selector().path, sources = sources.len()))]
pub fn move_records(
    sources: &mut [Collection],
    dest: &mut Collection,
    settings: &Settings,
    prompt: &mut dyn OverwritePrompt,
) -> Result<Report> {
    let existing = read_optional(dest, settings)?;
    let dest_loc = dest.location(settings)?.clone();
    let dest_name = dest.name();
    let mut opened = vec![Opened::new(dest_loc, existing, None)];
    dest.ids().reset();

    let mut placed: Vec<SaveRecord> = Vec::new();
    let mut report = Report::default();

    for (si, src) in sources.iter_mut().enumerate() {
        let loc = src.location(settings)?.clone();
        let slot = match opened.iter().position(|o| o.location == loc) {
            Some(i) => i,
            None => {
                let records = src.read(Scope::All, Payload::Full, settings)?;
                opened.push(Opened::new(loc, records, Some(si)));
                opened.len() - 1
            }
        };
        let same_file = slot == 0;
        let src_name = src.name();

        let Some(max_id) = opened[slot].max_id else {
            debug!(source = %src_name, "source is empty");
            continue;
        };

        let pairs =
            plan_moves(&opened[slot], max_id, src.ids(), dest.ids(), settings.keep_gap, &dest_name)?;
        let mut moving: BTreeMap<usize, SaveRecord> = pairs
            .iter()
            .filter_map(|&(src_id, _)| opened[slot].records.remove(&src_id).map(|r| (src_id, r)))
            .collect();

        let mut accepted: Vec<(usize, usize)> = Vec::with_capacity(pairs.len());
        for (src_id, to_id) in pairs {
            let occupied = opened[0].records.contains_key(&to_id);
            if occupied && !confirm_overwrite(settings, prompt, to_id, &src_name, src_id) {
                report.push(Action::Kept { at: dest_name.clone(), id: to_id });
                if let Some(rec) = moving.remove(&src_id) {
                    opened[slot].records.insert(src_id, rec);
                }
                continue;
            }
            if occupied {
                opened[0].records.remove(&to_id);
            }
            accepted.push((src_id, to_id));
        }

        // A slot that stayed put blocks any earlier move aimed at it; that
        // move stays put too, which can in turn block another.
        if same_file {
            while let Some(pos) = accepted.iter().position(|(_, to)| opened[0].records.contains_key(to)) {
                let (src_id, to_id) = accepted.remove(pos);
                debug!(src_id, to_id, "target kept by a declined move");
                report.push(Action::Kept { at: dest_name.clone(), id: to_id });
                if let Some(rec) = moving.remove(&src_id) {
                    opened[0].records.insert(src_id, rec);
                }
            }
        }

        for (src_id, to_id) in accepted {
            let Some(mut rec) = moving.remove(&src_id) else {
                continue;
            };
            opened[slot].dirty = true;
            report.push(Action::Moved {
                from: src_name.clone(),
                from_id: src_id,
                to: dest_name.clone(),
                to_id,
            });
            rec.id = to_id;
            stamp_comment(&mut rec, settings);
            placed.push(rec);
        }
    }

    let mut remaining = opened.into_iter();
    if let Some(dest_state) = remaining.next() {
        placed.extend(dest_state.records.into_values());
    }
    placed.sort_by_key(|r| r.id);
    dest.write(&placed, settings)?;

    for state in remaining.filter(|o| o.dirty) {
        if let Some(si) = state.source {
            let records: Vec<SaveRecord> = state.records.into_values().collect();
            sources[si].write(&records, settings)?;
        }
    }

    Ok(report)
}

/// Pair every selected slot of `src` (up to `max_id`) with its destination
/// id, in ascending source order.
fn plan_moves(
    src: &Opened,
    max_id: usize,
    src_ids: &IdGenerator,
    dest_ids: &mut IdGenerator,
    keep_gap: bool,
    dest_name: &str,
) -> Result<Vec<(usize, usize)>> {
    let mut filter = IdFilter::new(src_ids.clone());
    let mut pairs = Vec::new();
    let mut prev = None;

    for &src_id in src.records.keys() {
        if src_id > max_id {
            break;
        }
        match filter.check(src_id) {
            Verdict::Take => {}
            Verdict::Skip => continue,
            Verdict::Done => break,
        }
        let steps = gap_steps(keep_gap, prev, src_id);
        prev = Some(src_id);
        pairs.push((src_id, next_dest_id(dest_ids, steps, dest_name)?));
    }

    Ok(pairs)
}

/// Read every slot of a destination; a missing one is simply empty.
fn read_optional(dest: &mut Collection, settings: &Settings) -> Result<Vec<SaveRecord>> {
    match dest.read(Scope::All, Payload::Full, settings) {
        Ok(records) => Ok(records),
        Err(e) if is_not_found(&e) => {
            debug!(dest = %dest.name(), "destination does not exist yet");
            Ok(Vec::new())
        }
        Err(e) => Err(e),
    }
}

fn by_id(records: Vec<SaveRecord>) -> BTreeMap<usize, SaveRecord> {
    records.into_iter().map(|r| (r.id, r)).collect()
}

/// Destination ids to advance for the next source slot
fn gap_steps(keep_gap: bool, prev: Option<usize>, id: usize) -> usize {
    match (keep_gap, prev) {
        (true, Some(p)) if id > p => id - p,
        _ => 1,
    }
}

fn next_dest_id(ids: &mut IdGenerator, steps: usize, dest: &str) -> Result<usize> {
    ids.nth(steps.saturating_sub(1))
        .ok_or_else(|| SaveError::Exhausted { dest: dest.to_string() }.into())
}

fn confirm_overwrite(
    settings: &Settings,
    prompt: &mut dyn OverwritePrompt,
    to_id: usize,
    src_name: &str,
    src_id: usize,
) -> bool {
    settings.force || prompt.confirm(&format!("Overwrite #{to_id} with {src_name}#{src_id}?"), false)
}

fn stamp_comment(rec: &mut SaveRecord, settings: &Settings) {
    if let Some(c) = &settings.comment {
        rec.comment = c.clone();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::selector::Selector;

    #[test]
    fn test_gap_steps() {
        assert_eq!(gap_steps(false, Some(2), 9), 1);
        assert_eq!(gap_steps(true, None, 9), 1);
        assert_eq!(gap_steps(true, Some(2), 9), 7);
    }

    #[test]
    fn test_next_dest_id_steps_and_exhausts() {
        let mut ids = Selector::parse("#4,6,8").unwrap().generator();
        assert_eq!(next_dest_id(&mut ids, 1, "d").unwrap(), 4);
        assert_eq!(next_dest_id(&mut ids, 2, "d").unwrap(), 8);
        let err = next_dest_id(&mut ids, 1, "d").unwrap_err();
        assert!(matches!(err.downcast_ref::<SaveError>(), Some(SaveError::Exhausted { .. })));
    }

    #[test]
    fn test_next_dest_id_jumps_large_gaps() {
        let mut ids = Selector::parse("#5-").unwrap().generator();
        assert_eq!(next_dest_id(&mut ids, 1_000_000_000_000, "d").unwrap(), 1_000_000_000_004);
        assert_eq!(next_dest_id(&mut ids, 1, "d").unwrap(), 1_000_000_000_005);
    }

    #[test]
    fn test_plan_moves_skips_to_present_ids() {
        let records = vec![
            SaveRecord { id: 1, ..Default::default() },
            SaveRecord { id: 4_000_000_000, ..Default::default() },
        ];
        let loc = Location { path: "a.rpgarch".into(), format: crate::core::detect::SaveFormat::Archive };
        let src = Opened::new(loc, records, Some(0));
        let src_ids = Selector::parse("#1-").unwrap().generator();
        let mut dest_ids = Selector::parse("#0-").unwrap().generator();

        let pairs = plan_moves(&src, 4_000_000_000, &src_ids, &mut dest_ids, true, "d").unwrap();
        assert_eq!(pairs, vec![(1, 0), (4_000_000_000, 3_999_999_999)]);
    }

    #[test]
    fn test_action_lines() {
        let a = Action::Copied { from: "a/".into(), from_id: 1, to: "b.rpgarch".into(), to_id: 0 };
        assert_eq!(a.to_string(), "copying a/#1 to b.rpgarch#0");
        assert_eq!(Action::Removed { at: "x".into(), id: 3 }.to_string(), "removing x#3");
    }
}
