//! Keeps a CPU's mounted volumes in step with the vessel it sits on.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use log::{debug, warn};

use crate::module::host::HostPart;
use crate::module::processor::{ProcessorUnit, SharedProcessor};
use crate::runner::cpu::Cpu;
use crate::runner::ds::volume::SharedVolume;

/// Recomputes the mounted-volume set when the vessel's member count changes.
///
/// The set is the CPU's archive, the unit's own local volume and the local
/// volume of every other processor unit on the vessel. Between count changes
/// the set is left as it was, even if members were swapped one for one.
#[derive(Debug, Default)]
pub struct VolumeAggregator {
    part_count: Option<usize>,
    siblings: Vec<Weak<RefCell<ProcessorUnit>>>,
    refresh_count: u32,
}

impl VolumeAggregator {
    pub fn new() -> Self {
        VolumeAggregator::default()
    }

    /// Remount if the vessel changed size since the last call, or if the
    /// last recomputation had to skip a busy sibling. Returns whether the set
    /// was recomputed. A part without a vessel is left alone.
    pub fn refresh(&mut self, part: &dyn HostPart, cpu: &mut Cpu, local: &SharedVolume) -> bool {
        let members = match part.vessel() {
            Some(members) => members,
            None => return false,
        };
        if self.part_count == Some(members.len()) {
            return false;
        }

        let mut volumes = vec![cpu.archive(), local.clone()];
        let mut siblings = Vec::new();
        let mut complete = true;
        for member in members.iter().filter(|m| m.id != part.id()) {
            let unit = match member.processor() {
                Some(unit) => unit,
                None => continue,
            };
            siblings.push(Rc::downgrade(unit));
            match unit.try_borrow() {
                Ok(unit) => {
                    if let Some(disk) = unit.hard_disk() {
                        volumes.push(disk);
                    }
                }
                Err(_) => {
                    warn!(
                        "processor on part {} is busy, its volume was not mounted",
                        member.id
                    );
                    complete = false;
                }
            }
        }

        debug!(
            "part {} remounted {} volumes for {} vessel members",
            part.id(),
            volumes.len(),
            members.len()
        );
        cpu.update_volume_mounts(volumes);
        self.siblings = siblings;
        // A busy sibling leaves the count uncached so the next call rescans.
        self.part_count = if complete { Some(members.len()) } else { None };
        self.refresh_count += 1;
        true
    }

    /// Forget the cached count so the next refresh recomputes.
    pub fn reset(&mut self) {
        self.part_count = None;
    }

    /// Sibling processor units recorded by the last recomputation that are
    /// still alive.
    pub fn siblings(&self) -> Vec<SharedProcessor> {
        self.siblings.iter().filter_map(Weak::upgrade).collect()
    }

    pub fn part_count(&self) -> Option<usize> {
        self.part_count
    }

    /// How many times the set has been recomputed.
    pub fn refresh_count(&self) -> u32 {
        self.refresh_count
    }
}
