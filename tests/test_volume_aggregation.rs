//! Mounted-volume aggregation across the processor units of one vessel.

extern crate kos;


use std::rc::Rc;

use host_util::{add_processor, init_logging, TestPart, TestVessel};
use kos::module::host::StartState;
use kos::module::processor::SharedProcessor;
use kos::persistence::{MemoryStore, SharedStore};
use kos::runner::ds::volume::SharedVolume;

struct Fleet {
    vessel: Rc<TestVessel>,
    store: SharedStore,
    parts: Vec<Rc<TestPart>>,
    units: Vec<SharedProcessor>,
}

impl Fleet {
    fn new(count: u32) -> Self {
        init_logging();
        let mut fleet = Fleet {
            vessel: TestVessel::new(),
            store: MemoryStore::new().into_shared(),
            parts: Vec::new(),
            units: Vec::new(),
        };
        for id in 0..count {
            fleet.add(id);
        }
        fleet
    }

    fn add(&mut self, id: u32) -> SharedProcessor {
        let (part, unit) = add_processor(&self.vessel, id, &self.store);
        unit.borrow_mut().on_start(StartState::Flying).unwrap();
        self.parts.push(part);
        self.units.push(unit.clone());
        unit
    }

    fn mounted(&self, index: usize) -> Vec<SharedVolume> {
        self.units[index].borrow().cpu().unwrap().mounted_volumes().to_vec()
    }

    fn local(&self, index: usize) -> SharedVolume {
        self.units[index].borrow().hard_disk().unwrap()
    }

    fn archive(&self, index: usize) -> SharedVolume {
        self.units[index].borrow().cpu().unwrap().archive()
    }

    fn refreshes(&self, index: usize) -> u32 {
        self.units[index].borrow().aggregator().refresh_count()
    }

    fn tick(&self, index: usize) {
        self.units[index].borrow_mut().update();
    }
}

fn same_members(actual: &[SharedVolume], expected: &[SharedVolume]) -> bool {
    actual.len() == expected.len()
        && expected.iter().all(|e| actual.iter().any(|a| Rc::ptr_eq(a, e)))
}

#[test]
fn test_mounts_own_and_sibling_volumes() {
    let fleet = Fleet::new(3);
    fleet.vessel.add_part(10);
    fleet.tick(0);

    let expected = vec![fleet.archive(0), fleet.local(0), fleet.local(1), fleet.local(2)];
    assert!(same_members(&fleet.mounted(0), &expected));
    assert!(!fleet.mounted(0).iter().any(|v| Rc::ptr_eq(v, &fleet.archive(1))));

    let unit = fleet.units[0].borrow();
    let siblings = unit.aggregator().siblings();
    assert_eq!(siblings.len(), 2);
    assert!(siblings.iter().all(|s| !Rc::ptr_eq(s, &fleet.units[0])));
}

#[test]
fn test_refresh_only_on_member_count_change() {
    let fleet = Fleet::new(3);
    fleet.tick(0);
    let first = fleet.mounted(0);
    fleet.tick(0);
    assert_eq!(fleet.refreshes(0), 1);
    let second = fleet.mounted(0);
    assert!(same_members(&second, &first));
}

#[test]
fn test_topology_change_remounts() {
    let mut fleet = Fleet::new(2);
    fleet.tick(0);
    assert_eq!(fleet.mounted(0).len(), 3);

    fleet.add(2);
    fleet.tick(0);
    assert_eq!(fleet.refreshes(0), 2);
    let expected = vec![fleet.archive(0), fleet.local(0), fleet.local(1), fleet.local(2)];
    assert!(same_members(&fleet.mounted(0), &expected));

    fleet.vessel.remove(1);
    fleet.tick(0);
    assert_eq!(fleet.refreshes(0), 3);
    let expected = vec![fleet.archive(0), fleet.local(0), fleet.local(2)];
    assert!(same_members(&fleet.mounted(0), &expected));
}

#[test]
fn test_same_count_swap_is_not_noticed() {
    let mut fleet = Fleet::new(2);
    fleet.tick(0);
    fleet.vessel.remove(1);
    fleet.add(5);
    fleet.tick(0);
    assert_eq!(fleet.refreshes(0), 1);
    assert!(fleet.mounted(0).iter().any(|v| Rc::ptr_eq(v, &fleet.local(1))));
}

#[test]
fn test_sibling_without_volume_is_recorded_only() {
    let store = MemoryStore::new().into_shared();
    let vessel = TestVessel::new();
    let (_p0, u0) = add_processor(&vessel, 0, &store);
    let (_p1, _u1) = add_processor(&vessel, 1, &store);
    u0.borrow_mut().on_start(StartState::Orbital).unwrap();
    u0.borrow_mut().update();

    let unit = u0.borrow();
    assert_eq!(unit.aggregator().siblings().len(), 1);
    assert_eq!(unit.cpu().unwrap().mounted_volumes().len(), 2);
}

#[test]
fn test_every_unit_sees_the_shared_volumes() {
    let fleet = Fleet::new(3);
    for i in 0..3 {
        fleet.tick(i);
    }
    for i in 0..3 {
        let mounted = fleet.mounted(i);
        assert_eq!(mounted.len(), 4);
        for j in 0..3 {
            assert!(mounted.iter().any(|v| Rc::ptr_eq(v, &fleet.local(j))));
        }
    }
    fleet.local(2).borrow_mut().save_file("shared.ks", "hi").unwrap();
    assert_eq!(fleet.mounted(0).iter().filter(|v| v.borrow().file_count() == 1).count(), 1);
}

#[test]
fn test_busy_sibling_is_mounted_on_next_tick() {
    let fleet = Fleet::new(3);
    {
        let _held = fleet.units[1].borrow_mut();
        fleet.tick(0);
        assert_eq!(fleet.mounted(0).len(), 3);
    }
    fleet.tick(0);
    let expected = vec![fleet.archive(0), fleet.local(0), fleet.local(1), fleet.local(2)];
    assert!(same_members(&fleet.mounted(0), &expected));

    fleet.tick(0);
    assert_eq!(fleet.refreshes(0), 2);
}
