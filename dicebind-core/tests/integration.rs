//! Scenario tests covering presets, the assignment codec and snapshots.

use dicebind_core::codec::{self, AssignmentRecord};
use dicebind_core::{
    AppDataSet, Assignment, Behavior, BehaviorHandle, DataSet, DeviceId, Die, DieHandle,
    MemoryStore, NO_BEHAVIOR, NO_DEVICE, Preset, Store,
};

/// A dataset with a fixed die table, a plain vector of behaviors and a
/// counter of how many duplicates were requested.
struct Bench {
    dice: Vec<(DieHandle, Die)>,
    behaviors: Vec<(BehaviorHandle, Behavior)>,
    next_behavior: u32,
    duplicates: usize,
}

impl Bench {
    fn new(device_ids: &[DeviceId], behavior_names: &[&str]) -> Self {
        let dice = device_ids
            .iter()
            .enumerate()
            .map(|(i, id)| (DieHandle::from_raw(i as u32), Die::new(format!("die {i}"), *id)))
            .collect();
        let behaviors: Vec<_> = behavior_names
            .iter()
            .enumerate()
            .map(|(i, name)| (BehaviorHandle::from_raw(i as u32), Behavior::new(*name, "")))
            .collect();
        Bench {
            dice,
            next_behavior: behaviors.len() as u32,
            behaviors,
            duplicates: 0,
        }
    }

    fn die_handle(&self, i: usize) -> DieHandle {
        self.dice[i].0
    }

    fn behavior_handle(&self, i: usize) -> BehaviorHandle {
        self.behaviors[i].0
    }

    fn behavior_mut(&mut self, handle: BehaviorHandle) -> Option<&mut Behavior> {
        self.behaviors
            .iter_mut()
            .find(|(h, _)| *h == handle)
            .map(|(_, b)| b)
    }

    fn set_live(&mut self, die: DieHandle, behavior: Option<BehaviorHandle>) {
        if let Some((_, d)) = self.dice.iter_mut().find(|(h, _)| *h == die) {
            d.current_behavior = behavior;
        }
    }
}

impl DataSet for Bench {
    fn find_die(&self, device_id: DeviceId) -> Option<DieHandle> {
        self.dice
            .iter()
            .find(|(_, d)| d.device_id == device_id)
            .map(|(h, _)| *h)
    }

    fn die(&self, handle: DieHandle) -> Option<&Die> {
        self.dice.iter().find(|(h, _)| *h == handle).map(|(_, d)| d)
    }

    fn behavior(&self, handle: BehaviorHandle) -> Option<&Behavior> {
        self.behaviors
            .iter()
            .find(|(h, _)| *h == handle)
            .map(|(_, b)| b)
    }

    fn behavior_index(&self, handle: BehaviorHandle) -> Option<usize> {
        self.behaviors.iter().position(|(h, _)| *h == handle)
    }

    fn behavior_at(&self, index: usize) -> Option<BehaviorHandle> {
        self.behaviors.get(index).map(|(h, _)| *h)
    }

    fn behavior_count(&self) -> usize {
        self.behaviors.len()
    }

    fn duplicate_behavior(&mut self, handle: BehaviorHandle) -> Option<BehaviorHandle> {
        let copy = self.behavior(handle)?.clone();
        let new_handle = BehaviorHandle::from_raw(self.next_behavior);
        self.next_behavior += 1;
        self.behaviors.push((new_handle, copy));
        self.duplicates += 1;
        Some(new_handle)
    }
}

#[test]
fn roundtrip_under_stable_dataset() {
    let bench = Bench::new(&[0x11, 0x22, 0x33], &["idle", "rainbow", "fire"]);

    for die in 0..3 {
        for behavior in 0..3 {
            let original = Assignment {
                die: Some(bench.die_handle(die)),
                behavior: Some(bench.behavior_handle(behavior)),
                default_assignment_index: die as i32,
            };
            let record = codec::encode(&original, &bench);
            assert_eq!(codec::decode(&record, &bench), original);
        }
    }
}

#[test]
fn absent_die_writes_zero_and_zero_reads_absent() {
    let bench = Bench::new(&[0], &["idle"]);

    let record = codec::encode(&Assignment::new(None, Some(bench.behavior_handle(0))), &bench);
    assert_eq!(record.device_id, NO_DEVICE);

    // A die genuinely reporting id 0 is still not bound.
    let decoded = codec::decode(&record, &bench);
    assert_eq!(decoded.die, None);
    assert_eq!(decoded.behavior, Some(bench.behavior_handle(0)));
}

#[test]
fn out_of_range_behavior_index_is_tolerated() {
    let bench = Bench::new(&[0x11], &["idle", "rainbow"]);

    for behavior_index in [i32::MIN, -2, NO_BEHAVIOR, 2, i32::MAX] {
        let record = AssignmentRecord {
            device_id: 0x11,
            behavior_index,
            default_die_assignment_index: 0,
        };
        let decoded = codec::decode(&record, &bench);
        assert_eq!(decoded.behavior, None);
        assert_eq!(decoded.die, Some(bench.die_handle(0)));
    }
}

#[test]
fn reordering_behaviors_rebinds_positions() {
    let mut bench = Bench::new(&[0x11], &["idle", "rainbow"]);
    let rainbow = bench.behavior_handle(1);

    let record = codec::encode(&Assignment::new(None, Some(rainbow)), &bench);
    bench.behaviors.swap(0, 1);

    // Positions are not stable keys: the record now points at "idle".
    let decoded = codec::decode(&record, &bench);
    assert_ne!(decoded.behavior, Some(rainbow));
    assert_eq!(
        decoded.behavior.and_then(|h| bench.behavior(h)).map(|b| b.name.as_str()),
        Some("idle")
    );
}

#[test]
fn cascading_delete_die_touches_only_references() {
    let bench = Bench::new(&[0x11, 0x22], &["idle", "fire"]);
    let (d1, d2) = (bench.die_handle(0), bench.die_handle(1));
    let (b1, b2) = (bench.behavior_handle(0), bench.behavior_handle(1));

    let mut preset = Preset::new("mixed", "");
    preset.die_assignments = vec![
        Assignment::new(Some(d1), Some(b1)),
        Assignment::new(Some(d2), Some(b1)),
        Assignment::new(Some(d1), Some(b2)),
        Assignment::new(None, Some(b2)),
    ];
    let before = preset.clone();

    assert_eq!(preset.delete_die(d1), 2);
    assert!(!preset.depends_on_die(d1));

    for (after, before) in preset.die_assignments.iter().zip(&before.die_assignments) {
        if before.die == Some(d1) {
            assert_eq!(after.die, None);
            assert_eq!(after.behavior, before.behavior);
        } else {
            assert_eq!(after, before);
        }
    }
}

#[test]
fn duplicate_is_independent_of_source() {
    let mut bench = Bench::new(&[0x11, 0x22], &["idle", "fire"]);
    let d1 = bench.die_handle(0);
    let b1 = bench.behavior_handle(0);

    let mut preset = Preset::new("original", "keep me");
    preset.die_assignments = vec![
        Assignment {
            die: Some(d1),
            behavior: Some(b1),
            default_assignment_index: 7,
        },
        Assignment::new(Some(bench.die_handle(1)), None),
    ];

    let mut copy = preset.duplicate(&mut bench);
    assert_eq!(bench.duplicates, 1);

    let copied = copy.die_assignments[0].clone();
    assert_eq!(copied.die, Some(d1));
    assert_ne!(copied.behavior, Some(b1));
    assert_eq!(copied.default_assignment_index, 0);

    // Editing the copied behavior's contents leaves the source behavior alone.
    let copied_behavior = copied.behavior.unwrap();
    bench.behavior_mut(copied_behavior).unwrap().name = "renamed".to_string();
    assert_eq!(bench.behavior(copied_behavior).unwrap().name, "renamed");
    assert_eq!(bench.behavior(b1).unwrap().name, "idle");

    // Editing the copy leaves the source preset alone.
    copy.delete_behavior(copied_behavior);
    copy.name.push_str(" (copy)");
    assert_eq!(preset.die_assignments[0].behavior, Some(b1));
    assert_eq!(preset.name, "original");
    assert!(preset.depends_on_behavior(b1));
}

#[test]
fn shared_behavior_gets_one_copy_per_assignment() {
    let mut bench = Bench::new(&[0x11, 0x22], &["idle"]);
    let shared = bench.behavior_handle(0);

    let mut preset = Preset::new("pair", "");
    preset.die_assignments = vec![
        Assignment::new(Some(bench.die_handle(0)), Some(shared)),
        Assignment::new(Some(bench.die_handle(1)), Some(shared)),
    ];

    let copy = preset.duplicate(&mut bench);
    let first = copy.die_assignments[0].behavior.unwrap();
    let second = copy.die_assignments[1].behavior.unwrap();

    assert_eq!(bench.duplicates, 2);
    assert_eq!(bench.behavior_count(), 3);
    assert_ne!(first, shared);
    assert_ne!(second, shared);
    assert_ne!(first, second);

    bench.behavior_mut(first).unwrap().name = "first copy".to_string();
    assert_eq!(bench.behavior(second).unwrap().name, "idle");
    assert_eq!(bench.behavior(shared).unwrap().name, "idle");
}

#[test]
fn liveness_against_hardware_state() {
    let mut bench = Bench::new(&[0x11, 0x22], &["idle", "fire"]);
    let (d1, d2) = (bench.die_handle(0), bench.die_handle(1));
    let (b1, b2) = (bench.behavior_handle(0), bench.behavior_handle(1));

    assert!(Preset::new("empty", "").is_active(&bench));

    let mut preset = Preset::new("pair", "");
    preset.die_assignments = vec![
        Assignment::new(Some(d1), Some(b1)),
        Assignment::new(Some(d2), Some(b2)),
    ];
    assert!(!preset.is_active(&bench));

    bench.set_live(d1, Some(b1));
    bench.set_live(d2, Some(b1));
    assert!(!preset.is_active(&bench));

    bench.set_live(d2, Some(b2));
    assert!(preset.is_active(&bench));

    preset.delete_die(d2);
    assert!(!preset.is_active(&bench));
}

#[test]
fn delete_behavior_twice_equals_once() {
    let mut ds = AppDataSet::new();
    let die = ds.add_die(Die::new("d20", 1)).unwrap();
    let behavior = ds.add_behavior(Behavior::new("fire", "")).unwrap();

    let mut preset = Preset::new("p", "");
    preset.die_assignments = vec![
        Assignment::new(Some(die), Some(behavior)),
        Assignment::new(None, Some(behavior)),
    ];

    let mut once = preset.clone();
    once.delete_behavior(behavior);
    preset.delete_behavior(behavior);
    preset.delete_behavior(behavior);

    assert_eq!(preset, once);
}

#[test]
fn dataset_lifecycle_survives_snapshot() {
    let mut ds = AppDataSet::new();
    let d20 = ds.add_die(Die::new("d20", 0x2020)).unwrap();
    let d6 = ds.add_die(Die::new("d6", 0x0606)).unwrap();
    let idle = ds.add_behavior(Behavior::new("idle", "")).unwrap();
    let fire = ds.add_behavior(Behavior::new("fire", "flicker on roll")).unwrap();

    let mut preset = Preset::new("tabletop", "");
    preset.die_assignments = vec![
        Assignment::new(Some(d20), Some(fire)),
        Assignment::new(Some(d6), Some(idle)),
    ];
    let original = ds.add_preset(preset);
    let copy = ds.duplicate_preset(original).unwrap();

    assert_eq!(ds.behavior_count(), 4);
    assert_eq!(ds.presets_depending_on_die(d20).count(), 2);
    assert_eq!(ds.presets_depending_on_behavior(fire).count(), 1);

    ds.set_current_behavior(d20, Some(fire));
    ds.set_current_behavior(d6, Some(idle));
    let active: Vec<_> = ds.active_presets().map(|p| p.name.as_str()).collect();
    assert_eq!(active, ["tabletop"]);

    // Removing the d6 degrades both presets but keeps their entries.
    ds.remove_die(d6);
    assert_eq!(ds.presets()[original].die_assignments.len(), 2);
    assert_eq!(ds.presets()[copy].die_assignments[1].die, None);

    let store = MemoryStore::new();
    let key = ds.commit(&store, "tabletop").unwrap();
    assert!(store.has(&key).unwrap());
    assert_eq!(store.head("tabletop").unwrap(), Some(key));

    let loaded = AppDataSet::checkout(&store, "tabletop").unwrap();
    assert_eq!(loaded.to_record(), ds.to_record());
    assert_eq!(loaded.presets().len(), 2);

    let reloaded_d20 = loaded.find_die(0x2020).unwrap();
    assert!(loaded.presets()[original].depends_on_die(reloaded_d20));
    assert_eq!(loaded.presets()[copy].die_assignments[1].die, None);
    assert!(loaded.die(reloaded_d20).unwrap().current_behavior.is_none());
}
