#![allow(clippy::float_cmp)]

use rand::Rng;
use uuid::Uuid;

use super::*;

const ALL_KINDS: [AlignKind; 6] = [
    AlignKind::Left,
    AlignKind::Center,
    AlignKind::Right,
    AlignKind::Top,
    AlignKind::Middle,
    AlignKind::Bottom,
];

fn rec(x: f64, y: f64, w: f64, h: f64) -> LayoutRecord {
    LayoutRecord { x, y, width: w, height: h, z_index: 0 }
}

/// Three 20-wide blocks at x = 0, 50, 100 with varying y and height.
fn row() -> (Vec<Uuid>, LayoutMap) {
    let ids: Vec<Uuid> = (0..3).map(|_| Uuid::new_v4()).collect();
    let mut map = LayoutMap::new();
    map.insert(ids[0], rec(0.0, 5.0, 20.0, 10.0));
    map.insert(ids[1], rec(50.0, 30.0, 20.0, 40.0));
    map.insert(ids[2], rec(100.0, 20.0, 20.0, 20.0));
    (ids, map)
}

fn close(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}

// =============================================================
// Correctness
// =============================================================

#[test]
fn align_left_uses_min_left() {
    let (ids, map) = row();
    let out = align(&ids, &map, AlignKind::Left);
    for id in &ids {
        assert_eq!(out.get(id).unwrap().x, 0.0);
    }
}

#[test]
fn align_right_matches_max_right_edge() {
    let (ids, map) = row();
    let out = align(&ids, &map, AlignKind::Right);
    for id in &ids {
        let r = out.get(id).unwrap();
        assert_eq!(r.x + r.width, 120.0);
        assert_eq!(r.x, 100.0);
    }
}

#[test]
fn align_center_uses_mean_of_centers() {
    let (ids, map) = row();
    let out = align(&ids, &map, AlignKind::Center);
    // centers 10, 60, 110 -> mean 60
    for id in &ids {
        let r = out.get(id).unwrap();
        assert_eq!(r.x + r.width / 2.0, 60.0);
    }
}

#[test]
fn align_top_bottom_middle() {
    let (ids, map) = row();

    let top = align(&ids, &map, AlignKind::Top);
    assert!(ids.iter().all(|id| top.get(id).unwrap().y == 5.0));

    let bottom = align(&ids, &map, AlignKind::Bottom);
    for id in &ids {
        let r = bottom.get(id).unwrap();
        assert_eq!(r.y + r.height, 70.0);
    }

    // centers 10, 50, 30 -> mean 30
    let middle = align(&ids, &map, AlignKind::Middle);
    for id in &ids {
        let r = middle.get(id).unwrap();
        assert_eq!(r.y + r.height / 2.0, 30.0);
    }
}

#[test]
fn align_never_touches_size_or_z() {
    let (ids, mut map) = row();
    map.get_mut(&ids[1]).unwrap().z_index = 4;
    for kind in ALL_KINDS {
        let out = align(&ids, &map, kind);
        for id in &ids {
            let before = map.get(id).unwrap();
            let after = out.get(id).unwrap();
            assert_eq!(before.width, after.width);
            assert_eq!(before.height, after.height);
            assert_eq!(before.z_index, after.z_index);
        }
    }
}

#[test]
fn align_leaves_unselected_blocks_alone() {
    let (ids, mut map) = row();
    let other = Uuid::new_v4();
    map.insert(other, rec(500.0, 500.0, 10.0, 10.0));
    let out = align(&ids[..2], &map, AlignKind::Left);
    assert_eq!(out.get(&other), map.get(&other));
    assert_eq!(out.get(&ids[2]), map.get(&ids[2]));
}

// =============================================================
// No-ops
// =============================================================

#[test]
fn align_single_block_is_noop() {
    let (ids, map) = row();
    assert_eq!(align(&ids[..1], &map, AlignKind::Right), map);
    assert_eq!(align(&[], &map, AlignKind::Right), map);
}

#[test]
fn align_duplicate_ids_count_once() {
    let (ids, map) = row();
    let dup = vec![ids[1], ids[1]];
    assert_eq!(align(&dup, &map, AlignKind::Left), map);
}

#[test]
fn align_missing_record_uses_fallback_geometry() {
    let (ids, map) = row();
    let ghost = Uuid::new_v4();
    let out = align(&[ids[2], ghost], &map, AlignKind::Left);
    assert_eq!(out.get(&ids[2]).unwrap().x, 0.0);
    assert_eq!(out.get(&ghost).unwrap(), &rec(0.0, 0.0, 100.0, 100.0));
}

// =============================================================
// Idempotence
// =============================================================

#[test]
fn align_is_idempotent_on_exact_values() {
    let (ids, map) = row();
    for kind in ALL_KINDS {
        let once = align(&ids, &map, kind);
        let twice = align(&ids, &once, kind);
        assert_eq!(once, twice, "{kind:?}");
    }
}

#[test]
fn align_is_idempotent_on_random_layouts() {
    let mut rng = rand::rng();
    for _ in 0..200 {
        let count = rng.random_range(2..8);
        let ids: Vec<Uuid> = (0..count).map(|_| Uuid::new_v4()).collect();
        let map: LayoutMap = ids
            .iter()
            .map(|id| {
                let r = rec(
                    rng.random_range(-500.0..500.0),
                    rng.random_range(-500.0..500.0),
                    rng.random_range(1.0..300.0),
                    rng.random_range(1.0..300.0),
                );
                (*id, r)
            })
            .collect();
        for kind in ALL_KINDS {
            let once = align(&ids, &map, kind);
            let twice = align(&ids, &once, kind);
            for id in &ids {
                let a = once.get(id).unwrap();
                let b = twice.get(id).unwrap();
                assert!(close(a.x, b.x) && close(a.y, b.y), "{kind:?}");
            }
        }
    }
}

#[test]
fn align_kind_parses_from_str() {
    assert_eq!("middle".parse::<AlignKind>().unwrap(), AlignKind::Middle);
    let err = "diagonal".parse::<AlignKind>().unwrap_err();
    assert!(err.to_string().contains("diagonal"));
}
