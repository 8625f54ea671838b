use arbitrary::{unstructured::Unstructured, Arbitrary};
use rand::{prelude::random, rngs::SmallRng, seq::SliceRandom, Rng, SeedableRng};

use std::collections::BTreeMap;

use super::*;
use crate::Error;

fn keys_of<K: Clone>(tree: &Rbt<K>) -> Vec<K> {
    tree.iter().cloned().collect()
}

fn assert_height_bound<K>(tree: &Rbt<K>) {
    let limit = 2.0 * ((tree.len() + 1) as f64).log2();
    assert!(
        (tree.height() as f64) <= limit,
        "height {} n {}",
        tree.height(),
        tree.len()
    );
}

// link a node with explicit color, used to build fixtures that insert
// alone can't produce.
fn link(tree: &mut Rbt<u32>, parent: Ref, side: Side, key: u32, color: Color) -> Ref {
    let mut node = Node::new(key, parent);
    node.color = color;
    let r = tree.arena.alloc(node);
    tree.replace_child(parent, side, r);
    tree.n_count += 1;
    r
}

#[test]
fn test_rbt_round_trip() {
    let mut index: Rbt<u32> = Rbt::new("test_rbt_round_trip");
    for key in [1, 2, 4, 5, 7, 8, 11, 14, 15].iter() {
        index.insert(*key).unwrap();
        index.validate().unwrap();
    }
    assert_eq!(keys_of(&index), vec![1, 2, 4, 5, 7, 8, 11, 14, 15]);

    for key in [7, 11, 2].iter() {
        assert_eq!(index.delete(key).unwrap(), *key);
        index.validate().unwrap();
    }
    assert_eq!(keys_of(&index), vec![1, 4, 5, 8, 14, 15]);
    assert_eq!(index.len(), 6);

    // delete a missing key, tree is left untouched.
    let stats = index.validate().unwrap();
    match index.delete(&99) {
        Err(Error::KeyNotFound(_, _)) => (),
        res => panic!("unexpected {:?}", res),
    }
    assert_eq!(keys_of(&index), vec![1, 4, 5, 8, 14, 15]);
    let after = index.validate().unwrap();
    assert_eq!(stats.blacks, after.blacks);
    assert_eq!(stats.height, after.height);
    assert_eq!(index.len(), 6);
}

#[test]
fn test_rbt_single() {
    let mut index: Rbt<u32> = Rbt::new("test_rbt_single");
    assert!(index.root().is_none());
    assert_eq!(index.height(), 0);
    index.validate().unwrap();

    index.insert(42).unwrap();
    let root = index.root().unwrap();
    assert_eq!(*root.key(), 42);
    assert!(root.is_black());
    assert_eq!(index.height(), 1);
    assert_eq!(index.size(), 1);

    assert_eq!(index.delete(&42).unwrap(), 42);
    assert_eq!(index.to_root(), NIL);
    assert!(index.root().is_none());
    assert!(index.is_empty());
    assert_eq!(index.height(), 0);
    assert_eq!(index.as_arena().len(), 0);
    index.validate().unwrap();
}

#[test]
fn test_rbt_random() {
    let seed: u64 = random();
    println!("test_rbt_random seed:{}", seed);
    let mut rng = SmallRng::seed_from_u64(seed);

    let n_keys = 2000;
    let key_max = 1 + rng.gen::<u16>() % 1024;
    println!("test_rbt_random key_max:{}", key_max);

    let mut index: Rbt<u16> = Rbt::new("test_rbt_random");
    let mut model: Vec<u16> = vec![];
    for _ in 0..n_keys {
        let key = rng.gen::<u16>() % key_max;
        index.insert(key).unwrap();
        model.push(key);
        index.validate().unwrap();
    }
    model.sort_unstable();
    assert_eq!(keys_of(&index), model);
    assert_eq!(index.len(), n_keys);
    assert_height_bound(&index);

    let mut dels = model.clone();
    dels.shuffle(&mut rng);
    for key in dels.into_iter() {
        assert_eq!(index.delete(&key).unwrap(), key);
        let off = model.binary_search(&key).unwrap();
        model.remove(off);

        index.validate().unwrap();
        assert_height_bound(&index);
        assert_eq!(index.len(), model.len());
    }
    assert_eq!(keys_of(&index), Vec::<u16>::new());
    assert_eq!(index.to_root(), NIL);
    assert_eq!(index.as_arena().len(), 0);
}

#[test]
fn test_rbt_sequential() {
    let n_keys: u64 = 10_000;

    let mut index: Rbt<u64> = Rbt::new("test_rbt_ascending");
    (0..n_keys).for_each(|key| index.insert(key).unwrap());
    let stats = index.validate().unwrap();
    assert_height_bound(&index);
    assert_eq!(stats.n_count, n_keys as usize);
    assert_eq!(stats.height, index.height());
    assert!(stats.blacks.unwrap() > 0);

    let mut index: Rbt<u64> = Rbt::new("test_rbt_descending");
    (0..n_keys).rev().for_each(|key| index.insert(key).unwrap());
    index.validate().unwrap();
    assert_height_bound(&index);
    assert_eq!(keys_of(&index), (0..n_keys).collect::<Vec<u64>>());

    // delete from the low end, keeps hitting the leftmost path.
    for key in 0..(n_keys / 2) {
        index.delete(&key).unwrap();
    }
    index.validate().unwrap();
    assert_height_bound(&index);
    assert_eq!(index.min(), Some(&(n_keys / 2)));
    assert_eq!(index.max(), Some(&(n_keys - 1)));
}

#[test]
fn test_rbt_duplicates() {
    let mut index: Rbt<u32> = Rbt::new("test_rbt_duplicates");
    for _ in 0..5 {
        index.insert(5).unwrap();
    }
    index.insert(3).unwrap();
    index.insert(7).unwrap();
    index.validate().unwrap();
    assert_eq!(keys_of(&index), vec![3, 5, 5, 5, 5, 5, 7]);

    for n in (0..5).rev() {
        assert_eq!(index.delete(&5).unwrap(), 5);
        index.validate().unwrap();
        assert_eq!(index.iter().filter(|k| **k == 5).count(), n);
    }
    match index.delete(&5) {
        Err(Error::KeyNotFound(_, _)) => (),
        res => panic!("unexpected {:?}", res),
    }
    assert_eq!(keys_of(&index), vec![3, 7]);
}

#[test]
fn test_rbt_unique() {
    let mut config = Config::new("test_rbt_unique");
    config.set_allow_duplicates(false);
    let mut index: Rbt<u32> = Rbt::from_config(config.clone());
    assert_eq!(index.to_config(), config);
    assert_eq!(index.to_name(), "test_rbt_unique");

    for key in [10, 5, 15, 1].iter() {
        index.insert(*key).unwrap();
    }
    let stats = index.validate().unwrap();
    for key in [10, 5, 15, 1].iter() {
        match index.insert(*key) {
            Err(Error::InvalidKey(_, _)) => (),
            res => panic!("unexpected {:?}", res),
        }
    }
    assert_eq!(keys_of(&index), vec![1, 5, 10, 15]);
    let after = index.validate().unwrap();
    assert_eq!(stats.n_count, after.n_count);
    assert_eq!(index.as_arena().to_capacity(), 4);

    // extend skips rejected keys.
    index.extend(vec![5, 6, 7, 6]);
    assert_eq!(keys_of(&index), vec![1, 5, 6, 7, 10, 15]);
    index.validate().unwrap();
}

#[test]
fn test_rbt_search() {
    let seed: u64 = random();
    println!("test_rbt_search seed:{}", seed);
    let mut rng = SmallRng::seed_from_u64(seed);

    let index: Rbt<u32> = (0..1000).map(|_| rng.gen::<u32>() % 500).collect();
    let before = keys_of(&index);

    for key in 0..500_u32 {
        let (a, b) = (index.search(&key), index.search(&key));
        assert_eq!(a, b);
        match a {
            Some(node) => {
                assert_eq!(*node.key(), key);
                assert!(index.contains(&key));
                assert_eq!(index.get(&key).unwrap(), &key);
                assert!(before.binary_search(&key).is_ok());
            }
            None => {
                assert!(!index.contains(&key));
                match index.get(&key) {
                    Err(Error::KeyNotFound(_, _)) => (),
                    res => panic!("unexpected {:?}", res),
                }
                assert!(before.binary_search(&key).is_err());
            }
        }
    }
    assert_eq!(keys_of(&index), before);
    index.validate().unwrap();
}

#[test]
fn test_rbt_borrow() {
    let mut index: Rbt<String> = Rbt::new("test_rbt_borrow");
    for key in ["delta", "alpha", "charlie", "bravo"].iter() {
        index.insert(key.to_string()).unwrap();
    }
    assert_eq!(index.search("charlie").map(|n| n.key().as_str()), Some("charlie"));
    assert!(index.search("echo").is_none());
    assert_eq!(index.delete("alpha").unwrap(), "alpha");
    assert_eq!(index.min().map(|s| s.as_str()), Some("bravo"));
    index.validate().unwrap();
}

#[test]
fn test_rbt_rotate() {
    let mut index: Rbt<u32> = Rbt::new("test_rbt_rotate");
    for key in [20, 10, 30, 25, 35].iter() {
        index.insert(*key).unwrap();
    }
    let root = index.to_root();
    assert_eq!(index.arena[root].key, 20);
    let keys = [10, 20, 25, 30, 35];
    let colors: Vec<Color> = keys.iter().map(|k| index.search(k).unwrap().color()).collect();

    index.rotate(root, Side::Left);
    let top = index.to_root();
    assert_eq!(index.arena[top].key, 30);
    assert_eq!(index.arena.parent(top), NIL);
    assert_eq!(index.arena.child(top, Side::Left), root);
    assert_eq!(index.arena.parent(root), top);
    let inner = index.arena.child(root, Side::Right);
    assert_eq!(index.arena[inner].key, 25);
    assert_eq!(index.arena.parent(inner), root);
    assert_eq!(keys_of(&index), vec![10, 20, 25, 30, 35]);
    // rotation leaves colors alone.
    let after: Vec<Color> = keys.iter().map(|k| index.search(k).unwrap().color()).collect();
    assert_eq!(colors, after);

    index.rotate(top, Side::Right);
    assert_eq!(index.to_root(), root);
    assert_eq!(index.arena.child(root, Side::Right), top);
    assert_eq!(index.arena.child(top, Side::Left), inner);
    assert_eq!(index.arena.parent(inner), top);
    assert_eq!(keys_of(&index), vec![10, 20, 25, 30, 35]);
    index.validate().unwrap();
}

#[test]
#[should_panic]
fn test_rbt_rotate_sentinel() {
    let mut index: Rbt<u32> = Rbt::new("test_rbt_rotate_sentinel");
    index.insert(10).unwrap();
    let root = index.to_root();
    index.rotate(root, Side::Left);
}

#[test]
fn test_rbt_insert_fixup() {
    // (keys, expected root, expected red keys)
    let testcases: Vec<(Vec<u32>, u32, Vec<u32>)> = vec![
        // red uncle, recolor only.
        (vec![10, 5, 15, 1], 10, vec![1]),
        (vec![10, 5, 15, 20], 10, vec![20]),
        // black uncle, inner grandchild.
        (vec![10, 5, 7], 7, vec![5, 10]),
        (vec![10, 15, 12], 12, vec![10, 15]),
        // black uncle, outer grandchild.
        (vec![10, 5, 1], 5, vec![1, 10]),
        (vec![10, 15, 20], 15, vec![10, 20]),
        // recolor climbs up and ends in a rotation at the top.
        (vec![10, 5, 15, 1, 7, 6, 8, 9], 7, vec![5, 10, 9]),
    ];

    for (keys, root, reds) in testcases.into_iter() {
        let mut index: Rbt<u32> = Rbt::new("test_rbt_insert_fixup");
        keys.iter().for_each(|key| index.insert(*key).unwrap());
        index.validate().unwrap();

        assert_eq!(*index.root().unwrap().key(), root, "{:?}", keys);
        let mut got: Vec<u32> = keys
            .iter()
            .filter(|key| index.search(*key).unwrap().is_red())
            .cloned()
            .collect();
        let mut reds = reds;
        got.sort_unstable();
        reds.sort_unstable();
        assert_eq!(got, reds, "{:?}", keys);
    }
}

#[test]
fn test_rbt_delete_fixup() {
    use crate::rbt::Color::{Black, Red};

    // keys are mirrored around 15 for the right side fixtures, so that
    // x always sits on `side`.
    for side in [Side::Left, Side::Right].iter() {
        let side = *side;
        let k = |key: u32| if side == Side::Left { key } else { 30 - key };
        let (near, far) = (side, side.flip());

        // red far nephew.
        let mut index: Rbt<u32> = Rbt::new("red_far_nephew");
        let p = link(&mut index, NIL, side, k(10), Black);
        link(&mut index, p, side, k(5), Black);
        let w = link(&mut index, p, far, k(15), Black);
        link(&mut index, w, far, k(20), Red);
        index.validate().unwrap();
        index.delete(&k(5)).unwrap();
        index.validate().unwrap();
        assert_eq!(*index.root().unwrap().key(), k(15));
        assert_eq!(keys_of(&index).len(), 3);

        // red near nephew, rotates into red far nephew.
        let mut index: Rbt<u32> = Rbt::new("red_near_nephew");
        let p = link(&mut index, NIL, side, k(10), Black);
        link(&mut index, p, side, k(5), Black);
        let w = link(&mut index, p, far, k(15), Black);
        link(&mut index, w, near, k(12), Red);
        index.validate().unwrap();
        index.delete(&k(5)).unwrap();
        index.validate().unwrap();
        assert_eq!(*index.root().unwrap().key(), k(12));

        // black nephews, extra black climbs to root.
        let mut index: Rbt<u32> = Rbt::new("black_nephews");
        let p = link(&mut index, NIL, side, k(10), Black);
        link(&mut index, p, side, k(5), Black);
        link(&mut index, p, far, k(15), Black);
        index.delete(&k(5)).unwrap();
        index.validate().unwrap();
        assert_eq!(*index.root().unwrap().key(), k(10));
        assert!(index.search(&k(15)).unwrap().is_red());

        // red sibling, rotates and then recolors.
        let mut index: Rbt<u32> = Rbt::new("red_sibling");
        let p = link(&mut index, NIL, side, k(10), Black);
        link(&mut index, p, side, k(5), Black);
        let w = link(&mut index, p, far, k(20), Red);
        link(&mut index, w, near, k(15), Black);
        link(&mut index, w, far, k(25), Black);
        index.validate().unwrap();
        index.delete(&k(5)).unwrap();
        index.validate().unwrap();
        assert_eq!(*index.root().unwrap().key(), k(20));
        assert!(index.search(&k(10)).unwrap().is_black());
        assert!(index.search(&k(15)).unwrap().is_red());

        // red node removed, no fixup.
        let mut index: Rbt<u32> = Rbt::new("red_leaf");
        let p = link(&mut index, NIL, side, k(10), Black);
        link(&mut index, p, side, k(5), Red);
        index.delete(&k(5)).unwrap();
        index.validate().unwrap();
        assert_eq!(keys_of(&index), vec![k(10)]);
    }
}

#[test]
fn test_rbt_delete_successor() {
    let mut index: Rbt<u32> = Rbt::new("test_rbt_delete_successor");
    for key in [50, 30, 70, 20, 40, 60, 80, 65].iter() {
        index.insert(*key).unwrap();
    }
    let root = index.to_root();
    assert_eq!(index.arena[root].key, 50);

    // root has two children, successor 60 moves into root's slot.
    assert_eq!(index.delete(&50).unwrap(), 50);
    assert_eq!(index.to_root(), root);
    assert_eq!(index.arena[root].key, 60);
    index.validate().unwrap();
    assert_eq!(keys_of(&index), vec![20, 30, 40, 60, 65, 70, 80]);
}

#[test]
fn test_rbt_validate() {
    let fresh = || {
        let mut index: Rbt<u32> = Rbt::new("test_rbt_validate");
        for key in [10, 5, 15, 1].iter() {
            index.insert(*key).unwrap();
        }
        index.validate().unwrap();
        index
    };
    let is_fatal = |index: &Rbt<u32>| match index.validate() {
        Err(Error::Fatal(_, _)) => true,
        _ => false,
    };

    // red root.
    let mut index = fresh();
    let root = index.to_root();
    index.arena[root].set_red();
    assert!(is_fatal(&index));

    // consecutive reds.
    let mut index = fresh();
    let five = index.search(&5).unwrap().to_ref();
    index.arena[five].set_red();
    assert!(is_fatal(&index));

    // unbalanced blacks.
    let mut index = fresh();
    let one = index.search(&1).unwrap().to_ref();
    index.arena[one].set_black();
    assert!(is_fatal(&index));

    // broken back-link.
    let mut index = fresh();
    let one = index.search(&1).unwrap().to_ref();
    let root = index.to_root();
    index.arena[one].parent = root;
    assert!(is_fatal(&index));

    // sort order.
    let mut index = fresh();
    let one = index.search(&1).unwrap().to_ref();
    index.arena[one].key = 12;
    assert!(is_fatal(&index));

    // count.
    let mut index = fresh();
    index.n_count += 1;
    assert!(is_fatal(&index));
}

#[test]
fn test_rbt_reuse() {
    let mut index: Rbt<u32> = Rbt::new("test_rbt_reuse");
    (0..100).for_each(|key| index.insert(key).unwrap());
    (0..100).for_each(|key| assert_eq!(index.delete(&key).unwrap(), key));
    assert_eq!(index.to_stats().n_free, 100);

    (100..200).for_each(|key| index.insert(key).unwrap());
    assert_eq!(index.as_arena().to_capacity(), 100);
    assert_eq!(index.to_stats().n_free, 0);
    index.validate().unwrap();

    index.clear();
    assert!(index.is_empty());
    assert_eq!(index.as_arena().to_capacity(), 0);
    assert!(index.min().is_none());
    index.insert(1).unwrap();
    assert_eq!(keys_of(&index), vec![1]);
}

#[test]
fn test_rbt_misc() {
    let index: Rbt<u32> = vec![3, 1, 2].into_iter().collect();
    assert_eq!(index.to_name(), crate::config::DEFAULT_NAME);
    assert_eq!(format!("{:?}", index), "rbt:{1, 2, 3}");
    assert_eq!((&index).into_iter().count(), 3);
    assert_eq!(index.in_order().cloned().collect::<Vec<u32>>(), vec![1, 2, 3]);

    let stats = index.to_stats();
    assert_eq!(stats.n_count, 3);
    assert_eq!(stats.height, 2);
    assert!(stats.blacks.is_none());
    assert!(stats.depths.is_none());

    let stats = index.validate().unwrap();
    assert_eq!(stats.blacks, Some(1));
    assert_eq!(stats.depths.as_ref().unwrap().to_samples(), 4);
    assert!(stats.to_string().contains("n_count=3"));
}

#[derive(Clone, Debug, Arbitrary)]
enum Op {
    Insert(u8),
    Delete(u8),
    Search(u8),
    Min,
    Max,
    Validate,
}

#[test]
fn test_rbt_ops() {
    let seed: u64 = random();
    println!("test_rbt_ops seed:{}", seed);
    let mut rng = SmallRng::seed_from_u64(seed);

    for _ in 0..10 {
        let allow = rng.gen::<bool>();
        let mut config = Config::new("test_rbt_ops");
        config.set_allow_duplicates(allow);

        let mut index: Rbt<u8> = Rbt::from_config(config);
        let mut model: BTreeMap<u8, usize> = BTreeMap::new();

        let bytes: Vec<u8> = (0..100_000).map(|_| rng.gen::<u8>()).collect();
        let mut uns = Unstructured::new(&bytes);

        let mut counts = [0_usize; 6];
        while !uns.is_empty() {
            let op: Op = uns.arbitrary().unwrap();
            match op {
                Op::Insert(key) => {
                    counts[0] += 1;
                    let res = index.insert(key);
                    match model.get_mut(&key) {
                        Some(_) if !allow => match res {
                            Err(Error::InvalidKey(_, _)) => (),
                            res => panic!("unexpected {:?}", res),
                        },
                        Some(n) => {
                            res.unwrap();
                            *n += 1;
                        }
                        None => {
                            res.unwrap();
                            model.insert(key, 1);
                        }
                    }
                }
                Op::Delete(key) => {
                    counts[1] += 1;
                    let res = index.delete(&key);
                    match model.get_mut(&key) {
                        Some(n) if *n > 1 => {
                            assert_eq!(res.unwrap(), key);
                            *n -= 1;
                        }
                        Some(_) => {
                            assert_eq!(res.unwrap(), key);
                            model.remove(&key);
                        }
                        None => match res {
                            Err(Error::KeyNotFound(_, _)) => (),
                            res => panic!("unexpected {:?}", res),
                        },
                    }
                }
                Op::Search(key) => {
                    counts[2] += 1;
                    let node = index.search(&key).map(|n| *n.key());
                    assert_eq!(node, model.get(&key).map(|_| key));
                }
                Op::Min => {
                    counts[3] += 1;
                    assert_eq!(index.min(), model.keys().next());
                }
                Op::Max => {
                    counts[4] += 1;
                    assert_eq!(index.max(), model.keys().next_back());
                }
                Op::Validate => {
                    counts[5] += 1;
                    index.validate().unwrap();
                }
            }
            assert_eq!(index.len(), model.values().sum::<usize>());
        }
        println!("test_rbt_ops allow:{} counts:{:?}", allow, counts);

        index.validate().unwrap();
        let expect: Vec<u8> = model
            .iter()
            .flat_map(|(k, n)| std::iter::repeat(*k).take(*n))
            .collect();
        assert_eq!(keys_of(&index), expect);
    }
}
