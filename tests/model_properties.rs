//! Model-based property tests: a random sequence of operations is replayed
//! against both a real on-disk `Queue`/`Stack`/`PriorityQueue` and a trivial
//! in-memory reference model, and the two are checked for agreement after
//! every step.

use std::collections::VecDeque;

use durable_queue::{Item, Order, PriorityQueue, Queue, Stack};
use proptest::prelude::*;
use tempfile::TempDir;

/// `PeekByOffset`/`Update` carry a raw `u64` rather than an offset/id derived
/// from the model: generating it independently, in a range comfortably wider
/// than any one run's enqueue count, means a healthy fraction of generated
/// ops land out of the live range by construction, exercising invariant 10
/// (`OutOfBounds` symmetry) alongside the in-bounds case (invariant 9, update
/// idempotence) in the same randomized sequence rather than only in
/// hand-picked fixed scenarios.
#[derive(Debug, Clone)]
enum Op {
    Enqueue(Vec<u8>),
    Dequeue,
    Peek,
    PeekByOffset(u64),
    Update(u64, Vec<u8>),
    Reopen,
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        any::<u8>().prop_map(|b| Op::Enqueue(vec![b])),
        Just(Op::Dequeue),
        Just(Op::Peek),
        (0u64..20).prop_map(Op::PeekByOffset),
        (0u64..220, any::<u8>()).prop_map(|(id, b)| Op::Update(id, vec![b])),
        Just(Op::Reopen),
    ]
}

proptest! {
    /// A FIFO queue, replayed against a `(id, value)` `VecDeque` as the
    /// reference model, agrees on every dequeue/peek/peek_by_offset/update
    /// after an arbitrary op sequence, including interleaved close/reopen,
    /// which must reconstruct the exact same head/tail state from the
    /// on-disk keys alone.
    #[test]
    fn fifo_matches_vecdeque_model(ops in prop::collection::vec(op_strategy(), 0..200)) {
        let dir = TempDir::new().unwrap();
        let mut q = Queue::open(dir.path()).unwrap();
        let mut model: VecDeque<(u64, Vec<u8>)> = VecDeque::new();
        let mut next_id: u64 = 1;

        for op in ops {
            match op {
                Op::Enqueue(v) => {
                    let item = q.enqueue(&v).unwrap();
                    prop_assert_eq!(item.id, next_id);
                    model.push_back((next_id, v));
                    next_id += 1;
                }
                Op::Dequeue => {
                    let got = q.dequeue();
                    let want = model.pop_front();
                    match want {
                        Some((id, v)) => {
                            let item = got.unwrap();
                            prop_assert_eq!(item.id, id);
                            prop_assert_eq!(item.value, v);
                        }
                        None => prop_assert!(got.is_err()),
                    }
                }
                Op::Peek => {
                    let got = q.peek();
                    match model.front() {
                        Some((id, v)) => {
                            let item = got.unwrap();
                            prop_assert_eq!(item.id, *id);
                            prop_assert_eq!(item.value, v.clone());
                        }
                        None => prop_assert!(got.is_err()),
                    }
                }
                Op::PeekByOffset(n) => {
                    let got = q.peek_by_offset(n);
                    match model.get(n as usize) {
                        Some((id, v)) => {
                            let item = got.unwrap();
                            prop_assert_eq!(item.id, *id);
                            prop_assert_eq!(item.value, v.clone());
                        }
                        None => prop_assert!(matches!(got, Err(durable_queue::Error::OutOfBounds(_)))),
                    }
                }
                Op::Update(id, new_value) => {
                    let pos = model.iter().position(|(existing, _)| *existing == id);
                    let mut item = Item { id, priority: None, value: Vec::new() };
                    let result = q.update(&mut item, &new_value);
                    match pos {
                        Some(idx) => {
                            result.unwrap();
                            prop_assert_eq!(item.value.clone(), new_value.clone());
                            model[idx].1 = new_value.clone();
                            let fetched = q.peek_by_id(id).unwrap();
                            prop_assert_eq!(fetched.value, new_value);
                        }
                        None => prop_assert!(matches!(result, Err(durable_queue::Error::OutOfBounds(_)))),
                    }
                }
                Op::Reopen => {
                    q.close().unwrap();
                    q = Queue::open(dir.path()).unwrap();
                }
            }
            prop_assert_eq!(q.len(), model.len() as u64);
            prop_assert_eq!(q.is_empty(), model.is_empty());
        }
    }

    /// A stack, replayed against a `(id, value)` `Vec` as the reference model
    /// (push/pop at the same end), agrees on every
    /// dequeue/peek/peek_by_offset/update.
    #[test]
    fn stack_matches_vec_model(ops in prop::collection::vec(op_strategy(), 0..200)) {
        let dir = TempDir::new().unwrap();
        let mut st = Stack::open(dir.path()).unwrap();
        let mut model: Vec<(u64, Vec<u8>)> = Vec::new();
        let mut next_id: u64 = 1;

        for op in ops {
            match op {
                Op::Enqueue(v) => {
                    let item = st.enqueue(&v).unwrap();
                    prop_assert_eq!(item.id, next_id);
                    model.push((next_id, v));
                    next_id += 1;
                }
                Op::Dequeue => {
                    let got = st.dequeue();
                    let want = model.pop();
                    match want {
                        Some((id, v)) => {
                            let item = got.unwrap();
                            prop_assert_eq!(item.id, id);
                            prop_assert_eq!(item.value, v);
                        }
                        None => prop_assert!(got.is_err()),
                    }
                }
                Op::Peek => {
                    let got = st.peek();
                    match model.last() {
                        Some((id, v)) => {
                            let item = got.unwrap();
                            prop_assert_eq!(item.id, *id);
                            prop_assert_eq!(item.value, v.clone());
                        }
                        None => prop_assert!(got.is_err()),
                    }
                }
                Op::PeekByOffset(n) => {
                    let got = st.peek_by_offset(n);
                    if (n as usize) < model.len() {
                        let (id, v) = &model[model.len() - 1 - n as usize];
                        let item = got.unwrap();
                        prop_assert_eq!(item.id, *id);
                        prop_assert_eq!(item.value, v.clone());
                    } else {
                        prop_assert!(matches!(got, Err(durable_queue::Error::OutOfBounds(_))));
                    }
                }
                Op::Update(id, new_value) => {
                    let pos = model.iter().position(|(existing, _)| *existing == id);
                    let mut item = Item { id, priority: None, value: Vec::new() };
                    let result = st.update(&mut item, &new_value);
                    match pos {
                        Some(idx) => {
                            result.unwrap();
                            prop_assert_eq!(item.value.clone(), new_value.clone());
                            model[idx].1 = new_value.clone();
                            let fetched = st.peek_by_id(id).unwrap();
                            prop_assert_eq!(fetched.value, new_value);
                        }
                        None => prop_assert!(matches!(result, Err(durable_queue::Error::OutOfBounds(_)))),
                    }
                }
                Op::Reopen => {
                    st.close().unwrap();
                    st = Stack::open(dir.path()).unwrap();
                }
            }
            prop_assert_eq!(st.len(), model.len() as u64);
            prop_assert_eq!(st.is_empty(), model.is_empty());
        }
    }

    /// Every id assigned within one FIFO's lifetime is strictly greater than
    /// every id that came before it, regardless of intervening dequeues.
    #[test]
    fn fifo_ids_are_monotonically_increasing(values in prop::collection::vec(any::<u8>(), 1..100)) {
        let dir = TempDir::new().unwrap();
        let q = Queue::open(dir.path()).unwrap();
        let mut last_id = None;
        for v in values {
            let item = q.enqueue(&[v]).unwrap();
            if let Some(last) = last_id {
                prop_assert!(item.id > last);
            }
            last_id = Some(item.id);
        }
    }

    /// A priority queue under `Order::Asc`, drained to empty, always yields
    /// values in non-decreasing priority order, regardless of enqueue order.
    #[test]
    fn priority_asc_drains_in_nondecreasing_priority_order(
        items in prop::collection::vec((any::<u8>(), any::<u8>()), 0..150)
    ) {
        let dir = TempDir::new().unwrap();
        let pq = PriorityQueue::open(dir.path(), Order::Asc).unwrap();
        for (priority, byte) in &items {
            pq.enqueue(&[*byte], *priority).unwrap();
        }
        let mut last_priority = None;
        while !pq.is_empty() {
            let item = pq.dequeue().unwrap();
            let priority = item.priority.unwrap();
            if let Some(last) = last_priority {
                prop_assert!(priority >= last);
            }
            last_priority = Some(priority);
        }
        prop_assert!(matches!(pq.dequeue(), Err(durable_queue::Error::Empty)));
    }
}
