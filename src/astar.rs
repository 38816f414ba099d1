/// This module implements a resumable variant of
/// [pathfinding's astar function](https://docs.rs/pathfinding/latest/pathfinding/directed/astar/index.html)
/// which hands out one event per step instead of running to completion, so that searches can be
/// animated, inspected or cancelled between steps.
use fxhash::{FxBuildHasher, FxHashSet};
use indexmap::map::Entry::{Occupied, Vacant};
use indexmap::IndexMap;
use num_traits::Zero;

type FxIndexMap<K, V> = IndexMap<K, V, FxBuildHasher>;

use std::cmp::Ordering;
use std::collections::{BinaryHeap, VecDeque};

use std::hash::Hash;

/// The graph a [SegmentSearch] runs on.
pub trait SearchSpace {
    type Node: Eq + Hash + Clone;
    type Cost: Zero + Ord + Copy;
    type Successors: IntoIterator<Item = (Self::Node, Self::Cost)>;

    /// Successors of `node` with the cost of moving onto them.
    fn successors(&self, node: &Self::Node) -> Self::Successors;
    /// Estimated remaining cost from `node` to `goal`.
    fn heuristic(&self, node: &Self::Node, goal: &Self::Node) -> Self::Cost;
}

struct SmallestCostHolder<K> {
    estimated_cost: K,
    heuristic: K,
    sequence: usize,
    index: usize,
}

impl<K: Ord> Eq for SmallestCostHolder<K> {}

impl<K: Ord> PartialEq for SmallestCostHolder<K> {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl<K: Ord> PartialOrd for SmallestCostHolder<K> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<K: Ord> Ord for SmallestCostHolder<K> {
    fn cmp(&self, other: &Self) -> Ordering {
        // Smallest estimated cost first, ties go to the entry closest to the goal and then to
        // the entry pushed first. The max-heap needs the reversed comparisons.
        other
            .estimated_cost
            .cmp(&self.estimated_cost)
            .then_with(|| other.heuristic.cmp(&self.heuristic))
            .then_with(|| other.sequence.cmp(&self.sequence))
    }
}

/// One step of a [SegmentSearch].
#[derive(Clone, Debug, PartialEq)]
pub enum SearchEvent<N, C> {
    /// The node was popped and its successors relaxed; it is now closed.
    Expanded(N),
    /// A successor received a better cost and was pushed onto the open set.
    Opened { node: N, cost: C, estimated_cost: C },
    /// The goal was popped. Holds the path from the segment start to the goal, excluding the
    /// start itself.
    Reached(Vec<N>),
    /// The open set ran empty before the goal was popped.
    Exhausted,
}

/// Single-goal A* search state, scoped to one segment. Costs of nodes that were never reached
/// are implicitly infinite.
///
/// The open set may hold several entries for the same node when its cost improved after it was
/// first pushed. These stale entries are not removed eagerly; they are discarded when popped
/// because the node is already closed. Removing them eagerly could change which of two exactly
/// tied entries is expanded first and with it the returned path.
pub struct SegmentSearch<N, C> {
    goal: N,
    to_see: BinaryHeap<SmallestCostHolder<C>>,
    parents: FxIndexMap<N, (usize, C)>,
    closed: FxHashSet<usize>,
    pending: VecDeque<SearchEvent<N, C>>,
    sequence: usize,
    finished: bool,
}

impl<N, C> SegmentSearch<N, C>
where
    N: Eq + Hash + Clone,
    C: Zero + Ord + Copy,
{
    pub fn new<S>(space: &S, start: N, goal: N) -> SegmentSearch<N, C>
    where
        S: SearchSpace<Node = N, Cost = C>,
    {
        let h = space.heuristic(&start, &goal);
        let mut parents: FxIndexMap<N, (usize, C)> = FxIndexMap::default();
        parents.insert(start, (usize::MAX, Zero::zero()));
        let mut search = SegmentSearch {
            goal,
            to_see: BinaryHeap::new(),
            parents,
            closed: FxHashSet::default(),
            pending: VecDeque::new(),
            sequence: 0,
            finished: false,
        };
        search.push(h, h, 0);
        search
    }

    fn push(&mut self, estimated_cost: C, heuristic: C, index: usize) {
        self.to_see.push(SmallestCostHolder {
            estimated_cost,
            heuristic,
            sequence: self.sequence,
            index,
        });
        self.sequence += 1;
    }

    pub fn goal(&self) -> &N {
        &self.goal
    }
    pub fn is_finished(&self) -> bool {
        self.finished
    }
    /// True when the next [step](Self::step) pops from the open set rather than handing out a
    /// buffered event.
    pub fn will_pop(&self) -> bool {
        !self.finished && self.pending.is_empty()
    }
    /// Number of open set entries, stale duplicates included.
    pub fn open_len(&self) -> usize {
        self.to_see.len()
    }
    pub fn closed_len(&self) -> usize {
        self.closed.len()
    }
    /// Best known cost from the segment start to `node`, if it has been reached.
    pub fn cost(&self, node: &N) -> Option<C> {
        self.parents.get(node).map(|&(_, c)| c)
    }

    /// Advances the search by one event. Returns [None] once [Reached](SearchEvent::Reached) or
    /// [Exhausted](SearchEvent::Exhausted) has been handed out.
    pub fn step<S>(&mut self, space: &S) -> Option<SearchEvent<N, C>>
    where
        S: SearchSpace<Node = N, Cost = C>,
    {
        if let Some(event) = self.pending.pop_front() {
            return Some(event);
        }
        if self.finished {
            return None;
        }
        while let Some(SmallestCostHolder { index, .. }) = self.to_see.pop() {
            if self.closed.contains(&index) {
                continue;
            }
            let Some((node, &(_, cost))) = self.parents.get_index(index) else {
                continue;
            };
            if *node == self.goal {
                self.finished = true;
                return Some(SearchEvent::Reached(self.reverse_path(index)));
            }
            let node = node.clone();
            for (successor, move_cost) in space.successors(&node) {
                let new_cost = cost + move_cost;
                let h; // heuristic(&successor)
                let n; // index for successor
                let opened;
                match self.parents.entry(successor) {
                    Vacant(e) => {
                        h = space.heuristic(e.key(), &self.goal);
                        n = e.index();
                        opened = e.key().clone();
                        e.insert((index, new_cost));
                    }
                    Occupied(mut e) => {
                        if new_cost < e.get().1 {
                            h = space.heuristic(e.key(), &self.goal);
                            n = e.index();
                            opened = e.key().clone();
                            e.insert((index, new_cost));
                        } else {
                            continue;
                        }
                    }
                }
                self.push(new_cost + h, h, n);
                self.pending.push_back(SearchEvent::Opened {
                    node: opened,
                    cost: new_cost,
                    estimated_cost: new_cost + h,
                });
            }
            self.closed.insert(index);
            return Some(SearchEvent::Expanded(node));
        }
        self.finished = true;
        Some(SearchEvent::Exhausted)
    }

    fn reverse_path(&self, index: usize) -> Vec<N> {
        let mut path: Vec<N> = std::iter::successors(Some(index), |&i| {
            self.parents.get_index(i).map(|(_, &(parent, _))| parent)
        })
        .map_while(|i| self.parents.get_index(i))
        .filter(|(_, entry)| entry.0 != usize::MAX)
        .map(|(node, _)| node.clone())
        .collect();
        path.reverse();
        path
    }
}

/// Iterator over the events of a single segment search.
pub struct SearchEvents<'s, S: SearchSpace> {
    space: &'s S,
    search: SegmentSearch<S::Node, S::Cost>,
}

impl<'s, S: SearchSpace> SearchEvents<'s, S> {
    pub fn new(space: &'s S, start: S::Node, goal: S::Node) -> SearchEvents<'s, S> {
        SearchEvents {
            space,
            search: SegmentSearch::new(space, start, goal),
        }
    }
    pub fn search(&self) -> &SegmentSearch<S::Node, S::Cost> {
        &self.search
    }
}

impl<'s, S: SearchSpace> Iterator for SearchEvents<'s, S> {
    type Item = SearchEvent<S::Node, S::Cost>;

    fn next(&mut self) -> Option<Self::Item> {
        self.search.step(self.space)
    }
}

/// Runs a segment search to completion, returning the path (without `start`) and its cost.
pub fn astar<S: SearchSpace>(space: &S, start: S::Node, goal: S::Node) -> Option<(Vec<S::Node>, S::Cost)> {
    let mut events = SearchEvents::new(space, start, goal.clone());
    let path = events.find_map(|event| match event {
        SearchEvent::Reached(path) => Some(path),
        _ => None,
    })?;
    let cost = events.search().cost(&goal)?;
    Some((path, cost))
}
