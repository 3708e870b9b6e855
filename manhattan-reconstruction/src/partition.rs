use log::*;
use manhattan_core::{LineIndex, RegionIndex, Scene};
use petgraph::unionfind::UnionFind;
use std::{collections::HashMap, hash::Hash};

#[cfg(feature = "serde-serialize")]
use serde::{Deserialize, Serialize};

/// A partition of indices into disjoint connected components.
///
/// Component ids are dense and assigned in the order the first member of each component
/// was enumerated, so the same input always produces the same ids.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct Components<I: Eq + Hash> {
    ids: HashMap<I, usize>,
    members: Vec<Vec<I>>,
}

impl<I> Components<I>
where
    I: Eq + Hash + Copy,
{
    /// The component the index belongs to.
    pub fn id(&self, index: I) -> Option<usize> {
        self.ids.get(&index).copied()
    }

    /// The number of components.
    pub fn count(&self) -> usize {
        self.members.len()
    }

    /// The members of a component in enumeration order.
    pub fn members(&self, id: usize) -> &[I] {
        self.members.get(id).map_or(&[], Vec::as_slice)
    }

    /// The number of partitioned indices.
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Iterates over every component id and its members.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &[I])> + '_ {
        self.members
            .iter()
            .enumerate()
            .map(|(id, members)| (id, members.as_slice()))
    }
}

/// Partitions `indices` into connected components using a single union-find pass.
///
/// Runs in time linear in the number of indices and neighbors. `neighbors` is queried once per index. Neighbors which are not among `indices` are ignored,
/// and repeated indices are only partitioned once.
///
/// ```
/// use manhattan_reconstruction::connected_components;
///
/// let components = connected_components(0..5, |i| if i == 1 { vec![3] } else { vec![] });
/// assert_eq!(components.count(), 4);
/// assert_eq!(components.id(3), Some(1));
/// assert_eq!(components.members(1), &[1, 3]);
/// ```
pub fn connected_components<I, N>(
    indices: impl IntoIterator<Item = I>,
    mut neighbors: impl FnMut(I) -> N,
) -> Components<I>
where
    I: Eq + Hash + Copy,
    N: IntoIterator<Item = I>,
{
    let mut positions: HashMap<I, usize> = HashMap::new();
    let mut ordered = vec![];
    for index in indices {
        if !positions.contains_key(&index) {
            positions.insert(index, ordered.len());
            ordered.push(index);
        }
    }

    let mut union_find = UnionFind::<usize>::new(ordered.len());
    for (position, &index) in ordered.iter().enumerate() {
        for neighbor in neighbors(index) {
            if let Some(&other) = positions.get(&neighbor) {
                union_find.union(position, other);
            }
        }
    }

    let mut root_ids: HashMap<usize, usize> = HashMap::new();
    let mut members: Vec<Vec<I>> = vec![];
    let mut ids = HashMap::with_capacity(ordered.len());
    for (position, &index) in ordered.iter().enumerate() {
        let root = union_find.find_mut(position);
        let id = *root_ids.entry(root).or_insert_with(|| {
            members.push(vec![]);
            members.len() - 1
        });
        members[id].push(index);
        ids.insert(index, id);
    }

    Components { ids, members }
}

/// Groups the regions of a scene which overlap by at least `threshold`.
pub fn region_components<C>(scene: &Scene<C>, threshold: f64) -> Components<RegionIndex> {
    let mut adjacency: HashMap<RegionIndex, Vec<RegionIndex>> = HashMap::new();
    for overlap in &scene.region_overlaps {
        if overlap.ratio < threshold {
            continue;
        }
        let [a, b] = overlap.regions;
        adjacency.entry(a).or_default().push(b);
        adjacency.entry(b).or_default().push(a);
    }
    let adjacency = &adjacency;
    let components = connected_components(scene.region_indices(), move |region| {
        adjacency.get(&region).into_iter().flatten().copied()
    });
    info!(
        "partitioned {} regions into {} region components",
        components.len(),
        components.count()
    );
    components
}

/// Groups the lines of a scene which are related within a view or incident across views.
///
/// Relations within a view are only used when their junction weight reaches `minimum_junction_weight`.
/// Incidences between lines of different classes are ignored.
pub fn line_components<C>(scene: &Scene<C>, minimum_junction_weight: f64) -> Components<LineIndex> {
    let mut adjacency: HashMap<LineIndex, Vec<LineIndex>> = HashMap::new();
    let mut connect = |a: LineIndex, b: LineIndex| {
        adjacency.entry(a).or_default().push(b);
        adjacency.entry(b).or_default().push(a);
    };

    for (view_id, view) in scene.views.iter().enumerate() {
        for relation in &view.line_relations {
            if relation.junction_weight < minimum_junction_weight {
                trace!(
                    "ignoring line relation {:?} in view {} with junction weight {}",
                    relation.lines,
                    view_id,
                    relation.junction_weight
                );
                continue;
            }
            let [a, b] = relation.lines;
            connect(LineIndex::new(view_id, a), LineIndex::new(view_id, b));
        }
    }

    for incidence in &scene.inter_view_line_incidences {
        let [a, b] = incidence.lines;
        match (scene.line(a), scene.line(b)) {
            (Some(line_a), Some(line_b)) if line_a.class == line_b.class => connect(a, b),
            (Some(line_a), Some(line_b)) => warn!(
                "ignoring incidence between {} of class {} and {} of class {}",
                a, line_a.class, b, line_b.class
            ),
            _ => warn!("ignoring incidence between unknown lines {} and {}", a, b),
        }
    }

    let adjacency = &adjacency;
    let components = connected_components(scene.line_indices(), move |line| {
        adjacency.get(&line).into_iter().flatten().copied()
    });
    info!(
        "partitioned {} lines into {} line components",
        components.len(),
        components.count()
    );
    components
}
