//! Activation ordering for providers.
//!
//! The registry asks an [`OrderingResolver`] for a permutation of its providers
//! such that every provider comes after the providers supplying the services it
//! requires. [`DependencySorter`] is the default resolver: it builds a
//! dependency graph and orders it with Kahn's algorithm, always picking the
//! lowest input position among the ready nodes so unrelated providers keep
//! their registration order.

use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap};

use petgraph::Direction;
use petgraph::algo::tarjan_scc;
use petgraph::graph::{DiGraph, NodeIndex};
use thiserror::Error;
use tracing::trace;

use crate::provider::ProviderId;

/// What the resolver sees of a provider.
#[derive(Debug, Clone, Copy)]
pub struct SortNode<'a> {
  pub id: &'a ProviderId,
  pub provides: &'a [String],
  pub requires: &'a [String],
}

/// Errors that prevent a consistent activation order.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SortError {
  /// Providers depend on each other in a cycle.
  #[error("dependency cycle between {}", join_ids(.members))]
  Cycle { members: Vec<ProviderId> },

  /// A required service is not supplied by any provider.
  #[error("provider {provider} requires {service}, which no provider supplies")]
  Unsatisfied { provider: ProviderId, service: String },

  /// A resolver returned something that is not a permutation of its input.
  #[error("resolver returned an invalid ordering: {0}")]
  InvalidOrdering(String),
}

fn join_ids(ids: &[ProviderId]) -> String {
  ids.iter().map(ProviderId::as_str).collect::<Vec<_>>().join(", ")
}

/// Computes a dependency-consistent activation order.
pub trait OrderingResolver {
  /// Return the positions of `nodes` in activation order.
  fn order(&self, nodes: &[SortNode<'_>]) -> Result<Vec<usize>, SortError>;
}

/// Default resolver ordering providers by declared service requirements.
#[derive(Debug, Default, Clone, Copy)]
pub struct DependencySorter;

impl DependencySorter {
  pub fn new() -> Self {
    Self
  }

  /// Build the dependency graph: one node per input position, with an edge from
  /// every supplier of a service to every provider requiring it.
  fn graph(nodes: &[SortNode<'_>]) -> Result<DiGraph<usize, ()>, SortError> {
    let mut graph = DiGraph::with_capacity(nodes.len(), 0);
    let indices: Vec<NodeIndex> = (0..nodes.len()).map(|pos| graph.add_node(pos)).collect();

    let mut suppliers: HashMap<&str, Vec<usize>> = HashMap::new();
    for (pos, node) in nodes.iter().enumerate() {
      for service in node.provides {
        suppliers.entry(service.as_str()).or_default().push(pos);
      }
    }

    for (pos, node) in nodes.iter().enumerate() {
      for service in node.requires {
        let Some(supplying) = suppliers.get(service.as_str()) else {
          return Err(SortError::Unsatisfied {
            provider: node.id.clone(),
            service: service.clone(),
          });
        };

        // A provider requiring what it supplies itself imposes no order.
        for &supplier in supplying.iter().filter(|&&supplier| supplier != pos) {
          graph.update_edge(indices[supplier], indices[pos], ());
        }
      }
    }

    Ok(graph)
  }

  /// Providers taking part in a cycle, in input order.
  fn cycle_members(graph: &DiGraph<usize, ()>, nodes: &[SortNode<'_>]) -> Vec<ProviderId> {
    let mut positions: Vec<usize> = tarjan_scc(graph)
      .into_iter()
      .filter(|component| component.len() > 1)
      .flatten()
      .map(|idx| graph[idx])
      .collect();
    positions.sort_unstable();
    positions.into_iter().map(|pos| nodes[pos].id.clone()).collect()
  }
}

impl OrderingResolver for DependencySorter {
  fn order(&self, nodes: &[SortNode<'_>]) -> Result<Vec<usize>, SortError> {
    let graph = Self::graph(nodes)?;

    let mut in_degree: Vec<usize> = graph
      .node_indices()
      .map(|idx| graph.neighbors_directed(idx, Direction::Incoming).count())
      .collect();

    // Min-heap on input position keeps the order stable.
    let mut ready: BinaryHeap<Reverse<usize>> = in_degree
      .iter()
      .enumerate()
      .filter(|(_, degree)| **degree == 0)
      .map(|(pos, _)| Reverse(pos))
      .collect();

    let mut order = Vec::with_capacity(nodes.len());
    while let Some(Reverse(pos)) = ready.pop() {
      trace!(provider = %nodes[pos].id, position = order.len(), "ordered provider");
      order.push(pos);

      for dependent in graph.neighbors_directed(NodeIndex::new(pos), Direction::Outgoing) {
        let degree = &mut in_degree[dependent.index()];
        *degree = degree.saturating_sub(1);
        if *degree == 0 {
          ready.push(Reverse(dependent.index()));
        }
      }
    }

    if order.len() < nodes.len() {
      return Err(SortError::Cycle {
        members: Self::cycle_members(&graph, nodes),
      });
    }

    Ok(order)
  }
}

/// Check that `order` is a permutation of `0..len`.
pub(crate) fn validate_permutation(order: &[usize], len: usize) -> Result<(), SortError> {
  if order.len() != len {
    return Err(SortError::InvalidOrdering(format!(
      "expected {} positions, got {}",
      len,
      order.len()
    )));
  }

  let mut seen = vec![false; len];
  for &pos in order {
    match seen.get_mut(pos) {
      Some(slot) if !*slot => *slot = true,
      Some(_) => return Err(SortError::InvalidOrdering(format!("position {} appears twice", pos))),
      None => return Err(SortError::InvalidOrdering(format!("position {} out of bounds", pos))),
    }
  }

  Ok(())
}
