//! Optional debug-only acyclicity validator (spec Section 9, "Cycle
//! detection as a defense-in-depth, not a primary mechanism").
//!
//! Adapted line-for-line from the teacher's iterative `tarjan_scc` in
//! `inplace.rs`, substituting `PositionalNodeId` adjacency (gathered from
//! `GraphProvider::successors`) for the teacher's `Vec<Vec<usize>>`
//! vertex-index adjacency. Gated behind `AssemblerConfig::debug_validate_acyclic`;
//! never run on the default happy path, since it is O(n + E) extra work the
//! traversal itself does not need.

use crate::error::AssemblyError;
use crate::graph::GraphProvider;
use crate::types::PositionalNodeId;

/// Run Tarjan's SCC decomposition over `graph`'s full vertex set; any SCC
/// with more than one member proves a cycle, which is a provider fault
/// (spec Section 7, kind 3) rather than a core-internal invariant failure.
///
/// A size-1 SCC is also a cycle if its sole node has an edge to itself —
/// unlike the teacher's CRWI digraph (`inplace.rs`), where a command never
/// copies from its own destination, a graph-provider fault can hand back a
/// genuine self-loop, and Tarjan's decomposition alone does not surface a
/// singleton SCC as a cycle.
pub fn assert_acyclic<G: GraphProvider>(graph: &G) -> Result<(), AssemblyError> {
    let ids = graph.all_node_ids();
    let n = ids.len();
    let mut adj: Vec<Vec<usize>> = vec![Vec::new(); n];
    let mut self_loop: Vec<bool> = vec![false; n];
    for (idx, &id) in ids.iter().enumerate() {
        for (succ, _, _) in graph.successors(id)? {
            // Successors are always ids already yielded by `next_node`
            // (spec Section 3, DAG invariant); `succ.0 as usize` indexes
            // directly into `ids` since ids are assigned densely in
            // yield order by every `GraphProvider` in this crate.
            let succ_idx = succ.0 as usize;
            if succ_idx == idx {
                self_loop[idx] = true;
            }
            adj[idx].push(succ_idx);
        }
    }

    let sccs = tarjan_scc(&adj, n);
    for scc in &sccs {
        let is_cycle = scc.len() > 1 || (scc.len() == 1 && self_loop[scc[0]]);
        if is_cycle {
            let offender = ids[scc[0]];
            return Err(AssemblyError::ProviderFault {
                detail: format!("cycle detected among {} nodes", scc.len()),
                node: offender,
            });
        }
    }
    Ok(())
}

fn tarjan_scc(adj: &[Vec<usize>], n: usize) -> Vec<Vec<usize>> {
    let mut index_counter = 0usize;
    let mut index = vec![usize::MAX; n];
    let mut lowlink = vec![0usize; n];
    let mut on_stack = vec![false; n];
    let mut tarjan_stack: Vec<usize> = Vec::new();
    let mut sccs: Vec<Vec<usize>> = Vec::new();
    let mut call_stack: Vec<(usize, usize)> = Vec::new();

    for start in 0..n {
        if index[start] != usize::MAX {
            continue;
        }

        index[start] = index_counter;
        lowlink[start] = index_counter;
        index_counter += 1;
        on_stack[start] = true;
        tarjan_stack.push(start);
        call_stack.push((start, 0));

        while let Some(&(v, ni)) = call_stack.last() {
            if ni < adj[v].len() {
                let w = adj[v][ni];
                call_stack.last_mut().unwrap().1 += 1;
                if index[w] == usize::MAX {
                    index[w] = index_counter;
                    lowlink[w] = index_counter;
                    index_counter += 1;
                    on_stack[w] = true;
                    tarjan_stack.push(w);
                    call_stack.push((w, 0));
                } else if on_stack[w] && index[w] < lowlink[v] {
                    lowlink[v] = index[w];
                }
            } else {
                call_stack.pop();
                if let Some(&(parent, _)) = call_stack.last() {
                    if lowlink[v] < lowlink[parent] {
                        lowlink[parent] = lowlink[v];
                    }
                }
                if lowlink[v] == index[v] {
                    let mut scc = Vec::new();
                    loop {
                        let w = tarjan_stack.pop().unwrap();
                        on_stack[w] = false;
                        scc.push(w);
                        if w == v {
                            break;
                        }
                    }
                    sccs.push(scc);
                }
            }
        }
    }
    sccs
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::InMemoryGraph;
    use crate::types::PositionalNode;

    #[test]
    fn linear_dag_is_acyclic() {
        let mut g = InMemoryGraph::new();
        let a = g.add_node(PositionalNode::new(1, 0, 0, 1, 1, false));
        let b = g.add_node(PositionalNode::new(2, 1, 1, 1, 1, false));
        g.add_edge(a, b, 1, 1);
        assert!(assert_acyclic(&g).is_ok());
    }

    #[test]
    fn self_loop_is_a_cycle() {
        let mut g = InMemoryGraph::new();
        let a = g.add_node(PositionalNode::new(1, 0, 0, 1, 1, false));
        g.add_edge(a, a, 0, 0);
        assert!(assert_acyclic(&g).is_err());
    }

    #[test]
    fn two_node_mutual_edges_form_a_cycle() {
        let mut g = InMemoryGraph::new();
        let a = g.add_node(PositionalNode::new(1, 0, 0, 1, 1, false));
        let b = g.add_node(PositionalNode::new(2, 0, 0, 1, 1, false));
        g.add_edge(a, b, 0, 0);
        g.add_edge(b, a, 0, 0);
        assert!(assert_acyclic(&g).is_err());
    }
}
