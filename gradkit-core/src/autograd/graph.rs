// src/autograd/graph.rs

use std::collections::HashSet;
use std::sync::RwLock;

use crate::tensor_data::TensorData;

/// Identity of a tensor's storage inside the computation graph.
///
/// Raw pointers give a stable key even as `Tensor` handles are cloned and
/// dropped; the `Arc`s behind them are kept alive for the duration of the
/// traversal by the backward ops that reference them.
pub type NodeId = *const RwLock<TensorData>;

/// Builds a topological order of the graph reachable from `root`:
/// every node appears after all of its inputs, with `root` last.
/// `Tensor::backward` walks the result in reverse so a node is only
/// visited once all of its consumers have contributed their gradient.
pub(crate) fn topological_sort(root: NodeId) -> Vec<NodeId> {
    let mut visited: HashSet<NodeId> = HashSet::new();
    let mut sorted: Vec<NodeId> = Vec::new();
    visit(root, &mut visited, &mut sorted);
    sorted
}

fn visit(node: NodeId, visited: &mut HashSet<NodeId>, sorted: &mut Vec<NodeId>) {
    if !visited.insert(node) {
        return;
    }

    // SAFETY: `node` comes from `Arc::as_ptr` on storage that is alive for
    // the whole traversal (see `NodeId` docs).
    let grad_fn = {
        let guard = unsafe { &*node }.read().expect("RwLock poisoned");
        guard.grad_fn.clone()
    };

    if let Some(op) = grad_fn {
        for input in op.inputs() {
            visit(input, visited, sorted);
        }
    }
    sorted.push(node);
}
