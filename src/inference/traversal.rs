//! Generic depth-first forest traversal with paired pre/post visitors.
//!
//! The driver walks any rooted forest, invoking a pre-visitor on descent
//! and a post-visitor on ascent. Each node owns a user datum for the
//! duration of its subtree; the parent's datum is lent to both visitors as
//! a mutable borrow, valid only for the visitor call.

/// One in-flight node of the traversal.
struct Frame<'a, N, D> {
    node: &'a N,
    data: D,
    next_child: usize,
}

/// Walks a forest depth-first, calling `pre_visit` on descent and
/// `post_visit` on ascent.
///
/// For each root, and recursively for each child in left-to-right order:
///
/// - `pre_visit(node, parent_data)` runs before any descendant is
///   touched and produces the datum passed to the node's children;
/// - `post_visit(node, data, parent_data)` runs after every descendant
///   has completed, consuming the node's datum.
///
/// `root_data` stands in as the parent datum for every root. The driver
/// itself never fails; the first visitor error aborts the traversal and
/// is returned unmodified. An explicit stack is used, so arbitrarily deep
/// trees (long chains) traverse without recursion limits.
pub fn depth_first_forest<'a, N, D, E>(
    roots: &'a [N],
    root_data: &mut D,
    children: impl Fn(&'a N) -> &'a [N],
    mut pre_visit: impl FnMut(&'a N, &mut D) -> Result<D, E>,
    mut post_visit: impl FnMut(&'a N, D, &mut D) -> Result<(), E>,
) -> Result<(), E> {
    let mut stack: Vec<Frame<'a, N, D>> = Vec::new();
    for root in roots {
        let data = pre_visit(root, root_data)?;
        stack.push(Frame {
            node: root,
            data,
            next_child: 0,
        });

        while let Some(top) = stack.last_mut() {
            let node = top.node;
            let next = top.next_child;
            let kids = children(node);
            if let Some(child) = kids.get(next) {
                top.next_child += 1;
                let child_data = pre_visit(child, &mut top.data)?;
                stack.push(Frame {
                    node: child,
                    data: child_data,
                    next_child: 0,
                });
            } else {
                let Some(finished) = stack.pop() else { break };
                match stack.last_mut() {
                    Some(parent) => post_visit(finished.node, finished.data, &mut parent.data)?,
                    None => post_visit(finished.node, finished.data, root_data)?,
                }
            }
        }
    }
    Ok(())
}
