pub mod graph;
pub mod transition;

pub use self::graph::DependencyGraph;

/// Projectivizes a dependency tree by lifting the deepest non-projective arc
/// to its grandparent until no crossing arc remains.
///
/// `heads[0]` belongs to the root and is left untouched.
///
/// References:
/// - https://github.com/tensorflow/models/blob/7d30a017fe50b648be6dee544f8059bde52db562/syntaxnet/syntaxnet/document_filters.cc#L296
pub fn projectivize(heads: &[Option<usize>]) -> Vec<Option<usize>> {
    let mut heads = heads.to_vec();
    let num_tokens = heads.len();
    let mut left = vec![0; num_tokens];
    let mut right = vec![0; num_tokens];
    loop {
        // left[j]/right[j]: the tightest arc endpoints strictly covering j.
        for i in 0..num_tokens {
            left[i] = 0;
            right[i] = num_tokens;
        }
        for (i, head) in heads.iter().enumerate() {
            if let Some(head) = *head {
                let l = i.min(head);
                let r = i.max(head);
                for j in (l + 1)..r {
                    left[j] = left[j].max(l);
                    right[j] = right[j].min(r);
                }
            }
        }

        let mut deepest_arc = None;
        let mut max_depth = 0;
        for (i, head) in heads.iter().enumerate() {
            let head = match *head {
                Some(0) | None => continue,
                Some(head) => head,
            };
            let l = i.min(head);
            let r = i.max(head);
            let left_bound = left[l].max(left[r]);
            let right_bound = right[l].min(right[r]);
            if l < left_bound || r > right_bound {
                let mut depth = 0;
                let mut j = i;
                while let Some(h) = heads[j] {
                    depth += 1;
                    j = h;
                }
                if depth > max_depth {
                    deepest_arc = Some(i);
                    max_depth = depth;
                }
            }
        }

        match deepest_arc {
            Some(d) => {
                let lifted = heads[d].and_then(|h| heads[h]);
                heads[d] = lifted;
            }
            None => return heads,
        }
    }
}

/// True when no two arcs of the head vector cross and no arc covers the
/// root attachment.
pub fn is_projective(heads: &[Option<usize>]) -> bool {
    for (d, head) in heads.iter().enumerate() {
        let h = match *head {
            Some(h) => h,
            None => continue,
        };
        let (l, r) = (d.min(h), d.max(h));
        for k in (l + 1)..r {
            // every vertex under the arc must be dominated by h
            let mut v = k;
            let mut steps = 0;
            while v != h {
                match heads[v] {
                    Some(p) if steps <= heads.len() => {
                        v = p;
                        steps += 1;
                    }
                    _ => return false,
                }
            }
        }
    }
    true
}
