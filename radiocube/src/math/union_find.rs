//! Disjoint-set forest used by component labeling and clump merging.

#[derive(Debug, Clone)]
pub(crate) struct UnionFind {
    parent: Vec<usize>,
}

impl UnionFind {
    pub fn new(len: usize) -> Self {
        Self {
            parent: (0..len).collect(),
        }
    }

    /// Adds a new singleton set and returns its id.
    pub fn make_set(&mut self) -> usize {
        let id = self.parent.len();
        self.parent.push(id);
        id
    }

    pub fn len(&self) -> usize {
        self.parent.len()
    }

    /// Root of `x`, with path halving.
    pub fn find(&mut self, x: usize) -> usize {
        let mut current = x;
        while current != self.parent[current] {
            self.parent[current] = self.parent[self.parent[current]];
            current = self.parent[current];
        }
        current
    }

    /// Merges the sets of `a` and `b`; the smaller root becomes the parent.
    pub fn union(&mut self, a: usize, b: usize) -> usize {
        let root_a = self.find(a);
        let root_b = self.find(b);
        if root_a == root_b {
            return root_a;
        }
        if root_a < root_b {
            self.parent[root_b] = root_a;
            root_a
        } else {
            self.parent[root_a] = root_b;
            root_b
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_union_keeps_smaller_root() {
        let mut uf = UnionFind::new(5);
        assert_eq!(uf.union(3, 1), 1);
        assert_eq!(uf.union(4, 3), 1);
        assert_eq!(uf.find(4), 1);
        assert_eq!(uf.find(0), 0);
    }

    #[test]
    fn test_make_set_appends() {
        let mut uf = UnionFind::new(0);
        let a = uf.make_set();
        let b = uf.make_set();
        assert_eq!((a, b), (0, 1));
        assert_eq!(uf.len(), 2);
        uf.union(a, b);
        assert_eq!(uf.find(b), 0);
    }
}
