/// Disjoint sets over `0..n` with path halving and union by size.
#[derive(Debug, Clone)]
pub struct UnionFind {
    parent: Vec<usize>,
    size: Vec<usize>,
}

impl UnionFind {
    pub fn new(n: usize) -> Self {
        Self {
            parent: (0..n).collect(),
            size: vec![1; n],
        }
    }

    pub fn find(&mut self, mut x: usize) -> usize {
        while self.parent[x] != x {
            self.parent[x] = self.parent[self.parent[x]];
            x = self.parent[x];
        }
        x
    }

    pub fn union(&mut self, a: usize, b: usize) {
        let (mut ra, mut rb) = (self.find(a), self.find(b));
        if ra == rb {
            return;
        }
        if self.size[ra] < self.size[rb] {
            std::mem::swap(&mut ra, &mut rb);
        }
        self.parent[rb] = ra;
        self.size[ra] += self.size[rb];
    }

    /// Groups the given members by their root.
    ///
    /// Members keep their relative order inside each group, groups are
    /// ordered by their first member.
    pub fn groups(&mut self, members: impl IntoIterator<Item = usize>) -> Vec<Vec<usize>> {
        let mut root_to_group: Vec<Option<usize>> = vec![None; self.parent.len()];
        let mut groups: Vec<Vec<usize>> = Vec::new();
        for m in members {
            let root = self.find(m);
            match root_to_group[root] {
                Some(g) => groups[g].push(m),
                None => {
                    root_to_group[root] = Some(groups.len());
                    groups.push(vec![m]);
                }
            }
        }
        groups
    }
}
