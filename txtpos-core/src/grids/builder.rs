use super::grid::Grid;
use crate::config::{GridConfig, GridPartition};
use crate::geometry::{Rect, Segment};

/// A classified rule segment: the coordinate it fixes plus its extent.
#[derive(Debug, Clone, Copy)]
enum Rule {
    /// y-close ("vertical" by classification name): fixes a row boundary
    Row { y: f64, bounds: Rect },
    /// x-close ("horizontal" by classification name): fixes a column boundary
    Column { x: f64, bounds: Rect },
}

impl Rule {
    fn classify(segment: &Segment, margin: f64) -> Option<Rule> {
        let y_close = segment.is_vertical(margin);
        let x_close = segment.is_horizontal(margin);
        let bounds = segment.bounds();
        match (y_close, x_close) {
            (true, false) => Some(Rule::Row {
                y: (segment.y1 + segment.y2) / 2.0,
                bounds,
            }),
            (false, true) => Some(Rule::Column {
                x: (segment.x1 + segment.x2) / 2.0,
                bounds,
            }),
            // Both: a dot or a tiny tick. Neither: diagonal.
            _ => None,
        }
    }

    fn bounds(&self) -> Rect {
        match self {
            Rule::Row { bounds, .. } | Rule::Column { bounds, .. } => *bounds,
        }
    }
}

pub struct GridBuilder<'a> {
    config: &'a GridConfig,
}

impl<'a> GridBuilder<'a> {
    pub fn new(config: &'a GridConfig) -> Self {
        Self { config }
    }

    /// Build the grids of one page, ordered top to bottom, then left to right.
    pub fn build(&self, segments: &[Segment]) -> Vec<Grid> {
        let rules: Vec<Rule> = segments
            .iter()
            .filter_map(|s| Rule::classify(s, self.config.segment_margin))
            .collect();

        if rules.is_empty() {
            return Vec::new();
        }

        let groups = match self.config.partition {
            GridPartition::Single => vec![rules],
            GridPartition::Connected => self.connected_groups(rules),
        };

        let snap = self.config.effective_snap_tolerance();
        let mut grids: Vec<Grid> = groups
            .into_iter()
            .filter_map(|group| grid_from_rules(&group, snap))
            .collect();

        grids.sort_by(|a, b| {
            a.bounds
                .top
                .total_cmp(&b.bounds.top)
                .then_with(|| a.bounds.left.total_cmp(&b.bounds.left))
        });

        log::debug!(
            "grid builder: {} segments, {} kept in {} grids",
            segments.len(),
            grids.iter().map(|g| g.segment_count).sum::<usize>(),
            grids.len()
        );
        grids
    }

    /// Connected components of rules whose grown boxes intersect.
    fn connected_groups(&self, rules: Vec<Rule>) -> Vec<Vec<Rule>> {
        let grown: Vec<Rect> = rules
            .iter()
            .map(|r| r.bounds().expand(self.config.join_tolerance / 2.0))
            .collect();

        let mut sets = DisjointSet::new(rules.len());
        for i in 0..rules.len() {
            for j in (i + 1)..rules.len() {
                if grown[i].intersects(&grown[j]) {
                    sets.union(i, j);
                }
            }
        }

        let mut groups: Vec<Vec<Rule>> = Vec::new();
        let mut group_of_root: Vec<Option<usize>> = vec![None; rules.len()];
        for (i, rule) in rules.into_iter().enumerate() {
            let root = sets.find(i);
            match group_of_root[root] {
                Some(g) => groups[g].push(rule),
                None => {
                    group_of_root[root] = Some(groups.len());
                    groups.push(vec![rule]);
                }
            }
        }
        groups
    }
}

/// Turn one group of rules into a grid; `None` when the group spans no area.
fn grid_from_rules(rules: &[Rule], snap: f64) -> Option<Grid> {
    let bounds = rules
        .iter()
        .map(Rule::bounds)
        .reduce(|acc, b| acc.union(&b))?;

    if bounds.width() <= snap || bounds.height() <= snap {
        return None;
    }

    let mut rows = vec![bounds.top, bounds.bottom];
    let mut columns = vec![bounds.left, bounds.right];
    for rule in rules {
        match rule {
            Rule::Row { y, .. } => rows.push(*y),
            Rule::Column { x, .. } => columns.push(*x),
        }
    }

    let rows = snap_boundaries(rows, snap);
    let columns = snap_boundaries(columns, snap);
    if rows.len() < 2 || columns.len() < 2 {
        return None;
    }

    Some(Grid {
        bounds,
        rows,
        columns,
        segment_count: rules.len(),
    })
}

/// Sort and collapse coordinates within `snap` of each other into one boundary.
///
/// A cluster is anchored on its smallest value and never spans more than
/// `snap`, so values further apart than `snap` stay distinct even when
/// intermediate values would chain them. Each cluster becomes its mean, except the outermost clusters, which keep
/// their extreme value so the bands still cover the whole grid.
pub fn snap_boundaries(mut values: Vec<f64>, snap: f64) -> Vec<f64> {
    values.retain(|v| v.is_finite());
    values.sort_by(f64::total_cmp);

    let mut clusters: Vec<Vec<f64>> = Vec::new();
    for v in values {
        match clusters.last_mut() {
            Some(cluster) if v - cluster[0] <= snap => cluster.push(v),
            _ => clusters.push(vec![v]),
        }
    }

    let last = clusters.len().saturating_sub(1);
    clusters
        .iter()
        .enumerate()
        .map(|(i, cluster)| {
            if i == 0 {
                cluster[0]
            } else if i == last {
                cluster[cluster.len() - 1]
            } else {
                cluster.iter().sum::<f64>() / cluster.len() as f64
            }
        })
        .collect()
}

struct DisjointSet {
    parent: Vec<usize>,
}

impl DisjointSet {
    fn new(size: usize) -> Self {
        Self {
            parent: (0..size).collect(),
        }
    }

    fn find(&mut self, mut i: usize) -> usize {
        while self.parent[i] != i {
            self.parent[i] = self.parent[self.parent[i]];
            i = self.parent[i];
        }
        i
    }

    fn union(&mut self, a: usize, b: usize) {
        let (ra, rb) = (self.find(a), self.find(b));
        if ra != rb {
            self.parent[rb] = ra;
        }
    }
}
