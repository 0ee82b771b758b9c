//! # Position Mapping
//!
//! Every step reports how it moved positions. Positions held outside the
//! document (selections, tracked placeholders) are carried through a
//! transaction by mapping them over its steps in order.

/// Which side a position sticks to when content is inserted exactly at it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Assoc {
    Before,
    After,
}

/// Outcome of mapping a single position
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MapResult {
    pub pos: usize,
    /// The content directly after the original position was removed
    pub deleted: bool,
}

/// Position changes made by one step
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StepMap {
    /// (start, old size, new size); `None` for steps that keep positions
    range: Option<(usize, usize, usize)>,
}

impl StepMap {
    pub fn identity() -> Self {
        Self { range: None }
    }

    pub fn replace(start: usize, old_size: usize, new_size: usize) -> Self {
        if old_size == 0 && new_size == 0 {
            return Self::identity();
        }
        Self {
            range: Some((start, old_size, new_size)),
        }
    }

    pub fn map(&self, pos: usize, assoc: Assoc) -> usize {
        self.map_result(pos, assoc).pos
    }

    pub fn map_result(&self, pos: usize, assoc: Assoc) -> MapResult {
        let Some((start, old_size, new_size)) = self.range else {
            return MapResult { pos, deleted: false };
        };
        let end = start + old_size;

        if pos < start {
            return MapResult { pos, deleted: false };
        }
        if pos > end {
            return MapResult {
                pos: pos - old_size + new_size,
                deleted: false,
            };
        }

        let after = if old_size == 0 {
            assoc == Assoc::After
        } else if pos == start {
            false
        } else if pos == end {
            true
        } else {
            assoc == Assoc::After
        };

        MapResult {
            pos: if after { start + new_size } else { start },
            deleted: old_size > 0 && pos < end,
        }
    }
}

/// Sequence of step maps
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Mapping {
    maps: Vec<StepMap>,
}

impl Mapping {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, map: StepMap) {
        self.maps.push(map);
    }

    /// Add every map of `other` after the existing ones
    pub fn append(&mut self, other: &Mapping) {
        self.maps.extend_from_slice(&other.maps);
    }

    pub fn maps(&self) -> &[StepMap] {
        &self.maps
    }

    pub fn map(&self, pos: usize, assoc: Assoc) -> usize {
        self.maps.iter().fold(pos, |pos, map| map.map(pos, assoc))
    }

    pub fn map_result(&self, pos: usize, assoc: Assoc) -> MapResult {
        let mut deleted = false;
        let mut pos = pos;
        for map in &self.maps {
            let result = map.map_result(pos, assoc);
            deleted |= result.deleted;
            pos = result.pos;
        }
        MapResult { pos, deleted }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insertion_respects_assoc() {
        let map = StepMap::replace(5, 0, 3);
        assert_eq!(map.map(5, Assoc::Before), 5);
        assert_eq!(map.map(5, Assoc::After), 8);
        assert_eq!(map.map(4, Assoc::After), 4);
        assert_eq!(map.map(9, Assoc::Before), 12);
    }

    #[test]
    fn test_deletion_marks_covered_positions() {
        let map = StepMap::replace(2, 4, 0);
        let inside = map.map_result(3, Assoc::After);
        assert_eq!(inside, MapResult { pos: 2, deleted: true });

        let at_start = map.map_result(2, Assoc::After);
        assert!(at_start.deleted);
        assert_eq!(at_start.pos, 2);

        let at_end = map.map_result(6, Assoc::After);
        assert_eq!(at_end, MapResult { pos: 2, deleted: false });
    }

    #[test]
    fn test_mapping_composes() {
        let mut mapping = Mapping::new();
        mapping.push(StepMap::replace(0, 0, 2));
        mapping.push(StepMap::replace(10, 1, 0));
        assert_eq!(mapping.map(4, Assoc::After), 6);
        assert_eq!(mapping.map(12, Assoc::After), 13);
        assert!(!mapping.map_result(7, Assoc::After).deleted);
        assert!(mapping.map_result(8, Assoc::After).deleted);
    }

    #[test]
    fn test_append_keeps_order() {
        let mut first = Mapping::new();
        first.push(StepMap::replace(0, 0, 2));
        let mut second = Mapping::new();
        second.push(StepMap::replace(0, 1, 0));

        first.append(&second);
        assert_eq!(first.maps().len(), 2);
        assert_eq!(first.map(5, Assoc::After), 6);
    }
}
