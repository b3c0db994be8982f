use crate::grid::CellId;
use crate::render::MeshHandle;

/// Collision class of a registered object.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum ObjectType {
    Food,
    Solid,
    Land,
}

/// What a registry entry stands for.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum ObjectKind {
    Food { cell: CellId },
    /// Arena index `segment` of snake number `snake`.
    Segment { snake: usize, segment: usize },
    Wall { cell: CellId },
    Land { cell: CellId },
}

impl ObjectKind {
    #[must_use]
    pub fn object_type(self) -> ObjectType {
        match self {
            Self::Food { .. } => ObjectType::Food,
            Self::Segment { .. } | Self::Wall { .. } => ObjectType::Solid,
            Self::Land { .. } => ObjectType::Land,
        }
    }
}

/// One drawable game entity.
///
/// `mesh` is `None` when the upload failed; such entries still collide but
/// are never drawn.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct Entry {
    pub kind: ObjectKind,
    pub mesh: Option<MeshHandle>,
}

/// Ordered list of every entity on the board, scanned for collisions and
/// drawn in order.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    entries: Vec<Entry>,
}

impl Registry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, kind: ObjectKind, mesh: Option<MeshHandle>) -> usize {
        self.entries.push(Entry { kind, mesh });
        self.entries.len() - 1
    }

    /// Removes the entries at `indices`, highest index first so the
    /// remaining indices stay valid while splicing.
    ///
    /// Returns the removed entries so their meshes can be released.
    pub fn remove_descending(&mut self, mut indices: Vec<usize>) -> Vec<Entry> {
        indices.sort_unstable_by(|a, b| b.cmp(a));
        indices.dedup();

        let len = self.entries.len();
        indices
            .into_iter()
            .filter(|index| *index < len)
            .map(|index| self.entries.remove(index))
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, &Entry)> {
        self.entries.iter().enumerate()
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Entry> {
        self.entries.get(index)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn count(&self, object_type: ObjectType) -> usize {
        self.entries
            .iter()
            .filter(|entry| entry.kind.object_type() == object_type)
            .count()
    }

    /// Indices of every entry belonging to snake number `snake`.
    #[must_use]
    pub fn segments_of(&self, snake: usize) -> Vec<usize> {
        self.iter()
            .filter(|(_, entry)| {
                matches!(entry.kind, ObjectKind::Segment { snake: s, .. } if s == snake)
            })
            .map(|(index, _)| index)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::{ObjectKind, ObjectType, Registry};
    use crate::grid::CellId;
    use crate::render::MeshHandle;

    #[test]
    fn kinds_map_to_collision_classes() {
        let cell = CellId::new(1, 1);

        assert_eq!(ObjectKind::Food { cell }.object_type(), ObjectType::Food);
        assert_eq!(ObjectKind::Wall { cell }.object_type(), ObjectType::Solid);
        assert_eq!(
            ObjectKind::Segment {
                snake: 0,
                segment: 0
            }
            .object_type(),
            ObjectType::Solid
        );
        assert_eq!(ObjectKind::Land { cell }.object_type(), ObjectType::Land);
    }

    #[test]
    fn descending_removal_removes_exactly_the_requested_entries() {
        let mut registry = Registry::new();
        for col in 0..6 {
            registry.push(
                ObjectKind::Wall {
                    cell: CellId::new(col, 0),
                },
                Some(MeshHandle(u32::from(col))),
            );
        }

        let removed = registry.remove_descending(vec![1, 4, 1, 3, 99]);

        assert_eq!(removed.len(), 3);
        let remaining: Vec<_> = registry.iter().filter_map(|(_, entry)| entry.mesh).collect();
        assert_eq!(remaining, vec![MeshHandle(0), MeshHandle(2), MeshHandle(5)]);
    }

    #[test]
    fn segments_of_filters_by_snake() {
        let mut registry = Registry::new();
        registry.push(ObjectKind::Segment { snake: 0, segment: 0 }, None);
        registry.push(ObjectKind::Segment { snake: 1, segment: 0 }, None);
        registry.push(ObjectKind::Segment { snake: 0, segment: 1 }, None);

        assert_eq!(registry.segments_of(0), vec![0, 2]);
        assert_eq!(registry.count(ObjectType::Solid), 3);
    }
}
