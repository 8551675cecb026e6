use serde::{Deserialize, Serialize};
use std::{collections::BTreeMap, fmt};

/// Offset reported when nothing has been ingested yet. Reading strictly after
/// it starts from the beginning of a partition.
pub const NO_OFFSET: i64 = -1;

/// Highest source offset already committed to the destination for one partition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Watermark {
    pub partition_id: i64,
    pub offset: i64,
}

/// The ingestion position across all partitions of a topic.
///
/// Partitions that have committed rows carry their own watermark. Any other
/// partition is read strictly after `floor`, which is [`NO_OFFSET`] unless the
/// position was built from a single caller-supplied offset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Watermarks {
    partitions: BTreeMap<i64, i64>,
    floor: i64,
}

impl Watermarks {
    /// Nothing committed anywhere.
    pub fn empty() -> Self {
        Self::uniform(NO_OFFSET)
    }

    /// Read every partition strictly after `offset`.
    pub fn uniform(offset: i64) -> Self {
        Self {
            partitions: BTreeMap::new(),
            floor: offset,
        }
    }

    pub fn from_watermarks(marks: impl IntoIterator<Item = Watermark>) -> Self {
        let mut out = Self::empty();
        for mark in marks {
            out.advance(mark.partition_id, mark.offset);
        }
        out
    }

    /// Raises the watermark of `partition_id`; never lowers it.
    pub fn advance(&mut self, partition_id: i64, offset: i64) {
        let entry = self.partitions.entry(partition_id).or_insert(offset);
        if offset > *entry {
            *entry = offset;
        }
    }

    /// Offset after which `partition_id` has to be read.
    pub fn after(&self, partition_id: i64) -> i64 {
        self.partitions
            .get(&partition_id)
            .copied()
            .unwrap_or(self.floor)
    }

    pub fn floor(&self) -> i64 {
        self.floor
    }

    /// Highest committed offset over all partitions, or the floor when none has rows.
    pub fn max_offset(&self) -> i64 {
        self.partitions
            .values()
            .copied()
            .max()
            .unwrap_or(self.floor)
    }

    pub fn is_uniform(&self) -> bool {
        self.partitions.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = Watermark> + '_ {
        self.partitions
            .iter()
            .map(|(&partition_id, &offset)| Watermark {
                partition_id,
                offset,
            })
    }
}

impl Default for Watermarks {
    fn default() -> Self {
        Self::empty()
    }
}

/// `4` when uniform, otherwise `p0:4 p1:9 rest:-1`.
impl fmt::Display for Watermarks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_uniform() {
            return write!(f, "{}", self.floor);
        }
        for (partition_id, offset) in &self.partitions {
            write!(f, "p{partition_id}:{offset} ")?;
        }
        write!(f, "rest:{}", self.floor)
    }
}
