//! Indexed, owned copy of the current render pass.
//!
//! Built once per render and replaced wholesale on the next one; nothing in
//! here is patched incrementally.

use std::collections::HashMap;

use crate::model::{Line, LineId, Syllable, SyllableId};

#[derive(Debug, Clone, Default)]
pub struct TimelineCache {
    lines: Vec<Line>,
    line_index: HashMap<LineId, usize>,
    syllable_index: HashMap<SyllableId, (usize, usize)>,
    timed_ids: Vec<LineId>,
}

impl TimelineCache {
    pub fn new(lines: Vec<Line>) -> Self {
        let mut line_index = HashMap::with_capacity(lines.len());
        let mut syllable_index = HashMap::new();
        let mut timed_ids = Vec::with_capacity(lines.len());

        for (li, line) in lines.iter().enumerate() {
            line_index.insert(line.id, li);
            if line.kind.is_timed() {
                timed_ids.push(line.id);
            }
            for (si, syllable) in line.syllables.iter().enumerate() {
                syllable_index.insert(syllable.id, (li, si));
            }
        }

        Self {
            lines,
            line_index,
            syllable_index,
            timed_ids,
        }
    }

    pub fn lines(&self) -> &[Line] {
        &self.lines
    }

    pub fn timed_lines(&self) -> impl Iterator<Item = &Line> {
        self.lines.iter().filter(|l| l.kind.is_timed())
    }

    /// Ids of timed lines in display order
    pub fn timed_ids(&self) -> &[LineId] {
        &self.timed_ids
    }

    pub fn line(&self, id: LineId) -> Option<&Line> {
        self.line_index.get(&id).map(|&i| &self.lines[i])
    }

    pub fn syllable(&self, id: SyllableId) -> Option<&Syllable> {
        self.syllable_index
            .get(&id)
            .map(|&(li, si)| &self.lines[li].syllables[si])
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn syllable_count(&self) -> usize {
        self.syllable_index.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::LineKind;

    #[test]
    fn test_lookups() {
        let cache = TimelineCache::new(vec![
            Line::new(LineId(10), LineKind::Lyric, 0, 1000, "a")
                .with_syllables(vec![Syllable::new(SyllableId(5), 0, 1000, "a")]),
            Line::new(LineId(11), LineKind::Metadata, 0, 0, "credits"),
        ]);

        assert_eq!(cache.line(LineId(11)).unwrap().text, "credits");
        assert_eq!(cache.syllable(SyllableId(5)).unwrap().text, "a");
        assert_eq!(cache.timed_ids(), &[LineId(10)]);
        assert!(cache.line(LineId(99)).is_none());
    }
}
