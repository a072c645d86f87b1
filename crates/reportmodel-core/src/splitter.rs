//! Extraction of keyword subtrees into separately loadable chunks.
//!
//! A chunk holds a model fragment plus its own string table. The parent keeps
//! a 1-based integer placeholder in the slot the fragment would have filled.
//! Chunks do not nest: while one is open, everything below it stays inline.

use crate::model::{ModelValue, SplitChunk};

#[derive(Debug, Clone, Default)]
pub struct Splitter {
    enabled: bool,
    open: bool,
    chunks: Vec<SplitChunk>,
}

impl Splitter {
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled,
            ..Self::default()
        }
    }

    /// True when the subtree about to be built should become a chunk.
    pub fn should_split(&self) -> bool {
        self.enabled && !self.open
    }

    pub fn begin(&mut self) {
        debug_assert!(!self.open, "split chunks do not nest");
        self.open = true;
    }

    /// Close the open chunk and return its placeholder.
    pub fn finish(&mut self, model: ModelValue, strings: Vec<String>) -> ModelValue {
        self.open = false;
        self.chunks.push(SplitChunk { model, strings });
        let placeholder = self.chunks.len() as i64;
        tracing::debug!(
            chunk = placeholder,
            strings = self.chunks[self.chunks.len() - 1].strings.len(),
            "finalized split chunk"
        );
        ModelValue::Int(placeholder)
    }

    pub fn into_chunks(self) -> Vec<SplitChunk> {
        self.chunks
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_disabled_never_splits() {
        let splitter = Splitter::new(false);
        assert!(!splitter.should_split());
    }

    #[test]
    fn test_placeholders_are_one_based_and_ordered() {
        let mut splitter = Splitter::new(true);
        assert!(splitter.should_split());
        splitter.begin();
        assert!(!splitter.should_split());
        let first = splitter.finish(ModelValue::empty(), vec!["*".into()]);
        splitter.begin();
        let second = splitter.finish(ModelValue::Int(7), vec!["*".into(), "*x".into()]);
        assert_eq!(first, ModelValue::Int(1));
        assert_eq!(second, ModelValue::Int(2));
        let chunks = splitter.into_chunks();
        assert_eq!(chunks[1].model, ModelValue::Int(7));
        assert_eq!(chunks[1].strings, vec!["*", "*x"]);
    }
}
