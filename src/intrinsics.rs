//! Buffer-derived array counts, such as the total buffer size.

/// Evaluates an intrinsic from the buffer length in bytes and the current bit
/// offset.
pub type IntrinsicFn = fn(buffer_len: usize, bit_offset: usize) -> i64;

#[derive(Debug, Clone, Copy)]
pub struct Intrinsic {
    pub name: &'static str,
    pub evaluate: IntrinsicFn,
}

/// Total size of the buffer in bytes.
pub const SIZE: &str = "__SIZE__";
/// Bytes from the byte-rounded cursor to the end of the buffer.
pub const LEFT: &str = "__LEFT__";

/// Ordered registry shared by the validator and the decoder, so a validated
/// schema never names an intrinsic the decoder cannot evaluate.
#[derive(Debug, Clone)]
pub struct Intrinsics {
    entries: Vec<Intrinsic>,
}

impl Intrinsics {
    /// Registry with `__SIZE__` and `__LEFT__`.
    pub fn builtin() -> Self {
        Intrinsics {
            entries: vec![
                Intrinsic {
                    name: SIZE,
                    evaluate: |buffer_len, _| buffer_len as i64,
                },
                Intrinsic {
                    name: LEFT,
                    evaluate: |buffer_len, bit_offset| {
                        buffer_len as i64 - bit_offset.div_ceil(8) as i64
                    },
                },
            ],
        }
    }

    /// Registry with no entries.
    pub fn empty() -> Self {
        Intrinsics {
            entries: Vec::new(),
        }
    }

    /// Adds or replaces an intrinsic. Count names are only looked up here when
    /// they start with [crate::field::INTRINSIC_PREFIX], so `name` should too.
    pub fn register(&mut self, name: &'static str, evaluate: IntrinsicFn) -> &mut Self {
        match self.entries.iter_mut().find(|i| i.name == name) {
            Some(existing) => existing.evaluate = evaluate,
            None => self.entries.push(Intrinsic { name, evaluate }),
        }

        self
    }

    pub fn get(&self, name: &str) -> Option<&Intrinsic> {
        self.entries.iter().find(|i| i.name == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.entries.iter().map(|i| i.name)
    }

    /// Evaluates `name`, or `None` if it is not registered.
    pub fn evaluate(&self, name: &str, buffer_len: usize, bit_offset: usize) -> Option<i64> {
        self.get(name).map(|i| (i.evaluate)(buffer_len, bit_offset))
    }
}

impl Default for Intrinsics {
    fn default() -> Self {
        Self::builtin()
    }
}
