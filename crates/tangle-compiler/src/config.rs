/// Controls compiler limits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompilerConfig {
    /// Capacity of the bytecode buffer, end marker included.
    pub max_bytecode_size: usize,
}

impl Default for CompilerConfig {
    fn default() -> Self {
        Self {
            max_bytecode_size: 65535,
        }
    }
}
