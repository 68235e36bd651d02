//! Client runtime and TNGL toolchain for Tangle LED controller networks.
//!
//! # Crate Structure
//!
//! - [`transport`]: connector capability trait and side-signals
//! - [`frame`]: binary codec, flag tables and the controller clock
//! - [`compiler`]: TNGL tokenizer and bytecode compiler
//! - [`interface`]: ordered command queue over one connector (behind `interface` feature)

/// Re-export transport types.
pub mod transport {
    pub use tangle_transport::*;
}

/// Re-export codec types.
pub mod frame {
    pub use tangle_frame::*;
}

/// Re-export compiler types.
pub mod compiler {
    pub use tangle_compiler::*;
}

/// Re-export interface types (requires `interface` feature).
#[cfg(feature = "interface")]
pub mod interface {
    pub use tangle_interface::*;
}
