//
// Copyright (c) The Xmldb Core Contributors
//
// SPDX-License-Identifier: MIT
//

#![warn(rust_2018_idioms)]

mod bind;
pub mod debug;
mod default;
pub mod error;
pub mod io;
pub mod merge;
pub mod ns;
pub mod nsctx;
pub mod tree;

pub use crate::bind::Bind;
pub use crate::error::Error;
pub use crate::io::PrintOpts;
pub use crate::merge::Diff;
pub use crate::ns::ResolveCtx;
pub use crate::nsctx::NsContext;
pub use crate::tree::{NodeFlags, NodeIndex, NodeKind, XmlNode, XmlTree};
