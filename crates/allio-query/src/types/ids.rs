/*! Branded ID types. */

use derive_more::{Display, From, Into};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Node identifier inside a [`MemoryTree`](crate::provider::MemoryTree).
///
/// Only unique within the tree that issued it.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, TS, Display, From, Into,
)]
#[ts(export)]
pub struct ElementId(pub u32);

/// Process ID - branded type to distinguish from other u32 values.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS, Display, From, Into,
)]
#[ts(export)]
pub struct ProcessId(pub u32);

impl ProcessId {
  /// Parse a process ID from user-supplied text (surrounding whitespace allowed).
  pub fn parse(text: &str) -> Option<Self> {
    text.trim().parse::<u32>().ok().map(Self)
  }
}
