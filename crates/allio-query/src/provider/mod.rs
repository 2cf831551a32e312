/*!
Accessibility providers.

- `traits.rs` - [`ElementHandle`] and [`ApplicationResolver`], the only
  surface the engine calls
- `memory.rs` - [`MemoryTree`], an arena-backed provider
*/

mod memory;
mod traits;

pub use memory::{MemoryElement, MemoryTree, Node};
pub use traits::{ApplicationResolver, ElementHandle};
