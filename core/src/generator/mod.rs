use crate::*;
pub use random::*;

mod random;

/// Mine placement strategy, invoked once per session by the first reveal.
pub trait LayoutGenerator {
    fn generate(self, config: GameConfig) -> MineLayout;
}
