use crate::adapters::SystemRandom;
use crate::domain::model::Category;
use crate::domain::ports::RandomPort;
use std::sync::Arc;

/// Picks one category with probability `1 / Category::ALL.len()`.
#[derive(Clone)]
pub struct DrawGenerator {
    random: Arc<dyn RandomPort>,
}

impl DrawGenerator {
    pub fn new(random: Arc<dyn RandomPort>) -> Self {
        Self { random }
    }

    pub fn draw(&self) -> Category {
        let len = Category::ALL.len();
        // 即使 RandomPort 回傳越界的值也不會跑出固定集合
        Category::ALL[self.random.gen_index(len) % len]
    }
}

impl Default for DrawGenerator {
    fn default() -> Self {
        Self::new(Arc::new(SystemRandom))
    }
}
