/// Limits and options for one evaluation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Config {
    /// Most words any single stack may hold.
    pub stack_limit: usize,
    /// Most stacks the scope heap may hold, the outermost included.
    pub depth_limit: usize,
    /// Most successful applications of one greedy invocation.
    pub greedy_limit: usize,
    /// Resolve references left on the final stack before returning them.
    pub resolve_trailing: bool,
}

pub const STACK_LIMIT: usize = 256;
pub const DEPTH_LIMIT: usize = 10;
pub const GREEDY_LIMIT: usize = 256;

impl Default for Config {
    fn default() -> Self {
        Self {
            stack_limit: STACK_LIMIT,
            depth_limit: DEPTH_LIMIT,
            greedy_limit: GREEDY_LIMIT,
            resolve_trailing: true,
        }
    }
}

impl Config {
    pub fn with_stack_limit(mut self, limit: usize) -> Self {
        self.stack_limit = limit;
        self
    }

    pub fn with_depth_limit(mut self, limit: usize) -> Self {
        self.depth_limit = limit;
        self
    }

    pub fn with_greedy_limit(mut self, limit: usize) -> Self {
        self.greedy_limit = limit;
        self
    }

    pub fn with_resolve_trailing(mut self, resolve: bool) -> Self {
        self.resolve_trailing = resolve;
        self
    }
}
