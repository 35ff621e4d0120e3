use super::value::Word;
use crate::error::{ErrorKind, OperatorError};

pub type Stack = Vec<Word>;

/// Stack of stacks. Only the top stack is ever mutated; stacks below it are
/// readable through [`ScopeHeap::resolve_downward`]. The heap never holds
/// fewer than one stack.
#[derive(Debug, Clone)]
pub struct ScopeHeap {
    stacks: Vec<Stack>,
    stack_limit: usize,
    depth_limit: usize,
}

impl ScopeHeap {
    pub fn new(stack_limit: usize, depth_limit: usize) -> Self {
        Self {
            stacks: vec![vec![]],
            stack_limit,
            depth_limit,
        }
    }

    pub fn depth(&self) -> usize {
        self.stacks.len()
    }

    pub fn push_scope(&mut self) -> Result<(), ErrorKind> {
        if self.stacks.len() >= self.depth_limit {
            return Err(ErrorKind::ScopeOverflow {
                limit: self.depth_limit,
            });
        }
        self.stacks.push(vec![]);
        Ok(())
    }

    /// Closes the top scope, appending its words to the new top in order.
    pub fn pop_scope(&mut self) -> Result<(), ErrorKind> {
        if self.stacks.len() < 2 {
            return Err(ErrorKind::ScopeUnderflow);
        }
        let closed = self.stacks.pop().unwrap_or_default();
        self.extend(closed)
    }

    pub fn current(&self) -> &Stack {
        let last = self.stacks.len() - 1;
        &self.stacks[last]
    }

    fn current_mut(&mut self) -> &mut Stack {
        let last = self.stacks.len() - 1;
        &mut self.stacks[last]
    }

    pub fn push(&mut self, word: Word) -> Result<(), ErrorKind> {
        self.extend(std::iter::once(word))
    }

    pub fn extend<I>(&mut self, words: I) -> Result<(), ErrorKind>
    where
        I: IntoIterator<Item = Word>,
    {
        let limit = self.stack_limit;
        let stack = self.current_mut();
        for word in words {
            if stack.len() >= limit {
                return Err(ErrorKind::StackOverflow { limit });
            }
            stack.push(word);
        }
        Ok(())
    }

    /// Removes the top `count` words, returned in stack order (deepest
    /// first).
    pub fn pop_operands(&mut self, count: usize) -> Result<Stack, OperatorError> {
        let stack = self.current_mut();
        if stack.len() < count {
            return Err(OperatorError::Underflow {
                needed: count,
                available: stack.len(),
            });
        }
        let at = stack.len() - count;
        Ok(stack.split_off(at))
    }

    /// Puts back operands taken by [`ScopeHeap::pop_operands`]. Never
    /// exceeds the limit since the words came off this very stack.
    pub(crate) fn restore(&mut self, words: Stack) {
        self.current_mut().extend(words);
    }

    pub(crate) fn snapshot(&self) -> Stack {
        self.current().clone()
    }

    pub(crate) fn reset(&mut self, stack: Stack) {
        *self.current_mut() = stack;
    }

    /// Searches from the top of the current stack downwards through every
    /// enclosing scope, returning the first word matching `predicate`.
    pub fn resolve_downward<P>(&self, mut predicate: P) -> Option<&Word>
    where
        P: FnMut(&Word) -> bool,
    {
        self.stacks
            .iter()
            .rev()
            .flat_map(|stack| stack.iter().rev())
            .find(|word| predicate(word))
    }

    /// Final contents once every scope is closed, or the number of scopes
    /// still open.
    pub fn into_result(mut self) -> Result<Stack, usize> {
        if self.stacks.len() != 1 {
            return Err(self.stacks.len() - 1);
        }
        Ok(self.stacks.pop().unwrap_or_default())
    }
}
