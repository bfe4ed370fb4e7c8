use std::fmt::Debug;
use thiserror::Error;

#[derive(Error, Debug, PartialEq)]
pub enum StackError {
    #[error("reentrancy prevented: {0} already exists in the stack")]
    CycleDetected(String),
    #[error("stack depth limit of {0} reached")]
    DepthExceeded(usize),
}

/// Contracts currently executing in a call tree, outermost first.
#[derive(Clone, Debug)]
pub struct Stack<T> {
    inner: Vec<T>,
    limit: usize,
}

impl<T: PartialEq + Debug> Stack<T> {
    pub fn new(limit: usize) -> Self {
        Stack {
            inner: Vec::new(),
            limit,
        }
    }

    pub fn push(&mut self, item: T) -> Result<(), StackError> {
        if self.inner.contains(&item) {
            return Err(StackError::CycleDetected(format!("{:?}", item)));
        }

        if self.inner.len() >= self.limit {
            return Err(StackError::DepthExceeded(self.limit));
        }

        self.inner.push(item);
        Ok(())
    }

    pub fn pop(&mut self) -> Option<T> {
        self.inner.pop()
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_rejects_cycles() {
        let mut stack = Stack::new(4);
        stack.push(1).unwrap();
        stack.push(2).unwrap();
        assert_eq!(
            stack.push(1),
            Err(StackError::CycleDetected("1".to_string()))
        );
        assert_eq!(stack.pop(), Some(2));
        assert_eq!(stack.len(), 1);
        stack.push(2).unwrap();
    }

    #[test]
    fn test_push_respects_limit() {
        let mut stack = Stack::new(2);
        stack.push("a").unwrap();
        stack.push("b").unwrap();
        assert_eq!(stack.push("c"), Err(StackError::DepthExceeded(2)));
        assert_eq!(stack.len(), 2);
    }
}
