use core::fmt;

/// Operand stack for executing a [`Program`](super::Program).
///
/// Callers own their stack and may reuse it across executions; nothing in
/// the stack is tied to a particular program. Values left behind by one
/// execution stay visible to the next unless the caller clears them.
///
/// # Examples
///
/// ```
/// use formula_core::vm::Stack;
///
/// let mut stack = Stack::new();
/// stack.push(42.0);
/// stack.push(17.0);
/// assert_eq!(stack.pop(), Some(17.0));
/// assert_eq!(stack.peek(), Some(&42.0));
/// assert_eq!(stack.len(), 1);
/// ```
#[derive(Clone, PartialEq)]
pub struct Stack<T> {
    /// Bottom of the stack is index 0.
    items: Vec<T>,
}

impl<T> Stack<T> {
    pub fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// Creates an empty stack with room for `capacity` values.
    ///
    /// [`Program::new_stack`](super::Program::new_stack) uses this with the
    /// program's maximum depth so execution never reallocates.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            items: Vec::with_capacity(capacity),
        }
    }

    #[inline]
    pub fn push(&mut self, value: T) {
        self.items.push(value);
    }

    /// Removes and returns the top value from the stack.
    ///
    /// Returns `None` if the stack is empty.
    #[inline]
    pub fn pop(&mut self) -> Option<T> {
        self.items.pop()
    }

    /// Returns a reference to the top value without removing it.
    ///
    /// Returns `None` if the stack is empty.
    #[inline]
    pub fn peek(&self) -> Option<&T> {
        self.items.last()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Clears the stack, removing all values.
    ///
    /// This does not deallocate the underlying storage.
    #[inline]
    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Returns the values from bottom to top.
    ///
    /// # Examples
    ///
    /// ```
    /// use formula_core::vm::Stack;
    ///
    /// let mut stack = Stack::new();
    /// stack.push(1.0);
    /// stack.push(2.0);
    /// assert_eq!(stack.as_slice(), &[1.0, 2.0]);
    /// ```
    #[inline]
    pub fn as_slice(&self) -> &[T] {
        &self.items
    }

    /// Returns an iterator over references to the stack elements.
    ///
    /// The iterator yields elements from bottom to top.
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.items.iter()
    }
}

impl<T> Default for Stack<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: fmt::Debug> fmt::Debug for Stack<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Stack")
            .field("items", &self.items)
            .field("len", &self.items.len())
            .finish()
    }
}

impl<T> core::ops::Index<usize> for Stack<T> {
    type Output = T;

    /// Indexes the stack from the top.
    ///
    /// `stack[0]` returns the top element, `stack[1]` returns the element below it, etc.
    ///
    /// # Panics
    ///
    /// Panics if the index is out of bounds.
    #[inline]
    fn index(&self, index: usize) -> &Self::Output {
        let len = self.items.len();
        assert!(
            index < len,
            "Stack index out of bounds: index {} but stack has {} elements",
            index,
            len
        );
        &self.items[len - 1 - index]
    }
}
