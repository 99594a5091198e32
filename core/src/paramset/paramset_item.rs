//! Parameter Set Item

/// Stores the values of one named parameter.
#[derive(Clone, Debug, PartialEq)]
pub struct ParamSetItem<T> {
    /// The parameter values.
    pub values: Vec<T>,
}

impl<T> ParamSetItem<T> {
    /// Create a new `ParamSetItem<T>`.
    ///
    /// * `values` - The parameter values.
    pub fn new(values: Vec<T>) -> Self {
        Self { values }
    }
}
