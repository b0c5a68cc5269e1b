use std::marker::PhantomData;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct IsDeleted<T>(bool, PhantomData<T>);

impl<T> IsDeleted<T> {
    pub fn new(value: impl Into<bool>) -> Self {
        IsDeleted(value.into(), PhantomData)
    }
}

impl<T> AsRef<bool> for IsDeleted<T> {
    fn as_ref(&self) -> &bool {
        &self.0
    }
}

impl<T> From<IsDeleted<T>> for bool {
    fn from(value: IsDeleted<T>) -> Self {
        value.0
    }
}

impl<T> Default for IsDeleted<T> {
    fn default() -> Self {
        Self::new(false)
    }
}
