use crate::query_builder::StatementBuilder;
use crate::traits::{ConnectionFactory, QueryAdapter, TableMetadata};
use std::marker::PhantomData;
use std::sync::Arc;

/// Generic data provider for one entity type
///
/// Statements are built for the factory's dialect and run through the adapter.
/// Both collaborators are shared, so clones are cheap.
pub struct GenericStore<T, F, A> {
    pub(crate) factory: Arc<F>,
    pub(crate) adapter: Arc<A>,
    pub(crate) _phantom: PhantomData<fn() -> T>,
}

impl<T, F, A> Clone for GenericStore<T, F, A> {
    fn clone(&self) -> Self {
        Self {
            factory: Arc::clone(&self.factory),
            adapter: Arc::clone(&self.adapter),
            _phantom: PhantomData,
        }
    }
}

impl<T, F, A> std::fmt::Debug for GenericStore<T, F, A>
where
    T: TableMetadata,
    F: ConnectionFactory,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GenericStore")
            .field("table", &T::table_name())
            .field("dialect", &self.factory.dialect())
            .field("max_row_count", &self.factory.max_row_count())
            .finish()
    }
}

impl<T, F, A> GenericStore<T, F, A>
where
    T: TableMetadata,
    F: ConnectionFactory,
    A: QueryAdapter<Connection = F::Connection>,
{
    pub fn new(factory: Arc<F>, adapter: Arc<A>) -> Self {
        Self {
            factory,
            adapter,
            _phantom: PhantomData,
        }
    }

    pub fn statements(&self) -> StatementBuilder {
        StatementBuilder::new(self.factory.dialect())
    }

    pub fn factory(&self) -> &F {
        &self.factory
    }

    pub fn adapter(&self) -> &A {
        &self.adapter
    }
}
