use fxhash::FxHashMap;
use phonebook_database::Database;
use phonebook_domain::config::ApiConfig;
use phonebook_domain::registry::{FeatureSlice, InitializedSlice};
use std::any::{TypeId, type_name};
use std::collections::hash_map::Entry;
use std::ops::Deref;
use std::sync::Arc;

#[phonebook_derive::phonebook_error]
pub enum ApiStateError {
    /// `build` was called before the builder received the config.
    #[error("API state needs a config before it can be built")]
    MissingConfig {},

    /// Two slices were registered under the same state type.
    #[error("Feature slice `{name}` registered twice")]
    DuplicateSlice { name: &'static str },

    /// A handler asked for a slice nobody registered.
    #[error("Feature slice `{slice}` is not registered")]
    SliceNotRegistered { slice: &'static str },
}

#[derive(Debug)]
pub struct ApiStateInner {
    pub config: ApiConfig,
    /// `None` when the slices keep their data in process memory.
    pub database: Option<Database>,
    slices: FxHashMap<TypeId, InitializedSlice>,
}

/// Shared application state handed to every handler.
#[derive(Debug, Clone)]
pub struct ApiState {
    inner: Arc<ApiStateInner>,
}

impl ApiState {
    #[must_use]
    pub fn builder() -> ApiStateBuilder {
        ApiStateBuilder::default()
    }

    /// Borrows the state registered for slice `T`.
    ///
    /// # Errors
    /// [`ApiStateError::SliceNotRegistered`] when no slice of that type was registered.
    pub fn slice<T: FeatureSlice>(&self) -> Result<&T, ApiStateError> {
        self.inner
            .slices
            .get(&TypeId::of::<T>())
            .and_then(InitializedSlice::downcast_ref::<T>)
            .ok_or(ApiStateError::SliceNotRegistered { slice: type_name::<T>() })
    }

    /// Registered slice names, sorted.
    #[must_use]
    pub fn slice_names(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.inner.slices.values().map(|slice| slice.name).collect();
        names.sort_unstable();
        names
    }
}

impl Deref for ApiState {
    type Target = ApiStateInner;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

#[derive(Debug, Default)]
pub struct ApiStateBuilder {
    config: Option<ApiConfig>,
    database: Option<Database>,
    slices: Vec<InitializedSlice>,
}

impl ApiStateBuilder {
    #[must_use]
    pub fn config(mut self, config: ApiConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Shares a database handle with the health check.
    #[must_use]
    pub fn db(mut self, database: Database) -> Self {
        self.database = Some(database);
        self
    }

    #[must_use]
    pub fn register_slice(mut self, slice: InitializedSlice) -> Self {
        self.slices.push(slice);
        self
    }

    /// # Errors
    /// [`ApiStateError::MissingConfig`] without a config, and
    /// [`ApiStateError::DuplicateSlice`] when one slice type was registered twice.
    pub fn build(self) -> Result<ApiState, ApiStateError> {
        let config = self.config.ok_or(ApiStateError::MissingConfig {})?;

        let mut slices = FxHashMap::default();
        for slice in self.slices {
            match slices.entry(slice.id) {
                Entry::Occupied(_) => return Err(ApiStateError::DuplicateSlice { name: slice.name }),
                Entry::Vacant(slot) => {
                    slot.insert(slice);
                },
            }
        }

        Ok(ApiState { inner: Arc::new(ApiStateInner { config, database: self.database, slices }) })
    }
}
