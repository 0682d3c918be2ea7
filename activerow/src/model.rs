use std::hash::Hash;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::DataError;
use crate::lifecycle::Lifecycle;
use crate::schema::SchemaIdentifier;

/// A type persisted as rows of one table.
///
/// The whole value is serialized with serde to produce column values
/// (snake_case column names, explicit NULLs) and rows are deserialized back
/// into it. Implementing this trait is enough to get the operations of
/// [`Crud`](crate::Crud) and, for slices, [`Batch`](crate::Batch).
///
/// # Example
///
/// ```ignore
/// #[derive(Serialize, Deserialize)]
/// struct Todo {
///     id: Option<i64>,
///     value: String,
/// }
///
/// impl Model for Todo {
///     type Id = i64;
///     type Lifecycle = Plain;
///     fn schema() -> SchemaIdentifier { "todos".into() }
///     fn id(&self) -> Option<&i64> { self.id.as_ref() }
///     fn set_id(&mut self, id: Option<i64>) { self.id = id; }
/// }
/// ```
pub trait Model: Serialize + DeserializeOwned + Send + Sync + 'static {
    type Id: Serialize + DeserializeOwned + Clone + Eq + Hash + Send + Sync + 'static;

    /// Lifecycle overlays (timestamps, soft delete) this type opts into.
    type Lifecycle: Lifecycle<Self>;

    fn schema() -> SchemaIdentifier;

    fn id(&self) -> Option<&Self::Id>;

    fn set_id(&mut self, id: Option<Self::Id>);

    /// Column holding the identifier.
    fn id_column() -> &'static str {
        "id"
    }

    /// The identifier, or [`DataError::IdRequired`] if the entity was never
    /// persisted.
    fn require_id(&self) -> Result<&Self::Id, DataError> {
        self.id().ok_or(DataError::IdRequired)
    }
}
