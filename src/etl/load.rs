//! Loader trait for loading data to destinations

use crate::error::Result;

/// Loader trait for loading data to a destination
///
/// Implementors define how to load items to destinations such as
/// append-only extraction files.
///
/// # Example
/// ```
/// use field_history_extractor::etl::Loader;
/// use field_history_extractor::error::Result;
/// use std::sync::Mutex;
///
/// struct MemoryLoader(Mutex<Vec<String>>);
///
/// impl Loader for MemoryLoader {
///     type Item = String;
///
///     fn load(&self, items: Vec<Self::Item>) -> Result<usize> {
///         let count = items.len();
///         self.0.lock().unwrap().extend(items);
///         Ok(count)
///     }
/// }
///
/// let loader = MemoryLoader(Mutex::new(Vec::new()));
/// assert_eq!(loader.load(vec!["a".into(), "b".into()]).unwrap(), 2);
/// ```
pub trait Loader: Send + Sync {
    /// The type of items to load
    type Item: Send;

    /// Load items to the destination
    ///
    /// Returns the number of items successfully loaded
    ///
    /// # Errors
    /// Returns an error if loading fails (I/O, serialization, etc.)
    fn load(&self, items: Vec<Self::Item>) -> Result<usize>;
}
