//! General utility traits extending standard types.
//!
//! `PathExtension` is used by the loader to classify data files, `UniqueElements`
//! by the option deriver and the initial-filter replay to de-duplicate values
//! while keeping first occurrences in order.

use std::{collections::HashSet, ffi::OsStr, hash::Hash, path::Path};

/// Trait to extend `Path` with a convenient method for getting the lowercase file extension.
/// Used by `file_extension.rs` and `loader.rs`.
pub trait PathExtension {
    /// Returns the file extension as a lowercase `String`, or `None`.
    fn extension_as_lowercase(&self) -> Option<String>;
}

impl PathExtension for Path {
    /// Implementation for `Path`. Gets extension, converts to &str (lossy), then lowercases.
    ///
    /// ### Logic
    /// 1. Call `self.extension()` -> `Option<&OsStr>`.
    /// 2. Convert `OsStr` to `&str` via `to_str` -> `Option<&str>`.
    /// 3. Map `&str` to lowercase `String` -> `Option<String>`.
    fn extension_as_lowercase(&self) -> Option<String> {
        self.extension() // 1. Get OsStr extension.
            .and_then(OsStr::to_str) // 2. Try converting to &str.
            .map(str::to_lowercase) // 3. Convert to lowercase String if successful.
    }
}

/// A trait for deduplicating vectors while preserving the original order of elements.
/// Added to `Vec<T>`.
pub trait UniqueElements<T> {
    /// Removes duplicate elements in place, keeping the first occurrence.
    fn unique(&mut self)
    where
        T: Eq + Hash + Clone;

    /// Removes elements whose derived key was already seen, keeping the first occurrence.
    fn unique_by<K, F>(&mut self, key: F)
    where
        K: Eq + Hash,
        F: FnMut(&T) -> K;
}

impl<T> UniqueElements<T> for Vec<T> {
    /// Implementation using `HashSet` for efficiency.
    ///
    /// ### Logic
    /// 1. Create an empty `HashSet` to track seen elements.
    /// 2. Use `Vec::retain` to iterate and filter the vector in place.
    /// 3. Keep the element only if inserting a clone into `seen` succeeds (first time seen).
    fn unique(&mut self)
    where
        T: Eq + Hash + Clone, // Constraints required for HashSet.
    {
        let mut seen = HashSet::new(); // 1. Track seen elements.
        self.retain(|x| seen.insert(x.clone())); // 2, 3.
    }

    /// Same as `unique`, but identity comes from `key` (e.g. the formatted text of an option).
    fn unique_by<K, F>(&mut self, mut key: F)
    where
        K: Eq + Hash,
        F: FnMut(&T) -> K,
    {
        let mut seen = HashSet::new();
        self.retain(|x| seen.insert(key(x)));
    }
}

// --- Unit Tests ---

#[cfg(test)]
mod tests_path_extension {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_extension_as_lowercase_some() {
        let path = PathBuf::from("my_file.CSV");
        assert_eq!(path.extension_as_lowercase(), Some("csv".to_string()));
    }

    #[test]
    fn test_extension_as_lowercase_none() {
        let path = PathBuf::from("myfile");
        assert_eq!(path.extension_as_lowercase(), None);
    }

    #[test]
    fn test_extension_as_lowercase_multiple_dots() {
        let path = PathBuf::from("orders.2024.backup.ndjson");
        assert_eq!(path.extension_as_lowercase(), Some("ndjson".to_string()));
    }
}

#[cfg(test)]
mod tests_unique {
    use super::*;

    #[test]
    fn test_unique() {
        let mut vec = vec![1, 2, 2, 3, 1, 4, 3, 2, 5];
        vec.unique();
        assert_eq!(vec, vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_unique_empty() {
        let mut vec: Vec<i32> = vec![];
        vec.unique();
        assert_eq!(vec, Vec::<i32>::new());
    }

    #[test]
    fn test_unique_strings() {
        let mut vec = vec!["open", "closed", "open", "pending", "closed"];
        vec.unique();
        assert_eq!(vec, vec!["open", "closed", "pending"]);
    }

    #[test]
    fn test_unique_by_keeps_first_occurrence() {
        let mut vec = vec![(1, "09:30 AM"), (2, "09:30 AM"), (3, "10:00 AM")];
        vec.unique_by(|(_, text)| *text);
        assert_eq!(vec, vec![(1, "09:30 AM"), (3, "10:00 AM")]);
    }
}
