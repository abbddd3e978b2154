//! Small helpers shared by the bot and its commands.

use std::path::PathBuf;

use crate::constants::EMPTY_LIST;

/// Joins a directory path with an entry name.
///
/// # Arguments
///
/// * `dir_path` - The base directory path
/// * `subdir_path` - The subdirectory or file name to append
///
/// # Returns
///
/// The joined path. Non UTF-8 components are replaced lossily.
///
/// # Examples
///
/// ```
/// # use herald::utils::get_path;
/// let path = get_path("/var/lib/herald", "session");
/// assert_eq!(path, "/var/lib/herald/session");
/// ```
pub fn get_path(dir_path: &str, subdir_path: &str) -> String {
    let path: PathBuf = [dir_path, subdir_path].iter().collect();
    path.to_string_lossy().into_owned()
}

/// Joins words into an English list with an Oxford comma.
///
/// An empty list gives `"(none)"`.
///
/// # Examples
///
/// ```
/// # use herald::utils::human_list;
/// assert_eq!(human_list(&["1", "2", "3"]), "1, 2, and 3");
/// ```
pub fn human_list<S: AsRef<str>>(words: &[S]) -> String {
    match words {
        [] => EMPTY_LIST.to_owned(),
        [word] => word.as_ref().to_owned(),
        [first, second] => format!("{} and {}", first.as_ref(), second.as_ref()),
        [head @ .., last] => {
            let head = head.iter().map(|word| word.as_ref()).collect::<Vec<_>>().join(", ");
            format!("{}, and {}", head, last.as_ref())
        }
    }
}
